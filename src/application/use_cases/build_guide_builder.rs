use crate::application::use_cases::challenge_matching::{match_challenges, ChallengeMatch};
use crate::application::use_cases::intake::split_challenges;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::project::Project;
use crate::infrastructure::db::projects::{GeneratedOutput, ProjectRepository};
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::extract_fenced_text;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const DEFAULT_SYSTEM_PROMPT: &str = "You are writing internal implementation guides for an \
automation agency's build team. Output ONLY a Markdown document with phased checklists \
(discovery and setup, building each workflow, testing and training, deployment) plus a \
potential-gotchas section. Use task checkboxes. Do not include any explanations outside the \
document.";

pub struct BuildGuideBuilderUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    projects: Arc<ProjectRepository>,
    config: LLMConfig,
    system_prompt: Option<String>,
}

impl BuildGuideBuilderUseCase {
    pub fn new(
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        projects: Arc<ProjectRepository>,
        config: LLMConfig,
        system_prompt: Option<String>,
    ) -> Self {
        Self {
            llm_client,
            projects,
            config,
            system_prompt,
        }
    }

    /// Generates the team-facing Markdown build guide, scoped by the
    /// project's matched challenges, and stores it on the project row.
    pub async fn execute(&self, project_id: &str) -> Result<serde_json::Value> {
        let project = self.projects.get(project_id).await?;
        let challenges = split_challenges(project.current_challenges.as_deref());
        let matching = match_challenges(&challenges);
        let user_prompt = build_user_prompt(&project, &matching);

        let system = self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let raw = self
            .llm_client
            .generate(&self.config, system, &user_prompt)
            .await?;

        let markdown = extract_fenced_text(&raw);
        if markdown.is_empty() {
            return Err(AppError::LLMError("Empty build guide reply".to_string()));
        }

        info!(
            project_id,
            hours = matching.estimated_hours,
            complexity = matching.complexity.as_str(),
            "Generated build guide"
        );

        self.projects
            .save_generated(project_id, GeneratedOutput::BuildGuide, &markdown)
            .await?;

        Ok(json!({
            "markdown": markdown,
            "estimatedHours": matching.estimated_hours,
            "estimatedWeeks": matching.estimated_weeks,
            "complexity": matching.complexity,
        }))
    }
}

fn build_user_prompt(project: &Project, matching: &ChallengeMatch) -> String {
    let automations = if matching.matched_templates.is_empty() {
        "- Custom automation (scoped after discovery)".to_string()
    } else {
        matching
            .matched_templates
            .iter()
            .map(|t| format!("- {}", t.category.replace('_', " ")))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Create an implementation guide for the team building this client's automation:\n\n\
         Client: {}\n\
         Complexity: {}\n\
         Estimated Hours: {}\n\
         Timeline: {} weeks\n\n\
         Automations to Build:\n{}\n\n\
         Current Process:\n{}\n\n\
         Desired Outcomes:\n{}\n\n\
         Cover kickoff and credential gathering, per-workflow build steps (trigger, data \
         processing, actions, configuration, testing checklist), client UAT and training, \
         the deployment checklist, and likely gotchas for this setup.",
        project.client_name,
        matching.complexity.as_str(),
        matching.estimated_hours,
        matching.estimated_weeks,
        automations,
        project
            .current_process
            .as_deref()
            .unwrap_or("No current process described"),
        project
            .desired_outcomes
            .as_deref()
            .unwrap_or("General automation and efficiency improvements"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::init_test_db;
    use crate::infrastructure::llm_clients::testing::ScriptedClient;

    async fn repo_with_project(challenges: Option<&str>) -> Arc<ProjectRepository> {
        let repo = Arc::new(ProjectRepository::new(init_test_db().await));
        let mut project = Project::new(
            "p1".to_string(),
            "2026-01-01T00:00:00Z".to_string(),
            "Acme Joinery".to_string(),
            "ops@acme.example".to_string(),
        );
        project.current_challenges = challenges.map(|c| c.to_string());
        repo.insert(&project).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_build_guide_is_persisted() {
        let repo = repo_with_project(Some(
            "I forget to invoice or invoice late\nChasing payments is awkward",
        ))
        .await;
        let client = Arc::new(ScriptedClient::replying(
            "```markdown\n# Build Guide: Acme Joinery\n- [ ] Kickoff call\n```",
        ));
        let use_case =
            BuildGuideBuilderUseCase::new(client.clone(), repo.clone(), LLMConfig::default(), None);

        let result = use_case.execute("p1").await.unwrap();
        assert!(result["markdown"]
            .as_str()
            .unwrap()
            .starts_with("# Build Guide"));
        assert!(result["estimatedHours"].as_i64().unwrap() > 0);

        let stored = repo.get("p1").await.unwrap().build_guide_markdown.unwrap();
        assert!(stored.contains("Kickoff call"));

        let prompt = client.last_user.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("invoicing"));
        assert!(prompt.contains("payments"));
    }

    #[tokio::test]
    async fn test_empty_reply_is_rejected() {
        let repo = repo_with_project(None).await;
        let client = Arc::new(ScriptedClient::replying(""));
        let use_case =
            BuildGuideBuilderUseCase::new(client, repo.clone(), LLMConfig::default(), None);

        let err = use_case.execute("p1").await.unwrap_err();
        assert!(matches!(err, AppError::LLMError(_)));
        assert!(repo.get("p1").await.unwrap().build_guide_markdown.is_none());
    }
}
