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

const DEFAULT_SYSTEM_PROMPT: &str = "You are writing professional project proposals for an \
automation agency serving trade businesses. Tone: professional but approachable, like you're \
talking to a tradesperson, not a corporate exec. Output ONLY a clean HTML document with inline \
CSS, suitable for email. Do not include any explanations or markdown. Start with the <html> tag.";

pub struct ProposalBuilderUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    projects: Arc<ProjectRepository>,
    config: LLMConfig,
    system_prompt: Option<String>,
}

impl ProposalBuilderUseCase {
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

    /// Generates a client-facing HTML proposal priced from the project's
    /// matched challenges and stores it on the project row.
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

        let html = extract_fenced_text(&raw);
        if html.is_empty() {
            return Err(AppError::LLMError("Empty proposal reply".to_string()));
        }

        info!(
            project_id,
            total_value = matching.total_value,
            weeks = matching.estimated_weeks,
            "Generated proposal"
        );

        self.projects
            .save_generated(project_id, GeneratedOutput::Proposal, &html)
            .await?;

        Ok(json!({
            "html": html,
            "subjectLine": format!("Your Custom Automation Plan - {}", project.client_name),
            "estimatedValue": matching.total_value,
        }))
    }
}

fn build_user_prompt(project: &Project, matching: &ChallengeMatch) -> String {
    let challenges_formatted = project
        .current_challenges
        .as_deref()
        .map(|text| {
            split_challenges(Some(text))
                .iter()
                .map(|c| format!("- {}", c))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_else(|| "- General automation needs".to_string());

    let templates_formatted = if matching.matched_templates.is_empty() {
        "1. Custom Automation (scoped after discovery)".to_string()
    } else {
        matching
            .matched_templates
            .iter()
            .enumerate()
            .map(|(i, t)| {
                format!(
                    "{}. {} ({:.0})",
                    i + 1,
                    t.category.replace('_', " "),
                    t.base_price
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Write a project proposal for this client:\n\n\
         Client: {}\n\n\
         Their Current Challenges:\n{}\n\n\
         We will build the following automation systems:\n{}\n\n\
         Total Investment: {:.0}\n\
         Timeline: {} weeks\n\n\
         The proposal must include: an executive summary acknowledging their pain points, \
         a section showing we understand their business, the proposed solution per automation \
         system (what it does, how it solves their problem, expected time savings), a \
         week-by-week implementation plan, an investment breakdown with payment terms \
         (50% upfront, 50% on completion), why DeepFlow, and next steps.",
        project.client_name,
        challenges_formatted,
        templates_formatted,
        matching.total_value,
        matching.estimated_weeks,
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
    async fn test_proposal_is_persisted_with_estimate() {
        let repo =
            repo_with_project(Some("Quotes take too long to send")).await;
        let client = Arc::new(ScriptedClient::replying(
            "```html\n<html><body>Proposal</body></html>\n```",
        ));
        let use_case =
            ProposalBuilderUseCase::new(client.clone(), repo.clone(), LLMConfig::default(), None);

        let result = use_case.execute("p1").await.unwrap();
        assert_eq!(result["html"], "<html><body>Proposal</body></html>");
        assert_eq!(result["estimatedValue"], 3500.0);

        let stored = repo.get("p1").await.unwrap().proposal_html.unwrap();
        assert!(stored.contains("Proposal"));

        let prompt = client.last_user.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("quote generation"));
        assert!(prompt.contains("Total Investment: 3500"));
    }

    #[tokio::test]
    async fn test_empty_reply_is_rejected() {
        let repo = repo_with_project(None).await;
        let client = Arc::new(ScriptedClient::replying("   "));
        let use_case = ProposalBuilderUseCase::new(client, repo.clone(), LLMConfig::default(), None);

        let err = use_case.execute("p1").await.unwrap_err();
        assert!(matches!(err, AppError::LLMError(_)));
        assert!(repo.get("p1").await.unwrap().proposal_html.is_none());
    }

    #[tokio::test]
    async fn test_unknown_project_is_not_found() {
        let repo = Arc::new(ProjectRepository::new(init_test_db().await));
        let client = Arc::new(ScriptedClient::replying("<html></html>"));
        let use_case = ProposalBuilderUseCase::new(client, repo, LLMConfig::default(), None);

        let err = use_case.execute("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
