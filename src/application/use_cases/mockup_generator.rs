use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::project::Project;
use crate::infrastructure::db::projects::{GeneratedOutput, ProjectRepository};
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::extract_json_object;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a Mockup Generator Agent that creates detailed UI \
mockup specifications from project proposals. Analyze the project context and generate a \
comprehensive mockup specification with multiple page layouts, three style variations (modern, \
bold, professional) with color schemes, realistic placeholder content matching the business, \
and interactive element definitions. Output ONLY a single valid JSON object with top-level \
\"projectName\", \"description\", \"styleVariations\" (array), \"pages\" (array), \
\"globalComponents\" (array), \"suggestedImages\" (array) and \"userFlows\" (array) fields.";

/// Mockup proposal excerpts are capped so a long proposal cannot blow the
/// prompt budget.
const PROPOSAL_EXCERPT_CHARS: usize = 2000;

pub struct MockupGeneratorUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    projects: Arc<ProjectRepository>,
    config: LLMConfig,
    system_prompt: Option<String>,
}

impl MockupGeneratorUseCase {
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

    pub async fn execute(
        &self,
        project_id: &str,
        style_preference: Option<&str>,
    ) -> Result<serde_json::Value> {
        let project = self.projects.get(project_id).await?;
        let user_prompt = build_user_prompt(&project, style_preference);

        let system = self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let raw = self
            .llm_client
            .generate(&self.config, system, &user_prompt)
            .await?;

        let spec = extract_json_object(&raw)?;

        if !spec["pages"].is_array() {
            return Err(AppError::MalformedSpec(
                "Invalid mockup spec: missing pages array".to_string(),
            ));
        }

        info!(
            project_id,
            pages = spec["pages"].as_array().map(|p| p.len()).unwrap_or(0),
            "Generated mockup spec"
        );

        let pretty = serde_json::to_string_pretty(&spec)
            .map_err(|e| AppError::ParseError(format!("Failed to serialize spec: {}", e)))?;
        self.projects
            .save_generated(project_id, GeneratedOutput::Mockup, &pretty)
            .await?;

        Ok(json!({ "spec": spec }))
    }
}

fn build_user_prompt(project: &Project, style_preference: Option<&str>) -> String {
    let proposal_excerpt = project
        .proposal_html
        .as_deref()
        .map(|html| {
            let excerpt: String = html.chars().take(PROPOSAL_EXCERPT_CHARS).collect();
            format!("Proposal Content:\n{}", excerpt)
        })
        .unwrap_or_default();

    let style_line = style_preference
        .map(|style| format!("Preferred Style: {}", style))
        .unwrap_or_else(|| "Generate all 3 style variations.".to_string());

    format!(
        "Create a mockup specification for this project:\n\n\
         Client: {}\n\
         Industry: {}\n\
         Team Size: {}\n\n\
         Current Challenges:\n{}\n\n\
         Current Process:\n{}\n\n\
         Desired Outcomes:\n{}\n\n\
         Additional Notes:\n{}\n\n\
         {}\n\n\
         {}\n\n\
         Generate a comprehensive mockup specification with realistic content that matches \
         this business. Include at least 3-4 pages and multiple component types.",
        project.client_name,
        project.industry.as_deref().unwrap_or("Not specified"),
        project.team_size.as_deref().unwrap_or("Not specified"),
        project.current_challenges.as_deref().unwrap_or("Not specified"),
        project.current_process.as_deref().unwrap_or("Not specified"),
        project.desired_outcomes.as_deref().unwrap_or("Not specified"),
        project.notes.as_deref().unwrap_or("None"),
        proposal_excerpt,
        style_line,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::init_test_db;
    use crate::infrastructure::llm_clients::testing::ScriptedClient;

    async fn repo_with_project(proposal: Option<&str>) -> Arc<ProjectRepository> {
        let repo = Arc::new(ProjectRepository::new(init_test_db().await));
        let mut project = Project::new(
            "p1".to_string(),
            "2026-01-01T00:00:00Z".to_string(),
            "Oak & Sons".to_string(),
            "ops@oak.example".to_string(),
        );
        project.proposal_html = proposal.map(|p| p.to_string());
        repo.insert(&project).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_mockup_spec_is_persisted() {
        let repo = repo_with_project(None).await;
        let client = Arc::new(ScriptedClient::replying(
            "```json\n{\"projectName\":\"Oak\",\"pages\":[{\"name\":\"Home\"}]}\n```",
        ));
        let use_case = MockupGeneratorUseCase::new(client, repo.clone(), LLMConfig::default(), None);

        let result = use_case.execute("p1", None).await.unwrap();
        assert_eq!(result["spec"]["projectName"], "Oak");
        assert!(repo.get("p1").await.unwrap().mockup_spec.is_some());
    }

    #[tokio::test]
    async fn test_style_preference_reaches_prompt() {
        let repo = repo_with_project(None).await;
        let client = Arc::new(ScriptedClient::replying("{\"pages\":[]}"));
        let use_case =
            MockupGeneratorUseCase::new(client.clone(), repo, LLMConfig::default(), None);

        use_case.execute("p1", Some("bold")).await.unwrap();
        let prompt = client.last_user.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Preferred Style: bold"));
    }

    #[tokio::test]
    async fn test_missing_pages_is_rejected() {
        let repo = repo_with_project(None).await;
        let client = Arc::new(ScriptedClient::replying("{\"projectName\":\"Oak\"}"));
        let use_case = MockupGeneratorUseCase::new(client, repo, LLMConfig::default(), None);

        let err = use_case.execute("p1", None).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedSpec(_)));
    }

    #[test]
    fn test_proposal_excerpt_is_capped() {
        let mut project = Project::new(
            "p1".to_string(),
            "t".to_string(),
            "Oak".to_string(),
            "e".to_string(),
        );
        project.proposal_html = Some("x".repeat(10_000));
        let prompt = build_user_prompt(&project, None);
        assert!(prompt.len() < 6_000);
    }
}
