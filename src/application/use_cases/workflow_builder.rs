use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::project::Project;
use crate::infrastructure::db::projects::{GeneratedOutput, ProjectRepository};
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::extract_json_object;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const DEFAULT_SYSTEM_PROMPT: &str = "You are an n8n workflow architect for an automation agency. \
Design production-ready n8n workflows that solve the client's stated challenges. \
Output ONLY a single valid n8n workflow JSON object with top-level \"name\", \"nodes\" (array) \
and \"connections\" (object) fields. Do not include any explanations.";

pub struct WorkflowBuilderUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    projects: Arc<ProjectRepository>,
    config: LLMConfig,
    system_prompt: Option<String>,
}

impl WorkflowBuilderUseCase {
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

    /// Generates an n8n workflow for the project, validates its shape, and
    /// stores the pretty-printed JSON on the project row.
    pub async fn execute(&self, project_id: &str) -> Result<serde_json::Value> {
        let project = self.projects.get(project_id).await?;
        let user_prompt = build_user_prompt(&project);

        let system = self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let raw = self
            .llm_client
            .generate(&self.config, system, &user_prompt)
            .await?;

        let mut workflow = extract_json_object(&raw)?;

        if !workflow["nodes"].is_array() {
            return Err(AppError::MalformedSpec(
                "Invalid workflow: missing nodes array".to_string(),
            ));
        }
        if workflow.get("connections").is_none() {
            workflow["connections"] = json!({});
        }

        info!(
            project_id,
            nodes = workflow["nodes"].as_array().map(|n| n.len()).unwrap_or(0),
            "Generated workflow"
        );

        let pretty = serde_json::to_string_pretty(&workflow)
            .map_err(|e| AppError::ParseError(format!("Failed to serialize workflow: {}", e)))?;
        self.projects
            .save_generated(project_id, GeneratedOutput::Workflow, &pretty)
            .await?;

        Ok(json!({ "workflow": workflow, "raw": pretty }))
    }
}

fn build_user_prompt(project: &Project) -> String {
    format!(
        "Create an n8n automation workflow for this client:\n\n\
         ## Client Information\n\
         - **Client Name**: {}\n\
         - **Industry**: {}\n\
         - **Team Size**: {}\n\n\
         ## Current Challenges\n{}\n\n\
         ## Current Process\n{}\n\n\
         ## Desired Outcomes\n{}\n\n\
         ## Additional Context\n{}\n\n\
         Generate a complete n8n workflow JSON that addresses these challenges and achieves the desired outcomes.",
        project.client_name,
        project.industry.as_deref().unwrap_or("Not specified"),
        project.team_size.as_deref().unwrap_or("Not specified"),
        project
            .current_challenges
            .as_deref()
            .unwrap_or("No specific challenges mentioned"),
        project
            .current_process
            .as_deref()
            .unwrap_or("No current process described"),
        project
            .desired_outcomes
            .as_deref()
            .unwrap_or("General automation and efficiency improvements"),
        project.notes.as_deref().unwrap_or("No additional notes"),
    )
}
