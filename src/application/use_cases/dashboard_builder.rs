use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::project::Project;
use crate::infrastructure::db::projects::{GeneratedOutput, ProjectRepository};
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::extract_json_object;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a dashboard architect for an automation agency. \
Design client-facing dashboards that give visibility and control over automated processes. \
Output ONLY a single valid JSON object with top-level \"appName\", \"description\", \"theme\", \
\"pages\" (array), \"dataConnections\" (array) and \"features\" (array) fields. \
Do not include any explanations.";

pub struct DashboardBuilderUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    projects: Arc<ProjectRepository>,
    config: LLMConfig,
    system_prompt: Option<String>,
}

impl DashboardBuilderUseCase {
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

    /// Generates a dashboard spec for the project. An existing workflow on
    /// the project is summarized into the prompt so the dashboard visualizes
    /// the data actually flowing through it.
    pub async fn execute(&self, project_id: &str) -> Result<serde_json::Value> {
        let project = self.projects.get(project_id).await?;
        let user_prompt = build_user_prompt(&project);

        let system = self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let raw = self
            .llm_client
            .generate(&self.config, system, &user_prompt)
            .await?;

        let mut spec = extract_json_object(&raw)?;

        if spec.get("appName").and_then(|v| v.as_str()).is_none() {
            spec["appName"] = json!(format!("{} Dashboard", project.client_name));
        }
        if !spec["pages"].is_array() {
            return Err(AppError::MalformedSpec(
                "Invalid spec: missing pages array".to_string(),
            ));
        }

        info!(
            project_id,
            pages = spec["pages"].as_array().map(|p| p.len()).unwrap_or(0),
            "Generated dashboard spec"
        );

        let pretty = serde_json::to_string_pretty(&spec)
            .map_err(|e| AppError::ParseError(format!("Failed to serialize spec: {}", e)))?;
        self.projects
            .save_generated(project_id, GeneratedOutput::Dashboard, &pretty)
            .await?;

        Ok(json!({ "spec": spec }))
    }
}

fn build_user_prompt(project: &Project) -> String {
    format!(
        "Design a client dashboard for this automation project:\n\n\
         ## Client Information\n\
         - **Client Name**: {}\n\
         - **Industry**: {}\n\
         - **Team Size**: {}\n\n\
         ## Current Challenges\n{}\n\n\
         ## Current Process\n{}\n\n\
         ## Desired Outcomes\n{}\n\n\
         ## Additional Context\n{}\n\n\
         {}\n\n\
         Generate a complete dashboard specification JSON that addresses these needs \
         and provides the client with visibility and control over their automated processes.",
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
        workflow_analysis(project.workflow_json.as_deref()),
    )
}

/// Summary of the stored workflow for the prompt. A missing or unparseable
/// workflow downgrades to a general-purpose dashboard request.
fn workflow_analysis(workflow_json: Option<&str>) -> String {
    let fallback =
        "## No workflow available yet - design a general-purpose dashboard based on client needs."
            .to_string();

    let Some(raw) = workflow_json else {
        return fallback;
    };
    let Ok(workflow) = serde_json::from_str::<serde_json::Value>(raw) else {
        return fallback;
    };

    let nodes = workflow["nodes"].as_array().cloned().unwrap_or_default();
    let mut node_types: Vec<String> = nodes
        .iter()
        .filter_map(|n| n["type"].as_str().map(|t| t.to_string()))
        .collect();
    node_types.sort();
    node_types.dedup();
    let node_names: Vec<String> = nodes
        .iter()
        .filter_map(|n| n["name"].as_str().map(|t| t.to_string()))
        .collect();

    format!(
        "## Existing Workflow Analysis\n\
         - **Workflow Name**: {}\n\
         - **Node Count**: {}\n\
         - **Node Types**: {}\n\
         - **Node Names**: {}\n\n\
         Based on these nodes, design dashboard components that visualize the data flowing through this workflow.",
        workflow["name"].as_str().unwrap_or("Unnamed"),
        nodes.len(),
        node_types.join(", "),
        node_names.join(", "),
    )
}
