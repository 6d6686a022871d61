use std::sync::{Arc, Mutex};

use tracing::info;

use crate::application::use_cases::{
    AdvisorChatUseCase, BuildGuideBuilderUseCase, DashboardBuilderUseCase, IntakeUseCase,
    MockupGeneratorUseCase, ProposalBuilderUseCase, WorkflowBuilderUseCase,
};
use crate::domain::error::Result;
use crate::infrastructure::config::Settings;
use crate::infrastructure::db::connection::{db_path_to_url, init_db};
use crate::infrastructure::db::ideas::IdeaRepository;
use crate::infrastructure::db::projects::ProjectRepository;
use crate::infrastructure::db::tasks::TaskRepository;
use crate::infrastructure::llm_clients::gateway::GatewayClient;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::sheets::GoogleSheetsClient;
use crate::interfaces::http::AppState;

/// Wires the database, gateway client, and use cases into the shared state
/// the HTTP layer serves from.
pub async fn build_state(settings: &Settings) -> Result<Arc<AppState>> {
    let db_url = db_path_to_url(&settings.database.path);
    let pool = init_db(&db_url).await?;
    info!(path = %settings.database.path, "Database ready");

    let projects = Arc::new(ProjectRepository::new(pool.clone()));
    let tasks = Arc::new(TaskRepository::new(pool.clone()));
    let ideas = Arc::new(IdeaRepository::new(pool));

    let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(GatewayClient::new());
    let gateway = settings.gateway.clone();

    Ok(Arc::new(AppState {
        intake_use_case: IntakeUseCase::new(projects.clone()),
        workflow_builder: WorkflowBuilderUseCase::new(
            llm_client.clone(),
            projects.clone(),
            gateway.clone(),
            settings.prompts.workflow.clone(),
        ),
        dashboard_builder: DashboardBuilderUseCase::new(
            llm_client.clone(),
            projects.clone(),
            gateway.clone(),
            settings.prompts.dashboard.clone(),
        ),
        mockup_generator: MockupGeneratorUseCase::new(
            llm_client.clone(),
            projects.clone(),
            gateway.clone(),
            settings.prompts.mockup.clone(),
        ),
        proposal_builder: ProposalBuilderUseCase::new(
            llm_client.clone(),
            projects.clone(),
            gateway.clone(),
            settings.prompts.proposal.clone(),
        ),
        build_guide_builder: BuildGuideBuilderUseCase::new(
            llm_client.clone(),
            projects.clone(),
            gateway.clone(),
            settings.prompts.build_guide.clone(),
        ),
        advisor: AdvisorChatUseCase::new(llm_client, gateway),
        projects,
        tasks,
        ideas,
        sheets_client: GoogleSheetsClient::new(),
        sheets_config: settings.sheets.clone(),
        logs: Arc::new(Mutex::new(Vec::new())),
    }))
}
