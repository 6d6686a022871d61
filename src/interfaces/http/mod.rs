use crate::application::use_cases::advisor::IdeaContext;
use crate::application::use_cases::{
    AdvisorChatUseCase, BuildGuideBuilderUseCase, DashboardBuilderUseCase, IntakeUseCase,
    MockupGeneratorUseCase, ProposalBuilderUseCase, WorkflowBuilderUseCase,
};
use crate::domain::chat::ChatMessage;
use crate::domain::error::AppError;
use crate::domain::project::{IntakeForm, ProjectStatus};
use crate::domain::task::TaskStatus;
use crate::infrastructure::db::ideas::IdeaRepository;
use crate::infrastructure::db::projects::ProjectRepository;
use crate::infrastructure::db::tasks::TaskRepository;
use crate::infrastructure::llm_clients::ByteStream;
use crate::infrastructure::sheets::{GoogleSheetsClient, SheetsConfig};
use actix_cors::Cors;
use actix_web::{
    delete, dev::Server, get, patch, post, web, App, HttpResponse, HttpServer, Responder,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct AppState {
    pub intake_use_case: IntakeUseCase,
    pub workflow_builder: WorkflowBuilderUseCase,
    pub dashboard_builder: DashboardBuilderUseCase,
    pub mockup_generator: MockupGeneratorUseCase,
    pub proposal_builder: ProposalBuilderUseCase,
    pub build_guide_builder: BuildGuideBuilderUseCase,
    pub advisor: AdvisorChatUseCase,
    pub projects: Arc<ProjectRepository>,
    pub tasks: Arc<TaskRepository>,
    pub ideas: Arc<IdeaRepository>,
    pub sheets_client: GoogleSheetsClient,
    pub sheets_config: Option<SheetsConfig>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

#[derive(Deserialize)]
pub struct ProjectListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskRequest {
    pub title: String,
    #[serde(default)]
    pub estimated_hours: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdateRequest {
    pub status: Option<String>,
    pub log_hours: Option<f64>,
}

#[derive(Deserialize)]
pub struct NewCommentRequest {
    pub author: Option<String>,
    pub content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupRequest {
    pub style_preference: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorChatRequest {
    pub messages: Vec<ChatMessage>,
    pub current_idea: Option<IdeaContext>,
    pub dashboard_context: Option<String>,
    #[serde(default = "default_stream")]
    pub stream: bool,
}

#[derive(Deserialize)]
pub struct ProjectChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_stream() -> bool {
    true
}

fn error_response(err: &AppError) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    match err {
        AppError::NotFound(_) => HttpResponse::NotFound().json(body),
        AppError::ValidationError(_) => HttpResponse::BadRequest().json(body),
        AppError::MalformedSpec(_) => HttpResponse::UnprocessableEntity().json(body),
        AppError::LLMError(_) => HttpResponse::BadGateway().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

fn sse_relay(stream: ByteStream) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/event-stream")
        .streaming(stream)
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "app": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[get("/projects")]
async fn list_projects(
    data: web::Data<AppState>,
    query: web::Query<ProjectListQuery>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let offset = query.offset.unwrap_or(0).max(0);

    match data
        .projects
        .list(query.status.as_deref(), limit, offset)
        .await
    {
        Ok((total, projects)) => {
            HttpResponse::Ok().json(json!({ "total": total, "projects": projects }))
        }
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Projects",
                &format!("Listing projects failed: {}", e),
            );
            error_response(&e)
        }
    }
}

#[get("/projects/{id}")]
async fn get_project(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match data.projects.get(&path).await {
        Ok(project) => HttpResponse::Ok().json(project),
        Err(e) => error_response(&e),
    }
}

#[post("/intake")]
async fn intake(data: web::Data<AppState>, req: web::Json<IntakeForm>) -> impl Responder {
    let form = req.into_inner();
    add_log(
        &data.logs,
        "INFO",
        "Intake",
        &format!("Intake received for {}", form.client_name),
    );

    match data.intake_use_case.execute(form).await {
        Ok(project) => HttpResponse::Ok().json(project),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Intake",
                &format!("Intake failed: {}", e),
            );
            error_response(&e)
        }
    }
}

#[patch("/projects/{id}/status")]
async fn update_project_status(
    data: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<StatusUpdateRequest>,
) -> impl Responder {
    let status = ProjectStatus::parse_lenient(&req.status);
    match data.projects.update_status(&path, status).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "id": path.as_str(), "status": status })),
        Err(e) => error_response(&e),
    }
}

#[get("/sheets/projects")]
async fn sheets_projects(data: web::Data<AppState>) -> impl Responder {
    let Some(config) = data.sheets_config.as_ref() else {
        return error_response(&AppError::ValidationError(
            "Google Sheets is not configured.".to_string(),
        ));
    };

    match data.sheets_client.fetch_projects(config).await {
        Ok(projects) => {
            add_log(
                &data.logs,
                "INFO",
                "Sheets",
                &format!("Fetched {} projects from sheet", projects.len()),
            );
            HttpResponse::Ok().json(projects)
        }
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Sheets",
                &format!("Sheet fetch failed: {}", e),
            );
            error_response(&e)
        }
    }
}

#[get("/projects/{id}/tasks")]
async fn list_tasks(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match data.tasks.list_tasks(&path).await {
        Ok(tasks) => HttpResponse::Ok().json(tasks),
        Err(e) => error_response(&e),
    }
}

#[post("/projects/{id}/tasks")]
async fn create_task(
    data: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<NewTaskRequest>,
) -> impl Responder {
    if req.title.trim().is_empty() {
        return error_response(&AppError::ValidationError(
            "Task title must not be empty.".to_string(),
        ));
    }
    match data
        .tasks
        .insert_task(&path, &req.title, req.estimated_hours)
        .await
    {
        Ok(task) => HttpResponse::Ok().json(task),
        Err(e) => error_response(&e),
    }
}

#[post("/projects/{id}/tasks/seed")]
async fn seed_tasks(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match data.tasks.seed_default_tasks(&path).await {
        Ok(tasks) => {
            add_log(
                &data.logs,
                "INFO",
                "Tasks",
                &format!("Seeded {} default tasks for project {}", tasks.len(), path),
            );
            HttpResponse::Ok().json(tasks)
        }
        Err(e) => error_response(&e),
    }
}

#[patch("/tasks/{id}")]
async fn update_task(
    data: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<TaskUpdateRequest>,
) -> impl Responder {
    let status = req.status.as_deref().map(TaskStatus::parse_lenient);
    match data.tasks.apply_update(&path, status, req.log_hours).await {
        Ok(task) => HttpResponse::Ok().json(task),
        Err(e) => error_response(&e),
    }
}

#[delete("/tasks/{id}")]
async fn delete_task(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match data.tasks.delete_task(&path).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "deleted": path.as_str() })),
        Err(e) => error_response(&e),
    }
}

#[get("/projects/{id}/comments")]
async fn list_comments(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match data.tasks.list_comments(&path).await {
        Ok(comments) => HttpResponse::Ok().json(comments),
        Err(e) => error_response(&e),
    }
}

#[post("/projects/{id}/comments")]
async fn create_comment(
    data: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<NewCommentRequest>,
) -> impl Responder {
    let author = req.author.as_deref().unwrap_or("Operator");
    match data.tasks.insert_comment(&path, author, &req.content).await {
        Ok(comment) => HttpResponse::Ok().json(comment),
        Err(e) => error_response(&e),
    }
}

#[get("/ideas")]
async fn list_ideas(data: web::Data<AppState>) -> impl Responder {
    match data.ideas.list().await {
        Ok(ideas) => HttpResponse::Ok().json(ideas),
        Err(e) => error_response(&e),
    }
}

#[post("/ideas")]
async fn create_idea(
    data: web::Data<AppState>,
    req: web::Json<crate::domain::idea::IdeaDraft>,
) -> impl Responder {
    match data.ideas.insert(req.into_inner()).await {
        Ok(idea) => HttpResponse::Ok().json(idea),
        Err(e) => error_response(&e),
    }
}

#[patch("/ideas/{id}")]
async fn update_idea(
    data: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<crate::domain::idea::IdeaDraft>,
) -> impl Responder {
    match data.ideas.update(&path, req.into_inner()).await {
        Ok(idea) => HttpResponse::Ok().json(idea),
        Err(e) => error_response(&e),
    }
}

#[delete("/ideas/{id}")]
async fn delete_idea(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match data.ideas.delete(&path).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "deleted": path.as_str() })),
        Err(e) => error_response(&e),
    }
}

#[post("/projects/{id}/generate/workflow")]
async fn generate_workflow(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "WorkflowBuilder",
        &format!("Generating workflow for project {}", path),
    );

    match data.workflow_builder.execute(&path).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "WorkflowBuilder",
                &format!("Workflow generation failed: {}", e),
            );
            error_response(&e)
        }
    }
}

#[post("/projects/{id}/generate/dashboard")]
async fn generate_dashboard(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "DashboardBuilder",
        &format!("Generating dashboard spec for project {}", path),
    );

    match data.dashboard_builder.execute(&path).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "DashboardBuilder",
                &format!("Dashboard generation failed: {}", e),
            );
            error_response(&e)
        }
    }
}

#[post("/projects/{id}/generate/mockup")]
async fn generate_mockup(
    data: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<MockupRequest>,
) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "MockupGenerator",
        &format!("Generating mockup spec for project {}", path),
    );

    match data
        .mockup_generator
        .execute(&path, req.style_preference.as_deref())
        .await
    {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "MockupGenerator",
                &format!("Mockup generation failed: {}", e),
            );
            error_response(&e)
        }
    }
}

#[post("/projects/{id}/generate/proposal")]
async fn generate_proposal(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "ProposalBuilder",
        &format!("Generating proposal for project {}", path),
    );

    match data.proposal_builder.execute(&path).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "ProposalBuilder",
                &format!("Proposal generation failed: {}", e),
            );
            error_response(&e)
        }
    }
}

#[post("/projects/{id}/generate/build-guide")]
async fn generate_build_guide(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "BuildGuideBuilder",
        &format!("Generating build guide for project {}", path),
    );

    match data.build_guide_builder.execute(&path).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "BuildGuideBuilder",
                &format!("Build guide generation failed: {}", e),
            );
            error_response(&e)
        }
    }
}

#[post("/chat/advisor")]
async fn advisor_chat(
    data: web::Data<AppState>,
    req: web::Json<AdvisorChatRequest>,
) -> impl Responder {
    let req = req.into_inner();
    add_log(
        &data.logs,
        "INFO",
        "Advisor",
        &format!(
            "Advisor chat ({} messages, stream={})",
            req.messages.len(),
            req.stream
        ),
    );

    if req.stream {
        match data
            .advisor
            .stream(
                &req.messages,
                req.current_idea.as_ref(),
                req.dashboard_context.as_deref(),
            )
            .await
        {
            Ok(stream) => sse_relay(stream),
            Err(e) => error_response(&e),
        }
    } else {
        match data
            .advisor
            .complete(
                &req.messages,
                req.current_idea.as_ref(),
                req.dashboard_context.as_deref(),
            )
            .await
        {
            Ok(message) => HttpResponse::Ok().json(json!({ "message": message })),
            Err(e) => error_response(&e),
        }
    }
}

#[post("/projects/{id}/chat")]
async fn project_chat(
    data: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<ProjectChatRequest>,
) -> impl Responder {
    let project = match data.projects.get(&path).await {
        Ok(project) => project,
        Err(e) => return error_response(&e),
    };
    let req = req.into_inner();

    if req.stream {
        match data.advisor.stream_project_boss(&project, &req.messages).await {
            Ok(stream) => sse_relay(stream),
            Err(e) => error_response(&e),
        }
    } else {
        match data
            .advisor
            .complete_project_boss(&project, &req.messages)
            .await
        {
            Ok(message) => HttpResponse::Ok().json(json!({ "message": message })),
            Err(e) => error_response(&e),
        }
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<AppState>) -> impl Responder {
    let logs = data.logs.lock().unwrap().clone();
    HttpResponse::Ok().json(logs)
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap();
    logs.push(entry.clone());
    if logs.len() > 100 {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

pub fn start_server(state: Arc<AppState>, host: &str, port: u16) -> std::io::Result<Server> {
    let state = web::Data::from(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new().wrap(cors).app_data(state.clone()).service(
            web::scope("/api")
                .service(health)
                .service(list_projects)
                .service(intake)
                .service(sheets_projects)
                .service(update_project_status)
                .service(seed_tasks)
                .service(create_task)
                .service(list_tasks)
                .service(update_task)
                .service(delete_task)
                .service(create_comment)
                .service(list_comments)
                .service(list_ideas)
                .service(create_idea)
                .service(update_idea)
                .service(delete_idea)
                .service(generate_workflow)
                .service(generate_dashboard)
                .service(generate_mockup)
                .service(generate_proposal)
                .service(generate_build_guide)
                .service(project_chat)
                .service(advisor_chat)
                .service(get_project),
        )
    })
    .bind((host, port))?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_ring_is_capped_at_100() {
        let logs = Mutex::new(Vec::new());
        for i in 0..150 {
            add_log(&logs, "INFO", "Test", &format!("entry {}", i));
        }
        let logs = logs.lock().unwrap();
        assert_eq!(logs.len(), 100);
        assert_eq!(logs[0].message, "entry 50");
        assert_eq!(logs[99].message, "entry 149");
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (AppError::NotFound("x".into()), 404),
            (AppError::ValidationError("x".into()), 400),
            (AppError::MalformedSpec("x".into()), 422),
            (AppError::LLMError("x".into()), 502),
            (AppError::DatabaseError("x".into()), 500),
        ];
        for (err, expected) in cases {
            assert_eq!(error_response(&err).status().as_u16(), expected);
        }
    }

    #[test]
    fn test_chat_request_defaults_to_streaming() {
        let req: AdvisorChatRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert!(req.stream);
        assert!(req.current_idea.is_none());
    }
}
