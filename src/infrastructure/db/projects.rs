use crate::domain::error::{AppError, Result};
use crate::domain::project::{Project, ProjectStatus};
use sqlx::SqlitePool;

/// Which generated artifact to store on a project row.
#[derive(Debug, Clone, Copy)]
pub enum GeneratedOutput {
    Workflow,
    Dashboard,
    Mockup,
    Proposal,
    BuildGuide,
}

pub struct ProjectRepository {
    pool: SqlitePool,
}

impl ProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, project: &Project) -> Result<()> {
        sqlx::query(
            "INSERT INTO projects (
                id, timestamp, client_name, client_email, status, lead_score,
                revenue_value, phase, notes, contact_name, phone_number,
                industry, team_size, current_challenges, current_process,
                desired_outcomes, proposal_html, build_guide_markdown,
                workflow_json, dashboard_spec, mockup_spec
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&project.id)
        .bind(&project.timestamp)
        .bind(&project.client_name)
        .bind(&project.client_email)
        .bind(project.status.as_str())
        .bind(project.lead_score)
        .bind(project.revenue_value)
        .bind(&project.phase)
        .bind(&project.notes)
        .bind(&project.contact_name)
        .bind(&project.phone_number)
        .bind(&project.industry)
        .bind(&project.team_size)
        .bind(&project.current_challenges)
        .bind(&project.current_process)
        .bind(&project.desired_outcomes)
        .bind(&project.proposal_html)
        .bind(&project.build_guide_markdown)
        .bind(&project.workflow_json)
        .bind(&project.dashboard_spec)
        .bind(&project.mockup_spec)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert project: {}", e)))?;

        Ok(())
    }

    pub async fn get(&self, project_id: &str) -> Result<Project> {
        let entity = sqlx::query_as::<_, ProjectEntity>("SELECT * FROM projects WHERE id = ?")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to fetch project: {}", e)))?;

        match entity {
            Some(entity) => Ok(entity.into()),
            None => Err(AppError::NotFound(format!(
                "Project not found: {}",
                project_id
            ))),
        }
    }

    pub async fn list(
        &self,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(i64, Vec<Project>)> {
        let (total, entities) = match status {
            Some(status) => {
                let status = ProjectStatus::parse_lenient(status);
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE status = ?")
                    .bind(status.as_str())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| AppError::DatabaseError(format!("Failed to count projects: {}", e)))?;
                let entities = sqlx::query_as::<_, ProjectEntity>(
                    "SELECT * FROM projects WHERE status = ?
                     ORDER BY timestamp DESC LIMIT ? OFFSET ?",
                )
                .bind(status.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to list projects: {}", e)))?;
                (total, entities)
            }
            None => {
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| AppError::DatabaseError(format!("Failed to count projects: {}", e)))?;
                let entities = sqlx::query_as::<_, ProjectEntity>(
                    "SELECT * FROM projects ORDER BY timestamp DESC LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to list projects: {}", e)))?;
                (total, entities)
            }
        };

        Ok((total, entities.into_iter().map(|e| e.into()).collect()))
    }

    pub async fn update_status(&self, project_id: &str, status: ProjectStatus) -> Result<()> {
        let result = sqlx::query("UPDATE projects SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update status: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Project not found: {}",
                project_id
            )));
        }
        Ok(())
    }

    pub async fn save_generated(
        &self,
        project_id: &str,
        output: GeneratedOutput,
        value: &str,
    ) -> Result<()> {
        let query = match output {
            GeneratedOutput::Workflow => "UPDATE projects SET workflow_json = ? WHERE id = ?",
            GeneratedOutput::Dashboard => "UPDATE projects SET dashboard_spec = ? WHERE id = ?",
            GeneratedOutput::Mockup => "UPDATE projects SET mockup_spec = ? WHERE id = ?",
            GeneratedOutput::Proposal => "UPDATE projects SET proposal_html = ? WHERE id = ?",
            GeneratedOutput::BuildGuide => {
                "UPDATE projects SET build_guide_markdown = ? WHERE id = ?"
            }
        };

        let result = sqlx::query(query)
            .bind(value)
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to save generated output: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Project not found: {}",
                project_id
            )));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ProjectEntity {
    id: String,
    timestamp: String,
    client_name: String,
    client_email: String,
    status: String,
    lead_score: i64,
    revenue_value: f64,
    phase: String,
    notes: Option<String>,
    contact_name: Option<String>,
    phone_number: Option<String>,
    industry: Option<String>,
    team_size: Option<String>,
    current_challenges: Option<String>,
    current_process: Option<String>,
    desired_outcomes: Option<String>,
    proposal_html: Option<String>,
    build_guide_markdown: Option<String>,
    workflow_json: Option<String>,
    dashboard_spec: Option<String>,
    mockup_spec: Option<String>,
}

impl From<ProjectEntity> for Project {
    fn from(e: ProjectEntity) -> Self {
        Self {
            id: e.id,
            timestamp: e.timestamp,
            client_name: e.client_name,
            client_email: e.client_email,
            status: ProjectStatus::parse_lenient(&e.status),
            lead_score: e.lead_score,
            revenue_value: e.revenue_value,
            phase: e.phase,
            notes: e.notes,
            contact_name: e.contact_name,
            phone_number: e.phone_number,
            industry: e.industry,
            team_size: e.team_size,
            current_challenges: e.current_challenges,
            current_process: e.current_process,
            desired_outcomes: e.desired_outcomes,
            proposal_html: e.proposal_html,
            build_guide_markdown: e.build_guide_markdown,
            workflow_json: e.workflow_json,
            dashboard_spec: e.dashboard_spec,
            mockup_spec: e.mockup_spec,
        }
    }
}
