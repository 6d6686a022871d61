use crate::domain::error::{AppError, Result};
use crate::domain::idea::{Idea, IdeaDraft, IdeaPriority, IdeaStatus};
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct IdeaRepository {
    pool: SqlitePool,
}

impl IdeaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, draft: IdeaDraft) -> Result<Idea> {
        let now = chrono::Utc::now().timestamp();
        let idea = Idea {
            id: Uuid::new_v4().to_string(),
            title: draft.title.unwrap_or_else(|| "Untitled Idea".to_string()),
            content: draft.content,
            category: draft.category.unwrap_or_else(|| "general".to_string()),
            priority: draft.priority.unwrap_or(IdeaPriority::Medium),
            status: draft.status.unwrap_or(IdeaStatus::Idea),
            tags: draft.tags.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO ideas (id, title, content, category, priority, status, tags, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&idea.id)
        .bind(&idea.title)
        .bind(&idea.content)
        .bind(&idea.category)
        .bind(priority_str(idea.priority))
        .bind(status_str(idea.status))
        .bind(tags_json(&idea.tags)?)
        .bind(idea.created_at)
        .bind(idea.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert idea: {}", e)))?;

        Ok(idea)
    }

    pub async fn get(&self, idea_id: &str) -> Result<Idea> {
        let idea = sqlx::query_as::<_, IdeaEntity>(
            "SELECT id, title, content, category, priority, status, tags, created_at, updated_at
             FROM ideas WHERE id = ?",
        )
        .bind(idea_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch idea: {}", e)))?;

        match idea {
            Some(idea) => Ok(idea.into()),
            None => Err(AppError::NotFound(format!("Idea not found: {}", idea_id))),
        }
    }

    pub async fn list(&self) -> Result<Vec<Idea>> {
        let ideas = sqlx::query_as::<_, IdeaEntity>(
            "SELECT id, title, content, category, priority, status, tags, created_at, updated_at
             FROM ideas ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list ideas: {}", e)))?;

        Ok(ideas.into_iter().map(|i| i.into()).collect())
    }

    pub async fn update(&self, idea_id: &str, draft: IdeaDraft) -> Result<Idea> {
        let mut idea = self.get(idea_id).await?;

        if let Some(title) = draft.title {
            idea.title = title;
        }
        if let Some(content) = draft.content {
            idea.content = Some(content);
        }
        if let Some(category) = draft.category {
            idea.category = category;
        }
        if let Some(priority) = draft.priority {
            idea.priority = priority;
        }
        if let Some(status) = draft.status {
            idea.status = status;
        }
        if let Some(tags) = draft.tags {
            idea.tags = tags;
        }
        idea.updated_at = chrono::Utc::now().timestamp();

        sqlx::query(
            "UPDATE ideas SET title = ?, content = ?, category = ?, priority = ?, status = ?, tags = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&idea.title)
        .bind(&idea.content)
        .bind(&idea.category)
        .bind(priority_str(idea.priority))
        .bind(status_str(idea.status))
        .bind(tags_json(&idea.tags)?)
        .bind(idea.updated_at)
        .bind(idea_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update idea: {}", e)))?;

        Ok(idea)
    }

    pub async fn delete(&self, idea_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM ideas WHERE id = ?")
            .bind(idea_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete idea: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Idea not found: {}", idea_id)));
        }
        Ok(())
    }
}

fn priority_str(priority: IdeaPriority) -> &'static str {
    match priority {
        IdeaPriority::Low => "low",
        IdeaPriority::Medium => "medium",
        IdeaPriority::High => "high",
    }
}

fn status_str(status: IdeaStatus) -> &'static str {
    match status {
        IdeaStatus::Idea => "idea",
        IdeaStatus::Planning => "planning",
        IdeaStatus::InProgress => "in_progress",
        IdeaStatus::Completed => "completed",
        IdeaStatus::Archived => "archived",
    }
}

fn tags_json(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags)
        .map_err(|e| AppError::ParseError(format!("Failed to serialize tags: {}", e)))
}

#[derive(sqlx::FromRow)]
struct IdeaEntity {
    id: String,
    title: String,
    content: Option<String>,
    category: String,
    priority: String,
    status: String,
    tags: String,
    created_at: i64,
    updated_at: i64,
}

impl From<IdeaEntity> for Idea {
    fn from(e: IdeaEntity) -> Self {
        Self {
            id: e.id,
            title: e.title,
            content: e.content,
            category: e.category,
            priority: match e.priority.as_str() {
                "low" => IdeaPriority::Low,
                "high" => IdeaPriority::High,
                _ => IdeaPriority::Medium,
            },
            status: match e.status.as_str() {
                "planning" => IdeaStatus::Planning,
                "in_progress" => IdeaStatus::InProgress,
                "completed" => IdeaStatus::Completed,
                "archived" => IdeaStatus::Archived,
                _ => IdeaStatus::Idea,
            },
            tags: serde_json::from_str(&e.tags).unwrap_or_default(),
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}
