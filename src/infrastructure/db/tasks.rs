use crate::domain::error::{AppError, Result};
use crate::domain::task::{default_task_titles, Comment, Task, TaskStatus};
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_task(
        &self,
        project_id: &str,
        title: &str,
        estimated_hours: f64,
    ) -> Result<Task> {
        let task = Task {
            task_id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            title: title.to_string(),
            status: TaskStatus::Todo,
            estimated_hours,
            hours_logged: 0.0,
            created_at: chrono::Utc::now().timestamp(),
        };

        sqlx::query(
            "INSERT INTO tasks (task_id, project_id, title, status, estimated_hours, hours_logged, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.task_id)
        .bind(&task.project_id)
        .bind(&task.title)
        .bind(task.status.as_str())
        .bind(task.estimated_hours)
        .bind(task.hours_logged)
        .bind(task.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert task: {}", e)))?;

        Ok(task)
    }

    /// Seeds the default build plan. Refused when the project already has
    /// tasks, so a double click cannot duplicate the template.
    pub async fn seed_default_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        let existing = self.list_tasks(project_id).await?;
        if !existing.is_empty() {
            return Err(AppError::ValidationError(
                "Project already has tasks.".to_string(),
            ));
        }

        let mut created = Vec::new();
        for (title, estimated_hours) in default_task_titles() {
            created.push(self.insert_task(project_id, title, estimated_hours).await?);
        }
        Ok(created)
    }

    pub async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, TaskEntity>(
            "SELECT task_id, project_id, title, status, estimated_hours, hours_logged, created_at
             FROM tasks WHERE project_id = ? ORDER BY created_at ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list tasks: {}", e)))?;

        Ok(tasks.into_iter().map(|t| t.into()).collect())
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        let task = sqlx::query_as::<_, TaskEntity>(
            "SELECT task_id, project_id, title, status, estimated_hours, hours_logged, created_at
             FROM tasks WHERE task_id = ?",
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch task: {}", e)))?;

        match task {
            Some(task) => Ok(task.into()),
            None => Err(AppError::NotFound(format!("Task not found: {}", task_id))),
        }
    }

    /// Applies a status change and/or an hour increment in one statement, so
    /// a rejected update leaves the task untouched.
    pub async fn apply_update(
        &self,
        task_id: &str,
        status: Option<TaskStatus>,
        log_hours: Option<f64>,
    ) -> Result<Task> {
        if status.is_none() && log_hours.is_none() {
            return Err(AppError::ValidationError(
                "Provide a status or logged hours to update.".to_string(),
            ));
        }
        if let Some(hours) = log_hours {
            if hours <= 0.0 || !hours.is_finite() {
                return Err(AppError::ValidationError(
                    "Logged hours must be a positive number.".to_string(),
                ));
            }
        }

        let result = sqlx::query(
            "UPDATE tasks SET status = COALESCE(?, status),
                              hours_logged = hours_logged + ?
             WHERE task_id = ?",
        )
        .bind(status.map(|s| s.as_str()))
        .bind(log_hours.unwrap_or(0.0))
        .bind(task_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update task: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Task not found: {}", task_id)));
        }
        self.get_task(task_id).await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE task_id = ?")
            .bind(task_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete task: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Task not found: {}", task_id)));
        }
        Ok(())
    }

    pub async fn insert_comment(
        &self,
        project_id: &str,
        author: &str,
        content: &str,
    ) -> Result<Comment> {
        if content.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Comment content must not be empty.".to_string(),
            ));
        }

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            author: author.to_string(),
            content: content.to_string(),
            created_at: chrono::Utc::now().timestamp(),
        };

        sqlx::query(
            "INSERT INTO comments (id, project_id, author, content, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&comment.id)
        .bind(&comment.project_id)
        .bind(&comment.author)
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert comment: {}", e)))?;

        Ok(comment)
    }

    pub async fn list_comments(&self, project_id: &str) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, CommentEntity>(
            "SELECT id, project_id, author, content, created_at
             FROM comments WHERE project_id = ? ORDER BY created_at DESC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list comments: {}", e)))?;

        Ok(comments.into_iter().map(|c| c.into()).collect())
    }
}

#[derive(sqlx::FromRow)]
struct TaskEntity {
    task_id: String,
    project_id: String,
    title: String,
    status: String,
    estimated_hours: f64,
    hours_logged: f64,
    created_at: i64,
}

impl From<TaskEntity> for Task {
    fn from(e: TaskEntity) -> Self {
        Self {
            task_id: e.task_id,
            project_id: e.project_id,
            title: e.title,
            status: TaskStatus::parse_lenient(&e.status),
            estimated_hours: e.estimated_hours,
            hours_logged: e.hours_logged,
            created_at: e.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentEntity {
    id: String,
    project_id: String,
    author: String,
    content: String,
    created_at: i64,
}

impl From<CommentEntity> for Comment {
    fn from(e: CommentEntity) -> Self {
        Self {
            id: e.id,
            project_id: e.project_id,
            author: e.author,
            content: e.content,
            created_at: e.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::init_test_db;

    #[tokio::test]
    async fn test_task_lifecycle() {
        let repo = TaskRepository::new(init_test_db().await);

        let task = repo.insert_task("p1", "Build core workflow", 8.0).await.unwrap();
        assert_eq!(task.status, TaskStatus::Todo);

        let task = repo
            .apply_update(&task.task_id, Some(TaskStatus::InProgress), None)
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);

        let task = repo.apply_update(&task.task_id, None, Some(2.5)).await.unwrap();
        let task = repo.apply_update(&task.task_id, None, Some(1.5)).await.unwrap();
        assert!((task.hours_logged - 4.0).abs() < f64::EPSILON);

        repo.delete_task(&task.task_id).await.unwrap();
        assert!(repo.list_tasks("p1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_task_unchanged() {
        let repo = TaskRepository::new(init_test_db().await);
        let task = repo.insert_task("p1", "Kickoff", 1.0).await.unwrap();

        let err = repo
            .apply_update(&task.task_id, Some(TaskStatus::Done), Some(-1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let unchanged = repo.get_task(&task.task_id).await.unwrap();
        assert_eq!(unchanged.status, TaskStatus::Todo);
        assert_eq!(unchanged.hours_logged, 0.0);

        let err = repo.apply_update(&task.task_id, None, Some(0.0)).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = repo.apply_update(&task.task_id, None, None).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_status_and_hours_apply_together() {
        let repo = TaskRepository::new(init_test_db().await);
        let task = repo.insert_task("p1", "Kickoff", 1.0).await.unwrap();

        let task = repo
            .apply_update(&task.task_id, Some(TaskStatus::Done), Some(3.0))
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        assert!((task.hours_logged - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_seed_default_tasks_once() {
        let repo = TaskRepository::new(init_test_db().await);

        let created = repo.seed_default_tasks("p1").await.unwrap();
        assert_eq!(created.len(), 12);

        let err = repo.seed_default_tasks("p1").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        // Seeding is per project.
        assert_eq!(repo.seed_default_tasks("p2").await.unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_comments_newest_first() {
        let repo = TaskRepository::new(init_test_db().await);
        repo.insert_comment("p1", "Operator", "first").await.unwrap();
        repo.insert_comment("p1", "Operator", "second").await.unwrap();

        let comments = repo.list_comments("p1").await.unwrap();
        assert_eq!(comments.len(), 2);

        let err = repo.insert_comment("p1", "Operator", "   ").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
