use crate::domain::error::{AppError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::str::FromStr;

pub async fn init_db(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::DatabaseError(format!("Failed to parse connection string: {}", e)))?
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {}", e)))?;

    create_schema(&pool).await?;

    Ok(pool)
}

pub fn db_path_to_url(db_path: &str) -> String {
    format!("sqlite://{}", db_path.replace('\\', "/"))
}

async fn create_schema(pool: &SqlitePool) -> Result<()> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            timestamp TEXT NOT NULL,
            client_name TEXT NOT NULL,
            client_email TEXT NOT NULL,
            status TEXT NOT NULL,
            lead_score INTEGER NOT NULL DEFAULT 0,
            revenue_value REAL NOT NULL DEFAULT 0,
            phase TEXT NOT NULL DEFAULT '',
            notes TEXT,
            contact_name TEXT,
            phone_number TEXT,
            industry TEXT,
            team_size TEXT,
            current_challenges TEXT,
            current_process TEXT,
            desired_outcomes TEXT,
            proposal_html TEXT,
            build_guide_markdown TEXT,
            workflow_json TEXT,
            dashboard_spec TEXT,
            mockup_spec TEXT
        )",
        "CREATE TABLE IF NOT EXISTS tasks (
            task_id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            title TEXT NOT NULL,
            status TEXT NOT NULL,
            estimated_hours REAL NOT NULL DEFAULT 0,
            hours_logged REAL NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            author TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS ideas (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT,
            category TEXT NOT NULL,
            priority TEXT NOT NULL,
            status TEXT NOT NULL,
            tags TEXT NOT NULL DEFAULT '[]',
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create table: {}", e)))?;
    }

    Ok(())
}

#[cfg(test)]
pub async fn init_test_db() -> SqlitePool {
    init_db("sqlite::memory:")
        .await
        .expect("in-memory database should initialize")
}
