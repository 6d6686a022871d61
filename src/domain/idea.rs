use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdeaPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStatus {
    Idea,
    Planning,
    InProgress,
    Completed,
    Archived,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Idea {
    pub id: String,
    pub title: String,
    pub content: Option<String>,
    pub category: String,
    pub priority: IdeaPriority,
    pub status: IdeaStatus,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create/update payload; every field optional so partial updates reuse it.
#[derive(Debug, Deserialize, Default)]
pub struct IdeaDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub priority: Option<IdeaPriority>,
    pub status: Option<IdeaStatus>,
    pub tags: Option<Vec<String>>,
}
