use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "in progress" | "in-progress" => TaskStatus::InProgress,
            "done" => TaskStatus::Done,
            _ => TaskStatus::Todo,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: String,
    pub project_id: String,
    pub title: String,
    pub status: TaskStatus,
    pub estimated_hours: f64,
    pub hours_logged: f64,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub project_id: String,
    pub author: String,
    pub content: String,
    pub created_at: i64,
}

/// Default build plan seeded into a fresh project, mirroring the template the
/// dashboard offers when a project has no tasks yet.
pub fn default_task_titles() -> Vec<(&'static str, f64)> {
    vec![
        ("Kickoff call with client", 1.0),
        ("Map current process", 3.0),
        ("Define automation scope", 2.0),
        ("Draft workflow architecture", 4.0),
        ("Set up integrations and credentials", 3.0),
        ("Build core workflow", 8.0),
        ("Build client dashboard", 6.0),
        ("Internal testing", 4.0),
        ("Client review session", 2.0),
        ("Apply feedback and polish", 3.0),
        ("Deploy to production", 2.0),
        ("Handover and documentation", 2.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_parse() {
        assert_eq!(TaskStatus::parse_lenient("In Progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse_lenient("in-progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse_lenient("DONE"), TaskStatus::Done);
        assert_eq!(TaskStatus::parse_lenient("anything else"), TaskStatus::Todo);
    }

    #[test]
    fn test_default_task_template_has_twelve_entries() {
        assert_eq!(default_task_titles().len(), 12);
    }
}
