use serde::{Deserialize, Serialize};
use validator::Validate;

/// Pipeline stage of a client project, as shown on the dashboard cards.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    #[serde(rename = "New Lead")]
    NewLead,
    Contacted,
    Building,
    Deployed,
    Live,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::NewLead => "New Lead",
            ProjectStatus::Contacted => "Contacted",
            ProjectStatus::Building => "Building",
            ProjectStatus::Deployed => "Deployed",
            ProjectStatus::Live => "Live",
        }
    }

    /// Lenient parse used for sheet cells and query params. Unknown values
    /// fall back to `NewLead` so stale sheet data still lands in the pipeline.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "contacted" => ProjectStatus::Contacted,
            "building" => ProjectStatus::Building,
            "deployed" => ProjectStatus::Deployed,
            "live" => ProjectStatus::Live,
            _ => ProjectStatus::NewLead,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub timestamp: String,
    pub client_name: String,
    pub client_email: String,
    pub status: ProjectStatus,
    pub lead_score: i64,
    pub revenue_value: f64,
    pub phase: String,
    pub notes: Option<String>,
    pub contact_name: Option<String>,
    pub phone_number: Option<String>,
    pub industry: Option<String>,
    pub team_size: Option<String>,
    pub current_challenges: Option<String>,
    pub current_process: Option<String>,
    pub desired_outcomes: Option<String>,
    pub proposal_html: Option<String>,
    pub build_guide_markdown: Option<String>,
    pub workflow_json: Option<String>,
    pub dashboard_spec: Option<String>,
    pub mockup_spec: Option<String>,
}

impl Project {
    pub fn new(id: String, timestamp: String, client_name: String, client_email: String) -> Self {
        Self {
            id,
            timestamp,
            client_name,
            client_email,
            status: ProjectStatus::NewLead,
            lead_score: 0,
            revenue_value: 0.0,
            phase: String::new(),
            notes: None,
            contact_name: None,
            phone_number: None,
            industry: None,
            team_size: None,
            current_challenges: None,
            current_process: None,
            desired_outcomes: None,
            proposal_html: None,
            build_guide_markdown: None,
            workflow_json: None,
            dashboard_spec: None,
            mockup_spec: None,
        }
    }
}

/// Client intake form submitted from the public-facing form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct IntakeForm {
    #[validate(length(min = 1, message = "client_name is required"))]
    pub client_name: String,
    #[validate(email(message = "client_email must be a valid email"))]
    pub client_email: String,
    pub contact_name: Option<String>,
    pub phone_number: Option<String>,
    pub industry: Option<String>,
    pub team_size: Option<String>,
    pub current_challenges: Option<String>,
    pub current_process: Option<String>,
    pub desired_outcomes: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lenient_parse() {
        assert_eq!(ProjectStatus::parse_lenient("building"), ProjectStatus::Building);
        assert_eq!(ProjectStatus::parse_lenient(" Live "), ProjectStatus::Live);
        assert_eq!(ProjectStatus::parse_lenient("garbage"), ProjectStatus::NewLead);
        assert_eq!(ProjectStatus::parse_lenient(""), ProjectStatus::NewLead);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ProjectStatus::NewLead,
            ProjectStatus::Contacted,
            ProjectStatus::Building,
            ProjectStatus::Deployed,
            ProjectStatus::Live,
        ] {
            assert_eq!(ProjectStatus::parse_lenient(status.as_str()), status);
        }
    }
}
