use crate::application::use_cases::challenge_matching::match_challenges;
use crate::domain::error::{AppError, Result};
use crate::domain::project::{IntakeForm, Project};
use crate::infrastructure::db::projects::ProjectRepository;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

const URGENCY_KEYWORDS: [&str; 6] = ["urgent", "asap", "immediately", "losing", "miss", "forget"];
const REVENUE_KEYWORDS: [&str; 6] = ["revenue", "sales", "money", "profit", "growth", "expanding"];

pub struct IntakeUseCase {
    projects: Arc<ProjectRepository>,
}

impl IntakeUseCase {
    pub fn new(projects: Arc<ProjectRepository>) -> Self {
        Self { projects }
    }

    pub async fn execute(&self, form: IntakeForm) -> Result<Project> {
        form.validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let challenges = split_challenges(form.current_challenges.as_deref());
        let matching = match_challenges(&challenges);
        let lead_score = calculate_lead_score(
            form.team_size.as_deref(),
            challenges.len(),
            form.notes.as_deref(),
            matching.total_value,
        );
        info!(
            challenges = challenges.len(),
            matched = matching.matched_templates.len(),
            estimated_value = matching.total_value,
            lead_score,
            "Scored intake"
        );

        let mut project = Project::new(
            Uuid::new_v4().to_string(),
            chrono::Utc::now().to_rfc3339(),
            form.client_name,
            form.client_email,
        );
        project.lead_score = lead_score;
        project.revenue_value = matching.total_value;
        project.phase = "Pending Analysis".to_string();
        project.contact_name = form.contact_name;
        project.phone_number = form.phone_number;
        project.industry = form.industry;
        project.team_size = form.team_size;
        project.current_challenges = form.current_challenges;
        project.current_process = form.current_process;
        project.desired_outcomes = form.desired_outcomes;
        project.notes = form.notes;

        self.projects.insert(&project).await?;
        Ok(project)
    }
}

/// Challenges arrive as free text; each non-empty line or semicolon-separated
/// entry is one challenge.
pub fn split_challenges(challenges: Option<&str>) -> Vec<String> {
    challenges
        .map(|text| {
            text.split(['\n', ';'])
                .map(|entry| entry.trim())
                .filter(|entry| !entry.is_empty())
                .map(|entry| entry.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Lead score (0-100): team size suggests budget, challenge count suggests
/// pain, notes keywords suggest urgency and revenue focus.
pub fn calculate_lead_score(
    team_size: Option<&str>,
    num_challenges: usize,
    notes: Option<&str>,
    revenue_value: f64,
) -> i64 {
    let mut score: i64 = 0;

    score += match team_size.unwrap_or_default() {
        "2-3 people" => 20,
        "4-6 people" => 22,
        "7-10 people" | "11+ people" => 25,
        _ => 15,
    };

    score += match num_challenges {
        n if n >= 7 => 30,
        n if n >= 5 => 25,
        n if n >= 3 => 20,
        _ => 15,
    };

    if let Some(notes) = notes {
        let notes_lower = notes.to_lowercase();
        let urgency_hits = URGENCY_KEYWORDS
            .iter()
            .filter(|kw| notes_lower.contains(**kw))
            .count() as i64;
        let revenue_hits = REVENUE_KEYWORDS
            .iter()
            .filter(|kw| notes_lower.contains(**kw))
            .count() as i64;
        score += (urgency_hits * 3).min(10);
        score += (revenue_hits * 3).min(10);
    }

    score += if revenue_value >= 10_000.0 {
        25
    } else if revenue_value >= 7_000.0 {
        22
    } else if revenue_value >= 5_000.0 {
        18
    } else if revenue_value >= 3_000.0 {
        15
    } else {
        10
    };

    score.clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::init_test_db;

    #[test]
    fn test_score_stays_in_range() {
        assert!(calculate_lead_score(None, 0, None, 0.0) >= 0);
        assert!(
            calculate_lead_score(
                Some("11+ people"),
                20,
                Some("urgent asap losing revenue sales growth"),
                50_000.0
            ) <= 100
        );
    }

    #[test]
    fn test_score_monotonic_in_challenge_tiers() {
        let score_for = |n| calculate_lead_score(Some("Just me"), n, None, 0.0);
        assert!(score_for(1) <= score_for(3));
        assert!(score_for(3) <= score_for(5));
        assert!(score_for(5) <= score_for(7));
    }

    #[test]
    fn test_notes_keywords_add_points() {
        let base = calculate_lead_score(Some("Just me"), 2, None, 0.0);
        let with_urgency = calculate_lead_score(Some("Just me"), 2, Some("this is URGENT"), 0.0);
        assert!(with_urgency > base);
    }

    #[test]
    fn test_split_challenges_on_lines_and_semicolons() {
        assert_eq!(split_challenges(Some("a\nb; c\n\n")), vec!["a", "b", "c"]);
        assert!(split_challenges(Some("   ")).is_empty());
        assert!(split_challenges(None).is_empty());
    }

    #[tokio::test]
    async fn test_intake_creates_scored_project() {
        let repo = Arc::new(ProjectRepository::new(init_test_db().await));
        let use_case = IntakeUseCase::new(repo.clone());

        let project = use_case
            .execute(IntakeForm {
                client_name: "Acme Joinery".to_string(),
                client_email: "ops@acme.example".to_string(),
                contact_name: None,
                phone_number: None,
                industry: Some("Joinery".to_string()),
                team_size: Some("4-6 people".to_string()),
                current_challenges: Some("manual quoting\nmissed follow-ups".to_string()),
                current_process: None,
                desired_outcomes: None,
                notes: Some("losing sales".to_string()),
            })
            .await
            .unwrap();

        assert!(project.lead_score > 0);
        assert_eq!(project.phase, "Pending Analysis");
        assert!(repo.get(&project.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_intake_estimates_revenue_from_matched_challenges() {
        let repo = Arc::new(ProjectRepository::new(init_test_db().await));
        let use_case = IntakeUseCase::new(repo.clone());

        let form = |challenges: &str| IntakeForm {
            client_name: "Acme Joinery".to_string(),
            client_email: "ops@acme.example".to_string(),
            contact_name: None,
            phone_number: None,
            industry: None,
            team_size: Some("4-6 people".to_string()),
            current_challenges: Some(challenges.to_string()),
            current_process: None,
            desired_outcomes: None,
            notes: None,
        };

        let matched = use_case
            .execute(form(
                "I miss enquiries or forget to reply\nQuotes take too long to send",
            ))
            .await
            .unwrap();
        assert_eq!(matched.revenue_value, 6000.0);

        // Unmapped free text stays in the bottom revenue tier.
        let unmatched = use_case.execute(form("totally bespoke woes")).await.unwrap();
        assert_eq!(unmatched.revenue_value, 0.0);
        assert!(matched.lead_score > unmatched.lead_score);

        let stored = repo.get(&matched.id).await.unwrap();
        assert_eq!(stored.revenue_value, 6000.0);
    }

    #[tokio::test]
    async fn test_intake_rejects_invalid_email() {
        let repo = Arc::new(ProjectRepository::new(init_test_db().await));
        let use_case = IntakeUseCase::new(repo);

        let err = use_case
            .execute(IntakeForm {
                client_name: "Acme".to_string(),
                client_email: "not-an-email".to_string(),
                contact_name: None,
                phone_number: None,
                industry: None,
                team_size: None,
                current_challenges: None,
                current_process: None,
                desired_outcomes: None,
                notes: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
