use serde::Serialize;

/// One challenge the intake form can tick, mapped to the workflow templates
/// that solve it and the price the package is quoted at.
struct ChallengeMapping {
    challenge: &'static str,
    templates: [&'static str; 3],
    category: &'static str,
    urgency: Urgency,
    base_price: f64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Medium => "medium",
            Complexity::Complex => "complex",
        }
    }
}

const CHALLENGE_MAPPINGS: &[ChallengeMapping] = &[
    ChallengeMapping {
        challenge: "I miss enquiries or forget to reply",
        templates: [
            "multi_channel_enquiry_capture",
            "facebook_lead_ads_integration",
            "whatsapp_business_setup",
        ],
        category: "enquiry_capture",
        urgency: Urgency::High,
        base_price: 2500.0,
    },
    ChallengeMapping {
        challenge: "Quotes take too long to send",
        templates: [
            "ai_quote_generator",
            "quote_template_library",
            "auto_pricing_calculator",
        ],
        category: "quote_generation",
        urgency: Urgency::High,
        base_price: 3500.0,
    },
    ChallengeMapping {
        challenge: "I don't have time to chase people",
        templates: [
            "auto_followup_sequences",
            "quote_view_tracking",
            "sms_nudge_system",
        ],
        category: "follow_up",
        urgency: Urgency::Medium,
        base_price: 2000.0,
    },
    ChallengeMapping {
        challenge: "I lose track of jobs once they're booked",
        templates: [
            "job_tracker_pipeline",
            "site_visit_scheduler",
            "client_reminder_automation",
        ],
        category: "job_management",
        urgency: Urgency::Medium,
        base_price: 3000.0,
    },
    ChallengeMapping {
        challenge: "Scheduling jobs is messy or confusing",
        templates: [
            "smart_job_scheduler",
            "calendar_integration",
            "crew_coordination_tool",
        ],
        category: "scheduling",
        urgency: Urgency::Medium,
        base_price: 2500.0,
    },
    ChallengeMapping {
        challenge: "Customers keep messaging for updates",
        templates: [
            "auto_status_updates",
            "client_portal_basic",
            "sms_notification_system",
        ],
        category: "client_communication",
        urgency: Urgency::Low,
        base_price: 2000.0,
    },
    ChallengeMapping {
        challenge: "I forget to invoice or invoice late",
        templates: [
            "auto_invoice_generator",
            "stripe_integration",
            "invoice_reminder_system",
        ],
        category: "invoicing",
        urgency: Urgency::High,
        base_price: 2500.0,
    },
    ChallengeMapping {
        challenge: "Chasing payments is awkward",
        templates: [
            "payment_reminder_sequences",
            "automated_payment_tracking",
            "late_payment_escalation",
        ],
        category: "payments",
        urgency: Urgency::Medium,
        base_price: 1500.0,
    },
    ChallengeMapping {
        challenge: "I don't ask for reviews often enough",
        templates: [
            "auto_review_request_system",
            "google_review_integration",
            "testimonial_collection",
        ],
        category: "marketing",
        urgency: Urgency::Low,
        base_price: 1000.0,
    },
    ChallengeMapping {
        challenge: "I have no clear view of what's going on day to day",
        templates: [
            "business_dashboard_basic",
            "daily_digest_email",
            "kpi_tracking_system",
        ],
        category: "reporting",
        urgency: Urgency::Medium,
        base_price: 2000.0,
    },
];

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchedTemplate {
    pub challenge: String,
    pub category: String,
    pub urgency: Urgency,
    pub base_price: f64,
    pub template_slug: String,
    pub all_templates: Vec<String>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeMatch {
    pub matched_templates: Vec<MatchedTemplate>,
    pub total_value: f64,
    pub complexity: Complexity,
    pub estimated_hours: i64,
    pub estimated_weeks: i64,
    pub categories: Vec<String>,
}

/// Matches the client's stated challenges against the template catalog and
/// estimates project value, complexity, and timeline. Challenges without a
/// mapping contribute nothing; matches are ordered most urgent first.
pub fn match_challenges(challenges: &[String]) -> ChallengeMatch {
    let mut matched: Vec<MatchedTemplate> = Vec::new();
    let mut total_value = 0.0;
    let mut categories: Vec<String> = Vec::new();

    for challenge in challenges {
        let Some(config) = CHALLENGE_MAPPINGS
            .iter()
            .find(|m| m.challenge == challenge.trim())
        else {
            continue;
        };

        matched.push(MatchedTemplate {
            challenge: challenge.trim().to_string(),
            category: config.category.to_string(),
            urgency: config.urgency,
            base_price: config.base_price,
            template_slug: config.templates[0].to_string(),
            all_templates: config.templates.iter().map(|t| t.to_string()).collect(),
        });
        total_value += config.base_price;
        if !categories.contains(&config.category.to_string()) {
            categories.push(config.category.to_string());
        }
    }

    matched.sort_by(|a, b| b.urgency.cmp(&a.urgency));

    let complexity = calculate_complexity(challenges.len(), categories.len(), total_value);
    let estimated_hours = calculate_hours(&matched);
    let estimated_weeks = calculate_weeks(estimated_hours, complexity);

    ChallengeMatch {
        matched_templates: matched,
        total_value,
        complexity,
        estimated_hours,
        estimated_weeks,
        categories,
    }
}

/// Simple: 1-2 challenges, 1 category, under 3000. Complex: 6+ challenges,
/// 4+ categories, over 7000. Each factor scores 1-3; the average decides.
pub fn calculate_complexity(
    num_challenges: usize,
    num_categories: usize,
    total_value: f64,
) -> Complexity {
    let mut score = 0;

    score += match num_challenges {
        n if n >= 6 => 3,
        n if n >= 3 => 2,
        _ => 1,
    };
    score += match num_categories {
        n if n >= 4 => 3,
        n if n >= 2 => 2,
        _ => 1,
    };
    score += if total_value > 7000.0 {
        3
    } else if total_value > 3000.0 {
        2
    } else {
        1
    };

    let avg = score as f64 / 3.0;
    if avg >= 2.5 {
        Complexity::Complex
    } else if avg >= 1.5 {
        Complexity::Medium
    } else {
        Complexity::Simple
    }
}

/// Pricing stands in for effort: roughly one hour per 125 quoted, plus 20%
/// integration overhead.
fn calculate_hours(matched: &[MatchedTemplate]) -> i64 {
    let total_price: f64 = matched.iter().map(|t| t.base_price).sum();
    (total_price / 125.0 * 1.2) as i64
}

/// Effective delivery pace is about 24 hours a week once client back-and-forth
/// and testing are counted, with a buffer that grows with complexity.
fn calculate_weeks(estimated_hours: i64, complexity: Complexity) -> i64 {
    let base_weeks = estimated_hours as f64 / 24.0;
    let buffered = match complexity {
        Complexity::Complex => base_weeks * 1.3,
        Complexity::Medium => base_weeks * 1.2,
        Complexity::Simple => base_weeks * 1.1,
    };
    ((buffered + 0.5) as i64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_single_challenge() {
        let result = match_challenges(&["I miss enquiries or forget to reply".to_string()]);
        assert_eq!(result.matched_templates.len(), 1);
        assert_eq!(result.total_value, 2500.0);
        assert!(result.categories.contains(&"enquiry_capture".to_string()));
        assert_eq!(
            result.matched_templates[0].template_slug,
            "multi_channel_enquiry_capture"
        );
    }

    #[test]
    fn test_match_multiple_challenges() {
        let result = match_challenges(&[
            "I miss enquiries or forget to reply".to_string(),
            "Quotes take too long to send".to_string(),
            "I don't have time to chase people".to_string(),
        ]);
        assert_eq!(result.matched_templates.len(), 3);
        assert_eq!(result.total_value, 8000.0);
        assert!(result.estimated_hours > 0);
        assert!(result.estimated_weeks >= 1);
    }

    #[test]
    fn test_unknown_challenges_contribute_nothing() {
        let result = match_challenges(&[
            "something nobody mapped".to_string(),
            "I forget to invoice or invoice late".to_string(),
        ]);
        assert_eq!(result.matched_templates.len(), 1);
        assert_eq!(result.total_value, 2500.0);
    }

    #[test]
    fn test_matches_sorted_most_urgent_first() {
        let result = match_challenges(&[
            "I don't ask for reviews often enough".to_string(),
            "Quotes take too long to send".to_string(),
        ]);
        assert_eq!(result.matched_templates[0].urgency, Urgency::High);
        assert_eq!(result.matched_templates[1].urgency, Urgency::Low);
    }

    #[test]
    fn test_complexity_simple() {
        assert_eq!(calculate_complexity(2, 1, 2500.0), Complexity::Simple);
    }

    #[test]
    fn test_complexity_medium() {
        assert_eq!(calculate_complexity(4, 3, 5000.0), Complexity::Medium);
    }

    #[test]
    fn test_complexity_complex() {
        assert_eq!(calculate_complexity(7, 5, 12000.0), Complexity::Complex);
    }

    #[test]
    fn test_empty_input_yields_minimum_timeline() {
        let result = match_challenges(&[]);
        assert_eq!(result.total_value, 0.0);
        assert_eq!(result.estimated_weeks, 1);
        assert_eq!(result.complexity, Complexity::Simple);
    }
}
