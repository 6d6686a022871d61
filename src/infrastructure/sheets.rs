use crate::domain::error::{AppError, Result};
use crate::domain::project::{Project, ProjectStatus};
use serde::Deserialize;

/// Connection settings for the legacy Google Sheets project source. Projects
/// live one per row with a fixed positional column layout.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    pub api_key: String,
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

pub struct GoogleSheetsClient {
    client: reqwest::Client,
}

impl GoogleSheetsClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub async fn fetch_projects(&self, config: &SheetsConfig) -> Result<Vec<Project>> {
        let range = format!("{}!A:Z", config.sheet_name);
        let url = format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}?key={}",
            config.spreadsheet_id, range, config.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Sheets request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Sheets API error ({}): {}",
                status, text
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::ParseError(format!("Failed to parse Sheets reply: {}", e)))?;

        let rows: Vec<Vec<String>> = body["values"]
            .as_array()
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        row.as_array()
                            .map(|cells| {
                                cells
                                    .iter()
                                    .map(|cell| cell.as_str().unwrap_or_default().to_string())
                                    .collect()
                            })
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(projects_from_rows(&rows))
    }
}

impl Default for GoogleSheetsClient {
    fn default() -> Self {
        Self::new()
    }
}

fn cell(row: &[String], index: usize) -> Option<String> {
    row.get(index)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Maps raw sheet rows into projects. The first row is the header; missing
/// cells fall back to usable defaults rather than failing the whole fetch.
pub fn projects_from_rows(rows: &[Vec<String>]) -> Vec<Project> {
    rows.iter()
        .skip(1)
        .enumerate()
        .map(|(index, row)| {
            let mut project = Project::new(
                cell(row, 0).unwrap_or_else(|| format!("project-{}", index)),
                cell(row, 1).unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
                cell(row, 2).unwrap_or_else(|| "Unknown Client".to_string()),
                cell(row, 3).unwrap_or_default(),
            );
            project.status = ProjectStatus::parse_lenient(&cell(row, 4).unwrap_or_default());
            project.lead_score = cell(row, 5)
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(0);
            project.revenue_value = cell(row, 6)
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(0.0);
            project.phase = cell(row, 7).unwrap_or_default();
            project.notes = cell(row, 8);
            project.phone_number = cell(row, 9);
            project.industry = cell(row, 10);
            project.team_size = cell(row, 11);
            project.current_challenges = cell(row, 12);
            project.proposal_html = cell(row, 13);
            project.build_guide_markdown = cell(row, 14);
            project.workflow_json = cell(row, 15);
            project
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_header_row_is_skipped() {
        let rows = vec![
            row(&["ID", "Timestamp", "Client"]),
            row(&["p1", "2026-01-01", "Acme Joinery"]),
        ];
        let projects = projects_from_rows(&rows);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "p1");
        assert_eq!(projects[0].client_name, "Acme Joinery");
    }

    #[test]
    fn test_missing_cells_get_defaults() {
        let rows = vec![row(&["ID"]), row(&[])];
        let projects = projects_from_rows(&rows);
        assert_eq!(projects[0].id, "project-0");
        assert_eq!(projects[0].client_name, "Unknown Client");
        assert_eq!(projects[0].status, ProjectStatus::NewLead);
        assert_eq!(projects[0].lead_score, 0);
    }

    #[test]
    fn test_full_row_maps_positionally() {
        let rows = vec![
            row(&["ID"]),
            row(&[
                "p9",
                "2026-02-02T00:00:00Z",
                "Oak & Sons",
                "ops@oak.example",
                "Building",
                "72",
                "5400.50",
                "Build",
                "rush job",
                "0123",
                "Joinery",
                "4-6 people",
                "manual quoting",
                "<h1>Proposal</h1>",
                "# Guide",
                "{\"nodes\":[]}",
            ]),
        ];
        let project = &projects_from_rows(&rows)[0];
        assert_eq!(project.status, ProjectStatus::Building);
        assert_eq!(project.lead_score, 72);
        assert!((project.revenue_value - 5400.50).abs() < f64::EPSILON);
        assert_eq!(project.notes.as_deref(), Some("rush job"));
        assert_eq!(project.workflow_json.as_deref(), Some("{\"nodes\":[]}"));
    }

    #[test]
    fn test_unparseable_numbers_default_to_zero() {
        let rows = vec![
            row(&["ID"]),
            row(&["p1", "", "Client", "", "Live", "high", "lots"]),
        ];
        let project = &projects_from_rows(&rows)[0];
        assert_eq!(project.lead_score, 0);
        assert_eq!(project.revenue_value, 0.0);
        assert_eq!(project.status, ProjectStatus::Live);
    }
}
