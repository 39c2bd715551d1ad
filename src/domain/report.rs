//! Compliance report record and its lifecycle states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ComplianceResult, UserId};

/// Report lifecycle status. The only permitted transition is
/// `Pending -> Approved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    Approved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::Approved => "Approved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(ReportStatus::Pending),
            "Approved" => Some(ReportStatus::Approved),
            _ => None,
        }
    }
}

/// Validated input for a report submission. Construction via
/// [`ReportDraft::new`] is the only path, so a draft always carries a
/// non-empty trimmed project name and non-negative metrics.
#[derive(Debug, Clone)]
pub struct ReportDraft {
    pub project_name: String,
    pub species_choice: String,
    pub area_sqm: f64,
    pub trees_planned: i64,
    pub green_area_sqm: Option<f64>,
    pub lat: f64,
    pub lon: f64,
}

impl ReportDraft {
    /// Validate raw submission fields. Returns a human-readable reason on
    /// rejection; the caller maps it to the validation error kind.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        project_name: &str,
        species_choice: &str,
        area_sqm: f64,
        trees_planned: i64,
        green_area_sqm: Option<f64>,
        lat: f64,
        lon: f64,
    ) -> Result<Self, String> {
        let project_name = project_name.trim();
        if project_name.is_empty() {
            return Err("project name is required".to_string());
        }
        if !area_sqm.is_finite() || area_sqm < 0.0 {
            return Err("area_sqm must be a non-negative number".to_string());
        }
        if trees_planned < 0 {
            return Err("trees_planned must be non-negative".to_string());
        }
        if let Some(g) = green_area_sqm {
            if !g.is_finite() || g < 0.0 {
                return Err("green_area_sqm must be a non-negative number".to_string());
            }
        }

        Ok(Self {
            project_name: project_name.to_string(),
            species_choice: species_choice.trim().to_string(),
            area_sqm,
            trees_planned,
            green_area_sqm,
            lat,
            lon,
        })
    }
}

/// A persisted compliance report.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub id: Uuid,
    pub owner_id: UserId,
    pub owner_username: String,
    pub project_name: String,
    pub species_choice: String,
    pub area_sqm: f64,
    pub trees_planned: i64,
    pub green_area_sqm: Option<f64>,
    pub lat: f64,
    pub lon: f64,
    pub status: ReportStatus,
    pub result: ComplianceResult,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}
