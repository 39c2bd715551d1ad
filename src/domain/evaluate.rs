//! Compliance evaluator.
//!
//! Pure function from declared project metrics to the planting verdict.
//! The rule is one tree per 80 sqm; a project may alternatively comply by
//! dedicating at least 10% of its area as green area.

use serde::{Deserialize, Serialize};

/// Computed planting verdict for a compliance report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub required_trees: i64,
    pub delta_trees: i64,
    pub compliant: bool,
}

/// Evaluate a project's planting plan.
///
/// `required_trees` is the ceiling of `area / 80`, computed as
/// `floor((area + 79) / 80)` so integer areas round up exactly; zero or
/// negative area requires no trees. `delta_trees` may be negative.
pub fn evaluate(area_sqm: f64, trees_planned: i64, green_area_sqm: Option<f64>) -> ComplianceResult {
    let required_trees = if area_sqm > 0.0 {
        ((area_sqm + 79.0) / 80.0).floor() as i64
    } else {
        0
    };

    let compliant_by_trees = trees_planned >= required_trees;
    let compliant_by_area = green_area_sqm.is_some_and(|g| g >= 0.1 * area_sqm);

    ComplianceResult {
        required_trees,
        delta_trees: trees_planned - required_trees,
        compliant: compliant_by_trees || compliant_by_area,
    }
}
