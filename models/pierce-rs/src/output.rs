use serde::Serialize;

use crate::parameters::Scenario;

/// One time point of the aggregated I and V series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesRow {
    pub scenario: Scenario,
    pub time: f64,
    #[serde(rename = "mean_I")]
    pub mean_i: f64,
    #[serde(rename = "ci_lower_I")]
    pub ci_lower_i: f64,
    #[serde(rename = "ci_upper_I")]
    pub ci_upper_i: f64,
    #[serde(rename = "mean_V")]
    pub mean_v: f64,
    #[serde(rename = "ci_lower_V")]
    pub ci_lower_v: f64,
    #[serde(rename = "ci_upper_V")]
    pub ci_upper_v: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct R0SummaryRow {
    pub scenario: Scenario,
    pub median: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct R0SensitivityRow {
    pub scenario: Scenario,
    pub vector_density: f64,
    pub median: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// Draws excluded from a scenario's aggregate because integration failed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExclusionRow {
    pub scenario: Scenario,
    pub attempted: usize,
    pub failed: usize,
    pub failure_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationOutput {
    pub series: Vec<SeriesRow>,
    pub r0_summary: Vec<R0SummaryRow>,
    pub r0_sensitivity: Vec<R0SensitivityRow>,
    pub exclusions: Vec<ExclusionRow>,
}
