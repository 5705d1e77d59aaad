use thiserror::Error;

use crate::parameters::Scenario;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("only {available} feasible draws remain after truncation, {requested} required")]
    InsufficientSamples { requested: usize, available: usize },
    #[error("marginal for {parameter} has {found} values, expected {expected}")]
    DimensionMismatch {
        parameter: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("integration of draw {draw} failed: {reason}")]
    IntegrationFailure { draw: usize, reason: String },
    #[error("invalid parameter domain: {0}")]
    InvalidParameterDomain(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("all {attempted} draws failed to integrate for {scenario}")]
    NoSuccessfulDraws { scenario: Scenario, attempted: usize },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
