//! Monte Carlo simulation of Pierce's Disease spread through a vineyard
//! block of wild-type or transgenic (defended) grapevines.
//!
//! Parameter uncertainty is propagated by sampling each biological rate from
//! its truncated marginal, integrating the SECI host / UV vector model once
//! per joint draw, and summarizing the trajectories with means and 95%
//! credible intervals. The closed-form R0 is summarized per scenario and
//! swept over vector density.

pub mod aggregate;
pub mod draws;
pub mod error;
pub mod integrator;
pub mod model;
pub mod output;
pub mod parameters;
pub mod r0;
pub mod sampler;
pub mod seci;

pub use error::{Result, SimulationError};
pub use model::PierceModel;
pub use output::SimulationOutput;
pub use parameters::{Scenario, SimulationConfig};
