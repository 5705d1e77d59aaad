//! Cross-draw summaries.
//!
//! Quantiles use linear interpolation between order statistics (type 7 in
//! the Hyndman and Fan taxonomy): for probability `q` over `n` sorted values
//! the position is `h = (n - 1) * q` and the quantile is
//! `x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])`.

use log::info;

use crate::{
    error::{Result, SimulationError},
    integrator::Trajectory,
    output::SeriesRow,
    parameters::Scenario,
    seci::Compartment,
};

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Type 7 quantile of already sorted, non-empty `sorted`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Lower and upper tail probabilities of a two-sided interval, 0.025 and
/// 0.975 for a 95% level.
pub fn interval_probabilities(level: f64) -> (f64, f64) {
    let tail = (1.0 - level) / 2.0;
    (tail, 1.0 - tail)
}

/// Median and two-sided credible interval of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub median: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

pub fn summarize(values: &[f64], level: f64) -> Result<Summary> {
    if values.is_empty() {
        return Err(SimulationError::InvalidParameterDomain(
            "cannot summarize an empty sample".to_string(),
        ));
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let (lower, upper) = interval_probabilities(level);
    Ok(Summary {
        mean: mean(values),
        median: quantile_sorted(&sorted, 0.5),
        ci_lower: quantile_sorted(&sorted, lower),
        ci_upper: quantile_sorted(&sorted, upper),
    })
}

/// Per-time-point summaries of infective hosts and infectious vectors for
/// one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSeries {
    pub scenario: Scenario,
    /// Number of trajectories the summaries were computed over.
    pub draws: usize,
    pub rows: Vec<SeriesRow>,
}

/// Summarizes `trajectories` at every time point. All trajectories must
/// share the same time grid.
pub fn aggregate(
    scenario: Scenario,
    trajectories: &[Trajectory],
    level: f64,
) -> Result<AggregatedSeries> {
    let Some(first) = trajectories.first() else {
        return Err(SimulationError::NoSuccessfulDraws {
            scenario,
            attempted: 0,
        });
    };
    let n_points = first.points.len();
    if let Some(bad) = trajectories.iter().find(|t| t.points.len() != n_points) {
        return Err(SimulationError::DimensionMismatch {
            parameter: "trajectory",
            expected: n_points,
            found: bad.points.len(),
        });
    }

    let mut column = vec![0.0; trajectories.len()];
    let mut across = |k: usize, compartment: Compartment| {
        for (value, trajectory) in column.iter_mut().zip(trajectories) {
            *value = trajectory.points[k].state.get(compartment);
        }
        summarize(&column, level)
    };

    let mut rows = Vec::with_capacity(n_points);
    for k in 0..n_points {
        let infective = across(k, Compartment::Infective)?;
        let infectious = across(k, Compartment::Infectious)?;
        rows.push(SeriesRow {
            scenario,
            time: first.points[k].time,
            mean_i: infective.mean,
            ci_lower_i: infective.ci_lower,
            ci_upper_i: infective.ci_upper,
            mean_v: infectious.mean,
            ci_lower_v: infectious.ci_lower,
            ci_upper_v: infectious.ci_upper,
        });
    }
    info!(
        "{scenario}: aggregated {} trajectories into {} time points",
        trajectories.len(),
        rows.len()
    );
    Ok(AggregatedSeries {
        scenario,
        draws: trajectories.len(),
        rows,
    })
}
