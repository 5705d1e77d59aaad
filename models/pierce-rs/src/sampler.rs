use log::debug;
use rand::{
    Rng,
    distr::{Distribution as _, Uniform},
};
use rand_distr::Normal;

use crate::{
    error::{Result, SimulationError},
    parameters::Distribution,
};

/// Draws `nmin` non-negative values from `distribution`.
///
/// `nsim` raw values are drawn. Uniform and constant marginals are feasible
/// as drawn and the first `nmin` are kept. Normal marginals are truncated at
/// zero, then as many of the largest survivors are dropped as there were
/// negative draws, so the retained sample stays roughly symmetric about the
/// mean. The first `nmin` values that remain are returned in draw order.
pub fn sample_truncated<R: Rng + ?Sized>(
    distribution: &Distribution,
    nsim: usize,
    nmin: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    if nsim < nmin {
        return Err(SimulationError::InsufficientSamples {
            requested: nmin,
            available: nsim,
        });
    }
    match *distribution {
        Distribution::Constant { value } => Ok(vec![value; nmin]),
        Distribution::Uniform { min, max } => {
            let uniform = Uniform::new_inclusive(min, max).map_err(|e| {
                SimulationError::InvalidConfig(format!("uniform({min}, {max}): {e}"))
            })?;
            let mut raw: Vec<f64> = (0..nsim).map(|_| uniform.sample(rng)).collect();
            raw.truncate(nmin);
            Ok(raw)
        }
        Distribution::Normal { mean, sd } => {
            let normal = Normal::new(mean, sd).map_err(|e| {
                SimulationError::InvalidConfig(format!("normal({mean}, {sd}): {e}"))
            })?;
            let raw: Vec<f64> = (0..nsim).map(|_| normal.sample(rng)).collect();
            trim_symmetric(&raw, nmin)
        }
    }
}

/// Removes negative values and an equal count of the largest values from
/// `raw`, then keeps the first `nmin` in their original order.
pub fn trim_symmetric(raw: &[f64], nmin: usize) -> Result<Vec<f64>> {
    let feasible: Vec<f64> = raw.iter().copied().filter(|x| *x >= 0.0).collect();
    let dropped = raw.len() - feasible.len();

    let mut by_size: Vec<usize> = (0..feasible.len()).collect();
    by_size.sort_by(|&a, &b| feasible[b].total_cmp(&feasible[a]));
    let mut keep = vec![true; feasible.len()];
    for &index in by_size.iter().take(dropped) {
        keep[index] = false;
    }

    let retained: Vec<f64> = feasible
        .iter()
        .zip(&keep)
        .filter_map(|(x, keep)| keep.then_some(*x))
        .collect();
    debug!(
        "truncated {dropped} negative and {} largest of {} draws, {} remain",
        dropped.min(feasible.len()),
        raw.len(),
        retained.len()
    );

    if retained.len() < nmin {
        return Err(SimulationError::InsufficientSamples {
            requested: nmin,
            available: retained.len(),
        });
    }
    Ok(retained.into_iter().take(nmin).collect())
}
