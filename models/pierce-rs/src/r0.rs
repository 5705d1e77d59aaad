use log::info;

use crate::{
    aggregate::summarize,
    draws::{ParameterDraw, ParameterSet},
    error::{Result, SimulationError},
    output::{R0SensitivityRow, R0SummaryRow},
};

/// Basic reproduction number of one draw with `hosts` plants and `vectors`
/// vectors:
///
/// `R0 = sqrt(alpha*beta*delta*(a + gamma*p)*M / (a*mu*(a + delta)*(a + gamma)*N))`
pub fn basic_reproduction_number(draw: &ParameterDraw, hosts: f64, vectors: f64) -> Result<f64> {
    let ParameterDraw {
        acquisition_rate: alpha,
        inoculation_rate: beta,
        latency_rate: delta,
        incubation_rate: gamma,
        vector_recovery_rate: mu,
        vector_preference: p,
        host_recovery_rate: a,
    } = *draw;

    let inputs = [alpha, beta, delta, gamma, mu, p, a, hosts, vectors];
    if inputs.iter().any(|x| !(*x >= 0.0 && x.is_finite())) {
        return Err(SimulationError::InvalidParameterDomain(format!(
            "R0 needs non-negative finite inputs, got {draw:?} with N = {hosts}, M = {vectors}"
        )));
    }

    let numerator = alpha * beta * delta * (a + gamma * p) * vectors;
    let denominator = a * mu * (a + delta) * (a + gamma) * hosts;
    if denominator == 0.0 {
        return Err(SimulationError::InvalidParameterDomain(format!(
            "R0 denominator vanishes for {draw:?} with N = {hosts}"
        )));
    }
    let radicand = numerator / denominator;
    if !(radicand >= 0.0 && radicand.is_finite()) {
        return Err(SimulationError::InvalidParameterDomain(format!(
            "R0 radicand {radicand} for {draw:?} with N = {hosts}, M = {vectors}"
        )));
    }
    Ok(radicand.sqrt())
}

/// R0 of every draw in `set`.
pub fn r0_distribution(set: &ParameterSet, hosts: f64, vectors: f64) -> Result<Vec<f64>> {
    set.draws
        .iter()
        .map(|draw| basic_reproduction_number(draw, hosts, vectors))
        .collect()
}

pub fn r0_summary(set: &ParameterSet, hosts: f64, vectors: f64, level: f64) -> Result<R0SummaryRow> {
    let summary = summarize(&r0_distribution(set, hosts, vectors)?, level)?;
    info!(
        "{}: R0 median {:.3} ({:.3}, {:.3})",
        set.scenario, summary.median, summary.ci_lower, summary.ci_upper
    );
    Ok(R0SummaryRow {
        scenario: set.scenario,
        median: summary.median,
        ci_lower: summary.ci_lower,
        ci_upper: summary.ci_upper,
    })
}

/// Summaries of R0 at each vector density, holding the draws fixed.
pub fn r0_sensitivity(
    set: &ParameterSet,
    hosts: f64,
    densities: &[f64],
    level: f64,
) -> Result<Vec<R0SensitivityRow>> {
    let rows = densities
        .iter()
        .map(|&vectors| {
            let summary = summarize(&r0_distribution(set, hosts, vectors)?, level)?;
            Ok(R0SensitivityRow {
                scenario: set.scenario,
                vector_density: vectors,
                median: summary.median,
                ci_lower: summary.ci_lower,
                ci_upper: summary.ci_upper,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    info!(
        "{}: swept R0 over {} vector densities",
        set.scenario,
        rows.len()
    );
    Ok(rows)
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::parameters::{Marginals, Scenario, SweepRange};

    fn midpoint_draw() -> ParameterDraw {
        ParameterDraw {
            acquisition_rate: 0.222,
            inoculation_rate: 0.0778,
            latency_rate: 0.25,
            incubation_rate: 0.0131,
            vector_recovery_rate: 0.0833,
            vector_preference: 0.458,
            host_recovery_rate: 0.01,
        }
    }

    #[test]
    fn test_r0_by_substitution() {
        let r0 = basic_reproduction_number(&midpoint_draw(), 100.0, 200.0).unwrap();
        let radicand: f64 = 0.222 * 0.0778 * 0.25 * (0.01 + 0.0131 * 0.458) * 200.0
            / (0.01 * 0.0833 * (0.01 + 0.25) * (0.01 + 0.0131) * 100.0);
        assert_relative_eq!(r0, radicand.sqrt(), max_relative = 1e-12);
        assert_relative_eq!(r0, 5.25525, max_relative = 1e-5);
    }

    #[test]
    fn test_r0_scales_with_square_root_of_density() {
        let draw = midpoint_draw();
        let at_50 = basic_reproduction_number(&draw, 100.0, 50.0).unwrap();
        let at_200 = basic_reproduction_number(&draw, 100.0, 200.0).unwrap();
        assert_relative_eq!(at_200, 2.0 * at_50, max_relative = 1e-12);
        assert_eq!(basic_reproduction_number(&draw, 100.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_r0_domain_errors() {
        let draw = midpoint_draw();
        assert!(matches!(
            basic_reproduction_number(&draw, 100.0, -1.0),
            Err(SimulationError::InvalidParameterDomain(_))
        ));
        assert!(matches!(
            basic_reproduction_number(&draw, 0.0, 200.0),
            Err(SimulationError::InvalidParameterDomain(_))
        ));
        let no_recovery = ParameterDraw {
            host_recovery_rate: 0.0,
            ..draw
        };
        assert!(matches!(
            basic_reproduction_number(&no_recovery, 100.0, 200.0),
            Err(SimulationError::InvalidParameterDomain(_))
        ));
        // Two negative rates would cancel inside the square root
        let both_negative = ParameterDraw {
            inoculation_rate: -0.0778,
            vector_recovery_rate: -0.0833,
            ..draw
        };
        assert!(matches!(
            basic_reproduction_number(&both_negative, 100.0, 200.0),
            Err(SimulationError::InvalidParameterDomain(_))
        ));
    }

    #[test]
    fn test_sensitivity_median_is_non_decreasing() {
        let mut rng = StdRng::seed_from_u64(8675309);
        let set = ParameterSet::sample(
            Scenario::WildType,
            &Marginals::wild_type(),
            2_000,
            400,
            &mut rng,
        )
        .unwrap();
        let densities = SweepRange::default().values();
        let rows = r0_sensitivity(&set, 100.0, &densities, 0.95).unwrap();
        assert_eq!(rows.len(), 201);
        assert_eq!(rows[0].median, 0.0);
        for pair in rows.windows(2) {
            assert!(pair[1].median >= pair[0].median);
            assert!(pair[1].ci_lower >= pair[0].ci_lower);
            assert!(pair[1].ci_upper >= pair[0].ci_upper);
        }
        for row in &rows {
            assert!(row.ci_lower <= row.median && row.median <= row.ci_upper);
        }
        let summary = r0_summary(&set, 100.0, 200.0, 0.95).unwrap();
        assert_relative_eq!(summary.median, rows[200].median, max_relative = 1e-12);
    }

    #[test]
    fn test_defended_r0_is_lower() {
        let mut rng = StdRng::seed_from_u64(1);
        let wild = ParameterSet::sample(
            Scenario::WildType,
            &Marginals::wild_type(),
            4_000,
            1_000,
            &mut rng,
        )
        .unwrap();
        let defended = ParameterSet::sample(
            Scenario::Defended,
            &Marginals::defended(),
            4_000,
            1_000,
            &mut rng,
        )
        .unwrap();
        let wild = r0_summary(&wild, 100.0, 200.0, 0.95).unwrap();
        let defended = r0_summary(&defended, 100.0, 200.0, 0.95).unwrap();
        assert_eq!(defended.scenario, Scenario::Defended);
        assert!(defended.median < wild.median);
    }
}
