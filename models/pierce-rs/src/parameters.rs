use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SimulationError},
    seci::StateVector,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    WildType,
    Defended,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::WildType, Scenario::Defended];
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::WildType => write!(f, "wild_type"),
            Scenario::Defended => write!(f, "defended"),
        }
    }
}

/// Marginal distribution of one biological parameter.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    Normal { mean: f64, sd: f64 },
    Uniform { min: f64, max: f64 },
    /// No sampled uncertainty; every draw takes `value`.
    Constant { value: f64 },
}

impl Distribution {
    pub fn validate(&self, parameter: &str) -> Result<()> {
        let invalid = |msg: String| Err(SimulationError::InvalidConfig(format!("{parameter}: {msg}")));
        match *self {
            Distribution::Normal { mean, sd } => {
                if !mean.is_finite() || !sd.is_finite() || sd < 0.0 {
                    return invalid(format!("normal(mean={mean}, sd={sd}) needs finite mean and sd >= 0"));
                }
            }
            Distribution::Uniform { min, max } => {
                if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
                    return invalid(format!("uniform({min}, {max}) needs 0 <= min <= max"));
                }
            }
            Distribution::Constant { value } => {
                if !value.is_finite() || value < 0.0 {
                    return invalid(format!("constant {value} must be finite and >= 0"));
                }
            }
        }
        Ok(())
    }
}

/// Marginal distributions of the seven biological parameters for one scenario.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Marginals {
    pub acquisition_rate: Distribution,
    pub inoculation_rate: Distribution,
    pub latency_rate: Distribution,
    pub incubation_rate: Distribution,
    pub vector_recovery_rate: Distribution,
    pub vector_preference: Distribution,
    pub host_recovery_rate: Distribution,
}

// Shared by both genotypes
const LATENCY_RATE: f64 = 0.25;
const HOST_RECOVERY_RATE: f64 = 0.01;
const INOCULATION_RATE: Distribution = Distribution::Normal {
    mean: 0.0778,
    sd: 0.02,
};
const VECTOR_RECOVERY_RATE: Distribution = Distribution::Normal {
    mean: 0.0833,
    sd: 0.02,
};

impl Marginals {
    pub fn wild_type() -> Marginals {
        Marginals {
            acquisition_rate: Distribution::Normal {
                mean: 0.222,
                sd: 0.05,
            },
            inoculation_rate: INOCULATION_RATE,
            latency_rate: Distribution::Constant {
                value: LATENCY_RATE,
            },
            incubation_rate: Distribution::Uniform {
                min: 0.0087,
                max: 0.0175,
            },
            vector_recovery_rate: VECTOR_RECOVERY_RATE,
            vector_preference: Distribution::Normal {
                mean: 0.458,
                sd: 0.1,
            },
            host_recovery_rate: Distribution::Constant {
                value: HOST_RECOVERY_RATE,
            },
        }
    }

    /// Transgenic hosts: lower acquisition from, slower symptom development in,
    /// and weaker vector attraction to infective plants.
    pub fn defended() -> Marginals {
        Marginals {
            acquisition_rate: Distribution::Normal {
                mean: 0.091,
                sd: 0.03,
            },
            incubation_rate: Distribution::Uniform {
                min: 0.0050,
                max: 0.0100,
            },
            vector_preference: Distribution::Normal {
                mean: 0.30,
                sd: 0.1,
            },
            ..Marginals::wild_type()
        }
    }

    /// The marginals in `ParameterDraw` field order, keyed by parameter name.
    pub fn named(&self) -> [(&'static str, Distribution); 7] {
        [
            ("acquisition_rate", self.acquisition_rate),
            ("inoculation_rate", self.inoculation_rate),
            ("latency_rate", self.latency_rate),
            ("incubation_rate", self.incubation_rate),
            ("vector_recovery_rate", self.vector_recovery_rate),
            ("vector_preference", self.vector_preference),
            ("host_recovery_rate", self.host_recovery_rate),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        for (name, distribution) in self.named() {
            distribution.validate(name)?;
        }
        Ok(())
    }
}

/// Inclusive, evenly spaced range of vector densities for the R0 sweep.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SweepRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl SweepRange {
    pub fn validate(&self) -> Result<()> {
        if !(self.start >= 0.0 && self.end >= self.start && self.step > 0.0 && self.end.is_finite()) {
            return Err(SimulationError::InvalidConfig(format!(
                "sweep range {}..={} step {} must be non-negative, ordered and have a positive step",
                self.start, self.end, self.step
            )));
        }
        Ok(())
    }

    pub fn values(&self) -> Vec<f64> {
        let n = ((self.end - self.start) / self.step + 1e-9).floor() as usize;
        (0..=n).map(|k| self.start + k as f64 * self.step).collect()
    }
}

impl Default for SweepRange {
    fn default() -> Self {
        SweepRange {
            start: 0.0,
            end: 200.0,
            step: 1.0,
        }
    }
}

/// Everything a run needs. Any field left out of the input takes its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Raw draws per marginal before truncation.
    pub nsim: usize,
    /// Draws per parameter set after truncation and trimming.
    pub nmin: usize,
    pub time_horizon: f64,
    pub time_step: f64,
    pub initial_state: StateVector,
    pub wild_type: Marginals,
    pub defended: Marginals,
    pub r0_vector_densities: SweepRange,
    pub credible_level: f64,
    pub rtol: f64,
    pub atol: f64,
    pub negativity_tolerance: f64,
    /// Reuse the trajectory parameter sets for R0 instead of drawing new ones.
    pub paired_r0: bool,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            nsim: 10_000,
            nmin: 1_000,
            time_horizon: 1500.0,
            time_step: 2.0,
            initial_state: StateVector::INITIAL,
            wild_type: Marginals::wild_type(),
            defended: Marginals::defended(),
            r0_vector_densities: SweepRange::default(),
            credible_level: 0.95,
            rtol: 1e-6,
            atol: 1e-8,
            negativity_tolerance: 1e-6,
            paired_r0: false,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    pub fn marginals(&self, scenario: Scenario) -> &Marginals {
        match scenario {
            Scenario::WildType => &self.wild_type,
            Scenario::Defended => &self.defended,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(SimulationError::InvalidConfig(msg.to_string()));
        if self.nmin == 0 {
            return invalid("nmin must be positive");
        }
        if self.nsim < self.nmin {
            return invalid("nsim must be at least nmin");
        }
        if !(self.credible_level > 0.0 && self.credible_level < 1.0) {
            return invalid("credible_level must lie strictly between 0 and 1");
        }
        if !(self.rtol > 0.0 && self.atol > 0.0) {
            return invalid("solver tolerances must be positive");
        }
        if !(self.negativity_tolerance >= 0.0) {
            return invalid("negativity_tolerance must be non-negative");
        }
        if !self.initial_state.is_feasible(0.0) {
            return invalid("initial_state compartments must be finite and non-negative");
        }
        self.r0_vector_densities.validate()?;
        self.wild_type.validate()?;
        self.defended.validate()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_state.host_total(), 100.0);
        assert_eq!(config.initial_state.vector_total(), 200.0);
    }

    #[test]
    fn test_scenarios_share_constant_marginals() {
        let wild = Marginals::wild_type();
        let defended = Marginals::defended();
        assert_eq!(wild.latency_rate, defended.latency_rate);
        assert_eq!(wild.host_recovery_rate, defended.host_recovery_rate);
        assert_ne!(wild.acquisition_rate, defended.acquisition_rate);
    }

    #[test]
    fn test_invalid_configs() {
        let config = SimulationConfig {
            nsim: 10,
            nmin: 20,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimulationError::InvalidConfig(_))));

        let mut config = SimulationConfig::default();
        config.defended.vector_preference = Distribution::Normal {
            mean: 0.3,
            sd: -0.1,
        };
        assert!(matches!(config.validate(), Err(SimulationError::InvalidConfig(_))));

        let mut config = SimulationConfig::default();
        config.wild_type.incubation_rate = Distribution::Uniform { min: 0.2, max: 0.1 };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            credible_level: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sweep_values() {
        let values = SweepRange::default().values();
        assert_eq!(values.len(), 201);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[200], 200.0);

        let values = SweepRange {
            start: 10.0,
            end: 11.0,
            step: 0.25,
        }
        .values();
        assert_eq!(values, vec![10.0, 10.25, 10.5, 10.75, 11.0]);
    }

    #[test]
    fn test_partial_config_deserializes() {
        let config: SimulationConfig = serde_json::from_value(serde_json::json!({
            "nmin": 50,
            "defended": {
                "acquisition_rate": { "kind": "normal", "mean": 0.1, "sd": 0.01 },
                "inoculation_rate": { "kind": "normal", "mean": 0.0778, "sd": 0.02 },
                "latency_rate": { "kind": "constant", "value": 0.25 },
                "incubation_rate": { "kind": "uniform", "min": 0.005, "max": 0.01 },
                "vector_recovery_rate": { "kind": "normal", "mean": 0.0833, "sd": 0.02 },
                "vector_preference": { "kind": "normal", "mean": 0.3, "sd": 0.1 },
                "host_recovery_rate": { "kind": "constant", "value": 0.01 }
            }
        }))
        .unwrap();
        assert_eq!(config.nmin, 50);
        assert_eq!(config.nsim, 10_000);
        assert_eq!(config.wild_type, Marginals::wild_type());
        assert_eq!(
            config.defended.acquisition_rate,
            Distribution::Normal { mean: 0.1, sd: 0.01 }
        );
    }
}
