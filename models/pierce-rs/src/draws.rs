use log::info;
use rand::Rng;

use crate::{
    error::{Result, SimulationError},
    parameters::{Marginals, Scenario},
    sampler::sample_truncated,
};

/// One joint draw of the biological parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDraw {
    /// Rate at which vectors acquire the pathogen from infected hosts (alpha).
    pub acquisition_rate: f64,
    /// Rate at which infectious vectors inoculate susceptible hosts (beta).
    pub inoculation_rate: f64,
    /// Exposed to colonized (delta).
    pub latency_rate: f64,
    /// Colonized to infective (gamma).
    pub incubation_rate: f64,
    /// Rate at which vectors lose infectiousness (mu).
    pub vector_recovery_rate: f64,
    /// Relative vector attraction to infective hosts (p).
    pub vector_preference: f64,
    /// Host recovery to susceptible (a).
    pub host_recovery_rate: f64,
}

/// Sampled marginal vectors, one per parameter, aligned by draw index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarginalSamples {
    pub acquisition_rate: Vec<f64>,
    pub inoculation_rate: Vec<f64>,
    pub latency_rate: Vec<f64>,
    pub incubation_rate: Vec<f64>,
    pub vector_recovery_rate: Vec<f64>,
    pub vector_preference: Vec<f64>,
    pub host_recovery_rate: Vec<f64>,
}

impl MarginalSamples {
    /// Samples every marginal in `ParameterDraw` field order from one stream.
    pub fn sample<R: Rng + ?Sized>(
        marginals: &Marginals,
        nsim: usize,
        nmin: usize,
        rng: &mut R,
    ) -> Result<MarginalSamples> {
        let mut draw = |distribution| sample_truncated(&distribution, nsim, nmin, rng);
        Ok(MarginalSamples {
            acquisition_rate: draw(marginals.acquisition_rate)?,
            inoculation_rate: draw(marginals.inoculation_rate)?,
            latency_rate: draw(marginals.latency_rate)?,
            incubation_rate: draw(marginals.incubation_rate)?,
            vector_recovery_rate: draw(marginals.vector_recovery_rate)?,
            vector_preference: draw(marginals.vector_preference)?,
            host_recovery_rate: draw(marginals.host_recovery_rate)?,
        })
    }

    fn named(&self) -> [(&'static str, &[f64]); 7] {
        [
            ("acquisition_rate", self.acquisition_rate.as_slice()),
            ("inoculation_rate", self.inoculation_rate.as_slice()),
            ("latency_rate", self.latency_rate.as_slice()),
            ("incubation_rate", self.incubation_rate.as_slice()),
            ("vector_recovery_rate", self.vector_recovery_rate.as_slice()),
            ("vector_preference", self.vector_preference.as_slice()),
            ("host_recovery_rate", self.host_recovery_rate.as_slice()),
        ]
    }
}

/// The ordered draws for one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    pub scenario: Scenario,
    pub draws: Vec<ParameterDraw>,
}

impl ParameterSet {
    /// Zips the marginal vectors into draws. Every vector must hold exactly
    /// `nmin` values.
    pub fn from_marginals(
        scenario: Scenario,
        nmin: usize,
        samples: &MarginalSamples,
    ) -> Result<ParameterSet> {
        for (parameter, values) in samples.named() {
            if values.len() != nmin {
                return Err(SimulationError::DimensionMismatch {
                    parameter,
                    expected: nmin,
                    found: values.len(),
                });
            }
        }
        let draws = (0..nmin)
            .map(|k| ParameterDraw {
                acquisition_rate: samples.acquisition_rate[k],
                inoculation_rate: samples.inoculation_rate[k],
                latency_rate: samples.latency_rate[k],
                incubation_rate: samples.incubation_rate[k],
                vector_recovery_rate: samples.vector_recovery_rate[k],
                vector_preference: samples.vector_preference[k],
                host_recovery_rate: samples.host_recovery_rate[k],
            })
            .collect();
        Ok(ParameterSet { scenario, draws })
    }

    pub fn sample<R: Rng + ?Sized>(
        scenario: Scenario,
        marginals: &Marginals,
        nsim: usize,
        nmin: usize,
        rng: &mut R,
    ) -> Result<ParameterSet> {
        let samples = MarginalSamples::sample(marginals, nsim, nmin, rng)?;
        let set = ParameterSet::from_marginals(scenario, nmin, &samples)?;
        info!("sampled {} parameter draws for {scenario}", set.len());
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }
}
