use log::{info, trace, warn};
use ode_solvers::dopri5::Dopri5;

use crate::{
    draws::{ParameterDraw, ParameterSet},
    error::{Result, SimulationError},
    parameters::{Scenario, SimulationConfig},
    seci::{SeciSystem, State, StateVector},
};

// Relative slack when checking that the step divides the horizon
const GRID_TOLERANCE: f64 = 1e-9;

// Largest distance, as a fraction of the step, between a grid time and the
// solver output time standing in for it
const OUTPUT_TOLERANCE: f64 = 1e-3;

/// Evenly spaced report times `0, step, 2*step, ..., horizon`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    step: f64,
    n_steps: usize,
}

impl TimeGrid {
    pub fn new(horizon: f64, step: f64) -> Result<TimeGrid> {
        if !(horizon > 0.0 && horizon.is_finite() && step > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "time grid needs a positive horizon and step, got {horizon} and {step}"
            )));
        }
        let ratio = horizon / step;
        let n_steps = ratio.round();
        if (ratio - n_steps).abs() > GRID_TOLERANCE * ratio.max(1.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "time step {step} does not divide the horizon {horizon}"
            )));
        }
        Ok(TimeGrid {
            step,
            n_steps: n_steps as usize,
        })
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn horizon(&self) -> f64 {
        self.time(self.n_steps)
    }

    pub fn len(&self) -> usize {
        self.n_steps + 1
    }

    pub fn time(&self, k: usize) -> f64 {
        k as f64 * self.step
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(|k| self.time(k))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub time: f64,
    pub state: StateVector,
}

/// The solution for one parameter draw, sampled on the time grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// Index of the draw within its parameter set.
    pub draw: usize,
    pub points: Vec<TrajectoryPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    pub rtol: f64,
    pub atol: f64,
    /// A compartment below `-negativity_tolerance` fails the draw.
    pub negativity_tolerance: f64,
}

impl SolverSettings {
    pub fn from_config(config: &SimulationConfig) -> SolverSettings {
        SolverSettings {
            rtol: config.rtol,
            atol: config.atol,
            negativity_tolerance: config.negativity_tolerance,
        }
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings::from_config(&SimulationConfig::default())
    }
}

/// Trajectories for every draw of a parameter set, with the failed draws
/// set aside rather than aborting the batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub scenario: Scenario,
    pub attempted: usize,
    pub trajectories: Vec<Trajectory>,
    pub failures: Vec<SimulationError>,
}

impl BatchOutcome {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn failure_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.failed() as f64 / self.attempted as f64
        }
    }
}

pub struct BatchIntegrator {
    grid: TimeGrid,
    initial_state: StateVector,
    settings: SolverSettings,
}

impl BatchIntegrator {
    pub fn new(grid: TimeGrid, initial_state: StateVector, settings: SolverSettings) -> Self {
        BatchIntegrator {
            grid,
            initial_state,
            settings,
        }
    }

    /// Integrates one draw with Dormand-Prince 5(4), reading the state at
    /// each grid time from the stepper's dense output.
    ///
    /// The stepper places its output times by summing `step`, which can
    /// land a rounding error past the horizon. Integrating half a step
    /// beyond the horizon keeps the last grid time in the output, and each
    /// grid time takes the nearest output time.
    pub fn integrate_draw(&self, draw: usize, params: &ParameterDraw) -> Result<Trajectory> {
        let fail = |reason: String| SimulationError::IntegrationFailure { draw, reason };
        let step = self.grid.step();

        let mut stepper = Dopri5::new(
            SeciSystem::new(*params),
            0.0,
            self.grid.horizon() + 0.5 * step,
            step,
            State::from(self.initial_state),
            self.settings.rtol,
            self.settings.atol,
        );
        let stats = stepper.integrate().map_err(|e| fail(e.to_string()))?;
        trace!(
            "draw {draw}: {} evaluations, {} accepted and {} rejected steps",
            stats.num_eval, stats.accepted_steps, stats.rejected_steps
        );

        let times = stepper.x_out();
        let states = stepper.y_out();
        let mut points = Vec::with_capacity(self.grid.len());
        let slack = OUTPUT_TOLERANCE * step;
        let mut j = 0;
        for (k, time) in self.grid.times().enumerate() {
            while j + 1 < times.len() && (times[j + 1] - time).abs() <= (times[j] - time).abs() {
                j += 1;
            }
            let state = if j < times.len() && (times[j] - time).abs() <= slack {
                StateVector::from(&states[j])
            } else if k == 0 {
                self.initial_state
            } else {
                return Err(fail(format!("no solver output at t = {time}")));
            };
            if !state.is_feasible(self.settings.negativity_tolerance) {
                return Err(fail(format!("infeasible state {state:?} at t = {time}")));
            }
            points.push(TrajectoryPoint { time, state });
        }
        Ok(Trajectory { draw, points })
    }

    pub fn integrate_all(&self, set: &ParameterSet) -> BatchOutcome {
        let mut trajectories = Vec::with_capacity(set.len());
        let mut failures = Vec::new();
        for (draw, params) in set.draws.iter().enumerate() {
            match self.integrate_draw(draw, params) {
                Ok(trajectory) => trajectories.push(trajectory),
                Err(e) => {
                    warn!("{}: {e}", set.scenario);
                    failures.push(e);
                }
            }
        }
        let outcome = BatchOutcome {
            scenario: set.scenario,
            attempted: set.len(),
            trajectories,
            failures,
        };
        if outcome.failed() > 0 {
            warn!(
                "{}: excluded {} of {} draws ({:.1}%)",
                set.scenario,
                outcome.failed(),
                outcome.attempted,
                100.0 * outcome.failure_rate()
            );
        }
        info!(
            "{}: integrated {} draws over {} grid points",
            set.scenario,
            outcome.trajectories.len(),
            self.grid.len()
        );
        outcome
    }
}
