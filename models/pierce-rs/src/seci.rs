//! Host SECI compartments coupled to vector uninfectious/infectious
//! compartments.
//!
//! Vectors pick up the pathogen from colonized and infective hosts and pass
//! it on to susceptible hosts. Infective hosts are weighted by the vector
//! preference `p` in the effective host population `p*I + S + E + C`. Hosts
//! recover back to susceptible at rate `a` from every infected compartment,
//! vectors lose infectiousness at rate `mu`. There is no birth or death, so
//! both the host total `S + E + C + I` and the vector total `U + V` are
//! conserved.

use ode_solvers::{System, Vector6};
use serde::Deserialize;

use crate::draws::ParameterDraw;

pub type State = Vector6<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StateVector {
    /// Susceptible hosts
    pub s: f64,
    /// Exposed hosts
    pub e: f64,
    /// Colonized hosts, infectious to vectors but asymptomatic
    pub c: f64,
    /// Infective, symptomatic hosts
    pub i: f64,
    /// Uninfectious vectors
    pub u: f64,
    /// Infectious vectors
    pub v: f64,
}

impl StateVector {
    /// One infectious vector introduced into a fully susceptible vineyard
    /// block of 100 plants and 200 vectors.
    pub const INITIAL: StateVector = StateVector {
        s: 100.0,
        e: 0.0,
        c: 0.0,
        i: 0.0,
        u: 199.0,
        v: 1.0,
    };

    pub fn host_total(&self) -> f64 {
        self.s + self.e + self.c + self.i
    }

    pub fn vector_total(&self) -> f64 {
        self.u + self.v
    }

    pub fn get(&self, compartment: Compartment) -> f64 {
        match compartment {
            Compartment::Susceptible => self.s,
            Compartment::Exposed => self.e,
            Compartment::Colonized => self.c,
            Compartment::Infective => self.i,
            Compartment::Uninfectious => self.u,
            Compartment::Infectious => self.v,
        }
    }

    /// True if every compartment is finite and no lower than `-tolerance`.
    pub fn is_feasible(&self, tolerance: f64) -> bool {
        State::from(*self)
            .iter()
            .all(|x| x.is_finite() && *x >= -tolerance)
    }
}

impl From<StateVector> for State {
    fn from(x: StateVector) -> State {
        State::new(x.s, x.e, x.c, x.i, x.u, x.v)
    }
}

impl From<&State> for StateVector {
    fn from(y: &State) -> StateVector {
        StateVector {
            s: y[0],
            e: y[1],
            c: y[2],
            i: y[3],
            u: y[4],
            v: y[5],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compartment {
    Susceptible,
    Exposed,
    Colonized,
    Infective,
    Uninfectious,
    Infectious,
}

/// Time derivative of the state. The model is autonomous, `_t` is accepted
/// so the signature matches the solver's.
///
/// With every host compartment empty the effective host population is zero
/// and both transmission terms are taken to be zero.
pub fn derivative(_t: f64, x: &StateVector, params: &ParameterDraw) -> StateVector {
    let ParameterDraw {
        acquisition_rate: alpha,
        inoculation_rate: beta,
        latency_rate: delta,
        incubation_rate: gamma,
        vector_recovery_rate: mu,
        vector_preference: p,
        host_recovery_rate: a,
    } = *params;

    let effective_hosts = p * x.i + x.s + x.e + x.c;
    let (inoculation, acquisition) = if effective_hosts == 0.0 {
        (0.0, 0.0)
    } else {
        (
            beta * x.s * x.v / effective_hosts,
            alpha * (p * x.i + x.c) * x.u / effective_hosts,
        )
    };

    StateVector {
        s: a * (x.e + x.c + x.i) - inoculation,
        e: inoculation - (delta + a) * x.e,
        c: delta * x.e - a * x.c - gamma * x.c,
        i: gamma * x.c - a * x.i,
        u: mu * x.v - acquisition,
        v: acquisition - mu * x.v,
    }
}

/// Adapter handing one parameter draw to the `ode_solvers` steppers.
pub struct SeciSystem {
    params: ParameterDraw,
}

impl SeciSystem {
    pub fn new(params: ParameterDraw) -> SeciSystem {
        SeciSystem { params }
    }
}

impl System<f64, State> for SeciSystem {
    fn system(&self, t: f64, y: &State, dy: &mut State) {
        *dy = derivative(t, &StateVector::from(y), &self.params).into();
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use super::*;

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
    fn test_initial_derivative() {
        let dx = derivative(0.0, &StateVector::INITIAL, &midpoint_draw());
        // Only the single infectious vector acts: beta * S * V / S = beta
        assert_abs_diff_eq!(dx.s, -0.0778, epsilon = 1e-12);
        assert_abs_diff_eq!(dx.e, 0.0778, epsilon = 1e-12);
        assert_eq!(dx.c, 0.0);
        assert_eq!(dx.i, 0.0);
        assert_abs_diff_eq!(dx.u, 0.0833, epsilon = 1e-12);
        assert_abs_diff_eq!(dx.v, -0.0833, epsilon = 1e-12);
    }

    #[test]
    fn test_totals_are_conserved() {
        let x = StateVector {
            s: 40.0,
            e: 10.0,
            c: 30.0,
            i: 20.0,
            u: 120.0,
            v: 80.0,
        };
        let dx = derivative(0.0, &x, &midpoint_draw());
        assert_abs_diff_eq!(dx.host_total(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dx.vector_total(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_no_hosts_means_no_transmission() {
        let x = StateVector {
            s: 0.0,
            e: 0.0,
            c: 0.0,
            i: 0.0,
            u: 150.0,
            v: 50.0,
        };
        let dx = derivative(0.0, &x, &midpoint_draw());
        for value in State::from(dx).iter() {
            assert!(value.is_finite());
        }
        assert_eq!(dx.host_total(), 0.0);
        // Vectors still recover
        assert_abs_diff_eq!(dx.v, -0.0833 * 50.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_preference_with_only_infective_hosts() {
        let params = ParameterDraw {
            vector_preference: 0.0,
            ..midpoint_draw()
        };
        let x = StateVector {
            s: 0.0,
            e: 0.0,
            c: 0.0,
            i: 100.0,
            u: 200.0,
            v: 0.0,
        };
        let dx = derivative(0.0, &x, &params);
        assert_eq!(dx.u, 0.0);
        assert_eq!(dx.v, 0.0);
        assert_abs_diff_eq!(dx.i, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_system_matches_derivative() {
        let x = StateVector {
            s: 60.0,
            e: 5.0,
            c: 15.0,
            i: 20.0,
            u: 170.0,
            v: 30.0,
        };
        let system = SeciSystem::new(midpoint_draw());
        let mut dy = State::zeros();
        system.system(3.0, &State::from(x), &mut dy);
        let expected: State = derivative(3.0, &x, &midpoint_draw()).into();
        assert_eq!(dy, expected);
    }

    #[test]
    fn test_feasibility() {
        assert!(StateVector::INITIAL.is_feasible(0.0));
        let slightly_negative = StateVector {
            e: -1e-9,
            ..StateVector::INITIAL
        };
        assert!(slightly_negative.is_feasible(1e-6));
        assert!(!slightly_negative.is_feasible(0.0));
        let nan = StateVector {
            v: f64::NAN,
            ..StateVector::INITIAL
        };
        assert!(!nan.is_feasible(1e-6));
        assert_eq!(StateVector::INITIAL.get(Compartment::Infectious), 1.0);
    }
}
