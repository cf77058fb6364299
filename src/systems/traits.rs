//! Dynamical System Traits: Shared API for Simulation and Dataset Generation
//!
//! Two kinds of systems live in this crate:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  DynamicalSystem (stateful, deterministic)                  │
//! │  + step()              - Advance system by dt               │
//! │  + run(n)              - Run n steps                        │
//! │  + state()             - Current state snapshot             │
//! │  + state_dimension()   - Dimension of state space           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  StochasticModel (stateless, randomness injected)           │
//! │  + initial_state(rng)  - Draw a starting point              │
//! │  + advance(t, x, rng)  - One sampling interval of the SDE   │
//! │  + observable_channel()- Component a sensor can see         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! `StochasticModel` never owns a random source: the trajectory generator
//! passes its own, so a seeded generator reproduces every trajectory.

use rand::Rng;

use crate::error::Result;

/// Trait for stateful systems advanced by a deterministic integrator
pub trait DynamicalSystem {
    /// State type for this system
    type State;

    /// Advance system by one timestep
    fn step(&mut self) -> Result<()>;

    /// Run multiple timesteps, stopping at the first failure
    fn run(&mut self, n_steps: usize) -> Result<()> {
        for _ in 0..n_steps {
            self.step()?;
        }
        Ok(())
    }

    /// Get current state snapshot
    fn state(&self) -> Self::State;

    /// Dimension of state space
    fn state_dimension(&self) -> usize;

    /// Simulated time
    fn time(&self) -> f64;
}

/// Trait for systems with controllable parameters
pub trait Controllable {
    /// Parameter type (infusion rate, input current, ...)
    type Parameter;

    /// Set control parameter
    fn set_parameter(&mut self, param: Self::Parameter);

    /// Get current parameter value
    fn get_parameter(&self) -> Self::Parameter;

    /// Ramp parameter gradually, running the system between increments
    fn ramp_parameter(&mut self, target: Self::Parameter, rate: f64, steps_per_increment: usize) -> Result<()>;
}

/// Stochastic system sampled at a fixed interval
pub trait StochasticModel {
    /// Dimension of the full state
    fn state_dimension(&self) -> usize;

    /// Index of the component exposed to measurement
    fn observable_channel(&self) -> usize;

    /// Time between two recorded samples
    fn sampling_interval(&self) -> f64;

    /// Draw an initial state
    fn initial_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64>;

    /// Advance `state` in place by one sampling interval starting at `t`
    fn advance<R: Rng + ?Sized>(&self, t: f64, state: &mut [f64], rng: &mut R) -> Result<()>;

    /// Check the parameters admit an initial draw and a step
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}
