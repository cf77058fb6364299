//! Dynamical Systems Module
//!
//! Shared traits plus the stochastic neuron that feeds the dataset pipeline:
//!
//! - **DynamicalSystem / Controllable**: stateful, deterministic simulation
//!   (implemented by the pancreas simulation)
//! - **StochasticModel**: stateless SDE sampled with an injected RNG
//! - **SpikingNeuron**: noisy FitzHugh-Nagumo neuron

mod spiking_neuron;
mod traits;

pub use spiking_neuron::{SpikingNeuron, MEMBRANE_POTENTIAL, RECOVERY};
pub use traits::{Controllable, DynamicalSystem, StochasticModel};
