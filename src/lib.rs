//! # Pancreas-Dynamics
//!
//! Glucose-Insulin Dynamics and Stochastic Trajectory Datasets
//!
//! ## Overview
//!
//! This crate has two independent halves that share an integration layer
//! and an error taxonomy:
//!
//! 1. **Physiology**: a 14-compartment Hovorka-type model of glucose,
//!    insulin, gut absorption and exercise for a subject with type 1
//!    diabetes, with body-weight parameterization, a closed-form basal
//!    equilibrium and RK4 forward simulation.
//!
//! 2. **Dataset**: a pipeline that samples trajectories of a stochastic
//!    model (by default a noisy FitzHugh-Nagumo neuron), measures one
//!    channel through a noisy sensor, labels each trajectory from its
//!    future segment and bundles everything into a training artifact.
//!
//! ### Numerical Layer
//!
//! Both halves integrate through [`integrate`]: classical RK4 for the
//! deterministic model and Euler–Maruyama for the stochastic one. Every
//! step is checked for NaN/Inf and fails with [`DynamicsError::Numerical`]
//! instead of propagating garbage.
//!
//! ### Randomness
//!
//! No global random state: every random operation takes an injected
//! [`rand::Rng`], so a seeded generator reproduces a dataset exactly.
//!
//! ## References
//!
//! - Hovorka, R., et al. (2004). Physiological Measurement, 25(4), 905-920.
//! - FitzHugh, R. (1961). Biophysical Journal, 1(6), 445-466.
//!
//! ## Author
//!
//! Francisco Molina-Burgos
//! Avermex Research Division
//! Mérida, Yucatán, México
//! 2026

pub mod dataset;
pub mod error;
pub mod integrate;
pub mod physiology;
pub mod systems;

pub use error::{DynamicsError, Result};
pub use integrate::{euler_maruyama_step, rk4_step, OdeSystem};

// Re-exports from physiology
pub use physiology::{
    GlucoseInsulinModel,
    HovorkaParams,
    PancreasSimulation,
    PancreasSnapshot,
    PancreasState,
    SimulationConfig,
    Disturbances,
};

// Re-exports from systems
pub use systems::{
    SpikingNeuron,
    DynamicalSystem,
    Controllable,
    StochasticModel,
};

// Re-exports from dataset
pub use dataset::{
    Dataset,
    DatasetConfig,
    DatasetMetadata,
    LabelGenerator,
    LabelRule,
    MiniBatch,
    NoisySensor,
    SpikeThreshold,
    TrajectoryGenerator,
    build_dataset,
    generate_and_save,
};
