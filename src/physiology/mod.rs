//! Physiology Module: Glucose-Insulin Compartmental Model
//!
//! A Hovorka-type model of a subject with type 1 diabetes on subcutaneous
//! insulin, extended with exercise states:
//!
//! - **params**: constants derived from body weight
//! - **config**: insulin rate, meal and exercise disturbances
//! - **model**: the 14-state ODE right-hand side
//! - **equilibrium**: closed-form basal steady state
//! - **simulation**: RK4 forward simulation with a controllable insulin rate
//!
//! ## References
//!
//! - Hovorka, R., et al. (2004). Nonlinear model predictive control of
//!   glucose concentration in subjects with type 1 diabetes.
//!   Physiological Measurement, 25(4), 905-920.

mod config;
mod equilibrium;
mod model;
mod params;
mod simulation;

pub use config::{Disturbances, SimulationConfig, DEFAULT_BASAL_RATE};
pub use model::{
    compartment, gut_time_constant, local_degradation, non_insulin_uptake, renal_clearance, GlucoseInsulinModel,
    PancreasState, NON_INSULIN_UPTAKE_THRESHOLD, STATE_DIM,
};
pub use params::{steady_pgua_from_pvo2max, HovorkaParams, DEFAULT_BODY_WEIGHT};
pub use simulation::{PancreasSimulation, PancreasSnapshot};
