//! Exogenous inputs of the compartmental model
//!
//! Everything the model does not compute itself (subject weight, insulin
//! dosing, meals, exercise) lives here so a controller or scenario can swap
//! it without touching the right-hand side.

use serde::{Deserialize, Serialize};

use super::params::{HovorkaParams, DEFAULT_BODY_WEIGHT};
use crate::error::{DynamicsError, Result};

/// Basal insulin infusion rate (mU/min) that holds the default subject at
/// 7.8 mmol/L
pub const DEFAULT_BASAL_RATE: f64 = 16.0146096438259;

/// Disturbances acting on the subject, held constant over a simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Disturbances {
    /// Ingested carbohydrate rate D (mmol/min)
    pub carbohydrate: f64,
    /// Active muscular mass MM (fraction)
    pub muscle_mass: f64,
    /// Target PVO2max the exercise state relaxes toward (%)
    pub target_pvo2max: f64,
}

impl Default for Disturbances {
    fn default() -> Self {
        Self {
            carbohydrate: 0.0,
            muscle_mass: 0.0,
            target_pvo2max: 8.0,
        }
    }
}

/// Configuration of one compartmental-model simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Subject body weight (kg)
    pub body_weight: f64,
    /// Insulin infusion u (mU/min)
    pub basal_rate: f64,
    /// Meal and exercise inputs
    pub disturbances: Disturbances,
    /// Integration step (min)
    pub dt: f64,
    /// Number of states kept in the simulation history
    pub max_history: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            body_weight: DEFAULT_BODY_WEIGHT,
            basal_rate: DEFAULT_BASAL_RATE,
            disturbances: Disturbances::default(),
            dt: 1.0,
            max_history: 1440,
        }
    }
}

impl SimulationConfig {
    /// Check every numeric input before any derivative is evaluated
    pub fn validate(&self) -> Result<()> {
        let d = &self.disturbances;
        let checks = [
            ("basal_rate", self.basal_rate, self.basal_rate >= 0.0),
            ("carbohydrate", d.carbohydrate, d.carbohydrate >= 0.0),
            ("muscle_mass", d.muscle_mass, d.muscle_mass >= 0.0),
            ("target_pvo2max", d.target_pvo2max, true),
            ("dt", self.dt, self.dt > 0.0),
        ];
        for (name, value, in_range) in checks {
            if !value.is_finite() || !in_range {
                return Err(DynamicsError::config(format!("{} out of range: {}", name, value)));
            }
        }
        Ok(())
    }

    /// Validate and derive the subject's parameter set
    pub fn params(&self) -> Result<HovorkaParams> {
        self.validate()?;
        HovorkaParams::new(self.body_weight)
    }
}
