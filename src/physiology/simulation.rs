//! Forward simulation of the glucose-insulin model
//!
//! Fixed-step RK4 from a given (by default basal) state, with a bounded
//! history of past states for inspection.

use std::collections::VecDeque;

use super::config::SimulationConfig;
use super::model::{compartment, GlucoseInsulinModel, PancreasState, STATE_DIM};
use crate::error::{DynamicsError, Result};
use crate::integrate::rk4_step;
use crate::systems::{Controllable, DynamicalSystem};

/// Snapshot of a running simulation
#[derive(Debug, Clone, PartialEq)]
pub struct PancreasSnapshot {
    /// Full compartment state
    pub state: PancreasState,
    /// Plasma glucose (mmol/L)
    pub glucose: f64,
    /// Interstitial glucose, what a CGM would read (mmol/L)
    pub interstitial_glucose: f64,
    /// Plasma insulin (mU/L)
    pub insulin: f64,
    /// Insulin infusion rate in effect (mU/min)
    pub basal_rate: f64,
    /// Simulation time (min)
    pub time: f64,
}

/// Artificial-pancreas subject integrated forward in time
pub struct PancreasSimulation {
    model: GlucoseInsulinModel,
    state: PancreasState,
    time: f64,
    history: VecDeque<PancreasState>,
}

impl PancreasSimulation {
    /// Start at the basal equilibrium of `config`
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let model = GlucoseInsulinModel::new(config)?;
        let state = model.basal_steady_state()?;
        Ok(Self::from_parts(model, state))
    }

    /// Start from an arbitrary state
    pub fn with_state(config: SimulationConfig, state: PancreasState) -> Result<Self> {
        let model = GlucoseInsulinModel::new(config)?;
        Ok(Self::from_parts(model, state))
    }

    fn from_parts(model: GlucoseInsulinModel, state: PancreasState) -> Self {
        let mut history = VecDeque::with_capacity(model.config().max_history.min(4096));
        history.push_back(state);
        let mut sim = Self {
            model,
            state,
            time: 0.0,
            history,
        };
        sim.trim_history();
        sim
    }

    fn trim_history(&mut self) {
        while self.history.len() > self.model.config().max_history {
            self.history.pop_front();
        }
    }

    pub fn model(&self) -> &GlucoseInsulinModel {
        &self.model
    }

    /// Current compartment state
    pub fn current(&self) -> &PancreasState {
        &self.state
    }

    /// Plasma glucose (mmol/L)
    pub fn glucose(&self) -> f64 {
        self.model.glucose(&self.state)
    }

    /// Interstitial glucose (mmol/L)
    pub fn interstitial_glucose(&self) -> f64 {
        self.state[compartment::C]
    }

    /// Plasma insulin (mU/L)
    pub fn plasma_insulin(&self) -> f64 {
        self.model.plasma_insulin(&self.state)
    }

    /// Recorded states, oldest first
    pub fn history(&self) -> impl Iterator<Item = &PancreasState> {
        self.history.iter()
    }

    /// Plasma glucose over the recorded history
    pub fn glucose_trace(&self) -> Vec<f64> {
        self.history.iter().map(|y| self.model.glucose(y)).collect()
    }

    /// Clear recorded history, keeping the current state
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.history.push_back(self.state);
    }

    fn rebuild_model(&mut self, config: SimulationConfig) -> Result<()> {
        self.model = GlucoseInsulinModel::with_params(*self.model.params(), config)?;
        Ok(())
    }
}

impl DynamicalSystem for PancreasSimulation {
    type State = PancreasSnapshot;

    fn step(&mut self) -> Result<()> {
        let dt = self.model.config().dt;
        let next = rk4_step(&self.model, self.time, &self.state, dt)?;
        self.state.copy_from_slice(&next);
        self.time += dt;

        self.history.push_back(self.state);
        self.trim_history();
        Ok(())
    }

    fn state(&self) -> PancreasSnapshot {
        PancreasSnapshot {
            state: self.state,
            glucose: self.glucose(),
            interstitial_glucose: self.interstitial_glucose(),
            insulin: self.plasma_insulin(),
            basal_rate: self.model.config().basal_rate,
            time: self.time,
        }
    }

    fn state_dimension(&self) -> usize {
        STATE_DIM
    }

    fn time(&self) -> f64 {
        self.time
    }
}

impl Controllable for PancreasSimulation {
    type Parameter = f64;

    /// Set the insulin infusion rate; negative rates are clamped to zero
    fn set_parameter(&mut self, param: f64) {
        let mut config = *self.model.config();
        config.basal_rate = if param.is_finite() { param.max(0.0) } else { 0.0 };
        // A clamped, finite rate always passes validation
        if let Err(err) = self.rebuild_model(config) {
            log::warn!("ignoring insulin rate {}: {}", param, err);
        }
    }

    fn get_parameter(&self) -> f64 {
        self.model.config().basal_rate
    }

    fn ramp_parameter(&mut self, target: f64, rate: f64, steps_per_increment: usize) -> Result<()> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(DynamicsError::config(format!(
                "ramp rate must be a positive number, got {}",
                rate
            )));
        }
        if !target.is_finite() {
            return Err(DynamicsError::config("ramp target must be finite"));
        }

        let mut current = self.get_parameter();
        while (current - target).abs() > rate {
            self.run(steps_per_increment)?;
            if current < target {
                current += rate;
            } else {
                current -= rate;
            }
            self.set_parameter(current);
        }
        self.set_parameter(target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physiology::DEFAULT_BASAL_RATE;

    #[test]
    fn test_basal_simulation_stays_at_rest() {
        let mut sim = PancreasSimulation::new(SimulationConfig::default()).unwrap();
        let start = *sim.current();
        sim.run(600).unwrap();

        for i in 0..STATE_DIM {
            let scale = start[i].abs().max(1.0);
            assert!(
                (sim.current()[i] - start[i]).abs() / scale < 1e-8,
                "{} drifted from equilibrium",
                compartment::NAMES[i]
            );
        }
        assert!((sim.glucose() - 7.8).abs() < 1e-6);
        assert!((sim.time() - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_insulin_cut_raises_glucose() {
        let mut sim = PancreasSimulation::new(SimulationConfig::default()).unwrap();
        let g0 = sim.glucose();
        sim.set_parameter(0.0);
        sim.run(240).unwrap();
        assert!(sim.glucose() > g0 + 1.0, "glucose {} should rise above {}", sim.glucose(), g0);
        assert_eq!(sim.state().basal_rate, 0.0);
    }

    #[test]
    fn test_interstitial_glucose_lags_plasma() {
        let mut sim = PancreasSimulation::new(SimulationConfig::default()).unwrap();
        sim.set_parameter(0.0);
        sim.run(60).unwrap();
        let snap = sim.state();
        assert!(snap.interstitial_glucose < snap.glucose);
        assert!(snap.interstitial_glucose > 7.8);
    }

    #[test]
    fn test_negative_rate_is_clamped() {
        let mut sim = PancreasSimulation::new(SimulationConfig::default()).unwrap();
        sim.set_parameter(-5.0);
        assert_eq!(sim.get_parameter(), 0.0);
    }

    #[test]
    fn test_ramp_reaches_target() {
        let mut sim = PancreasSimulation::new(SimulationConfig::default()).unwrap();
        sim.ramp_parameter(20.0, 1.0, 5).unwrap();
        assert_eq!(sim.get_parameter(), 20.0);
        assert!(sim.time() > 0.0);
    }

    #[test]
    fn test_ramp_rejects_non_positive_rate() {
        let mut sim = PancreasSimulation::new(SimulationConfig::default()).unwrap();
        for &rate in &[0.0, -1.0, f64::NAN] {
            let result = sim.ramp_parameter(20.0, rate, 1);
            assert!(
                matches!(result, Err(DynamicsError::Configuration(_))),
                "rate {} should be rejected",
                rate
            );
        }
        // Nothing ran and the rate is untouched
        assert_eq!(sim.time(), 0.0);
        assert_eq!(sim.get_parameter(), DEFAULT_BASAL_RATE);
        assert!(sim.ramp_parameter(f64::INFINITY, 1.0, 1).is_err());
    }

    #[test]
    fn test_history_is_bounded() {
        let config = SimulationConfig {
            max_history: 50,
            ..SimulationConfig::default()
        };
        let mut sim = PancreasSimulation::new(config).unwrap();
        sim.run(200).unwrap();
        assert_eq!(sim.history().count(), 50);
        assert_eq!(sim.glucose_trace().len(), 50);

        sim.clear_history();
        assert_eq!(sim.history().count(), 1);
    }

    #[test]
    fn test_non_finite_state_fails_step() {
        let mut state = GlucoseInsulinModel::default().basal_steady_state().unwrap();
        state[compartment::Q3] = f64::NAN;
        let mut sim = PancreasSimulation::with_state(SimulationConfig::default(), state).unwrap();
        let err = sim.step().unwrap_err();
        assert!(matches!(err, DynamicsError::Numerical { .. }));
    }
}
