//! Glucose-insulin compartmental model: the ODE right-hand side
//!
//! Fourteen coupled compartments:
//!
//! ```text
//!  gut G1 → G2 ──U_g──┐                       ┌── F_01c, F_R (losses)
//!                     ▼                       │
//!  EGP_0(1-x3) ──→  Q1 (accessible) ⇄ Q2 (non-accessible)
//!                     │ x1          x2 │ disposal
//!                     ▼
//!                     C (interstitial, lag ka_int)
//!
//!  u ─K──→ Q1a → Q2i ──┐
//!    └1-K→ Q1b ────────┴→ Q3 (plasma insulin) → x1, x2, x3
//!
//!  PVO2max → PGUA → exercise multipliers M_PGU, M_PIU, M_HGP
//! ```
//!
//! Both absorption depots lose insulin through saturable local degradation
//! Vmax_LD·Q / (km_LD + Q). Non-insulin uptake and renal clearance are
//! piecewise in plasma glucose with `>=` at each boundary.

use serde::{Deserialize, Serialize};

use super::config::SimulationConfig;
use super::params::{steady_pgua_from_pvo2max, HovorkaParams};
use crate::error::{DynamicsError, Result};
use crate::integrate::{ensure_finite, OdeSystem};

/// Number of compartments in the state vector
pub const STATE_DIM: usize = 14;

/// Full model state, ordered as in [`compartment`]
pub type PancreasState = [f64; STATE_DIM];

/// Plasma glucose (mmol/L) at and above which non-insulin uptake saturates
pub const NON_INSULIN_UPTAKE_THRESHOLD: f64 = 4.5;

/// Indices into [`PancreasState`]
pub mod compartment {
    /// Glucose mass, accessible compartment (mmol)
    pub const Q1: usize = 0;
    /// Glucose mass, non-accessible compartment (mmol)
    pub const Q2: usize = 1;
    /// Slow-channel insulin depot, first stage (mU)
    pub const Q1A: usize = 2;
    /// Slow-channel insulin depot, second stage (mU)
    pub const Q2I: usize = 3;
    /// Fast-channel insulin depot (mU)
    pub const Q1B: usize = 4;
    /// Plasma insulin mass (mU)
    pub const Q3: usize = 5;
    /// Insulin effect on glucose distribution (1/min)
    pub const X1: usize = 6;
    /// Insulin effect on glucose disposal (1/min)
    pub const X2: usize = 7;
    /// Insulin suppression of endogenous production
    pub const X3: usize = 8;
    /// Gut glucose, accessible (mmol)
    pub const G1: usize = 9;
    /// Gut glucose, non-accessible (mmol)
    pub const G2: usize = 10;
    /// Interstitial glucose concentration (mmol/L)
    pub const C: usize = 11;
    /// Peripheral glucose uptake activity
    pub const PGUA: usize = 12;
    /// Exercise intensity, % of maximal oxygen uptake
    pub const PVO2MAX: usize = 13;

    /// Symbol of each component, by index
    pub const NAMES: [&str; super::STATE_DIM] = [
        "Q1", "Q2", "Q1a", "Q2i", "Q1b", "Q3", "x1", "x2", "x3", "G1", "G2", "C", "PGUA", "PVO2max",
    ];
}

/// Corrected non-insulin-mediated glucose uptake F_01c
///
/// Saturates at F_01 for G >= 4.5 mmol/L, linear below. Continuous at the
/// boundary with a kink in its slope.
pub fn non_insulin_uptake(glucose: f64, params: &HovorkaParams) -> f64 {
    if glucose >= NON_INSULIN_UPTAKE_THRESHOLD {
        params.f_01
    } else {
        params.f_01 * glucose / NON_INSULIN_UPTAKE_THRESHOLD
    }
}

/// Renal glucose clearance F_R, zero below the renal threshold
pub fn renal_clearance(glucose: f64, params: &HovorkaParams) -> f64 {
    if glucose >= params.r_thr {
        params.r_cl * (glucose - params.r_thr) * params.v_g
    } else {
        0.0
    }
}

/// Saturable local insulin degradation at an absorption depot
pub fn local_degradation(mass: f64, params: &HovorkaParams) -> f64 {
    params.vmax_ld * mass / (params.km_ld + mass)
}

/// Gut absorption time constant, bounded below by tMaxg
pub fn gut_time_constant(g2: f64, params: &HovorkaParams) -> f64 {
    params.t_max_g.max(g2 / params.ug_ceil)
}

/// Glucose-insulin model bound to one subject and one input scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelParts")]
pub struct GlucoseInsulinModel {
    params: HovorkaParams,
    config: SimulationConfig,
}

/// Unchecked serialized form; deserialization goes through `with_params`
#[derive(Deserialize)]
struct ModelParts {
    params: HovorkaParams,
    config: SimulationConfig,
}

impl TryFrom<ModelParts> for GlucoseInsulinModel {
    type Error = DynamicsError;

    fn try_from(parts: ModelParts) -> Result<Self> {
        Self::with_params(parts.params, parts.config)
    }
}

impl GlucoseInsulinModel {
    /// Build the model, deriving parameters from the configured body weight
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let params = config.params()?;
        Ok(Self { params, config })
    }

    /// Use an explicit parameter set; `config.body_weight` is ignored
    pub fn with_params(params: HovorkaParams, config: SimulationConfig) -> Result<Self> {
        params.validate()?;
        config.validate()?;
        Ok(Self { params, config })
    }

    pub fn params(&self) -> &HovorkaParams {
        &self.params
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Plasma glucose concentration G = Q1 / V_G (mmol/L)
    pub fn glucose(&self, y: &PancreasState) -> f64 {
        y[compartment::Q1] / self.params.v_g
    }

    /// Plasma insulin concentration I = Q3 / V_I (mU/L)
    pub fn plasma_insulin(&self, y: &PancreasState) -> f64 {
        y[compartment::Q3] / self.params.v_i
    }

    /// Rate of change of every compartment at state `y`
    pub fn derivatives(&self, y: &PancreasState) -> PancreasState {
        use compartment::*;

        let p = &self.params;
        let u = self.config.basal_rate;
        let dist = &self.config.disturbances;
        let mut dydt = [0.0; STATE_DIM];

        // Glucose kinetics
        let q1 = y[Q1];
        let q2 = y[Q2];
        let g = q1 / p.v_g;
        let f_01c = non_insulin_uptake(g, p);
        let f_r = renal_clearance(g, p);

        // Insulin kinetics
        let q1a = y[Q1A];
        let q2i = y[Q2I];
        let q1b = y[Q1B];
        let q3 = y[Q3];
        let insulin = q3 / p.v_i;

        // Insulin action
        let x1 = y[X1];
        let x2 = y[X2];
        let x3 = y[X3];
        let (k_b1, k_b2, k_b3) = p.activation_rates();

        // Gut absorption
        let g1 = y[G1];
        let g2 = y[G2];
        let tmax = gut_time_constant(g2, p);
        let u_g = g2 / tmax;

        // Exercise
        let pgua = y[PGUA];
        let pvo2max = y[PVO2MAX];
        let mm = dist.muscle_mass;
        let m_pgu = 1.0 + pgua * mm * p.m_pgu_f;
        let m_piu = 1.0 + mm * p.m_piu_f;
        let m_hgp = 1.0 + pgua * mm * p.m_hgp_f;
        let pgua_ss = steady_pgua_from_pvo2max(pvo2max, p);

        let q1_to_q2 = x1 * q1 - p.k12 * q2;
        dydt[Q1] = -f_01c - q1_to_q2 - f_r + u_g + p.egp_0 * (1.0 - x3);
        dydt[Q2] = q1_to_q2 - x2 * q2;

        let q1a_to_q2i = p.kia1 * q1a;
        let q2i_to_q3 = p.kia1 * q2i;
        let q1b_to_q3 = p.kia2 * q1b;
        let slow_infusion = p.k * u;
        dydt[Q1A] = slow_infusion - q1a_to_q2i - local_degradation(q1a, p);
        dydt[Q2I] = q1a_to_q2i - q2i_to_q3;
        dydt[Q1B] = u - slow_infusion - q1b_to_q3 - local_degradation(q1b, p);
        dydt[Q3] = q2i_to_q3 + q1b_to_q3 - p.k_e * q3;

        dydt[X1] = -p.ka_1 * x1 + m_pgu * m_piu * k_b1 * insulin;
        dydt[X2] = -p.ka_2 * x2 + m_pgu * m_piu * k_b2 * insulin;
        dydt[X3] = -p.ka_3 * x3 + m_hgp * k_b3 * insulin;

        let g1_to_g2 = g1 / tmax;
        dydt[G1] = -g1_to_g2 + p.ag * dist.carbohydrate;
        dydt[G2] = g1_to_g2 - g2 / tmax;

        dydt[C] = p.ka_int * (g - y[C]);

        dydt[PGUA] = p.pgua_rate * (pgua_ss - pgua);
        dydt[PVO2MAX] = p.pvo2max_rate * (dist.target_pvo2max - pvo2max);

        dydt
    }

    /// [`derivatives`](Self::derivatives) with a NaN/Inf check on the result
    pub fn checked_derivatives(&self, t: f64, y: &PancreasState) -> Result<PancreasState> {
        let dydt = self.derivatives(y);
        ensure_finite(&dydt, "derivative", t)?;
        Ok(dydt)
    }
}

impl Default for GlucoseInsulinModel {
    fn default() -> Self {
        Self {
            params: HovorkaParams::default(),
            config: SimulationConfig::default(),
        }
    }
}

impl OdeSystem for GlucoseInsulinModel {
    fn dimension(&self) -> usize {
        STATE_DIM
    }

    fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        let mut state = [0.0; STATE_DIM];
        state.copy_from_slice(y);
        dydt.copy_from_slice(&self.derivatives(&state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physiology::config::Disturbances;

    /// Basal equilibrium of the default subject
    fn basal_state() -> PancreasState {
        GlucoseInsulinModel::default().basal_steady_state().unwrap()
    }

    fn state_at_glucose(model: &GlucoseInsulinModel, g: f64) -> PancreasState {
        let mut y = basal_state();
        y[compartment::Q1] = g * model.params().v_g;
        y
    }

    #[test]
    fn test_non_insulin_uptake_continuity() {
        let p = HovorkaParams::default();
        assert_eq!(non_insulin_uptake(4.5, &p), p.f_01);
        assert_eq!(non_insulin_uptake(12.0, &p), p.f_01);

        let mut previous = 0.0;
        for k in 1..=6 {
            let g = 4.5 - 10f64.powi(-k);
            let value = non_insulin_uptake(g, &p);
            assert!(value < p.f_01, "uptake below threshold must be < F_01");
            assert!(value > previous, "uptake must increase toward the boundary");
            previous = value;
        }
        assert!((p.f_01 - previous).abs() < 1e-5);
    }

    #[test]
    fn test_renal_clearance_boundary() {
        let p = HovorkaParams::default();
        assert_eq!(renal_clearance(9.0, &p), 0.0);
        assert_eq!(renal_clearance(8.999, &p), 0.0);
        let above = renal_clearance(9.0 + 1e-9, &p);
        assert!(above > 0.0 && above < 1e-9);
        assert!((renal_clearance(11.0, &p) - 0.003 * 2.0 * p.v_g).abs() < 1e-12);
    }

    #[test]
    fn test_derivative_zero_at_basal_equilibrium() {
        let model = GlucoseInsulinModel::default();
        let dydt = model.derivatives(&basal_state());
        for (i, rate) in dydt.iter().enumerate() {
            assert!(
                rate.abs() < 1e-10,
                "component {} ({}) not at rest: {}",
                i,
                compartment::NAMES[i],
                rate
            );
        }
    }

    #[test]
    fn test_glucose_rate_continuous_at_thresholds() {
        let model = GlucoseInsulinModel::default();
        for &threshold in &[NON_INSULIN_UPTAKE_THRESHOLD, model.params().r_thr] {
            let at = model.derivatives(&state_at_glucose(&model, threshold))[compartment::Q1];
            let below = model.derivatives(&state_at_glucose(&model, threshold - 1e-9))[compartment::Q1];
            assert!((at - below).abs() < 1e-6, "dQ1 jumps at G = {}", threshold);
        }
    }

    #[test]
    fn test_hyperglycemia_lowers_glucose() {
        let model = GlucoseInsulinModel::default();
        let dydt = model.derivatives(&state_at_glucose(&model, 15.0));
        assert!(dydt[compartment::Q1] < 0.0);
        // Interstitial glucose lags upward toward plasma
        assert!(dydt[compartment::C] > 0.0);
    }

    #[test]
    fn test_meal_fills_gut() {
        let config = SimulationConfig {
            disturbances: Disturbances { carbohydrate: 2.0, ..Disturbances::default() },
            ..SimulationConfig::default()
        };
        let model = GlucoseInsulinModel::new(config).unwrap();
        let dydt = model.derivatives(&basal_state());
        assert!((dydt[compartment::G1] - 0.8121 * 2.0).abs() < 1e-12);
        assert_eq!(dydt[compartment::G2], 0.0);
    }

    #[test]
    fn test_exercise_amplifies_insulin_action() {
        let rest = GlucoseInsulinModel::default();
        let config = SimulationConfig {
            disturbances: Disturbances { muscle_mass: 0.5, ..Disturbances::default() },
            ..SimulationConfig::default()
        };
        let active = GlucoseInsulinModel::new(config).unwrap();
        let mut y = basal_state();
        y[compartment::PGUA] = 20.0;

        let d_rest = rest.derivatives(&y);
        let d_active = active.derivatives(&y);
        assert!(d_active[compartment::X1] > d_rest[compartment::X1]);
        assert!(d_active[compartment::X3] > d_rest[compartment::X3]);
    }

    #[test]
    fn test_gut_time_constant_lower_bound() {
        let p = HovorkaParams::default();
        assert_eq!(gut_time_constant(0.0, &p), p.t_max_g);
        let large = 1000.0 * p.ug_ceil;
        assert!((gut_time_constant(large, &p) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_checked_derivatives_reports_nan() {
        let model = GlucoseInsulinModel::default();
        let mut y = basal_state();
        y[compartment::Q1B] = f64::NAN;
        let err = model.checked_derivatives(5.0, &y).unwrap_err();
        assert!(matches!(err, DynamicsError::Numerical { quantity: "derivative", .. }));
    }

    #[test]
    fn test_invalid_params_rejected_at_construction() {
        let params = HovorkaParams {
            bw: -5.0,
            v_g: 0.0,
            ..HovorkaParams::default()
        };
        let result = GlucoseInsulinModel::with_params(params, SimulationConfig::default());
        assert!(matches!(result, Err(DynamicsError::Configuration(_))));
    }

    #[test]
    fn test_deserialization_validates_params() {
        let model = GlucoseInsulinModel::default();
        let json = serde_json::to_string(&model).unwrap();
        let back: GlucoseInsulinModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);

        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["params"]["v_i"] = serde_json::json!(0.0);
        let result: std::result::Result<GlucoseInsulinModel, _> = serde_json::from_value(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_derivatives_are_pure() {
        let model = GlucoseInsulinModel::default();
        let y = state_at_glucose(&model, 6.3);
        let first = model.derivatives(&y);
        let second = model.derivatives(&y);
        assert_eq!(first, second);
    }
}
