//! Hovorka-type parameter set for a subject of given body weight
//!
//! Mass- and volume-scaled constants are linear in body weight (BW, kg);
//! everything else is a population literal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DynamicsError, Result};

/// Body weight used when none is supplied (kg)
pub const DEFAULT_BODY_WEIGHT: f64 = 75.0;

/// Physiological constants of the glucose-insulin model
///
/// Built once per subject and borrowed by every derivative evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HovorkaParams {
    /// Body weight (kg)
    pub bw: f64,
    /// Plasma → interstitial glucose transfer rate (1/min)
    pub ka_int: f64,
    /// Endogenous glucose production at zero insulin (mmol/min)
    pub egp_0: f64,
    /// Non-insulin-dependent glucose flux (mmol/min)
    pub f_01: f64,
    /// Glucose distribution volume (L)
    pub v_g: f64,
    /// Non-accessible → accessible glucose transfer rate (1/min)
    pub k12: f64,
    /// Renal clearance threshold (mmol/L)
    pub r_thr: f64,
    /// Renal clearance rate (1/min)
    pub r_cl: f64,
    /// Carbohydrate bioavailability
    pub ag: f64,
    /// Minimum gut absorption time constant (min)
    pub t_max_g: f64,
    /// Ceiling on gut glucose appearance (mmol/min)
    pub ug_ceil: f64,
    /// Fraction of infusion entering the slow absorption channel
    pub k: f64,
    /// Slow channel absorption rate (1/min)
    pub kia1: f64,
    /// Fast channel absorption rate (1/min)
    pub kia2: f64,
    /// Plasma insulin elimination rate (1/min)
    pub k_e: f64,
    /// Maximal local insulin degradation (mU/min)
    pub vmax_ld: f64,
    /// Half-saturation mass of local degradation (mU)
    pub km_ld: f64,
    /// Insulin action deactivation rates (1/min)
    pub ka_1: f64,
    pub ka_2: f64,
    pub ka_3: f64,
    /// Insulin sensitivities: transport, disposal, EGP
    pub sit: f64,
    pub sid: f64,
    pub sie: f64,
    /// Insulin distribution volume (L)
    pub v_i: f64,
    /// Exercise gain on peripheral glucose uptake
    pub m_pgu_f: f64,
    /// Exercise gain on hepatic glucose production
    pub m_hgp_f: f64,
    /// Exercise gain on peripheral insulin uptake
    pub m_piu_f: f64,
    /// Relaxation rate of peripheral glucose uptake activity (1/min)
    pub pgua_rate: f64,
    /// Quadratic PGUA steady-state coefficients
    pub pgua_a: f64,
    pub pgua_b: f64,
    pub pgua_c: f64,
    /// Relaxation rate of PVO2max toward its target (1/min)
    pub pvo2max_rate: f64,
}

impl HovorkaParams {
    /// Derive all constants from body weight
    ///
    /// Body weight must be finite and strictly positive; anything else
    /// would propagate NaNs through every volume and flux.
    pub fn new(body_weight: f64) -> Result<Self> {
        if !body_weight.is_finite() || body_weight <= 0.0 {
            return Err(DynamicsError::config(format!(
                "body weight must be a positive number of kg, got {}",
                body_weight
            )));
        }
        Ok(Self::from_weight(body_weight))
    }

    fn from_weight(bw: f64) -> Self {
        Self {
            bw,
            ka_int: 0.025,
            egp_0: 0.0158 * bw,
            f_01: 0.0104 * bw,
            v_g: 0.1797 * bw,
            k12: 0.0793,
            r_thr: 9.0,
            r_cl: 0.003,
            ag: 0.8121,
            t_max_g: 48.8385,
            ug_ceil: 0.0275 * bw,
            k: 0.7958,
            kia1: 0.0113,
            kia2: 0.0197,
            k_e: 0.1735,
            vmax_ld: 2.9639,
            km_ld: 47.5305,
            ka_1: 0.007,
            ka_2: 0.0331,
            ka_3: 0.0308,
            sit: 0.0046,
            sid: 0.0006,
            sie: 0.0384,
            v_i: 0.1443 * bw,
            m_pgu_f: 1.0 / 35.0,
            m_hgp_f: 1.0 / 155.0,
            m_piu_f: 2.4,
            pgua_rate: 1.0 / 30.0,
            pgua_a: 0.006,
            pgua_b: 1.2264,
            pgua_c: -10.1952,
            pvo2max_rate: 5.0 / 3.0,
        }
    }

    /// Check every constant is finite and every volume, ceiling and
    /// divisor rate is strictly positive
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.to_map() {
            if !value.is_finite() {
                return Err(DynamicsError::config(format!("parameter {} is not finite: {}", name, value)));
            }
        }
        let positive = [
            ("BW", self.bw),
            ("V_G", self.v_g),
            ("V_I", self.v_i),
            ("Ug_ceil", self.ug_ceil),
            ("tMaxg", self.t_max_g),
            ("km_LD", self.km_ld),
            ("k_e", self.k_e),
            ("ka_1", self.ka_1),
            ("ka_2", self.ka_2),
            ("ka_3", self.ka_3),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(DynamicsError::config(format!("parameter {} must be positive, got {}", name, value)));
            }
        }
        Ok(())
    }

    /// Insulin action activation rates k_b1, k_b2, k_b3
    pub fn activation_rates(&self) -> (f64, f64, f64) {
        (self.ka_1 * self.sit, self.ka_2 * self.sid, self.ka_3 * self.sie)
    }

    /// Named view of the parameter set, keyed by the model's symbol names
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        [
            ("BW", self.bw),
            ("ka_int", self.ka_int),
            ("EGP_0", self.egp_0),
            ("F_01", self.f_01),
            ("V_G", self.v_g),
            ("k12", self.k12),
            ("R_thr", self.r_thr),
            ("R_cl", self.r_cl),
            ("Ag", self.ag),
            ("tMaxg", self.t_max_g),
            ("Ug_ceil", self.ug_ceil),
            ("K", self.k),
            ("kia1", self.kia1),
            ("kia2", self.kia2),
            ("k_e", self.k_e),
            ("Vmax_LD", self.vmax_ld),
            ("km_LD", self.km_ld),
            ("ka_1", self.ka_1),
            ("ka_2", self.ka_2),
            ("ka_3", self.ka_3),
            ("SIT", self.sit),
            ("SID", self.sid),
            ("SIE", self.sie),
            ("V_I", self.v_i),
            ("M_PGU_f", self.m_pgu_f),
            ("M_HGP_f", self.m_hgp_f),
            ("M_PIU_f", self.m_piu_f),
            ("PGUA_rate", self.pgua_rate),
            ("PGUA_a", self.pgua_a),
            ("PGUA_b", self.pgua_b),
            ("PGUA_c", self.pgua_c),
            ("PVO2max_rate", self.pvo2max_rate),
        ]
        .into_iter()
        .collect()
    }

    /// Look up one constant by symbol name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.to_map().get(name).copied()
    }
}

impl Default for HovorkaParams {
    fn default() -> Self {
        Self::from_weight(DEFAULT_BODY_WEIGHT)
    }
}

/// Steady-state peripheral glucose uptake activity for an exercise intensity
///
/// PGUA_ss = a·x² + b·x + c. Defined for every real input; negative
/// outputs are physically meaningless and deliberately left unclamped.
pub fn steady_pgua_from_pvo2max(pvo2max: f64, params: &HovorkaParams) -> f64 {
    params.pgua_a * pvo2max.powi(2) + params.pgua_b * pvo2max + params.pgua_c
}
