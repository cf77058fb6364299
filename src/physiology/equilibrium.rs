//! Closed-form steady state of the compartmental model
//!
//! With constant inputs every subsystem settles independently, upstream
//! first:
//!
//! 1. Exercise: PVO2max = target, PGUA = PGUA_ss(target)
//! 2. Gut: G1 = G2 = Ag·D·tMaxg (only if the gut can pass Ag·D at all)
//! 3. Insulin depots: positive root of the Michaelis–Menten balance
//!    r·Q + Vmax·Q/(km + Q) = s, i.e. r·Q² + (r·km + Vmax − s)·Q − s·km = 0
//! 4. Plasma insulin, then the three insulin actions
//! 5. Glucose: the mass balance is linear in Q1 on each piecewise branch;
//!    the branch whose solution is self-consistent is taken
//! 6. Interstitial glucose equals plasma glucose

use super::model::{compartment, GlucoseInsulinModel, PancreasState, NON_INSULIN_UPTAKE_THRESHOLD, STATE_DIM};
use super::params::steady_pgua_from_pvo2max;
use crate::error::{DynamicsError, Result};

/// Depot mass Q solving r·Q + Vmax·Q/(km + Q) = s
fn depot_equilibrium(infusion: f64, rate: f64, vmax: f64, km: f64) -> f64 {
    let a = rate;
    let b = rate * km + vmax - infusion;
    let c = -infusion * km;
    // c <= 0 and a > 0, so the discriminant is non-negative and the larger
    // root is the non-negative one
    (-b + (b * b - 4.0 * a * c).sqrt()) / (2.0 * a)
}

impl GlucoseInsulinModel {
    /// Equilibrium state under the configured insulin rate and disturbances
    ///
    /// Fails with a configuration error when no physiological (finite,
    /// non-negative) equilibrium exists: a carbohydrate rate the gut cannot
    /// absorb, or insulin high enough to drive endogenous production
    /// negative.
    pub fn basal_steady_state(&self) -> Result<PancreasState> {
        use compartment::*;

        let p = self.params();
        let config = self.config();
        let dist = &config.disturbances;
        let u = config.basal_rate;
        let mut y = [0.0; STATE_DIM];

        // Exercise
        let pvo2max = dist.target_pvo2max;
        let pgua = steady_pgua_from_pvo2max(pvo2max, p);
        y[PVO2MAX] = pvo2max;
        y[PGUA] = pgua;

        // Gut
        let appearance = p.ag * dist.carbohydrate;
        if appearance > p.ug_ceil {
            return Err(DynamicsError::config(format!(
                "carbohydrate appearance {:.4} mmol/min exceeds gut ceiling {:.4}",
                appearance, p.ug_ceil
            )));
        }
        let gut_mass = appearance * p.t_max_g;
        y[G1] = gut_mass;
        y[G2] = gut_mass;

        // Insulin depots and plasma
        let slow = depot_equilibrium(p.k * u, p.kia1, p.vmax_ld, p.km_ld);
        let fast = depot_equilibrium((1.0 - p.k) * u, p.kia2, p.vmax_ld, p.km_ld);
        y[Q1A] = slow;
        y[Q2I] = slow;
        y[Q1B] = fast;
        y[Q3] = (p.kia1 * slow + p.kia2 * fast) / p.k_e;
        let insulin = y[Q3] / p.v_i;

        // Insulin action
        let mm = dist.muscle_mass;
        let m_pgu = 1.0 + pgua * mm * p.m_pgu_f;
        let m_piu = 1.0 + mm * p.m_piu_f;
        let m_hgp = 1.0 + pgua * mm * p.m_hgp_f;
        let (k_b1, k_b2, k_b3) = p.activation_rates();
        let x1 = m_pgu * m_piu * k_b1 * insulin / p.ka_1;
        let x2 = m_pgu * m_piu * k_b2 * insulin / p.ka_2;
        let x3 = m_hgp * k_b3 * insulin / p.ka_3;
        y[X1] = x1;
        y[X2] = x2;
        y[X3] = x3;

        // Glucose: supply = F_01c(G) + disposal·Q1 + F_R(G)
        let supply = appearance + p.egp_0 * (1.0 - x3);
        let disposal = x1 * x2 / (p.k12 + x2);
        let q1 = self.solve_glucose_mass(supply, disposal)?;
        y[Q1] = q1;
        y[Q2] = x1 * q1 / (p.k12 + x2);
        y[C] = q1 / p.v_g;

        for (index, value) in y.iter().enumerate() {
            // PGUA_ss is unclamped and may sit below zero for low targets
            let negative = *value < 0.0 && index != PGUA;
            if !value.is_finite() || negative {
                return Err(DynamicsError::config(format!(
                    "no physiological equilibrium: {} = {}",
                    NAMES[index], value
                )));
            }
        }

        Ok(y)
    }

    fn solve_glucose_mass(&self, supply: f64, disposal: f64) -> Result<f64> {
        let p = self.params();
        let low_threshold = NON_INSULIN_UPTAKE_THRESHOLD * p.v_g;
        let renal_threshold = p.r_thr * p.v_g;

        // Middle branch: 4.5 <= G < R_thr
        let q1 = (supply - p.f_01) / disposal;
        if q1 >= low_threshold && q1 < renal_threshold {
            return Ok(q1);
        }

        // Hypoglycemic branch: F_01 scales with G
        if q1 < low_threshold {
            let q1 = supply / (p.f_01 / low_threshold + disposal);
            if q1 >= 0.0 {
                return Ok(q1);
            }
            return Err(DynamicsError::config(format!(
                "no physiological equilibrium: glucose supply {:.4} mmol/min is negative",
                supply
            )));
        }

        // Renal branch: F_R = R_cl·(Q1 − R_thr·V_G)
        Ok((supply - p.f_01 + p.r_cl * renal_threshold) / (disposal + p.r_cl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physiology::config::{Disturbances, SimulationConfig};

    fn assert_at_rest(model: &GlucoseInsulinModel, y: &PancreasState) {
        let dydt = model.derivatives(y);
        for (i, rate) in dydt.iter().enumerate() {
            let scale = y[i].abs().max(1.0);
            assert!(
                rate.abs() / scale < 1e-10,
                "{} not stationary: dy = {}",
                compartment::NAMES[i],
                rate
            );
        }
    }

    #[test]
    fn test_default_equilibrium_values() {
        let model = GlucoseInsulinModel::default();
        let y = model.basal_steady_state().unwrap();

        let expected: [f64; STATE_DIM] = [
            105.1245, 35.38333, 878.9889, 878.9889, 74.26226, 65.68035, 0.0279168, 0.00364132, 0.233045,
            0.0, 0.0, 7.8, 0.0, 8.0,
        ];
        for i in 0..STATE_DIM {
            let tol = 1e-4 * expected[i].abs().max(1e-3);
            assert!(
                (y[i] - expected[i]).abs() < tol,
                "{}: got {}, expected {}",
                compartment::NAMES[i],
                y[i],
                expected[i]
            );
        }
        assert!((model.glucose(&y) - 7.8).abs() < 1e-9);
    }

    #[test]
    fn test_equilibrium_is_stationary() {
        let model = GlucoseInsulinModel::default();
        let y = model.basal_steady_state().unwrap();
        assert_at_rest(&model, &y);
    }

    #[test]
    fn test_equilibrium_with_meal_and_exercise() {
        let config = SimulationConfig {
            body_weight: 82.0,
            disturbances: Disturbances {
                carbohydrate: 0.5,
                muscle_mass: 0.2,
                target_pvo2max: 30.0,
            },
            ..SimulationConfig::default()
        };
        let model = GlucoseInsulinModel::new(config).unwrap();
        let y = model.basal_steady_state().unwrap();
        assert_at_rest(&model, &y);
        assert!(y[compartment::G1] > 0.0);
    }

    #[test]
    fn test_low_insulin_reaches_renal_branch() {
        let config = SimulationConfig {
            basal_rate: 2.0,
            ..SimulationConfig::default()
        };
        let model = GlucoseInsulinModel::new(config).unwrap();
        let y = model.basal_steady_state().unwrap();
        assert!(model.glucose(&y) >= model.params().r_thr);
        assert_at_rest(&model, &y);
    }

    #[test]
    fn test_high_insulin_reaches_hypoglycemic_branch() {
        let config = SimulationConfig {
            basal_rate: 30.0,
            ..SimulationConfig::default()
        };
        let model = GlucoseInsulinModel::new(config).unwrap();
        let y = model.basal_steady_state().unwrap();
        assert!(model.glucose(&y) < NON_INSULIN_UPTAKE_THRESHOLD);
        assert_at_rest(&model, &y);
    }

    #[test]
    fn test_unabsorbable_meal_has_no_equilibrium() {
        let config = SimulationConfig {
            disturbances: Disturbances {
                carbohydrate: 100.0,
                ..Disturbances::default()
            },
            ..SimulationConfig::default()
        };
        let model = GlucoseInsulinModel::new(config).unwrap();
        assert!(matches!(
            model.basal_steady_state(),
            Err(DynamicsError::Configuration(_))
        ));
    }
}
