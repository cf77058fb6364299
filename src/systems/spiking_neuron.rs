//! Stochastic FitzHugh-Nagumo Neuron
//!
//! The FitzHugh-Nagumo model is a 2D simplification of Hodgkin-Huxley,
//! capturing the essential dynamics of neuronal excitability. Here the
//! membrane receives white-noise current:
//!
//!   dv = (v - v³/3 - w + I_ext)·dt + σ·dW
//!   dw = ε(v + a - b·w)·dt
//!
//! where:
//! - v: membrane potential (fast variable, the observable channel)
//! - w: recovery variable (slow variable)
//! - ε: timescale separation (small, ~0.08)
//! - a, b: shape parameters
//! - I_ext: external current
//! - σ: membrane noise intensity
//!
//! ## Why noise matters for classification
//!
//! Just below the Hopf point (I_c ≈ 0.33 for the standard shape) the
//! deterministic neuron rests, but noise can kick it over threshold. Whether
//! a spike follows a given observed window is then genuinely uncertain,
//! which is what makes the future-spike label a non-trivial target.
//!
//! ## References
//!
//! - FitzHugh, R. (1961). Impulses and physiological states in theoretical
//!   models of nerve membrane. Biophysical Journal, 1(6), 445-466.
//! - Lindner, B., et al. (2004). Effects of noise in excitable systems.
//!   Physics Reports, 392(6), 321-424.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::traits::StochasticModel;
use crate::error::{DynamicsError, Result};
use crate::integrate::{euler_maruyama_step, OdeSystem};

/// Index of the membrane potential
pub const MEMBRANE_POTENTIAL: usize = 0;
/// Index of the recovery variable
pub const RECOVERY: usize = 1;

/// Noisy FitzHugh-Nagumo neuron
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikingNeuron {
    /// Timescale separation ε
    pub epsilon: f64,
    /// Parameter a
    pub a: f64,
    /// Parameter b
    pub b: f64,
    /// External current
    pub i_ext: f64,
    /// Membrane noise intensity σ
    pub noise_intensity: f64,
    /// Integration timestep
    pub dt: f64,
    /// Integration steps per recorded sample
    pub substeps: usize,
    /// Range of the initial membrane potential
    pub v_range: (f64, f64),
    /// Range of the initial recovery variable
    pub w_range: (f64, f64),
}

impl Default for SpikingNeuron {
    fn default() -> Self {
        Self {
            epsilon: 0.08,
            a: 0.7,
            b: 0.8,
            i_ext: 0.3,
            noise_intensity: 0.25,
            dt: 0.1,
            substeps: 10,
            v_range: (-2.0, 2.0),
            w_range: (-0.5, 1.5),
        }
    }
}

impl SpikingNeuron {
    /// Standard shape with the given current and noise
    pub fn new(i_ext: f64, noise_intensity: f64) -> Self {
        Self {
            i_ext,
            noise_intensity,
            ..Self::default()
        }
    }

    /// Reject parameters that make the SDE or the initial draw ill-defined
    pub fn validate(&self) -> Result<()> {
        let finite = [self.epsilon, self.a, self.b, self.i_ext, self.noise_intensity, self.dt]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(DynamicsError::config("neuron parameters must be finite"));
        }
        if self.noise_intensity < 0.0 {
            return Err(DynamicsError::config(format!(
                "noise intensity must be non-negative, got {}",
                self.noise_intensity
            )));
        }
        if self.dt <= 0.0 || self.substeps == 0 {
            return Err(DynamicsError::config("neuron needs dt > 0 and at least one substep"));
        }
        for (name, (lo, hi)) in [("v_range", self.v_range), ("w_range", self.w_range)] {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(DynamicsError::config(format!("{} must be a finite, non-empty interval", name)));
            }
        }
        Ok(())
    }

    /// FHN drift for a single neuron
    fn drift(&self, v: f64, w: f64) -> (f64, f64) {
        // dv/dt = v - v³/3 - w + I_ext
        let dv = v - v.powi(3) / 3.0 - w + self.i_ext;
        // dw/dt = ε(v + a - b·w)
        let dw = self.epsilon * (v + self.a - self.b * w);
        (dv, dw)
    }

    /// Theoretical critical current for the Hopf bifurcation
    ///
    /// For standard parameters (a=0.7, b=0.8, ε=0.08):
    /// I_c ≈ 1 - 2a/3 + a³/27 ≈ 0.3315 (approximate)
    pub fn theoretical_i_critical(&self) -> f64 {
        let a = self.a;
        1.0 - 2.0 * a / 3.0 + a.powi(3) / 27.0
    }
}

impl OdeSystem for SpikingNeuron {
    fn dimension(&self) -> usize {
        2
    }

    fn derivative(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        let (dv, dw) = self.drift(y[MEMBRANE_POTENTIAL], y[RECOVERY]);
        dydt[MEMBRANE_POTENTIAL] = dv;
        dydt[RECOVERY] = dw;
    }
}

impl StochasticModel for SpikingNeuron {
    fn state_dimension(&self) -> usize {
        2
    }

    fn observable_channel(&self) -> usize {
        MEMBRANE_POTENTIAL
    }

    fn sampling_interval(&self) -> f64 {
        self.dt * self.substeps as f64
    }

    fn initial_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let (v_lo, v_hi) = self.v_range;
        let (w_lo, w_hi) = self.w_range;
        vec![rng.random_range(v_lo..v_hi), rng.random_range(w_lo..w_hi)]
    }

    fn validate(&self) -> Result<()> {
        SpikingNeuron::validate(self)
    }

    fn advance<R: Rng + ?Sized>(&self, t: f64, state: &mut [f64], rng: &mut R) -> Result<()> {
        let diffusion = [self.noise_intensity, 0.0];
        for k in 0..self.substeps {
            euler_maruyama_step(self, t + k as f64 * self.dt, state, &diffusion, self.dt, rng)?;
        }
        Ok(())
    }
}
