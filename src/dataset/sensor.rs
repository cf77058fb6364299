//! Measurement model: additive IID Gaussian noise on one state channel

use ndarray::{s, Array2, Array3};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{DynamicsError, Result};

/// y[n, t] = x[n, t, channel] + N(0, σ²)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoisySensor {
    channel: usize,
    noise_sigma: f64,
}

impl NoisySensor {
    pub fn new(channel: usize, noise_sigma: f64) -> Result<Self> {
        if !noise_sigma.is_finite() || noise_sigma < 0.0 {
            return Err(DynamicsError::config(format!(
                "sensor noise sigma must be finite and non-negative, got {}",
                noise_sigma
            )));
        }
        Ok(Self { channel, noise_sigma })
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn noise_sigma(&self) -> f64 {
        self.noise_sigma
    }

    /// Noisy readings of every trajectory, shape (n_trajectories, horizon)
    pub fn measure<R: Rng + ?Sized>(&self, trajectories: &Array3<f64>, rng: &mut R) -> Result<Array2<f64>> {
        let (_, _, dim) = trajectories.dim();
        if self.channel >= dim {
            return Err(DynamicsError::config(format!(
                "sensor channel {} outside state dimension {}",
                self.channel, dim
            )));
        }

        let normal = Normal::new(0.0, self.noise_sigma)
            .map_err(|e| DynamicsError::config(format!("sensor noise: {}", e)))?;

        let mut readings = trajectories.slice(s![.., .., self.channel]).to_owned();
        for y in readings.iter_mut() {
            *y += normal.sample(rng);
        }
        Ok(readings)
    }
}
