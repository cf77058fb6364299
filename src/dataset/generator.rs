//! Trajectory generation from a stochastic model
//!
//! Every trajectory starts from its own random initial state and is
//! advanced one sampling interval per recorded step, so a batch has shape
//! (n_trajectories, past_horizon + future_horizon, state_dimension).

use ndarray::Array3;
use rand::Rng;

use crate::error::{DynamicsError, Result};
use crate::systems::StochasticModel;

/// Produces independent full-state trajectories of a stochastic model
#[derive(Debug, Clone)]
pub struct TrajectoryGenerator<M> {
    model: M,
    past_horizon: usize,
    future_horizon: usize,
}

impl<M: StochasticModel> TrajectoryGenerator<M> {
    /// Both horizons must be at least one step and the model must validate
    pub fn new(model: M, past_horizon: usize, future_horizon: usize) -> Result<Self> {
        model.validate()?;
        if past_horizon == 0 || future_horizon == 0 {
            return Err(DynamicsError::config(format!(
                "horizons must be positive, got past = {}, future = {}",
                past_horizon, future_horizon
            )));
        }
        Ok(Self {
            model,
            past_horizon,
            future_horizon,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn past_horizon(&self) -> usize {
        self.past_horizon
    }

    pub fn future_horizon(&self) -> usize {
        self.future_horizon
    }

    /// Total recorded steps per trajectory
    pub fn horizon(&self) -> usize {
        self.past_horizon + self.future_horizon
    }

    /// Sample one trajectory as a (horizon × state_dimension) row-major buffer
    fn sample_one<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f64>> {
        let dim = self.model.state_dimension();
        let horizon = self.horizon();
        let dt = self.model.sampling_interval();

        let mut state = self.model.initial_state(rng);
        if state.len() != dim {
            return Err(DynamicsError::config(format!(
                "model drew a {}-component initial state, declares {}",
                state.len(),
                dim
            )));
        }

        let mut buffer = Vec::with_capacity(horizon * dim);
        buffer.extend_from_slice(&state);
        for step in 1..horizon {
            self.model.advance((step - 1) as f64 * dt, &mut state, rng)?;
            buffer.extend_from_slice(&state);
        }
        Ok(buffer)
    }

    /// Generate `n` trajectories using randomness drawn from `rng`
    pub fn generate<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Array3<f64>> {
        let dim = self.model.state_dimension();
        let horizon = self.horizon();

        let mut data = Vec::with_capacity(n * horizon * dim);
        for _ in 0..n {
            data.extend(self.sample_one(rng)?);
        }

        log::debug!("generated {} trajectories of {} steps × {} states", n, horizon, dim);
        Array3::from_shape_vec((n, horizon, dim), data)
            .map_err(|e| DynamicsError::Shape(format!("trajectory buffer: {}", e)))
    }
}
