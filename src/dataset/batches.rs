//! Data side of classifier training: splits and mini-batches
//!
//! A classifier only ever sees the past window of the noisy observations;
//! the future window is what the label describes.

use ndarray::{s, Array1, Array3, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use super::assembler::Dataset;
use crate::error::{DynamicsError, Result};

/// Observation tensor (batch, channel, time) and integer labels
#[derive(Debug, Clone, PartialEq)]
pub struct MiniBatch {
    pub observations: Array3<f64>,
    pub labels: Array1<usize>,
}

impl MiniBatch {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Fraction of predictions equal to the labels
    ///
    /// One prediction per label is required; an empty batch scores 0.
    pub fn accuracy(&self, predictions: &[usize]) -> Result<f64> {
        if predictions.len() != self.len() {
            return Err(DynamicsError::Shape(format!(
                "{} predictions for a batch of {} labels",
                predictions.len(),
                self.len()
            )));
        }
        if self.is_empty() {
            return Ok(0.0);
        }
        let correct = predictions
            .iter()
            .zip(self.labels.iter())
            .filter(|(p, l)| p == l)
            .count();
        Ok(correct as f64 / self.len() as f64)
    }
}

impl Dataset {
    /// Past-window observations of the given trajectories, (len, 1, past)
    fn past_window(&self, indices: &[usize]) -> Array3<f64> {
        let past = self.metadata().past_horizon;
        self.observations()
            .select(Axis(0), indices)
            .slice(s![.., ..past])
            .to_owned()
            .insert_axis(Axis(1))
    }

    /// Every trajectory's past window as one evaluation batch
    pub fn past_observations(&self) -> MiniBatch {
        let indices: Vec<usize> = (0..self.len()).collect();
        MiniBatch {
            observations: self.past_window(&indices),
            labels: self.labels().clone(),
        }
    }

    /// Random mini-batch, sampled uniformly with replacement
    pub fn mini_batch<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<MiniBatch> {
        if batch_size == 0 {
            return Err(DynamicsError::config("batch size must be positive"));
        }
        if self.is_empty() {
            return Err(DynamicsError::Shape("cannot sample from an empty dataset".into()));
        }

        let indices: Vec<usize> = (0..batch_size).map(|_| rng.random_range(0..self.len())).collect();
        Ok(MiniBatch {
            observations: self.past_window(&indices),
            labels: self.labels().select(Axis(0), &indices),
        })
    }

    /// Shuffle and partition into (train, test)
    ///
    /// `train_fraction` must lie in (0, 1]; the train part gets
    /// `round(len · train_fraction)` trajectories.
    pub fn split<R: Rng + ?Sized>(&self, train_fraction: f64, rng: &mut R) -> Result<(Dataset, Dataset)> {
        if !(train_fraction > 0.0 && train_fraction <= 1.0) {
            return Err(DynamicsError::config(format!(
                "train fraction must lie in (0, 1], got {}",
                train_fraction
            )));
        }

        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(rng);
        let n_train = ((self.len() as f64) * train_fraction).round() as usize;
        let (train, test) = indices.split_at(n_train.min(self.len()));
        Ok((self.subset(train), self.subset(test)))
    }
}
