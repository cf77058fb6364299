//! Categorical labels from the future segment of each trajectory
//!
//! The rule is a strategy: the generator only guarantees that a rule sees
//! the last `future_horizon` full states of one trajectory and nothing
//! else (no past states, no noisy measurements).

use ndarray::{s, Array1, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{DynamicsError, Result};

/// Maps a future segment (future_horizon × state_dimension) to a class
pub trait LabelRule {
    /// Number of classes; labels lie in `0..n_classes()`
    fn n_classes(&self) -> usize;

    /// Class of one future segment
    fn label(&self, future: ArrayView2<'_, f64>) -> usize;

    /// Check the rule can be applied to states of this dimension
    fn validate(&self, _state_dimension: usize) -> Result<()> {
        Ok(())
    }
}

/// Class 1 when a channel reaches the threshold anywhere in the future
/// segment, class 0 otherwise
///
/// With the neuron's membrane potential and a threshold of 1.0 this reads
/// "a spike happens within the future horizon".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeThreshold {
    pub channel: usize,
    pub threshold: f64,
}

impl SpikeThreshold {
    pub fn new(channel: usize, threshold: f64) -> Self {
        Self { channel, threshold }
    }
}

impl LabelRule for SpikeThreshold {
    fn n_classes(&self) -> usize {
        2
    }

    fn label(&self, future: ArrayView2<'_, f64>) -> usize {
        let crossed = future.column(self.channel).iter().any(|&v| v >= self.threshold);
        usize::from(crossed)
    }

    fn validate(&self, state_dimension: usize) -> Result<()> {
        if self.channel >= state_dimension {
            return Err(DynamicsError::config(format!(
                "label channel {} outside state dimension {}",
                self.channel, state_dimension
            )));
        }
        if !self.threshold.is_finite() {
            return Err(DynamicsError::config("label threshold must be finite"));
        }
        Ok(())
    }
}

/// Applies a [`LabelRule`] to every trajectory of a batch
#[derive(Debug, Clone)]
pub struct LabelGenerator<L> {
    rule: L,
    future_horizon: usize,
}

impl<L: LabelRule> LabelGenerator<L> {
    pub fn new(rule: L, future_horizon: usize) -> Result<Self> {
        if future_horizon == 0 {
            return Err(DynamicsError::config("future horizon must be positive"));
        }
        if rule.n_classes() < 2 {
            return Err(DynamicsError::config("a label rule needs at least two classes"));
        }
        Ok(Self { rule, future_horizon })
    }

    pub fn rule(&self) -> &L {
        &self.rule
    }

    pub fn n_classes(&self) -> usize {
        self.rule.n_classes()
    }

    /// One label per trajectory, from its last `future_horizon` states
    pub fn generate(&self, trajectories: &Array3<f64>) -> Result<Array1<usize>> {
        let (_, horizon, dim) = trajectories.dim();
        if self.future_horizon > horizon {
            return Err(DynamicsError::Shape(format!(
                "future horizon {} longer than trajectories of {} steps",
                self.future_horizon, horizon
            )));
        }
        self.rule.validate(dim)?;

        let start = horizon - self.future_horizon;
        let n_classes = self.rule.n_classes();
        let mut labels = Vec::with_capacity(trajectories.len_of(Axis(0)));
        for (index, trajectory) in trajectories.axis_iter(Axis(0)).enumerate() {
            let label = self.rule.label(trajectory.slice(s![start.., ..]));
            if label >= n_classes {
                return Err(DynamicsError::config(format!(
                    "label rule produced class {} for trajectory {}, expected < {}",
                    label, index, n_classes
                )));
            }
            labels.push(label);
        }

        let labels = Array1::from(labels);
        let counts = class_counts(&labels, n_classes);
        if counts.iter().any(|&c| c == 0) && !labels.is_empty() {
            log::warn!("degenerate label balance: class counts {:?}", counts);
        } else {
            log::debug!("label class counts {:?}", counts);
        }
        Ok(labels)
    }
}

/// Number of labels in each class
pub fn class_counts(labels: &Array1<usize>, n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &label in labels.iter().filter(|&&l| l < n_classes) {
        counts[label] += 1;
    }
    counts
}
