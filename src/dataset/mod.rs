//! Dataset Module: Labeled Trajectories for Classifier Training
//!
//! Turns a stochastic model into (noisy observation, label) pairs:
//!
//! - **generator**: independent full-state trajectories, (N, T, D)
//! - **sensor**: one channel plus Gaussian measurement noise, (N, T)
//! - **labels**: categorical label from each trajectory's future segment
//! - **assembler**: aligned bundle, persisted as JSON
//! - **batches**: train/test split and past-window mini-batches
//! - **pipeline**: configuration and the end-to-end run
//!
//! Labels see only the future full states; classifiers see only the past
//! noisy observations.

mod assembler;
mod batches;
mod generator;
mod labels;
mod pipeline;
mod sensor;

pub use assembler::{Dataset, DatasetMetadata};
pub use batches::MiniBatch;
pub use generator::TrajectoryGenerator;
pub use labels::{class_counts, LabelGenerator, LabelRule, SpikeThreshold};
pub use pipeline::{build_dataset, generate_and_save, generate_dataset, DatasetConfig};
pub use sensor::NoisySensor;
