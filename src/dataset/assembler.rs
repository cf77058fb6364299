//! Dataset artifact: trajectories, observations and labels aligned by index
//!
//! Persisted as one JSON document
//!
//! ```text
//! { "metadata": {...}, "trajectories": (N, T, D), "observations": (N, T), "labels": (N,) }
//! ```
//!
//! under a file name that encodes the generation parameters.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{DynamicsError, Result};

/// Generation parameters stored with a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Number of trajectories
    pub n_points: usize,
    /// Observed steps at the start of each trajectory
    pub past_horizon: usize,
    /// Steps the label is computed from
    pub future_horizon: usize,
    /// Standard deviation of the sensor noise
    pub noise_sigma: f64,
    /// Number of label classes
    pub n_classes: usize,
    /// Seed of the random source, when known
    pub seed: Option<u64>,
}

impl DatasetMetadata {
    /// Steps per trajectory
    pub fn horizon(&self) -> usize {
        self.past_horizon + self.future_horizon
    }

    /// `dataset_{N}points_pastH={P}_futureH={F}_noise_sigma={S}.json`
    pub fn file_name(&self) -> String {
        format!(
            "dataset_{}points_pastH={}_futureH={}_noise_sigma={:?}.json",
            self.n_points, self.past_horizon, self.future_horizon, self.noise_sigma
        )
    }
}

/// Trajectories, noisy observations and labels of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    metadata: DatasetMetadata,
    trajectories: Array3<f64>,
    observations: Array2<f64>,
    labels: Array1<usize>,
}

impl Dataset {
    /// Bundle the three containers, checking they are aligned
    pub fn assemble(
        trajectories: Array3<f64>,
        observations: Array2<f64>,
        labels: Array1<usize>,
        metadata: DatasetMetadata,
    ) -> Result<Self> {
        let dataset = Self {
            metadata,
            trajectories,
            observations,
            labels,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    fn validate(&self) -> Result<()> {
        let meta = &self.metadata;
        let (n, horizon, _) = self.trajectories.dim();
        let (n_obs, obs_horizon) = self.observations.dim();
        let n_labels = self.labels.len();

        if n != meta.n_points || n_obs != meta.n_points || n_labels != meta.n_points {
            return Err(DynamicsError::Shape(format!(
                "{} trajectories, {} observations, {} labels; metadata says {}",
                n, n_obs, n_labels, meta.n_points
            )));
        }
        if horizon != meta.horizon() || obs_horizon != meta.horizon() {
            return Err(DynamicsError::Shape(format!(
                "trajectory/observation lengths {}/{} differ from past + future = {}",
                horizon,
                obs_horizon,
                meta.horizon()
            )));
        }
        if let Some(bad) = self.labels.iter().find(|&&l| l >= meta.n_classes) {
            return Err(DynamicsError::Shape(format!(
                "label {} outside {} classes",
                bad, meta.n_classes
            )));
        }
        Ok(())
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    /// Full states, shape (N, T, state_dimension)
    pub fn trajectories(&self) -> &Array3<f64> {
        &self.trajectories
    }

    /// Noisy measurements, shape (N, T)
    pub fn observations(&self) -> &Array2<f64> {
        &self.observations
    }

    /// Class labels, shape (N,)
    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn state_dimension(&self) -> usize {
        self.trajectories.len_of(Axis(2))
    }

    /// Dataset restricted to the given trajectory indices, in that order
    pub(crate) fn subset(&self, indices: &[usize]) -> Self {
        Self {
            metadata: DatasetMetadata {
                n_points: indices.len(),
                ..self.metadata.clone()
            },
            trajectories: self.trajectories.select(Axis(0), indices),
            observations: self.observations.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }

    /// Write the dataset into `dir` under [`DatasetMetadata::file_name`]
    ///
    /// The directory is created if missing. Returns the written path.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| DynamicsError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(self.metadata.file_name());
        let io_err = |source| DynamicsError::Io {
            path: path.clone(),
            source,
        };

        let file = File::create(&path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(|source| DynamicsError::Serialization {
            path: path.clone(),
            source,
        })?;
        writer.flush().map_err(io_err)?;

        log::info!("dataset stored in {}", path.display());
        Ok(path)
    }

    /// Read a dataset written by [`save`](Self::save)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DynamicsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| DynamicsError::Serialization {
                path: path.to_path_buf(),
                source,
            })?;
        dataset.validate()?;

        log::debug!("loaded {} trajectories from {}", dataset.len(), path.display());
        Ok(dataset)
    }
}
