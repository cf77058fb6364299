//! Error taxonomy shared by the physiological model and the dataset pipeline.
//!
//! Nothing in this crate retries: every variant is fatal to the current
//! simulation or dataset build and is surfaced to the caller as-is.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building models, integrating, or persisting datasets
#[derive(Debug, Error)]
pub enum DynamicsError {
    /// Invalid or missing numeric parameter
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// NaN or infinite value produced during evaluation or integration
    #[error("non-finite {quantity} in component {index} at t = {time}")]
    Numerical {
        quantity: &'static str,
        index: usize,
        time: f64,
    },

    /// Dataset containers that are not aligned by trajectory index
    #[error("inconsistent dataset shapes: {0}")]
    Shape(String),

    /// Artifact or configuration file could not be read or written
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed
    #[error("cannot (de)serialize {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DynamicsError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, DynamicsError>;
