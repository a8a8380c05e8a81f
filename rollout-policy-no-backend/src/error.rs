use std::path::PathBuf;
use thiserror::Error;

/// Errors of policy restoration and inference.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// Parameters or inputs of incompatible shapes.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The requested checkpoint step does not exist.
    #[error("Checkpoint of step {step} not found in {dir:?}")]
    NotFound {
        /// Checkpoint directory.
        dir: PathBuf,
        /// Requested step.
        step: usize,
    },

    /// The directory contains no checkpoint.
    #[error("No checkpoint found in {0:?}")]
    NoCheckpoints(PathBuf),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Broken checkpoint file.
    #[error("Failed to decode checkpoint: {0}")]
    Decode(#[from] bincode::Error),
}
