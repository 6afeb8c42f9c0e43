//! Error types for amnesis
//!
//! Every engine-level failure is signaled, never swallowed; the CLI layer
//! decides which conditions are recoverable enough to print instead.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Amnesis error types
#[derive(Error, Debug)]
pub enum Error {
    /// `init` was called where a control directory already exists
    #[error("repository already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    /// Root discovery walked to the filesystem root without finding a control directory
    #[error("not an amnesis repository (no `.amnesis` directory found above {0})")]
    NotARepository(PathBuf),

    /// The requested model has no directory under the control directory
    #[error("model `{0}` not found")]
    ModelNotFound(String),

    /// An experiment directory exists but its metadata file is missing or unreadable
    #[error("corrupt experiment at {path}: {reason}")]
    CorruptExperiment {
        /// The experiment directory in question
        path: PathBuf,
        /// What went wrong reading its metadata
        reason: String,
    },

    /// An explicit experiment name collides with an existing one in the same model
    #[error("experiment name `{0}` already exists in this model")]
    DuplicateExperimentName(String),

    /// The name generator kept colliding until the retry bound ran out
    #[error(
        "could not generate a unique experiment name after {0} attempts; \
         name your experiment explicitly or clean up unused experiments"
    )]
    NameSpaceExhausted(usize),

    /// An artifact copy would overwrite something already logged
    #[error("artifact destination {0} already exists")]
    ArtifactDestinationExists(PathBuf),

    /// The caller-supplied model serializer failed
    #[error("model serialization failed: {0}")]
    ModelSerialization(#[source] anyhow::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error, typically from user code running inside a session
    #[error("{0}")]
    Other(String),

    /// Metadata (de)serialization error
    #[error("metadata error: {0}")]
    Json(#[from] serde_json::Error),
}
