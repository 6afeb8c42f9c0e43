//! # Amnesis: Local-First Experiment Tracking
//!
//! Amnesis stores machine-learning experiment metadata (hyperparameters,
//! metrics, timing, artifacts, serialized models) on one machine's
//! filesystem, organized per model and addressed by a stable identifier.
//! There is no server and no network component: a repository is any
//! directory carrying the `.amnesis` control directory.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use amnesis::repository::Repository;
//! use amnesis::session::ExperimentSession;
//!
//! let repo = Repository::init("/tmp/proj")?;
//!
//! let experiment = ExperimentSession::create(&repo, "modelX", Some("run1"))?
//!     .run(|session| {
//!         session.log_hyperparameter("lr", 0.01);
//!         session.log_metric("acc", 0.9);
//!         Ok(())
//!     })?;
//!
//! assert_eq!(experiment.name(), "run1");
//! # Ok::<(), amnesis::Error>(())
//! ```
//!
//! Metadata becomes durable exactly once, at session exit. That holds when
//! the user computation fails too: whatever was logged before the failure
//! is committed, and the failure is returned afterwards.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod cli;
pub mod error;
pub mod experiment;
pub mod naming;
pub mod repository;
pub mod session;
pub mod track;

pub use error::{Error, Result};
pub use experiment::{Experiment, ModelSerializer};
pub use repository::Repository;
pub use session::{ActiveSession, ExperimentSession};
pub use track::{TrackedValues, Tracker};
