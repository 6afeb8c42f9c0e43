//! Experiment metadata schema
//!
//! An [`Experiment`] is the durable record of one tracked run. It is built
//! in memory by a session, written exactly once at session exit, and from
//! then on only ever reconstructed by loading its metadata file.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use amnesis::experiment::Experiment;
//!
//! let experiment = Experiment::load("path/to/metadata.json".as_ref())?;
//! println!("{} took {}s", experiment.name(), experiment.time());
//! # Ok::<(), amnesis::Error>(())
//! ```

mod record;
mod serializer;

pub use record::{Experiment, ExperimentBuilder};
pub use serializer::ModelSerializer;
