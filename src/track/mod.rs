//! Instrumented tracking scope
//!
//! [`Tracker`] is a convenience layer entirely in front of the session: it
//! opens one, runs a user computation inside it, and harvests a declared
//! subset of the computation's named values into hyperparameters and
//! metrics when it completes. The dynamic local-variable capture of highly
//! dynamic runtimes is replaced by an explicit channel: the computation
//! writes the values it wants harvested into a [`TrackedValues`] snapshot.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use amnesis::repository::Repository;
//! use amnesis::track::Tracker;
//!
//! let repo = Repository::discover()?;
//! Tracker::new("mnist")
//!     .hyperparameter("lr")
//!     .metric("acc")
//!     .run(&repo, |_session, values| {
//!         values.record("lr", 0.01);
//!         // ... train ...
//!         values.record("acc", 0.93);
//!         Ok(())
//!     })?;
//! # Ok::<(), amnesis::Error>(())
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use crate::experiment::Experiment;
use crate::repository::Repository;
use crate::session::{ActiveSession, ExperimentSession};
use crate::Result;

/// Named value slots a tracked computation exposes for harvesting.
///
/// Only names declared on the [`Tracker`] are harvested; anything else
/// recorded here is ignored.
#[derive(Debug, Default)]
pub struct TrackedValues {
    values: BTreeMap<String, Value>,
}

impl TrackedValues {
    /// Record a named value, overwriting any previous one.
    pub fn record(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a recorded value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

/// Wraps a user computation in an experiment session with automatic
/// harvesting of declared values at completion.
#[derive(Debug)]
pub struct Tracker {
    model_name: String,
    experiment_name: Option<String>,
    hyperparameters: Vec<String>,
    metrics: Vec<String>,
    quick: bool,
}

impl Tracker {
    /// Create a tracker for `model_name` with nothing declared yet.
    #[must_use]
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            experiment_name: None,
            hyperparameters: Vec::new(),
            metrics: Vec::new(),
            quick: false,
        }
    }

    /// Use an explicit experiment name instead of a generated one.
    #[must_use]
    pub fn experiment_name(mut self, name: impl Into<String>) -> Self {
        self.experiment_name = Some(name.into());
        self
    }

    /// Declare a value to harvest into the hyperparameter group.
    #[must_use]
    pub fn hyperparameter(mut self, name: impl Into<String>) -> Self {
        self.hyperparameters.push(name.into());
        self
    }

    /// Declare a value to harvest into the metric group.
    #[must_use]
    pub fn metric(mut self, name: impl Into<String>) -> Self {
        self.metrics.push(name.into());
        self
    }

    /// Disable harvesting entirely; everything must be logged manually
    /// through the session.
    #[must_use]
    pub const fn quick(mut self) -> Self {
        self.quick = true;
        self
    }

    /// Open a session, run `f` inside it, harvest declared values on
    /// normal completion, and commit.
    ///
    /// Harvesting is skipped when `f` fails (there is no snapshot to trust)
    /// and in quick mode; the commit still happens and a failing `f`'s
    /// error is returned after it, per the session contract.
    ///
    /// # Errors
    ///
    /// Returns session-creation failures, the error from `f`, or the
    /// commit error when `f` succeeded.
    pub fn run<F>(&self, repository: &Repository, f: F) -> Result<Experiment>
    where
        F: FnOnce(&mut ActiveSession, &mut TrackedValues) -> Result<()>,
    {
        if self.quick && !(self.hyperparameters.is_empty() && self.metrics.is_empty()) {
            tracing::warn!(
                model = %self.model_name,
                "quick mode is enabled; declared values will not be harvested"
            );
        }

        let session =
            ExperimentSession::create(repository, &self.model_name, self.experiment_name.as_deref())?;

        session.run(|active| {
            let mut values = TrackedValues::default();
            f(&mut *active, &mut values)?;

            if !self.quick {
                self.harvest(active, &values);
            }

            Ok(())
        })
    }

    /// Move declared names from the snapshot into the session's logs.
    /// Declared-but-absent names warn and are skipped, never fatal.
    fn harvest(&self, session: &mut ActiveSession, values: &TrackedValues) {
        for name in &self.hyperparameters {
            match values.get(name) {
                Some(value) => session.log_hyperparameter(name.clone(), value.clone()),
                None => tracing::warn!(name = %name, "hyperparameter not recorded, skipping"),
            }
        }

        for name in &self.metrics {
            match values.get(name) {
                Some(value) => session.log_metric(name.clone(), value.clone()),
                None => tracing::warn!(name = %name, "metric not recorded, skipping"),
            }
        }
    }
}
