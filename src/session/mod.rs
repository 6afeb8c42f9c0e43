//! Experiment session lifecycle
//!
//! One session governs one experiment from identity allocation to the
//! metadata commit. The states are separate types: [`ExperimentSession`]
//! (created, no directory yet) becomes an [`ActiveSession`] on `begin`,
//! which becomes a committed [`Experiment`] on `commit`. The scoped form
//! [`ExperimentSession::run`] commits unconditionally, so metadata logged
//! before a user-code failure is still made durable and the failure is
//! returned to the caller afterwards.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use amnesis::repository::Repository;
//! use amnesis::session::ExperimentSession;
//!
//! let repo = Repository::discover()?;
//! let experiment = ExperimentSession::create(&repo, "mnist", Some("run1"))?
//!     .run(|session| {
//!         session.log_hyperparameter("lr", 0.01);
//!         session.log_metric("acc", 0.9);
//!         Ok(())
//!     })?;
//! # Ok::<(), amnesis::Error>(())
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::experiment::{Experiment, ModelSerializer};
use crate::naming::NameAllocator;
use crate::repository::{Repository, ARTIFACTS_DIR, METADATA_FILE, MODEL_FILE};
use crate::{Error, Result};

/// Timestamp format written to the metadata file.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Opaque version-control reference placeholder.
const GIT_PLACEHOLDER: &str = "HEAD";

/// A created session: identity and name are allocated, nothing is on disk
/// under the experiment directory yet.
#[derive(Debug)]
pub struct ExperimentSession {
    repository: Repository,
    model_name: String,
    experiment_name: String,
    uuid: String,
}

impl ExperimentSession {
    /// Create a session for `model_name`, allocating a fresh identifier and
    /// resolving the experiment name (generated when `explicit_name` is
    /// `None`). Ensures the model directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateExperimentName`] if an explicit name
    /// collides, [`Error::NameSpaceExhausted`] if generation keeps
    /// colliding, or IO/corruption failures from reading existing names.
    /// On any failure no experiment directory is created.
    pub fn create(
        repository: &Repository,
        model_name: &str,
        explicit_name: Option<&str>,
    ) -> Result<Self> {
        let uuid = Uuid::new_v4().simple().to_string();

        let taken = repository.experiment_names(model_name)?;
        let mut allocator = NameAllocator::default();
        let experiment_name = match explicit_name {
            Some(name) => allocator.reserve_explicit(name, &taken)?,
            None => allocator.allocate(&taken)?,
        };

        repository.ensure_model_dir(model_name)?;

        Ok(Self {
            repository: repository.clone(),
            model_name: model_name.to_string(),
            experiment_name,
            uuid,
        })
    }

    /// Get the allocated experiment name.
    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    /// Get the allocated identifier.
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Enter the active scope: create the experiment directory (named by
    /// identifier, never by human name) and start the timers.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be created.
    pub fn begin(self) -> Result<ActiveSession> {
        let dir = self
            .repository
            .experiment_dir(&self.model_name, &self.uuid);
        fs::create_dir_all(&dir)?;

        Ok(ActiveSession {
            model_name: self.model_name,
            experiment_name: self.experiment_name,
            uuid: self.uuid,
            dir,
            started: Instant::now(),
            started_at: Utc::now(),
            hyperparameters: BTreeMap::new(),
            metrics: BTreeMap::new(),
        })
    }

    /// Run `f` inside the active scope and commit unconditionally.
    ///
    /// If `f` fails, whatever it logged before failing is still committed
    /// and the user error is returned after the commit completes. If both
    /// `f` and the commit fail, the user error wins and the commit failure
    /// is logged.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or the commit error when `f` succeeded.
    pub fn run<F>(self, f: F) -> Result<Experiment>
    where
        F: FnOnce(&mut ActiveSession) -> Result<()>,
    {
        let mut session = self.begin()?;
        let outcome = f(&mut session);
        let committed = session.commit();

        match (outcome, committed) {
            (Ok(()), Ok(experiment)) => Ok(experiment),
            (Ok(()), Err(commit_err)) => Err(commit_err),
            (Err(user_err), Ok(_)) => Err(user_err),
            (Err(user_err), Err(commit_err)) => {
                tracing::error!(error = %commit_err, "metadata commit failed");
                Err(user_err)
            }
        }
    }
}

/// An active session: the experiment directory exists and the logging API
/// is live. Dropping without [`ActiveSession::commit`] writes nothing;
/// prefer [`ExperimentSession::run`] for commit-on-error semantics.
#[derive(Debug)]
pub struct ActiveSession {
    model_name: String,
    experiment_name: String,
    uuid: String,
    dir: PathBuf,
    started: Instant,
    started_at: DateTime<Utc>,
    hyperparameters: BTreeMap<String, Value>,
    metrics: BTreeMap<String, Value>,
}

impl ActiveSession {
    /// Get the experiment directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the allocated experiment name.
    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    /// Get the allocated identifier.
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Log a hyperparameter. Last write wins on repeated names; the value
    /// is taken as-is.
    pub fn log_hyperparameter(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.hyperparameters.insert(name.into(), value.into());
    }

    /// Log a metric. Last write wins on repeated names; the value is taken
    /// as-is.
    pub fn log_metric(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.metrics.insert(name.into(), value.into());
    }

    /// Copy a file or directory tree into the experiment's `artifacts/`
    /// subdirectory under its base name. Written immediately, not deferred
    /// to commit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArtifactDestinationExists`] if the target is
    /// already present (no overwrite, no merge), or an IO error from the
    /// copy itself.
    pub fn log_artifact(&self, path: &Path) -> Result<()> {
        let name = path.file_name().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("artifact path {} has no base name", path.display()),
            ))
        })?;

        let artifacts = self.dir.join(ARTIFACTS_DIR);
        fs::create_dir_all(&artifacts)?;

        let destination = artifacts.join(name);
        if destination.exists() {
            return Err(Error::ArtifactDestinationExists(destination));
        }

        if path.is_dir() {
            copy_tree(path, &destination)?;
        } else {
            fs::copy(path, &destination)?;
        }

        Ok(())
    }

    /// Persist a model object through the caller's serializer at the fixed
    /// `model` path inside the experiment directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelSerialization`] wrapping whatever the
    /// serializer reported.
    pub fn log_model<S: ModelSerializer>(&self, model: &S::Model, serializer: &S) -> Result<()> {
        serializer
            .save(model, &self.dir.join(MODEL_FILE))
            .map_err(Error::ModelSerialization)
    }

    /// Exit the active scope: stop the timer, finalize the record, and
    /// write the metadata file in one whole-file write.
    ///
    /// # Errors
    ///
    /// Returns an IO or serialization error from the write; commit
    /// failures are fatal to the session.
    pub fn commit(self) -> Result<Experiment> {
        let elapsed = round6(self.started.elapsed().as_secs_f64());

        let experiment = Experiment::builder(self.model_name, self.experiment_name, self.uuid)
            .git(GIT_PLACEHOLDER)
            .date(self.started_at.format(DATE_FORMAT).to_string())
            .time(elapsed)
            .hyperparameters(self.hyperparameters)
            .metrics(self.metrics)
            .build();

        experiment.save(&self.dir.join(METADATA_FILE))?;
        tracing::debug!(
            model = experiment.model_name(),
            name = experiment.name(),
            uuid = experiment.uuid(),
            "committed experiment metadata"
        );

        Ok(experiment)
    }
}

/// Round to the 6-decimal precision the metadata schema carries.
fn round6(seconds: f64) -> f64 {
    (seconds * 1_000_000.0).round() / 1_000_000.0
}

/// Recursively copy a directory tree. The destination must not exist.
fn copy_tree(source: &Path, destination: &Path) -> Result<()> {
    fs::create_dir_all(destination)?;

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round6() {
        assert!((round6(1.234_567_891) - 1.234_568).abs() < 1e-9);
        assert!((round6(0.0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_session_identity_before_begin() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let session = ExperimentSession::create(&repo, "mnist", Some("run1")).unwrap();
        assert_eq!(session.experiment_name(), "run1");
        assert_eq!(session.uuid().len(), 32);
        // Model dir exists, experiment dir does not yet
        assert!(repo.model_dir("mnist").is_dir());
        assert!(!repo.experiment_dir("mnist", session.uuid()).exists());
    }

    #[test]
    fn test_begin_creates_uuid_directory() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let session = ExperimentSession::create(&repo, "mnist", None).unwrap();
        let uuid = session.uuid().to_string();

        let active = session.begin().unwrap();
        assert!(repo.experiment_dir("mnist", &uuid).is_dir());
        assert_eq!(active.dir(), repo.experiment_dir("mnist", &uuid));
    }
}
