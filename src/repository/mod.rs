//! Directory-backed repository
//!
//! A repository root is any directory containing the `.amnesis` control
//! directory. Discovery walks upward from a starting directory; the first
//! ancestor carrying the marker wins. The resolved root is held by the
//! [`Repository`] instance for its whole lifetime, so a second lookup never
//! re-walks the filesystem and instances never share cache state.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::experiment::Experiment;
use crate::{Error, Result};

/// Reserved marker directory whose presence defines a repository root.
pub const CONTROL_DIR: &str = ".amnesis";

/// Metadata file name inside an experiment directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Destination file name for a serialized model.
pub const MODEL_FILE: &str = "model";

/// Subdirectory holding copied artifacts.
pub const ARTIFACTS_DIR: &str = "artifacts";

/// Handle on one repository root and its on-disk layout.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
}

impl Repository {
    /// Initialize a new repository by creating the control directory under
    /// `path`.
    ///
    /// Not idempotent by design: re-running reports the already-exists
    /// condition instead of succeeding silently.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInitialized`] if a control directory already
    /// exists at `path`, or an IO error if creation fails.
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let control = root.join(CONTROL_DIR);

        if control.exists() {
            return Err(Error::AlreadyInitialized(root));
        }

        fs::create_dir_all(&control)?;
        tracing::debug!(root = %root.display(), "initialized repository");
        Ok(Self { root })
    }

    /// Discover the repository root starting from the current working
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] if no ancestor carries the control
    /// directory.
    pub fn discover() -> Result<Self> {
        Self::discover_from(std::env::current_dir()?)
    }

    /// Discover the repository root starting from `start`, walking upward
    /// through its ancestors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] once the filesystem root is
    /// reached without finding the control directory.
    pub fn discover_from(start: impl Into<PathBuf>) -> Result<Self> {
        let start = start.into();
        let mut current = start.clone();

        loop {
            if current.join(CONTROL_DIR).is_dir() {
                return Ok(Self { root: current });
            }
            // pop() returns false once we are at the filesystem root
            if !current.pop() {
                return Err(Error::NotARepository(start));
            }
        }
    }

    /// Get the repository root (cached at construction).
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the control directory path.
    #[must_use]
    pub fn control_dir(&self) -> PathBuf {
        self.root.join(CONTROL_DIR)
    }

    /// Get the directory of one model namespace.
    #[must_use]
    pub fn model_dir(&self, model_name: &str) -> PathBuf {
        self.control_dir().join(model_name)
    }

    /// Get the directory of one experiment (addressed by identifier, not
    /// by human name).
    #[must_use]
    pub fn experiment_dir(&self, model_name: &str, uuid: &str) -> PathBuf {
        self.model_dir(model_name).join(uuid)
    }

    /// Create the model directory if it does not exist yet.
    ///
    /// Idempotent, unlike [`Repository::init`].
    ///
    /// # Errors
    ///
    /// Returns an IO error if creation fails.
    pub fn ensure_model_dir(&self, model_name: &str) -> Result<PathBuf> {
        let dir = self.model_dir(model_name);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// List model names: the immediate subdirectories of the control
    /// directory, sorted.
    ///
    /// An existing repository with no models yields an empty Vec; that is
    /// a distinct condition from the control directory being gone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotARepository`] if the control directory is absent
    /// at the cached root.
    pub fn list_models(&self) -> Result<Vec<String>> {
        let control = self.control_dir();
        if !control.is_dir() {
            return Err(Error::NotARepository(self.root.clone()));
        }

        let mut models = Vec::new();
        for entry in fs::read_dir(control)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                models.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        models.sort();
        Ok(models)
    }

    /// Load every experiment of one model from its metadata file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelNotFound`] if the model directory is absent,
    /// or [`Error::CorruptExperiment`] for an experiment directory whose
    /// metadata file is missing or unreadable (never silently skipped).
    pub fn list_experiments(&self, model_name: &str) -> Result<Vec<Experiment>> {
        let model_dir = self.model_dir(model_name);
        if !model_dir.is_dir() {
            return Err(Error::ModelNotFound(model_name.to_string()));
        }

        let mut experiments = Vec::new();
        for entry in fs::read_dir(model_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            let experiment_dir = entry.path();
            let metadata = experiment_dir.join(METADATA_FILE);
            let experiment =
                Experiment::load(&metadata).map_err(|e| Error::CorruptExperiment {
                    path: experiment_dir.clone(),
                    reason: e.to_string(),
                })?;
            experiments.push(experiment);
        }

        Ok(experiments)
    }

    /// Collect the experiment names already taken in one model namespace.
    ///
    /// A model with no directory yet simply has no taken names.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::CorruptExperiment`] and IO failures.
    pub fn experiment_names(&self, model_name: &str) -> Result<HashSet<String>> {
        match self.list_experiments(model_name) {
            Ok(experiments) => Ok(experiments
                .into_iter()
                .map(|e| e.name().to_string())
                .collect()),
            Err(Error::ModelNotFound(_)) => Ok(HashSet::new()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_reinit_fails() {
        let dir = tempfile::tempdir().unwrap();

        let repo = Repository::init(dir.path()).unwrap();
        assert!(repo.control_dir().is_dir());

        let err = Repository::init(dir.path()).unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized(_)));
    }

    #[test]
    fn test_discover_walks_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();

        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let repo = Repository::discover_from(&nested).unwrap();
        assert_eq!(repo.root(), dir.path());
    }

    #[test]
    fn test_discover_without_marker_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Repository::discover_from(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NotARepository(_)));
    }

    #[test]
    fn test_list_models_empty_repository() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        // Empty repository is not an error, just no models
        assert!(repo.list_models().unwrap().is_empty());
    }

    #[test]
    fn test_list_models_missing_control_dir() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::remove_dir_all(repo.control_dir()).unwrap();

        let err = repo.list_models().unwrap_err();
        assert!(matches!(err, Error::NotARepository(_)));
    }

    #[test]
    fn test_list_experiments_unknown_model() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let err = repo.list_experiments("nope").unwrap_err();
        assert!(matches!(err, Error::ModelNotFound(name) if name == "nope"));
    }

    #[test]
    fn test_list_experiments_corrupt_directory() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        // Experiment directory without a metadata file
        fs::create_dir_all(repo.experiment_dir("mnist", "deadbeef")).unwrap();

        let err = repo.list_experiments("mnist").unwrap_err();
        assert!(matches!(err, Error::CorruptExperiment { .. }));
    }

    #[test]
    fn test_experiment_names_for_absent_model() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        assert!(repo.experiment_names("mnist").unwrap().is_empty());
    }
}
