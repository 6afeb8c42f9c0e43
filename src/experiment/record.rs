//! Experiment record - root entity of the metadata schema

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// Experiment represents one tracked run.
///
/// Identified repository-wide by `uuid` (a hex token) and within its model
/// namespace by `name`. The record is finalized by the session at commit
/// time; after `save` the engine treats it as immutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experiment {
    git: String,
    model_name: String,
    name: String,
    uuid: String,
    date: String,
    time: f64,
    hyperparameters: BTreeMap<String, Value>,
    metrics: BTreeMap<String, Value>,
}

impl Experiment {
    /// Create a builder for constructing an experiment record.
    #[must_use]
    pub fn builder(
        model_name: impl Into<String>,
        name: impl Into<String>,
        uuid: impl Into<String>,
    ) -> ExperimentBuilder {
        ExperimentBuilder::new(model_name, name, uuid)
    }

    /// Get the opaque version-control reference.
    #[must_use]
    pub fn git(&self) -> &str {
        &self.git
    }

    /// Get the model namespace this experiment belongs to.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Get the human-readable experiment name (unique within its model).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the repository-wide unique identifier (hex token).
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Get the ISO-8601 start timestamp.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Get the elapsed duration in seconds (6-decimal precision).
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Get the logged hyperparameters.
    #[must_use]
    pub const fn hyperparameters(&self) -> &BTreeMap<String, Value> {
        &self.hyperparameters
    }

    /// Get the logged metrics.
    #[must_use]
    pub const fn metrics(&self) -> &BTreeMap<String, Value> {
        &self.metrics
    }

    /// Write the record to `path` as a single whole-file JSON write,
    /// creating the parent directory first if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent cannot be created or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a record from a metadata file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Builder for [`Experiment`].
#[derive(Debug)]
pub struct ExperimentBuilder {
    git: String,
    model_name: String,
    name: String,
    uuid: String,
    date: String,
    time: f64,
    hyperparameters: BTreeMap<String, Value>,
    metrics: BTreeMap<String, Value>,
}

impl ExperimentBuilder {
    /// Create a new builder with the identity fields.
    #[must_use]
    pub fn new(
        model_name: impl Into<String>,
        name: impl Into<String>,
        uuid: impl Into<String>,
    ) -> Self {
        Self {
            git: String::new(),
            model_name: model_name.into(),
            name: name.into(),
            uuid: uuid.into(),
            date: String::new(),
            time: 0.0,
            hyperparameters: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }

    /// Set the opaque version-control reference.
    #[must_use]
    pub fn git(mut self, git: impl Into<String>) -> Self {
        self.git = git.into();
        self
    }

    /// Set the ISO-8601 start timestamp.
    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Set the elapsed duration in seconds.
    #[must_use]
    pub const fn time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Set the hyperparameter map.
    #[must_use]
    pub fn hyperparameters(mut self, hyperparameters: BTreeMap<String, Value>) -> Self {
        self.hyperparameters = hyperparameters;
        self
    }

    /// Set the metric map.
    #[must_use]
    pub fn metrics(mut self, metrics: BTreeMap<String, Value>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Build the [`Experiment`].
    #[must_use]
    pub fn build(self) -> Experiment {
        Experiment {
            git: self.git,
            model_name: self.model_name,
            name: self.name,
            uuid: self.uuid,
            date: self.date,
            time: self.time,
            hyperparameters: self.hyperparameters,
            metrics: self.metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experiment_builder() {
        let experiment = Experiment::builder("mnist", "brave-falcon", "deadbeef")
            .git("HEAD")
            .date("2024-01-01T00:00:00.000000Z")
            .time(1.5)
            .build();

        assert_eq!(experiment.model_name(), "mnist");
        assert_eq!(experiment.name(), "brave-falcon");
        assert_eq!(experiment.uuid(), "deadbeef");
        assert_eq!(experiment.git(), "HEAD");
        assert!((experiment.time() - 1.5).abs() < f64::EPSILON);
        assert!(experiment.hyperparameters().is_empty());
        assert!(experiment.metrics().is_empty());
    }

    #[test]
    fn test_experiment_json_field_names() {
        let experiment = Experiment::builder("mnist", "run1", "abc123").build();
        let json: Value = serde_json::to_value(&experiment).unwrap();

        for field in [
            "git",
            "model_name",
            "name",
            "uuid",
            "date",
            "time",
            "hyperparameters",
            "metrics",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
    }

    #[test]
    fn test_experiment_save_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/metadata.json");

        let experiment = Experiment::builder("mnist", "run1", "abc123").build();
        experiment.save(&path).unwrap();

        let loaded = Experiment::load(&path).unwrap();
        assert_eq!(loaded, experiment);
    }
}
