//! Command-line surface
//!
//! Recoverable conditions (no repository, unknown model, unknown sort
//! column, re-running `init`) are printed as user-visible messages and the
//! command exits cleanly; only genuine engine failures propagate as errors.

mod table;

pub use table::Table;

use std::collections::BTreeSet;

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::experiment::Experiment;
use crate::repository::Repository;
use crate::{Error, Result};

/// A local experiments tracking tool.
#[derive(Debug, Parser)]
#[command(name = "amnesis", version, about = "A local experiments tracking tool")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialize a new amnesis repository in the current directory
    Init,
    /// Show information about the current repository (reserved)
    Info,
    /// List all models
    Models,
    /// List experiments
    Experiments {
        /// Restrict the listing to one model
        #[arg(long)]
        model: Option<String>,
        /// Widen the table with hyperparameter columns
        #[arg(long)]
        hyperparameters: bool,
        /// Widen the table with metric columns
        #[arg(long)]
        metrics: bool,
        /// Sort the table by a named column
        #[arg(long)]
        sort: Option<String>,
    },
}

/// Execute a parsed command line.
///
/// # Errors
///
/// Returns only unexpected engine failures (IO, corruption); everything a
/// user can fix by hand is printed instead.
pub fn execute(cli: Cli) -> Result<()> {
    if let Command::Init = cli.command {
        return run_init();
    }

    let repository = match Repository::discover() {
        Ok(repository) => repository,
        Err(Error::NotARepository(_)) => {
            println!(
                "Not in an amnesis repository. Run `amnesis init` to initialize a new repository."
            );
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    match cli.command {
        Command::Init => unreachable!("handled above"),
        Command::Info => {
            println!("`amnesis info` is not implemented yet");
            Ok(())
        }
        Command::Models => run_models(&repository),
        Command::Experiments {
            model,
            hyperparameters,
            metrics,
            sort,
        } => run_experiments(&repository, model.as_deref(), hyperparameters, metrics, sort.as_deref()),
    }
}

fn run_init() -> Result<()> {
    let cwd = std::env::current_dir()?;
    match Repository::init(&cwd) {
        Ok(repository) => {
            println!(
                "Initialized amnesis repository in {}",
                repository.control_dir().display()
            );
            Ok(())
        }
        Err(Error::AlreadyInitialized(_)) => {
            println!("Repository is already initialized");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn run_models(repository: &Repository) -> Result<()> {
    let models = repository.list_models()?;
    if models.is_empty() {
        println!("No models found");
        return Ok(());
    }

    println!("Model");
    for model in models {
        println!("{model}");
    }
    Ok(())
}

fn run_experiments(
    repository: &Repository,
    model: Option<&str>,
    hyperparameters: bool,
    metrics: bool,
    sort: Option<&str>,
) -> Result<()> {
    let models = match model {
        Some(name) => {
            if !repository.list_models()?.iter().any(|m| m == name) {
                println!("Model `{name}` not found");
                return Ok(());
            }
            vec![name.to_string()]
        }
        None => repository.list_models()?,
    };

    let mut experiments = Vec::new();
    for model_name in &models {
        experiments.extend(repository.list_experiments(model_name)?);
    }

    if experiments.is_empty() {
        println!("No experiments found");
        return Ok(());
    }

    let mut table = experiment_table(&experiments, hyperparameters, metrics);

    if let Some(column) = sort {
        if !table.sort_by(column, false) {
            println!("Unknown sort column `{column}`");
            return Ok(());
        }
    } else {
        // Most recent first; fixed-width ISO dates sort lexicographically
        table.sort_by("date", true);
    }

    print!("{}", table.render(true));
    Ok(())
}

/// Build the listing table: base columns plus, when requested, one column
/// per hyperparameter/metric key seen across the experiments.
fn experiment_table(experiments: &[Experiment], hyperparameters: bool, metrics: bool) -> Table {
    let mut columns = vec![
        "Model".to_string(),
        "Experiment".to_string(),
        "Date".to_string(),
        "UUID".to_string(),
    ];

    let hyperparameter_keys: BTreeSet<String> = if hyperparameters {
        experiments
            .iter()
            .flat_map(|e| e.hyperparameters().keys().cloned())
            .collect()
    } else {
        BTreeSet::new()
    };
    let metric_keys: BTreeSet<String> = if metrics {
        experiments
            .iter()
            .flat_map(|e| e.metrics().keys().cloned())
            .collect()
    } else {
        BTreeSet::new()
    };

    columns.extend(hyperparameter_keys.iter().cloned());
    columns.extend(metric_keys.iter().cloned());

    let mut table = Table::new(columns);
    for experiment in experiments {
        let mut row = vec![
            experiment.model_name().to_string(),
            experiment.name().to_string(),
            experiment.date().to_string(),
            experiment.uuid().to_string(),
        ];
        for key in &hyperparameter_keys {
            row.push(render_value(experiment.hyperparameters().get(key)));
        }
        for key in &metric_keys {
            row.push(render_value(experiment.metrics().get(key)));
        }
        table.push_row(row);
    }

    table
}

fn render_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}
