//! Repository layout and discovery tests

use std::fs;

use amnesis::repository::{Repository, CONTROL_DIR};
use amnesis::session::ExperimentSession;
use amnesis::Error;

// =============================================================================
// Initialization
// =============================================================================

#[test]
fn test_init_creates_control_directory() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    assert_eq!(repo.root(), dir.path());
    assert!(dir.path().join(CONTROL_DIR).is_dir());
}

#[test]
fn test_init_is_not_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    Repository::init(dir.path()).unwrap();

    let err = Repository::init(dir.path()).unwrap_err();
    assert!(matches!(err, Error::AlreadyInitialized(path) if path == dir.path()));
}

// =============================================================================
// Root discovery
// =============================================================================

#[test]
fn test_discovery_from_nested_directory_finds_marked_ancestor() {
    let dir = tempfile::tempdir().unwrap();
    Repository::init(dir.path()).unwrap();

    let nested = dir.path().join("b").join("c");
    fs::create_dir_all(&nested).unwrap();

    let repo = Repository::discover_from(&nested).unwrap();
    assert_eq!(repo.root(), dir.path());
}

#[test]
fn test_discovery_without_marked_ancestor_fails() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("b").join("c");
    fs::create_dir_all(&nested).unwrap();

    let err = Repository::discover_from(&nested).unwrap_err();
    assert!(matches!(err, Error::NotARepository(start) if start == nested));
}

#[test]
fn test_discovery_first_ancestor_wins() {
    let outer = tempfile::tempdir().unwrap();
    Repository::init(outer.path()).unwrap();

    let inner = outer.path().join("inner");
    let deep = inner.join("deep").join("down");
    fs::create_dir_all(&deep).unwrap();
    Repository::init(&inner).unwrap();

    let repo = Repository::discover_from(&deep).unwrap();
    assert_eq!(repo.root(), inner);
}

// =============================================================================
// Listing
// =============================================================================

#[test]
fn test_list_models_distinguishes_empty_from_missing() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    // Repository exists but has no models: empty, not an error
    assert_eq!(repo.list_models().unwrap(), Vec::<String>::new());

    // Control directory gone: a different, signaled condition
    fs::remove_dir_all(repo.control_dir()).unwrap();
    assert!(matches!(
        repo.list_models().unwrap_err(),
        Error::NotARepository(_)
    ));
}

#[test]
fn test_list_models_returns_sorted_names() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    for model in ["zebra", "alpha", "mnist"] {
        ExperimentSession::create(&repo, model, None)
            .unwrap()
            .run(|_| Ok(()))
            .unwrap();
    }

    assert_eq!(repo.list_models().unwrap(), vec!["alpha", "mnist", "zebra"]);
}

#[test]
fn test_list_experiments_loads_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    ExperimentSession::create(&repo, "mnist", Some("run1"))
        .unwrap()
        .run(|session| {
            session.log_metric("acc", 0.9);
            Ok(())
        })
        .unwrap();

    let experiments = repo.list_experiments("mnist").unwrap();
    assert_eq!(experiments.len(), 1);
    assert_eq!(experiments[0].name(), "run1");
    assert_eq!(experiments[0].model_name(), "mnist");
}

#[test]
fn test_list_experiments_unknown_model() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    assert!(matches!(
        repo.list_experiments("missing").unwrap_err(),
        Error::ModelNotFound(name) if name == "missing"
    ));
}

#[test]
fn test_experiment_dir_without_metadata_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    fs::create_dir_all(repo.experiment_dir("mnist", "0123abcd")).unwrap();

    let err = repo.list_experiments("mnist").unwrap_err();
    assert!(matches!(err, Error::CorruptExperiment { .. }));
}

#[test]
fn test_unreadable_metadata_is_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let experiment_dir = repo.experiment_dir("mnist", "0123abcd");
    fs::create_dir_all(&experiment_dir).unwrap();
    fs::write(experiment_dir.join("metadata.json"), "not json").unwrap();

    let err = repo.list_experiments("mnist").unwrap_err();
    assert!(matches!(err, Error::CorruptExperiment { path, .. } if path == experiment_dir));
}

#[test]
fn test_sequential_runs_order_by_date_descending() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    for name in ["first", "second", "third"] {
        ExperimentSession::create(&repo, "mnist", Some(name))
            .unwrap()
            .run(|_| Ok(()))
            .unwrap();
        // Keep the microsecond timestamps strictly increasing
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    let mut experiments = repo.list_experiments("mnist").unwrap();
    experiments.sort_by(|a, b| b.date().cmp(a.date()));

    let names: Vec<&str> = experiments.iter().map(amnesis::Experiment::name).collect();
    assert_eq!(names, vec!["third", "second", "first"]);
}
