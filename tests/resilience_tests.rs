use anyhow::Result;
use dc_update::cli::update::run_with;
use dc_update::domain::RestartStep;
use dc_update::services::BatchOptions;
use dc_update::test_support::{MockEngine, RecordingSink};
use dc_update::{ServiceOutcome, UpdateError};
use std::sync::Arc;

#[test]
fn test_remove_failure_is_contained() -> Result<()> {
    let mock = Arc::new(MockEngine::new());
    mock.add_service("cache", Some("redis:7"));
    mock.add_service("web", Some("nginx:1.27"));
    mock.add_running("cache", "c-cache", "redis:7", "sha256:d1");
    mock.stage_pull("cache", "redis:7", "sha256:d2", 200);
    mock.add_running("web", "c-web", "nginx:1.27", "sha256:w1");
    mock.stage_pull("web", "nginx:1.27", "sha256:w2", 200);
    mock.set_fail_on("remove:cache");
    let sink = RecordingSink::new();

    let summary = run_with(mock.clone(), mock.clone(), &BatchOptions::default(), &sink)?;

    match summary.get("cache").map(|r| &r.outcome) {
        Some(ServiceOutcome::Failed(UpdateError::Restart { step, .. })) => {
            assert_eq!(*step, RestartStep::Remove)
        }
        other => panic!("esperado falha no rm, obtido {other:?}"),
    }

    // cache was stopped but never started again
    let commands = mock.get_commands();
    assert!(commands.contains(&"stop:cache".to_string()));
    assert!(!commands.contains(&"start:cache".to_string()));

    // web still ran to completion
    assert!(matches!(
        summary.get("web").map(|r| &r.outcome),
        Some(ServiceOutcome::Updated { .. })
    ));
    assert_eq!(mock.running_image("web"), Some("sha256:w2".to_string()));

    Ok(())
}

#[test]
fn test_pull_failure_does_not_abort_batch() -> Result<()> {
    let mock = Arc::new(MockEngine::new());
    mock.add_service("web", Some("nginx:1.27"));
    mock.add_service("db", Some("postgres:16"));
    mock.add_running("web", "c-web", "nginx:1.27", "sha256:w1");
    mock.add_running("db", "c-db", "postgres:16", "sha256:p1");
    mock.add_image("postgres:16", "sha256:p1", 100);
    mock.set_fail_on("pull:web");
    let sink = RecordingSink::new();

    let summary = run_with(mock.clone(), mock.clone(), &BatchOptions::default(), &sink)?;

    assert!(matches!(
        summary.get("web").map(|r| &r.outcome),
        Some(ServiceOutcome::Failed(UpdateError::Pull { .. }))
    ));
    assert!(matches!(
        summary.get("db").map(|r| &r.outcome),
        Some(ServiceOutcome::UpToDate { .. })
    ));
    assert_eq!(summary.failed(), 1);

    Ok(())
}

#[test]
fn test_inspect_failure_is_reported() -> Result<()> {
    let mock = Arc::new(MockEngine::new());
    mock.add_service("web", Some("nginx:1.27"));
    mock.add_running("web", "c-web", "nginx:1.27", "sha256:w1");
    mock.set_fail_on("list_images");
    let sink = RecordingSink::new();

    let summary = run_with(mock.clone(), mock.clone(), &BatchOptions::default(), &sink)?;

    assert!(matches!(
        summary.get("web").map(|r| &r.outcome),
        Some(ServiceOutcome::Failed(UpdateError::Inspect { .. }))
    ));
    assert_eq!(mock.recreate_count("web"), 0);

    Ok(())
}

#[test]
fn test_unresolved_latest_never_restarts() -> Result<()> {
    // pull "succeeds" but nothing matching the reference is cached afterwards
    let mock = Arc::new(MockEngine::new());
    mock.add_service("web", Some("nginx:1.27"));
    mock.add_running("web", "c-web", "nginx:1.27", "sha256:w1");
    mock.add_image("nginx:1.26", "sha256:old", 50);
    let sink = RecordingSink::new();

    let summary = run_with(mock.clone(), mock.clone(), &BatchOptions::default(), &sink)?;

    assert_eq!(summary.unverified(), 1);
    assert_eq!(summary.updated(), 0);
    assert_eq!(mock.recreate_count("web"), 0);

    Ok(())
}

#[test]
fn test_enumeration_failure_aborts_run() {
    let mock = Arc::new(MockEngine::new());
    mock.add_service("web", Some("nginx:1.27"));
    mock.set_fail_on("list_services");
    let sink = RecordingSink::new();

    let result = run_with(mock.clone(), mock.clone(), &BatchOptions::default(), &sink);

    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UpdateError>(),
        Some(UpdateError::Config(_))
    ));
    assert!(!mock.get_commands().iter().any(|c| c.starts_with("ps:")));
}
