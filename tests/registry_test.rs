//! Library-level tests for the registry and worker against the fake backend.

use lazydokku::fake::FakeDokku;
use lazydokku::gateway::Outcome;
use lazydokku::worker::{Request, Worker};
use lazydokku::{Error, Gateway, Registry};

fn new_registry(fake: &FakeDokku) -> Registry {
    Registry::new(Gateway::new(
        vec!["ssh".to_string(), "dokku@example.com".to_string()],
        fake.clone(),
    ))
}

#[test]
fn test_mutation_sequence_matches_fresh_refresh() {
    let fake = FakeDokku::sample();
    let mut registry = new_registry(&fake);
    registry.refresh().unwrap();

    registry.create_app("cache").unwrap();
    registry.add_domain("cache", "cache.example.com").unwrap();
    registry.set_config("cache", "REDIS_URL", "redis://localhost").unwrap();
    registry.set_config("api", "PORT", "8080").unwrap();
    registry.unset_config("api", "RUST_LOG").unwrap();
    registry.destroy_app("worker").unwrap();

    let mut fresh = new_registry(&fake);
    fresh.refresh().unwrap();
    assert_eq!(registry.apps(), fresh.apps());
}

#[test]
fn test_program_prefix_is_kept_in_history() {
    let fake = FakeDokku::sample();
    let mut registry = new_registry(&fake);
    registry.refresh().unwrap();

    let first = &registry.history().entries()[0];
    assert_eq!(first.command, "apps:list");
    assert_eq!(first.command_line, "ssh dokku@example.com apps:list");
}

#[test]
fn test_history_is_ordered_and_complete() {
    let fake = FakeDokku::sample();
    let mut registry = new_registry(&fake);
    registry.refresh().unwrap();
    let _ = registry.add_domain("missing", "x.example.com");
    fake.fail_command("config:set");
    let _ = registry.set_config("api", "PORT", "1");

    let history = registry.history().entries();
    // Unknown app never reaches the backend; the failed set is recorded.
    assert_eq!(history.len(), 8);
    let last = history.last().unwrap();
    assert_eq!(last.command, "config:set");
    assert_eq!(last.outcome, Outcome::Failure);
    assert!(
        history
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    );
}

#[test]
fn test_failed_refresh_keeps_previous_apps() {
    let fake = FakeDokku::sample();
    let mut registry = new_registry(&fake);
    registry.refresh().unwrap();
    let before = registry.apps().to_vec();

    fake.add_app("late", &["late.example.com"], &[]);
    fake.drop_report_line("late");
    assert!(matches!(registry.refresh(), Err(Error::Integrity(_))));
    assert_eq!(registry.apps(), before.as_slice());
}

#[test]
fn test_out_of_band_changes_show_after_refresh() {
    let fake = FakeDokku::sample();
    let mut registry = new_registry(&fake);
    registry.refresh().unwrap();

    fake.set_config_value("blog", "NODE_ENV", "staging");
    fake.remove_app("shop");
    assert_eq!(registry.config_value("blog", "NODE_ENV").unwrap(), "production");

    registry.refresh().unwrap();
    assert_eq!(registry.config_value("blog", "NODE_ENV").unwrap(), "staging");
    assert!(matches!(registry.app("shop"), Err(Error::NotFound(_))));
}

#[test]
fn test_worker_serializes_requests() {
    let fake = FakeDokku::sample();
    let mut worker = Worker::spawn(new_registry(&fake)).unwrap();

    worker.submit(Request::Refresh).unwrap();
    worker.submit(Request::CreateApp("cache".to_string())).unwrap();
    let update = worker
        .run(Request::AddDomain {
            app: "cache".to_string(),
            domain: "cache.example.com".to_string(),
        })
        .unwrap();

    assert!(update.result.is_ok());
    let cache = update.snapshot.app("cache").unwrap();
    assert_eq!(cache.domains, vec!["cache.example.com"]);
    assert_eq!(fake.domains("cache").unwrap(), vec!["cache.example.com"]);
}
