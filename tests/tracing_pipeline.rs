//! Mapping of tracing events onto captured entries.

use std::sync::Arc;

use log_capture::capture::EventId;
use log_capture::config::{parse_config, LogCaptureConfig};
use log_capture::{CaptureCoordinator, LogLevel};
use serde_json::json;

mod common;

#[derive(Debug, thiserror::Error)]
#[error("query failed")]
struct QueryError(#[source] std::io::Error);

fn coordinator_with(config: &LogCaptureConfig) -> Arc<CaptureCoordinator> {
    Arc::new(CaptureCoordinator::from_config(config))
}

#[test]
fn fields_map_onto_entry() {
    let coordinator = coordinator_with(&LogCaptureConfig::default());
    let _guard = tracing::dispatcher::set_default(&common::capture_dispatch(&coordinator));
    coordinator.create_sink("orm::database::command");

    let err = QueryError(std::io::Error::new(std::io::ErrorKind::TimedOut, "socket timeout"));
    let (_, entries) = coordinator
        .capture(|| {
            tracing::error!(
                target: "orm::database::command",
                event_id = 20102u64,
                event_name = "CommandError",
                table = "alpacas",
                rows = 3u64,
                elapsed_ms = 1.5,
                cached = false,
                error = &err as &(dyn std::error::Error + 'static),
                "Failed executing command on {}",
                "alpacas"
            );
        })
        .unwrap();

    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.message(), "Failed executing command on alpacas");
    assert_eq!(entry.level(), LogLevel::Error);
    assert_eq!(entry.category(), "orm::database::command");
    assert_eq!(entry.event_id(), &EventId::named(20102, "CommandError"));
    assert_eq!(entry.state()["table"], json!("alpacas"));
    assert_eq!(entry.state()["rows"], json!(3));
    assert_eq!(entry.state()["elapsed_ms"], json!(1.5));
    assert_eq!(entry.state()["cached"], json!(false));
    assert!(!entry.state().contains_key("message"));
    assert!(!entry.state().contains_key("event_id"));

    let error = entry.error().unwrap();
    assert_eq!(error.message, "query failed");
    assert_eq!(error.sources, vec!["socket timeout".to_string()]);
    assert!(entry.in_category("orm::database"));
}

#[test]
fn events_without_message_render_their_fields() {
    let coordinator = coordinator_with(&LogCaptureConfig::default());
    let _guard = tracing::dispatcher::set_default(&common::capture_dispatch(&coordinator));
    coordinator.create_sink("cache");

    let (_, entries) = coordinator
        .capture(|| tracing::warn!(target: "cache", key = "herd:7", hit = false))
        .unwrap();

    assert_eq!(common::messages(&entries), ["hit=false key=herd:7"]);
    assert_eq!(entries[0].level(), LogLevel::Warning);
    assert_eq!(entries[0].event_id(), &EventId::default());
}

#[test]
fn engine_diagnostics_are_never_captured() {
    let coordinator = coordinator_with(&LogCaptureConfig::default());
    let _guard = tracing::dispatcher::set_default(&common::capture_dispatch(&coordinator));
    coordinator.create_sink("db");

    let (_, entries) = coordinator
        .capture(|| {
            tracing::warn!(target: "log_capture::capture", "internal");
            tracing::info!(target: "db", "external");
        })
        .unwrap();

    assert_eq!(common::messages(&entries), ["external"]);
    assert!(coordinator.collector("log_capture::capture").is_none());
}

#[test]
fn configured_min_level_and_preregistration_apply() {
    let config = parse_config(
        r#"
        [capture]
        min_level = "information"
        preregister = ["db"]
        "#,
    )
    .unwrap();
    let coordinator = coordinator_with(&config);
    let _guard = tracing::dispatcher::set_default(&common::capture_dispatch(&coordinator));

    let (_, entries) = coordinator
        .capture(|| {
            tracing::trace!(target: "db", "trace");
            tracing::debug!(target: "db", "debug");
            tracing::info!(target: "db", "info");
            tracing::error!(target: "db", "error");
        })
        .unwrap();

    assert_eq!(common::messages(&entries), ["info", "error"]);
}

#[test]
fn entries_serialize_to_json() {
    let coordinator = coordinator_with(&LogCaptureConfig::default());
    let _guard = tracing::dispatcher::set_default(&common::capture_dispatch(&coordinator));
    coordinator.create_sink("db");

    let entries =
        coordinator.collect_scoped(|| tracing::info!(target: "db", rows = 2u64, "insert"));
    let value = serde_json::to_value(&entries).unwrap();

    assert_eq!(value[0]["message"], json!("insert"));
    assert_eq!(value[0]["level"], json!("information"));
    assert_eq!(value[0]["category"], json!("db"));
    assert_eq!(value[0]["state"]["rows"], json!(2));
    assert!(value[0]["correlation_key"].as_str().unwrap().starts_with("token:"));
}
