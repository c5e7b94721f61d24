//! Correlated capture through the tracing pipeline.

use std::sync::{Arc, Barrier};

use log_capture::{CaptureCoordinator, ContextToken, CorrelationStrategy, LogEntry};

mod common;

fn all_from(entries: &[LogEntry], worker: &str) -> bool {
    entries.iter().all(|e| e.message().starts_with(worker))
}

#[test]
fn concurrent_collects_are_isolated_by_token() {
    const N_A: usize = 25;
    const N_B: usize = 40;

    let coordinator = Arc::new(CaptureCoordinator::new());
    let dispatch = common::capture_dispatch(&coordinator);
    coordinator.create_sink("db");

    let overlap = Arc::new(Barrier::new(2));
    let run = |name: &'static str, count: usize| {
        let coordinator = coordinator.clone();
        let dispatch = dispatch.clone();
        let overlap = overlap.clone();
        std::thread::spawn(move || {
            tracing::dispatcher::with_default(&dispatch, || {
                coordinator.collect_scoped(|| {
                    overlap.wait();
                    for i in 0..count {
                        tracing::info!(target: "db", "{} {}", name, i);
                    }
                    overlap.wait();
                })
            })
        })
    };

    let a = run("A", N_A);
    let b = run("B", N_B);
    let a = a.join().unwrap();
    let b = b.join().unwrap();

    assert_eq!(a.len(), N_A);
    assert_eq!(b.len(), N_B);
    assert!(all_from(&a, "A"));
    assert!(all_from(&b, "B"));
    assert!(common::is_chronological(&a));
    assert!(common::is_chronological(&b));
}

#[tokio::test]
async fn interleaved_tasks_are_isolated_by_task_scope() {
    let coordinator = Arc::new(CaptureCoordinator::new());
    let _guard = tracing::dispatcher::set_default(&common::capture_dispatch(&coordinator));
    coordinator.create_sink("db");

    let work = |name: &'static str, count: usize| async move {
        for i in 0..count {
            tracing::info!(target: "db", "{} {}", name, i);
            tokio::task::yield_now().await;
        }
    };

    let (a, b) = tokio::join!(
        coordinator.collect_scoped_async(work("A", 5)),
        coordinator.collect_scoped_async(work("B", 7)),
    );

    assert_eq!(a.len(), 5);
    assert_eq!(b.len(), 7);
    assert!(all_from(&a, "A"));
    assert!(all_from(&b, "B"));
}

#[test]
fn task_scopes_inside_thread_scope_stay_isolated() {
    let coordinator = Arc::new(CaptureCoordinator::new());
    let _guard = tracing::dispatcher::set_default(&common::capture_dispatch(&coordinator));
    coordinator.create_sink("db");
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();

    let work = |name: &'static str, count: usize| async move {
        for i in 0..count {
            tracing::info!(target: "db", "{} {}", name, i);
            tokio::task::yield_now().await;
        }
    };

    let outer = ContextToken::new();
    let (a, b) = outer.in_scope(|| {
        rt.block_on(async {
            tokio::join!(
                coordinator.collect_scoped_async(work("A", 5)),
                coordinator.collect_scoped_async(work("B", 7)),
            )
        })
    });

    assert_eq!(a.len(), 5);
    assert_eq!(b.len(), 7);
    assert!(all_from(&a, "A"));
    assert!(all_from(&b, "B"));
}

#[test]
fn token_propagated_to_worker_thread_is_kept() {
    let coordinator = Arc::new(CaptureCoordinator::new());
    let dispatch = common::capture_dispatch(&coordinator);
    let _guard = tracing::dispatcher::set_default(&dispatch);
    coordinator.create_sink("db");

    let token = ContextToken::new();
    let entries = coordinator.collect(|| {
        token.in_scope(|| tracing::info!(target: "db", "caller"));
        std::thread::scope(|s| {
            s.spawn(|| {
                tracing::dispatcher::with_default(&dispatch, || {
                    token.in_scope(|| tracing::info!(target: "db", "worker"));
                    tracing::info!(target: "db", "unscoped");
                })
            });
        });
        token.key()
    });

    assert_eq!(common::messages(&entries), ["caller", "worker"]);
}

#[test]
fn collect_leaves_buffers_for_reset() {
    let coordinator = Arc::new(CaptureCoordinator::new());
    let _guard = tracing::dispatcher::set_default(&common::capture_dispatch(&coordinator));
    let db = coordinator.create_sink("db");

    let first = coordinator.collect_scoped(|| tracing::info!(target: "db", "first"));
    let second = coordinator.collect_scoped(|| tracing::info!(target: "db", "second"));

    assert_eq!(common::messages(&first), ["first"]);
    assert_eq!(common::messages(&second), ["second"]);
    assert_eq!(db.len(), 2);
    coordinator.reset();
    assert!(db.is_empty());
}

fn same_call_site(
    coordinator: &CaptureCoordinator,
    name: &'static str,
    overlap: &Barrier,
) -> Vec<LogEntry> {
    coordinator.collect(|| {
        overlap.wait();
        tracing::info!(target: "db", "{}", name);
        overlap.wait();
        coordinator.correlation_key()
    })
}

#[test]
fn stack_inference_shares_keys_between_runs_of_one_call_site() {
    let coordinator = Arc::new(CaptureCoordinator::with_strategy(
        CorrelationStrategy::StackInference,
    ));
    let dispatch = common::capture_dispatch(&coordinator);
    coordinator.create_sink("db");
    let overlap = Arc::new(Barrier::new(2));

    let handles: Vec<_> = ["A", "B"]
        .into_iter()
        .map(|name| {
            let coordinator = coordinator.clone();
            let dispatch = dispatch.clone();
            let overlap = overlap.clone();
            std::thread::spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || {
                    same_call_site(&coordinator, name, &overlap)
                })
            })
        })
        .collect();

    for handle in handles {
        let entries = handle.join().unwrap();
        // each run also sees the other run's entry
        let mut seen = common::messages(&entries);
        seen.sort();
        assert_eq!(seen, ["A", "B"]);
    }
}

#[test]
fn stack_inference_isolates_distinct_sequential_call_sites() {
    let coordinator = Arc::new(CaptureCoordinator::with_strategy(
        CorrelationStrategy::StackInference,
    ));
    let _guard = tracing::dispatcher::set_default(&common::capture_dispatch(&coordinator));
    coordinator.create_sink("db");

    let first = coordinator.collect(|| {
        tracing::info!(target: "db", "first");
        coordinator.correlation_key()
    });
    let second = coordinator.collect(|| {
        tracing::info!(target: "db", "second");
        coordinator.correlation_key()
    });

    assert_eq!(common::messages(&first), ["first"]);
    assert_eq!(common::messages(&second), ["second"]);
}
