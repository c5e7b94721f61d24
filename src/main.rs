//! Log capture demo.
//!
//! Runs several concurrent units of work that log under the `db` and `cache`
//! categories, then shows what each capture protocol returns.
//!
//! ```text
//!   worker 0 ─┐                       ┌─ windowed:   one window, every entry
//!   worker 1 ─┼─▶ tracing ─▶ capture ─┤
//!   worker N ─┘     layer     engine  └─ correlated: one result per worker
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use log_capture::config::load_config;
use log_capture::observability::init_logging;
use log_capture::{CaptureCoordinator, CaptureLayer, LogCaptureConfig, LogEntry};

#[derive(Parser)]
#[command(name = "capture-demo")]
#[command(about = "Demonstrates windowed and correlated log capture", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Capture protocol to demonstrate.
    #[arg(short, long, value_enum, default_value_t = Mode::Correlated)]
    mode: Mode,

    /// Number of concurrent units of work.
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Steps logged by each unit of work.
    #[arg(short, long, default_value_t = 3)]
    entries: usize,

    /// Print captured entries as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Windowed,
    Correlated,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LogCaptureConfig::default(),
    };

    let coordinator = Arc::new(CaptureCoordinator::from_config(&config));
    for category in ["db", "cache"] {
        coordinator.create_sink(category);
    }
    init_logging(&config.logging, CaptureLayer::new(coordinator.clone()))?;

    tracing::info!(
        mode = ?cli.mode,
        workers = cli.workers,
        strategy = ?coordinator.strategy(),
        "capture-demo starting"
    );

    match cli.mode {
        Mode::Windowed => {
            coordinator.start_capture()?;
            let handles: Vec<_> = (0..cli.workers)
                .map(|worker| tokio::spawn(unit_of_work(worker, cli.entries)))
                .collect();
            for handle in handles {
                handle.await?;
            }
            let entries = coordinator.end_capture()?;
            print_entries("window", &entries, cli.json)?;
        }
        Mode::Correlated => {
            let handles: Vec<_> = (0..cli.workers)
                .map(|worker| {
                    let coordinator = coordinator.clone();
                    let steps = cli.entries;
                    tokio::spawn(async move {
                        let entries = coordinator
                            .collect_scoped_async(unit_of_work(worker, steps))
                            .await;
                        (worker, entries)
                    })
                })
                .collect();
            for handle in handles {
                let (worker, entries) = handle.await?;
                print_entries(&format!("worker {}", worker), &entries, cli.json)?;
            }
        }
    }

    tracing::info!("capture-demo finished");
    Ok(())
}

async fn unit_of_work(worker: usize, steps: usize) {
    for step in 0..steps {
        tracing::debug!(
            target: "db",
            event_id = 1u64,
            event_name = "insert",
            worker,
            step,
            "insert row {}",
            step
        );
        tokio::task::yield_now().await;
        tracing::trace!(target: "cache", worker, step, "cache refreshed");
    }
    tracing::info!(target: "db", event_id = 2u64, event_name = "commit", worker, "commit");
}

fn print_entries(label: &str, entries: &[LogEntry], json: bool) -> Result<(), serde_json::Error> {
    println!("== {} ({} entries)", label, entries.len());
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
    } else {
        for entry in entries {
            println!("[{:<5}] {:<11} {}", entry.category(), entry.level(), entry);
        }
    }
    Ok(())
}
