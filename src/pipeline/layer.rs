//! `tracing` layer routing events into collectors.

use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::capture::{CaptureCoordinator, LogLevel};
use crate::pipeline::visitor::{render_fields, EventVisitor};

/// Target prefix of the engine's own diagnostics, which are never captured.
const INTERNAL_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Routes every event to the collector for its target.
///
/// The collector is created on first use. Fields are only visited when that
/// collector is armed for the event's level.
#[derive(Debug, Clone)]
pub struct CaptureLayer {
    coordinator: Arc<CaptureCoordinator>,
}

impl CaptureLayer {
    pub fn new(coordinator: Arc<CaptureCoordinator>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Arc<CaptureCoordinator> {
        &self.coordinator
    }
}

fn is_internal(target: &str) -> bool {
    match target.strip_prefix(INTERNAL_TARGET) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn max_level_hint(&self) -> Option<LevelFilter> {
        Some(LevelFilter::TRACE)
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let category = metadata.target();
        if is_internal(category) {
            return;
        }

        let level = LogLevel::from(metadata.level());
        let collector = self.coordinator.create_sink(category);
        if !collector.is_enabled(level) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        let event_id = visitor.event_id();
        let message = visitor.message.take();

        collector.log(level, event_id, visitor.state, visitor.error, move |state, _| {
            message.unwrap_or_else(|| render_fields(state))
        });
    }
}
