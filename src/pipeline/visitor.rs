//! Field extraction from tracing events.

use std::fmt;

use serde_json::Value;
use tracing::field::{Field, Visit};

use crate::capture::{ErrorInfo, EventId, LogState};

const MESSAGE_FIELD: &str = "message";
const EVENT_ID_FIELD: &str = "event_id";
const EVENT_NAME_FIELD: &str = "event_name";

/// Splits an event's fields into message, event id, error and state.
#[derive(Debug, Default)]
pub(crate) struct EventVisitor {
    pub message: Option<String>,
    pub event_id: Option<u64>,
    pub event_name: Option<String>,
    pub error: Option<ErrorInfo>,
    pub state: LogState,
}

impl EventVisitor {
    pub fn event_id(&mut self) -> EventId {
        EventId {
            id: self.event_id.unwrap_or_default(),
            name: self.event_name.take(),
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let rendered = format!("{:?}", value);
        match field.name() {
            MESSAGE_FIELD => self.message = Some(rendered),
            EVENT_NAME_FIELD => self.event_name = Some(rendered),
            name => {
                self.state.insert(name.to_string(), Value::String(rendered));
            }
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            MESSAGE_FIELD => self.message = Some(value.to_string()),
            EVENT_NAME_FIELD => self.event_name = Some(value.to_string()),
            name => {
                self.state.insert(name.to_string(), Value::from(value));
            }
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            EVENT_ID_FIELD => self.event_id = Some(value),
            name => {
                self.state.insert(name.to_string(), Value::from(value));
            }
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        match (field.name(), u64::try_from(value)) {
            (EVENT_ID_FIELD, Ok(id)) => self.event_id = Some(id),
            (name, _) => {
                self.state.insert(name.to_string(), Value::from(value));
            }
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.state.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.state.insert(field.name().to_string(), Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        let info = ErrorInfo::capture(value);
        self.state
            .insert(field.name().to_string(), Value::String(info.to_string()));
        self.error = Some(info);
    }
}

/// Message for events without a `message` field: `k=v` pairs in key order.
pub(crate) fn render_fields(state: &LogState) -> String {
    state
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}={}", key, s),
            other => format!("{}={}", key, other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
