//! Tracing layer that keeps recent playroom log lines for the status bar
//!
//! Captures INFO and above from the playroom crates only; framework
//! internals are skipped.

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Number of log lines retained
const MAX_LOG_LINES: usize = 200;

/// Targets captured by the layer
const CAPTURED_TARGET_PREFIXES: &[&str] = &["playroom_core", "playroom_app", "playroom_studio"];

/// One captured log line
#[derive(Clone, Debug, PartialEq)]
pub struct LogLine {
    pub level: Level,
    pub message: String,
}

impl LogLine {
    /// CSS class name for styling
    pub fn css_class(&self) -> &'static str {
        match self.level {
            Level::ERROR => "log-error",
            Level::WARN => "log-warn",
            _ => "log-info",
        }
    }
}

/// Shared ring of recent log lines
#[derive(Clone, Default)]
pub struct LogBuffer {
    lines: Arc<RwLock<VecDeque<LogLine>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: LogLine) {
        let mut lines = self.lines.write();
        lines.push_back(line);
        while lines.len() > MAX_LOG_LINES {
            lines.pop_front();
        }
    }

    /// Most recent line, if any
    pub fn last(&self) -> Option<LogLine> {
        self.lines.read().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.lines.read().len()
    }
}

/// A tracing layer that captures events into a [`LogBuffer`]
pub struct LogLayer {
    buffer: LogBuffer,
}

impl LogLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }

    fn is_captured(target: &str) -> bool {
        CAPTURED_TARGET_PREFIXES
            .iter()
            .any(|prefix| target.starts_with(prefix))
    }
}

impl<S: Subscriber> Layer<S> for LogLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        if level > Level::INFO || !Self::is_captured(event.metadata().target()) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.buffer.push(LogLine {
            level,
            message: visitor.message,
        });
    }
}

/// Pulls the `message` field out of an event
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else if self.message.is_empty() {
            self.message = format!("{}: {:?}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else if self.message.is_empty() {
            self.message = format!("{}: {}", field.name(), value);
        }
    }
}
