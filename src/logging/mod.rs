//! Log capture for the development dashboard.
//!
//! Events go to stderr through the fmt subscriber (stdout carries JSON-RPC)
//! and are also kept in a [`LogBuffer`] so `/api/logs` can replay them. The
//! buffer is unbounded and lives as long as the process.

use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LogLevel;
use crate::error::{Error, Result};

/// Shared, append-only buffer of formatted log lines.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line formatted as `[timestamp] [LEVEL] message`.
    pub fn push(&self, level: Level, message: &str) {
        let line = format!(
            "[{}] [{}] {}",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            level,
            message
        );
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }

    /// Copy of every line captured so far.
    pub fn snapshot(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A subscriber layer that appends every enabled event to this buffer.
    pub fn layer(&self) -> CaptureLayer {
        CaptureLayer {
            buffer: self.clone(),
        }
    }
}

/// Layer feeding a [`LogBuffer`].
pub struct CaptureLayer {
    buffer: LogBuffer,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.buffer.push(*event.metadata().level(), &visitor.finish());
    }
}

/// Collects the `message` field first, then the remaining fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Build the filter for a minimum level. `RUST_LOG` directives still apply
/// on top of it.
fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.as_filter().into())
        .from_env_lossy()
}

/// Install the global subscriber: stderr output plus capture into `buffer`.
pub fn init(level: LogLevel, buffer: &LogBuffer) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(buffer.layer())
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to set tracing subscriber: {}", e)))
}

/// Install a stderr-only subscriber, used by the generator CLI.
pub fn init_cli(verbose: bool) -> Result<()> {
    let level = if verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to set tracing subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_formats_line() {
        let buffer = LogBuffer::new();
        buffer.push(Level::INFO, "Created note 3: Groceries");

        let lines = buffer.snapshot();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].contains("] [INFO] Created note 3: Groceries"));
    }

    #[test]
    fn test_clones_share_lines() {
        let buffer = LogBuffer::new();
        let clone = buffer.clone();
        clone.push(Level::WARN, "careful");

        assert_eq!(buffer.len(), 1);
        assert!(buffer.snapshot()[0].contains("[WARN] careful"));
    }

    #[test]
    fn test_capture_layer_records_events() {
        let buffer = LogBuffer::new();
        let subscriber = tracing_subscriber::registry().with(buffer.layer());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Listing resources");
            tracing::error!(uri = "bad:///1", "Invalid URI");
        });

        let lines = buffer.snapshot();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[INFO] Listing resources"));
        assert!(lines[1].contains("[ERROR] Invalid URI uri=bad:///1"));
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = LogBuffer::new();
        assert!(buffer.is_empty());
        assert!(buffer.snapshot().is_empty());
    }
}
