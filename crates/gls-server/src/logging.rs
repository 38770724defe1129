//! Logging infrastructure bridging tracing events to LSP client messages.
//!
//! Two layers sit on one `Registry`:
//!
//! - a file layer writing every event that passes the `EnvFilter` to a daily
//!   rolling `lsp.log` in the configured logs directory, keeping the current
//!   file and at most three older ones;
//! - the [`LspLayer`], which forwards events to the client as
//!   `window/logMessage`. INFO and above always go out; DEBUG only when the
//!   configured level is `debug`; TRACE never.

use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use gls_conf::LogLevel;
use tower_lsp_server::ls_types::MessageType;
use tracing::field::Visit;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

/// A tracing Layer that forwards events to the LSP client.
pub struct LspLayer {
    send_message: Arc<dyn Fn(MessageType, String) + Send + Sync>,
}

impl LspLayer {
    pub fn new<F>(send_message: F) -> Self
    where
        F: Fn(MessageType, String) + Send + Sync + 'static,
    {
        Self {
            send_message: Arc::new(send_message),
        }
    }
}

/// Visitor that extracts the message field from tracing events.
struct MessageVisitor {
    message: Option<String>,
}

impl MessageVisitor {
    fn new() -> Self {
        Self { message: None }
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }
}

impl<S> Layer<S> for LspLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let Some(message_type) = message_type(*event.metadata().level()) else {
            return;
        };

        let mut visitor = MessageVisitor::new();
        event.record(&mut visitor);

        if let Some(message) = visitor.message {
            (self.send_message)(message_type, message);
        }
    }
}

fn message_type(level: Level) -> Option<MessageType> {
    match level {
        Level::ERROR => Some(MessageType::ERROR),
        Level::WARN => Some(MessageType::WARNING),
        Level::INFO => Some(MessageType::INFO),
        Level::DEBUG => Some(MessageType::LOG),
        Level::TRACE => None,
    }
}

/// Highest level the client gets to see for a configured [`LogLevel`].
fn client_level(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info | LogLevel::Warning | LogLevel::Error => LevelFilter::INFO,
    }
}

/// Daily log files kept on disk, today's included.
const MAX_LOG_FILES: usize = 4;

/// Daily rolling appender for `log_file`, creating its directory first.
///
/// Files are named `<file name>.<date>`; beyond [`MAX_LOG_FILES`] the oldest
/// are deleted on rotation.
pub fn file_appender(log_file: &Utf8Path) -> Result<RollingFileAppender> {
    let log_dir = log_file.parent().unwrap_or(Utf8Path::new("."));
    let file_name = log_file.file_name().unwrap_or(gls_conf::LOG_FILE_NAME);

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create logs directory {log_dir}"))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file_name)
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .with_context(|| format!("failed to open log file {log_file}"))
}

/// Initialize the dual-layer tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level` for the file layer. The returned
/// `WorkerGuard` must be kept alive for the file writer to flush.
pub fn init_tracing<F>(
    log_file: &Utf8Path,
    level: LogLevel,
    send_message: F,
) -> Result<WorkerGuard>
where
    F: Fn(MessageType, String) + Send + Sync + 'static,
{
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(log_file)?);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter_directive()));
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    let lsp_layer = LspLayer::new(send_message).with_filter(client_level(level));

    Registry::default()
        .with(file_layer)
        .with(lsp_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(guard)
}
