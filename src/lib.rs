//! A tiny multi-sink logging facade.
//!
//! A [`Logger`] fans leveled messages out to an ordered list of shared
//! [`LogSink`]s. The logger filters once against its own minimum level, then
//! once more per sink, so a single logger can drive a chatty file sink and a
//! quiet console sink at the same time. Sinks are held behind [`Arc`], which
//! lets several loggers write to the same destinations.
//!
//! ```
//! use simplog::{sinks::StringSink, LogLevel, Logger};
//! use std::sync::Arc;
//!
//! # fn main() -> eyre::Result<()> {
//! let sink = Arc::new(StringSink::new().with_minimum_level(LogLevel::Trace));
//! let logger = Logger::new("example").with_sink(sink.clone());
//!
//! logger.info("logger loaded")?;
//! assert!(sink.value().contains("[example] [Info] logger loaded"));
//! # Ok(())
//! # }
//! ```
//!
//! [`Arc`]: std::sync::Arc

pub mod ansi;
mod formatters;
mod level;
mod logger;
pub mod sinks;
mod writer;

pub use formatters::DefaultFormatter;
pub use level::LogLevel;
pub use logger::Logger;
pub use sinks::SinkOptions;
pub use writer::LogWriter;

use std::error::Error;

/// Converts a log call into its final text form.
///
/// Formatters must not fail or have observable side effects; they run inside
/// every sink's delivery path. Any `Fn(&str, LogLevel, &str, Option<&dyn
/// Error>) -> String` qualifies, see [`DefaultFormatter`] for the stock one.
pub trait LogFormatter: Send + Sync {
    fn format(
        &self,
        logger: &str,
        level: LogLevel,
        message: &str,
        error: Option<&dyn Error>,
    ) -> String;
}

/// A destination for log messages.
///
/// Implementations only provide the persist step, [`LogSink::write_log`];
/// filtering happens in the [`Logger`] and formatting in the provided
/// [`LogSink::log`]. [`LogSink::dispose`] releases owned resources and must
/// be idempotent, re-disposing a closed sink is a no-op.
pub trait LogSink: Send + Sync {
    /// The enable flag, minimum level and formatter override for this sink.
    fn options(&self) -> &SinkOptions;

    /// Formats the message with the sink's formatter, falling back to the
    /// logger's default, and forwards it to [`LogSink::write_log`].
    fn log(
        &self,
        logger: &Logger,
        level: LogLevel,
        message: &str,
        error: Option<&dyn Error>,
    ) -> eyre::Result<()> {
        let formatted = match &self.options().formatter {
            Some(formatter) => formatter.format(&logger.name, level, message, error),
            None => logger
                .default_formatter()
                .format(&logger.name, level, message, error),
        };
        self.write_log(&formatted)
    }

    /// Persists a message that has already been formatted.
    fn write_log(&self, formatted: &str) -> eyre::Result<()>;

    /// Releases the resources this sink holds. Safe to call multiple times.
    fn dispose(&self) {}
}
