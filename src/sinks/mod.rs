mod console;
mod directory;
mod file;
mod stream;
mod string;

pub use console::ConsoleSink;
pub use directory::{DirectorySink, DirectorySinkBuilder};
pub use file::{FileSink, FileSinkBuilder};
pub use stream::WriterSink;
pub use string::StringSink;

use crate::{LogFormatter, LogLevel};

/// The filtering and formatting knobs shared by every sink.
///
/// Options are set while a sink is still exclusively owned, through the
/// `with_*` methods each sink exposes, and are read-only once the sink is
/// shared between loggers.
pub struct SinkOptions {
    /// When `false`, the sink drops every message.
    pub enabled: bool,
    /// The minimum level a message needs to reach this sink. Messages at
    /// exactly this level pass.
    pub minimum_level: LogLevel,
    /// Overrides the logger's default formatter for this sink when set.
    pub formatter: Option<Box<dyn LogFormatter>>,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            minimum_level: LogLevel::Info,
            formatter: None,
        }
    }
}
