use std::sync::{Mutex, PoisonError};

use crate::{LogFormatter, LogLevel, LogSink, SinkOptions};

/// A sink that collects log output in memory, to be queried with
/// [`StringSink::value`].
pub struct StringSink {
    options: SinkOptions,
    buffer: Mutex<String>,
}

impl StringSink {
    pub fn new() -> Self {
        Self {
            options: SinkOptions::default(),
            buffer: Mutex::new(String::new()),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.options.enabled = enabled;
        self
    }

    pub fn with_minimum_level(mut self, level: LogLevel) -> Self {
        self.options.minimum_level = level;
        self
    }

    pub fn with_formatter(mut self, formatter: impl LogFormatter + 'static) -> Self {
        self.options.formatter = Some(Box::new(formatter));
        self
    }

    /// A snapshot of everything this sink has collected so far.
    pub fn value(&self) -> String {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clears the collected output. After this call, [`StringSink::value`]
    /// returns an empty string.
    pub fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for StringSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StringSink {
    fn options(&self) -> &SinkOptions {
        &self.options
    }

    fn write_log(&self, formatted: &str) -> eyre::Result<()> {
        let mut buffer = self.buffer.lock().map_err(|e| eyre::eyre!(e.to_string()))?;

        buffer.push_str(formatted);
        buffer.push('\n');
        Ok(())
    }
}
