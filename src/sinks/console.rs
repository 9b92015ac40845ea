use std::io::{self, Write};

use eyre::Context;

use crate::{LogFormatter, LogLevel, LogSink, SinkOptions};

/// A sink that writes log output to standard output.
pub struct ConsoleSink {
    options: SinkOptions,
    handle: io::Stdout,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            options: SinkOptions::default(),
            handle: io::stdout(),
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
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for ConsoleSink {
    fn options(&self) -> &SinkOptions {
        &self.options
    }

    fn write_log(&self, formatted: &str) -> eyre::Result<()> {
        let mut writer = self.handle.lock();

        writeln!(writer, "{}", formatted)?;
        writer.flush().context("failed flushing stdout")
    }
}
