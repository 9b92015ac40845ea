use std::{
    io::Write,
    sync::{Mutex, PoisonError},
};

use eyre::Context;

use crate::{LogFormatter, LogLevel, LogSink, SinkOptions};

/// A sink that writes log output to an arbitrary [`Write`] destination.
///
/// [`ConsoleSink`](super::ConsoleSink) is a variation of this sink fixed to
/// standard output.
pub struct WriterSink {
    options: SinkOptions,
    writer: Mutex<Option<Box<dyn Write + Send>>>,
    auto_close: bool,
}

impl WriterSink {
    /// Wraps the given writer. When `auto_close` is set, disposing the sink
    /// drops the writer; otherwise the writer outlives disposal and keeps
    /// accepting messages.
    pub fn new(writer: impl Write + Send + 'static, auto_close: bool) -> Self {
        Self {
            options: SinkOptions::default(),
            writer: Mutex::new(Some(Box::new(writer))),
            auto_close,
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

impl LogSink for WriterSink {
    fn options(&self) -> &SinkOptions {
        &self.options
    }

    fn write_log(&self, formatted: &str) -> eyre::Result<()> {
        let mut writer = self.writer.lock().map_err(|e| eyre::eyre!(e.to_string()))?;

        let writer = writer
            .as_mut()
            .ok_or_else(|| eyre::eyre!("writer sink is already disposed"))?;

        writeln!(writer, "{}", formatted)?;
        writer.flush().context("failed flushing writer sink")
    }

    fn dispose(&self) {
        if self.auto_close {
            let mut writer = self
                .writer
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            if let Some(mut writer) = writer.take() {
                let _ = writer.flush();
            }
        }
    }
}
