use std::{error::Error, fmt, sync::Arc};

use eyre::Context;

use crate::{DefaultFormatter, LogFormatter, LogLevel, LogSink};

/// The fan-out dispatcher: filters leveled messages and forwards them to its
/// sinks.
///
/// Sinks are shared through [`Arc`], so several loggers can write to the same
/// destinations. The logger itself holds no resources; [`Logger::dispose_sinks`]
/// closes the attached sinks when the caller owns them exclusively. Callers
/// sharing a sink list across loggers should tear the sinks down from one
/// place only.
///
/// The configuration fields are plain and unguarded; reconfiguring a logger
/// while other threads are logging through it is the caller's responsibility.
pub struct Logger {
    /// The name used by the default formatter. May be empty.
    pub name: String,
    /// When `false`, the logger drops every message.
    pub enabled: bool,
    /// The minimum level a message needs for this logger to dispatch it.
    /// Messages at exactly this level pass.
    pub minimum_level: LogLevel,
    sinks: Vec<Arc<dyn LogSink>>,
    formatter: Box<dyn LogFormatter>,
}

impl Logger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            minimum_level: LogLevel::Trace,
            sinks: Vec::new(),
            formatter: Box::new(DefaultFormatter::new()),
        }
    }

    pub fn with_minimum_level(mut self, level: LogLevel) -> Self {
        self.minimum_level = level;
        self
    }

    /// Appends a sink. Sinks are invoked in the order they were added.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Replaces the formatter used by sinks without an override of their own.
    pub fn with_formatter(mut self, formatter: impl LogFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn add_sink(&mut self, sink: Arc<dyn LogSink>) {
        self.sinks.push(sink);
    }

    pub fn sinks(&self) -> &[Arc<dyn LogSink>] {
        &self.sinks
    }

    /// The formatter used by sinks without an override of their own.
    pub fn default_formatter(&self) -> &dyn LogFormatter {
        self.formatter.as_ref()
    }

    /// Dispatches a message to every attached sink that passes both the
    /// logger's and its own level filter.
    ///
    /// A failing sink aborts delivery to the sinks after it for this call;
    /// the error carries the offending destination.
    pub fn log(
        &self,
        level: LogLevel,
        message: impl fmt::Display,
        error: Option<&dyn Error>,
    ) -> eyre::Result<()> {
        if !self.enabled || level < self.minimum_level {
            return Ok(());
        }

        let message = message.to_string();
        for sink in &self.sinks {
            let options = sink.options();
            if !options.enabled || level < options.minimum_level {
                continue;
            }
            sink.log(self, level, &message, error)?;
        }

        Ok(())
    }

    pub fn trace(&self, message: impl fmt::Display) -> eyre::Result<()> {
        self.log(LogLevel::Trace, message, None)
    }

    pub fn debug(&self, message: impl fmt::Display) -> eyre::Result<()> {
        self.log(LogLevel::Debug, message, None)
    }

    pub fn info(&self, message: impl fmt::Display) -> eyre::Result<()> {
        self.log(LogLevel::Info, message, None)
    }

    pub fn warn(&self, message: impl fmt::Display, error: Option<&dyn Error>) -> eyre::Result<()> {
        self.log(LogLevel::Warn, message, error)
    }

    pub fn error(&self, message: impl fmt::Display, error: Option<&dyn Error>) -> eyre::Result<()> {
        self.log(LogLevel::Error, message, error)
    }

    pub fn fatal(&self, message: impl fmt::Display, error: Option<&dyn Error>) -> eyre::Result<()> {
        self.log(LogLevel::Fatal, message, error)
    }

    /// Disposes every attached sink once.
    ///
    /// Kept separate from drop so that callers sharing sinks across loggers
    /// decide where teardown happens instead of each logger assuming
    /// exclusive ownership.
    pub fn dispose_sinks(&self) {
        for sink in &self.sinks {
            sink.dispose();
        }
    }

    /// Registers this logger as the global destination of the `log` crate's
    /// macros. Delivery failures inside the bridge are dropped, since the
    /// `log::Log` contract has no error channel.
    pub fn install(self, filter: log::LevelFilter) -> eyre::Result<()> {
        log::set_max_level(filter);
        log::set_boxed_logger(Box::new(self)).context("failed registering boxed logger")?;

        Ok(())
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.enabled && LogLevel::from(metadata.level()) >= self.minimum_level
    }

    fn log(&self, record: &log::Record) {
        if log::Log::enabled(self, record.metadata()) {
            let _ = Logger::log(self, record.level().into(), record.args(), None);
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::Logger;
    use crate::{sinks::StringSink, LogLevel};
    use std::{io, sync::Arc};

    fn verbose_sink() -> Arc<StringSink> {
        Arc::new(StringSink::new().with_minimum_level(LogLevel::Trace))
    }

    #[test]
    fn logger_minimum_level_filters_before_any_sink() {
        let sink = verbose_sink();
        let logger = Logger::new("app")
            .with_minimum_level(LogLevel::Warn)
            .with_sink(sink.clone());

        logger.info("x").unwrap();
        assert_eq!(sink.value(), "");

        logger.warn("y", None).unwrap();
        assert!(sink.value().contains("[Warn] y"));
    }

    #[test]
    fn messages_at_exactly_the_minimum_level_pass() {
        let sink = verbose_sink();
        let logger = Logger::new("app")
            .with_minimum_level(LogLevel::Info)
            .with_sink(sink.clone());

        logger.info("boundary").unwrap();
        assert!(sink.value().contains("boundary"));
    }

    #[test]
    fn sink_minimum_level_filters_independently() {
        let quiet = Arc::new(StringSink::new().with_minimum_level(LogLevel::Error));
        let chatty = verbose_sink();
        let logger = Logger::new("app")
            .with_sink(quiet.clone())
            .with_sink(chatty.clone());

        logger.debug("detail").unwrap();

        assert_eq!(quiet.value(), "");
        assert!(chatty.value().contains("detail"));
    }

    #[test]
    fn disabled_logger_drops_everything() {
        let sink = verbose_sink();
        let mut logger = Logger::new("app").with_sink(sink.clone());
        logger.enabled = false;

        logger.fatal("ignored", None).unwrap();
        assert_eq!(sink.value(), "");
    }

    #[test]
    fn disabled_sink_is_skipped() {
        let sink = Arc::new(
            StringSink::new()
                .with_minimum_level(LogLevel::Trace)
                .with_enabled(false),
        );
        let logger = Logger::new("app").with_sink(sink.clone());

        logger.info("ignored").unwrap();
        assert_eq!(sink.value(), "");
    }

    #[test]
    fn formatted_output_orders_name_level_and_message() {
        let sink = verbose_sink();
        let logger = Logger::new("N").with_sink(sink.clone());

        logger.warn("X", None).unwrap();

        let value = sink.value();
        let name = value.find("[N]").unwrap();
        let level = value.find("[Warn]").unwrap();
        let message = value.find('X').unwrap();
        assert!(name < level && level < message);
    }

    #[test]
    fn supplied_error_is_appended_after_the_message() {
        let sink = verbose_sink();
        let logger = Logger::new("app").with_sink(sink.clone());
        let error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");

        logger.error("open failed", Some(&error)).unwrap();

        let value = sink.value();
        let message = value.find("open failed").unwrap();
        let detail = value.find("access denied").unwrap();
        assert!(message < detail);
    }

    #[test]
    fn two_loggers_share_one_sink_in_call_order() {
        let sink = verbose_sink();
        let first = Logger::new("first").with_sink(sink.clone());
        let second = Logger::new("second").with_sink(sink.clone());

        first.info("one").unwrap();
        second.info("two").unwrap();
        first.info("three").unwrap();

        let value = sink.value();
        let one = value.find("one").unwrap();
        let two = value.find("two").unwrap();
        let three = value.find("three").unwrap();
        assert!(one < two && two < three);
        assert!(value.contains("[first]") && value.contains("[second]"));
    }

    #[test]
    fn install_bridges_the_log_crate_macros() {
        let sink = verbose_sink();
        let logger = Logger::new("global").with_sink(sink.clone());
        logger.install(log::LevelFilter::Info).unwrap();

        log::info!("through the facade");
        log::debug!("filtered out");

        let value = sink.value();
        assert!(value.contains("[global] [Info] through the facade"));
        assert!(!value.contains("filtered out"));
    }

    #[test]
    fn sink_formatter_override_wins_over_the_logger_default() {
        fn bare(
            _logger: &str,
            _level: LogLevel,
            message: &str,
            _error: Option<&dyn std::error::Error>,
        ) -> String {
            message.to_string()
        }

        let sink = Arc::new(
            StringSink::new()
                .with_minimum_level(LogLevel::Trace)
                .with_formatter(bare),
        );
        let logger = Logger::new("app").with_sink(sink.clone());

        logger.info("just this").unwrap();
        assert_eq!(sink.value(), "just this\n");
    }
}
