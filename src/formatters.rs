use std::{error::Error, fmt::Write};

use crate::{LogFormatter, LogLevel};

const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl<F> LogFormatter for F
where
    F: Fn(&str, LogLevel, &str, Option<&dyn Error>) -> String + Send + Sync,
{
    fn format(
        &self,
        logger: &str,
        level: LogLevel,
        message: &str,
        error: Option<&dyn Error>,
    ) -> String {
        self(logger, level, message, error)
    }
}

/// The formatter used when neither the sink nor the logger supplies one.
///
/// Messages are laid out as
/// `[date and time] [logger name, if set] [level] message`, with the error
/// and its source chain appended on separate lines when one was supplied.
pub struct DefaultFormatter {
    datetime_format: String,
}

impl DefaultFormatter {
    pub fn new() -> Self {
        Self {
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }

    /// Overrides the strftime pattern used for the timestamp prefix. An
    /// invalid pattern falls back to the stock one at format time; formatters
    /// run inside every sink's delivery path and must not fail.
    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }

    fn timestamp(&self) -> String {
        let now = chrono::Local::now();

        // chrono fails lazily inside Display on unknown specifiers; render
        // through write! so the failure stays an Err instead of a panic.
        let mut time = String::new();
        if write!(time, "{}", now.format(&self.datetime_format)).is_err() {
            time.clear();
            let _ = write!(time, "{}", now.format(DEFAULT_DATETIME_FORMAT));
        }

        time
    }
}

impl Default for DefaultFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFormatter for DefaultFormatter {
    fn format(
        &self,
        logger: &str,
        level: LogLevel,
        message: &str,
        error: Option<&dyn Error>,
    ) -> String {
        let mut out = format!("[{}] ", self.timestamp());

        if !logger.is_empty() {
            out.push_str(&format!("[{}] ", logger));
        }

        out.push_str(&format!("[{}] {}", level, message));

        if let Some(error) = error {
            out.push_str(&format!("\n{}", error));

            let mut source = error.source();
            while let Some(cause) = source {
                out.push_str(&format!("\ncaused by: {}", cause));
                source = cause.source();
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::DefaultFormatter;
    use crate::{LogFormatter, LogLevel};
    use std::io;

    #[test]
    fn name_level_and_message_appear_in_order() {
        let formatter = DefaultFormatter::new();
        let out = formatter.format("app", LogLevel::Warn, "watch out", None);

        let name = out.find("[app]").unwrap();
        let level = out.find("[Warn]").unwrap();
        let message = out.find("watch out").unwrap();
        assert!(name < level && level < message);
    }

    #[test]
    fn empty_logger_name_is_omitted() {
        let formatter = DefaultFormatter::new();
        let out = formatter.format("", LogLevel::Info, "hello", None);

        assert!(!out.contains("[] "));
        assert!(out.contains("[Info] hello"));
    }

    #[test]
    fn error_detail_follows_the_message() {
        let formatter = DefaultFormatter::new();
        let error = io::Error::new(io::ErrorKind::NotFound, "no such thing");
        let out = formatter.format("app", LogLevel::Error, "lookup failed", Some(&error));

        let message = out.find("lookup failed").unwrap();
        let detail = out.find("no such thing").unwrap();
        assert!(message < detail);
        assert!(out.contains('\n'));
    }

    #[test]
    fn invalid_datetime_pattern_falls_back_to_the_stock_one() {
        let formatter = DefaultFormatter::new().with_datetime_format("%!");

        let out = formatter.format("app", LogLevel::Info, "hello", None);

        assert!(out.contains("[Info] hello"));
        assert!(!out.contains("%!"));
    }

    #[test]
    fn plain_functions_are_formatters() {
        fn custom(
            logger: &str,
            level: LogLevel,
            message: &str,
            _error: Option<&dyn std::error::Error>,
        ) -> String {
            format!("{logger}/{level}/{message}")
        }

        let formatter: &dyn LogFormatter = &custom;
        assert_eq!(
            formatter.format("a", LogLevel::Debug, "b", None),
            "a/Debug/b"
        );
    }
}
