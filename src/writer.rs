use std::{io, mem, sync::Arc};

use crate::{Logger, LogLevel};

/// A line-buffering [`io::Write`] adapter that feeds a [`Logger`].
///
/// Fragments are accumulated into a line buffer; every newline in the input
/// and every explicit [`flush`](io::Write::flush) submits the buffered line
/// to the logger at the configured level and clears the buffer. This makes a
/// logger usable anywhere a character-stream output target is expected.
/// Writes are byte-oriented, so a multi-byte character may arrive split
/// across calls; its leading bytes are held back until the rest arrives.
pub struct LogWriter {
    logger: Arc<Logger>,
    level: LogLevel,
    line: String,
    pending: Vec<u8>,
}

impl LogWriter {
    pub fn new(logger: Arc<Logger>, level: LogLevel) -> Self {
        Self {
            logger,
            level,
            line: String::new(),
            pending: Vec::new(),
        }
    }

    /// The level buffered lines are submitted with.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Changes the level used for lines submitted from now on.
    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    fn submit(&mut self) -> io::Result<()> {
        if self.line.ends_with('\r') {
            self.line.pop();
        }

        let line = mem::take(&mut self.line);
        self.logger
            .log(self.level, line, None)
            .map_err(io::Error::other)
    }
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);

        let mut text = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(decoded) => {
                    text.push_str(decoded);
                    self.pending.clear();
                    break;
                }
                Err(error) => {
                    let valid = error.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match error.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        // A multi-byte character cut off at the end of the
                        // chunk; keep its bytes until the rest arrives.
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }

        let mut rest = text.as_str();
        while let Some(index) = rest.find('\n') {
            self.line.push_str(&rest[..index]);
            self.submit()?;
            rest = &rest[index + 1..];
        }
        self.line.push_str(rest);

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.submit()
    }
}

#[cfg(test)]
mod tests {
    use super::LogWriter;
    use crate::{sinks::StringSink, LogLevel, Logger};
    use std::{
        io::Write,
        sync::Arc,
    };

    fn logger_with_sink() -> (Arc<Logger>, Arc<StringSink>) {
        let sink = Arc::new(StringSink::new().with_minimum_level(LogLevel::Trace));
        let logger = Arc::new(Logger::new("writer").with_sink(sink.clone()));
        (logger, sink)
    }

    #[test]
    fn fragments_accumulate_until_flush() {
        let (logger, sink) = logger_with_sink();
        let mut writer = LogWriter::new(logger, LogLevel::Info);

        write!(writer, "part one, ").unwrap();
        write!(writer, "part two").unwrap();
        assert_eq!(sink.value(), "");

        writer.flush().unwrap();
        assert!(sink.value().contains("part one, part two"));
    }

    #[test]
    fn newline_submits_the_buffered_line() {
        let (logger, sink) = logger_with_sink();
        let mut writer = LogWriter::new(logger, LogLevel::Debug);

        writeln!(writer, "a full line").unwrap();

        let value = sink.value();
        assert!(value.contains("[Debug] a full line"));
    }

    #[test]
    fn multiple_lines_in_one_write_become_multiple_messages() {
        let (logger, sink) = logger_with_sink();
        let mut writer = LogWriter::new(logger, LogLevel::Info);

        writer.write_all(b"one\ntwo\nthree").unwrap();
        writer.flush().unwrap();

        let value = sink.value();
        let one = value.find("one").unwrap();
        let two = value.find("two").unwrap();
        let three = value.find("three").unwrap();
        assert!(one < two && two < three);
    }

    #[test]
    fn carriage_returns_are_stripped() {
        let (logger, sink) = logger_with_sink();
        let mut writer = LogWriter::new(logger, LogLevel::Info);

        writer.write_all(b"windows line\r\n").unwrap();

        let value = sink.value();
        assert!(value.contains("windows line\n"));
        assert!(!value.contains('\r'));
    }

    #[test]
    fn multibyte_characters_split_across_writes_stay_intact() {
        let (logger, sink) = logger_with_sink();
        let mut writer = LogWriter::new(logger, LogLevel::Info);

        // "é" is two bytes; cut the stream between them.
        let bytes = "héllo\n".as_bytes();
        writer.write_all(&bytes[..2]).unwrap();
        writer.write_all(&bytes[2..]).unwrap();

        let value = sink.value();
        assert!(value.contains("héllo"));
        assert!(!value.contains('\u{FFFD}'));
    }

    #[test]
    fn invalid_bytes_become_replacement_characters() {
        let (logger, sink) = logger_with_sink();
        let mut writer = LogWriter::new(logger, LogLevel::Info);

        writer.write_all(b"a\xFFb\n").unwrap();

        assert!(sink.value().contains("a\u{FFFD}b"));
    }

    #[test]
    fn set_level_applies_to_later_lines() {
        let (logger, sink) = logger_with_sink();
        let mut writer = LogWriter::new(logger, LogLevel::Info);

        writeln!(writer, "calm").unwrap();
        writer.set_level(LogLevel::Error);
        writeln!(writer, "loud").unwrap();

        let value = sink.value();
        assert!(value.contains("[Info] calm"));
        assert!(value.contains("[Error] loud"));
    }
}
