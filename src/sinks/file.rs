use std::{
    fs::{self, File},
    io::{LineWriter, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use eyre::Context;

use crate::{LogFormatter, LogLevel, LogSink, SinkOptions};

const ONE_GIB: u64 = 1024 * 1024 * 1024;

/// A sink that writes log output to a single file.
///
/// The file is opened in append mode. By default the handle is held open for
/// the sink's lifetime; with reopen-on-write the file is opened, written and
/// closed on every message instead, which lets other processes rotate or
/// delete it between writes.
pub struct FileSink {
    options: SinkOptions,
    path: PathBuf,
    reopen_on_write: bool,
    writer: Mutex<Option<LineWriter<File>>>,
}

impl FileSink {
    /// Opens a file sink with the default settings, see [`FileSinkBuilder`]
    /// for the rest of them.
    pub fn new(path: impl Into<PathBuf>, append: bool) -> eyre::Result<Self> {
        Self::builder(path).append(append).build()
    }

    pub fn builder(path: impl Into<PathBuf>) -> FileSinkBuilder {
        FileSinkBuilder {
            path: path.into(),
            append: true,
            reopen_on_write: false,
            file_size_limit: ONE_GIB,
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

    /// The path of the file this sink writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn options(&self) -> &SinkOptions {
        &self.options
    }

    fn write_log(&self, formatted: &str) -> eyre::Result<()> {
        let mut writer = self.writer.lock().map_err(|e| eyre::eyre!(e.to_string()))?;

        if self.reopen_on_write {
            let mut file = open_append(&self.path)?;
            writeln!(file, "{}", formatted)
                .with_context(|| format!("failed writing to log file {}", self.path.display()))
        } else {
            let writer = writer.as_mut().ok_or_else(|| {
                eyre::eyre!("log file {} is already disposed", self.path.display())
            })?;

            writeln!(writer, "{}", formatted)
                .with_context(|| format!("failed writing to log file {}", self.path.display()))?;
            writer
                .flush()
                .with_context(|| format!("failed flushing log file {}", self.path.display()))
        }
    }

    fn dispose(&self) {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some(mut writer) = writer.take() {
            let _ = writer.flush();
        }
    }
}

/// Configures and opens a [`FileSink`].
pub struct FileSinkBuilder {
    path: PathBuf,
    append: bool,
    reopen_on_write: bool,
    file_size_limit: u64,
}

impl FileSinkBuilder {
    /// Whether new output should be appended to an existing log file. When
    /// `false`, an existing file is deleted first.
    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Whether the file should be reopened on every write instead of held
    /// open by the sink.
    pub fn reopen_on_write(mut self, reopen: bool) -> Self {
        self.reopen_on_write = reopen;
        self
    }

    /// When appending, an existing file at or above this size in bytes is
    /// deleted on startup instead of being appended to. Defaults to 1 GiB.
    pub fn file_size_limit(mut self, limit: u64) -> Self {
        self.file_size_limit = limit;
        self
    }

    pub fn build(self) -> eyre::Result<FileSink> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).with_context(|| {
                    format!("failed creating log file directory {}", dir.display())
                })?;
            }
        }

        if let Ok(metadata) = fs::metadata(&self.path) {
            if !self.append || metadata.len() >= self.file_size_limit {
                fs::remove_file(&self.path).with_context(|| {
                    format!("failed deleting old log file {}", self.path.display())
                })?;
            }
        }

        let writer = if self.reopen_on_write {
            None
        } else {
            Some(LineWriter::new(open_append(&self.path)?))
        };

        Ok(FileSink {
            options: SinkOptions::default(),
            path: self.path,
            reopen_on_write: self.reopen_on_write,
            writer: Mutex::new(writer),
        })
    }
}

pub(crate) fn open_append(path: &Path) -> eyre::Result<File> {
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed opening log file {}", path.display()))
}
