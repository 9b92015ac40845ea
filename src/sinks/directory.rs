use std::{
    fs::{self, File},
    io::{LineWriter, Write},
    path::{Path, PathBuf},
    sync::Mutex,
    time::SystemTime,
};

use chrono::format::{Item, StrftimeItems};
use eyre::Context;

use crate::{LogFormatter, LogLevel, LogSink, SinkOptions};

use super::file::open_append;

const DEFAULT_MAX_FILES: usize = 10;
const DEFAULT_DATE_FORMAT: &str = "%y-%m-%d_%H-%M-%S";
const FILE_EXTENSION: &str = "txt";

/// A sink that manages a bounded set of timestamped log files in a directory.
///
/// Unlike [`FileSink`](super::FileSink), a new file is created every time the
/// sink is constructed, and construction deletes the oldest existing files
/// until the directory holds fewer than the configured maximum. The directory
/// listing itself is the index: there is no metadata file.
pub struct DirectorySink {
    options: SinkOptions,
    directory: PathBuf,
    path: PathBuf,
    reopen_on_write: bool,
    writer: Mutex<Option<LineWriter<File>>>,
}

impl DirectorySink {
    /// Opens a directory sink with the default settings: at most 10 files,
    /// file handle held open, file names like `25-08-23_14-03-59.txt`. See
    /// [`DirectorySinkBuilder`] for the knobs.
    pub fn new(directory: impl Into<PathBuf>) -> eyre::Result<Self> {
        Self::builder(directory).build()
    }

    pub fn builder(directory: impl Into<PathBuf>) -> DirectorySinkBuilder {
        DirectorySinkBuilder {
            directory: directory.into(),
            max_files: DEFAULT_MAX_FILES,
            reopen_on_write: false,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
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

    /// The directory this sink stores its log files in.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The path of the file this sink is currently writing to.
    pub fn current_file(&self) -> &Path {
        &self.path
    }
}

impl LogSink for DirectorySink {
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

/// Configures and opens a [`DirectorySink`].
pub struct DirectorySinkBuilder {
    directory: PathBuf,
    max_files: usize,
    reopen_on_write: bool,
    date_format: String,
}

impl DirectorySinkBuilder {
    /// The maximum amount of files that can exist in the directory before
    /// the oldest one gets deleted. Must be at least 1, 10 by default.
    pub fn max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    /// Whether the current file should be reopened on every write instead of
    /// held open by the sink.
    pub fn reopen_on_write(mut self, reopen: bool) -> Self {
        self.reopen_on_write = reopen;
        self
    }

    /// The strftime pattern the current file's name is derived from.
    /// `%y-%m-%d_%H-%M-%S` by default. Patterns with unknown specifiers are
    /// rejected by [`DirectorySinkBuilder::build`].
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Creates the directory if needed, prunes the oldest existing files and
    /// opens a new timestamped file.
    pub fn build(self) -> eyre::Result<DirectorySink> {
        if self.max_files == 0 {
            eyre::bail!("max_files must be at least 1");
        }

        // chrono fails lazily inside Display on unknown specifiers, which
        // format! turns into a panic; reject bad patterns up front instead.
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            eyre::bail!("invalid date format pattern {:?}", self.date_format);
        }

        fs::create_dir_all(&self.directory).with_context(|| {
            format!("failed creating log directory {}", self.directory.display())
        })?;

        // Delete in order of creation time so that older files go first. The
        // comparison is >= because the new file created below counts towards
        // the limit.
        let mut old_files = enumerate_files(&self.directory)?;
        while old_files.len() >= self.max_files {
            let (_, path) = old_files.remove(0);
            fs::remove_file(&path)
                .with_context(|| format!("failed deleting old log file {}", path.display()))?;
        }

        let date = chrono::Local::now().format(&self.date_format);
        let path = self.directory.join(format!("{}.{}", date, FILE_EXTENSION));

        let writer = if self.reopen_on_write {
            None
        } else {
            Some(LineWriter::new(open_append(&path)?))
        };

        Ok(DirectorySink {
            options: SinkOptions::default(),
            directory: self.directory,
            path,
            reopen_on_write: self.reopen_on_write,
            writer: Mutex::new(writer),
        })
    }
}

/// Lists the regular files in `directory`, oldest first. Files sharing a
/// creation timestamp are ordered by path so pruning stays deterministic.
/// Falls back to the modification time on filesystems without birth times.
fn enumerate_files(directory: &Path) -> eyre::Result<Vec<(SystemTime, PathBuf)>> {
    let entries = fs::read_dir(directory)
        .with_context(|| format!("failed listing log directory {}", directory.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed listing log directory {}", directory.display()))?;
        let metadata = entry.metadata().with_context(|| {
            format!("failed reading metadata of log file {}", entry.path().display())
        })?;

        if !metadata.is_file() {
            continue;
        }

        let created = metadata.created().or_else(|_| metadata.modified()).with_context(
            || format!("failed reading timestamps of log file {}", entry.path().display()),
        )?;

        files.push((created, entry.path()));
    }

    files.sort();
    Ok(files)
}
