//! # Run Log
//!
//! The durable, append-only record of a merge run. One [`RunLog`] is opened
//! by the command at the start of a run and passed by reference to every
//! component that needs to report progress.
//!
//! Each record is written to the log file as
//! `[YYYY-MM-DD HH:MM:SS] [LEVEL] message` and forwarded to the `log` facade
//! at the same level, so `--log-level` controls what also reaches stderr.
//! Callers must never pass credentials into a record.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::Level;

use crate::error::{Error, Result};

/// Timestamp layout used in every log line.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only run log.
pub struct RunLog {
    sink: Mutex<Box<dyn Write + Send>>,
    path: Option<PathBuf>,
}

impl RunLog {
    /// Opens `path` for appending, creating it (and its parent) if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::filesystem("create", parent, e))?;
        }
        let file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::filesystem("open log file", path, e))?;
        Ok(Self {
            sink: Mutex::new(Box::new(file)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Wraps an arbitrary writer. Used by tests and by callers that want the
    /// log somewhere other than a file.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(writer)),
            path: None,
        }
    }

    /// A log that only forwards to the `log` facade.
    pub fn discard() -> Self {
        Self::from_writer(io::sink())
    }

    /// The log file, when the log is file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.record(Level::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.record(Level::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.record(Level::Error, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.record(Level::Debug, message.as_ref());
    }

    /// Writes one record and forwards it to the `log` facade.
    ///
    /// A failing log write must not abort the run, so write errors are
    /// reported through `log` and otherwise dropped.
    pub fn record(&self, level: Level, message: &str) {
        log::log!(level, "{}", message);

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let line = format_line(&timestamp, level, message);
        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = sink.write_all(line.as_bytes()).and_then(|_| sink.flush()) {
            log::warn!("Failed to write run log: {}", e);
        }
    }
}

fn format_line(timestamp: &str, level: Level, message: &str) -> String {
    format!("[{}] [{}] {}\n", timestamp, level.as_str().to_lowercase(), message)
}

#[cfg(test)]
pub(crate) mod capture {
    //! In-memory log sink for unit tests.

    use super::*;
    use std::sync::Arc;

    /// Shared buffer that a [`RunLog`] writes into.
    #[derive(Clone, Default)]
    pub struct Captured(pub Arc<Mutex<Vec<u8>>>);

    impl Captured {
        pub fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Returns a log and a handle to read back what was written.
    pub fn captured_log() -> (RunLog, Captured) {
        let captured = Captured::default();
        (RunLog::from_writer(captured.clone()), captured)
    }
}
