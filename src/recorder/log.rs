//! Append-only request log.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::recorder::har::RequestRecord;
use crate::recorder::RecordError;

/// Shared NDJSON sink. One lock acquisition per line.
pub struct RequestLog {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl RequestLog {
    /// Wrap an arbitrary writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Open (or create) a log file in append mode.
    pub fn open(path: &Path) -> Result<Self, RecordError> {
        let file: File = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        tracing::info!(path = %path.display(), "Request log opened");
        Ok(Self::new(file))
    }

    /// Serialize and append one record as a single line.
    pub fn append(&self, record: &RequestRecord) -> Result<(), RecordError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().map_err(|_| RecordError::Poisoned)?;
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for RequestLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestLog").finish_non_exhaustive()
    }
}
