//! Per-day append-only dataset log.
//!
//! Every job launched on the same calendar day shares
//! `<log_dir>/diagnosis_<YYYYMMDD>.log`. Each job's section starts with a
//! header block written in a single append so concurrent requests never
//! split each other's headers; the job output that follows may interleave.

use chrono::NaiveDateTime;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SinkError;
use crate::identifier::SafeIdentifier;

const RULE_WIDTH: usize = 80;

/// An open append handle on the day's log file, header already written.
#[derive(Debug)]
pub struct LogSink {
    path: PathBuf,
    file: File,
}

impl LogSink {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_parts(self) -> (PathBuf, File) {
        (self.path, self.file)
    }
}

pub fn log_file_name(now: NaiveDateTime) -> String {
    format!("diagnosis_{}.log", now.format("%Y%m%d"))
}

pub fn log_file_path(log_dir: &Path, now: NaiveDateTime) -> PathBuf {
    log_dir.join(log_file_name(now))
}

pub fn header_block(now: NaiveDateTime, identifier: &SafeIdentifier) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "\n{rule}\n[{}] Starting diagnosis for dataset: {identifier}\n{rule}\n\n",
        now.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Opens (creating as needed) the day's log and writes the job header.
///
/// The directory is recreated if it was removed after startup.
pub fn resolve_sink(
    log_dir: &Path,
    now: NaiveDateTime,
    identifier: &SafeIdentifier,
) -> Result<LogSink, SinkError> {
    fs::create_dir_all(log_dir).map_err(|source| SinkError::DirectoryCreateFailed {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let path = log_file_path(log_dir, now);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| SinkError::FileOpenFailed {
            path: path.clone(),
            source,
        })?;

    // One write on an O_APPEND descriptor keeps the header contiguous.
    let header = header_block(now, identifier);
    file.write_all(header.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|source| SinkError::HeaderWriteFailed {
            path: path.clone(),
            source,
        })?;

    debug!(log_path = %path.display(), dataset = %identifier, "dataset log header written");

    Ok(LogSink { path, file })
}
