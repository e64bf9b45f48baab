//! Append-only, human-readable record of reads, solves and writes
//!
//! Entries are buffered in memory and appended to the log file on
//! [`RunLog::flush`]. The solvers never read this file.

use crate::error::{GaussError, Result};
use crate::matrix::Matrix;
use crate::parallel::ParallelConfig;
use crate::solver::SolveReport;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Header written at the start of every session
pub const SESSION_HEADER: &str = "***New Data Logger***";

/// Local time as `YYYY-MM-DD.HH:MM:SS`
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d.%H:%M:%S").to_string()
}

/// Buffered run log bound to a file
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    pending: String,
}

impl RunLog {
    /// Start a session logging to `path`. Nothing is written until
    /// [`RunLog::flush`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pending: format!("\n{SESSION_HEADER}"),
        }
    }

    /// Entries not yet flushed
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Append a raw entry on its own line
    pub fn record(&mut self, entry: impl AsRef<str>) {
        self.pending.push('\n');
        self.pending.push_str(entry.as_ref());
    }

    pub fn record_read(&mut self, source: &Path, outcome: &Result<Matrix>) {
        let status = match outcome {
            Ok(_) => "OK".to_string(),
            Err(e) => format!("Cannot read file: {e}"),
        };
        self.record(format!(
            "Reading file: {}...time: {}... {}",
            source.display(),
            timestamp(),
            status
        ));
    }

    pub fn record_solve(
        &mut self,
        equations: usize,
        config: &ParallelConfig,
        outcome: &Result<SolveReport>,
    ) {
        let status = match outcome {
            Ok(report) => report.to_string(),
            Err(e) if e.is_dimension_error() => format!("Dimension mismatch. {e}"),
            Err(e) if e.is_input_error() => format!("Input error. {e}"),
            Err(e) => format!("Error. {e}"),
        };
        self.record(format!(
            "Gaussian elimination time: {}, amount of equations: {}, {}, {}",
            timestamp(),
            equations,
            config,
            status
        ));
    }

    pub fn record_write(&mut self, target: &Result<PathBuf>) {
        let status = match target {
            Ok(path) => format!("{}... OK", path.display()),
            Err(e) => format!("failed: {e}"),
        };
        self.record(format!(
            "File writing...time: {}... {}",
            timestamp(),
            status
        ));
    }

    pub fn record_config_change(&mut self, config: &ParallelConfig) {
        self.record(format!(
            "Changing parallel options: {}, {}",
            timestamp(),
            config
        ));
    }

    /// Append pending entries to the log file and clear the buffer
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| GaussError::Io {
                path: self.path.clone(),
                source,
            })?;
        writeln!(file)
            .and_then(|_| file.write_all(self.pending.as_bytes()))
            .map_err(|source| GaussError::Io {
                path: self.path.clone(),
                source,
            })?;
        log::debug!("flushed run log to {}", self.path.display());
        self.pending.clear();
        Ok(())
    }

    /// Everything written to the log file so far
    pub fn contents(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|source| GaussError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
