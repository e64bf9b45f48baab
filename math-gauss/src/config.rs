//! JSON configuration for the solver front end

use crate::error::{GaussError, Result};
use crate::parallel::{ParallelConfig, SchedulePolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File locations and parallel settings, loaded from JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Augmented system to read
    pub input: PathBuf,
    /// Base name of solution files; durations and `.csv` are appended
    pub output_base: PathBuf,
    /// Run log file
    pub log_path: PathBuf,
    /// Parallel execution settings
    pub parallel: ParallelConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("C.csv"),
            output_base: PathBuf::from("X"),
            log_path: PathBuf::from("DataLog.txt"),
            parallel: ParallelConfig::default(),
        }
    }
}

/// Values given on the command line, applied on top of a loaded config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub input: Option<PathBuf>,
    pub output_base: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub schedule: Option<SchedulePolicy>,
    pub chunk_size: Option<usize>,
    pub workers: Option<usize>,
    /// Only switches row reduction on; `false` keeps the loaded value
    pub parallel_elimination: bool,
}

impl AppConfig {
    /// Apply command-line overrides. On error `self` is left unchanged.
    pub fn apply(&mut self, overrides: &Overrides) -> Result<()> {
        let mut parallel = self.parallel.clone();
        if let Some(schedule) = overrides.schedule {
            parallel.set_schedule(schedule);
        }
        if let Some(chunk_size) = overrides.chunk_size {
            parallel.set_chunk_size(chunk_size)?;
        }
        if let Some(workers) = overrides.workers {
            parallel.set_workers(workers)?;
        }
        if overrides.parallel_elimination {
            parallel.set_parallel_elimination(true);
        }

        self.parallel = parallel;
        if let Some(input) = &overrides.input {
            self.input = input.clone();
        }
        if let Some(output_base) = &overrides.output_base {
            self.output_base = output_base.clone();
        }
        if let Some(log_path) = &overrides.log_path {
            self.log_path = log_path.clone();
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json(text: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(text)?;
        config.parallel.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GaussError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Save as pretty-printed JSON
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| GaussError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
