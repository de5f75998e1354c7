use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Shared logger that can be used across the application
///
/// Every record passing through the installed `log` dispatcher is kept in
/// memory for `--show-logs`; with file logging enabled it is also appended to
/// [`Logger::get_log_file_path`].
#[derive(Clone)]
pub struct Logger {
    logs: Arc<Mutex<Vec<String>>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(Vec::new())),
            log_file: None,
        }
    }

    /// Build a logger from the `[logging]` section
    pub fn from_config(enabled: bool) -> Result<Self> {
        let log_file = if enabled { Some(Self::get_log_file_path()?) } else { None };
        Ok(Self {
            logs: Arc::new(Mutex::new(Vec::new())),
            log_file,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.log_file.is_some()
    }

    /// Path of the log file in the user's cache directory
    pub fn get_log_file_path() -> Result<PathBuf> {
        dirs::cache_dir()
            .map(|dir| dir.join("tasksync").join("tasksync.log"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))
    }

    /// Install this logger as the global `log` backend.
    ///
    /// Can only succeed once per process.
    pub fn install(&self, level: log::LevelFilter) -> Result<()> {
        let memory = self.clone();
        let mut dispatch = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "{} {:<5} {}: {}",
                    Utc::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(level)
            .level_for("sqlx", log::LevelFilter::Warn)
            .level_for("sea_orm", log::LevelFilter::Warn)
            .level_for("hyper_util", log::LevelFilter::Warn)
            .level_for("reqwest", log::LevelFilter::Warn)
            .chain(fern::Output::call(move |record| memory.push(record.args().to_string())));

        if let Some(path) = &self.log_file {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
            }
            let file = fern::log_file(path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
            dispatch = dispatch.chain(file);
        }

        dispatch.apply().context("A global logger is already installed")?;
        Ok(())
    }

    fn push(&self, line: String) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.push(line);
        }
    }

    /// Get all logs sorted by date (newest first)
    pub fn get_logs(&self) -> Vec<String> {
        if let Ok(logs) = self.logs.lock() {
            let mut sorted_logs = logs.clone();
            sorted_logs.reverse();
            sorted_logs
        } else {
            Vec::new()
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
