//! Configuration management for the devjournal application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults. The resulting `Config` is built once at process
//! start and passed by reference into every component; nothing reads ambient state
//! after that.
//!
//! # Environment Variables
//!
//! - `DEVJOURNAL_DIR`: Path to the content directory (defaults to ~/Documents/devjournal)
//! - `DEVJOURNAL_PERIOD`: `day` (one file per day) or `month` (one file per month)
//! - `DEVJOURNAL_PROMPT`: Prompt symbol shown by interactive front ends
//! - `DEVJOURNAL_ENCRYPT`: Encrypt every new entry when truthy
//! - `DEVJOURNAL_CONTEXT_LINES`: Context lines reported around search matches
//! - `DEVJOURNAL_GIT_BACKUP`: Commit the content directory after each append when truthy
//! - `HOME`: Used for expanding the default journal directory path

use crate::constants;
use crate::errors::{AppError, AppResult};
use crate::journal_core::PeriodGranularity;
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Configuration for the devjournal application.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use devjournal::Config;
/// use devjournal::journal_core::PeriodGranularity;
/// use std::path::PathBuf;
///
/// let config = Config {
///     journal_dir: PathBuf::from("/path/to/journal"),
///     period: PeriodGranularity::Month,
///     ..Config::default()
/// };
/// assert_eq!(config.context_lines, 2);
/// ```
#[derive(Clone)]
pub struct Config {
    /// Directory holding every period file.
    pub journal_dir: PathBuf,

    /// Whether entries are grouped into day or month files.
    pub period: PeriodGranularity,

    /// Prompt symbol used by interactive front ends.
    pub prompt_symbol: String,

    /// Encrypt new entries even when the caller did not ask for it.
    pub auto_encrypt: bool,

    /// Lines of context reported before and after each search match.
    pub context_lines: usize,

    /// Commit the content directory through version control after each append.
    pub auto_commit: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("journal_dir", &constants::REDACTED_PLACEHOLDER)
            .field("period", &self.period)
            .field("prompt_symbol", &self.prompt_symbol)
            .field("auto_encrypt", &self.auto_encrypt)
            .field("context_lines", &self.context_lines)
            .field("auto_commit", &self.auto_commit)
            .finish()
    }
}

impl Default for Config {
    /// Creates a new Config with default values and an empty journal directory.
    fn default() -> Self {
        Config {
            journal_dir: PathBuf::from(""),
            period: PeriodGranularity::Day,
            prompt_symbol: constants::DEFAULT_PROMPT_SYMBOL.to_string(),
            auto_encrypt: false,
            context_lines: constants::DEFAULT_CONTEXT_LINES,
            auto_commit: false,
        }
    }
}

/// Interprets the usual spellings of a boolean environment flag.
fn parse_flag(name: &str, raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Config(format!(
            "{} must be a boolean (true/false), got '{}'",
            name, other
        ))),
    }
}

fn parse_context_lines(raw: &str) -> AppResult<usize> {
    let lines: usize = raw.trim().parse().map_err(|_| {
        AppError::Config(format!(
            "{} must be a non-negative integer, got '{}'",
            constants::ENV_VAR_DEVJOURNAL_CONTEXT_LINES,
            raw
        ))
    })?;
    if lines > constants::MAX_CONTEXT_LINES {
        return Err(AppError::Config(format!(
            "{} cannot exceed {}",
            constants::ENV_VAR_DEVJOURNAL_CONTEXT_LINES,
            constants::MAX_CONTEXT_LINES
        )));
    }
    Ok(lines)
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The journal directory is expanded with `shellexpand` so `~` and
    /// `$VAR` references work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if path expansion fails or any variable holds
    /// a value that cannot be interpreted.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use devjournal::Config;
    ///
    /// match Config::load() {
    ///     Ok(config) => println!("Using {:?} period files", config.period),
    ///     Err(err) => eprintln!("Failed to load config: {}", err),
    /// }
    /// ```
    pub fn load() -> AppResult<Self> {
        let journal_dir_str = env::var(constants::ENV_VAR_DEVJOURNAL_DIR).unwrap_or_else(|_| {
            let home = env::var(constants::ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, constants::DEFAULT_JOURNAL_SUBDIR)
        });

        let expanded_path = shellexpand::full(&journal_dir_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
        let journal_dir = PathBuf::from(expanded_path.into_owned());

        if journal_dir.as_os_str().is_empty() {
            return Err(AppError::Config(
                "Journal directory path is empty".to_string(),
            ));
        }

        let period = match env::var(constants::ENV_VAR_DEVJOURNAL_PERIOD) {
            Ok(raw) => raw.parse::<PeriodGranularity>()?,
            Err(_) => PeriodGranularity::Day,
        };

        let prompt_symbol = env::var(constants::ENV_VAR_DEVJOURNAL_PROMPT)
            .unwrap_or_else(|_| constants::DEFAULT_PROMPT_SYMBOL.to_string());

        let auto_encrypt = match env::var(constants::ENV_VAR_DEVJOURNAL_ENCRYPT) {
            Ok(raw) => parse_flag(constants::ENV_VAR_DEVJOURNAL_ENCRYPT, &raw)?,
            Err(_) => false,
        };

        let context_lines = match env::var(constants::ENV_VAR_DEVJOURNAL_CONTEXT_LINES) {
            Ok(raw) => parse_context_lines(&raw)?,
            Err(_) => constants::DEFAULT_CONTEXT_LINES,
        };

        let auto_commit = match env::var(constants::ENV_VAR_DEVJOURNAL_GIT_BACKUP) {
            Ok(raw) => parse_flag(constants::ENV_VAR_DEVJOURNAL_GIT_BACKUP, &raw)?,
            Err(_) => false,
        };

        Ok(Config {
            journal_dir,
            period,
            prompt_symbol,
            auto_encrypt,
            context_lines,
            auto_commit,
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the journal directory is empty or
    /// relative, or the context window is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use devjournal::Config;
    /// use std::path::PathBuf;
    ///
    /// let valid_config = Config {
    ///     journal_dir: PathBuf::from("/absolute/path"),
    ///     ..Config::default()
    /// };
    /// assert!(valid_config.validate().is_ok());
    ///
    /// let invalid_config = Config {
    ///     journal_dir: PathBuf::from("relative/path"),
    ///     ..Config::default()
    /// };
    /// assert!(invalid_config.validate().is_err());
    /// ```
    pub fn validate(&self) -> AppResult<()> {
        if self.journal_dir.as_os_str().is_empty() {
            return Err(AppError::Config(
                "Journal directory path is empty".to_string(),
            ));
        }

        if !self.journal_dir.is_absolute() {
            return Err(AppError::Config(
                "Journal directory must be an absolute path".to_string(),
            ));
        }

        if self.context_lines > constants::MAX_CONTEXT_LINES {
            return Err(AppError::Config(format!(
                "Context lines cannot exceed {}",
                constants::MAX_CONTEXT_LINES
            )));
        }

        Ok(())
    }
}
