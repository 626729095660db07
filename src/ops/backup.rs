//! Version-control backup of the content directory.
//!
//! The journal only ever asks its collaborator to commit, push, or report
//! status. [`GitBackup`] does this by running `git` inside the content
//! directory; [`NoBackup`] is used when backup is not configured.

use crate::constants;
use crate::errors::{AppResult, BackupError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Opaque backup operations on the content directory.
pub trait VersionControl {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Records the current state of the content directory.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backup` if the underlying tool fails.
    fn commit(&self, message: &str) -> AppResult<()>;

    /// Sends recorded state to the configured remote.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backup` if the underlying tool fails.
    fn push(&self) -> AppResult<()>;

    /// Human-readable status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backup` if the underlying tool fails.
    fn status(&self) -> AppResult<String>;
}

/// Backup that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBackup;

impl VersionControl for NoBackup {
    fn name(&self) -> &'static str {
        "none"
    }

    fn commit(&self, _message: &str) -> AppResult<()> {
        debug!("Version-control backup not configured, skipping commit");
        Ok(())
    }

    fn push(&self) -> AppResult<()> {
        debug!("Version-control backup not configured, skipping push");
        Ok(())
    }

    fn status(&self) -> AppResult<String> {
        Ok("Version-control backup is not configured.".to_string())
    }
}

/// Backup through a git repository in the content directory.
///
/// The repository is created on first commit.
#[derive(Debug, Clone)]
pub struct GitBackup {
    repo_dir: PathBuf,
    program: String,
}

impl GitBackup {
    /// Uses `git` from `PATH` in `repo_dir`.
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self::with_program(repo_dir, "git")
    }

    /// Uses a specific git executable.
    pub fn with_program(repo_dir: impl Into<PathBuf>, program: impl Into<String>) -> Self {
        GitBackup {
            repo_dir: repo_dir.into(),
            program: program.into(),
        }
    }

    /// The repository directory.
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Initializes the repository if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Backup` if `git init` fails.
    pub fn init(&self) -> AppResult<()> {
        if self.repo_dir.join(".git").exists() {
            return Ok(());
        }
        self.run(&["init", "--quiet"])?;

        let ignore = self.repo_dir.join(".gitignore");
        if !ignore.exists() {
            fs::write(
                &ignore,
                format!(
                    "{}\n{}*\n",
                    constants::LOCK_FILE_NAME,
                    constants::TEMP_FILE_PREFIX
                ),
            )?;
        }
        info!("Initialized backup repository");
        Ok(())
    }

    fn run(&self, args: &[&str]) -> AppResult<String> {
        let command = format!("{} {}", self.program, args.join(" "));
        debug!("Running {}", command);

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .map_err(|source| {
                if source.kind() == io::ErrorKind::NotFound {
                    BackupError::CommandNotFound {
                        command: command.clone(),
                        source,
                    }
                } else {
                    BackupError::ExecutionFailed {
                        command: command.clone(),
                        source,
                    }
                }
            })?;

        if !output.status.success() {
            return Err(BackupError::NonZeroExit {
                command,
                status_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl VersionControl for GitBackup {
    fn name(&self) -> &'static str {
        "git"
    }

    fn commit(&self, message: &str) -> AppResult<()> {
        self.init()?;
        self.run(&["add", "--all"])?;

        if self.run(&["status", "--porcelain"])?.trim().is_empty() {
            debug!("Nothing to commit");
            return Ok(());
        }
        self.run(&["commit", "--quiet", "-m", message])?;
        info!("Committed journal changes");
        Ok(())
    }

    fn push(&self) -> AppResult<()> {
        self.run(&["push", "--quiet"])?;
        info!("Pushed journal backup");
        Ok(())
    }

    fn status(&self) -> AppResult<String> {
        if !self.repo_dir.join(".git").exists() {
            return Ok("No backup repository yet; it is created on the first backup.".to_string());
        }
        self.run(&["status", "--short", "--branch"])
    }
}
