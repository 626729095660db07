//! Error handling utilities for the devjournal application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! Non-fatal conditions (a malformed block inside a period file, a failed
//! decryption while viewing) are not errors: they travel as warnings inside
//! the result of the operation that met them.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents errors raised by the period-file store.
///
/// Every variant that comes from the filesystem carries the offending path so
/// the caller can report exactly which file failed.
///
/// # Examples
///
/// ```
/// use devjournal::errors::StoreError;
///
/// let error = StoreError::PeriodNotFound { period: "01-05-2025".to_string() };
/// assert!(format!("{}", error).contains("01-05-2025"));
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested period file does not exist.
    #[error("No entries found for period {period}")]
    PeriodNotFound {
        /// The period key that was requested
        period: String,
    },

    /// Reading a period file or listing the content directory failed.
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        /// The path that could not be read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Writing a period file failed. The file is left as it was.
    #[error("Failed to write {path}: {source}. The existing file was left unchanged.")]
    WriteFailed {
        /// The path that could not be written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The content directory is missing or not a directory.
    #[error("Journal directory is not usable: {path}")]
    InvalidDirectory {
        /// The configured content directory
        path: PathBuf,
    },
}

/// Represents errors that can occur when attempting to lock the journal.
///
/// # Examples
///
/// ```
/// use devjournal::errors::LockError;
/// use std::path::PathBuf;
///
/// let error = LockError::FileBusy {
///     path: PathBuf::from("/path/to/journal/.devjournal.lock"),
/// };
///
/// assert!(format!("{}", error).contains("another process"));
/// ```
#[derive(Debug, Error)]
pub enum LockError {
    /// Error when the journal is already locked by another process.
    #[error("Journal is currently being written by another process: {path}. Please wait for the other devjournal command to finish.")]
    FileBusy {
        /// The path to the lock file
        path: PathBuf,
    },

    /// Error when acquiring the lock fails for a technical reason.
    #[error("Failed to acquire journal lock {path}: {source}. Please check file permissions and ensure the directory is accessible.")]
    AcquisitionFailed {
        /// The path to the lock file that couldn't be locked
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Represents specific error cases that can occur during cryptographic operations.
///
/// # Examples
///
/// ```
/// use devjournal::errors::CryptoError;
///
/// let error = CryptoError::Unavailable("no cipher configured".to_string());
/// assert!(format!("{}", error).contains("unavailable"));
/// ```
#[derive(Debug, Error)]
pub enum CryptoError {
    /// No usable cipher is configured, or no passphrase was supplied.
    #[error("Encryption is unavailable: {0}")]
    Unavailable(String),

    /// Incorrect passphrase provided for decryption.
    #[error("Incorrect passphrase. Please try again with the passphrase used to encrypt the entry.")]
    InvalidPassphrase,

    /// The ciphertext is not in a format the cipher understands.
    #[error("Unsupported encryption format")]
    UnsupportedFormat,

    /// Error during encryption operation.
    #[error("Encryption failed: {0}")]
    EncryptionFailed(#[source] age::EncryptError),

    /// Error during decryption operation.
    #[error("Decryption failed: {0}")]
    DecryptionFailed(#[source] age::DecryptError),

    /// Error while reading or writing the armored ciphertext stream.
    #[error("Ciphertext stream error: {0}")]
    Armor(#[source] io::Error),

    /// Decrypted bytes were not valid UTF-8 text.
    #[error("Decrypted entry is not valid text")]
    InvalidText,

    /// The user entered an empty passphrase.
    #[error("Passphrase cannot be empty")]
    EmptyPassphrase,

    /// The passphrase and its confirmation differ.
    #[error("Passphrases do not match")]
    PassphraseMismatch,

    /// Reading the passphrase from the terminal failed.
    #[error("Failed to read passphrase: {0}")]
    PassphrasePrompt(String),
}

/// Represents errors raised by the version-control backup collaborator.
///
/// # Examples
///
/// ```
/// use devjournal::errors::BackupError;
///
/// let error = BackupError::NonZeroExit {
///     command: "git commit".to_string(),
///     status_code: 1,
///     stderr: "nothing to commit".to_string(),
/// };
/// assert!(format!("{}", error).contains("git commit"));
/// ```
#[derive(Debug, Error)]
pub enum BackupError {
    /// The version-control tool is not installed.
    #[error("Backup command '{command}' not found: {source}. Please check that git is installed and available in your PATH.")]
    CommandNotFound {
        /// The command that was not found
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The version-control tool could not be started.
    #[error("Failed to execute backup command '{command}': {source}")]
    ExecutionFailed {
        /// The command that failed to execute
        command: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The version-control tool exited with a non-zero status code.
    #[error("Backup command '{command}' exited with status {status_code}: {stderr}")]
    NonZeroExit {
        /// The command that failed
        command: String,
        /// The exit status code
        status_code: i32,
        /// Captured standard error
        stderr: String,
    },
}

/// Represents all possible errors that can occur in the devjournal application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use devjournal::errors::AppError;
///
/// let error = AppError::Config("Missing journal directory".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Missing journal directory");
/// ```
///
/// Converting from an IO error:
/// ```
/// use devjournal::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors not tied to a specific period file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors in journal entry logic (unknown field labels, invalid period keys).
    #[error("Journal logic error: {0}")]
    Journal(String),

    /// Errors from the period-file store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Errors related to the append lock.
    #[error("File locking error: {0}")]
    Lock(#[from] LockError),

    /// Errors related to cryptographic operations.
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    /// Errors from the version-control backup collaborator.
    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),
}

impl AppError {
    /// Returns true for the informational "nothing stored for this period" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Store(StoreError::PeriodNotFound { .. }))
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use devjournal::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Journal("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
