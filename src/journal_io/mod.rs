//! Journal I/O operations and file management.
//!
//! This module contains the `Store`: every filesystem operation on the
//! content directory goes through it. It appends serialized entry blocks to
//! period files, lists the period files present and loads their raw text.
//!
//! Appends never modify a period file in place. The new content is written to
//! a temporary file in the same directory, synced, and renamed over the
//! period file, so a failed or interrupted append leaves the previous file
//! intact. An advisory lock on `.devjournal.lock` serializes appends between
//! processes; it does not guard readers.

use crate::config::Config;
use crate::constants;
use crate::errors::{AppError, AppResult, LockError, StoreError};
use crate::journal_core::format;
use crate::journal_core::{EntryRecord, PeriodGranularity, PeriodKey};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Ensures the journal directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns:
/// - `AppError::Journal` if the provided path is not an absolute path
/// - `AppError::Io` if the directory creation fails
pub fn ensure_journal_directory_exists(journal_dir: &Path) -> AppResult<()> {
    if !journal_dir.is_absolute() {
        return Err(AppError::Journal(format!(
            "Journal directory path must be absolute: {}",
            journal_dir.display()
        )));
    }

    if !journal_dir.exists() {
        fs::create_dir_all(journal_dir).map_err(|e| {
            AppError::Io(io::Error::new(
                e.kind(),
                format!("Failed to create journal directory: {}", e),
            ))
        })?;

        #[cfg(unix)]
        {
            let permissions = fs::Permissions::from_mode(constants::DEFAULT_DIR_PERMISSIONS);
            fs::set_permissions(journal_dir, permissions).map_err(|e| {
                AppError::Io(io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to set secure permissions on journal directory: {}",
                        e
                    ),
                ))
            })?;
            debug!("Set 0o700 permissions on journal directory");
        }
    }
    Ok(())
}

/// File-per-period storage rooted at the content directory.
///
/// # Examples
///
/// ```no_run
/// use devjournal::journal_io::Store;
/// use devjournal::journal_core::{EntryKind, EntryRecord, PeriodGranularity, PeriodKey};
/// use chrono::Local;
///
/// let store = Store::new("/home/me/devjournal", PeriodGranularity::Day);
/// let now = Local::now().naive_local();
/// let mut record = EntryRecord::new(EntryKind::CodingSession, now);
/// record.set_field("Worked on", "Store tests")?;
///
/// let period = PeriodKey::for_datetime(PeriodGranularity::Day, &now);
/// let path = store.append(&period, &record)?;
/// println!("Saved to {}", path.display());
/// # Ok::<(), devjournal::AppError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
    granularity: PeriodGranularity,
}

impl Store {
    /// Creates a store over `dir`. The directory is not created here.
    pub fn new(dir: impl Into<PathBuf>, granularity: PeriodGranularity) -> Self {
        Store {
            dir: dir.into(),
            granularity,
        }
    }

    /// Creates a store from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.journal_dir.clone(), config.period)
    }

    /// The content directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The period granularity used for file names.
    pub fn granularity(&self) -> PeriodGranularity {
        self.granularity
    }

    /// Path of a period file, whether or not it exists.
    pub fn path_for(&self, period: &PeriodKey) -> PathBuf {
        self.dir.join(period.file_name())
    }

    /// Serializes `record` and appends it to the period file.
    ///
    /// # Errors
    ///
    /// See [`Store::append_block`].
    pub fn append(&self, period: &PeriodKey, record: &EntryRecord) -> AppResult<PathBuf> {
        self.append_block(period, &format::serialize(record))
    }

    /// Appends an already serialized block (plain or encrypted).
    ///
    /// Creates the period file with its title line on first use. On any
    /// failure the period file is exactly as it was before the call.
    ///
    /// # Errors
    ///
    /// - `AppError::Journal` if `block` does not parse as exactly one entry
    /// - `AppError::Lock` if another process is appending
    /// - `AppError::Store` for read or write failures, carrying the path
    pub fn append_block(&self, period: &PeriodKey, block: &str) -> AppResult<PathBuf> {
        validate_block(block)?;

        if !self.dir.is_dir() {
            return Err(StoreError::InvalidDirectory {
                path: self.dir.clone(),
            }
            .into());
        }

        let _lock = JournalLock::acquire(&self.dir)?;
        let path = self.path_for(period);

        let existing = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(source) => return Err(StoreError::ReadFailed { path, source }.into()),
        };

        let mut content = if existing.is_empty() {
            debug!("Starting new period file {}", period);
            format::title_block(period)
        } else {
            existing
        };
        if !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(block);

        write_atomically(&self.dir, &path, |file| file.write_all(content.as_bytes()))?;
        info!("Appended entry to period {}", period);
        Ok(path)
    }

    /// Period keys of every period file, most recent first.
    ///
    /// Files that do not match the configured naming pattern are ignored. A
    /// missing content directory has no periods.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ReadFailed` if the directory cannot be listed.
    pub fn list_periods(&self) -> AppResult<Vec<PeriodKey>> {
        if !self.dir.exists() {
            debug!("Journal directory does not exist yet");
            return Ok(Vec::new());
        }

        let mut periods = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| StoreError::ReadFailed {
                path: self.dir.clone(),
                source: io::Error::from(e),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(key) = self.period_for_path(entry.path()) {
                periods.push(key);
            }
        }

        periods.sort_unstable_by(|a, b| b.cmp(a));
        debug!("Found {} period files", periods.len());
        Ok(periods)
    }

    /// Full text of a period file.
    ///
    /// # Errors
    ///
    /// - `StoreError::PeriodNotFound` if the file does not exist
    /// - `StoreError::ReadFailed` for other read failures
    pub fn load_raw(&self, period: &PeriodKey) -> AppResult<String> {
        let path = self.path_for(period);
        fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::PeriodNotFound {
                    period: period.stem(),
                }
            } else {
                StoreError::ReadFailed { path, source }
            }
            .into()
        })
    }

    /// BLAKE3 fingerprint of a period file's bytes.
    ///
    /// # Errors
    ///
    /// Same as [`Store::load_raw`].
    pub fn checksum(&self, period: &PeriodKey) -> AppResult<String> {
        let path = self.path_for(period);
        let bytes = fs::read(&path).map_err(|source| -> AppError {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::PeriodNotFound {
                    period: period.stem(),
                }
                .into()
            } else {
                StoreError::ReadFailed { path, source }.into()
            }
        })?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }

    fn period_for_path(&self, path: &Path) -> Option<PeriodKey> {
        if path.extension().and_then(|e| e.to_str()) != Some(constants::JOURNAL_FILE_EXTENSION) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        PeriodKey::parse(self.granularity, stem).ok()
    }
}

/// Rejects blocks that would not read back as exactly one closed entry.
fn validate_block(block: &str) -> AppResult<()> {
    let parsed = format::parse_entries(block);
    let well_formed = parsed.preamble.is_empty()
        && parsed.entry_count() == 1
        && parsed.warnings.is_empty()
        && parsed.blocks[0].terminated
        && block.ends_with('\n');

    if !well_formed {
        warn!("Refusing to append a malformed entry block");
        return Err(AppError::Journal(
            "Refusing to append a malformed entry block".to_string(),
        ));
    }
    Ok(())
}

/// Writes `target` by filling a temporary file in `dir` and renaming it into place.
///
/// The temporary file is removed if `fill` or any later step fails.
pub(crate) fn write_atomically<F>(dir: &Path, target: &Path, fill: F) -> AppResult<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let write_failed = |source: io::Error| -> AppError {
        StoreError::WriteFailed {
            path: target.to_path_buf(),
            source,
        }
        .into()
    };

    let mut temp = tempfile::Builder::new()
        .prefix(constants::TEMP_FILE_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_failed)?;

    #[cfg(unix)]
    temp.as_file()
        .set_permissions(fs::Permissions::from_mode(
            constants::DEFAULT_FILE_PERMISSIONS,
        ))
        .map_err(write_failed)?;

    fill(temp.as_file_mut()).map_err(write_failed)?;
    temp.as_file().sync_all().map_err(write_failed)?;
    temp.persist(target).map_err(|e| write_failed(e.error))?;
    Ok(())
}

/// Exclusive advisory lock held for the duration of an append.
struct JournalLock {
    file: File,
}

impl JournalLock {
    fn acquire(dir: &Path) -> AppResult<Self> {
        let path = dir.join(constants::LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| LockError::AcquisitionFailed {
                path: path.clone(),
                source,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!("Acquired journal lock");
                Ok(JournalLock { file })
            }
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.raw_os_error() == fs2::lock_contended_error().raw_os_error() =>
            {
                Err(LockError::FileBusy { path }.into())
            }
            Err(source) => Err(LockError::AcquisitionFailed { path, source }.into()),
        }
    }
}

impl Drop for JournalLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to release journal lock: {}", e);
        }
    }
}
