//! High-level journal operations.
//!
//! This module provides the user-facing operations that orchestrate the
//! core: appending entries, listing periods, viewing a period with optional
//! decryption, searching, statistics, and version-control backup. Each
//! operation takes a [`JournalContext`] holding the configuration and the
//! injected collaborators.

pub mod append;
pub mod backup;
pub mod list;
pub mod search;
pub mod stats;
pub mod view;

use crate::config::Config;
use crate::crypto::{AgeCipher, Cipher};
use crate::errors::AppResult;
use crate::journal_core::{Clock, ParseWarning, PeriodKey, SystemClock};
use crate::journal_io::Store;
use tracing::warn;

// Re-export commonly used functions
pub use append::{append_entry, AppendOutcome, EntryDraft};
pub use backup::{GitBackup, NoBackup, VersionControl};
pub use list::{list_periods, ListReport, PeriodSummary};
pub use search::{search, SearchHit, SearchReport, SearchStatus};
pub use stats::{stats, StatsStatus, StatsSummary};
pub use view::{resolve_period, view_period, ViewOutcome};

/// Configuration and collaborators shared by every operation.
///
/// Defaults are the real implementations, except version control, which
/// is only wired up when `auto_commit` is set.
///
/// # Examples
///
/// ```no_run
/// use devjournal::config::Config;
/// use devjournal::ops::{self, JournalContext};
///
/// let config = Config::load()?;
/// let ctx = JournalContext::new(&config);
/// let summary = ops::stats(&ctx)?;
/// println!("{} entries", summary.total_entries);
/// # Ok::<(), devjournal::AppError>(())
/// ```
pub struct JournalContext<'a> {
    /// The loaded configuration.
    pub config: &'a Config,
    /// Period-file storage under the configured directory.
    pub store: Store,
    /// Cipher used to seal and open entries.
    pub cipher: Box<dyn Cipher>,
    /// Source of entry timestamps.
    pub clock: Box<dyn Clock>,
    /// Collaborator called after each append when auto-commit is on.
    pub version_control: Box<dyn VersionControl>,
}

impl<'a> JournalContext<'a> {
    /// Builds a context with the default collaborators.
    pub fn new(config: &'a Config) -> Self {
        let version_control: Box<dyn VersionControl> = if config.auto_commit {
            Box::new(GitBackup::new(config.journal_dir.clone()))
        } else {
            Box::new(NoBackup)
        };

        JournalContext {
            config,
            store: Store::from_config(config),
            cipher: Box::new(AgeCipher),
            clock: Box::new(SystemClock),
            version_control,
        }
    }

    /// Replaces the cipher.
    pub fn with_cipher(mut self, cipher: Box<dyn Cipher>) -> Self {
        self.cipher = cipher;
        self
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the version-control collaborator.
    pub fn with_version_control(mut self, version_control: Box<dyn VersionControl>) -> Self {
        self.version_control = version_control;
        self
    }
}

/// A period file read during a multi-file scan.
pub(crate) struct LoadedPeriod {
    pub key: PeriodKey,
    pub text: String,
}

/// Loads every period file, most recent first.
///
/// A file that cannot be read is skipped and reported in the returned
/// warnings; it does not abort the scan.
pub(crate) fn load_all_periods(
    ctx: &JournalContext<'_>,
) -> AppResult<(Vec<LoadedPeriod>, Vec<String>)> {
    let mut loaded = Vec::new();
    let mut warnings = Vec::new();

    for key in ctx.store.list_periods()? {
        match ctx.store.load_raw(&key) {
            Ok(text) => loaded.push(LoadedPeriod { key, text }),
            Err(e) => {
                warn!("Skipping period {}: {}", key, e);
                warnings.push(format!("{}: skipped: {}", key, e));
            }
        }
    }
    Ok((loaded, warnings))
}

/// Logs parse warnings for one file and adds them to `warnings`.
pub(crate) fn collect_parse_warnings(
    key: &PeriodKey,
    parse_warnings: &[ParseWarning],
    warnings: &mut Vec<String>,
) {
    for warning in parse_warnings {
        warn!("{}: {}", key, warning);
        warnings.push(format!("{}: {}", key, warning));
    }
}
