//! Appending a new entry.

use super::JournalContext;
use crate::crypto::{EncryptionGate, SealedBlock};
use crate::errors::{AppError, AppResult};
use crate::journal_core::{format, EntryKind, EntryRecord, PeriodKey};
use age::secrecy::SecretString;
use std::path::PathBuf;
use tracing::{info, warn};

/// The answers collected for a new entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    /// Entry kind.
    pub kind: EntryKind,
    /// Free-text session length.
    pub duration: Option<String>,
    /// `(label, text)` pairs; labels must belong to `kind`.
    pub fields: Vec<(String, String)>,
}

impl EntryDraft {
    /// An empty draft of `kind`.
    pub fn new(kind: EntryKind) -> Self {
        EntryDraft {
            kind,
            duration: None,
            fields: Vec::new(),
        }
    }

    /// Adds a field answer.
    pub fn field(mut self, label: &str, text: &str) -> Self {
        self.fields.push((label.to_string(), text.to_string()));
        self
    }

    /// Sets the duration.
    pub fn duration(mut self, duration: &str) -> Self {
        self.duration = Some(duration.to_string());
        self
    }
}

/// Result of a successful append.
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    /// The period file written.
    pub path: PathBuf,
    /// The period the entry was filed under.
    pub period: PeriodKey,
    /// Whether the entry body was stored encrypted.
    pub encrypted: bool,
    /// Non-fatal problems: encryption fallback, failed auto-commit.
    pub warnings: Vec<String>,
}

/// Builds an entry from `draft`, stamps it with the clock, and appends it.
///
/// Encryption is attempted when `encrypt_requested` or `auto_encrypt` is
/// set. If it cannot be done the entry is stored in plaintext and the
/// outcome carries a warning.
///
/// # Errors
///
/// - `AppError::Journal` for a field label not belonging to the kind, or a
///   draft with no content
/// - Store and lock errors from the append itself
pub fn append_entry(
    ctx: &JournalContext<'_>,
    draft: &EntryDraft,
    encrypt_requested: bool,
    key: Option<&SecretString>,
) -> AppResult<AppendOutcome> {
    let record = build_record(ctx, draft)?;
    let period = PeriodKey::for_datetime(ctx.config.period, &record.timestamp());
    let mut warnings = Vec::new();

    let sealed = if encrypt_requested || ctx.config.auto_encrypt {
        EncryptionGate::new(ctx.cipher.as_ref()).seal(&record, key)
    } else {
        SealedBlock {
            block: format::serialize(&record),
            encrypted: false,
            warning: None,
        }
    };
    warnings.extend(sealed.warning);

    let path = ctx.store.append_block(&period, &sealed.block)?;
    info!(
        "Saved {} entry for {} (encrypted: {})",
        record.kind(),
        period,
        sealed.encrypted
    );

    if ctx.config.auto_commit {
        let message = format!(
            "{} entry for {}",
            record.kind(),
            record.timestamp().format(crate::constants::ENTRY_TIMESTAMP_FORMAT)
        );
        if let Err(e) = ctx.version_control.commit(&message) {
            warn!("Auto-commit failed: {}", e);
            warnings.push(format!("Entry saved but not committed: {}", e));
        }
    }

    Ok(AppendOutcome {
        path,
        period,
        encrypted: sealed.encrypted,
        warnings,
    })
}

fn build_record(ctx: &JournalContext<'_>, draft: &EntryDraft) -> AppResult<EntryRecord> {
    let mut record = EntryRecord::new(draft.kind, ctx.clock.now());
    if let Some(duration) = &draft.duration {
        record = record.with_duration(duration.as_str());
    }
    for (label, text) in &draft.fields {
        record.set_field(label, text)?;
    }

    let has_content = record.duration().is_some()
        || record.fields().iter().any(|f| !f.text.trim().is_empty());
    if !has_content {
        return Err(AppError::Journal(
            "Entry is empty: fill in at least one field".to_string(),
        ));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::crypto::gate::tests::HexCipher;
    use crate::crypto::NoCipher;
    use crate::errors::BackupError;
    use crate::journal_core::{parse_entries, FixedClock, PeriodGranularity};
    use crate::ops::VersionControl;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    fn may_first(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn config_for(dir: &std::path::Path) -> Config {
        Config {
            journal_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    fn setup_draft() -> EntryDraft {
        EntryDraft::new(EntryKind::CodingSession)
            .duration("1h 30m")
            .field("Worked on", "Setup")
    }

    #[derive(Clone, Default)]
    struct RecordingBackup {
        messages: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl VersionControl for RecordingBackup {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn commit(&self, message: &str) -> AppResult<()> {
            if self.fail {
                return Err(BackupError::NonZeroExit {
                    command: "git commit".to_string(),
                    status_code: 128,
                    stderr: "not a git repository".to_string(),
                }
                .into());
            }
            self.messages.borrow_mut().push(message.to_string());
            Ok(())
        }

        fn push(&self) -> AppResult<()> {
            Ok(())
        }

        fn status(&self) -> AppResult<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_append_entry_files_under_clock_period() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let config = config_for(temp_dir.path());
        let ctx = JournalContext::new(&config)
            .with_clock(Box::new(FixedClock(may_first(14, 30))));

        let outcome = append_entry(&ctx, &setup_draft(), false, None).expect("append");

        assert_eq!(outcome.path, temp_dir.path().join("01-05-2025.md"));
        assert_eq!(outcome.period.stem(), "01-05-2025");
        assert!(!outcome.encrypted);
        assert!(outcome.warnings.is_empty());

        let parsed = parse_entries(&ctx.store.load_raw(&outcome.period).unwrap());
        let record = parsed.blocks[0].to_record().unwrap();
        assert_eq!(record.timestamp(), may_first(14, 30));
        assert_eq!(record.duration(), Some("1h 30m"));
        assert_eq!(record.field("Worked on"), Some("Setup"));
    }

    #[test]
    fn test_month_granularity_groups_days() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let config = Config {
            period: PeriodGranularity::Month,
            ..config_for(temp_dir.path())
        };
        let ctx = JournalContext::new(&config)
            .with_clock(Box::new(FixedClock(may_first(9, 0))));

        let outcome = append_entry(&ctx, &setup_draft(), false, None).unwrap();
        assert_eq!(outcome.path, temp_dir.path().join("2025-05.md"));
    }

    #[test]
    fn test_encryption_requested_without_cipher_falls_back() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let config = config_for(temp_dir.path());
        let ctx = JournalContext::new(&config)
            .with_cipher(Box::new(NoCipher))
            .with_clock(Box::new(FixedClock(may_first(9, 0))));
        let key = SecretString::new("k".to_string());

        let outcome = append_entry(&ctx, &setup_draft(), true, Some(&key)).unwrap();

        assert!(!outcome.encrypted);
        assert_eq!(outcome.warnings.len(), 1);
        let content = ctx.store.load_raw(&outcome.period).unwrap();
        assert!(content.contains("Setup"));
    }

    #[test]
    fn test_auto_encrypt_seals_entry() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let config = Config {
            auto_encrypt: true,
            ..config_for(temp_dir.path())
        };
        let ctx = JournalContext::new(&config)
            .with_cipher(Box::new(HexCipher))
            .with_clock(Box::new(FixedClock(may_first(9, 0))));
        let key = SecretString::new("k".to_string());

        let outcome = append_entry(&ctx, &setup_draft(), false, Some(&key)).unwrap();

        assert!(outcome.encrypted);
        let parsed = parse_entries(&ctx.store.load_raw(&outcome.period).unwrap());
        assert_eq!(parsed.encrypted_count(), 1);
    }

    #[test]
    fn test_invalid_drafts_rejected_before_writing() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let config = config_for(temp_dir.path());
        let ctx = JournalContext::new(&config)
            .with_clock(Box::new(FixedClock(may_first(9, 0))));

        let empty = EntryDraft::new(EntryKind::PersonalReflection).field("Mood", "  ");
        assert!(matches!(
            append_entry(&ctx, &empty, false, None),
            Err(AppError::Journal(_))
        ));

        let foreign = EntryDraft::new(EntryKind::PersonalReflection).field("Worked on", "x");
        assert!(matches!(
            append_entry(&ctx, &foreign, false, None),
            Err(AppError::Journal(_))
        ));
        assert!(ctx.store.list_periods().unwrap().is_empty());
    }

    #[test]
    fn test_auto_commit_runs_after_append() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let config = Config {
            auto_commit: true,
            ..config_for(temp_dir.path())
        };
        let backup = RecordingBackup::default();
        let ctx = JournalContext::new(&config)
            .with_clock(Box::new(FixedClock(may_first(14, 30))))
            .with_version_control(Box::new(backup.clone()));

        append_entry(&ctx, &setup_draft(), false, None).unwrap();

        assert_eq!(
            *backup.messages.borrow(),
            vec!["Coding Session entry for 01-05-2025 14:30".to_string()]
        );
    }

    #[test]
    fn test_failed_commit_is_a_warning() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let config = Config {
            auto_commit: true,
            ..config_for(temp_dir.path())
        };
        let ctx = JournalContext::new(&config)
            .with_clock(Box::new(FixedClock(may_first(9, 0))))
            .with_version_control(Box::new(RecordingBackup {
                fail: true,
                ..RecordingBackup::default()
            }));

        let outcome = append_entry(&ctx, &setup_draft(), false, None).expect("append survives");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("not committed"));
        assert_eq!(ctx.store.list_periods().unwrap().len(), 1);
    }
}
