//! Viewing one period file.
//!
//! Viewing never writes. With a key, encrypted entries are opened on an
//! in-memory copy; the file's BLAKE3 checksum is taken before and after so
//! a changed file shows up in the logs.

use super::JournalContext;
use crate::crypto::EncryptionGate;
use crate::errors::AppResult;
use crate::journal_core::{parse_entries, PeriodKey};
use age::secrecy::SecretString;
use tracing::{debug, warn};

/// A rendered period file.
#[derive(Debug, Clone)]
pub struct ViewOutcome {
    /// The period shown.
    pub period: PeriodKey,
    /// Text to display.
    pub text: String,
    /// Encrypted entries opened.
    pub decrypted: usize,
    /// Encrypted entries shown as a placeholder.
    pub failed: usize,
    /// Encrypted entries left sealed because no key was given.
    pub sealed: usize,
    /// Parse problems in the file.
    pub warnings: Vec<String>,
}

/// Parses a period key typed by the user for the configured granularity.
///
/// # Errors
///
/// Returns `AppError::Journal` if `input` is not a valid key.
pub fn resolve_period(ctx: &JournalContext<'_>, input: &str) -> AppResult<PeriodKey> {
    PeriodKey::parse(ctx.store.granularity(), input.trim())
}

/// Renders `period` for display, opening encrypted entries with `key`.
///
/// # Errors
///
/// - `StoreError::PeriodNotFound` if there is no file for the period
/// - `StoreError::ReadFailed` if it cannot be read
pub fn view_period(
    ctx: &JournalContext<'_>,
    period: &PeriodKey,
    key: Option<&SecretString>,
) -> AppResult<ViewOutcome> {
    let before = ctx.store.checksum(period)?;
    let raw = ctx.store.load_raw(period)?;

    let outcome = match key {
        Some(key) => {
            let view = EncryptionGate::new(ctx.cipher.as_ref()).decrypt_for_view(&raw, key);
            ViewOutcome {
                period: *period,
                text: view.text,
                decrypted: view.decrypted,
                failed: view.failed,
                sealed: 0,
                warnings: view.warnings.iter().map(ToString::to_string).collect(),
            }
        }
        None => {
            let parsed = parse_entries(&raw);
            ViewOutcome {
                period: *period,
                sealed: parsed.encrypted_count(),
                text: raw,
                decrypted: 0,
                failed: 0,
                warnings: parsed.warnings.iter().map(ToString::to_string).collect(),
            }
        }
    };

    let after = ctx.store.checksum(period)?;
    if before == after {
        debug!("Viewed {} (checksum {})", period, after);
    } else {
        warn!("Period file {} changed while it was being viewed", period);
    }
    Ok(outcome)
}
