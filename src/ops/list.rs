//! Listing period files with entry counts.

use super::{collect_parse_warnings, load_all_periods, JournalContext};
use crate::errors::AppResult;
use crate::journal_core::{parse_entries, PeriodKey};
use serde::Serialize;
use tracing::debug;

/// One period file in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    /// The period key, also the filename stem.
    pub key: PeriodKey,
    /// Human-readable period label.
    pub display_label: String,
    /// Entries in the file.
    pub entry_count: usize,
    /// How many of those are encrypted.
    pub encrypted_count: usize,
}

/// Result of [`list_periods`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListReport {
    /// Period files, most recent first.
    pub periods: Vec<PeriodSummary>,
    /// Unreadable files and parse problems.
    pub warnings: Vec<String>,
}

/// Summarizes every period file, most recent first.
///
/// # Errors
///
/// Fails only if the content directory itself cannot be listed.
pub fn list_periods(ctx: &JournalContext<'_>) -> AppResult<ListReport> {
    let (loaded, mut warnings) = load_all_periods(ctx)?;

    let periods = loaded
        .into_iter()
        .map(|period| {
            let parsed = parse_entries(&period.text);
            collect_parse_warnings(&period.key, &parsed.warnings, &mut warnings);
            PeriodSummary {
                display_label: period.key.display_label(),
                entry_count: parsed.entry_count(),
                encrypted_count: parsed.encrypted_count(),
                key: period.key,
            }
        })
        .collect::<Vec<_>>();

    debug!("Listed {} periods", periods.len());
    Ok(ListReport { periods, warnings })
}
