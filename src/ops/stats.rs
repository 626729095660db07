//! Entry statistics across all period files.
//!
//! Entries are counted with the same parser that search and view use, so
//! every operation agrees on what an entry is.

use super::{collect_parse_warnings, load_all_periods, JournalContext};
use crate::errors::AppResult;
use crate::journal_core::{parse_entries, PeriodKey};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Whether there was anything to count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsStatus {
    /// At least one entry was counted.
    Ok,
    /// The store holds no entries.
    NoEntries,
}

/// Aggregate counts over the whole store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    /// Whether there was anything to count.
    pub status: StatsStatus,
    /// Entries across all period files.
    pub total_entries: usize,
    /// Entries per period file, in calendar order.
    pub entries_by_period: BTreeMap<PeriodKey, usize>,
    /// Period with the most entries; the most recent one wins a tie.
    pub most_active_period: Option<PeriodKey>,
    /// Entries in the most active period.
    pub most_active_count: usize,
    /// Earliest period with a file.
    pub oldest_period: Option<PeriodKey>,
    /// Latest period with a file.
    pub newest_period: Option<PeriodKey>,
    /// Entries per period file, rounded to nearest.
    pub average_per_period: usize,
    /// Unreadable files and parse problems.
    pub warnings: Vec<String>,
}

/// Counts entries in every period file.
///
/// An empty content directory is not an error: the summary has
/// `StatsStatus::NoEntries` and zero totals.
///
/// # Errors
///
/// Fails only if the content directory itself cannot be listed.
pub fn stats(ctx: &JournalContext<'_>) -> AppResult<StatsSummary> {
    let (loaded, mut warnings) = load_all_periods(ctx)?;

    let mut entries_by_period = BTreeMap::new();
    for period in &loaded {
        let parsed = parse_entries(&period.text);
        collect_parse_warnings(&period.key, &parsed.warnings, &mut warnings);
        entries_by_period.insert(period.key, parsed.entry_count());
    }

    let summary = summarize(entries_by_period, warnings);
    debug!(
        "Counted {} entries in {} periods",
        summary.total_entries,
        summary.entries_by_period.len()
    );
    Ok(summary)
}

fn summarize(entries_by_period: BTreeMap<PeriodKey, usize>, warnings: Vec<String>) -> StatsSummary {
    let total_entries: usize = entries_by_period.values().sum();
    let periods = entries_by_period.len();

    // Reverse calendar order, so a strict comparison keeps the latest of equals.
    let most_active = entries_by_period
        .iter()
        .rev()
        .fold(None, |best: Option<(&PeriodKey, usize)>, (key, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((key, count)),
        });

    let average_per_period = if periods == 0 {
        0
    } else {
        (total_entries + periods / 2) / periods
    };

    StatsSummary {
        status: if total_entries == 0 {
            StatsStatus::NoEntries
        } else {
            StatsStatus::Ok
        },
        total_entries,
        most_active_period: most_active.map(|(key, _)| *key),
        most_active_count: most_active.map_or(0, |(_, count)| count),
        oldest_period: entries_by_period.keys().next().copied(),
        newest_period: entries_by_period.keys().next_back().copied(),
        average_per_period,
        entries_by_period,
        warnings,
    }
}
