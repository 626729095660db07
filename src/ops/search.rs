//! Case-insensitive search across all period files.
//!
//! Matching is a plain substring test on raw lines after folding case on
//! both sides. A period file holding any encrypted entry is not searched at
//! all, so results never differ depending on what is hidden.

use super::{collect_parse_warnings, load_all_periods, JournalContext};
use crate::errors::{AppError, AppResult};
use crate::journal_core::{parse_entries, PeriodKey};
use serde::Serialize;
use tracing::{debug, info};

/// Whether anything matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// At least one hit.
    Matches,
    /// No line matched in any searched file.
    NoMatches,
}

/// One matching line with its own context window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// The period file the line is in.
    pub period: PeriodKey,
    /// 1-based line number within the file.
    pub line_number: usize,
    /// The matching line.
    pub line: String,
    /// Up to `context_lines` lines before the match.
    pub context_before: Vec<String>,
    /// Up to `context_lines` lines after the match.
    pub context_after: Vec<String>,
}

/// Result of [`search`].
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    /// The term searched for, as given.
    pub term: String,
    /// Whether anything matched.
    pub status: SearchStatus,
    /// Hits, most recent period first, in line order within a file.
    pub hits: Vec<SearchHit>,
    /// Periods not searched because they contain encrypted entries.
    pub skipped_encrypted: Vec<PeriodKey>,
    /// Unreadable files and parse problems.
    pub warnings: Vec<String>,
}

/// Folds case for comparison.
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Searches every period file for `term`.
///
/// # Errors
///
/// - `AppError::Journal` for an empty or blank term
/// - Store errors if the content directory cannot be listed
pub fn search(ctx: &JournalContext<'_>, term: &str) -> AppResult<SearchReport> {
    if term.trim().is_empty() {
        return Err(AppError::Journal("Search term cannot be empty".to_string()));
    }
    let needle = fold_case(term);
    let (loaded, mut warnings) = load_all_periods(ctx)?;

    let mut hits = Vec::new();
    let mut skipped_encrypted = Vec::new();
    for period in &loaded {
        let parsed = parse_entries(&period.text);
        collect_parse_warnings(&period.key, &parsed.warnings, &mut warnings);

        if parsed.has_encrypted() {
            info!(
                "Period {} contains encrypted entries, not searched",
                period.key
            );
            skipped_encrypted.push(period.key);
            continue;
        }
        hits.extend(search_text(
            &period.key,
            &period.text,
            &needle,
            ctx.config.context_lines,
        ));
    }

    debug!(
        "Search matched {} lines in {} files",
        hits.len(),
        loaded.len()
    );
    let status = if hits.is_empty() {
        SearchStatus::NoMatches
    } else {
        SearchStatus::Matches
    };
    Ok(SearchReport {
        term: term.to_string(),
        status,
        hits,
        skipped_encrypted,
        warnings,
    })
}

/// Finds lines of `text` containing the already folded `needle`.
fn search_text(period: &PeriodKey, text: &str, needle: &str, context: usize) -> Vec<SearchHit> {
    let lines: Vec<&str> = text.lines().collect();
    let owned = |slice: &[&str]| slice.iter().map(|l| l.to_string()).collect::<Vec<_>>();

    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| fold_case(line).contains(needle))
        .map(|(i, line)| SearchHit {
            period: *period,
            line_number: i + 1,
            line: line.to_string(),
            context_before: owned(&lines[i.saturating_sub(context)..i]),
            context_after: owned(&lines[i + 1..(i + 1 + context).min(lines.len())]),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal_core::PeriodGranularity;

    fn key() -> PeriodKey {
        PeriodKey::parse(PeriodGranularity::Day, "01-05-2025").unwrap()
    }

    #[test]
    fn test_fold_case_handles_non_ascii() {
        assert_eq!(fold_case("ÄRGER Über"), "ärger über");
    }

    #[test]
    fn test_context_windows_are_per_match() {
        let text = "a\nb\nneedle one\nc\nNEEDLE two\nd\n";
        let hits = search_text(&key(), text, "needle", 2);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].line_number, 3);
        assert_eq!(hits[0].context_before, vec!["a", "b"]);
        assert_eq!(hits[0].context_after, vec!["c", "NEEDLE two"]);
        assert_eq!(hits[1].line, "NEEDLE two");
        assert_eq!(hits[1].context_before, vec!["needle one", "c"]);
        assert_eq!(hits[1].context_after, vec!["d"]);
    }

    #[test]
    fn test_context_clipped_at_file_edges() {
        let hits = search_text(&key(), "needle\nonly", "needle", 5);
        assert!(hits[0].context_before.is_empty());
        assert_eq!(hits[0].context_after, vec!["only"]);

        let hits = search_text(&key(), "x\nneedle", "needle", 0);
        assert!(hits[0].context_before.is_empty());
        assert!(hits[0].context_after.is_empty());
    }
}
