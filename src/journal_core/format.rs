//! Serialization of entries to the period-file text format, and the parser
//! that finds entry boundaries when reading a file back.
//!
//! A period file looks like this:
//!
//! ```text
//! # Development Journal: Thursday, 01 May 2025
//!
//! ## Coding Session - 01-05-2025 14:30
//!
//! **Duration**:
//! 1h 30m
//!
//! **Worked on**:
//! Setup
//!
//! ---
//!
//! ```
//!
//! An encrypted entry keeps its heading and replaces the fields with the
//! marker line followed by armored ciphertext.
//!
//! Boundaries are lines starting with `## ` and marker lines not directly
//! owned by a heading. Free text that would look like a boundary, a field
//! label, or a separator is written with one extra leading backslash, which
//! the parser removes again.

use crate::constants::{
    DURATION_LABEL, ENCRYPTED_MARKER, ENTRY_TIMESTAMP_FORMAT, ESCAPE_CHAR, HEADING_PREFIX,
    HEADING_SEPARATOR, RECORD_SEPARATOR, TITLE_PREFIX,
};
use crate::journal_core::entry::{EntryField, EntryKind, EntryRecord};
use crate::journal_core::period::PeriodKey;
use chrono::NaiveDateTime;
use std::fmt;

/// Title written at the top of a newly created period file.
pub fn title_block(period: &PeriodKey) -> String {
    format!("{}{}\n\n", TITLE_PREFIX, period.display_label())
}

/// The `## <Kind> - <DD-MM-YYYY HH:MM>` heading line, without newline.
pub fn heading_line(kind: EntryKind, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}{}{}{}",
        HEADING_PREFIX,
        kind.label(),
        HEADING_SEPARATOR,
        timestamp.format(ENTRY_TIMESTAMP_FORMAT)
    )
}

/// Serializes a record into one complete block, heading to separator.
///
/// This is a pure function of the record.
///
/// # Examples
///
/// ```
/// use devjournal::journal_core::{format, EntryKind, EntryRecord};
/// use chrono::NaiveDate;
///
/// let timestamp = NaiveDate::from_ymd_opt(2025, 5, 1)
///     .unwrap()
///     .and_hms_opt(14, 30, 0)
///     .unwrap();
/// let mut record = EntryRecord::new(EntryKind::CodingSession, timestamp).with_duration("1h 30m");
/// record.set_field("Worked on", "Setup").unwrap();
///
/// let block = format::serialize(&record);
/// assert!(block.starts_with("## Coding Session - 01-05-2025 14:30\n"));
/// assert!(block.contains("**Worked on**: \nSetup\n"));
/// assert!(block.ends_with("---\n\n"));
/// ```
pub fn serialize(record: &EntryRecord) -> String {
    assemble_block(
        &heading_line(record.kind(), &record.timestamp()),
        &serialize_body(record),
    )
}

/// Serializes only the fields of a record: the text that gets encrypted.
pub fn serialize_body(record: &EntryRecord) -> String {
    render_body(record.duration(), record.fields())
}

/// Writes the duration and fields in on-disk form.
pub(crate) fn render_body(duration: Option<&str>, fields: &[EntryField]) -> String {
    let mut body = String::new();
    if let Some(duration) = duration {
        push_field(&mut body, DURATION_LABEL, duration);
    }
    for field in fields {
        push_field(&mut body, &field.label, &field.text);
    }
    body
}

/// Wraps ciphertext into an encrypted block under the record's heading.
pub(crate) fn encrypted_block(record: &EntryRecord, ciphertext: &str) -> String {
    let body = format!("{}\n{}\n\n", ENCRYPTED_MARKER, ciphertext.trim_end());
    assemble_block(&heading_line(record.kind(), &record.timestamp()), &body)
}

/// Puts a body under an optional heading and closes it with the separator.
pub(crate) fn display_block(heading: Option<&str>, body: &str) -> String {
    match heading {
        Some(heading) => assemble_block(heading, body),
        None => format!("{}{}\n\n", body, RECORD_SEPARATOR),
    }
}

/// Renders `body` in place of a parsed block's body.
///
/// Lines the file holds between the separator and the next boundary are
/// kept as they are.
pub(crate) fn redisplay_block(block: &ParsedBlock, body: &str) -> String {
    let Some(tail) = block.after_separator() else {
        return display_block(block.heading.as_deref(), body);
    };
    let head = match block.heading.as_deref() {
        Some(heading) => format!("{}\n\n", heading),
        None => String::new(),
    };
    format!("{}{}{}\n{}", head, body, RECORD_SEPARATOR, tail)
}

fn assemble_block(heading: &str, body: &str) -> String {
    format!("{}\n\n{}{}\n\n", heading, body, RECORD_SEPARATOR)
}

fn push_field(out: &mut String, label: &str, text: &str) {
    out.push_str("**");
    out.push_str(label);
    out.push_str("**: \n");
    if !text.is_empty() {
        for line in text.split('\n') {
            out.push_str(&escape_line(line));
            out.push('\n');
        }
    }
    out.push('\n');
}

fn is_heading(line: &str) -> bool {
    line.starts_with(HEADING_PREFIX)
}

fn is_marker(line: &str) -> bool {
    line.trim() == ENCRYPTED_MARKER
}

fn is_separator(line: &str) -> bool {
    line.trim() == RECORD_SEPARATOR
}

fn field_label(line: &str) -> Option<&str> {
    let inner = line.trim_end().strip_prefix("**")?.strip_suffix("**:")?;
    if inner.is_empty() || inner.contains("**") {
        return None;
    }
    Some(inner)
}

fn is_reserved(line: &str) -> bool {
    is_heading(line) || is_marker(line) || is_separator(line) || field_label(line).is_some()
}

/// Prefixes a backslash to free text that would otherwise be read as structure.
pub(crate) fn escape_line(line: &str) -> String {
    if is_reserved(line.trim_start_matches(ESCAPE_CHAR)) {
        format!("{}{}", ESCAPE_CHAR, line)
    } else {
        line.to_string()
    }
}

/// Reverses [`escape_line`].
pub(crate) fn unescape_line(line: &str) -> &str {
    match line.strip_prefix(ESCAPE_CHAR) {
        Some(rest) if is_reserved(line.trim_start_matches(ESCAPE_CHAR)) => rest,
        _ => line,
    }
}

/// Problems found while scanning a file. None of them stop the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A block has no `---` separator before the next boundary or end of file.
    /// The block is kept and runs to that point.
    Unterminated {
        /// 1-based line of the block start
        line: usize,
    },
    /// A `## ` line whose kind or timestamp could not be read.
    UnrecognizedHeading {
        /// 1-based line of the heading
        line: usize,
        /// The heading text
        heading: String,
    },
    /// An encryption marker that is not directly under a heading.
    OrphanMarker {
        /// 1-based line of the marker
        line: usize,
    },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::Unterminated { line } => write!(
                f,
                "entry starting at line {} has no closing '{}'; kept up to the next entry",
                line, RECORD_SEPARATOR
            ),
            ParseWarning::UnrecognizedHeading { line, heading } => {
                write!(f, "unrecognized entry heading at line {}: {}", line, heading)
            }
            ParseWarning::OrphanMarker { line } => {
                write!(f, "encrypted block without heading at line {}", line)
            }
        }
    }
}

/// Contents of a parsed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockBody {
    /// Readable fields.
    Plain {
        /// The session duration, if recorded
        duration: Option<String>,
        /// Fields in file order
        fields: Vec<EntryField>,
    },
    /// Ciphertext following the marker line.
    Encrypted {
        /// Armored ciphertext, without surrounding blank lines
        ciphertext: String,
    },
}

/// One entry found in a file.
///
/// `start_line..end_line` is the half-open, 0-based range of lines the block
/// owns: from its boundary up to the next boundary or the end of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
    /// First line of the block (0-based).
    pub start_line: usize,
    /// One past the last line of the block (0-based).
    pub end_line: usize,
    /// The block's lines, each newline-terminated.
    pub raw: String,
    /// The heading line, absent for an orphan marker.
    pub heading: Option<String>,
    /// Kind read from the heading.
    pub kind: Option<EntryKind>,
    /// Timestamp read from the heading.
    pub timestamp: Option<NaiveDateTime>,
    /// Parsed body.
    pub body: BlockBody,
    /// Whether a `---` separator closed the block.
    pub terminated: bool,
}

impl ParsedBlock {
    /// Whether the body is ciphertext.
    pub fn is_encrypted(&self) -> bool {
        matches!(self.body, BlockBody::Encrypted { .. })
    }

    /// Rebuilds the record of a readable block with a recognised heading.
    pub fn to_record(&self) -> Option<EntryRecord> {
        match (&self.body, self.kind, self.timestamp) {
            (BlockBody::Plain { duration, fields }, Some(kind), Some(timestamp)) => Some(
                EntryRecord::from_parts(kind, timestamp, duration.clone(), fields.clone()),
            ),
            _ => None,
        }
    }

    /// Raw text after the block's separator line, if it has one.
    pub(crate) fn after_separator(&self) -> Option<&str> {
        let mut offset = 0;
        for (i, line) in self.raw.split_inclusive('\n').enumerate() {
            offset += line.len();
            if i > 0 && is_separator(line) {
                return Some(&self.raw[offset..]);
            }
        }
        None
    }
}

/// Result of scanning one file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedFile {
    /// Text before the first boundary (the title), newline-terminated lines.
    pub preamble: String,
    /// Entries in file order.
    pub blocks: Vec<ParsedBlock>,
    /// Non-fatal problems.
    pub warnings: Vec<ParseWarning>,
}

impl ParsedFile {
    /// Number of entries in the file.
    pub fn entry_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of encrypted entries in the file.
    pub fn encrypted_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_encrypted()).count()
    }

    /// Whether any entry is encrypted.
    pub fn has_encrypted(&self) -> bool {
        self.blocks.iter().any(ParsedBlock::is_encrypted)
    }
}

/// Scans a file's text and splits it into entry blocks.
///
/// A file without any boundary yields no blocks; this is not an error.
///
/// # Examples
///
/// ```
/// use devjournal::journal_core::format::parse_entries;
///
/// let text = "# Title\n\n## Coding Session - 01-05-2025 14:30\n\n**Worked on**: \nSetup\n\n---\n\n";
/// let parsed = parse_entries(text);
/// assert_eq!(parsed.entry_count(), 1);
/// assert_eq!(parsed.blocks[0].start_line, 2);
/// assert!(parsed.warnings.is_empty());
///
/// assert_eq!(parse_entries("just some notes\n").entry_count(), 0);
/// ```
pub fn parse_entries(text: &str) -> ParsedFile {
    let lines: Vec<&str> = text.lines().collect();
    let starts = boundaries(&lines);

    let preamble_end = starts.first().copied().unwrap_or(lines.len());
    let preamble = join_lines(&lines[..preamble_end]);

    let mut warnings = Vec::new();
    let blocks = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(lines.len());
            parse_block(&lines, start, end, &mut warnings)
        })
        .collect();

    ParsedFile {
        preamble,
        blocks,
        warnings,
    }
}

/// Parses decrypted body text into its fields.
pub(crate) fn parse_body_text(text: &str) -> BlockBody {
    let lines: Vec<&str> = text.lines().collect();
    parse_body(&lines)
}

fn boundaries(lines: &[&str]) -> Vec<usize> {
    let mut starts = Vec::new();
    // A marker among the first non-blank lines after a heading belongs to it.
    let mut heading_open = false;

    for (i, line) in lines.iter().enumerate() {
        if is_heading(line) {
            starts.push(i);
            heading_open = true;
        } else if is_marker(line) {
            if !heading_open {
                starts.push(i);
            }
            heading_open = false;
        } else if !line.trim().is_empty() {
            heading_open = false;
        }
    }

    starts
}

fn parse_block(
    lines: &[&str],
    start: usize,
    end: usize,
    warnings: &mut Vec<ParseWarning>,
) -> ParsedBlock {
    let first = lines[start];
    let (heading, kind, timestamp, body_start) = if is_heading(first) {
        let (kind, timestamp) = parse_heading(first);
        if kind.is_none() || timestamp.is_none() {
            warnings.push(ParseWarning::UnrecognizedHeading {
                line: start + 1,
                heading: first.to_string(),
            });
        }
        (Some(first.to_string()), kind, timestamp, start + 1)
    } else {
        warnings.push(ParseWarning::OrphanMarker { line: start + 1 });
        (None, None, None, start)
    };

    let separator = (body_start..end).find(|&i| is_separator(lines[i]));
    if separator.is_none() {
        warnings.push(ParseWarning::Unterminated { line: start + 1 });
    }
    let content_end = separator.unwrap_or(end);

    ParsedBlock {
        start_line: start,
        end_line: end,
        raw: join_lines(&lines[start..end]),
        heading,
        kind,
        timestamp,
        body: parse_body(&lines[body_start..content_end]),
        terminated: separator.is_some(),
    }
}

fn parse_heading(line: &str) -> (Option<EntryKind>, Option<NaiveDateTime>) {
    let rest = &line[HEADING_PREFIX.len()..];
    match rest.rsplit_once(HEADING_SEPARATOR) {
        Some((kind, timestamp)) => (
            EntryKind::from_label(kind.trim()),
            NaiveDateTime::parse_from_str(timestamp.trim(), ENTRY_TIMESTAMP_FORMAT).ok(),
        ),
        None => (EntryKind::from_label(rest.trim()), None),
    }
}

fn parse_body(content: &[&str]) -> BlockBody {
    if let Some(first) = content.iter().position(|l| !l.trim().is_empty()) {
        if is_marker(content[first]) {
            let cipher_lines = trim_blank_lines(&content[first + 1..]);
            return BlockBody::Encrypted {
                ciphertext: cipher_lines.join("\n"),
            };
        }
    }

    let mut duration = None;
    let mut fields = Vec::new();
    let mut current: Option<(&str, Vec<&str>)> = None;

    let mut flush = |current: Option<(&str, Vec<&str>)>| {
        if let Some((label, body)) = current {
            let text = trim_trailing_blank_lines(&body).join("\n");
            if label == DURATION_LABEL {
                if !text.trim().is_empty() {
                    duration = Some(text);
                }
            } else {
                fields.push(EntryField {
                    label: label.to_string(),
                    text,
                });
            }
        }
    };

    for line in content {
        if let Some(label) = field_label(line) {
            flush(current.take());
            current = Some((label, Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(unescape_line(line));
        }
    }
    flush(current.take());

    BlockBody::Plain { duration, fields }
}

fn trim_trailing_blank_lines<'a>(lines: &'a [&'a str]) -> &'a [&'a str] {
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(0, |i| i + 1);
    &lines[..end]
}

fn trim_blank_lines<'a>(lines: &'a [&'a str]) -> &'a [&'a str] {
    let trailing = trim_trailing_blank_lines(lines);
    let start = trailing
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(trailing.len());
    &trailing[start..]
}

fn join_lines(lines: &[&str]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal_core::period::PeriodGranularity;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn coding_record(worked_on: &str) -> EntryRecord {
        let mut record =
            EntryRecord::new(EntryKind::CodingSession, at(14, 30)).with_duration("1h 30m");
        record.set_field("Worked on", worked_on).unwrap();
        record
    }

    #[test]
    fn test_serialize_exact_layout() {
        let mut record = coding_record("Setup");
        record.set_field("Learned", "Line one\nLine two").unwrap();

        let expected = "## Coding Session - 01-05-2025 14:30\n\
                        \n\
                        **Duration**: \n\
                        1h 30m\n\
                        \n\
                        **Worked on**: \n\
                        Setup\n\
                        \n\
                        **Learned**: \n\
                        Line one\n\
                        Line two\n\
                        \n\
                        ---\n\
                        \n";
        assert_eq!(serialize(&record), expected);
    }

    #[test]
    fn test_title_block() {
        let key = PeriodKey::parse(PeriodGranularity::Day, "01-05-2025").unwrap();
        assert_eq!(
            title_block(&key),
            "# Development Journal: Thursday, 01 May 2025\n\n"
        );
    }

    #[test]
    fn test_round_trip_plain_record() {
        let mut record = coding_record("Setup\n\n  indented\ntrailing spaces   ");
        record.set_field("Challenges", "").unwrap();
        record.set_field("Next Steps", "\nstarts with a blank line").unwrap();

        let parsed = parse_entries(&serialize(&record));
        assert_eq!(parsed.entry_count(), 1);
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.blocks[0].to_record(), Some(record));
    }

    #[test]
    fn test_round_trip_reflection_without_duration() {
        let mut record = EntryRecord::new(EntryKind::PersonalReflection, at(22, 5));
        record.set_field("Mood", "calm").unwrap();
        record.set_field("Goals", "sleep earlier").unwrap();

        let parsed = parse_entries(&serialize(&record));
        let block = &parsed.blocks[0];
        assert_eq!(block.kind, Some(EntryKind::PersonalReflection));
        assert_eq!(block.timestamp, Some(at(22, 5)));
        assert_eq!(block.to_record(), Some(record));
    }

    #[test]
    fn test_reserved_lines_are_escaped_and_restored() {
        let tricky = "## not a heading\n---\n**Worked on**:\n<!-- devjournal:encrypted -->\n\\## already escaped\n\\plain backslash";
        let record = coding_record(tricky);

        let serialized = serialize(&record);
        assert!(serialized.contains("\n\\## not a heading\n"));
        assert!(serialized.contains("\n\\---\n"));
        assert!(serialized.contains("\n\\\\## already escaped\n"));
        assert!(serialized.contains("\n\\plain backslash\n"));

        let parsed = parse_entries(&serialized);
        assert_eq!(parsed.entry_count(), 1);
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.blocks[0].to_record(), Some(record));
    }

    #[test]
    fn test_round_trip_with_carriage_returns() {
        for text in ["ends cr\r", "a\rb", "crlf\r\nline", "\t---", "**A**:**B**:"] {
            let record = coding_record(text);
            let parsed = parse_entries(&serialize(&record));
            assert_eq!(parsed.blocks[0].to_record(), Some(record), "input {:?}", text);
        }
    }

    #[test]
    fn test_blocks_have_half_open_ranges() {
        let key = PeriodKey::parse(PeriodGranularity::Day, "01-05-2025").unwrap();
        let first = coding_record("First");
        let second = coding_record("Second");
        let text = format!(
            "{}{}{}",
            title_block(&key),
            serialize(&first),
            serialize(&second)
        );

        let parsed = parse_entries(&text);
        assert_eq!(parsed.entry_count(), 2);
        assert_eq!(parsed.preamble, title_block(&key));
        assert_eq!(parsed.blocks[0].start_line, 2);
        assert_eq!(parsed.blocks[0].end_line, parsed.blocks[1].start_line);
        assert_eq!(parsed.blocks[1].end_line, text.lines().count());
        assert_eq!(parsed.blocks[0].raw, serialize(&first));

        let rebuilt: String = std::iter::once(parsed.preamble.clone())
            .chain(parsed.blocks.iter().map(|b| b.raw.clone()))
            .collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_encrypted_block_is_one_entry() {
        let record = coding_record("secret");
        let armored = "-----BEGIN AGE ENCRYPTED FILE-----\nYWdlLWVuY3J5cHRpb24\n-----END AGE ENCRYPTED FILE-----\n";
        let text = format!(
            "{}{}",
            encrypted_block(&record, armored),
            serialize(&coding_record("plain"))
        );

        let parsed = parse_entries(&text);
        assert_eq!(parsed.entry_count(), 2);
        assert_eq!(parsed.encrypted_count(), 1);
        assert!(parsed.has_encrypted());
        assert_eq!(parsed.blocks[0].kind, Some(EntryKind::CodingSession));
        match &parsed.blocks[0].body {
            BlockBody::Encrypted { ciphertext } => assert_eq!(ciphertext, armored.trim_end()),
            other => panic!("Expected encrypted body, got {:?}", other),
        }
        assert!(parsed.blocks[0].to_record().is_none());
    }

    #[test]
    fn test_orphan_marker_starts_a_block() {
        let text = "# Title\n\nloose notes\n<!-- devjournal:encrypted -->\nQUJD\n---\n";
        let parsed = parse_entries(text);
        assert_eq!(parsed.entry_count(), 1);
        assert_eq!(parsed.blocks[0].start_line, 3);
        assert!(parsed.blocks[0].is_encrypted());
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::OrphanMarker { line: 4 }]
        );
    }

    #[test]
    fn test_unterminated_trailing_block_is_kept() {
        let text = "## Coding Session - 01-05-2025 14:30\n\n<!-- devjournal:encrypted -->\nQUJD\nREVG\n";
        let parsed = parse_entries(text);
        assert_eq!(parsed.entry_count(), 1);
        assert!(!parsed.blocks[0].terminated);
        assert_eq!(parsed.blocks[0].end_line, 5);
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::Unterminated { line: 1 }]
        );
        match &parsed.blocks[0].body {
            BlockBody::Encrypted { ciphertext } => assert_eq!(ciphertext, "QUJD\nREVG"),
            other => panic!("Expected encrypted body, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_heading_still_counts() {
        let text = "## Standup - yesterday\n\n**Notes**: \nstuff\n\n---\n";
        let parsed = parse_entries(text);
        assert_eq!(parsed.entry_count(), 1);
        assert_eq!(parsed.blocks[0].kind, None);
        assert!(matches!(
            parsed.warnings[0],
            ParseWarning::UnrecognizedHeading { line: 1, .. }
        ));
    }

    #[test]
    fn test_no_boundaries_no_entries() {
        let parsed = parse_entries("# Development Journal: May 2025\n\nnothing yet\n");
        assert_eq!(parsed.entry_count(), 0);
        assert!(parsed.warnings.is_empty());
        assert_eq!(parse_entries("").entry_count(), 0);
    }

    #[test]
    fn test_parse_body_text_reads_decrypted_fields() {
        let record = coding_record("Setup");
        match parse_body_text(&serialize_body(&record)) {
            BlockBody::Plain { duration, fields } => {
                assert_eq!(duration.as_deref(), Some("1h 30m"));
                assert_eq!(fields, record.fields().to_vec());
            }
            other => panic!("Expected plain body, got {:?}", other),
        }
    }
}
