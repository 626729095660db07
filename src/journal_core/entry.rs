//! The in-memory journal entry.

use crate::errors::{AppError, AppResult};
use chrono::{NaiveDateTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// The kind of an entry, written into its heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A structured record of a coding session.
    CodingSession,
    /// A free-form reflection on the day.
    PersonalReflection,
}

const CODING_SESSION_FIELDS: &[&str] = &[
    "Worked on",
    "Challenges",
    "Solutions",
    "Learned",
    "Next Steps",
];
const PERSONAL_REFLECTION_FIELDS: &[&str] = &["Mood", "Thoughts", "Grateful for", "Goals"];

impl EntryKind {
    /// Heading label of the kind.
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::CodingSession => "Coding Session",
            EntryKind::PersonalReflection => "Personal Reflection",
        }
    }

    /// Field labels of the kind, in serialization order.
    ///
    /// The duration is not listed; it is stored ahead of these fields.
    pub fn field_labels(self) -> &'static [&'static str] {
        match self {
            EntryKind::CodingSession => CODING_SESSION_FIELDS,
            EntryKind::PersonalReflection => PERSONAL_REFLECTION_FIELDS,
        }
    }

    /// Looks up a kind by its heading label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Coding Session" => Some(EntryKind::CodingSession),
            "Personal Reflection" => Some(EntryKind::PersonalReflection),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntryKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryKind::from_label(s.trim())
            .ok_or_else(|| AppError::Journal(format!("Unknown entry kind '{}'", s)))
    }
}

/// One labelled section of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryField {
    /// Section label, e.g. "Worked on".
    pub label: String,
    /// Free text, possibly spanning several lines.
    pub text: String,
}

/// One journal entry.
///
/// Records are built once before being appended and are only ever read back
/// by re-parsing the period file; there is no update operation.
///
/// # Examples
///
/// ```
/// use devjournal::journal_core::{EntryKind, EntryRecord};
/// use chrono::NaiveDate;
///
/// let timestamp = NaiveDate::from_ymd_opt(2025, 5, 1)
///     .unwrap()
///     .and_hms_opt(14, 30, 0)
///     .unwrap();
/// let mut record = EntryRecord::new(EntryKind::CodingSession, timestamp)
///     .with_duration("1h 30m");
/// record.set_field("Worked on", "Setup").unwrap();
///
/// assert_eq!(record.field("Worked on"), Some("Setup"));
/// assert!(record.set_field("Favourite colour", "blue").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    kind: EntryKind,
    timestamp: NaiveDateTime,
    duration: Option<String>,
    fields: Vec<EntryField>,
    encrypted: bool,
}

impl EntryRecord {
    /// Creates an empty record. The timestamp is truncated to the minute,
    /// which is the precision kept in the heading.
    pub fn new(kind: EntryKind, timestamp: NaiveDateTime) -> Self {
        EntryRecord {
            kind,
            timestamp: truncate_to_minute(timestamp),
            duration: None,
            fields: Vec::new(),
            encrypted: false,
        }
    }

    /// Rebuilds a record from parsed parts without label validation.
    pub(crate) fn from_parts(
        kind: EntryKind,
        timestamp: NaiveDateTime,
        duration: Option<String>,
        fields: Vec<EntryField>,
    ) -> Self {
        EntryRecord {
            kind,
            timestamp,
            duration,
            fields,
            encrypted: false,
        }
    }

    /// Sets the free-text session duration. Blank input clears it.
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        let duration = normalize_text(&duration.into());
        self.duration = if duration.trim().is_empty() {
            None
        } else {
            Some(duration)
        };
        self
    }

    /// Sets a field, keeping the kind's fixed field order.
    ///
    /// Trailing blank lines are dropped and line endings normalised to `\n`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Journal` if `label` is not a field of this kind.
    pub fn set_field(&mut self, label: &str, text: &str) -> AppResult<()> {
        let labels = self.kind.field_labels();
        let position = labels.iter().position(|l| *l == label).ok_or_else(|| {
            AppError::Journal(format!(
                "'{}' is not a field of a {} entry",
                label, self.kind
            ))
        })?;

        let field = EntryField {
            label: label.to_string(),
            text: normalize_text(text),
        };

        if let Some(existing) = self.fields.iter_mut().find(|f| f.label == label) {
            *existing = field;
            return Ok(());
        }

        let insert_at = self
            .fields
            .iter()
            .position(|f| {
                labels
                    .iter()
                    .position(|l| *l == f.label)
                    .map_or(false, |p| p > position)
            })
            .unwrap_or(self.fields.len());
        self.fields.insert(insert_at, field);
        Ok(())
    }

    /// The entry kind.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// When the entry was created.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// The session duration, stored verbatim.
    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    /// Fields in serialization order.
    pub fn fields(&self) -> &[EntryField] {
        &self.fields
    }

    /// Text of one field.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.text.as_str())
    }

    /// Whether the body is stored as ciphertext.
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub(crate) fn mark_encrypted(&mut self) {
        self.encrypted = true;
    }
}

fn truncate_to_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}

/// Normalises line endings and drops trailing blank lines.
///
/// A lone `\r` counts as a line break, the same as `\r\n`.
pub(crate) fn normalize_text(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<&str> = unified.split('\n').collect();
    while lines.last().map_or(false, |l| l.trim().is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(9, 15, 42)
            .unwrap()
    }

    #[test]
    fn test_timestamp_truncated_to_minute() {
        let record = EntryRecord::new(EntryKind::CodingSession, timestamp());
        assert_eq!(record.timestamp().second(), 0);
        assert_eq!(record.timestamp().minute(), 15);
    }

    #[test]
    fn test_fields_kept_in_kind_order() {
        let mut record = EntryRecord::new(EntryKind::CodingSession, timestamp());
        record.set_field("Next Steps", "Ship it").unwrap();
        record.set_field("Worked on", "Parser").unwrap();
        record.set_field("Learned", "Lifetimes").unwrap();

        let labels: Vec<&str> = record.fields().iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Worked on", "Learned", "Next Steps"]);
    }

    #[test]
    fn test_set_field_replaces_existing() {
        let mut record = EntryRecord::new(EntryKind::PersonalReflection, timestamp());
        record.set_field("Mood", "tired").unwrap();
        record.set_field("Mood", "better").unwrap();
        assert_eq!(record.fields().len(), 1);
        assert_eq!(record.field("Mood"), Some("better"));
    }

    #[test]
    fn test_set_field_rejects_foreign_label() {
        let mut record = EntryRecord::new(EntryKind::PersonalReflection, timestamp());
        let result = record.set_field("Worked on", "code");
        match result {
            Err(AppError::Journal(msg)) => assert!(msg.contains("Personal Reflection")),
            _ => panic!("Expected Journal error for a field of another kind"),
        }
    }

    #[test]
    fn test_text_normalized() {
        let mut record = EntryRecord::new(EntryKind::CodingSession, timestamp())
            .with_duration("  \n");
        record
            .set_field("Challenges", "line one\r\nline two\n\n  \n")
            .unwrap();
        assert_eq!(record.duration(), None);
        assert_eq!(record.field("Challenges"), Some("line one\nline two"));
    }

    #[test]
    fn test_lone_carriage_return_is_a_line_break() {
        let mut record = EntryRecord::new(EntryKind::CodingSession, timestamp());
        record.set_field("Learned", "ends cr\r").unwrap();
        record.set_field("Challenges", "old\rmac\r\nmixed").unwrap();
        assert_eq!(record.field("Learned"), Some("ends cr"));
        assert_eq!(record.field("Challenges"), Some("old\nmac\nmixed"));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(
            "Coding Session".parse::<EntryKind>().unwrap(),
            EntryKind::CodingSession
        );
        assert!("Standup".parse::<EntryKind>().is_err());
    }
}
