//! Core journal functionality without I/O operations.
//!
//! This module holds the entry model, period keys, the text format and the
//! clock abstraction. Nothing here touches the filesystem, so every function
//! can be exercised on plain strings.

pub mod clock;
pub mod entry;
pub mod format;
pub mod period;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entry::{EntryField, EntryKind, EntryRecord};
pub use format::{parse_entries, serialize, BlockBody, ParseWarning, ParsedBlock, ParsedFile};
pub use period::{PeriodGranularity, PeriodKey};
