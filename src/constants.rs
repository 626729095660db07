//! Constants used throughout the application.
//!
//! This module contains the literals shared by the on-disk format, the
//! configuration layer and the command-line interface. The format constants
//! are part of the persisted file layout: changing them breaks existing
//! journals.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "devjournal";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A structured development journal stored as dated markdown files";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for the content directory.
pub const ENV_VAR_DEVJOURNAL_DIR: &str = "DEVJOURNAL_DIR";
/// Environment variable selecting day or month period files.
pub const ENV_VAR_DEVJOURNAL_PERIOD: &str = "DEVJOURNAL_PERIOD";
/// Environment variable for the interactive prompt symbol.
pub const ENV_VAR_DEVJOURNAL_PROMPT: &str = "DEVJOURNAL_PROMPT";
/// Environment variable requesting encryption of every new entry.
pub const ENV_VAR_DEVJOURNAL_ENCRYPT: &str = "DEVJOURNAL_ENCRYPT";
/// Environment variable for the number of search context lines.
pub const ENV_VAR_DEVJOURNAL_CONTEXT_LINES: &str = "DEVJOURNAL_CONTEXT_LINES";
/// Environment variable enabling a version-control commit after each append.
pub const ENV_VAR_DEVJOURNAL_GIT_BACKUP: &str = "DEVJOURNAL_GIT_BACKUP";
/// Environment variable supplying the passphrase non-interactively.
pub const ENV_VAR_DEVJOURNAL_PASSPHRASE: &str = "DEVJOURNAL_PASSPHRASE";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// Default sub-directory name for the journal within the user's home directory.
pub const DEFAULT_JOURNAL_SUBDIR: &str = "Documents/devjournal";
/// Default prompt symbol.
pub const DEFAULT_PROMPT_SYMBOL: &str = "> ";
/// Default number of context lines reported around each search match.
pub const DEFAULT_CONTEXT_LINES: usize = 2;
/// Upper bound accepted for search context lines.
pub const MAX_CONTEXT_LINES: usize = 50;

// Validation
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// File System Parameters
/// File extension for period files.
pub const JOURNAL_FILE_EXTENSION: &str = "md";
/// Advisory lock file guarding appends, kept inside the content directory.
pub const LOCK_FILE_NAME: &str = ".devjournal.lock";
/// Prefix for temporary files created while appending.
pub const TEMP_FILE_PREFIX: &str = ".devjournal-";
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Default POSIX permissions for newly created files (owner read/write).
#[cfg(unix)]
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

// Date/Time Logic
/// Filename stem format for day period files (DD-MM-YYYY).
pub const DAY_KEY_FORMAT: &str = "%d-%m-%Y";
/// Filename stem format for month period files (YYYY-MM).
pub const MONTH_KEY_FORMAT: &str = "%Y-%m";
/// Timestamp format used in entry headings.
pub const ENTRY_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";
/// Display format for day periods.
pub const DAY_LABEL_FORMAT: &str = "%A, %d %B %Y";
/// Display format for month periods.
pub const MONTH_LABEL_FORMAT: &str = "%B %Y";

// Entry Format
/// Title line prefix written at the top of a new period file.
pub const TITLE_PREFIX: &str = "# Development Journal: ";
/// Prefix of an entry heading line; reserved.
pub const HEADING_PREFIX: &str = "## ";
/// Separator between the kind and the timestamp in a heading.
pub const HEADING_SEPARATOR: &str = " - ";
/// Record separator terminating every entry.
pub const RECORD_SEPARATOR: &str = "---";
/// Marker line opening an encrypted entry body; reserved.
pub const ENCRYPTED_MARKER: &str = "<!-- devjournal:encrypted -->";
/// Escape character prefixed to free-text lines that look reserved.
pub const ESCAPE_CHAR: char = '\\';
/// Field label under which the session duration is stored.
pub const DURATION_LABEL: &str = "Duration";
/// Placeholder rendered in place of a block that failed to decrypt.
pub const DECRYPT_FAILED_PLACEHOLDER: &str =
    "[This entry could not be decrypted - the password may be incorrect]";

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "devjournal";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
