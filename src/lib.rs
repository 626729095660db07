/*!
# devjournal

devjournal is a structured development journal. Entries about coding
sessions and personal reflections are appended to markdown files, one file
per day or month, and can be listed, viewed, searched and counted later.
Entry bodies can optionally be encrypted with a passphrase.

## Architecture

The codebase follows a modular architecture with clear separation of concerns:

- `cli`: Command-line interface handling using clap
- `config`: Configuration loading and validation
- `constants`: Literals shared by the file format, configuration and CLI
- `crypto`: The cipher collaborator and the encryption gate
- `errors`: Error handling infrastructure
- `journal_core`: Entries, period keys, the file format and its parser (no I/O)
- `journal_io`: The period-file store
- `ops`: The operations the CLI calls

## Usage Example

```rust,no_run
use devjournal::journal_core::EntryKind;
use devjournal::ops::{self, EntryDraft, JournalContext};
use devjournal::{journal_io, Config};

fn main() -> devjournal::AppResult<()> {
    let config = Config::load()?;
    journal_io::ensure_journal_directory_exists(&config.journal_dir)?;
    let ctx = JournalContext::new(&config);

    let draft = EntryDraft::new(EntryKind::CodingSession)
        .duration("1h 30m")
        .field("Worked on", "Setup");
    let outcome = ops::append_entry(&ctx, &draft, false, None)?;
    println!("Saved to {}", outcome.path.display());
    Ok(())
}
```
*/

/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// Entry encryption
pub mod crypto;
/// Error types and utilities for error handling
pub mod errors;
/// Entry model, period keys and the file format
pub mod journal_core;
/// Period-file storage
pub mod journal_io;
/// Journal operations
pub mod ops;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use journal_core::{EntryKind, EntryRecord, PeriodGranularity, PeriodKey};
pub use journal_io::Store;
