/*!
# devjournal - A Structured Development Journal

devjournal records structured entries about coding sessions and personal
reflections in dated markdown files, one file per day or month.

This file contains the main application flow: logging setup, argument
parsing, configuration, and dispatch to the journal operations.

## Usage

```
devjournal <COMMAND>

Commands:
  new      Write a new entry
  list     List period files with entry counts
  view     Show one period file
  search   Search all entries, case-insensitively
  stats    Show entry statistics
  backup   Commit the journal to its git repository

Options:
      --log-format <LOG_FORMAT>  Log output format [default: text] [possible values: text, json]
  -v, --verbose                  Print verbose output
  -h, --help                     Print help
  -V, --version                  Print version
```

## Configuration

See the `config` module for the `DEVJOURNAL_*` environment variables.
*/

use chrono::Local;
use clap::Parser;
use devjournal::cli::{self, CliArgs, Command, LogFormat, NewArgs};
use devjournal::config::Config;
use devjournal::constants;
use devjournal::crypto::obtain_passphrase;
use devjournal::errors::{AppError, AppResult};
use devjournal::journal_io;
use devjournal::ops::{
    self, GitBackup, JournalContext, SearchStatus, StatsStatus, VersionControl,
};
use std::io;
use std::process::ExitCode;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// The main entry point for the devjournal application.
///
/// Initializes logging, opens the root span, runs the command, and turns an
/// error into a message on stderr and a failing exit code.
fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.log_format, args.verbose);

    let root_span = tracing::span!(
        Level::INFO,
        constants::TRACING_ROOT_SPAN_NAME,
        service_name = constants::TRACING_SERVICE_NAME,
        correlation_id = %Uuid::new_v4()
    );
    let _guard = root_span.enter();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat, verbose: bool) {
    let default_level = if verbose {
        "debug"
    } else {
        constants::DEFAULT_LOG_LEVEL
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(io::stderr);

    match format {
        LogFormat::Json => builder.json().with_current_span(true).init(),
        LogFormat::Text => builder.init(),
    }
}

/// Runs one command.
///
/// # Errors
///
/// Configuration, store, lock, crypto and backup errors are passed up to
/// `main` for reporting. A missing period file is reported as a message.
fn run(args: CliArgs) -> AppResult<()> {
    debug!("CLI arguments: {:?}", args);

    info!("Loading configuration");
    let config = Config::load()?;
    config.validate()?;
    debug!("Configuration: {:?}", config);

    journal_io::ensure_journal_directory_exists(&config.journal_dir)?;
    let ctx = JournalContext::new(&config);

    match args.command {
        Command::New(new) => run_new(&ctx, &new),
        Command::List => run_list(&ctx),
        Command::View { key, decrypt } => run_view(&ctx, &key, decrypt),
        Command::Search { term } => run_search(&ctx, &term),
        Command::Stats { json } => run_stats(&ctx, json),
        Command::Backup { status, push } => run_backup(&config, status, push),
    }
}

fn run_new(ctx: &JournalContext<'_>, new: &NewArgs) -> AppResult<()> {
    let draft = if new.field_answers().is_empty() && new.duration.is_none() {
        let stdin = io::stdin();
        let stdout = io::stdout();
        cli::prompt_for_draft(
            new.kind(),
            &ctx.config.prompt_symbol,
            &mut stdin.lock(),
            &mut stdout.lock(),
        )?
    } else {
        new.to_draft()
    };

    let encrypt = new.encrypt || ctx.config.auto_encrypt;
    let key = if encrypt {
        match obtain_passphrase(true) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("No passphrase for encryption: {}", e);
                eprintln!("Warning: {}", e);
                None
            }
        }
    } else {
        None
    };

    let outcome = ops::append_entry(ctx, &draft, new.encrypt, key.as_ref())?;
    for warning in &outcome.warnings {
        eprintln!("Warning: {}", warning);
    }
    println!(
        "Saved {}entry to {}",
        if outcome.encrypted { "encrypted " } else { "" },
        outcome.path.display()
    );
    Ok(())
}

fn run_list(ctx: &JournalContext<'_>) -> AppResult<()> {
    let report = ops::list_periods(ctx)?;
    print_warnings(&report.warnings);

    if report.periods.is_empty() {
        println!("No journal entries yet.");
        return Ok(());
    }
    for period in &report.periods {
        let encrypted = if period.encrypted_count > 0 {
            format!(" ({} encrypted)", period.encrypted_count)
        } else {
            String::new()
        };
        println!(
            "{:<12} {:<30} {} {}{}",
            period.key.stem(),
            period.display_label,
            period.entry_count,
            if period.entry_count == 1 { "entry" } else { "entries" },
            encrypted
        );
    }
    Ok(())
}

fn run_view(ctx: &JournalContext<'_>, key: &str, decrypt: bool) -> AppResult<()> {
    let period = ops::resolve_period(ctx, key)?;
    let passphrase = if decrypt {
        Some(obtain_passphrase(false)?)
    } else {
        None
    };

    let outcome = match ops::view_period(ctx, &period, passphrase.as_ref()) {
        Ok(outcome) => outcome,
        Err(e) if e.is_not_found() => {
            println!("No entries for {}.", period);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    print_warnings(&outcome.warnings);
    print!("{}", outcome.text);
    if outcome.failed > 0 {
        eprintln!(
            "Warning: {} encrypted entries could not be decrypted",
            outcome.failed
        );
    }
    if outcome.sealed > 0 {
        eprintln!(
            "{} encrypted entries not shown; use --decrypt to read them",
            outcome.sealed
        );
    }
    Ok(())
}

fn run_search(ctx: &JournalContext<'_>, term: &str) -> AppResult<()> {
    let report = ops::search(ctx, term)?;
    print_warnings(&report.warnings);

    for skipped in &report.skipped_encrypted {
        println!("{}: contains encrypted entries, not searched", skipped);
    }
    if report.status == SearchStatus::NoMatches {
        println!("No matches for '{}'.", report.term);
        return Ok(());
    }

    for hit in &report.hits {
        println!("{}:{}", hit.period, hit.line_number);
        let first = hit.line_number - hit.context_before.len();
        for (offset, line) in hit.context_before.iter().enumerate() {
            println!("  {:>5}  {}", first + offset, line);
        }
        println!("> {:>5}  {}", hit.line_number, hit.line);
        for (offset, line) in hit.context_after.iter().enumerate() {
            println!("  {:>5}  {}", hit.line_number + 1 + offset, line);
        }
        println!();
    }
    println!("{} matches.", report.hits.len());
    Ok(())
}

fn run_stats(ctx: &JournalContext<'_>, json: bool) -> AppResult<()> {
    let summary = ops::stats(ctx)?;

    if json {
        let text = serde_json::to_string_pretty(&summary).map_err(|e| AppError::Io(e.into()))?;
        println!("{}", text);
        return Ok(());
    }

    print_warnings(&summary.warnings);
    if summary.status == StatsStatus::NoEntries {
        println!("No entries yet.");
        return Ok(());
    }

    println!("Total entries:      {}", summary.total_entries);
    println!("Periods:            {}", summary.entries_by_period.len());
    if let Some(most_active) = summary.most_active_period {
        println!(
            "Most active:        {} ({} entries)",
            most_active, summary.most_active_count
        );
    }
    if let (Some(oldest), Some(newest)) = (summary.oldest_period, summary.newest_period) {
        println!("Range:              {} to {}", oldest, newest);
    }
    println!("Average per period: {}", summary.average_per_period);
    Ok(())
}

fn run_backup(config: &Config, status: bool, push: bool) -> AppResult<()> {
    let backup = GitBackup::new(config.journal_dir.clone());

    if status {
        println!("{}", backup.status()?.trim_end());
        return Ok(());
    }

    let message = format!(
        "Journal backup {}",
        Local::now().format(constants::ENTRY_TIMESTAMP_FORMAT)
    );
    backup.commit(&message)?;
    println!("Journal committed.");

    if push {
        backup.push()?;
        println!("Journal pushed.");
    }
    Ok(())
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
}
