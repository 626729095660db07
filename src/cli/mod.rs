//! Command-line interface.
//!
//! A thin router: argument parsing with clap, plus the interactive prompt
//! used by `new` when no field answers are passed as flags.

use crate::constants;
use crate::errors::AppResult;
use crate::journal_core::EntryKind;
use crate::ops::EntryDraft;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};

/// A structured development journal stored as dated markdown files
#[derive(Parser, Debug)]
#[clap(name = "devjournal", about = constants::APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub command: Command,

    /// Log output format
    #[clap(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Print verbose output
    #[clap(short = 'v', long, global = true)]
    pub verbose: bool,
}

/// Log output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// Subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Write a new entry
    New(NewArgs),
    /// List period files with entry counts
    List,
    /// Show one period file
    View {
        /// Period key, e.g. 01-05-2025 (or 2025-05 with monthly files)
        key: String,
        /// Decrypt encrypted entries for display
        #[clap(short = 'd', long)]
        decrypt: bool,
    },
    /// Search all entries, case-insensitively
    Search {
        /// Text to look for
        term: String,
    },
    /// Show entry statistics
    Stats {
        /// Print the summary as JSON
        #[clap(long)]
        json: bool,
    },
    /// Commit the journal to its git repository
    Backup {
        /// Only show repository status
        #[clap(long, conflicts_with = "push")]
        status: bool,
        /// Push after committing
        #[clap(long)]
        push: bool,
    },
}

/// Answers for `new`. Any field left out is prompted for, unless at least
/// one field was given on the command line.
#[derive(Args, Debug, Default, PartialEq, Eq)]
pub struct NewArgs {
    /// Write a personal reflection instead of a coding session
    #[clap(short = 'r', long)]
    pub reflection: bool,

    /// Session length, free text (e.g. "1h 30m")
    #[clap(long)]
    pub duration: Option<String>,

    /// What you worked on
    #[clap(long, conflicts_with = "reflection")]
    pub worked_on: Option<String>,

    /// Challenges you hit
    #[clap(long, conflicts_with = "reflection")]
    pub challenges: Option<String>,

    /// How you solved them
    #[clap(long, conflicts_with = "reflection")]
    pub solutions: Option<String>,

    /// What you learned
    #[clap(long, conflicts_with = "reflection")]
    pub learned: Option<String>,

    /// What comes next
    #[clap(long, conflicts_with = "reflection")]
    pub next_steps: Option<String>,

    /// How you feel
    #[clap(long, requires = "reflection")]
    pub mood: Option<String>,

    /// Free thoughts
    #[clap(long, requires = "reflection")]
    pub thoughts: Option<String>,

    /// What you are grateful for
    #[clap(long, requires = "reflection")]
    pub gratitude: Option<String>,

    /// Goals
    #[clap(long, requires = "reflection")]
    pub goals: Option<String>,

    /// Encrypt the entry body
    #[clap(short = 'e', long)]
    pub encrypt: bool,
}

impl NewArgs {
    /// Entry kind selected by the flags.
    pub fn kind(&self) -> EntryKind {
        if self.reflection {
            EntryKind::PersonalReflection
        } else {
            EntryKind::CodingSession
        }
    }

    /// Field answers given as flags, keyed by field label.
    pub fn field_answers(&self) -> Vec<(&'static str, &str)> {
        let candidates: [(&'static str, &Option<String>); 9] = [
            ("Worked on", &self.worked_on),
            ("Challenges", &self.challenges),
            ("Solutions", &self.solutions),
            ("Learned", &self.learned),
            ("Next Steps", &self.next_steps),
            ("Mood", &self.mood),
            ("Thoughts", &self.thoughts),
            ("Grateful for", &self.gratitude),
            ("Goals", &self.goals),
        ];
        let labels = self.kind().field_labels();
        candidates
            .iter()
            .filter(|(label, _)| labels.contains(label))
            .filter_map(|(label, value)| value.as_deref().map(|v| (*label, v)))
            .collect()
    }

    /// Builds a draft from the flags alone.
    pub fn to_draft(&self) -> EntryDraft {
        let mut draft = EntryDraft::new(self.kind());
        draft.duration = self.duration.clone();
        for (label, text) in self.field_answers() {
            draft = draft.field(label, text);
        }
        draft
    }
}

/// Asks for every field of `kind` on `output`, reading answers from `input`.
///
/// Each answer may span several lines and ends at an empty line or end of
/// input. Coding sessions are asked for their duration first.
///
/// # Errors
///
/// Returns `AppError::Io` if reading or writing the terminal fails.
pub fn prompt_for_draft<R: BufRead, W: Write>(
    kind: EntryKind,
    prompt_symbol: &str,
    input: &mut R,
    output: &mut W,
) -> AppResult<EntryDraft> {
    let mut draft = EntryDraft::new(kind);

    if kind == EntryKind::CodingSession {
        let duration = ask(constants::DURATION_LABEL, prompt_symbol, input, output)?;
        if !duration.trim().is_empty() {
            draft.duration = Some(duration);
        }
    }
    for label in kind.field_labels() {
        let answer = ask(label, prompt_symbol, input, output)?;
        if !answer.trim().is_empty() {
            draft = draft.field(label, &answer);
        }
    }
    Ok(draft)
}

fn ask<R: BufRead, W: Write>(
    label: &str,
    prompt_symbol: &str,
    input: &mut R,
    output: &mut W,
) -> AppResult<String> {
    writeln!(output, "{}:", label)?;
    let mut lines = Vec::new();
    loop {
        write!(output, "{}", prompt_symbol)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            break;
        }
        lines.push(line.to_string());
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_new_with_flags() {
        let args = CliArgs::parse_from(vec![
            "devjournal",
            "new",
            "--duration",
            "1h 30m",
            "--worked-on",
            "Setup",
            "--encrypt",
        ]);
        match args.command {
            Command::New(new) => {
                assert!(new.encrypt);
                let draft = new.to_draft();
                assert_eq!(draft.kind, EntryKind::CodingSession);
                assert_eq!(draft.duration.as_deref(), Some("1h 30m"));
                assert_eq!(
                    draft.fields,
                    vec![("Worked on".to_string(), "Setup".to_string())]
                );
            }
            other => panic!("Expected new, got {:?}", other),
        }
    }

    #[test]
    fn test_reflection_conflicts_with_session_fields() {
        let result =
            CliArgs::try_parse_from(vec!["devjournal", "new", "-r", "--worked-on", "code"]);
        assert!(result.is_err());

        let args = CliArgs::parse_from(vec!["devjournal", "new", "-r", "--mood", "calm"]);
        match args.command {
            Command::New(new) => {
                assert_eq!(new.kind(), EntryKind::PersonalReflection);
                assert_eq!(new.field_answers(), vec![("Mood", "calm")]);
            }
            other => panic!("Expected new, got {:?}", other),
        }
    }

    #[test]
    fn test_reflection_fields_require_reflection() {
        for flag in ["--mood", "--thoughts", "--gratitude", "--goals"] {
            let result = CliArgs::try_parse_from(vec!["devjournal", "new", flag, "calm"]);
            assert!(result.is_err(), "{} accepted without --reflection", flag);
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(vec![
            "devjournal",
            "stats",
            "--json",
            "--log-format",
            "json",
            "-v",
        ]);
        assert_eq!(args.command, Command::Stats { json: true });
        assert_eq!(args.log_format, LogFormat::Json);
        assert!(args.verbose);

        let args = CliArgs::parse_from(vec!["devjournal", "list"]);
        assert_eq!(args.log_format, LogFormat::Text);
        assert!(!args.verbose);
    }

    #[test]
    fn test_view_and_backup_args() {
        let args = CliArgs::parse_from(vec!["devjournal", "view", "01-05-2025", "--decrypt"]);
        assert_eq!(
            args.command,
            Command::View {
                key: "01-05-2025".to_string(),
                decrypt: true
            }
        );
        assert!(
            CliArgs::try_parse_from(vec!["devjournal", "backup", "--status", "--push"]).is_err()
        );
        assert!(CliArgs::try_parse_from(vec!["devjournal"]).is_err());
    }

    #[test]
    fn test_prompt_for_draft_reads_multiline_answers() {
        let mut input = Cursor::new("2h\n\nParser\nand tests\n\n\n\nLifetimes\n\n");
        let mut output = Vec::new();

        let draft =
            prompt_for_draft(EntryKind::CodingSession, "> ", &mut input, &mut output).unwrap();

        assert_eq!(draft.duration.as_deref(), Some("2h"));
        assert_eq!(
            draft.fields,
            vec![
                ("Worked on".to_string(), "Parser\nand tests".to_string()),
                ("Learned".to_string(), "Lifetimes".to_string()),
            ]
        );
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Worked on:\n> "));
        assert!(shown.contains("Next Steps:"));
    }
}
