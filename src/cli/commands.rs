use booklens::refine::SummaryField;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `booklens` - layered AI analysis of long-form books.
#[derive(Parser, Debug)]
#[command(name = "booklens")]
#[command(version = "0.1.0")]
#[command(
    about = "Summarize a book section by section, then refine the analysis with replayable history.",
    long_about = None
)]
pub struct Cli {
    /// Config file (default: ~/.booklens/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a book (markdown or JSON sections) and start a fresh history
    Summarize {
        /// Path to the book
        book: PathBuf,

        /// History file to write (default: history.path from config)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Sections in flight at once
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Skip the moderation check
        #[arg(long)]
        no_moderation: bool,
    },

    /// Rewrite one field of the analysis from an instruction
    Refine {
        /// summary, writingStyle, quality, keywords, genres, marketingCopy, comparableAuthors
        #[arg(value_parser = parse_field)]
        field: SummaryField,

        /// Free-text edit instruction
        instruction: String,

        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Revert the most recent refinement
    Undo {
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Rebuild the analysis as of a logged refinement
    Revert {
        /// Timestamp of the entry to keep as the newest
        timestamp: i64,

        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Discard every refinement
    Reset {
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// List logged refinements
    History {
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Print the current analysis as JSON
    Show {
        #[arg(long)]
        history: Option<PathBuf>,
    },
}

fn parse_field(raw: &str) -> Result<SummaryField, String> {
    raw.parse().map_err(|_| {
        format!(
            "unknown field '{raw}' (expected summary, writingStyle, quality, keywords, genres, marketingCopy or comparableAuthors)"
        )
    })
}
