use crate::speech::{EngineKind, Rate};
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "voicereader", version, about = "Read documents aloud")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Log debug detail to stderr and the log file
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSONL status events to stderr
    #[arg(long, global = true)]
    pub progress: bool,

    /// Print operator.json and exit
    #[arg(long)]
    pub describe: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract a document's text and speak it
    Read {
        /// Text, PDF or XLSX file
        #[arg(value_name = "FILE", required_unless_present = "from_history")]
        file: Option<PathBuf>,

        /// Re-open an entry from history (1 = most recent)
        #[arg(long, value_name = "N", conflicts_with = "file", value_parser = history_index())]
        from_history: Option<usize>,

        /// Speed multiplier, 0.5 to 3.0 (presets: 1.0, 1.2, 1.5, 2.0)
        #[arg(long, short, value_name = "RATE")]
        rate: Option<Rate>,

        /// Voice name or id passed to the engine
        #[arg(long)]
        voice: Option<String>,

        /// Speech engine (default: config, then platform detection)
        #[arg(long, value_enum)]
        engine: Option<EngineKind>,

        /// Do not record the document in history
        #[arg(long)]
        no_history: bool,

        /// Resolve everything but print the engine command instead of speaking
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a document's extracted text
    Extract {
        /// Text, PDF or XLSX file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print only the leading preview
        #[arg(long)]
        preview: bool,

        /// Emit a JSON object instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Inspect previously opened documents
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// List voices installed for a speech engine
    Voices {
        /// Speech engine (default: config, then platform detection)
        #[arg(long, value_enum)]
        engine: Option<EngineKind>,

        /// Emit JSONL instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the tail of the application log
    Log {
        /// Number of trailing lines to print
        #[arg(long, short = 'n', default_value_t = 50)]
        lines: usize,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List entries, most recent first
    List {
        /// Emit JSONL instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the most recent entry
    Last,
    /// Show one entry (1 = most recent)
    Show {
        #[arg(value_name = "N", value_parser = history_index())]
        index: usize,
    },
    /// Count entries
    Count,
    /// Remove every entry
    Clear,
}

/// History positions are 1-based.
fn history_index() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::<usize>::new().range(1..)
}
