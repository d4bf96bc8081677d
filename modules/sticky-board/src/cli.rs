use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use sticky_types::NoteId;
use sticky_types::serde_helpers::{parse_date, parse_time};

use sticky_board::config::env_vars;

#[derive(Clone, Debug, Parser)]
#[command(version, author, about)]
pub struct CliConfig {
    /// Notes server base URL; local storage is used when unset
    #[arg(long, global = true, env = env_vars::API_URL)]
    pub api_url: Option<String>,

    /// Directory holding the local notes file
    #[arg(long, global = true, env = env_vars::DATA_DIR)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Show notes in board order
    List {
        /// Only notes whose text contains this (case-insensitive)
        #[arg(long, short, default_value = "")]
        search: String,
    },
    /// Create a note
    Add {
        text: String,
        #[arg(long, value_parser = date_arg)]
        due: Option<NaiveDate>,
        #[arg(long, value_parser = time_arg)]
        reminder: Option<NaiveTime>,
    },
    /// Change fields of an existing note
    Edit(EditArgs),
    Pin {
        #[arg(value_parser = id_arg)]
        id: NoteId,
    },
    Unpin {
        #[arg(value_parser = id_arg)]
        id: NoteId,
    },
    /// Delete a note (asks for confirmation unless --yes)
    Delete {
        #[arg(value_parser = id_arg)]
        id: NoteId,
        #[arg(long, short, default_value_t = false)]
        yes: bool,
    },
    /// Write all notes to a dated JSON file
    Export {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Load notes from a JSON file (merge by default)
    Import {
        file: PathBuf,
        /// Discard existing notes instead of merging
        #[arg(long, default_value_t = false)]
        replace: bool,
    },
}

#[derive(Clone, Debug, Args)]
pub struct EditArgs {
    #[arg(value_parser = id_arg)]
    pub id: NoteId,
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long, value_parser = date_arg, conflicts_with = "clear_due")]
    pub due: Option<NaiveDate>,
    #[arg(long, default_value_t = false)]
    pub clear_due: bool,
    #[arg(long, value_parser = time_arg, conflicts_with = "clear_reminder")]
    pub reminder: Option<NaiveTime>,
    #[arg(long, default_value_t = false)]
    pub clear_reminder: bool,
}

fn date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("expected YYYY-MM-DD, got '{}'", raw))
}

fn time_arg(raw: &str) -> Result<NaiveTime, String> {
    parse_time(raw).ok_or_else(|| format!("expected HH:MM, got '{}'", raw))
}

fn id_arg(raw: &str) -> Result<NoteId, String> {
    match raw.trim() {
        "" => Err("note id cannot be empty".to_string()),
        trimmed => trimmed.parse().map_err(|e| format!("{:?}", e)),
    }
}
