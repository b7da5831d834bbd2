//! Command line configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mood-diary", version, about = "A terminal diary with a mood for every entry")]
pub struct Cli {
    /// Key-value file holding the diary
    #[arg(long, env = "MOOD_DIARY_STORAGE", default_value = "mood_diary.json")]
    pub storage: PathBuf,

    /// Log file; verbosity follows RUST_LOG
    #[arg(long, env = "MOOD_DIARY_LOG", default_value = "mood_diary.log")]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render all entries as an HTML page
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
