//! Command-line interface definitions.
//!
//! Uses clap v4 derive macros; handlers live in [`commands`].

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;
pub mod output;

/// Grammar lab - persisted sessions for LL(1), LR(0), SLR(1) and regex analyses
#[derive(Parser, Debug)]
#[command(name = "glab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Emit JSON on stdout and JSON logs on stderr
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ~/.config/glab/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store database path, overriding the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a grammar analysis against the backend
    Analyze(commands::analyze::AnalyzeArgs),

    /// Convert a regular expression to automata
    Regex(commands::regex::RegexArgs),

    /// Inspect and edit persisted sessions
    Session(commands::session::SessionArgs),

    /// Show recent analysis runs
    Log(commands::log::LogArgs),

    /// Show storage usage
    Stats(commands::stats::StatsArgs),

    /// Show one stored record
    #[command(disable_version_flag = true)]
    Get(commands::get::GetArgs),

    /// Store a JSON value as a record
    #[command(disable_version_flag = true)]
    Set(commands::set::SetArgs),

    /// Remove one stored key
    Remove(commands::remove::RemoveArgs),

    /// Remove every stored key
    Clear(commands::clear::ClearArgs),

    /// Evict expired records
    Prune,

    /// Export stored records as JSON
    Export(commands::export::ExportArgs),

    /// Import records from an export file
    Import(commands::import::ImportArgs),

    /// Check that the backend is reachable
    Ping,

    /// Inspect configuration
    Config(commands::config::ConfigArgs),
}
