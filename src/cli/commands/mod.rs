//! Command handlers.

pub mod analyze;
pub mod clear;
pub mod config;
pub mod export;
pub mod get;
pub mod import;
pub mod log;
pub mod ping;
pub mod prune;
pub mod regex;
pub mod remove;
pub mod session;
pub mod set;
pub mod stats;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Analyze(args) => analyze::run(ctx, args),
        Commands::Regex(args) => regex::run(ctx, args),
        Commands::Session(args) => session::run(ctx, args),
        Commands::Log(args) => log::run(ctx, args),
        Commands::Stats(args) => stats::run(ctx, args),
        Commands::Get(args) => get::run(ctx, args),
        Commands::Set(args) => set::run(ctx, args),
        Commands::Remove(args) => remove::run(ctx, args),
        Commands::Clear(args) => clear::run(ctx, args),
        Commands::Prune => prune::run(ctx),
        Commands::Export(args) => export::run(ctx, args),
        Commands::Import(args) => import::run(ctx, args),
        Commands::Ping => ping::run(ctx),
        Commands::Config(args) => config::run(ctx, args),
    }
}
