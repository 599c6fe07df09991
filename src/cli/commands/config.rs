//! glab config - Inspect configuration

use clap::{Args, Subcommand};
use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::emit_ok;
use crate::config::Config;
use crate::error::{GlabError, Result};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration (default)
    Show,

    /// Print the global config file path
    Path,
}

pub fn run(ctx: &AppContext, args: &ConfigArgs) -> Result<()> {
    match args.command.as_ref().unwrap_or(&ConfigCommand::Show) {
        ConfigCommand::Show => run_show(ctx),
        ConfigCommand::Path => run_path(ctx),
    }
}

fn run_show(ctx: &AppContext) -> Result<()> {
    if ctx.json {
        return emit_ok(json!({
            "store_path": ctx.store_path,
            "config": ctx.config,
        }));
    }

    let rendered = toml::to_string_pretty(&ctx.config)
        .map_err(|err| GlabError::Config(format!("render config: {err}")))?;
    println!("# store: {}", ctx.store_path.display());
    println!("{rendered}");
    Ok(())
}

fn run_path(ctx: &AppContext) -> Result<()> {
    let global = Config::global_path();
    if ctx.json {
        return emit_ok(json!({ "global_config": global }));
    }
    match global {
        Some(path) => println!("{}", path.display()),
        None => println!("No config directory on this platform"),
    }
    Ok(())
}
