//! glab clear - Remove every stored key

use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::emit_ok;
use crate::error::{GlabError, Result};

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Approve the clear (required for destructive operation)
    #[arg(long)]
    pub approve: bool,
}

pub fn run(ctx: &AppContext, args: &ClearArgs) -> Result<()> {
    let keys = ctx.manager.keys()?;
    if !args.approve {
        return Err(GlabError::ApprovalRequired(format!(
            "clearing {} stored keys requires --approve",
            keys.len()
        )));
    }
    ctx.manager.clear()?;

    if ctx.json {
        return emit_ok(json!({ "cleared": keys.len() }));
    }
    println!("Cleared {} keys", keys.len());
    Ok(())
}
