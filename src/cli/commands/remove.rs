//! glab remove - Remove one stored key

use clap::Args;
use serde_json::json;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::emit_ok;
use crate::error::{GlabError, Result};

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Storage key to remove
    pub key: String,

    /// Succeed even when the key does not exist
    #[arg(long)]
    pub force: bool,
}

pub fn run(ctx: &AppContext, args: &RemoveArgs) -> Result<()> {
    let existed = ctx.manager.raw(&args.key)?.is_some();
    if !existed && !args.force {
        return Err(GlabError::NotFound(args.key.clone()));
    }
    ctx.manager.remove(&args.key)?;
    info!(key = %args.key, existed, "removed key");

    if ctx.json {
        return emit_ok(json!({ "key": args.key, "removed": existed }));
    }
    if existed {
        println!("Removed {}", args.key);
    } else {
        println!("{} was not stored", args.key);
    }
    Ok(())
}
