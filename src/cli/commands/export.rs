//! glab export - Export stored records as JSON

use std::path::PathBuf;

use clap::Args;
use serde_json::json;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::emit_ok;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Only export these keys (repeatable)
    #[arg(long = "key", value_name = "KEY")]
    pub keys: Vec<String>,

    /// Write to this file instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

pub fn run(ctx: &AppContext, args: &ExportArgs) -> Result<()> {
    let keys = (!args.keys.is_empty()).then_some(args.keys.as_slice());
    let payload = ctx.manager.export_data(keys)?;

    let Some(path) = &args.out else {
        println!("{payload}");
        return Ok(());
    };

    std::fs::write(path, &payload)?;
    info!(path = %path.display(), bytes = payload.len(), "export written");
    if ctx.json {
        return emit_ok(json!({ "path": path, "bytes": payload.len() }));
    }
    println!("Exported to {}", path.display());
    Ok(())
}
