//! glab import - Import records from an export file

use std::path::PathBuf;

use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::emit_ok;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Export file produced by `glab export`
    pub file: PathBuf,
}

pub fn run(ctx: &AppContext, args: &ImportArgs) -> Result<()> {
    let payload = std::fs::read_to_string(&args.file)?;
    let imported = ctx.manager.import_data(&payload)?;

    if ctx.json {
        return emit_ok(json!({ "imported": imported }));
    }
    println!("Imported {imported} keys from {}", args.file.display());
    Ok(())
}
