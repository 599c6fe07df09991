//! glab set - Store a JSON value as a record

use std::time::Duration;

use clap::Args;
use serde_json::{Value, json};

use crate::app::AppContext;
use crate::cli::output::emit_ok;
use crate::error::{GlabError, Result};

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Storage key
    pub key: String,

    /// JSON payload
    pub value: String,

    /// Record version (default from config)
    #[arg(long)]
    pub version: Option<String>,

    /// Expire the record after this many seconds (default from config)
    #[arg(long, value_name = "SECS")]
    pub ttl_secs: Option<u64>,
}

pub fn run(ctx: &AppContext, args: &SetArgs) -> Result<()> {
    let data: Value = serde_json::from_str(&args.value)
        .map_err(|err| GlabError::InvalidInput(format!("value is not JSON: {err}")))?;

    let mut options = ctx.config.persistence.save_options();
    if let Some(version) = &args.version {
        options.version.clone_from(version);
    }
    if let Some(secs) = args.ttl_secs {
        options = options.with_ttl(Duration::from_secs(secs));
    }
    ctx.manager.save(&args.key, &data, &options)?;

    if ctx.json {
        return emit_ok(json!({
            "key": args.key,
            "version": options.version,
            "ttl_secs": options.ttl.map(|ttl| ttl.as_secs()),
        }));
    }
    println!("Stored {} (version {})", args.key, options.version);
    Ok(())
}
