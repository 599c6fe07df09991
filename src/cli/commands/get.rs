//! glab get - Show one stored record

use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_ok};
use crate::error::{GlabError, Result};
use crate::persistence::LoadOutcome;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Storage key, e.g. store_ll1_store
    pub key: String,

    /// Expected record version; older records are migrated
    #[arg(long)]
    pub version: Option<String>,

    /// Print the stored text without validation
    #[arg(long)]
    pub raw: bool,
}

pub fn run(ctx: &AppContext, args: &GetArgs) -> Result<()> {
    if args.raw {
        let raw = ctx
            .manager
            .raw(&args.key)?
            .ok_or_else(|| GlabError::NotFound(args.key.clone()))?;
        if ctx.json {
            return emit_ok(json!({ "key": args.key, "raw": raw }));
        }
        println!("{raw}");
        return Ok(());
    }

    let outcome = ctx.manager.load_outcome(&args.key, args.version.as_deref());
    if matches!(outcome, LoadOutcome::Missing) {
        return Err(GlabError::NotFound(args.key.clone()));
    }

    if ctx.json {
        return emit_ok(json!({ "key": args.key, "result": outcome }));
    }

    let mut layout = HumanLayout::new();
    layout.title(&args.key).kv("Outcome", outcome.label());
    if let LoadOutcome::Loaded {
        data,
        version,
        migrated_from,
    } = &outcome
    {
        layout.kv("Version", version);
        if let Some(from) = migrated_from {
            layout.kv("Migrated from", from);
        }
        layout.section("Data").push_line(serde_json::to_string_pretty(data)?);
    }
    emit_human(layout);
    Ok(())
}
