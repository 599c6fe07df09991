//! glab log - Recent analysis runs

use std::sync::Arc;

use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_ok, format_millis};
use crate::error::Result;
use crate::session::AppState;

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Show the whole log instead of the most recent runs
    #[arg(long)]
    pub all: bool,

    /// Clear the log
    #[arg(long, conflicts_with = "all")]
    pub clear: bool,
}

pub fn run(ctx: &AppContext, args: &LogArgs) -> Result<()> {
    let mut app = AppState::open(Arc::clone(&ctx.manager));
    if args.clear {
        app.clear_log()?;
        if ctx.json {
            return emit_ok(json!({ "cleared": true }));
        }
        println!("Analysis log cleared");
        return Ok(());
    }

    let entries = if args.all { app.log() } else { app.recent() };
    if ctx.json {
        return emit_ok(json!({ "current": app.current(), "entries": entries }));
    }

    let mut layout = HumanLayout::new();
    layout.title("Analysis log").kv("Current", app.current().label());
    if entries.is_empty() {
        layout.push_line("No analyses recorded.");
    }
    for entry in entries {
        let status = if entry.success { "ok" } else { "failed" };
        layout.bullet(&format!(
            "{} [{}] {status}: {}",
            format_millis(entry.timestamp),
            entry.kind.label(),
            entry.input
        ));
    }
    emit_human(layout);
    Ok(())
}
