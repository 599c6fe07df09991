//! glab stats - Storage usage

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_ok, format_millis};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Show at most N of the largest keys
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

pub fn run(ctx: &AppContext, args: &StatsArgs) -> Result<()> {
    let mut stats = ctx.manager.storage_stats();
    stats.items.truncate(args.top);

    if ctx.json {
        return emit_ok(&stats);
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Storage")
        .kv("Store", &ctx.store_path.display().to_string())
        .kv("Available", if ctx.manager.is_available() { "yes" } else { "no" })
        .kv("Keys", &stats.total_keys.to_string())
        .kv("Used bytes", &stats.used_bytes.to_string())
        .kv("Capacity bytes", &stats.capacity_bytes.to_string())
        .kv("Free bytes", &stats.available_bytes.to_string())
        .kv("Usage", &format!("{:.1}%", stats.usage_ratio() * 100.0));

    if !stats.items.is_empty() {
        layout.section("Largest keys");
        for item in &stats.items {
            let when = item.timestamp.map(format_millis).unwrap_or_default();
            layout.bullet(&format!("{} ({} bytes) {when}", item.key, item.size));
        }
    }
    emit_human(layout);
    Ok(())
}
