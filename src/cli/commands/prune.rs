//! glab prune - Evict expired records

use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::emit_ok;
use crate::error::Result;

pub fn run(ctx: &AppContext) -> Result<()> {
    let removed = ctx.manager.cleanup_expired();
    if ctx.json {
        return emit_ok(json!({ "removed": removed }));
    }
    if removed == 0 {
        println!("No expired records.");
    } else {
        println!("Removed {removed} expired records");
    }
    Ok(())
}
