//! glab ping - Check backend reachability

use serde_json::json;

use crate::app::AppContext;
use crate::cli::output::emit_ok;
use crate::error::Result;

pub fn run(ctx: &AppContext) -> Result<()> {
    let client = ctx.backend()?;
    let data = client.ping()?;

    if ctx.json {
        return emit_ok(json!({ "base_url": client.base_url(), "data": data }));
    }
    println!("Backend at {} is reachable", client.base_url());
    if let Some(data) = data {
        println!("{data}");
    }
    Ok(())
}
