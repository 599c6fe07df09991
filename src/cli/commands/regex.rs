//! glab regex - Convert a regular expression to automata

use std::sync::Arc;

use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::backend::FaView;
use crate::cli::output::{HumanLayout, emit_human, emit_ok};
use crate::error::Result;
use crate::session::{AnalysisKind, AppState, AutomatonSession};

#[derive(Args, Debug)]
pub struct RegexArgs {
    /// Regular expression; defaults to the stored one
    pub regex: Option<String>,

    /// Automaton to print
    #[arg(long, value_enum, default_value = "min-dfa")]
    pub view: FaView,

    /// Print only the Graphviz source of the chosen automaton
    #[arg(long)]
    pub dot: bool,
}

pub fn run(ctx: &AppContext, args: &RegexArgs) -> Result<()> {
    let client = ctx.backend()?;
    let mut session = AutomatonSession::open_with(Arc::clone(&ctx.manager), ctx.session_options());
    let mut app = AppState::open(Arc::clone(&ctx.manager));
    app.set_current(AnalysisKind::Fa)?;

    if let Some(regex) = &args.regex {
        session.set_regex(regex);
    }
    let regex = session.input_regex().to_string();

    if let Err(err) = session.analyze(&client) {
        app.record(AnalysisKind::Fa, &regex, false)?;
        return Err(err);
    }
    app.record(AnalysisKind::Fa, &regex, true)?;

    if args.dot {
        println!("{}", session.dot(args.view));
        return Ok(());
    }

    if ctx.json {
        return emit_ok(json!({
            "regex": regex,
            "result": session.result(),
        }));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Regex {regex}"));
    if let Some(table) = session.table(args.view) {
        layout.section("Table").push_line(serde_json::to_string_pretty(table)?);
    }
    layout.section("Graphviz").push_line(session.dot(args.view));
    emit_human(layout);
    Ok(())
}
