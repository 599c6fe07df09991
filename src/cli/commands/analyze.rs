//! glab analyze - Run a grammar analysis against the backend
//!
//! Productions and the input string default to what the session last stored,
//! so repeated runs only need the parts that changed.

use std::sync::Arc;

use clap::Args;
use serde_json::json;

use crate::app::AppContext;
use crate::backend::{GrammarAnalysis, GrammarKind, InputTrace};
use crate::cli::output::{HumanLayout, emit_human, emit_ok};
use crate::error::Result;
use crate::session::{AppState, GrammarSession};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Grammar class to analyse
    #[arg(value_enum)]
    pub kind: GrammarKind,

    /// Production such as `E->TA` (repeatable; replaces the stored ones)
    #[arg(long = "production", short = 'p', value_name = "PRODUCTION")]
    pub productions: Vec<String>,

    /// Input string to trace after the analysis
    #[arg(long, short)]
    pub input: Option<String>,

    /// Save the productions as a named config afterwards
    #[arg(long, value_name = "NAME")]
    pub save_as: Option<String>,
}

pub fn run(ctx: &AppContext, args: &AnalyzeArgs) -> Result<()> {
    let client = ctx.backend()?;
    let mut session = GrammarSession::open_with(Arc::clone(&ctx.manager), args.kind, ctx.session_options());
    let mut app = AppState::open(Arc::clone(&ctx.manager));
    app.set_current(args.kind.into())?;

    if !args.productions.is_empty() {
        session.set_productions(args.productions.iter().cloned());
    }
    if let Some(input) = &args.input {
        session.set_input_string(input);
    }
    let summary = session.productions().join(", ");

    let analysis = match session.analyze(&client) {
        Ok(analysis) => analysis.clone(),
        Err(err) => {
            app.record(args.kind.into(), &summary, false)?;
            return Err(err);
        }
    };

    let trace = if session.input_string().trim().is_empty() {
        None
    } else {
        match session.analyze_input(&client) {
            Ok(trace) => Some(trace.clone()),
            Err(err) => {
                app.record(args.kind.into(), &summary, false)?;
                return Err(err);
            }
        }
    };
    app.record(args.kind.into(), &summary, true)?;

    if let Some(name) = &args.save_as {
        session.save_config(name, Some(summary.as_str()))?;
    }
    session.save_now()?;

    if ctx.json {
        return emit_ok(json!({
            "productions": session.productions(),
            "input": session.input_string(),
            "analysis": analysis,
            "trace": trace,
        }));
    }

    emit_human(render(&session, &analysis, trace.as_ref()));
    Ok(())
}

fn render(session: &GrammarSession, analysis: &GrammarAnalysis, trace: Option<&InputTrace>) -> HumanLayout {
    let kind = session.kind();
    let mut layout = HumanLayout::new();
    layout.title(&format!("{} analysis", kind.label()));
    for production in session.productions() {
        layout.bullet(production);
    }
    layout.section("Result").kv("Start symbol", analysis.start_symbol());
    let verdict = match analysis.accepted() {
        Some(true) => format!("grammar is {}", kind.label()),
        Some(false) => format!("grammar is not {}", kind.label()),
        None => "not reported".to_string(),
    };
    layout.kv("Verdict", &verdict);

    match analysis {
        GrammarAnalysis::Ll1(result) => {
            layout
                .kv("Nonterminals", &result.nonterminals.join(" "))
                .kv("Terminals", &result.terminals.join(" "));
            layout.section("FIRST");
            for (symbol, set) in &result.first {
                layout.kv(symbol, &set.join(" "));
            }
            layout.section("FOLLOW");
            for (symbol, set) in &result.follow {
                layout.kv(symbol, &set.join(" "));
            }
            if !result.table.is_empty() {
                layout.section("Parse table");
                for (cell, production) in &result.table {
                    layout.kv(cell, production);
                }
            }
        }
        GrammarAnalysis::Lr0(result) | GrammarAnalysis::Slr1(result) => {
            layout
                .kv("Nonterminals", &result.nonterminals.join(" "))
                .kv("Terminals", &result.terminals.join(" "))
                .kv("Item sets", &result.all_dfa.len().to_string());
            if !result.actions.is_empty() {
                layout.section("ACTION");
                for (cell, action) in &result.actions {
                    layout.kv(cell, action);
                }
            }
            if !result.gotos.is_empty() {
                layout.section("GOTO");
                for (cell, target) in &result.gotos {
                    layout.kv(cell, target);
                }
            }
        }
    }

    if let Some(trace) = trace {
        layout
            .section(&format!("Input {}", session.input_string()))
            .kv("Result", &trace.info_res)
            .kv("Steps", &trace.steps().to_string());
        for message in &trace.info_msg {
            layout.bullet(message);
        }
    }
    layout
}
