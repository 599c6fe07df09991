//! glab session - Inspect and edit persisted sessions

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde_json::json;

use crate::app::AppContext;
use crate::backend::GrammarKind;
use crate::cli::output::{HumanLayout, emit_human, emit_ok, format_millis};
use crate::error::{GlabError, Result};
use crate::session::{AnalysisKind, AutomatonSession, GrammarSession};
use crate::state::HistoryMeta;

#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Show the stored draft of a session
    Show(KindArg),

    /// List analysis history entries
    History(KindArg),

    /// Replace the draft with a history entry
    Restore(RestoreArgs),

    /// Add one production to a grammar draft
    Add(AddArgs),

    /// Remove the production at a zero-based index
    Drop(DropArgs),

    /// Reset a session to an empty draft
    Reset(KindArg),

    /// Manage named grammar configs
    Configs(ConfigsArgs),
}

#[derive(Args, Debug)]
pub struct KindArg {
    #[arg(value_enum)]
    pub kind: AnalysisKind,
}

#[derive(Args, Debug)]
pub struct RestoreArgs {
    #[arg(value_enum)]
    pub kind: GrammarKind,

    /// History entry id
    pub id: String,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(value_enum)]
    pub kind: GrammarKind,

    pub production: String,
}

#[derive(Args, Debug)]
pub struct DropArgs {
    #[arg(value_enum)]
    pub kind: GrammarKind,

    pub index: usize,
}

#[derive(Args, Debug)]
pub struct ConfigsArgs {
    #[arg(value_enum)]
    pub kind: GrammarKind,

    #[command(subcommand)]
    pub command: Option<ConfigsCommand>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigsCommand {
    /// List saved configs (default)
    List,

    /// Save the current draft under a name
    Save {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },

    /// Replace the draft with a saved config
    Load { name: String },

    /// Delete a saved config
    Delete { name: String },
}

pub fn run(ctx: &AppContext, args: &SessionArgs) -> Result<()> {
    match &args.command {
        SessionCommand::Show(arg) => run_show(ctx, arg.kind),
        SessionCommand::History(arg) => run_history(ctx, arg.kind),
        SessionCommand::Restore(args) => run_restore(ctx, args),
        SessionCommand::Add(args) => run_add(ctx, args),
        SessionCommand::Drop(args) => run_drop(ctx, args),
        SessionCommand::Reset(arg) => run_reset(ctx, arg.kind),
        SessionCommand::Configs(args) => run_configs(ctx, args),
    }
}

fn grammar_kind(kind: AnalysisKind) -> Option<GrammarKind> {
    match kind {
        AnalysisKind::Ll1 => Some(GrammarKind::Ll1),
        AnalysisKind::Lr0 => Some(GrammarKind::Lr0),
        AnalysisKind::Slr1 => Some(GrammarKind::Slr1),
        AnalysisKind::Fa => None,
    }
}

fn open_grammar(ctx: &AppContext, kind: GrammarKind) -> GrammarSession {
    GrammarSession::open_with(Arc::clone(&ctx.manager), kind, ctx.session_options())
}

fn run_show(ctx: &AppContext, kind: AnalysisKind) -> Result<()> {
    let Some(grammar) = grammar_kind(kind) else {
        let session = AutomatonSession::open_with(Arc::clone(&ctx.manager), ctx.session_options());
        if ctx.json {
            return emit_ok(json!({
                "key": session.storage_key(),
                "input_regex": session.input_regex(),
            }));
        }
        let mut layout = HumanLayout::new();
        layout
            .title(kind.label())
            .kv("Key", session.storage_key())
            .kv("Regex", session.input_regex());
        emit_human(layout);
        return Ok(());
    };

    let session = open_grammar(ctx, grammar);
    if ctx.json {
        return emit_ok(json!({
            "key": session.storage_key(),
            "draft": session.draft(),
        }));
    }
    let mut layout = HumanLayout::new();
    layout
        .title(kind.label())
        .kv("Key", session.storage_key())
        .kv("Input", session.input_string());
    layout.section("Productions");
    if session.productions().is_empty() {
        layout.push_line("(none)");
    }
    for (index, production) in session.productions().iter().enumerate() {
        layout.push_line(format!("{index:>3}  {production}"));
    }
    emit_human(layout);
    Ok(())
}

fn emit_history(ctx: &AppContext, title: &str, entries: &[HistoryMeta]) -> Result<()> {
    if ctx.json {
        return emit_ok(json!({ "entries": entries }));
    }
    let mut layout = HumanLayout::new();
    layout.title(title);
    if entries.is_empty() {
        layout.push_line("No history yet.");
    }
    for entry in entries {
        let description = entry.description.as_deref().unwrap_or("");
        layout.bullet(&format!(
            "{} {} {description}",
            entry.id,
            format_millis(entry.timestamp)
        ));
    }
    emit_human(layout);
    Ok(())
}

fn run_history(ctx: &AppContext, kind: AnalysisKind) -> Result<()> {
    let title = format!("{} history", kind.label());
    let entries = match grammar_kind(kind) {
        Some(grammar) => open_grammar(ctx, grammar).history_entries(),
        None => AutomatonSession::open_with(Arc::clone(&ctx.manager), ctx.session_options()).history_entries(),
    };
    emit_history(ctx, &title, &entries)
}

fn run_restore(ctx: &AppContext, args: &RestoreArgs) -> Result<()> {
    let mut session = open_grammar(ctx, args.kind);
    if !session.restore_history(&args.id) {
        return Err(GlabError::NotFound(format!("history entry {}", args.id)));
    }
    session.save_now()?;
    if ctx.json {
        return emit_ok(json!({ "restored": args.id, "draft": session.draft() }));
    }
    println!("Restored {} ({} productions)", args.id, session.productions().len());
    Ok(())
}

fn run_add(ctx: &AppContext, args: &AddArgs) -> Result<()> {
    let mut session = open_grammar(ctx, args.kind);
    let added = session.add_production(&args.production);
    session.save_now()?;
    if ctx.json {
        return emit_ok(json!({ "added": added, "productions": session.productions() }));
    }
    if added {
        println!("Added {}", args.production.trim());
    } else {
        println!("Skipped blank or duplicate production");
    }
    Ok(())
}

fn run_drop(ctx: &AppContext, args: &DropArgs) -> Result<()> {
    let mut session = open_grammar(ctx, args.kind);
    if !session.remove_production(args.index) {
        return Err(GlabError::InvalidInput(format!(
            "no production at index {} ({} stored)",
            args.index,
            session.productions().len()
        )));
    }
    session.save_now()?;
    if ctx.json {
        return emit_ok(json!({ "productions": session.productions() }));
    }
    println!("Removed production {}", args.index);
    Ok(())
}

fn run_reset(ctx: &AppContext, kind: AnalysisKind) -> Result<()> {
    match grammar_kind(kind) {
        Some(grammar) => {
            let mut session = open_grammar(ctx, grammar);
            session.reset_all();
            session.save_now()?;
        }
        None => {
            let mut session = AutomatonSession::open_with(Arc::clone(&ctx.manager), ctx.session_options());
            session.reset_all();
        }
    }
    if ctx.json {
        return emit_ok(json!({ "reset": kind }));
    }
    println!("Reset {} session", kind.label());
    Ok(())
}

fn run_configs(ctx: &AppContext, args: &ConfigsArgs) -> Result<()> {
    let mut session = open_grammar(ctx, args.kind);
    match args.command.as_ref().unwrap_or(&ConfigsCommand::List) {
        ConfigsCommand::List => {
            let configs = session.configs();
            if ctx.json {
                return emit_ok(json!({ "configs": configs }));
            }
            let mut layout = HumanLayout::new();
            layout.title(&format!("{} configs", args.kind.label()));
            if configs.is_empty() {
                layout.push_line("No saved configs.");
            }
            for config in &configs {
                let description = config.description.as_deref().unwrap_or("");
                layout.bullet(&format!(
                    "{} {} {description}",
                    config.name,
                    format_millis(config.timestamp)
                ));
            }
            emit_human(layout);
        }
        ConfigsCommand::Save { name, description } => {
            session.save_config(name, description.as_deref())?;
            if ctx.json {
                return emit_ok(json!({ "saved": name }));
            }
            println!("Saved config {name}");
        }
        ConfigsCommand::Load { name } => {
            if !session.load_config(name) {
                return Err(GlabError::NotFound(format!("config {name}")));
            }
            session.save_now()?;
            if ctx.json {
                return emit_ok(json!({ "loaded": name, "draft": session.draft() }));
            }
            println!("Loaded config {name}");
        }
        ConfigsCommand::Delete { name } => {
            session.delete_config(name)?;
            if ctx.json {
                return emit_ok(json!({ "deleted": name }));
            }
            println!("Deleted config {name}");
        }
    }
    Ok(())
}
