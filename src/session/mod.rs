//! Per-analysis session state, persisted through [`crate::state`] bindings.

pub mod app_state;
pub mod automaton;
pub mod grammar;

pub use app_state::{AnalysisKind, AnalysisLogEntry, AppState};
pub use automaton::{AutomatonDraft, AutomatonSession};
pub use grammar::{GrammarDraft, GrammarSession, session_save_options};
