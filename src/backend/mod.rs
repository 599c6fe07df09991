//! Client for the grammar and automaton analysis service.

pub mod client;
pub mod types;

pub use client::BackendClient;
pub use types::{
    Envelope, FaAnalysis, FaView, GrammarAnalysis, GrammarKind, InputTrace, Ll1Analysis,
    LrAnalysis,
};
