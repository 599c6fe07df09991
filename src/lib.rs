//! grammarlab - local persistence and backend access for compiler-construction
//! analyses.
//!
//! The [`persistence`] layer stores versioned, checksummed records in a
//! [`storage::KeyValueStore`]; [`state`] binds serde types to it; [`session`]
//! builds the LL(1), LR(0), SLR(1) and regex workflows on top, talking to the
//! analysis service through [`backend`].

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod persistence;
pub mod session;
pub mod state;
pub mod storage;

#[cfg(test)]
pub mod test_utils;

pub use error::{GlabError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
