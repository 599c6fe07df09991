//! Application-wide state: the active analysis and a log of runs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend::GrammarKind;
use crate::error::Result;
use crate::persistence::{PersistenceManager, SaveOptions, now_millis};
use crate::state::{BindingOptions, StateBinding};

pub const ANALYSIS_LOG_LIMIT: usize = 100;
pub const RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    #[default]
    Ll1,
    Lr0,
    Slr1,
    Fa,
}

impl AnalysisKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ll1 => "LL(1) parsing",
            Self::Lr0 => "LR(0) parsing",
            Self::Slr1 => "SLR(1) parsing",
            Self::Fa => "finite automata",
        }
    }
}

impl From<GrammarKind> for AnalysisKind {
    fn from(kind: GrammarKind) -> Self {
        match kind {
            GrammarKind::Ll1 => Self::Ll1,
            GrammarKind::Lr0 => Self::Lr0,
            GrammarKind::Slr1 => Self::Slr1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisLogEntry {
    pub kind: AnalysisKind,
    pub timestamp: i64,
    pub input: String,
    pub success: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppStateData {
    pub current: AnalysisKind,
    /// Newest first.
    pub log: Vec<AnalysisLogEntry>,
}

/// Persisted under `store_app`; every change is written immediately.
#[derive(Debug)]
pub struct AppState {
    data: AppStateData,
    binding: StateBinding,
}

impl AppState {
    pub fn open(manager: Arc<PersistenceManager>) -> Self {
        let options = BindingOptions::default()
            .auto_save(false)
            .save_options(SaveOptions::default());
        let binding = StateBinding::new(manager, "app", options);
        let mut data = AppStateData::default();
        binding.load_into(&mut data);
        Self { data, binding }
    }

    #[must_use]
    pub const fn current(&self) -> AnalysisKind {
        self.data.current
    }

    #[must_use]
    pub fn log(&self) -> &[AnalysisLogEntry] {
        &self.data.log
    }

    #[must_use]
    pub fn recent(&self) -> &[AnalysisLogEntry] {
        &self.data.log[..self.data.log.len().min(RECENT_LIMIT)]
    }

    fn persist(&self) -> Result<()> {
        self.binding.save(&self.data).inspect_err(|err| {
            warn!(error = %err, "failed to persist app state");
        })
    }

    pub fn set_current(&mut self, kind: AnalysisKind) -> Result<()> {
        self.data.current = kind;
        self.persist()
    }

    /// Prepend a run to the log, keeping the newest [`ANALYSIS_LOG_LIMIT`].
    pub fn record(&mut self, kind: AnalysisKind, input: &str, success: bool) -> Result<()> {
        self.data.log.insert(
            0,
            AnalysisLogEntry {
                kind,
                timestamp: now_millis(),
                input: input.to_string(),
                success,
            },
        );
        self.data.log.truncate(ANALYSIS_LOG_LIMIT);
        self.persist()
    }

    pub fn clear_log(&mut self) -> Result<()> {
        self.data.log.clear();
        self.persist()
    }
}
