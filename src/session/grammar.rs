//! Grammar analysis sessions (LL(1), LR(0), SLR(1)).

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{BackendClient, GrammarAnalysis, GrammarKind, InputTrace};
use crate::error::{GlabError, Result};
use crate::persistence::{PersistenceManager, SaveOptions};
use crate::state::{BindingOptions, ConfigMeta, ConfigSlots, History, HistoryMeta, StateBinding};

pub const SESSION_VERSION: &str = "1.0.0";
pub const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub const SESSION_SAVE_DELAY: Duration = Duration::from_millis(500);
pub const SESSION_HISTORY_LIMIT: usize = 10;

/// Save options shared by every analysis session.
#[must_use]
pub fn session_save_options() -> SaveOptions {
    SaveOptions::new(SESSION_VERSION)
        .with_ttl(SESSION_TTL)
        .with_save_delay(SESSION_SAVE_DELAY)
}

/// The persisted part of a grammar session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarDraft {
    pub productions: Vec<String>,
    pub input_string: String,
}

/// Editing and analysis state for one grammar kind.
///
/// Every mutation of the draft is persisted through a debounced save;
/// [`GrammarSession::open`] restores the last draft.
#[derive(Debug)]
pub struct GrammarSession {
    kind: GrammarKind,
    draft: GrammarDraft,
    analysis: Option<GrammarAnalysis>,
    trace: Option<InputTrace>,
    last_error: Option<String>,
    binding: StateBinding,
    history: History,
    configs: ConfigSlots,
}

impl GrammarSession {
    pub fn open(manager: Arc<PersistenceManager>, kind: GrammarKind) -> Self {
        Self::open_with(manager, kind, session_save_options())
    }

    pub fn open_with(manager: Arc<PersistenceManager>, kind: GrammarKind, save: SaveOptions) -> Self {
        let options = BindingOptions::default()
            .include(["productions", "input_string"])
            .save_options(save);
        let binding = StateBinding::new(Arc::clone(&manager), &format!("{kind}_store"), options);
        let history = History::new(Arc::clone(&manager), kind.as_str()).with_limit(SESSION_HISTORY_LIMIT);
        let configs = ConfigSlots::new(manager, kind.as_str());

        let mut draft = GrammarDraft::default();
        if binding.load_into(&mut draft) {
            debug!(kind = %kind, productions = draft.productions.len(), "restored grammar draft");
        }

        Self {
            kind,
            draft,
            analysis: None,
            trace: None,
            last_error: None,
            binding,
            history,
            configs,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> GrammarKind {
        self.kind
    }

    #[must_use]
    pub fn productions(&self) -> &[String] {
        &self.draft.productions
    }

    #[must_use]
    pub fn input_string(&self) -> &str {
        &self.draft.input_string
    }

    #[must_use]
    pub const fn draft(&self) -> &GrammarDraft {
        &self.draft
    }

    #[must_use]
    pub const fn analysis(&self) -> Option<&GrammarAnalysis> {
        self.analysis.as_ref()
    }

    #[must_use]
    pub const fn trace(&self) -> Option<&InputTrace> {
        self.trace.as_ref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        self.binding.storage_key()
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    fn persist(&self) {
        if let Err(err) = self.binding.save(&self.draft) {
            warn!(kind = %self.kind, error = %err, "failed to persist grammar draft");
        }
    }

    /// Write the draft now instead of waiting for the debounce window.
    pub fn save_now(&self) -> Result<()> {
        self.binding.force_save(&self.draft)
    }

    fn clear_results(&mut self) {
        self.analysis = None;
        self.trace = None;
    }

    /// Replace all productions. LR kinds drop every space.
    pub fn set_productions<I, S>(&mut self, productions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let strip = self.kind.strips_spaces();
        self.draft.productions = productions
            .into_iter()
            .map(Into::into)
            .map(|production: String| {
                if strip {
                    production.replace(' ', "")
                } else {
                    production
                }
            })
            .collect();
        self.clear_results();
        self.persist();
    }

    /// Append a trimmed production; blank and duplicate entries are ignored.
    pub fn add_production(&mut self, production: &str) -> bool {
        let production = production.trim();
        if production.is_empty() || self.draft.productions.iter().any(|p| p == production) {
            return false;
        }
        self.draft.productions.push(production.to_string());
        self.persist();
        true
    }

    /// Remove the production at `index`; out-of-range indexes are ignored.
    pub fn remove_production(&mut self, index: usize) -> bool {
        if index >= self.draft.productions.len() {
            return false;
        }
        self.draft.productions.remove(index);
        self.persist();
        true
    }

    pub fn clear_productions(&mut self) {
        self.draft.productions.clear();
        self.clear_results();
        self.persist();
    }

    pub fn set_input_string(&mut self, input: &str) {
        self.draft.input_string = input.to_string();
        self.trace = None;
        self.persist();
    }

    /// Run the grammar analysis and record it in the session history.
    pub fn analyze(&mut self, client: &BackendClient) -> Result<&GrammarAnalysis> {
        if self.draft.productions.is_empty() {
            return Err(self.fail(GlabError::InvalidInput(
                "enter at least one production".to_string(),
            )));
        }

        self.last_error = None;
        let analysis = match client.analyse(self.kind, &self.draft.productions) {
            Ok(analysis) => analysis,
            Err(err) => return Err(self.fail(err)),
        };
        info!(
            kind = %self.kind,
            start = analysis.start_symbol(),
            accepted = ?analysis.accepted(),
            "grammar analysed"
        );

        let description = format!(
            "{} analysis: {}",
            self.kind.label(),
            self.draft.productions.join(", ")
        );
        if let Err(err) = self.history.add(&self.draft, Some(&description)) {
            warn!(kind = %self.kind, error = %err, "failed to record analysis history");
        }

        Ok(&*self.analysis.insert(analysis))
    }

    /// Trace the parse of the current input string.
    pub fn analyze_input(&mut self, client: &BackendClient) -> Result<&InputTrace> {
        let input = self.draft.input_string.trim().to_string();
        if input.is_empty() {
            return Err(self.fail(GlabError::InvalidInput(
                "enter a string to analyse".to_string(),
            )));
        }
        if self.draft.productions.is_empty() {
            return Err(self.fail(GlabError::InvalidInput(
                "set productions first".to_string(),
            )));
        }

        self.last_error = None;
        match client.analyse_input(self.kind, &self.draft.productions, &input) {
            Ok(trace) => {
                info!(kind = %self.kind, steps = trace.steps(), result = %trace.info_res, "input analysed");
                Ok(&*self.trace.insert(trace))
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(&mut self, err: GlabError) -> GlabError {
        self.last_error = Some(err.to_string());
        err
    }

    /// Reset the draft and results and persist the empty draft.
    pub fn reset_all(&mut self) {
        self.draft = GrammarDraft::default();
        self.clear_results();
        self.last_error = None;
        self.persist();
    }

    pub fn save_config(&self, name: &str, description: Option<&str>) -> Result<()> {
        self.configs.save(name, description, &self.draft)
    }

    /// Replace the draft with a named config. Returns false when it does not exist.
    pub fn load_config(&mut self, name: &str) -> bool {
        let loaded = self.configs.load_into(name, &mut self.draft);
        if loaded {
            self.clear_results();
            self.persist();
        }
        loaded
    }

    #[must_use]
    pub fn configs(&self) -> Vec<ConfigMeta> {
        self.configs.list()
    }

    pub fn delete_config(&self, name: &str) -> Result<()> {
        self.configs.delete(name)
    }

    #[must_use]
    pub fn history_entries(&self) -> Vec<HistoryMeta> {
        self.history.list()
    }

    pub fn restore_history(&mut self, id: &str) -> bool {
        let restored = self.history.restore_into(id, &mut self.draft);
        if restored {
            self.clear_results();
            self.persist();
        }
        restored
    }
}
