//! Regex to DFA sessions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::grammar::{SESSION_HISTORY_LIMIT, session_save_options};
use crate::backend::{BackendClient, FaAnalysis, FaView};
use crate::error::{GlabError, Result};
use crate::persistence::{PersistenceManager, SaveOptions};
use crate::state::{BindingOptions, History, HistoryMeta, StateBinding};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonDraft {
    pub input_regex: String,
}

#[derive(Debug)]
pub struct AutomatonSession {
    draft: AutomatonDraft,
    result: Option<FaAnalysis>,
    last_error: Option<String>,
    binding: StateBinding,
    history: History,
}

impl AutomatonSession {
    pub fn open(manager: Arc<PersistenceManager>) -> Self {
        Self::open_with(manager, session_save_options())
    }

    pub fn open_with(manager: Arc<PersistenceManager>, save: SaveOptions) -> Self {
        let binding = StateBinding::new(
            Arc::clone(&manager),
            "fa_store",
            BindingOptions::default().save_options(save),
        );
        let history = History::new(manager, "fa").with_limit(SESSION_HISTORY_LIMIT);

        let mut draft = AutomatonDraft::default();
        binding.load_into(&mut draft);

        Self {
            draft,
            result: None,
            last_error: None,
            binding,
            history,
        }
    }

    #[must_use]
    pub fn input_regex(&self) -> &str {
        &self.draft.input_regex
    }

    #[must_use]
    pub const fn result(&self) -> Option<&FaAnalysis> {
        self.result.as_ref()
    }

    #[must_use]
    pub const fn has_result(&self) -> bool {
        self.result.is_some()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        self.binding.storage_key()
    }

    /// Graphviz source for `view`; empty when nothing has been analysed.
    #[must_use]
    pub fn dot(&self, view: FaView) -> &str {
        self.result.as_ref().map_or("", |result| result.dot(view))
    }

    #[must_use]
    pub fn table(&self, view: FaView) -> Option<&Value> {
        self.result.as_ref().map(|result| result.table(view))
    }

    pub fn set_regex(&mut self, regex: &str) {
        self.draft.input_regex = regex.to_string();
        self.result = None;
        if let Err(err) = self.binding.save(&self.draft) {
            warn!(error = %err, "failed to persist regex draft");
        }
    }

    pub fn analyze(&mut self, client: &BackendClient) -> Result<&FaAnalysis> {
        let regex = self.draft.input_regex.trim().to_string();
        if regex.is_empty() {
            let err = GlabError::InvalidInput("enter a regular expression".to_string());
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        self.last_error = None;
        match client.regex_to_dfa(&regex) {
            Ok(result) => {
                info!(regex = %regex, "regex converted");
                let description = format!("regex: {regex}");
                if let Err(err) = self.history.add(&self.draft, Some(&description)) {
                    warn!(error = %err, "failed to record regex history");
                }
                Ok(&*self.result.insert(result))
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn clear_analysis(&mut self) {
        self.result = None;
    }

    pub fn reset_all(&mut self) {
        self.set_regex("");
        self.last_error = None;
    }

    #[must_use]
    pub fn history_entries(&self) -> Vec<HistoryMeta> {
        self.history.list()
    }
}
