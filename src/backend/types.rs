//! Wire types of the analysis service.
//!
//! Field names follow the service's JSON, so most of them are renamed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Common response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl<T> Envelope<T> {
    /// `message`, then `msg`, then the bare code.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.message
            .as_deref()
            .or(self.msg.as_deref())
            .filter(|text| !text.is_empty())
            .map_or_else(|| format!("code {}", self.code), str::to_string)
    }
}

/// Grammar analyses the service offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GrammarKind {
    Ll1,
    Lr0,
    Slr1,
}

impl GrammarKind {
    pub const ALL: [Self; 3] = [Self::Ll1, Self::Lr0, Self::Slr1];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ll1 => "ll1",
            Self::Lr0 => "lr0",
            Self::Slr1 => "slr1",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ll1 => "LL(1)",
            Self::Lr0 => "LR(0)",
            Self::Slr1 => "SLR(1)",
        }
    }

    #[must_use]
    pub const fn analyse_path(self) -> &'static str {
        match self {
            Self::Ll1 => "/api/LL1Analyse",
            Self::Lr0 => "/api/LR0Analyse",
            Self::Slr1 => "/api/SLR1Analyse",
        }
    }

    #[must_use]
    pub const fn input_path(self) -> &'static str {
        match self {
            Self::Ll1 => "/api/LL1AnalyseInp",
            Self::Lr0 => "/api/LR0AnalyseInp",
            Self::Slr1 => "/api/SLR1AnalyseInp",
        }
    }

    /// LR kinds store productions with spaces removed.
    #[must_use]
    pub const fn strips_spaces(self) -> bool {
        matches!(self, Self::Lr0 | Self::Slr1)
    }
}

impl std::fmt::Display for GrammarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ll1Analysis {
    #[serde(rename = "S")]
    pub start: String,
    #[serde(rename = "Vn", default)]
    pub nonterminals: Vec<String>,
    #[serde(rename = "Vt", default)]
    pub terminals: Vec<String>,
    #[serde(default)]
    pub formulas_dict: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub first: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub follow: BTreeMap<String, Vec<String>>,
    /// Parse table keyed by `"{nonterminal}|{terminal}"`.
    #[serde(default)]
    pub table: BTreeMap<String, String>,
    #[serde(rename = "isLL1", default)]
    pub is_ll1: bool,
}

/// Result of both LR(0) and SLR(1) analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LrAnalysis {
    #[serde(rename = "S")]
    pub start: String,
    #[serde(rename = "Vn", default)]
    pub nonterminals: Vec<String>,
    #[serde(rename = "Vt", default)]
    pub terminals: Vec<String>,
    #[serde(default)]
    pub formulas_list: Vec<String>,
    #[serde(default)]
    pub dot_items: Vec<String>,
    #[serde(default)]
    pub all_dfa: Vec<Value>,
    #[serde(default)]
    pub actions: BTreeMap<String, String>,
    #[serde(default)]
    pub gotos: BTreeMap<String, String>,
    #[serde(rename = "isLR0", default, skip_serializing_if = "Option::is_none")]
    pub is_lr0: Option<bool>,
    #[serde(rename = "isSLR1", default, skip_serializing_if = "Option::is_none")]
    pub is_slr1: Option<bool>,
    #[serde(rename = "LR0_dot_str", default, skip_serializing_if = "Option::is_none")]
    pub lr0_dot: Option<String>,
    #[serde(rename = "SLR1_dot_str", default, skip_serializing_if = "Option::is_none")]
    pub slr1_dot: Option<String>,
}

impl LrAnalysis {
    /// Whether the grammar belongs to the analysed class, when reported.
    #[must_use]
    pub fn accepted(&self, kind: GrammarKind) -> Option<bool> {
        match kind {
            GrammarKind::Slr1 => self.is_slr1,
            _ => self.is_lr0,
        }
    }

    /// Graphviz source of the item-set automaton.
    #[must_use]
    pub fn dot(&self) -> Option<&str> {
        self.slr1_dot.as_deref().or(self.lr0_dot.as_deref())
    }
}

/// Either result shape, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "result", rename_all = "lowercase")]
pub enum GrammarAnalysis {
    Ll1(Ll1Analysis),
    Lr0(LrAnalysis),
    Slr1(LrAnalysis),
}

impl GrammarAnalysis {
    #[must_use]
    pub const fn kind(&self) -> GrammarKind {
        match self {
            Self::Ll1(_) => GrammarKind::Ll1,
            Self::Lr0(_) => GrammarKind::Lr0,
            Self::Slr1(_) => GrammarKind::Slr1,
        }
    }

    #[must_use]
    pub fn start_symbol(&self) -> &str {
        match self {
            Self::Ll1(result) => &result.start,
            Self::Lr0(result) | Self::Slr1(result) => &result.start,
        }
    }

    /// Whether the grammar is in the analysed class.
    #[must_use]
    pub fn accepted(&self) -> Option<bool> {
        match self {
            Self::Ll1(result) => Some(result.is_ll1),
            Self::Lr0(result) => result.accepted(GrammarKind::Lr0),
            Self::Slr1(result) => result.accepted(GrammarKind::Slr1),
        }
    }
}

/// Step-by-step parse of one input string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputTrace {
    #[serde(default)]
    pub info_res: String,
    #[serde(default)]
    pub info_step: Vec<Value>,
    #[serde(default)]
    pub info_msg: Vec<String>,
    /// Strings for LR kinds, annotated cells for LL(1).
    #[serde(default)]
    pub info_stack: Vec<Value>,
    #[serde(default)]
    pub info_str: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_action: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InputTrace {
    #[must_use]
    pub fn steps(&self) -> usize {
        self.info_step.len()
    }
}

/// Which automaton of a regex conversion to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FaView {
    Nfa,
    Dfa,
    MinDfa,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaAnalysis {
    /// NFA to DFA subset-construction table.
    #[serde(default)]
    pub table: Value,
    #[serde(default)]
    pub table_to_num: Value,
    #[serde(default)]
    pub table_to_num_min: Value,
    /// Minimization partitions.
    #[serde(rename = "P", default)]
    pub partitions: Value,
    #[serde(rename = "P_change", default)]
    pub partition_changes: Value,
    #[serde(rename = "NFA_dot_str", default)]
    pub nfa_dot: String,
    #[serde(rename = "DFA_dot_str", default)]
    pub dfa_dot: String,
    #[serde(rename = "Min_DFA_dot_str", default)]
    pub min_dfa_dot: String,
}

impl FaAnalysis {
    #[must_use]
    pub fn dot(&self, view: FaView) -> &str {
        match view {
            FaView::Nfa => &self.nfa_dot,
            FaView::Dfa => &self.dfa_dot,
            FaView::MinDfa => &self.min_dfa_dot,
        }
    }

    #[must_use]
    pub const fn table(&self, view: FaView) -> &Value {
        match view {
            FaView::Nfa => &self.table,
            FaView::Dfa => &self.table_to_num,
            FaView::MinDfa => &self.table_to_num_min,
        }
    }
}
