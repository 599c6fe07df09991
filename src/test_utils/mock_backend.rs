//! httpmock wrapper that answers like the analysis service.

use httpmock::prelude::*;
use serde_json::{Value, json};

use crate::backend::{BackendClient, GrammarKind};
use crate::config::BackendConfig;

pub struct MockBackend {
    pub server: MockServer,
}

impl MockBackend {
    pub fn start() -> Self {
        Self {
            server: MockServer::start(),
        }
    }

    pub fn config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.server.base_url(),
            timeout_secs: 5,
            ..BackendConfig::default()
        }
    }

    pub fn client(&self) -> BackendClient {
        BackendClient::new(&self.config()).expect("client")
    }

    /// Answer every analysis request of `kind` with `data` under code 200.
    pub fn analysis(&self, kind: GrammarKind, data: Value) {
        self.server.mock(|when, then| {
            when.method(POST).path(kind.analyse_path());
            then.status(200).json_body(json!({"code": 200, "data": data}));
        });
    }

    pub fn input_trace(&self, kind: GrammarKind, data: Value) {
        self.server.mock(|when, then| {
            when.method(POST).path(kind.input_path());
            then.status(200).json_body(json!({"code": 0, "data": data}));
        });
    }

    pub fn regex(&self, data: Value) {
        self.server.mock(|when, then| {
            when.method(POST).path("/api/Regex_to_DFAM");
            then.status(200).json_body(json!({"code": 200, "data": data}));
        });
    }

    /// Reject requests to `path` with a non-success envelope code.
    pub fn reject(&self, path: &str, code: i64, message: &str) {
        self.server.mock(|when, then| {
            when.method(POST).path(path);
            then.status(200).json_body(json!({"code": code, "message": message}));
        });
    }

    pub fn ll1_sample() -> Value {
        json!({
            "S": "E",
            "Vn": ["E", "A", "T"],
            "Vt": ["+", "i", "#"],
            "formulas_dict": {"E": ["TA"], "A": ["+TA", "@"], "T": ["i"]},
            "first": {"E": ["i"], "A": ["+", "@"], "T": ["i"]},
            "follow": {"E": ["#"], "A": ["#"], "T": ["+", "#"]},
            "table": {"E|i": "E->TA", "A|+": "A->+TA", "A|#": "A->@", "T|i": "T->i"},
            "isLL1": true
        })
    }
}
