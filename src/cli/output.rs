//! Output helpers shared by commands.

use chrono::Utc;
use serde::Serialize;

use crate::error::{GlabError, Result};

/// Envelope for `--json` output.
#[derive(Debug, Serialize)]
pub struct JsonResponse<T: Serialize> {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub data: T,
}

pub fn json_ok<T: Serialize>(data: T) -> JsonResponse<T> {
    JsonResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        data,
    }
}

/// Print `data` wrapped in an ok envelope.
pub fn emit_ok<T: Serialize>(data: T) -> Result<()> {
    emit_json(&json_ok(data))
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}

#[must_use]
pub fn error_json(err: &GlabError) -> serde_json::Value {
    serde_json::json!({
        "status": "error",
        "code": err.code(),
        "message": err.to_string(),
    })
}

/// Aligned key/value text for human output.
pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 18,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(text.to_string());
        self.lines.push("=".repeat(text.len().max(3)));
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(String::new());
        self.lines.push(text.to_string());
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        self.lines
            .push(format!("{key:width$} {value}", width = self.key_width));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

/// Epoch milliseconds as RFC3339, or the raw number if out of range.
#[must_use]
pub fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map_or_else(|| millis.to_string(), |ts| ts.to_rfc3339())
}
