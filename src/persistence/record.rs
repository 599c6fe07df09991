//! The JSON envelope stored under each key.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Wire shape: `{version, timestamp, expiresAt?, data, checksum?}`, timestamps
/// in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub version: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl StoredRecord {
    /// Build a checksummed record stamped at `now`. A zero `ttl` means no expiry.
    #[must_use]
    pub fn new(data: Value, version: &str, ttl: Option<Duration>, now: i64) -> Self {
        let expires_at = ttl
            .filter(|ttl| !ttl.is_zero())
            .map(|ttl| now.saturating_add(duration_millis(ttl)));
        Self::with_expiry(data, version, expires_at, now)
    }

    /// Build a checksummed record with an absolute expiry.
    #[must_use]
    pub fn with_expiry(data: Value, version: &str, expires_at: Option<i64>, now: i64) -> Self {
        let checksum = Some(checksum(&data));
        Self {
            version: version.to_string(),
            timestamp: now,
            expires_at,
            data,
            checksum,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    /// Records without a checksum are accepted as-is.
    #[must_use]
    pub fn checksum_matches(&self) -> bool {
        self.checksum
            .as_deref()
            .is_none_or(|expected| expected == checksum(&self.data))
    }
}

/// Current time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Lowercase hex SHA-256 of the canonical JSON form of `data`.
#[must_use]
pub fn checksum(data: &Value) -> String {
    let mut canonical = String::new();
    write_canonical(data, &mut canonical);
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

/// Serialize with object keys sorted, independent of map ordering.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (idx, key) in keys.into_iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_scalar(&Value::String(key.clone()), out);
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => write_scalar(scalar, out),
    }
}

fn write_scalar(value: &Value, out: &mut String) {
    // Display for Value is compact JSON and cannot fail.
    let _ = write!(out, "{value}");
}
