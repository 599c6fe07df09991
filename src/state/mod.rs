//! Bindings between typed application state and the persistence manager.
//!
//! State is any `Serialize + DeserializeOwned` struct that serializes to a
//! JSON object. Loading overlays stored fields onto the current value, so
//! fields added since the data was written keep their defaults.

pub mod binding;
pub mod configs;
pub mod history;

pub use binding::{BindingOptions, StateBinding};
pub use configs::{ConfigMeta, ConfigSlots, ConfigSnapshot};
pub use history::{History, HistoryEntry, HistoryMeta};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Copy every field of `stored` that also exists on `state` into `state`.
///
/// Returns false when `stored` is not an object or the merged value no
/// longer deserializes into `T`; `state` is untouched in that case.
pub fn overlay<T: Serialize + DeserializeOwned>(state: &mut T, stored: &Value) -> bool {
    let Value::Object(stored) = stored else {
        return false;
    };
    let Ok(Value::Object(mut current)) = serde_json::to_value(&*state) else {
        return false;
    };

    for (field, value) in stored {
        if let Some(slot) = current.get_mut(field) {
            slot.clone_from(value);
        }
    }

    match serde_json::from_value(Value::Object(current)) {
        Ok(next) => {
            *state = next;
            true
        }
        Err(err) => {
            warn!(error = %err, "stored fields do not fit the current state shape");
            false
        }
    }
}
