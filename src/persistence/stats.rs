use serde::Serialize;

/// Nominal capacity of browser local storage, used when none is configured.
pub const DEFAULT_CAPACITY_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageItem {
    pub key: String,
    /// UTF-8 byte length of the stored value.
    pub size: u64,
    /// Record timestamp, when the value parses as a record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct StorageStats {
    pub total_keys: usize,
    pub used_bytes: u64,
    pub capacity_bytes: u64,
    /// Capacity minus usage; negative when the nominal capacity is exceeded.
    pub available_bytes: i64,
    /// Largest first.
    pub items: Vec<StorageItem>,
}

impl StorageStats {
    #[must_use]
    pub fn from_items(mut items: Vec<StorageItem>, capacity_bytes: u64) -> Self {
        items.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.key.cmp(&b.key)));
        let used_bytes: u64 = items.iter().map(|item| item.size).sum();
        let available_bytes = i64::try_from(capacity_bytes)
            .unwrap_or(i64::MAX)
            .saturating_sub(i64::try_from(used_bytes).unwrap_or(i64::MAX));
        Self {
            total_keys: items.len(),
            used_bytes,
            capacity_bytes,
            available_bytes,
            items,
        }
    }

    /// Fraction of the nominal capacity in use.
    #[must_use]
    pub fn usage_ratio(&self) -> f64 {
        if self.capacity_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 / self.capacity_bytes as f64
    }
}
