use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GlabError, Result};
use crate::persistence::{DEFAULT_CAPACITY_BYTES, DEFAULT_VERSION, SaveOptions};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Config {
    /// Defaults, then the global file (or the explicit one instead), then `GLAB_*` variables.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("GLAB_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => {
                    return Err(GlabError::Config(format!(
                        "config file {} not found",
                        path.display()
                    )));
                }
            }
        } else if let Some(global) = Self::load_global()? {
            config.merge_patch(global);
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("glab/config.toml"))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match Self::global_path() {
            Some(path) => Self::load_patch(&path),
            None => Ok(None),
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| GlabError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| GlabError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.storage {
            self.storage.merge(patch);
        }
        if let Some(patch) = patch.persistence {
            self.persistence.merge(patch);
        }
        if let Some(patch) = patch.backend {
            self.backend.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(&|key: &str| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: &dyn Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("GLAB_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(value));
        }
        if let Some(value) = parse_var::<u64>(lookup, "GLAB_STORAGE_QUOTA_BYTES")? {
            self.storage.quota_bytes = Some(value);
        }
        if let Some(value) = parse_var::<u64>(lookup, "GLAB_STORAGE_CAPACITY_BYTES")? {
            self.storage.capacity_bytes = value;
        }

        if let Some(value) = lookup("GLAB_PERSISTENCE_VERSION") {
            self.persistence.default_version = value;
        }
        if let Some(value) = parse_var::<u64>(lookup, "GLAB_SAVE_DELAY_MS")? {
            self.persistence.save_delay_ms = value;
        }
        if let Some(value) = parse_var::<u64>(lookup, "GLAB_DEFAULT_TTL_SECS")? {
            self.persistence.default_ttl_secs = Some(value);
        }

        if let Some(value) = lookup("GLAB_BACKEND_URL") {
            self.backend.base_url = value;
        }
        if let Some(value) = parse_var::<u64>(lookup, "GLAB_BACKEND_TIMEOUT_SECS")? {
            self.backend.timeout_secs = value;
        }
        if let Some(values) = lookup("GLAB_BACKEND_SUCCESS_CODES") {
            self.backend.success_codes = parse_codes("GLAB_BACKEND_SUCCESS_CODES", &values)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file; defaults to the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Hard byte quota enforced by the store; unlimited when unset.
    #[serde(default)]
    pub quota_bytes: Option<u64>,
    /// Nominal capacity reported by stats.
    #[serde(default)]
    pub capacity_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            quota_bytes: None,
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
        }
    }
}

impl StorageConfig {
    fn merge(&mut self, patch: StoragePatch) {
        if let Some(value) = patch.path {
            self.path = Some(value);
        }
        if let Some(value) = patch.quota_bytes {
            self.quota_bytes = Some(value);
        }
        if let Some(value) = patch.capacity_bytes {
            self.capacity_bytes = value;
        }
    }

    /// Configured path, or `<data dir>/glab/glab.db`.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("glab").join("glab.db"))
            .ok_or_else(|| GlabError::Config("data directory not found; set storage.path".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub default_version: String,
    #[serde(default)]
    pub save_delay_ms: u64,
    #[serde(default)]
    pub default_ttl_secs: Option<u64>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            default_version: DEFAULT_VERSION.to_string(),
            save_delay_ms: 500,
            default_ttl_secs: None,
        }
    }
}

impl PersistenceConfig {
    fn merge(&mut self, patch: PersistencePatch) {
        if let Some(value) = patch.default_version {
            self.default_version = value;
        }
        if let Some(value) = patch.save_delay_ms {
            self.save_delay_ms = value;
        }
        if let Some(value) = patch.default_ttl_secs {
            self.default_ttl_secs = Some(value);
        }
    }

    #[must_use]
    pub fn save_options(&self) -> SaveOptions {
        let options = SaveOptions::new(self.default_version.clone())
            .with_save_delay(Duration::from_millis(self.save_delay_ms));
        match self.default_ttl_secs {
            Some(secs) => options.with_ttl(Duration::from_secs(secs)),
            None => options,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub timeout_secs: u64,
    /// Envelope `code` values treated as success.
    #[serde(default)]
    pub success_codes: Vec<i64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: DEFAULT_BACKEND_TIMEOUT_SECS,
            success_codes: vec![0, 200],
        }
    }
}

impl BackendConfig {
    fn merge(&mut self, patch: BackendPatch) {
        if let Some(value) = patch.base_url {
            self.base_url = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = patch.success_codes {
            self.success_codes = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub storage: Option<StoragePatch>,
    pub persistence: Option<PersistencePatch>,
    pub backend: Option<BackendPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StoragePatch {
    pub path: Option<PathBuf>,
    pub quota_bytes: Option<u64>,
    pub capacity_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PersistencePatch {
    pub default_version: Option<String>,
    pub save_delay_ms: Option<u64>,
    pub default_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BackendPatch {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub success_codes: Option<Vec<i64>>,
}

fn parse_var<T>(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse::<T>().map(Some).map_err(|err| {
            GlabError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        None => Ok(None),
    }
}

fn parse_codes(key: &str, value: &str) -> Result<Vec<i64>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<i64>()
                .map_err(|err| GlabError::Config(format!("invalid {key} entry {entry}: {err}")))
        })
        .collect()
}
