//! Configuration management for `anwork_testing`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`ANWORK_RELEASE_DIR`, `ANWORK_HARNESS_*`, ...)
//! 3. Project config (`anwork-harness.yaml` or `--config <path>`)
//! 4. Defaults

use crate::error::{HarnessError, Result};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Project config file looked up in the current directory.
pub const PROJECT_CONFIG_FILENAME: &str = "anwork-harness.yaml";
/// Environment variable carrying the version selector.
pub const VERSION_ENV: &str = "ANWORK_VERSION";
/// Default directory holding `v<N>/<tool>-<N>.zip` archives.
const DEFAULT_RELEASE_DIR: &str = "release";
/// Default name of the target CLI.
const DEFAULT_TOOL_NAME: &str = "anwork";
/// Prefix for generic environment overrides.
const ENV_PREFIX: &str = "ANWORK_HARNESS_";

const KEY_RELEASE_DIR: &str = "release-dir";
const KEY_WORK_DIR: &str = "work-dir";
const KEY_TOOL_NAME: &str = "tool-name";

/// A flat key/value configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| HarnessError::filesystem(path, e))?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build a layer from an explicit set of variables.
    #[must_use]
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        let mut named = Vec::new();

        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.insert(stripped, value);
            } else {
                named.push((key, value));
            }
        }

        // Short names beat their generic ANWORK_HARNESS_* spellings.
        for (key, value) in named {
            match key.as_str() {
                "ANWORK_RELEASE_DIR" => layer.insert(KEY_RELEASE_DIR, value),
                "ANWORK_WORK_DIR" => layer.insert(KEY_WORK_DIR, value),
                "ANWORK_TOOL_NAME" => layer.insert(KEY_TOOL_NAME, value),
                _ => {}
            }
        }

        layer
    }

    /// Look up a value by any of its spellings.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&normalize_key(key))
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    fn insert(&mut self, key: &str, value: String) {
        self.values.insert(normalize_key(key), value);
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub release_dir: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    pub tool_name: Option<String>,
    pub config: Option<PathBuf>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.release_dir {
            layer.insert(KEY_RELEASE_DIR, path.to_string_lossy().to_string());
        }
        if let Some(path) = &self.work_dir {
            layer.insert(KEY_WORK_DIR, path.to_string_lossy().to_string());
        }
        if let Some(name) = &self.tool_name {
            layer.insert(KEY_TOOL_NAME, name.clone());
        }

        layer
    }
}

/// Resolved harness settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Root holding `v<N>/<tool>-<N>.zip`.
    pub release_dir: PathBuf,
    /// Content-addressed extraction cache.
    pub cache_dir: PathBuf,
    /// Parent of the per-handle context directories.
    pub context_dir: PathBuf,
    /// Name of the target CLI inside each archive.
    pub tool_name: String,
}

impl HarnessConfig {
    /// Settings rooted at a release directory and a scratch directory.
    #[must_use]
    pub fn new(release_dir: impl Into<PathBuf>, work_dir: impl AsRef<Path>) -> Self {
        let work_dir = work_dir.as_ref();
        Self {
            release_dir: release_dir.into(),
            cache_dir: work_dir.join("cache"),
            context_dir: work_dir.join("contexts"),
            tool_name: DEFAULT_TOOL_NAME.to_string(),
        }
    }

    /// Replace the tool name.
    #[must_use]
    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = tool_name.into();
        self
    }

    /// Resolve settings from a merged layer.
    #[must_use]
    pub fn from_layer(layer: &ConfigLayer) -> Self {
        let release_dir = layer
            .get(KEY_RELEASE_DIR)
            .map_or_else(|| PathBuf::from(DEFAULT_RELEASE_DIR), PathBuf::from);
        let work_dir = layer
            .get(KEY_WORK_DIR)
            .map_or_else(default_work_dir, PathBuf::from);
        let tool_name = layer.get(KEY_TOOL_NAME).unwrap_or(DEFAULT_TOOL_NAME);

        Self::new(release_dir, work_dir).with_tool_name(tool_name)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RELEASE_DIR, default_work_dir())
    }
}

/// Default scratch root for caches and contexts.
#[must_use]
pub fn default_work_dir() -> PathBuf {
    env::temp_dir().join("anwork-harness")
}

/// Load configuration with the full precedence order.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed, or
/// if an explicit `--config` path does not exist.
pub fn load_config(cli: &CliOverrides) -> Result<HarnessConfig> {
    let project = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(HarnessError::Config(format!(
                "config file '{}' does not exist",
                path.display()
            )));
        }
        Some(path) => ConfigLayer::from_yaml(path)?,
        None => ConfigLayer::from_yaml(Path::new(PROJECT_CONFIG_FILENAME))?,
    };
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();

    let merged = ConfigLayer::merge_layers(&[project, env_layer, cli_layer]);
    let config = HarnessConfig::from_layer(&merged);
    tracing::debug!(?config, "resolved harness configuration");
    Ok(config)
}

/// Parse a version selector.
///
/// Absent, blank, non-numeric, and zero values are all rejected; there is no
/// version 0.
///
/// # Errors
///
/// Returns `MissingVersion` for any unusable selector.
pub fn parse_version_selector(raw: Option<&str>) -> Result<u32> {
    let missing = || HarnessError::MissingVersion {
        value: raw.map(str::to_string),
    };
    let value = raw.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(missing)?;
    match value.parse::<u32>() {
        Ok(0) | Err(_) => Err(missing()),
        Ok(version) => Ok(version),
    }
}

/// Read the version selector from `ANWORK_VERSION`.
///
/// # Errors
///
/// Returns `MissingVersion` when the variable is unset or unusable.
pub fn version_from_env() -> Result<u32> {
    let raw = env::var(VERSION_ENV).ok();
    parse_version_selector(raw.as_deref())
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(['_', '.'], "-")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        layer.insert(&key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
