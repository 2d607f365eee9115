//! Configuration management.
//!
//! This module provides multi-layer configuration support with:
//! - File-based configuration (YAML)
//! - Environment variable overrides
//! - Programmatic updates (command-line flags)
//!
//! ## Configuration Layers
//!
//! Configuration values are resolved in this priority order:
//! 1. Environment variables
//! 2. Programmatically set values
//! 3. Values loaded from file
//! 4. Default values
//!
//! ## Example
//!
//! ```no_run
//! use ghsecret_core::config::Config;
//!
//! let mut config = Config::load("register-secret.yml")?.with_env();
//! config.set("github.api_url", "https://ghe.example.com/api/v3")?;
//!
//! let settings = config.resolve()?;
//! println!("{}", settings.github.api_url);
//! # Ok::<(), ghsecret_types::GhSecretError>(())
//! ```

use ghsecret_types::{GhSecretError, Result};
use ghsecret_types::config::{GithubSettings, LogConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Environment variables and the configuration keys they override.
pub const ENV_BINDINGS: &[(&str, &str)] = &[
    ("GITHUB_TOKEN", "github.token"),
    ("GITHUB_API_URL", "github.api_url"),
    ("REGISTER_SECRET_LOG_LEVEL", "log.level"),
    ("REGISTER_SECRET_LOG_FORMAT", "log.format"),
];

/// Configuration layer priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigLayer {
    /// Default values
    Default = 0,
    /// Values loaded from file
    Loaded = 1,
    /// Values set programmatically
    Set = 2,
    /// Values from environment variables
    Environment = 3,
}

impl ConfigLayer {
    /// All layers, lowest priority first.
    const ASCENDING: [ConfigLayer; 4] = [
        ConfigLayer::Default,
        ConfigLayer::Loaded,
        ConfigLayer::Set,
        ConfigLayer::Environment,
    ];
}

/// Layered configuration store.
#[derive(Clone, Debug)]
pub struct Config {
    layers: HashMap<ConfigLayer, Value>,
}

impl Config {
    /// Create a configuration holding only the default layer.
    pub fn new() -> Self {
        let mut layers = HashMap::new();
        // Serializing plain structs into a `Value` cannot fail.
        if let Ok(defaults) = serde_json::to_value(Settings::default()) {
            layers.insert(ConfigLayer::Default, defaults);
        }
        Self { layers }
    }

    /// Create a configuration from a file path.
    ///
    /// If the file doesn't exist, only the defaults are present.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::new();

        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| GhSecretError::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;

            let value: Value = serde_yaml::from_str(&content)
                .map_err(|e| GhSecretError::Config(format!("Failed to parse config {}: {}", path.display(), e)))?;

            // An empty YAML document parses as null.
            if !value.is_null() {
                config.layers.insert(ConfigLayer::Loaded, value);
            }
        }

        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn with_env(mut self) -> Self {
        self.apply_env(|name| std::env::var(name).ok());
        self
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Unset and empty variables are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let mut env_layer = Value::Object(Default::default());
        for (var, key) in ENV_BINDINGS {
            let Some(raw) = lookup(var).filter(|v| !v.is_empty()) else {
                continue;
            };
            let value = if key.starts_with("log.") {
                raw.to_lowercase()
            } else {
                raw
            };
            set_value_at_path(&mut env_layer, key, Value::String(value));
        }
        self.layers.insert(ConfigLayer::Environment, env_layer);
    }

    /// Set a configuration value programmatically.
    pub fn set(&mut self, key: &str, value: impl Serialize) -> Result<()> {
        if key.is_empty() {
            return Err(GhSecretError::Config("Empty path".to_string()));
        }

        let value = serde_json::to_value(value)
            .map_err(|e| GhSecretError::Config(format!("Failed to serialize value: {}", e)))?;

        let set_layer = self.layers.entry(ConfigLayer::Set).or_insert(Value::Object(Default::default()));
        set_value_at_path(set_layer, key, value);

        Ok(())
    }

    /// Resolve all layers into typed settings.
    pub fn resolve(&self) -> Result<Settings> {
        serde_json::from_value(self.merged_data())
            .map_err(|e| GhSecretError::Config(format!("Invalid configuration: {}", e)))
    }

    /// Get merged data from all layers.
    fn merged_data(&self) -> Value {
        let mut merged = Value::Object(serde_json::Map::new());

        for layer in &ConfigLayer::ASCENDING {
            if let Some(layer_data) = self.layers.get(layer) {
                merged = deep_merge(merged, layer_data.clone());
            }
        }

        merged
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Typed view over a resolved configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// GitHub API settings
    #[serde(default)]
    pub github: GithubSettings,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

fn set_value_at_path(data: &mut Value, path: &str, value: Value) {
    let mut parts: Vec<&str> = path.split('.').collect();
    let Some(last) = parts.pop() else {
        return;
    };

    // Navigate to parent, creating intermediate objects as needed
    let mut current = data;
    for part in parts {
        if !current.is_object() {
            *current = Value::Object(Default::default());
        }
        let Value::Object(map) = current else {
            return;
        };
        current = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
    }

    if !current.is_object() {
        *current = Value::Object(Default::default());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
}

/// Deep merge two values.
/// Recursively merges objects, with overlay values taking precedence.
fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay_val) => overlay_val,
    }
}
