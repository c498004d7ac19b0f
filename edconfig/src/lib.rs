//! # EDCockpit Configuration Module
//!
//! This module provides configuration management for EDCockpit, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! Subsystem crates extend [`Config`] with their own typed accessors through
//! extension traits (`LinkConfigExt` in `edlink`, `RadioConfigExt` in
//! `edradio`), built on [`Config::get_value`] and [`Config::set_value`].
//!
//! ## Usage
//!
//! ```no_run
//! use edconfig::get_config;
//!
//! let config = get_config();
//! let level = config.get_log_min_level()?;
//! config.set_log_enable_console(false)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{info, warn};

// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("edcockpit.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> = Arc::new(match Config::load_config("") {
        Ok(config) => config,
        Err(err) => {
            warn!("Failed to load EDCockpit configuration ({err:#}), using embedded defaults");
            Config::default()
        }
    });
}

const ENV_CONFIG_DIR: &str = "EDCOCKPIT_CONFIG";
const ENV_PREFIX: &str = "EDCOCKPIT_CONFIG__";
const CONFIG_DIR_NAME: &str = ".edcockpit";

const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<bool> {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => Ok(b),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Configuration manager for EDCockpit
///
/// A configuration either lives in a directory (`config.yaml`, rewritten on
/// every change) or purely in memory when built with
/// [`Config::from_yaml_str`].
#[derive(Debug)]
pub struct Config {
    config_dir: Option<String>,
    path: Option<String>,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.data().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Default for Config {
    /// In-memory configuration holding only the embedded defaults
    fn default() -> Self {
        let value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap_or(Value::Mapping(Mapping::new()));
        Self {
            config_dir: None,
            path: None,
            data: Mutex::new(Self::lower_keys_value(value)),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        if !directory.is_empty() {
            return directory.to_string();
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        CONFIG_DIR_NAME.to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("{} is not a directory", path.display()));
        }

        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        fs::read_dir(path)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `EDCOCKPIT_CONFIG` environment variable
    /// 3. `.edcockpit` in the current directory
    /// 4. `.edcockpit` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for read/write permissions.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir=%config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let yaml = match fs::read_to_string(&path) {
            Ok(data) => {
                info!(config_file=%path, "Loaded config file");
                data
            }
            Err(_) => {
                info!(config_file=%path, "Config file not found, using default embedded config");
                DEFAULT_CONFIG.to_string()
            }
        };

        let mut config_value = Self::merged_with_defaults(&yaml)?;
        Self::apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir: Some(config_dir),
            path: Some(path),
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Builds a configuration that is never written to disk
    ///
    /// `yaml` is merged over the embedded defaults exactly like a
    /// `config.yaml` file would be. Environment overrides are not applied.
    ///
    /// ```
    /// use edconfig::Config;
    ///
    /// let config = Config::from_yaml_str("host:\n  logger:\n    min_level: DEBUG\n")?;
    /// assert_eq!(config.get_log_min_level()?, "DEBUG");
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(Config {
            config_dir: None,
            path: None,
            data: Mutex::new(Self::merged_with_defaults(yaml)?),
        })
    }

    fn merged_with_defaults(yaml: &str) -> Result<Value> {
        let mut merged = Self::lower_keys_value(serde_yaml::from_str(DEFAULT_CONFIG)?);
        let external = Self::lower_keys_value(serde_yaml::from_str(yaml)?);
        // an empty file parses as null
        if !external.is_null() {
            merge_yaml(&mut merged, &external);
        }
        Ok(merged)
    }

    fn data(&self) -> MutexGuard<'_, Value> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Directory holding `config.yaml`, `None` for in-memory configurations
    pub fn directory(&self) -> Option<&str> {
        self.config_dir.as_deref()
    }

    /// Saves the current configuration to the config.yaml file
    ///
    /// In-memory configurations have nothing to save and return `Ok(())`.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let yaml = serde_yaml::to_string(&*self.data())?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["link", "base_url"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.data();
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        let Some((key, rest)) = path.split_first() else {
            *data = value;
            return Ok(());
        };
        let Value::Mapping(map) = data else {
            return Err(anyhow!("Cannot set {key}: parent is not a mapping"));
        };

        let key = Value::String(key.to_lowercase());
        if rest.is_empty() {
            map.insert(key, value);
            return Ok(());
        }
        let child = map.entry(key).or_insert(Value::Null);
        // null children (e.g. `stations:`) become mappings on first write
        if child.is_null() {
            *child = Value::Mapping(Mapping::new());
        }
        Self::set_value_internal(child, rest, value)
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let found = path.iter().enumerate().try_fold(data, |node, (depth, key)| {
            node.as_mapping()
                .and_then(|map| map.get(key.to_lowercase().as_str()))
                .ok_or_else(|| anyhow!("No configuration value at {}", path[..=depth].join(".")))
        })?;
        Ok(found.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                if let Err(err) = Self::set_value_internal(config, &key_path, yaml_value) {
                    warn!(env_var=%key, "Ignoring environment override: {err}");
                }
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
    }

    /// Keys are matched case-insensitively, so they are stored lowercased
    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => Value::Mapping(
                map.into_iter()
                    .map(|(key, child)| {
                        let key = match key {
                            Value::String(name) => Value::String(name.to_lowercase()),
                            other => other,
                        };
                        (key, Self::lower_keys_value(child))
                    })
                    .collect(),
            ),
            Value::Sequence(items) => {
                Value::Sequence(items.into_iter().map(Self::lower_keys_value).collect())
            }
            other => other,
        }
    }

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    /// Minimum log level (`TRACE`, `DEBUG`, `INFO`, `WARN`, `ERROR`)
    pub fn get_log_min_level(&self) -> Result<String> {
        match self.get_value(&["host", "logger", "min_level"]) {
            Ok(Value::String(s)) => Ok(s),
            _ => Ok(DEFAULT_LOG_MIN_LEVEL.to_string()),
        }
    }

    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["host", "logger", "min_level"], Value::String(level))
    }
}

/// Returns the global configuration instance
///
/// The instance is lazily loaded on first access. If the configuration
/// directory cannot be prepared, an in-memory configuration holding the
/// embedded defaults is used instead.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merges external YAML configuration into default configuration
///
/// Mappings are merged key by key; scalars and sequences from `external`
/// replace the default value.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_embedded() {
        let config = Config::default();
        assert_eq!(config.get_log_min_level().unwrap(), "INFO");
        assert!(config.get_log_enable_console().unwrap());
        assert_eq!(
            config.get_value(&["link", "base_url"]).unwrap(),
            Value::String("http://localhost:10986".into())
        );
    }

    #[test]
    fn test_from_yaml_merges_over_defaults() {
        let config = Config::from_yaml_str("LINK:\n  Probe_Interval_Ms: 1000\n").unwrap();

        assert_eq!(
            config.get_value(&["link", "probe_interval_ms"]).unwrap(),
            Value::Number(1000.into())
        );
        // untouched siblings survive the merge
        assert_eq!(
            config.get_value(&["link", "challenge_route"]).unwrap(),
            Value::String("edla/challenge".into())
        );
    }

    #[test]
    fn test_set_value_creates_intermediate_maps() {
        let config = Config::default();
        config
            .set_value(&["radio", "stations", "hutton", "volume"], Value::Number(1.into()))
            .unwrap();
        assert_eq!(
            config.get_value(&["Radio", "Stations", "Hutton", "Volume"]).unwrap(),
            Value::Number(1.into())
        );
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let config = Config::default();
        assert!(config.get_value(&["nope", "nothing"]).is_err());
        assert!(config.get_value(&["link", "base_url", "deeper"]).is_err());
    }

    #[test]
    fn test_load_config_persists_merged_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "host:\n  logger:\n    min_level: TRACE\n",
        )
        .unwrap();

        let dir_str = dir.path().to_string_lossy().to_string();
        let config = Config::load_config(&dir_str).unwrap();
        assert_eq!(config.get_log_min_level().unwrap(), "TRACE");
        assert_eq!(config.directory(), Some(dir_str.as_str()));

        config.set_log_enable_console(false).unwrap();

        let reloaded = Config::load_config(&dir_str).unwrap();
        assert_eq!(reloaded.get_log_min_level().unwrap(), "TRACE");
        assert!(!reloaded.get_log_enable_console().unwrap());
        // defaults were written back alongside the user's keys
        assert!(reloaded.get_value(&["radio", "min_refresh_ms"]).is_ok());
    }

    #[test]
    fn test_convert_env_value() {
        assert_eq!(Config::convert_env_value("42"), Value::Number(42.into()));
        assert_eq!(Config::convert_env_value("true"), Value::Bool(true));
        assert_eq!(
            Config::convert_env_value("http://example.org"),
            Value::String("http://example.org".into())
        );
    }
}
