//! # PMOSignage Configuration Module
//!
//! This module provides configuration management for PMOSignage, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use pmosignconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let url = config.get_playlist_url();
//! let cache_dir = config.get_media_cache_dir()?;
//!
//! // Update configuration values
//! config.set_playlist_url("http://signage.local/playlist")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmosignage.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load PMOSignage configuration"));
}

const ENV_CONFIG_DIR: &str = "PMOSIGNAGE_CONFIG";
const ENV_PREFIX: &str = "PMOSIGNAGE_CONFIG__";

// Default values for configuration
const DEFAULT_PLAYLIST_URL: &str = "http://localhost:8080/";
const DEFAULT_FALLBACK_FILE: &str = "playlist.yaml";
const DEFAULT_CACHE_DIR: &str = "media_cache";
const DEFAULT_PREFETCH_GRACE_MS: u64 = 2000;
const DEFAULT_FAILURE_BACKOFF_MS: u64 = 1000;
const DEFAULT_COUNTDOWN_TICK_MS: u64 = 1000;

/// Macro to generate getter/setter for millisecond values with default
macro_rules! impl_ms_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> u64 {
            match self.get_value($path) {
                Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap(),
                Ok(Value::Number(n)) if n.is_i64() => n.as_i64().unwrap().max(0) as u64,
                _ => $default,
            }
        }

        pub fn $setter(&self, millis: u64) -> Result<()> {
            let n = Number::from(millis);
            self.set_value($path, Value::Number(n))
        }
    };
}

/// Configuration manager for PMOSignage
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
///
/// # Examples
///
/// ```no_run
/// use pmosignconfig::get_config;
///
/// let config = get_config();
/// println!("Playlist endpoint: {}", config.get_playlist_url());
/// ```
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(".pmosignage").exists() {
            return ".pmosignage".to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(".pmosignage");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        // Default fallback
        ".pmosignage".to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        // Create if doesn't exist
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        // Verify it's a directory
        if !path.is_dir() {
            return Err(anyhow!("Le chemin spécifié n'est pas un répertoire"));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PMOSIGNAGE_CONFIG` environment variable
    /// 3. `.pmosignage` in the current directory
    /// 4. `.pmosignage` in the user's home directory
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created or validated
    pub fn config_dir(directory: &str) -> String {
        let dir_path = Self::find_config_dir(directory);
        let path = Path::new(&dir_path);

        Self::validate_config_dir(path)
            .expect("Impossible de valider le répertoire de configuration");

        dir_path
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
        // Obtenir le répertoire de configuration
        let config_dir = Self::config_dir(directory);
        info!(config_dir = %config_dir, "Using config directory");

        // Construire le chemin du fichier config.yaml
        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        // Charger la configuration par défaut
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        // Essayer de charger le fichier de configuration
        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file = %path, "Loaded config file");
            data
        } else {
            info!(config_file = %path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Merger avec la config par défaut
        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = Self::lower_keys_value(default_value);

        // Appliquer les overrides depuis les variables d'environnement
        Self::apply_env_overrides(&mut config_value);

        // Créer la configuration
        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        // Sauvegarder la configuration
        config.save()?;
        Ok(config)
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["playlist", "url"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        Self::set_value_internal(&mut data, path, value)?;
        drop(data);
        self.save()?;
        Ok(())
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = path[0].to_lowercase();
            let key_value = Value::String(key);
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["playlist", "url"]`)
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();

                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                let key_path = key
                    .trim_start_matches(ENV_PREFIX)
                    .split("__")
                    .collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        let new_key = Value::String(s.to_lowercase());
                        new_map.insert(new_key, Self::lower_keys_value(v));
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Résout un chemin relatif ou absolu et crée le répertoire si nécessaire
    fn resolve_and_create_dir(&self, dir_path: &str) -> Result<String> {
        let path = Path::new(dir_path);

        let absolute_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            // Chemin relatif : le résoudre par rapport à config_dir
            Path::new(&self.config_dir).join(path)
        };

        if !absolute_path.exists() {
            fs::create_dir_all(&absolute_path)?;
            info!(directory = %absolute_path.display(), "Created cache directory");
        }

        Ok(absolute_path.to_string_lossy().to_string())
    }

    /// Résout un chemin de fichier relatif ou absolu par rapport au config_dir
    fn resolve_file(&self, file_path: &str) -> String {
        let path = Path::new(file_path);
        if path.is_absolute() {
            file_path.to_string()
        } else {
            Path::new(&self.config_dir)
                .join(path)
                .to_string_lossy()
                .to_string()
        }
    }

    /// Gets the remote playlist listing URL
    ///
    /// Returns the configured URL, or the default endpoint if not
    /// configured or invalid.
    pub fn get_playlist_url(&self) -> String {
        match self.get_value(&["playlist", "url"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => {
                tracing::warn!(
                    "Playlist URL is not a string or empty, using default {}",
                    DEFAULT_PLAYLIST_URL
                );
                DEFAULT_PLAYLIST_URL.to_string()
            }
        }
    }

    /// Sets the remote playlist listing URL
    pub fn set_playlist_url(&self, url: impl Into<String>) -> Result<()> {
        self.set_value(&["playlist", "url"], Value::String(url.into()))
    }

    /// Gets the absolute path of the on-device fallback playlist file
    ///
    /// A relative configured path is resolved against the config directory.
    /// The file itself may not exist: the fallback is best-effort.
    pub fn get_fallback_playlist_path(&self) -> String {
        let configured = match self.get_value(&["playlist", "fallback"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => DEFAULT_FALLBACK_FILE.to_string(),
        };
        self.resolve_file(&configured)
    }

    /// Gets the media cache directory, creating it if needed
    ///
    /// A relative configured path is resolved against the config directory.
    pub fn get_media_cache_dir(&self) -> Result<String> {
        let dir_path = match self.get_value(&["cache", "directory"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => DEFAULT_CACHE_DIR.to_string(),
        };
        self.resolve_and_create_dir(&dir_path)
    }

    /// Sets the media cache directory
    pub fn set_media_cache_dir(&self, directory: impl Into<String>) -> Result<()> {
        self.set_value(&["cache", "directory"], Value::String(directory.into()))
    }

    impl_ms_config!(
        get_prefetch_grace_ms,
        set_prefetch_grace_ms,
        &["player", "prefetch_grace_ms"],
        DEFAULT_PREFETCH_GRACE_MS
    );

    impl_ms_config!(
        get_failure_backoff_ms,
        set_failure_backoff_ms,
        &["player", "failure_backoff_ms"],
        DEFAULT_FAILURE_BACKOFF_MS
    );

    impl_ms_config!(
        get_countdown_tick_ms,
        set_countdown_tick_ms,
        &["player", "countdown_tick_ms"],
        DEFAULT_COUNTDOWN_TICK_MS
    );
}

/// Returns the global configuration singleton
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merge les valeurs externes dans la configuration par défaut
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
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_in_temp_dir() -> (tempfile::TempDir, Config) {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(temp_dir.path().to_str().unwrap()).unwrap();
        (temp_dir, config)
    }

    #[test]
    fn test_defaults_from_embedded_config() {
        let (_temp_dir, config) = load_in_temp_dir();

        assert_eq!(config.get_playlist_url(), DEFAULT_PLAYLIST_URL);
        assert_eq!(config.get_prefetch_grace_ms(), DEFAULT_PREFETCH_GRACE_MS);
        assert_eq!(config.get_failure_backoff_ms(), DEFAULT_FAILURE_BACKOFF_MS);
        assert_eq!(config.get_countdown_tick_ms(), DEFAULT_COUNTDOWN_TICK_MS);
    }

    #[test]
    fn test_set_and_get_roundtrip() {
        let (_temp_dir, config) = load_in_temp_dir();

        config
            .set_playlist_url("http://signage.local/playlist")
            .unwrap();
        assert_eq!(config.get_playlist_url(), "http://signage.local/playlist");

        config.set_prefetch_grace_ms(500).unwrap();
        assert_eq!(config.get_prefetch_grace_ms(), 500);
    }

    #[test]
    fn test_cache_dir_is_created_relative_to_config_dir() {
        let (temp_dir, config) = load_in_temp_dir();

        let cache_dir = config.get_media_cache_dir().unwrap();
        assert!(Path::new(&cache_dir).is_dir());
        assert!(cache_dir.starts_with(temp_dir.path().to_str().unwrap()));
    }

    #[test]
    fn test_fallback_path_resolves_against_config_dir() {
        let (temp_dir, config) = load_in_temp_dir();

        let fallback = config.get_fallback_playlist_path();
        assert!(fallback.starts_with(temp_dir.path().to_str().unwrap()));
        assert!(fallback.ends_with("playlist.yaml"));
    }

    #[test]
    fn test_saved_config_file_is_reloaded() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().to_str().unwrap();

        let config = Config::load_config(dir).unwrap();
        config.set_playlist_url("http://example.com/list").unwrap();
        drop(config);

        let reloaded = Config::load_config(dir).unwrap();
        assert_eq!(reloaded.get_playlist_url(), "http://example.com/list");
    }
}
