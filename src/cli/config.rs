//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Current directory: ./redeemer.toml or ./.redeemer/config.toml
//! 2. User config: ~/.redeemer/config.toml
//! 3. System config: /etc/redeemer/config.toml
//! 4. Built-in defaults

use crate::env;
use crate::redeem::{ConfigError, RedeemerConfig};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

impl RedeemerConfig {
    /// Load and validate a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RedeemerConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Discover and load configuration using the hierarchy
    pub fn discover_config() -> Result<RedeemerConfig, ConfigError> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", config_path);
            return RedeemerConfig::from_toml_file(config_path);
        }

        info!("No configuration file found, using defaults");
        Ok(RedeemerConfig::default())
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        for candidate in Self::get_config_candidates() {
            debug!("Checking for config file: {:?}", candidate);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        debug!("No config file found in discovery hierarchy");
        None
    }

    /// Configuration file candidates in priority order
    fn get_config_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(current_dir) = std_env::current_dir() {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(&current_dir));
        }

        if let Some(home_dir) = Self::get_home_dir() {
            candidates.push(env::user_config_file_path(&home_dir));
        }

        #[cfg(unix)]
        candidates.push(PathBuf::from(env::SYSTEM_CONFIG_FILE));

        candidates
    }

    fn get_home_dir() -> Option<PathBuf> {
        std_env::var("HOME")
            .ok()
            .or_else(|| std_env::var("USERPROFILE").ok())
            .map(PathBuf::from)
    }

    /// Create a default config file in the user's home directory
    pub fn create_default_user_config() -> Result<PathBuf, ConfigError> {
        let home_dir = Self::get_home_dir().ok_or(ConfigError::NoHomeDir)?;
        let config_path = env::user_config_file_path(&home_dir);
        Self::create_default_config_at(&config_path)?;
        Ok(config_path)
    }

    /// Write the built-in defaults to `config_path`, creating parent
    /// directories. An existing file is left untouched and `false` is returned.
    pub fn create_default_config_at(config_path: &Path) -> Result<bool, ConfigError> {
        if let Some(config_dir) = config_path.parent()
            && !config_dir.as_os_str().is_empty()
            && !config_dir.exists()
        {
            fs::create_dir_all(config_dir).map_err(|source| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source,
            })?;
            info!("Created configuration directory: {:?}", config_dir);
        }

        if config_path.exists() {
            warn!("Configuration file already exists: {:?}", config_path);
            return Ok(false);
        }

        RedeemerConfig::default().to_toml_file(config_path)?;
        info!("Created default configuration file: {:?}", config_path);
        Ok(true)
    }

    /// Show configuration discovery information for debugging
    pub fn show_discovery_info() {
        println!("Configuration Discovery Hierarchy:");
        println!();

        for (i, candidate) in Self::get_config_candidates().iter().enumerate() {
            let status = if candidate.is_file() {
                "✓ EXISTS"
            } else if candidate.exists() {
                "✗ NOT A FILE"
            } else {
                "✗ NOT FOUND"
            };

            println!("  {}. {:?} - {}", i + 1, candidate, status);
        }

        println!();
        match Self::find_config_file() {
            Some(found) => println!("Active configuration: {:?}", found),
            None => println!("Active configuration: Built-in defaults"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redeem::TokenEntry;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("redeemer.toml");

        let original = RedeemerConfig {
            tokens: vec![
                TokenEntry::new("token-a"),
                TokenEntry::new("token-b").with_payment_source("pm_b"),
            ],
            ..Default::default()
        };

        original.to_toml_file(&config_path).unwrap();
        let loaded = RedeemerConfig::from_toml_file(&config_path).unwrap();

        assert_eq!(loaded.tokens, original.tokens);
        assert_eq!(loaded.api_base, original.api_base);
        assert_eq!(loaded.link_prefixes, original.link_prefixes);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("redeemer.toml");
        fs::write(
            &config_path,
            r#"
request_timeout_secs = 3

[[tokens]]
token = "token-a"

[[tokens]]
token = "token-b"
payment_source_id = "pm_b"
"#,
        )
        .unwrap();

        let config = RedeemerConfig::from_toml_file(&config_path).unwrap();
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.max_transport_retries, 1);
        assert_eq!(config.api_base, env::api::DEFAULT_API_BASE);
        assert_eq!(config.tokens.len(), 2);
        assert_eq!(config.tokens[0].payment_source_id, None);
        assert_eq!(config.tokens[1].payment_source_id.as_deref(), Some("pm_b"));
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();

        let bad_url = temp_dir.path().join("bad_url.toml");
        fs::write(&bad_url, "api_base = \"ftp://example.test\"\n").unwrap();
        assert!(matches!(
            RedeemerConfig::from_toml_file(&bad_url),
            Err(ConfigError::InvalidApiBase { .. })
        ));

        let bad_toml = temp_dir.path().join("bad.toml");
        fs::write(&bad_toml, "tokens = 42\n").unwrap();
        assert!(matches!(
            RedeemerConfig::from_toml_file(&bad_toml),
            Err(ConfigError::Parse { .. })
        ));

        assert!(matches!(
            RedeemerConfig::from_toml_file(temp_dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_config_candidates() {
        let candidates = ConfigDiscovery::get_config_candidates();

        assert!(!candidates.is_empty());
        assert_eq!(
            candidates[0].file_name().unwrap(),
            env::LOCAL_CONFIG_FILE_NAME
        );
    }

    #[test]
    fn test_create_default_config_at() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = env::user_config_file_path(temp_dir.path());

        assert!(ConfigDiscovery::create_default_config_at(&config_path).unwrap());
        assert!(env::user_config_dir_path(temp_dir.path()).is_dir());

        let loaded = RedeemerConfig::from_toml_file(&config_path).unwrap();
        let defaults = RedeemerConfig::default();
        assert_eq!(loaded.api_base, defaults.api_base);
        assert_eq!(loaded.link_prefixes, defaults.link_prefixes);
        assert!(loaded.tokens.is_empty());
    }

    #[test]
    fn test_create_default_config_keeps_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("redeemer.toml");
        fs::write(&config_path, "request_timeout_secs = 3\n").unwrap();

        assert!(!ConfigDiscovery::create_default_config_at(&config_path).unwrap());
        assert_eq!(
            fs::read_to_string(&config_path).unwrap(),
            "request_timeout_secs = 3\n"
        );
    }
}
