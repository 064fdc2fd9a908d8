//! Environment constants and path utilities for the gift redeemer.
//!
//! This module centralizes the hardcoded endpoints, link prefixes and
//! configuration paths used throughout the application.

use std::path::{Path, PathBuf};

/// Application directory name (hidden directory like .git, .vscode)
pub const APP_DIR_NAME: &str = ".redeemer";

/// Configuration file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up directly in the current directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "redeemer.toml";

/// System-wide configuration file (Unix-like systems)
pub const SYSTEM_CONFIG_FILE: &str = "/etc/redeemer/config.toml";

/// Redemption API constants
pub mod api {
    /// Base URL every redemption path is appended to
    pub const DEFAULT_API_BASE: &str = "https://discordapp.com/api/v8";

    /// Browser user agent sent with every redemption request
    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.128 \
        Safari/537.36 OPR/75.0.3969.285";

    /// Per-request timeout
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Cool-down used when a rate-limit body carries no usable `retry_after`
    pub const DEFAULT_FALLBACK_RETRY_AFTER_SECS: f64 = 5.0;

    /// Build the redemption path for a gift code, relative to the API base
    pub fn redeem_path(code: &str) -> String {
        format!("entitlements/gift-codes/{}/redeem", code)
    }
}

/// Gift link constants
pub mod gift {
    /// Hosts and paths a gift code is published under
    pub const LINK_PREFIXES: [&str; 3] = ["discord.gift", "discordapp.com/gifts", "discord.com/gifts"];

    /// Shortest code accepted after a link prefix
    pub const MIN_CODE_LEN: usize = 16;

    /// Longest code accepted after a link prefix
    pub const MAX_CODE_LEN: usize = 24;
}

/// Build the application directory path in the user's home directory
pub fn user_config_dir_path(home_dir: &Path) -> PathBuf {
    home_dir.join(APP_DIR_NAME)
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    user_config_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build local config file path in current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    current_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths() {
        let home_dir = Path::new("/home/user");
        let current_dir = Path::new("/current/project");

        assert_eq!(
            user_config_file_path(home_dir),
            Path::new("/home/user/.redeemer/config.toml")
        );

        assert_eq!(
            local_config_file_path(current_dir),
            Path::new("/current/project/.redeemer/config.toml")
        );
    }

    #[test]
    fn test_redeem_path() {
        assert_eq!(
            api::redeem_path("AbCdEf1234567890"),
            "entitlements/gift-codes/AbCdEf1234567890/redeem"
        );
    }
}
