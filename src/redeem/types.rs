use crate::env;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Result of one redemption attempt, or of the cache lookup that skipped it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    RateLimited,
    InvalidGift,
    AlreadyClaimed,
    NoPaymentSource,
    AlreadyPurchased,
    AccessDenied,
    NotVerified,
    Claimed,
    InCache,
    /// The request never produced a response body (timeout, refused connection, ...).
    NetworkError,
}

impl Outcome {
    /// Outcomes that settle the code; no other token can change them.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Outcome::Claimed | Outcome::AlreadyClaimed | Outcome::InvalidGift
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::RateLimited => "rate_limited",
            Outcome::InvalidGift => "invalid_gift",
            Outcome::AlreadyClaimed => "already_claimed",
            Outcome::NoPaymentSource => "no_payment_source",
            Outcome::AlreadyPurchased => "already_purchased",
            Outcome::AccessDenied => "access_denied",
            Outcome::NotVerified => "not_verified",
            Outcome::Claimed => "claimed",
            Outcome::InCache => "in_cache",
            Outcome::NetworkError => "network_error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What `redeem` hands back: the last token the loop visited and the final outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    pub code: String,
    pub token: Option<String>,
    pub outcome: Outcome,
}

/// A credential and the payment source attached to its account, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub token: String,
    #[serde(default)]
    pub payment_source_id: Option<String>,
}

impl TokenEntry {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            payment_source_id: None,
        }
    }

    pub fn with_payment_source(mut self, payment_source_id: impl Into<String>) -> Self {
        self.payment_source_id = Some(payment_source_id.into());
        self
    }
}

/// One POST against the redemption endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemRequest {
    pub code: String,
    pub token: String,
    pub payment_source_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedeemerConfig {
    pub api_base: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_transport_retries: u32,
    pub transport_retry_delay_ms: u64,
    pub fallback_retry_after_secs: f64,
    /// Proxy URL for every request. Environment proxy variables are not used.
    pub proxy: Option<String>,
    pub link_prefixes: Vec<String>,
    pub tokens: Vec<TokenEntry>,
}

impl RedeemerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn transport_retry_delay(&self) -> Duration {
        Duration::from_millis(self.transport_retry_delay_ms)
    }

    pub fn fallback_retry_after(&self) -> Duration {
        Duration::try_from_secs_f64(self.fallback_retry_after_secs).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.api_base).map_err(|e| ConfigError::InvalidApiBase {
            url: self.api_base.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiBase {
                url: self.api_base.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if self.link_prefixes.iter().all(|p| p.trim_matches('/').is_empty()) {
            return Err(ConfigError::InvalidLinkPrefixes(
                "at least one non-empty link prefix is required".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be at least one second".to_string(),
            });
        }

        if !self.fallback_retry_after_secs.is_finite() || self.fallback_retry_after_secs < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "fallback_retry_after_secs",
                reason: "must be a finite, non-negative number of seconds".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for RedeemerConfig {
    fn default() -> Self {
        Self {
            api_base: env::api::DEFAULT_API_BASE.to_string(),
            user_agent: env::api::DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: env::api::DEFAULT_REQUEST_TIMEOUT_SECS,
            max_transport_retries: 1,
            transport_retry_delay_ms: 250,
            fallback_retry_after_secs: env::api::DEFAULT_FALLBACK_RETRY_AFTER_SECS,
            proxy: None,
            link_prefixes: env::gift::LINK_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            tokens: Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidApiBase { url: String, reason: String },
    #[error("Invalid link prefixes: {0}")]
    InvalidLinkPrefixes(String),
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("Failed to access config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Could not determine home directory")]
    NoHomeDir,
}

#[derive(Debug, thiserror::Error)]
pub enum RedeemError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] crate::redeem::transport::TransportError),
}
