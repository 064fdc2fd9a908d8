//! The redemption engine: cache, token rotation and global backoff.
//!
//! ## Attempt loop
//!
//! `redeem` reserves the code in the cache with a single atomic
//! insert-if-absent, then walks a snapshot of the token pool in insertion
//! order. After every response the classified outcome overwrites the cache
//! entry and decides whether the loop stops, moves to the next token, or
//! drops the current token for good.
//!
//! Rate limits are tracked once per engine, not per token. While a signalled
//! cool-down is running no request is made for any code.

use crate::redeem::backoff::{BackoffState, BackoffStatus, parse_retry_after};
use crate::redeem::classifier::classify;
use crate::redeem::extractor::CodeExtractor;
use crate::redeem::latency::{LatencySummary, LatencyTracker};
use crate::redeem::token_pool::{TokenPool, mask_token};
use crate::redeem::transport::{GiftTransport, HttpTransport, TransportError};
use crate::redeem::types::{
    ConfigError, Outcome, RedeemError, RedeemRequest, RedeemerConfig, Redemption, TokenEntry,
    TransportResponse,
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct RedemptionEngine {
    config: RedeemerConfig,
    transport: Arc<dyn GiftTransport>,
    extractor: CodeExtractor,
    tokens: TokenPool,
    cache: DashMap<String, Outcome>,
    backoff: BackoffState,
    latency: LatencyTracker,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub tokens_remaining: usize,
    pub cached_codes: usize,
    pub backoff: BackoffStatus,
    pub latency: LatencySummary,
}

impl RedemptionEngine {
    pub fn new(
        config: RedeemerConfig,
        transport: Arc<dyn GiftTransport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let extractor = CodeExtractor::new(&config.link_prefixes)?;
        let tokens = TokenPool::new(config.tokens.iter().cloned());

        Ok(Self {
            config,
            transport,
            extractor,
            tokens,
            cache: DashMap::new(),
            backoff: BackoffState::new(),
            latency: LatencyTracker::new(),
        })
    }

    /// Engine backed by [`HttpTransport`].
    pub fn with_http(config: RedeemerConfig) -> Result<Self, RedeemError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport))?)
    }

    pub fn config(&self) -> &RedeemerConfig {
        &self.config
    }

    pub fn extractor(&self) -> &CodeExtractor {
        &self.extractor
    }

    pub fn tokens(&self) -> &TokenPool {
        &self.tokens
    }

    pub fn backoff(&self) -> &BackoffState {
        &self.backoff
    }

    pub fn latency(&self) -> &LatencyTracker {
        &self.latency
    }

    pub fn cached_outcome(&self, code: &str) -> Option<Outcome> {
        self.cache.get(code).map(|entry| *entry.value())
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Redeem one code, at most once per engine.
    pub async fn redeem(&self, code: &str) -> Redemption {
        match self.cache.entry(code.to_string()) {
            Entry::Occupied(_) => {
                debug!(code, "Code already seen, skipping");
                return Redemption {
                    code: code.to_string(),
                    token: None,
                    outcome: Outcome::InCache,
                };
            }
            // Placeholder until a response arrives.
            Entry::Vacant(slot) => {
                slot.insert(Outcome::RateLimited);
            }
        }

        let mut outcome = Outcome::RateLimited;
        let mut payment_required = false;
        let mut last_token = None;

        for entry in self.tokens.snapshot().await {
            last_token = Some(entry.token.clone());

            if payment_required && entry.payment_source_id.is_none() {
                continue;
            }

            // Another redemption may have dropped it since the snapshot.
            if !self.tokens.contains(&entry.token).await {
                continue;
            }

            if let Some(remaining) = self.backoff.remaining().await {
                debug!(code, ?remaining, "Rate limit cool-down active, stopping");
                break;
            }

            let response = match self.attempt(code, &entry).await {
                Ok(response) => response,
                Err(error) => {
                    warn!(code, token = %mask_token(&entry.token), %error, "Redemption request failed");
                    outcome = Outcome::NetworkError;
                    self.cache.insert(code.to_string(), outcome);
                    break;
                }
            };

            outcome = classify(&response.body);
            self.cache.insert(code.to_string(), outcome);
            debug!(code, token = %mask_token(&entry.token), status = response.status, %outcome, "Attempt classified");

            match outcome {
                Outcome::Claimed => {
                    info!(code, token = %mask_token(&entry.token), body = %response.body, "Gift claimed");
                }
                Outcome::AlreadyClaimed | Outcome::InvalidGift => {}
                Outcome::NoPaymentSource => {
                    payment_required = true;
                }
                Outcome::AlreadyPurchased | Outcome::AccessDenied => {}
                Outcome::NotVerified => {
                    if self.tokens.remove(&entry.token).await {
                        warn!(token = %mask_token(&entry.token), "Token is not verified, removed from pool");
                    }
                }
                Outcome::RateLimited => {
                    let delay = parse_retry_after(&response.body)
                        .unwrap_or_else(|| self.config.fallback_retry_after());
                    self.backoff.record(delay).await;
                    warn!(code, ?delay, "Rate limited, backing off");
                    break;
                }
                // Never produced by the classifier.
                Outcome::InCache | Outcome::NetworkError => break,
            }

            if outcome.is_terminal() {
                break;
            }
        }

        Redemption {
            code: code.to_string(),
            token: last_token,
            outcome,
        }
    }

    /// Redeem several codes concurrently. Results keep the input order.
    pub async fn redeem_all<I, S>(&self, codes: I) -> Vec<Redemption>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes: Vec<String> = codes.into_iter().map(|c| c.as_ref().to_string()).collect();
        join_all(codes.iter().map(|code| self.redeem(code))).await
    }

    /// Extract codes from `text` and redeem them.
    pub async fn redeem_text(&self, text: &str) -> Vec<Redemption> {
        let codes = self.extractor.find_codes(text);
        if !codes.is_empty() {
            info!(count = codes.len(), "Found gift codes in text");
        }
        self.redeem_all(codes).await
    }

    pub async fn status(&self) -> EngineStatus {
        EngineStatus {
            tokens_remaining: self.tokens.len().await,
            cached_codes: self.cache.len(),
            backoff: self.backoff.status().await,
            latency: self.latency.summary().await,
        }
    }

    async fn attempt(
        &self,
        code: &str,
        entry: &TokenEntry,
    ) -> Result<TransportResponse, TransportError> {
        let mut retries = 0;

        loop {
            let request = RedeemRequest {
                code: code.to_string(),
                token: entry.token.clone(),
                payment_source_id: entry.payment_source_id.clone(),
            };

            let started = Instant::now();
            match self.transport.redeem(request).await {
                Ok(response) => {
                    self.latency.record(started.elapsed()).await;
                    return Ok(response);
                }
                Err(error) if retries < self.config.max_transport_retries => {
                    retries += 1;
                    let delay = self.retry_delay();
                    debug!(code, retries, ?delay, %error, "Retrying redemption request");
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn retry_delay(&self) -> Duration {
        let base = self.config.transport_retry_delay();
        // ±10% jitter
        let jitter = (rand::random::<f64>() - 0.5) * 0.2;
        base.mul_f64(1.0 + jitter)
    }
}
