//! # Gift Redeemer
//!
//! Redeems single-use promotional gift codes against the platform's HTTP API
//! using a pool of account tokens.
//!
//! ## Architecture Overview
//!
//! - **[`redeem::classifier`]**: maps raw response bodies to an [`Outcome`]
//! - **[`redeem::extractor`]**: finds gift codes behind known link prefixes in free text
//! - **[`redeem::engine`]**: walks the token pool per code, applies the server's
//!   rate-limit cool-down and remembers every code it has seen
//!
//! Text scraping sources, credential acquisition and persistence of engine
//! state are left to the caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gift_redeemer::{RedeemerConfig, RedemptionEngine, TokenEntry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RedeemerConfig {
//!         tokens: vec![TokenEntry::new("token").with_payment_source("pm_123")],
//!         ..Default::default()
//!     };
//!     let engine = RedemptionEngine::with_http(config)?;
//!
//!     for result in engine.redeem_text("discord.gift/AbCdEf1234567890").await {
//!         println!("{}: {}", result.code, result.outcome);
//!     }
//!     Ok(())
//! }
//! ```

/// Redemption engine, response classification and code extraction.
pub mod redeem;

/// Environment constants and path utilities.
pub mod env;

/// Command line interface and configuration discovery.
pub mod cli;

pub use redeem::{
    CodeExtractor, ConfigError, GiftTransport, HttpTransport, Outcome, RedeemError,
    RedeemerConfig, Redemption, RedemptionEngine, TokenEntry, TransportError, classify,
    find_codes,
};
