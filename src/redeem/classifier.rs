//! Maps raw redemption response bodies onto [`Outcome`].
//!
//! Matching is plain substring search over an ordered signature table. The
//! first signature found in the body wins, so table order matters whenever a
//! body could carry more than one marker.

use crate::redeem::types::Outcome;

/// Known error fragments, checked in order.
pub const SIGNATURES: &[(&str, Outcome)] = &[
    (
        r#"{"message": "Unknown Gift Code", "code": 10038}"#,
        Outcome::InvalidGift,
    ),
    (
        r#"{"message": "This gift has been redeemed already.", "code": 50050}"#,
        Outcome::AlreadyClaimed,
    ),
    (
        r#"{"message": "Payment source required to redeem gift.", "code": 50070}"#,
        Outcome::NoPaymentSource,
    ),
    (
        r#"{"message": "Already purchased", "code": 100011}"#,
        Outcome::AlreadyPurchased,
    ),
    (
        r#"{"message": "You need to verify your account in order to perform this action.", "code": 40002}"#,
        Outcome::NotVerified,
    ),
    ("You are being rate limited", Outcome::RateLimited),
    ("Access denied", Outcome::AccessDenied),
];

/// Classify a response body. Anything unrecognised counts as [`Outcome::Claimed`].
pub fn classify(body: &str) -> Outcome {
    SIGNATURES
        .iter()
        .find(|(signature, _)| body.contains(signature))
        .map(|(_, outcome)| *outcome)
        .unwrap_or(Outcome::Claimed)
}
