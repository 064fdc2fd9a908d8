//! Network seam of the redemption engine.
//!
//! [`GiftTransport`] is the only place the engine suspends. [`HttpTransport`]
//! is the production implementation; tests swap in scripted transports.

use crate::env;
use crate::redeem::types::{RedeemRequest, RedeemerConfig, TransportResponse};
use futures::future::BoxFuture;
use reqwest::{Client, Proxy};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::{Instrument, debug, debug_span};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Connection failed: {0}")]
    Connect(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout(error.to_string())
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

/// Sends one redemption request and returns the raw response.
pub trait GiftTransport: Send + Sync {
    /// The body must be returned whatever the HTTP status; classification
    /// happens on the text, not the status code.
    fn redeem(
        &self,
        request: RedeemRequest,
    ) -> BoxFuture<'_, Result<TransportResponse, TransportError>>;
}

#[derive(Debug, Serialize)]
struct RedeemPayload<'a> {
    channel_id: Option<&'a str>,
    payment_source_id: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    api_base: String,
}

impl HttpTransport {
    pub fn new(config: &RedeemerConfig) -> Result<Self, TransportError> {
        let builder = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str());

        // Environment proxy variables are ignored unless a proxy is configured.
        let builder = match &config.proxy {
            Some(proxy) => builder.proxy(Proxy::all(proxy.as_str())?),
            None => builder.no_proxy(),
        };
        let client = builder.build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn redeem_url(&self, code: &str) -> String {
        format!("{}/{}", self.api_base, env::api::redeem_path(code))
    }
}

impl GiftTransport for HttpTransport {
    fn redeem(
        &self,
        request: RedeemRequest,
    ) -> BoxFuture<'_, Result<TransportResponse, TransportError>> {
        let span = debug_span!("redeem_request", code = %request.code);
        Box::pin(
            async move {
                let url = self.redeem_url(&request.code);
                let payload = RedeemPayload {
                    channel_id: None,
                    payment_source_id: request.payment_source_id.as_deref(),
                };

                let response = self
                    .client
                    .post(&url)
                    .header(CONTENT_TYPE, "application/json")
                    .header(AUTHORIZATION, request.token.as_str())
                    .json(&payload)
                    .send()
                    .await?;

                let status = response.status().as_u16();
                let body = response
                    .text()
                    .await
                    .map_err(|e| TransportError::Body(e.to_string()))?;

                debug!(status, bytes = body.len(), "Redemption response received");
                Ok(TransportResponse { status, body })
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redeem_url_trims_trailing_slash() {
        let config = RedeemerConfig {
            api_base: "https://example.test/api/v8/".to_string(),
            ..Default::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(
            transport.redeem_url("AbCdEf1234567890"),
            "https://example.test/api/v8/entitlements/gift-codes/AbCdEf1234567890/redeem"
        );
    }

    #[test]
    fn test_payload_serializes_nulls() {
        let payload = RedeemPayload {
            channel_id: None,
            payment_source_id: None,
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"channel_id":null,"payment_source_id":null}"#
        );

        let payload = RedeemPayload {
            channel_id: None,
            payment_source_id: Some("pm_1"),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"channel_id": null, "payment_source_id": "pm_1"})
        );
    }
}
