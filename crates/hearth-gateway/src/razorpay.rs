//! Razorpay orders API client.

use crate::payment::{CreateGatewayOrder, GatewayOrder, PaymentGateway};
use crate::signature::verify_hmac_sha256_hex;
use crate::GatewayError;
use async_trait::async_trait;
use hearth_data::{ClientRequestBuilder, FetchClient};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

const SERVICE: &str = "razorpay";

pub const DEFAULT_API_BASE: &str = "https://api.razorpay.com";

/// Razorpay credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    /// Webhook secret. Webhooks are rejected when unset.
    pub webhook_secret: Option<String>,
    pub api_base: String,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            key_secret: String::new(),
            webhook_secret: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Serialize)]
struct OrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    notes: &'a BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct RazorpayClient {
    config: RazorpayConfig,
    http: FetchClient,
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig, timeout: Duration) -> Result<Self, GatewayError> {
        let http = FetchClient::with_timeout(timeout)
            .map_err(GatewayError::fetch(SERVICE))?
            .with_base_url(config.api_base.clone())
            .with_default_header("Accept", "application/json");
        Ok(Self { config, http })
    }

    fn order_request(&self, order: &CreateGatewayOrder) -> Result<ClientRequestBuilder, GatewayError> {
        if self.config.key_id.is_empty() || self.config.key_secret.is_empty() {
            return Err(GatewayError::NotConfigured("Payment gateway"));
        }
        order.validate()?;
        let body = OrderBody {
            amount: order.amount.amount_minor,
            currency: order.amount.currency.code(),
            receipt: &order.receipt,
            notes: &order.notes,
        };
        self.http
            .post("/v1/orders")
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&body)
            .map_err(|e| GatewayError::InvalidInput(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    fn key_id(&self) -> &str {
        &self.config.key_id
    }

    async fn create_order(&self, order: CreateGatewayOrder) -> Result<GatewayOrder, GatewayError> {
        let created: GatewayOrder = self
            .order_request(&order)?
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(GatewayError::fetch(SERVICE))?
            .json()
            .map_err(GatewayError::invalid_response(SERVICE))?;
        tracing::info!(
            gateway_order_id = %created.id,
            receipt = %order.receipt,
            amount = created.amount,
            "gateway order created"
        );
        Ok(created)
    }

    fn verify_payment_signature(
        &self,
        gateway_order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> bool {
        if self.config.key_secret.is_empty() {
            return false;
        }
        let payload = format!("{gateway_order_id}|{payment_id}");
        verify_hmac_sha256_hex(
            self.config.key_secret.as_bytes(),
            payload.as_bytes(),
            signature,
        )
    }

    fn verify_webhook(&self, body: &[u8], signature: &str) -> bool {
        match self.config.webhook_secret.as_deref() {
            Some(secret) if !secret.is_empty() => {
                verify_hmac_sha256_hex(secret.as_bytes(), body, signature)
            }
            _ => {
                tracing::warn!("webhook received but no webhook secret is configured");
                false
            }
        }
    }
}
