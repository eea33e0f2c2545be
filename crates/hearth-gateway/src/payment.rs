//! Payment gateway interface.

use crate::GatewayError;
use async_trait::async_trait;
use hearth_commerce::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request for a gateway-side order (payment intent).
#[derive(Debug, Clone, PartialEq)]
pub struct CreateGatewayOrder {
    pub amount: Money,
    /// Our order number, echoed back by the gateway.
    pub receipt: String,
    pub notes: BTreeMap<String, String>,
}

impl CreateGatewayOrder {
    pub fn new(amount: Money, receipt: impl Into<String>) -> Self {
        Self {
            amount,
            receipt: receipt.into(),
            notes: BTreeMap::new(),
        }
    }

    pub fn note(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.notes.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if !self.amount.is_positive() {
            return Err(GatewayError::InvalidInput(
                "Payment amount must be greater than zero".into(),
            ));
        }
        if self.receipt.is_empty() || self.receipt.len() > 40 {
            return Err(GatewayError::InvalidInput(
                "Receipt must be between 1 and 40 characters".into(),
            ));
        }
        Ok(())
    }
}

/// Order as created on the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A payment gateway reached over HTTP.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key handed to the client-side checkout widget.
    fn key_id(&self) -> &str;

    async fn create_order(&self, order: CreateGatewayOrder) -> Result<GatewayOrder, GatewayError>;

    /// Check the signature the widget returns after a successful payment.
    fn verify_payment_signature(&self, gateway_order_id: &str, payment_id: &str, signature: &str)
        -> bool;

    /// Check a webhook delivery against the raw request body.
    fn verify_webhook(&self, body: &[u8], signature: &str) -> bool;
}

/// Webhook events that settle an order.
pub const SETTLING_EVENTS: &[&str] = &["payment.captured", "order.paid"];

/// A parsed webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl WebhookEvent {
    pub fn parse(body: &[u8]) -> Result<Self, GatewayError> {
        serde_json::from_slice(body)
            .map_err(|e| GatewayError::InvalidInput(format!("malformed webhook body: {e}")))
    }

    /// Whether this event means the order has been paid.
    pub fn is_settling(&self) -> bool {
        SETTLING_EVENTS.contains(&self.event.as_str())
    }

    /// Gateway order id the event refers to.
    pub fn gateway_order_id(&self) -> Option<&str> {
        self.payload
            .pointer("/order/entity/id")
            .or_else(|| self.payload.pointer("/payment/entity/order_id"))
            .and_then(|v| v.as_str())
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.payload
            .pointer("/payment/entity/id")
            .and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_commerce::Currency;

    #[test]
    fn test_order_request_validation() {
        let ok = CreateGatewayOrder::new(Money::new(95_000, Currency::INR), "HRT-1001");
        assert!(ok.validate().is_ok());

        let zero = CreateGatewayOrder::new(Money::zero(Currency::INR), "HRT-1001");
        assert!(zero.validate().is_err());

        let long = CreateGatewayOrder::new(Money::new(100, Currency::INR), "x".repeat(41));
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_payment_captured_event() {
        let body = br#"{
            "event": "payment.captured",
            "payload": {"payment": {"entity": {"id": "pay_29QQoUBi66xm2f", "order_id": "order_9A33XWu170gUtm"}}}
        }"#;
        let event = WebhookEvent::parse(body).unwrap();
        assert!(event.is_settling());
        assert_eq!(event.gateway_order_id(), Some("order_9A33XWu170gUtm"));
        assert_eq!(event.payment_id(), Some("pay_29QQoUBi66xm2f"));
    }

    #[test]
    fn test_order_paid_event_prefers_order_entity() {
        let body = br#"{
            "event": "order.paid",
            "payload": {
                "order": {"entity": {"id": "order_A"}},
                "payment": {"entity": {"id": "pay_B", "order_id": "order_A"}}
            }
        }"#;
        let event = WebhookEvent::parse(body).unwrap();
        assert_eq!(event.gateway_order_id(), Some("order_A"));
    }

    #[test]
    fn test_other_events_do_not_settle() {
        let event = WebhookEvent::parse(br#"{"event":"payment.failed","payload":{}}"#).unwrap();
        assert!(!event.is_settling());
        assert!(event.gateway_order_id().is_none());
        assert!(WebhookEvent::parse(b"not json").is_err());
    }
}
