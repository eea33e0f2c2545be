//! Order types and the order status state machine.

use crate::checkout::ShippingAddress;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::{Currency, Money};
use crate::pricing::OrderTotals;
use crate::CommerceError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, awaiting payment.
    #[default]
    Pending,
    /// Payment received.
    Confirmed,
    /// Order being prepared.
    Processing,
    /// Order shipped.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
    /// Order refunded.
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    /// Check if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Refunded)
    }

    /// Check if order can be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }

    /// Whether moving to `next` is allowed. Refunds need a paid order.
    pub fn can_transition_to(&self, next: OrderStatus, is_paid: bool) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Confirmed)
            | (Confirmed, Processing)
            | (Processing, Shipped)
            | (Shipped, Delivered) => true,
            (from, Cancelled) => from.can_cancel(),
            (from, Refunded) => is_paid && !from.is_terminal(),
            _ => false,
        }
    }
}

impl FromStr for OrderStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "refunded" => Ok(OrderStatus::Refunded),
            other => Err(CommerceError::validation(format!(
                "Unknown order status: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product line frozen at order time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Product ID.
    pub product_id: ProductId,
    /// Product title at time of order.
    pub title: String,
    /// Size label at time of order.
    pub size: String,
    /// Quantity ordered.
    pub quantity: i64,
    /// Post-discount unit price at time of order.
    pub unit_price: Money,
    /// Cover image at time of order.
    pub image: Option<String>,
}

impl OrderItem {
    /// Unit price times quantity.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.unit_price.try_multiply(self.quantity)
    }
}

/// Gateway payment state of an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentDetails {
    /// Gateway order created for this order.
    pub gateway_order_id: Option<String>,
    /// Gateway payment that settled it.
    pub gateway_payment_id: Option<String>,
    /// Signature the client returned for the payment.
    pub gateway_signature: Option<String>,
    /// Whether the payment has been verified.
    pub is_paid: bool,
    /// Unix timestamp of payment verification.
    pub paid_at: Option<i64>,
}

/// A customer order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Human-readable order number, also the gateway receipt.
    pub order_number: String,
    /// Customer user ID (None for guest).
    pub user_id: Option<UserId>,
    /// Items in the order.
    pub items: Vec<OrderItem>,
    /// Shipping address.
    pub shipping_address: ShippingAddress,
    /// Coupon applied at checkout.
    pub coupon_code: Option<String>,
    /// Subtotal before discounts.
    pub subtotal: Money,
    /// Total discount amount.
    pub discount_total: Money,
    /// Shipping cost.
    pub shipping_total: Money,
    /// Tax amount.
    pub tax_total: Money,
    /// Grand total charged.
    pub grand_total: Money,
    /// Gateway payment fields.
    pub payment: PaymentDetails,
    /// Order status.
    pub status: OrderStatus,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
    /// Unix timestamp when cancelled (if applicable).
    pub cancelled_at: Option<i64>,
}

impl Order {
    /// Start a pending, unpaid order from priced items.
    pub fn new(
        user_id: Option<UserId>,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        coupon_code: Option<String>,
        totals: OrderTotals,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: OrderId::generate(),
            order_number: Self::generate_order_number(),
            user_id,
            items,
            shipping_address,
            coupon_code,
            subtotal: totals.subtotal,
            discount_total: totals.discount_total,
            shipping_total: totals.shipping_total,
            tax_total: totals.tax_total,
            grand_total: totals.grand_total,
            payment: PaymentDetails::default(),
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        }
    }

    /// Generate a new order number, e.g. `ORD-20261014-1A2B3C4D`.
    pub fn generate_order_number() -> String {
        let date = chrono::Utc::now().format("%Y%m%d");
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("ORD-{}-{}", date, suffix[..8].to_uppercase())
    }

    /// Currency the order is charged in.
    pub fn currency(&self) -> Currency {
        self.grand_total.currency
    }

    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if order is paid.
    pub fn is_paid(&self) -> bool {
        self.payment.is_paid
    }

    /// Record a verified payment and confirm the order.
    ///
    /// Returns `false` without changing anything if the order was already paid.
    pub fn mark_paid(
        &mut self,
        gateway_payment_id: impl Into<String>,
        gateway_signature: Option<String>,
    ) -> bool {
        if self.payment.is_paid {
            return false;
        }
        let now = current_timestamp();
        self.payment.gateway_payment_id = Some(gateway_payment_id.into());
        self.payment.gateway_signature = gateway_signature;
        self.payment.is_paid = true;
        self.payment.paid_at = Some(now);
        if self.status == OrderStatus::Pending {
            self.status = OrderStatus::Confirmed;
        }
        self.updated_at = now;
        true
    }

    /// Move to a new status if the state machine allows it.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), CommerceError> {
        if !self.status.can_transition_to(next, self.is_paid()) {
            return Err(CommerceError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        let now = current_timestamp();
        if next == OrderStatus::Cancelled {
            self.cancelled_at = Some(now);
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Cancel the order.
    pub fn cancel(&mut self) -> Result<(), CommerceError> {
        self.transition(OrderStatus::Cancelled)
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::checkout::address::tests::address;
    use crate::pricing::PricingConfig;

    pub(crate) fn order() -> Order {
        let item = OrderItem {
            product_id: ProductId::new("prod_1"),
            title: "Ghee".into(),
            size: "500ml".into(),
            quantity: 2,
            unit_price: Money::new(40_000, Currency::INR),
            image: None,
        };
        let totals = OrderTotals::compute(
            item.line_total().unwrap(),
            0,
            &PricingConfig::default(),
        )
        .unwrap();
        Order::new(None, vec![item], address(), None, totals)
    }

    #[test]
    fn test_order_status_can_cancel() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(OrderStatus::Confirmed.can_cancel());
        assert!(!OrderStatus::Shipped.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
    }

    #[test]
    fn test_forward_path() {
        let mut o = order();
        assert!(o.mark_paid("pay_1", Some("sig".into())));
        assert_eq!(o.status, OrderStatus::Confirmed);
        for next in [OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered] {
            o.transition(next).unwrap();
        }
        o.transition(OrderStatus::Refunded).unwrap();
        assert!(o.status.is_terminal());
    }

    #[test]
    fn test_invalid_transitions() {
        let mut o = order();
        assert!(o.transition(OrderStatus::Shipped).is_err());
        // Unpaid orders cannot be refunded.
        assert!(o.transition(OrderStatus::Refunded).is_err());

        o.cancel().unwrap();
        assert!(o.cancelled_at.is_some());
        assert!(o.transition(OrderStatus::Confirmed).is_err());
    }

    #[test]
    fn test_shipped_order_cannot_be_cancelled() {
        let mut o = order();
        o.mark_paid("pay_1", None);
        o.transition(OrderStatus::Processing).unwrap();
        o.transition(OrderStatus::Shipped).unwrap();
        assert!(matches!(
            o.cancel(),
            Err(CommerceError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_mark_paid_is_idempotent() {
        let mut o = order();
        assert!(o.mark_paid("pay_1", None));
        let paid_at = o.payment.paid_at;
        assert!(!o.mark_paid("pay_2", None));
        assert_eq!(o.payment.gateway_payment_id.as_deref(), Some("pay_1"));
        assert_eq!(o.payment.paid_at, paid_at);
    }

    #[test]
    fn test_order_number_format() {
        let num = Order::generate_order_number();
        assert!(num.starts_with("ORD-"));
        assert_eq!(num.len(), "ORD-".len() + 8 + 1 + 8);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert!("lost".parse::<OrderStatus>().is_err());
    }
}
