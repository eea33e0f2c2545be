//! Server-side cart pricing.
//!
//! Clients send product ids, sizes and quantities only. Every price comes
//! from the stored product.

use crate::catalog::Product;
use crate::checkout::OrderItem;
use crate::ids::ProductId;
use crate::money::Money;
use crate::pricing::{OrderTotals, PricingConfig};
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// Maximum quantity of a single line.
pub const MAX_LINE_QUANTITY: i64 = 99;

/// One line of a client cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: i64,
}

/// A priced cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    /// Priced lines.
    pub items: Vec<OrderItem>,
    /// Applied coupon code, normalized.
    pub coupon_code: Option<String>,
    /// Totals breakdown.
    #[serde(flatten)]
    pub totals: OrderTotals,
}

/// Price cart lines against stored products.
///
/// `lookup` resolves a product id to the stored product. Unknown products,
/// unknown sizes, out-of-stock products and bad quantities are rejected.
pub fn price_items<'a, F>(items: &[CartItem], lookup: F) -> Result<Vec<OrderItem>, CommerceError>
where
    F: Fn(&ProductId) -> Option<&'a Product>,
{
    if items.is_empty() {
        return Err(CommerceError::validation("Cart is empty"));
    }

    items
        .iter()
        .map(|item| {
            if !(1..=MAX_LINE_QUANTITY).contains(&item.quantity) {
                return Err(CommerceError::validation(format!(
                    "Quantity must be between 1 and {}",
                    MAX_LINE_QUANTITY
                )));
            }
            let product = lookup(&item.product_id)
                .ok_or_else(|| CommerceError::not_found("Product", item.product_id.as_str()))?;
            if !product.in_stock {
                return Err(CommerceError::validation(format!(
                    "{} is out of stock",
                    product.title
                )));
            }
            let tier = product.tier(&item.size).ok_or_else(|| {
                CommerceError::validation(format!(
                    "{} is not available in size {}",
                    product.title, item.size
                ))
            })?;

            Ok(OrderItem {
                product_id: product.id.clone(),
                title: product.title.clone(),
                size: tier.size.clone(),
                quantity: item.quantity,
                unit_price: product.effective_price(tier),
                image: product.cover_image().map(str::to_string),
            })
        })
        .collect()
}

/// Sum of line totals.
pub fn subtotal(items: &[OrderItem], config: &PricingConfig) -> Result<Money, CommerceError> {
    items.iter().try_fold(Money::zero(config.currency), |acc, item| {
        acc.try_add(&item.line_total()?)
    })
}

impl Quote {
    /// Price lines and totals under an already validated coupon percent.
    pub fn build(
        items: Vec<OrderItem>,
        coupon: Option<(String, u8)>,
        config: &PricingConfig,
    ) -> Result<Self, CommerceError> {
        let subtotal = subtotal(&items, config)?;
        let (coupon_code, percent) = match coupon {
            Some((code, percent)) => (Some(code), percent),
            None => (None, 0),
        };
        let totals = OrderTotals::compute(subtotal, percent, config)?;
        Ok(Self {
            items,
            coupon_code,
            totals,
        })
    }
}
