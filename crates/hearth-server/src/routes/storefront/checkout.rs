//! Coupon checks and cart quotes.

use crate::error::{ok, ApiError, ApiResult};
use crate::extract::CustomerSession;
use crate::state::AppState;
use actix_web::web;
use hearth_commerce::checkout::{price_items, subtotal, CartItem, Quote};
use hearth_commerce::{Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
    /// Cart subtotal in major units.
    #[serde(default)]
    pub subtotal: Option<f64>,
}

#[derive(Debug, Serialize)]
struct CouponAccepted {
    code: String,
    discount_percent: u8,
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

pub async fn validate_coupon(
    state: web::Data<AppState>,
    session: CustomerSession,
    body: web::Json<ValidateCouponRequest>,
) -> ApiResult {
    let subtotal = match body.subtotal {
        Some(amount) if !amount.is_finite() || amount < 0.0 => {
            return Err(ApiError::BadRequest("Subtotal must be a non-negative number".into()))
        }
        Some(amount) => Some(Money::from_major(amount, state.pricing.currency)),
        None => None,
    };
    let (coupon, discount_percent) = state
        .store
        .check_coupon(&body.code, session.user_id(), subtotal)
        .await?;
    Ok(ok(CouponAccepted {
        code: coupon.code,
        discount_percent,
    }))
}

pub async fn quote(
    state: web::Data<AppState>,
    session: CustomerSession,
    body: web::Json<QuoteRequest>,
) -> ApiResult {
    let quote = price_cart(
        &state,
        &body.items,
        body.coupon_code.as_deref(),
        session.user_id(),
    )
    .await?;
    Ok(ok(quote))
}

/// Price a cart from stored products and apply an optional coupon.
///
/// A blank coupon code counts as no coupon.
pub(crate) async fn price_cart(
    state: &AppState,
    items: &[CartItem],
    coupon_code: Option<&str>,
    user: Option<&UserId>,
) -> Result<Quote, ApiError> {
    let ids: Vec<ProductId> = items.iter().map(|i| i.product_id.clone()).collect();
    let products = state.store.products_by_ids(&ids).await?;
    let priced = price_items(items, |id| products.iter().find(|p| &p.id == id))?;

    let coupon = match coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => {
            let subtotal = subtotal(&priced, &state.pricing)?;
            let (coupon, percent) = state.store.check_coupon(code, user, Some(subtotal)).await?;
            Some((coupon.code, percent))
        }
        None => None,
    };
    Ok(Quote::build(priced, coupon, &state.pricing)?)
}
