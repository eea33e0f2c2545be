//! Gateway checkout: order creation, client verification and webhooks.
//!
//! An order is persisted before the gateway order exists, so a gateway
//! failure leaves a pending order with no gateway id. Carts that price to
//! zero are refused before anything is written. Payment is recorded
//! through [`Store::mark_order_paid`](hearth_commerce::store::Store::mark_order_paid),
//! which only flips an unpaid order, so verify and webhook can race safely
//! and the coupon is taken exactly once.

use super::checkout::price_cart;
use crate::error::{created, ok, ApiError, ApiResult};
use crate::extract::CustomerSession;
use crate::state::AppState;
use actix_web::{web, HttpRequest};
use hearth_commerce::checkout::{CartItem, Order, ShippingAddress};
use hearth_commerce::coupon::CouponRejection;
use hearth_commerce::store::{PaymentRecord, Redemption};
use hearth_commerce::{CommerceError, OrderId};
use hearth_gateway::{CreateGatewayOrder, WebhookEvent};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Header carrying the webhook body signature.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Razorpay-Signature";

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

/// What the client-side payment widget needs.
#[derive(Debug, Serialize)]
struct CheckoutSession {
    order_id: OrderId,
    order_number: String,
    gateway_order_id: String,
    amount: i64,
    currency: &'static str,
    key_id: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub order_id: OrderId,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

pub async fn create_order(
    state: web::Data<AppState>,
    session: CustomerSession,
    body: web::Json<CreateOrderRequest>,
) -> ApiResult {
    let body = body.into_inner();
    body.shipping_address.validate()?;
    let quote = price_cart(
        &state,
        &body.items,
        body.coupon_code.as_deref(),
        session.user_id(),
    )
    .await?;
    // The gateway only charges positive amounts.
    if !quote.totals.grand_total.is_positive() {
        return Err(ApiError::BadRequest(
            "Order total must be greater than zero".into(),
        ));
    }

    let order = Order::new(
        session.user_id().cloned(),
        quote.items,
        body.shipping_address,
        quote.coupon_code,
        quote.totals,
    );
    state.store.insert_order(&order).await?;

    let request = CreateGatewayOrder::new(order.grand_total, order.order_number.clone())
        .note("order_id", order.id.as_str());
    let gateway_order = state.payments.create_order(request).await.map_err(|e| {
        tracing::warn!(order_id = %order.id, error = %e, "gateway order creation failed");
        ApiError::from(e)
    })?;
    state
        .store
        .set_gateway_order_id(&order.id, &gateway_order.id)
        .await?;

    tracing::info!(
        order_id = %order.id,
        gateway_order_id = %gateway_order.id,
        amount = order.grand_total.amount_minor,
        "checkout started"
    );
    Ok(created(CheckoutSession {
        order_id: order.id,
        order_number: order.order_number,
        gateway_order_id: gateway_order.id,
        amount: order.grand_total.amount_minor,
        currency: order.grand_total.currency.code(),
        key_id: state.payments.key_id().to_string(),
    }))
}

pub async fn verify(state: web::Data<AppState>, body: web::Json<VerifyPaymentRequest>) -> ApiResult {
    let order = state.store.get_order(&body.order_id).await?;
    if order.payment.gateway_order_id.as_deref() != Some(body.gateway_order_id.as_str()) {
        return Err(ApiError::BadRequest(
            "Payment does not belong to this order".into(),
        ));
    }
    if !state.payments.verify_payment_signature(
        &body.gateway_order_id,
        &body.gateway_payment_id,
        &body.signature,
    ) {
        tracing::warn!(order_id = %order.id, "payment signature rejected");
        return Err(ApiError::BadRequest("Invalid payment signature".into()));
    }

    let (order, newly_paid) = state
        .store
        .mark_order_paid(&PaymentRecord {
            gateway_order_id: body.gateway_order_id.clone(),
            gateway_payment_id: body.gateway_payment_id.clone(),
            signature: Some(body.signature.clone()),
        })
        .await?;
    if newly_paid {
        settle_coupon(&state, &order).await;
    }
    Ok(ok(order))
}

pub async fn webhook(state: web::Data<AppState>, req: HttpRequest, body: web::Bytes) -> ApiResult {
    let signature = req
        .headers()
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing webhook signature".into()))?;
    if !state.payments.verify_webhook(&body, signature) {
        tracing::warn!("webhook signature rejected");
        return Err(ApiError::BadRequest("Invalid webhook signature".into()));
    }

    let event = WebhookEvent::parse(&body)?;
    if !event.is_settling() {
        tracing::debug!(event = %event.event, "webhook ignored");
        return Ok(ok(json!({ "handled": false, "event": event.event })));
    }
    let (Some(gateway_order_id), Some(payment_id)) = (event.gateway_order_id(), event.payment_id())
    else {
        tracing::warn!(event = %event.event, "webhook without order or payment id");
        return Ok(ok(json!({ "handled": false, "event": event.event })));
    };

    let record = PaymentRecord {
        gateway_order_id: gateway_order_id.to_string(),
        gateway_payment_id: payment_id.to_string(),
        signature: None,
    };
    match state.store.mark_order_paid(&record).await {
        Ok((order, newly_paid)) => {
            if newly_paid {
                settle_coupon(&state, &order).await;
            }
            Ok(ok(json!({
                "handled": true,
                "event": event.event,
                "order_id": order.id,
                "newly_paid": newly_paid,
            })))
        }
        Err(CommerceError::NotFound { .. }) => {
            tracing::warn!(gateway_order_id, "webhook for unknown order");
            Ok(ok(json!({ "handled": false, "event": event.event })))
        }
        Err(e) => Err(e.into()),
    }
}

/// Take the order's coupon after payment. The payment stands either way.
async fn settle_coupon(state: &AppState, order: &Order) {
    match redeem_order_coupon(state, order).await {
        Ok(Some(redemption)) => tracing::info!(
            order_id = %order.id,
            coupon = %redemption.code,
            uses = redemption.current_user_count,
            "coupon redeemed"
        ),
        Ok(None) => {}
        Err(e) => tracing::warn!(
            order_id = %order.id,
            error = %e,
            "coupon could not be redeemed for a paid order"
        ),
    }
}

async fn redeem_order_coupon(
    state: &AppState,
    order: &Order,
) -> Result<Option<Redemption>, CommerceError> {
    let Some(code) = order.coupon_code.as_deref() else {
        return Ok(None);
    };
    let coupon = state
        .store
        .coupon_by_code(code)
        .await?
        .ok_or(CouponRejection::NotFound)?;
    let redemption = state
        .store
        .redeem_coupon(&coupon, order.user_id.as_ref(), Some(&order.id))
        .await?;
    Ok(Some(redemption))
}
