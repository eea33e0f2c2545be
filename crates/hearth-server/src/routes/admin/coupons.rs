use super::deleted;
use crate::error::{created, ok, ApiResult};
use crate::extract::AdminAuth;
use crate::state::AppState;
use actix_web::web;
use hearth_commerce::coupon::CouponInput;
use hearth_commerce::CouponId;

pub async fn list(_admin: AdminAuth, state: web::Data<AppState>) -> ApiResult {
    Ok(ok(state.store.list_coupons().await?))
}

/// Minimum order values are in the store currency.
pub async fn create(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<CouponInput>,
) -> ApiResult {
    let coupon = state
        .store
        .create_coupon(body.into_inner(), state.pricing.currency)
        .await?;
    Ok(created(coupon))
}

pub async fn update(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<CouponInput>,
) -> ApiResult {
    let id = CouponId::new(id.into_inner());
    Ok(ok(state.store.update_coupon(&id, body.into_inner()).await?))
}

pub async fn delete(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = CouponId::new(id.into_inner());
    state.store.delete_coupon(&id).await?;
    Ok(ok(deleted(id.as_str())))
}
