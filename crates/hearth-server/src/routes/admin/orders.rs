use crate::error::{ok, ApiResult};
use crate::extract::AdminAuth;
use crate::state::AppState;
use actix_web::web;
use hearth_commerce::checkout::OrderStatus;
use hearth_commerce::store::OrderListFilter;
use hearth_commerce::OrderId;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub paid: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
}

pub async fn list(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    query: web::Query<OrderListQuery>,
) -> ApiResult {
    let status = match query.status.as_deref().map(str::trim) {
        Some("") | None => None,
        Some(s) => Some(s.parse::<OrderStatus>()?),
    };
    let filter = OrderListFilter {
        status,
        paid: query.paid,
        user_id: None,
    };
    Ok(ok(state.store.list_orders(&filter).await?))
}

pub async fn get(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> ApiResult {
    let id = OrderId::new(id.into_inner());
    Ok(ok(state.store.get_order(&id).await?))
}

/// Illegal transitions answer 409.
pub async fn update_status(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<StatusChange>,
) -> ApiResult {
    let id = OrderId::new(id.into_inner());
    Ok(ok(state.store.update_order_status(&id, body.status).await?))
}
