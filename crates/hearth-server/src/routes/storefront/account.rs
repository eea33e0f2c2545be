//! Customer accounts, sessions and order history.

use crate::error::{created, ok, ApiResult};
use crate::extract::{CustomerSession, RequireCustomer};
use crate::routes::{blocking, with_cookies};
use crate::state::AppState;
use actix_web::web;
use hearth_auth::{AuthError, Registration, User, UserCredentials};
use hearth_commerce::customer::CustomerAccount;
use hearth_commerce::store::OrderListFilter;
use hearth_commerce::OrderId;
use serde_json::json;

pub async fn register(state: web::Data<AppState>, body: web::Json<Registration>) -> ApiResult {
    body.validate()?;
    let passwords = state.passwords.clone();
    let password = body.password.clone();
    let hash = blocking(move || passwords.hash(&password)).await??;
    let account = CustomerAccount::new(&body.username, &body.email, hash)?;
    state.store.insert_customer(&account).await?;

    let user = User::customer(account.id, account.username, account.email);
    let (id, session) = state.customers.start(user)?;
    let cookies = state.cookies.customer_login(&id, &session);
    with_cookies(created(&session.user), cookies)
}

pub async fn login(state: web::Data<AppState>, body: web::Json<UserCredentials>) -> ApiResult {
    body.validate()?;
    let account = state
        .store
        .customer_by_login(&body.username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    let passwords = state.passwords.clone();
    let password = body.password.clone();
    let hash = account.password_hash.clone();
    if !blocking(move || passwords.verify(&password, &hash)).await?? {
        tracing::warn!(user_id = %account.id, "customer login failed");
        return Err(AuthError::InvalidCredentials.into());
    }

    let user = User::customer(account.id, account.username, account.email);
    let (id, session) = state.customers.start(user)?;
    tracing::info!(user_id = ?session.user.user_id(), "customer logged in");
    let cookies = state.cookies.customer_login(&id, &session);
    with_cookies(ok(&session.user), cookies)
}

pub async fn logout(state: web::Data<AppState>, session: CustomerSession) -> ApiResult {
    if let Some(id) = &session.session_id {
        state.customers.end(id)?;
    }
    with_cookies(ok(json!({ "logged_out": true })), state.cookies.customer_logout())
}

/// The calling user. Anonymous callers get `{"kind": "anonymous"}`.
pub async fn me(session: CustomerSession) -> ApiResult {
    Ok(ok(session.user))
}

pub async fn orders(state: web::Data<AppState>, customer: RequireCustomer) -> ApiResult {
    let filter = OrderListFilter {
        user_id: Some(customer.user_id),
        ..Default::default()
    };
    Ok(ok(state.store.list_orders(&filter).await?))
}

pub async fn order(
    state: web::Data<AppState>,
    customer: RequireCustomer,
    id: web::Path<String>,
) -> ApiResult {
    let id = OrderId::new(id.into_inner());
    Ok(ok(state.store.order_for_user(&id, &customer.user_id).await?))
}
