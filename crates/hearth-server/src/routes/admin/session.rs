use crate::cookies::ADMIN_SESSION_COOKIE;
use crate::error::{ok, ApiResult};
use crate::extract::AdminAuth;
use crate::routes::{blocking, with_cookies};
use crate::state::AppState;
use actix_web::{web, HttpRequest};
use hearth_auth::{AuthSession, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AdminLogin {
    pub password: String,
}

#[derive(Debug, Serialize)]
struct AdminStatus {
    authenticated: bool,
    expires_at: i64,
    remaining_secs: i64,
}

impl From<&AuthSession> for AdminStatus {
    fn from(session: &AuthSession) -> Self {
        Self {
            authenticated: true,
            expires_at: session.expires_at,
            remaining_secs: session.remaining_secs(),
        }
    }
}

pub async fn login(state: web::Data<AppState>, body: web::Json<AdminLogin>) -> ApiResult {
    let admin = state.admin.clone();
    let password = body.into_inner().password;
    let (id, session) = blocking(move || admin.login(&password)).await??;
    let cookies = state.cookies.admin_login(&id, &session);
    with_cookies(ok(AdminStatus::from(&session)), cookies)
}

/// Always clears the admin cookies, even without a live session.
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> ApiResult {
    if let Some(cookie) = req.cookie(ADMIN_SESSION_COOKIE) {
        state.admin.logout(&SessionId::new(cookie.value()))?;
    }
    with_cookies(
        ok(serde_json::json!({ "authenticated": false })),
        state.cookies.admin_logout(),
    )
}

pub async fn status(admin: AdminAuth) -> ApiResult {
    Ok(ok(AdminStatus::from(&admin.session)))
}
