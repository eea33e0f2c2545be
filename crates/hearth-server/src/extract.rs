//! Request extractors for sessions.

use crate::cookies::{ADMIN_SESSION_COOKIE, SESSION_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use hearth_auth::{AuthSession, SessionId, User};
use hearth_commerce::UserId;

fn app_state(req: &HttpRequest) -> Result<&web::Data<AppState>, ApiError> {
    req.app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Internal("application state is not registered".into()))
}

fn cookie_session(req: &HttpRequest, name: &str) -> Option<SessionId> {
    req.cookie(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .map(SessionId::new)
}

/// The calling customer, or anonymous. Never rejects a request.
#[derive(Debug, Clone)]
pub struct CustomerSession {
    pub session_id: Option<SessionId>,
    pub user: User,
}

impl CustomerSession {
    pub fn user_id(&self) -> Option<&UserId> {
        self.user.user_id()
    }
}

impl FromRequest for CustomerSession {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(app_state(req).map(|state| {
            let session_id = cookie_session(req, SESSION_COOKIE);
            let user = state.customers.user(session_id.as_ref());
            CustomerSession { session_id, user }
        }))
    }
}

/// A logged-in customer. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct RequireCustomer {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub username: String,
}

impl FromRequest for RequireCustomer {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = app_state(req).and_then(|state| {
            let session_id = cookie_session(req, SESSION_COOKIE)
                .ok_or_else(|| ApiError::Unauthorized("Please log in".into()))?;
            let session = state.customers.resolve(&session_id)?;
            match session.user {
                User::Customer { id, username, .. } => Ok(RequireCustomer {
                    session_id,
                    user_id: id,
                    username,
                }),
                _ => Err(ApiError::Unauthorized("Please log in".into())),
            }
        });
        ready(result)
    }
}

/// A live admin session. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub session_id: SessionId,
    pub session: AuthSession,
}

impl FromRequest for AdminAuth {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = app_state(req).and_then(|state| {
            let session_id = cookie_session(req, ADMIN_SESSION_COOKIE)
                .ok_or_else(|| ApiError::Unauthorized("Admin login required".into()))?;
            let session = state.admin.authenticate(&session_id).map_err(|e| {
                tracing::debug!(error = %e, "admin session rejected");
                ApiError::Unauthorized("Admin login required".into())
            })?;
            Ok(AdminAuth {
                session_id,
                session,
            })
        });
        ready(result)
    }
}
