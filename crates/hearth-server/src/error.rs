//! API errors and the response envelope.
//!
//! Every handler answers `{"success": true, "data": ...}` or
//! `{"success": false, "error": "..."}`.

use crate::config::ConfigError;
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use hearth_auth::AuthError;
use hearth_commerce::CommerceError;
use hearth_gateway::GatewayError;
use serde::Serialize;
use thiserror::Error;

/// Result type for route handlers.
pub type ApiResult = Result<HttpResponse, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// A coupon that cannot be applied.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Message shown to clients. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            ApiError::Upstream(_) => "External service request failed".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize)]
struct SuccessBody<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

/// `200 OK` with the success envelope.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(SuccessBody {
        success: true,
        data,
    })
}

/// `201 Created` with the success envelope.
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(SuccessBody {
        success: true,
        data,
    })
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        HttpResponse::build(status).json(ErrorBody {
            success: false,
            error: self.public_message(),
        })
    }
}

impl From<CommerceError> for ApiError {
    fn from(e: CommerceError) -> Self {
        match e {
            CommerceError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            CommerceError::ValidationError(msg) => ApiError::BadRequest(msg),
            CommerceError::Conflict(msg) => ApiError::Conflict(msg),
            CommerceError::CouponRejected(reason) => ApiError::Rejected(reason.message()),
            CommerceError::InvalidStatusTransition { .. } => ApiError::Conflict(e.to_string()),
            CommerceError::CurrencyMismatch { .. } | CommerceError::Overflow => {
                ApiError::BadRequest(e.to_string())
            }
            CommerceError::DatabaseError(_) | CommerceError::SerializationError(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials
            | AuthError::SessionNotFound
            | AuthError::SessionExpired => ApiError::Unauthorized(e.to_string()),
            AuthError::UserAlreadyExists(_) => ApiError::Conflict(e.to_string()),
            AuthError::WeakPassword(_) | AuthError::InvalidInput(_) => {
                ApiError::BadRequest(e.to_string())
            }
            AuthError::AdminNotConfigured | AuthError::Cache(_) | AuthError::Internal(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::InvalidInput(msg) => ApiError::BadRequest(msg),
            GatewayError::NotFound(_) => ApiError::NotFound(e.to_string()),
            GatewayError::NotConfigured(_) => ApiError::Internal(e.to_string()),
            _ => ApiError::Upstream(e.to_string()),
        }
    }
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid JSON body: {err}")).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid query string: {err}")).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid path: {err}")).into()
}

/// Failures while assembling the application at startup.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Store: {0}")]
    Store(#[from] CommerceError),

    #[error("Auth: {0}")]
    Auth(#[from] AuthError),

    #[error("Gateway: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Server: {0}")]
    Io(#[from] std::io::Error),
}
