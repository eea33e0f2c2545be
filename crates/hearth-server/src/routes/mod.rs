//! HTTP routes.
//!
//! Everything lives under `/api`. The admin panel sits under `/api/admin`
//! and every admin handler takes an [`AdminAuth`](crate::extract::AdminAuth).

pub mod admin;
pub mod storefront;

use crate::error::{
    json_error_handler, path_error_handler, query_error_handler, ApiError, ApiResult,
};
use actix_web::cookie::Cookie;
use actix_web::{web, HttpResponse};

/// Largest accepted JSON body.
const JSON_LIMIT: usize = 256 * 1024;

/// Register every route and the extractor error handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(json_error_handler),
    )
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .service(
        web::scope("/api")
            .service(web::scope("/admin").configure(admin::configure))
            .configure(storefront::configure),
    );
}

/// Attach cookies to a finished response.
pub(crate) fn with_cookies(mut res: HttpResponse, cookies: Vec<Cookie<'static>>) -> ApiResult {
    for cookie in cookies {
        res.add_cookie(&cookie)
            .map_err(|e| ApiError::Internal(format!("failed to set cookie: {e}")))?;
    }
    Ok(res)
}

/// Run password hashing off the worker thread.
pub(crate) async fn blocking<F, R>(f: F) -> Result<R, ApiError>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))
}
