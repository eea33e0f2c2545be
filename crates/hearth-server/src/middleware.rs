//! Request logging.

use actix_web::dev::{Service, ServiceRequest, ServiceResponse};
use std::future::Future;
use std::time::Instant;

/// Log one line per request with its status and latency. Used with `wrap_fn`.
pub fn log_request<S, B>(
    req: ServiceRequest,
    srv: &S,
) -> impl Future<Output = Result<ServiceResponse<B>, actix_web::Error>>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let method = req.method().clone();
    let path = req.path().to_string();
    let started = Instant::now();
    let response = srv.call(req);

    async move {
        let res = response.await?;
        let status = res.status().as_u16();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        if res.status().is_server_error() {
            tracing::error!(%method, %path, status, elapsed_ms, "request");
        } else {
            tracing::info!(%method, %path, status, elapsed_ms, "request");
        }
        Ok(res)
    }
}
