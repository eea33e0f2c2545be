//! External service errors.

use hearth_data::FetchError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport failure reaching the service.
    #[error("{service} request failed: {source}")]
    Fetch {
        service: &'static str,
        #[source]
        source: FetchError,
    },

    /// The service answered with a non-2xx status.
    #[error("{service} returned {status}: {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The service answered 2xx with a body we could not use.
    #[error("{service} sent an unexpected response: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl GatewayError {
    pub(crate) fn fetch(service: &'static str) -> impl FnOnce(FetchError) -> Self {
        move |source| match source {
            FetchError::HttpError { status, message } => GatewayError::Upstream {
                service,
                status,
                message,
            },
            source => GatewayError::Fetch { service, source },
        }
    }

    pub(crate) fn invalid_response(service: &'static str) -> impl FnOnce(FetchError) -> Self {
        move |e| GatewayError::InvalidResponse {
            service,
            message: e.to_string(),
        }
    }

    /// Whether the failure came from the remote service or the network.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            GatewayError::Fetch { .. }
                | GatewayError::Upstream { .. }
                | GatewayError::InvalidResponse { .. }
        )
    }
}
