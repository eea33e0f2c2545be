//! Hearth HTTP server: the storefront API and the admin panel API.
//!
//! - [`config`]: TOML file plus environment overrides
//! - [`state`]: the store, sessions and external clients shared by handlers
//! - [`routes`]: `/api` for the storefront and `/api/admin` for the panel
//! - [`error`]: the `{success, data | error}` envelope

pub mod config;
pub mod cookies;
pub mod error;
pub mod extract;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult, StartupError};
pub use state::AppState;
