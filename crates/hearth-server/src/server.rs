//! HTTP server assembly.

use crate::config::AppConfig;
use crate::error::StartupError;
use crate::middleware::log_request;
use crate::routes;
use crate::state::{AppState, SESSION_SWEEP_INTERVAL};
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

/// CORS for the configured storefront/admin origin. Credentials are
/// allowed so session cookies travel with cross-origin calls.
pub fn cors(allowed_origin: Option<&str>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600),
        None => Cors::default(),
    }
}

/// Build the state and serve until shutdown.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let state = web::Data::new(AppState::from_config(&config).await?);
    let sweeper = state.spawn_session_sweeper(SESSION_SWEEP_INTERVAL);
    let allowed_origin = config.server.allowed_origin.clone();
    let bind = config.server.bind.clone();

    tracing::info!(%bind, origin = ?allowed_origin, "starting server");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(allowed_origin.as_deref()))
            .wrap_fn(|req, srv| log_request(req, srv))
            .configure(routes::configure)
    })
    .bind(&bind)?
    .run()
    .await?;

    sweeper.abort();
    tracing::info!("server stopped");
    Ok(())
}
