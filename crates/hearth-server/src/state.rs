//! Shared application state.

use crate::config::AppConfig;
use crate::cookies::CookieSettings;
use crate::error::StartupError;
use hearth_auth::{AdminGate, AuthSession, PasswordHasher, SessionStore};
use hearth_cache::Cache;
use hearth_commerce::pricing::PricingConfig;
use hearth_commerce::store::Store;
use hearth_commerce::CommerceError;
use hearth_db::Db;
use hearth_gateway::{CloudinaryClient, ImageHost, PaymentGateway, RazorpayClient};
use actix_web::rt::task::JoinHandle;
use std::sync::Arc;
use std::time::Duration;

/// Cache namespace for customer sessions.
pub const CUSTOMER_NAMESPACE: &str = "customer";

/// How often expired sessions are dropped from the cache.
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Everything a handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub pricing: PricingConfig,
    pub admin: AdminGate,
    pub customers: SessionStore,
    pub passwords: PasswordHasher,
    pub payments: Arc<dyn PaymentGateway>,
    pub images: Arc<dyn ImageHost>,
    pub cookies: CookieSettings,
    /// Backing store for admin and customer sessions.
    pub cache: Cache,
}

impl AppState {
    /// Connect, migrate and build the external clients.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        config.validate()?;
        let db = Db::connect(&config.database.url)
            .await
            .map_err(CommerceError::from)?;
        let store = Store::new(db);
        store.migrate().await?;

        let cache = Cache::new();
        let payments = RazorpayClient::new(config.razorpay.clone(), config.http_timeout())?;
        let images = CloudinaryClient::new(config.cloudinary.clone(), config.http_timeout())?;
        Ok(Self {
            store,
            pricing: config.pricing()?,
            admin: AdminGate::new(&config.admin.password, cache.clone())?,
            customers: customer_sessions(cache.clone()),
            passwords: PasswordHasher::new(),
            payments: Arc::new(payments),
            images: Arc::new(images),
            cookies: CookieSettings {
                secure: config.server.cookie_secure,
            },
            cache,
        })
    }

    /// Purge expired sessions every `every` until the task is aborted.
    ///
    /// Expired entries are otherwise only dropped when their own id is
    /// presented again, which abandoned sessions never are.
    pub fn spawn_session_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let cache = self.cache.clone();
        actix_web::rt::spawn(async move {
            let mut ticker = actix_web::rt::time::interval(every);
            loop {
                ticker.tick().await;
                match cache.purge_expired() {
                    Ok(removed) if removed > 0 => tracing::info!(
                        removed,
                        remaining = cache.entry_count().unwrap_or_default(),
                        "expired sessions swept"
                    ),
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "session sweep failed"),
                }
            }
        })
    }
}

/// Customer sessions, valid for seven days.
pub fn customer_sessions(cache: Cache) -> SessionStore {
    SessionStore::new(
        cache,
        CUSTOMER_NAMESPACE,
        Duration::from_secs(AuthSession::DEFAULT_DURATION_SECS as u64),
    )
}
