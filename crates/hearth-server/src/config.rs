//! Server configuration.
//!
//! Values come from an optional TOML file, then environment variables
//! (after `.env` is loaded), then CLI flags. Later sources win.

use crate::logging::LogFormat;
use hearth_commerce::{pricing::PricingConfig, Currency, Money};
use hearth_gateway::{CloudinaryConfig, RazorpayConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "hearth.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub pricing: PricingSettings,
    pub razorpay: RazorpayConfig,
    pub cloudinary: CloudinaryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Origin allowed by CORS. Unset allows none.
    pub allowed_origin: Option<String>,
    /// Set the `Secure` flag on cookies.
    pub cookie_secure: bool,
    /// Timeout for outbound HTTP calls.
    pub http_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            allowed_origin: None,
            cookie_secure: false,
            http_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://hearth.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub password: String,
}

/// Pricing rules in major units, as an operator writes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub currency: String,
    pub shipping_flat: f64,
    pub free_shipping_above: Option<f64>,
    pub tax_percent: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            currency: "INR".to_string(),
            shipping_flat: 50.0,
            free_shipping_above: Some(999.0),
            tax_percent: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `tracing-subscriber` filter directive.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Human,
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] when it exists,
    /// then apply the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from environment variables found by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };
        set(&mut self.server.bind, "HEARTH_BIND");
        set(&mut self.database.url, "DATABASE_URL");
        set(&mut self.admin.password, "ADMIN_PASSWORD");
        set(&mut self.razorpay.key_id, "RAZORPAY_KEY_ID");
        set(&mut self.razorpay.key_secret, "RAZORPAY_KEY_SECRET");
        set(&mut self.razorpay.api_base, "RAZORPAY_API_BASE");
        set(&mut self.cloudinary.cloud_name, "CLOUDINARY_CLOUD_NAME");
        set(&mut self.cloudinary.api_key, "CLOUDINARY_API_KEY");
        set(&mut self.cloudinary.api_secret, "CLOUDINARY_API_SECRET");
        set(&mut self.cloudinary.api_base, "CLOUDINARY_API_BASE");
        set(&mut self.pricing.currency, "HEARTH_CURRENCY");
        set(&mut self.logging.filter, "RUST_LOG");

        if let Some(secret) = lookup("RAZORPAY_WEBHOOK_SECRET") {
            self.razorpay.webhook_secret = Some(secret).filter(|s| !s.is_empty());
        }
        if let Some(folder) = lookup("CLOUDINARY_FOLDER") {
            self.cloudinary.folder = Some(folder).filter(|s| !s.is_empty());
        }
        if let Some(origin) = lookup("HEARTH_ALLOWED_ORIGIN") {
            self.server.allowed_origin = Some(origin).filter(|s| !s.is_empty());
        }

        if let Some(v) = lookup("HEARTH_SHIPPING_FLAT") {
            self.pricing.shipping_flat = parse_env("HEARTH_SHIPPING_FLAT", &v)?;
        }
        if let Some(v) = lookup("HEARTH_FREE_SHIPPING_ABOVE") {
            self.pricing.free_shipping_above = match v.trim() {
                "" | "none" => None,
                other => Some(parse_env("HEARTH_FREE_SHIPPING_ABOVE", other)?),
            };
        }
        if let Some(v) = lookup("HEARTH_TAX_PERCENT") {
            self.pricing.tax_percent = parse_env("HEARTH_TAX_PERCENT", &v)?;
        }
        if let Some(v) = lookup("HEARTH_HTTP_TIMEOUT_SECS") {
            self.server.http_timeout_secs = parse_env("HEARTH_HTTP_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("HEARTH_COOKIE_SECURE") {
            self.server.cookie_secure = parse_bool("HEARTH_COOKIE_SECURE", &v)?;
        }
        if let Some(v) = lookup("HEARTH_LOG_FORMAT") {
            self.logging.format = v.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "HEARTH_LOG_FORMAT",
                value: v.clone(),
            })?;
        }
        Ok(())
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin.password.is_empty() {
            return Err(ConfigError::Invalid(
                "ADMIN_PASSWORD must be set".to_string(),
            ));
        }
        if !(self.pricing.shipping_flat.is_finite() && self.pricing.shipping_flat >= 0.0) {
            return Err(ConfigError::Invalid(
                "shipping_flat cannot be negative".to_string(),
            ));
        }
        if let Some(above) = self.pricing.free_shipping_above {
            if !(above.is_finite() && above >= 0.0) {
                return Err(ConfigError::Invalid(
                    "free_shipping_above cannot be negative".to_string(),
                ));
            }
        }
        if !(0.0..=100.0).contains(&self.pricing.tax_percent) {
            return Err(ConfigError::Invalid(
                "tax_percent must be between 0 and 100".to_string(),
            ));
        }
        if self.server.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http_timeout_secs must be at least 1".to_string(),
            ));
        }
        self.currency()?;
        Ok(())
    }

    pub fn currency(&self) -> Result<Currency, ConfigError> {
        Currency::from_code(&self.pricing.currency).ok_or_else(|| {
            ConfigError::Invalid(format!("unsupported currency {}", self.pricing.currency))
        })
    }

    /// Pricing rules in minor units.
    pub fn pricing(&self) -> Result<PricingConfig, ConfigError> {
        let currency = self.currency()?;
        Ok(PricingConfig {
            currency,
            shipping_flat: Money::from_major(self.pricing.shipping_flat, currency),
            free_shipping_above: self
                .pricing
                .free_shipping_above
                .map(|above| Money::from_major(above, currency)),
            tax_percent: self.pricing.tax_percent,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.server.http_timeout_secs)
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            key,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.database.url, "sqlite://hearth.db?mode=rwc");
        assert!(!config.server.cookie_secure);
        assert_eq!(config.http_timeout(), Duration::from_secs(15));

        let pricing = config.pricing().unwrap();
        assert_eq!(pricing, PricingConfig::default());
    }

    #[test]
    fn test_toml_then_env() {
        let mut config = AppConfig::from_toml(
            r#"
            [server]
            bind = "0.0.0.0:9000"

            [pricing]
            currency = "USD"
            tax_percent = 8.5

            [razorpay]
            key_id = "rzp_file"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.pricing.shipping_flat, 50.0);

        config
            .apply_env(env(&[
                ("HEARTH_BIND", "127.0.0.1:7000"),
                ("ADMIN_PASSWORD", "open-sesame"),
                ("RAZORPAY_KEY_ID", "rzp_env"),
                ("HEARTH_FREE_SHIPPING_ABOVE", "none"),
                ("HEARTH_COOKIE_SECURE", "true"),
                ("HEARTH_LOG_FORMAT", "json"),
            ]))
            .unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:7000");
        assert_eq!(config.razorpay.key_id, "rzp_env");
        assert_eq!(config.pricing.free_shipping_above, None);
        assert!(config.server.cookie_secure);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
        assert_eq!(config.pricing().unwrap().currency, Currency::USD);
    }

    #[test]
    fn test_bad_env_values() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.apply_env(env(&[("HEARTH_TAX_PERCENT", "lots")])),
            Err(ConfigError::InvalidEnv { key: "HEARTH_TAX_PERCENT", .. })
        ));
        assert!(config
            .apply_env(env(&[("HEARTH_COOKIE_SECURE", "maybe")]))
            .is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_err(), "empty admin password");

        config.admin.password = "open-sesame".into();
        assert!(config.validate().is_ok());

        config.pricing.shipping_flat = -1.0;
        assert!(config.validate().is_err());
        config.pricing.shipping_flat = 50.0;

        config.pricing.tax_percent = 101.0;
        assert!(config.validate().is_err());
        config.pricing.tax_percent = 18.0;

        config.pricing.currency = "XYZ".into();
        assert!(config.validate().is_err());
    }
}
