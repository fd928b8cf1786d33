//! Application configuration loaded from environment variables.
//!
//! The store connection settings are read once at startup and handed to
//! every component through `AppState`.

use std::env;
use std::str::FromStr;

/// Default interval between automatic image carousel steps.
pub const DEFAULT_CAROUSEL_INTERVAL_MS: u64 = 2000;

/// Flat shipping charge added to every cart.
pub const DEFAULT_SHIPPING_COST: f64 = 50.0;

/// Which document/blob store pair backs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Firestore + Firebase Storage
    Firestore,
    /// In-process stores (local development, no credentials)
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which backend to connect to
    pub store_backend: StoreBackend,
    /// GCP project ID hosting the Firestore database
    pub gcp_project_id: String,
    /// Firebase Storage bucket (e.g. "my-app.appspot.com")
    pub storage_bucket: String,
    /// Firebase Storage REST endpoint
    pub storage_base_url: String,
    /// Optional bearer token for Firebase Storage requests
    pub storage_auth_token: Option<String>,
    /// Frontend URL (CORS origin)
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Phone number receiving purchase messages
    pub whatsapp_phone: String,
    /// Carousel rotation interval advertised to product pages
    pub carousel_interval_ms: u64,
    /// Flat shipping cost for cart quotes
    pub shipping_cost: f64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            storage_bucket: "test-bucket.appspot.com".to_string(),
            storage_base_url: "https://firebasestorage.googleapis.com".to_string(),
            storage_auth_token: None,
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            whatsapp_phone: "15555550100".to_string(),
            carousel_interval_ms: DEFAULT_CAROUSEL_INTERVAL_MS,
            shipping_cost: DEFAULT_SHIPPING_COST,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Firestore,
        };

        let (gcp_project_id, storage_bucket) = match store_backend {
            StoreBackend::Firestore => (
                env::var("GCP_PROJECT_ID").map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
                env::var("STORAGE_BUCKET").map_err(|_| ConfigError::Missing("STORAGE_BUCKET"))?,
            ),
            StoreBackend::Memory => (
                env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
                env::var("STORAGE_BUCKET").unwrap_or_else(|_| "local-dev".to_string()),
            ),
        };

        Ok(Self {
            store_backend,
            gcp_project_id,
            storage_bucket,
            storage_base_url: env::var("STORAGE_BASE_URL")
                .unwrap_or_else(|_| "https://firebasestorage.googleapis.com".to_string()),
            storage_auth_token: env::var("STORAGE_AUTH_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            whatsapp_phone: env::var("WHATSAPP_PHONE")
                .map_err(|_| ConfigError::Missing("WHATSAPP_PHONE"))?,
            carousel_interval_ms: env::var("CAROUSEL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_CAROUSEL_INTERVAL_MS),
            shipping_cost: env::var("SHIPPING_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|cost: &f64| *cost >= 0.0)
                .unwrap_or(DEFAULT_SHIPPING_COST),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("STORE_BACKEND", "memory");
        env::set_var("WHATSAPP_PHONE", "15555550123");
        env::set_var("CAROUSEL_INTERVAL_MS", "not-a-number");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.whatsapp_phone, "15555550123");
        assert_eq!(config.carousel_interval_ms, DEFAULT_CAROUSEL_INTERVAL_MS);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(
            "Firestore".parse::<StoreBackend>().unwrap(),
            StoreBackend::Firestore
        );
        assert!("postgres".parse::<StoreBackend>().is_err());
    }
}
