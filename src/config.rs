//! Environment-driven configuration.
//!
//! Every value has a development fallback so the server boots with an empty
//! environment; `run()` refuses insecure defaults in production.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

/// Which backend holds the content documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
    /// No store configured: public reads render defaults, admin writes answer 503.
    Disabled,
}

impl StoreBackend {
    fn resolve(explicit: Option<String>, database_url_set: bool) -> Self {
        match explicit.as_deref().map(str::to_lowercase).as_deref() {
            Some("memory") => StoreBackend::Memory,
            Some("postgres") => StoreBackend::Postgres,
            Some("none") | Some("disabled") => StoreBackend::Disabled,
            _ if database_url_set => StoreBackend::Postgres,
            _ => StoreBackend::Disabled,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub store_backend: StoreBackend,
    /// Directory that backs the object storage.
    pub media_root: PathBuf,
    /// Public URL prefix under which `media_root` is reachable.
    pub media_public_base: String,
    /// Directory holding the static `assets/` tree listed by the catalog endpoints.
    pub static_root: PathBuf,
    pub max_upload_bytes: usize,
    pub max_request_bytes: usize,
    pub upload_concurrency: usize,
}

/// Parses `key` from the environment, falling back when unset or malformed.
pub(crate) fn env_or<T: FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(fallback)
}

impl Default for AppConfig {
    fn default() -> Self {
        let port: u16 = env_or("PORT", 3001);
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            store_backend: StoreBackend::resolve(
                std::env::var("STORE_BACKEND").ok(),
                std::env::var("DATABASE_URL").is_ok(),
            ),
            media_root: env_or("MEDIA_ROOT", PathBuf::from("media")),
            media_public_base: std::env::var("MEDIA_PUBLIC_BASE")
                .unwrap_or_else(|_| format!("http://127.0.0.1:{}/media", port)),
            static_root: env_or("STATIC_ROOT", PathBuf::from("public")),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 25 * 1024 * 1024),
            max_request_bytes: env_or("MAX_REQUEST_BYTES", 100 * 1024 * 1024),
            upload_concurrency: env_or("UPLOAD_CONCURRENCY", 3usize).max(1),
        }
    }
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_prefers_explicit_setting() {
        assert_eq!(
            StoreBackend::resolve(Some("memory".into()), true),
            StoreBackend::Memory
        );
        assert_eq!(
            StoreBackend::resolve(Some("Postgres".into()), false),
            StoreBackend::Postgres
        );
    }

    #[test]
    fn backend_falls_back_on_database_url() {
        assert_eq!(StoreBackend::resolve(None, true), StoreBackend::Postgres);
        assert_eq!(StoreBackend::resolve(None, false), StoreBackend::Disabled);
    }

    #[test]
    fn default_config_is_usable() {
        let config = AppConfig::default();
        assert!(config.upload_concurrency >= 1);
        assert!(config.max_upload_bytes > 0);
        assert!(config.bind_addr().is_ok() || std::env::var("HOST").is_ok());
    }
}
