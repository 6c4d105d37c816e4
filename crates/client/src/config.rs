//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LARKSPUR_API_BASE_URL` - Base URL of the storefront backend
//!
//! ## Optional
//! - `LARKSPUR_PROFILE_PATH` - Path of the persisted profile file
//!   (default: `.larkspur-profile.json` in the working directory)
//! - `LARKSPUR_CATALOG_TTL_SECS` - Catalog freshness window (default: 300)
//! - `LARKSPUR_REVIEWS_TTL_SECS` - Reviews freshness window (default: 300)
//! - `LARKSPUR_SECTIONS_TTL_SECS` - Home-section freshness window (default: 300)
//! - `LARKSPUR_REQUEST_TIMEOUT_SECS` - Transport timeout (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_PROFILE_PATH: &str = ".larkspur-profile.json";
const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// How long a cached resource stays fresh.
///
/// Each resource declares its own window; identity-scoped mutable state
/// (cart, orders, profile) never expires by time and is refreshed only when a
/// mutation invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Fresh until the window elapses, checked lazily on read.
    Window(Duration),
    /// Fresh until a mutation marks it stale.
    MutationOnly,
}

impl Freshness {
    /// Whether a value fetched `age` ago is still fresh.
    #[must_use]
    pub fn allows(&self, age: Duration) -> bool {
        match self {
            Self::Window(window) => age < *window,
            Self::MutationOnly => true,
        }
    }
}

/// Per-resource freshness windows.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessConfig {
    /// Product and category listings.
    pub catalog: Freshness,
    /// Product reviews.
    pub reviews: Freshness,
    /// Promotional home-page sections.
    pub sections: Freshness,
    /// The caller's cart.
    pub cart: Freshness,
    /// The caller's order history.
    pub orders: Freshness,
    /// The caller's profile.
    pub profile: Freshness,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        let window = Freshness::Window(Duration::from_secs(DEFAULT_TTL_SECS));
        Self {
            catalog: window,
            reviews: window,
            sections: window,
            cart: Freshness::MutationOnly,
            orders: Freshness::MutationOnly,
            profile: Freshness::MutationOnly,
        }
    }
}

/// Client SDK configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the storefront backend.
    pub base_url: Url,
    /// Path of the persisted profile file (session id, token).
    pub profile_path: PathBuf,
    /// Per-resource freshness windows.
    pub freshness: FreshnessConfig,
    /// Transport-level request timeout.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Build a configuration with defaults for everything but the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let mut base_url = Url::parse(base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("LARKSPUR_API_BASE_URL".to_string(), e.to_string())
        })?;
        // Url::join treats a path without a trailing slash as a file and
        // would drop its last segment when resolving relative paths.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Ok(Self {
            base_url,
            profile_path: PathBuf::from(DEFAULT_PROFILE_PATH),
            freshness: FreshnessConfig::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut config = Self::new(&get_required_env("LARKSPUR_API_BASE_URL")?)?;

        config.profile_path =
            PathBuf::from(get_env_or_default("LARKSPUR_PROFILE_PATH", DEFAULT_PROFILE_PATH));

        let catalog = get_ttl("LARKSPUR_CATALOG_TTL_SECS")?;
        let reviews = get_ttl("LARKSPUR_REVIEWS_TTL_SECS")?;
        let sections = get_ttl("LARKSPUR_SECTIONS_TTL_SECS")?;
        if let Some(window) = catalog {
            config.freshness.catalog = Freshness::Window(window);
        }
        if let Some(window) = reviews {
            config.freshness.reviews = Freshness::Window(window);
        }
        if let Some(window) = sections {
            config.freshness.sections = Freshness::Window(window);
        }

        if let Some(timeout) = get_ttl("LARKSPUR_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = timeout;
        }

        Ok(config)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional duration-in-seconds variable.
fn get_ttl(key: &str) -> Result<Option<Duration>, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(ClientConfig::new("not a url").is_err());
    }

    #[test]
    fn test_new_defaults() {
        let config = ClientConfig::new("https://api.example.test").unwrap();
        assert_eq!(config.profile_path, PathBuf::from(DEFAULT_PROFILE_PATH));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(
            config.freshness.catalog,
            Freshness::Window(Duration::from_secs(300))
        );
        assert_eq!(config.freshness.cart, Freshness::MutationOnly);
    }

    #[test]
    fn test_freshness_window_allows() {
        let window = Freshness::Window(Duration::from_secs(60));
        assert!(window.allows(Duration::from_secs(59)));
        assert!(!window.allows(Duration::from_secs(60)));
    }

    #[test]
    fn test_freshness_mutation_only_never_expires() {
        assert!(Freshness::MutationOnly.allows(Duration::from_secs(u64::MAX / 2)));
    }
}
