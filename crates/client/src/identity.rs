//! Identity resolution over a pluggable persisted profile store.
//!
//! The effective identity is derived entirely from persisted state: a session
//! id that is generated once and never expires, and an optional bearer token
//! written at login and cleared at logout. Token absence at resolve time
//! downgrades the identity to guest; no token well-formedness or expiry check
//! happens here - expiry is discovered when the backend rejects a request.
//!
//! The store is injected rather than ambient so tests can substitute an
//! in-memory profile.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::debug;

const SESSION_SUFFIX_LEN: usize = 12;

/// Persisted profile keys.
pub mod keys {
    /// Key for the anonymous session identifier.
    pub const SESSION_ID: &str = "sessionId";

    /// Key for the bearer token, present only while authenticated.
    pub const USER_TOKEN: &str = "userToken";
}

/// Errors from the persisted profile store.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Reading or writing the backing file failed.
    #[error("profile I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file holds something other than a string map.
    #[error("profile file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persisted string key/value storage for identity state.
///
/// The browser-profile equivalent of local storage: values survive the
/// process and are shared by every client built over the same store.
pub trait ProfileStore: Send + Sync {
    /// Read a value. Absent keys and unreadable stores both yield `None`.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, persisting it before returning.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the value cannot be persisted.
    fn put(&self, key: &str, value: &str) -> Result<(), ProfileError>;

    /// Remove a value, persisting the removal before returning.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), ProfileError>;
}

// =============================================================================
// Store Implementations
// =============================================================================

/// File-backed profile store (a JSON object of string pairs).
pub struct FileProfileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileProfileStore {
    /// Open or create the profile file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if an existing file cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self, ProfileError> {
        let values = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<(), ProfileError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl ProfileStore for FileProfileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<(), ProfileError> {
        let mut values = self
            .values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), ProfileError> {
        let mut values = self
            .values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.remove(key);
        self.persist(&values)
    }
}

/// In-memory profile store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryProfileStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryProfileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<(), ProfileError> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ProfileError> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

// =============================================================================
// Identity
// =============================================================================

/// Whether the caller is anonymous or logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    /// Anonymous session, addressed by session id only.
    Guest,
    /// Logged in; requests carry the bearer token alongside the session id.
    Authenticated,
}

/// The actor on whose behalf requests are made.
///
/// The session id is always present, even when authenticated, so guest-cart
/// contents stay addressable across the login boundary.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Guest or authenticated.
    pub kind: IdentityKind,
    /// Stable per-profile session identifier.
    pub session_id: String,
    token: Option<SecretString>,
}

impl Identity {
    /// The bearer token, present only when authenticated.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(ExposeSecret::expose_secret)
    }

    /// Whether the identity carries a token.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.kind, IdentityKind::Authenticated)
    }
}

/// Resolves the effective identity from the profile store.
#[derive(Clone)]
pub struct IdentityVault {
    store: Arc<dyn ProfileStore>,
}

impl IdentityVault {
    /// Create a vault over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Resolve the current identity.
    ///
    /// The first call against a fresh profile generates a session id and
    /// persists it before returning. The token is re-read on every call, so a
    /// login or logout between two requests takes effect immediately.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if a newly generated session id cannot be
    /// persisted.
    pub fn resolve(&self) -> Result<Identity, ProfileError> {
        let session_id = match self.store.get(keys::SESSION_ID) {
            Some(id) if !id.is_empty() => id,
            _ => {
                let id = generate_session_id();
                self.store.put(keys::SESSION_ID, &id)?;
                debug!(session_id = %id, "generated new session id");
                id
            }
        };

        let token = self.store.get(keys::USER_TOKEN).map(SecretString::from);
        let kind = if token.is_some() {
            IdentityKind::Authenticated
        } else {
            IdentityKind::Guest
        };

        Ok(Identity {
            kind,
            session_id,
            token,
        })
    }

    /// Persist a bearer token obtained from a successful login.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the token cannot be persisted.
    pub fn login(&self, token: &str) -> Result<(), ProfileError> {
        self.store.put(keys::USER_TOKEN, token)
    }

    /// Clear the persisted bearer token. The session id is untouched.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the removal cannot be persisted.
    pub fn logout(&self) -> Result<(), ProfileError> {
        self.store.remove(keys::USER_TOKEN)
    }
}

/// Generate a session id: epoch millis plus a random alphanumeric suffix.
fn generate_session_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(SESSION_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{millis}-{suffix}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn vault() -> IdentityVault {
        IdentityVault::new(Arc::new(MemoryProfileStore::new()))
    }

    #[test]
    fn test_session_id_stable_across_resolves() {
        let vault = vault();
        let first = vault.resolve().unwrap();
        assert!(!first.session_id.is_empty());
        for _ in 0..5 {
            assert_eq!(vault.resolve().unwrap().session_id, first.session_id);
        }
    }

    #[test]
    fn test_fresh_profile_starts_as_guest() {
        let identity = vault().resolve().unwrap();
        assert_eq!(identity.kind, IdentityKind::Guest);
        assert!(identity.token().is_none());
    }

    #[test]
    fn test_login_upgrades_without_changing_session_id() {
        let vault = vault();
        let before = vault.resolve().unwrap();

        vault.login("tok_abc123").unwrap();
        let after = vault.resolve().unwrap();

        assert_eq!(after.kind, IdentityKind::Authenticated);
        assert_eq!(after.token(), Some("tok_abc123"));
        assert_eq!(after.session_id, before.session_id);
    }

    #[test]
    fn test_logout_downgrades_to_guest() {
        let vault = vault();
        let before = vault.resolve().unwrap();
        vault.login("tok_abc123").unwrap();
        vault.logout().unwrap();

        let after = vault.resolve().unwrap();
        assert_eq!(after.kind, IdentityKind::Guest);
        assert!(after.token().is_none());
        assert_eq!(after.session_id, before.session_id);
    }

    #[test]
    fn test_session_ids_are_distinct_per_profile() {
        let a = vault().resolve().unwrap().session_id;
        let b = vault().resolve().unwrap().session_id;
        assert_ne!(a, b);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("larkspur-test-{}", std::process::id()));
        let path = dir.join("profile.json");
        let _ = std::fs::remove_file(&path);

        let first = {
            let store = Arc::new(FileProfileStore::open(&path).unwrap());
            IdentityVault::new(store).resolve().unwrap().session_id
        };
        let second = {
            let store = Arc::new(FileProfileStore::open(&path).unwrap());
            IdentityVault::new(store).resolve().unwrap().session_id
        };
        assert_eq!(first, second);

        let _ = std::fs::remove_file(&path);
    }
}
