//! Account operations: registration, login, logout, profile.
//!
//! Login writes the bearer token to the profile store and invalidates every
//! slot scoped to the session id: the id itself survives the transition, but
//! identity-scoped resources must be refetched under the new headers. Logout
//! mirrors this. No cart merge call is made - the backend continues to
//! address the same cart rows by session id.

use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};

use larkspur_core::{Credentials, Profile, Registration};

use crate::cache::{CacheKey, CacheValue};
use crate::fault::Fault;
use crate::shop::Shop;

/// Payload of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The authenticated user's profile.
    pub profile: Profile,
}

impl Shop {
    /// Register a new account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Validation` with the backend's message when the email
    /// is taken or the password is rejected.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<Profile, Fault> {
        self.client()
            .post("/auth/register", json!(registration))
            .await
    }

    /// Log in, persisting the bearer token for subsequent requests.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Validation` for rejected credentials and
    /// `Fault::Internal` if the token cannot be persisted.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Profile, Fault> {
        let response: LoginResponse = self
            .client()
            .post("/auth/login", json!(credentials))
            .await?;

        self.vault()
            .login(&response.token)
            .map_err(|e| e.into_fault())?;
        self.cache().invalidate_identity(&self.scope()?);

        Ok(response.profile)
    }

    /// Log out.
    ///
    /// The backend revocation call is made first (while the token is still
    /// attached), but the local token is cleared no matter how that call
    /// ends: a logout must always leave the client in guest mode. A backend
    /// failure is still reported after the local state is settled.
    ///
    /// # Errors
    ///
    /// Returns a fault if revocation or token removal failed; local state is
    /// guest either way.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), Fault> {
        let revocation = self
            .client()
            .post::<serde_json::Value>("/auth/logout", json!({}))
            .await;
        if let Err(fault) = &revocation {
            warn!(%fault, "token revocation failed; clearing local token anyway");
        }

        self.vault().logout().map_err(|e| e.into_fault())?;
        self.cache().invalidate_identity(&self.scope()?);

        revocation.map(|_| ())
    }

    /// Get the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Auth` when the caller is a guest or the token has
    /// expired server-side.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<Profile, Fault> {
        let key = CacheKey::Profile {
            scope: self.scope()?,
        };
        let client = self.client().clone();
        self.cache()
            .read(key, self.freshness().profile, || async move {
                let profile: Profile = client.get("/account", &[]).await?;
                Ok(CacheValue::Profile(Box::new(profile)))
            })
            .await?
            .into_profile()
    }
}
