//! Account commands.

use larkspur_client::{Fault, IdentityKind, Shop};
use larkspur_core::{Credentials, Registration, Role};

/// Create an account and log in.
///
/// # Errors
///
/// Returns `Fault::Validation` if the email is taken or the password is
/// rejected.
pub async fn register(
    shop: &Shop,
    email: String,
    name: String,
    password: String,
) -> Result<(), Fault> {
    let profile = shop
        .register(&Registration {
            email,
            name,
            password,
        })
        .await?;
    println!("Registered {} ({})", profile.name, profile.email);
    Ok(())
}

/// Log in with email and password.
///
/// # Errors
///
/// Returns `Fault::Auth` for bad credentials.
pub async fn login(shop: &Shop, email: String, password: String) -> Result<(), Fault> {
    let profile = shop.login(&Credentials { email, password }).await?;
    println!("Logged in as {} ({})", profile.name, profile.email);
    Ok(())
}

/// Log out, dropping the persisted token.
///
/// # Errors
///
/// Returns the fault from backend token revocation. The local token is
/// cleared even when revocation fails.
pub async fn logout(shop: &Shop) -> Result<(), Fault> {
    shop.logout().await?;
    println!("Logged out");
    Ok(())
}

/// Show the current identity, and the profile when authenticated.
///
/// # Errors
///
/// Returns the fault from the profile read.
pub async fn whoami(shop: &Shop) -> Result<(), Fault> {
    let identity = shop.identity()?;
    println!("Session: {}", identity.session_id);

    match identity.kind {
        IdentityKind::Guest => println!("Browsing as a guest"),
        IdentityKind::Authenticated => {
            let profile = shop.profile().await?;
            let role = match profile.role {
                Role::Customer => "customer",
                Role::Admin => "admin",
            };
            println!("Logged in as {} ({}, {role})", profile.name, profile.email);
        }
    }
    Ok(())
}
