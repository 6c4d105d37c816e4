//! Administrative commands.
//!
//! All of these require a logged-in admin; the backend answers
//! `Fault::Auth` otherwise.

use rust_decimal::Decimal;
use thiserror::Error;

use larkspur_client::ops::{CategoryInput, CouponInput};
use larkspur_client::{Fault, Shop};
use larkspur_core::{
    CategoryId, CouponId, CouponKind, CurrencyCode, Money, OrderId, OrderStatus, ProductId, Role,
    UserId,
};

/// Errors from admin command argument handling.
#[derive(Debug, Error)]
pub enum AdminCommandError {
    /// Neither or both discount schemes were given.
    #[error("Specify exactly one of --percent or --amount")]
    AmbiguousDiscount,

    /// The backend call failed.
    #[error(transparent)]
    Fault(#[from] Fault),
}

/// List user accounts.
///
/// # Errors
///
/// Returns the fault from the backend read.
pub async fn users(shop: &Shop) -> Result<(), Fault> {
    for profile in shop.admin_users().await? {
        let role = match profile.role {
            Role::Customer => "customer",
            Role::Admin => "admin",
        };
        let flag = if profile.disabled { "  DISABLED" } else { "" };
        println!("{:<30} {role:<9} [{}]{flag}", profile.email, profile.id);
    }
    Ok(())
}

/// Disable or re-enable a user account.
///
/// # Errors
///
/// Returns `Fault::NotFound` for an unknown user.
pub async fn set_user_disabled(shop: &Shop, user_id: &UserId, disabled: bool) -> Result<(), Fault> {
    let profile = shop.admin_set_user_disabled(user_id, disabled).await?;
    println!(
        "{} is now {}",
        profile.email,
        if profile.disabled { "disabled" } else { "enabled" }
    );
    Ok(())
}

/// List all orders across users, newest first.
///
/// # Errors
///
/// Returns the fault from the backend read.
pub async fn orders(shop: &Shop) -> Result<(), Fault> {
    for order in shop.admin_orders().await? {
        super::orders::print_order_line(&order);
    }
    Ok(())
}

/// Move an order to a new status.
///
/// # Errors
///
/// Returns `Fault::Validation` for a transition the backend rejects.
pub async fn set_order_status(
    shop: &Shop,
    order_id: &OrderId,
    status: OrderStatus,
) -> Result<(), Fault> {
    let order = shop.admin_update_order_status(order_id, status).await?;
    println!("Order {} is now {}", order.id, order.status);
    Ok(())
}

/// List coupons.
///
/// # Errors
///
/// Returns the fault from the backend read.
pub async fn coupons(shop: &Shop) -> Result<(), Fault> {
    for coupon in shop.admin_coupons().await? {
        let scheme = match &coupon.kind {
            CouponKind::Percent(pct) => format!("{pct}% off"),
            CouponKind::Fixed(money) => format!("{} off", money.display()),
        };
        let state = if coupon.active { "active" } else { "inactive" };
        match coupon.expires_at {
            Some(at) => println!(
                "{:<16} {scheme:<12} {state}, expires {}",
                coupon.code,
                at.format("%Y-%m-%d")
            ),
            None => println!("{:<16} {scheme:<12} {state}", coupon.code),
        }
    }
    Ok(())
}

/// Create an active coupon with no expiry.
///
/// # Errors
///
/// Returns an argument error unless exactly one discount scheme is given,
/// and `Fault::Validation` if the backend rejects the code.
pub async fn create_coupon(
    shop: &Shop,
    code: String,
    percent: Option<Decimal>,
    amount: Option<Decimal>,
) -> Result<(), AdminCommandError> {
    let kind = match (percent, amount) {
        (Some(pct), None) => CouponKind::Percent(pct),
        (None, Some(amt)) => CouponKind::Fixed(Money::new(amt, CurrencyCode::default())),
        _ => return Err(AdminCommandError::AmbiguousDiscount),
    };
    let coupon = shop
        .admin_create_coupon(&CouponInput {
            code,
            kind,
            expires_at: None,
            active: true,
        })
        .await?;
    println!("Coupon {} created [{}]", coupon.code, coupon.id);
    Ok(())
}

/// Delete a coupon.
///
/// # Errors
///
/// Returns `Fault::NotFound` for an unknown coupon.
pub async fn delete_coupon(shop: &Shop, coupon_id: &CouponId) -> Result<(), Fault> {
    shop.admin_delete_coupon(coupon_id).await?;
    println!("Coupon {coupon_id} deleted");
    Ok(())
}

/// Create a category.
///
/// # Errors
///
/// Returns `Fault::Validation` for a duplicate slug.
pub async fn create_category(
    shop: &Shop,
    slug: String,
    name: String,
    description: Option<String>,
) -> Result<(), Fault> {
    let category = shop
        .admin_create_category(&CategoryInput {
            slug,
            name,
            description,
        })
        .await?;
    println!("Category {} created [{}]", category.name, category.id);
    Ok(())
}

/// Delete a category.
///
/// # Errors
///
/// Returns `Fault::NotFound` for an unknown category.
pub async fn delete_category(shop: &Shop, category_id: &CategoryId) -> Result<(), Fault> {
    shop.admin_delete_category(category_id).await?;
    println!("Category {category_id} deleted");
    Ok(())
}

/// Delete a product.
///
/// # Errors
///
/// Returns `Fault::NotFound` for an unknown product.
pub async fn delete_product(shop: &Shop, product_id: &ProductId) -> Result<(), Fault> {
    shop.admin_delete_product(product_id).await?;
    println!("Product {product_id} deleted");
    Ok(())
}
