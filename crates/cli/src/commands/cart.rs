//! Cart commands.
//!
//! All of these operate on the cart tied to the persisted session id, so the
//! same cart is visible across invocations and across login.

use larkspur_client::{Fault, Shop};
use larkspur_core::{Cart, CartLineId, ProductId};

/// Show the current cart.
///
/// # Errors
///
/// Returns the fault from the backend read.
pub async fn show(shop: &Shop) -> Result<(), Fault> {
    print_cart(&shop.cart().await?);
    Ok(())
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns `Fault::Validation` for a zero quantity or an out-of-stock
/// product.
pub async fn add(shop: &Shop, product_id: &ProductId, quantity: u32) -> Result<(), Fault> {
    print_cart(&shop.add_to_cart(product_id, quantity).await?);
    Ok(())
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns `Fault::Validation` for a zero quantity and `Fault::NotFound` for
/// an unknown line.
pub async fn set(shop: &Shop, line_id: &CartLineId, quantity: u32) -> Result<(), Fault> {
    print_cart(&shop.set_quantity(line_id, quantity).await?);
    Ok(())
}

/// Remove a line from the cart.
///
/// # Errors
///
/// Returns `Fault::NotFound` for an unknown line.
pub async fn remove(shop: &Shop, line_id: &CartLineId) -> Result<(), Fault> {
    print_cart(&shop.remove_line(line_id).await?);
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns the fault from the backend call.
pub async fn clear(shop: &Shop) -> Result<(), Fault> {
    shop.clear_cart().await?;
    println!("Cart cleared");
    Ok(())
}

/// Apply a coupon code to the cart.
///
/// # Errors
///
/// Returns `Fault::Validation` for an unknown, expired, or inactive code.
pub async fn coupon(shop: &Shop, code: &str) -> Result<(), Fault> {
    print_cart(&shop.apply_coupon(code).await?);
    Ok(())
}

fn print_cart(cart: &Cart) {
    if cart.lines.is_empty() {
        println!("Cart is empty");
        return;
    }

    for line in &cart.lines {
        println!(
            "{:<40} {:>3} x {:>10} = {:>10}  [{}]",
            line.product.title,
            line.quantity,
            line.product.unit_price().display(),
            line.line_total().display(),
            line.id,
        );
    }
    println!("{:>59} {:>10}", "subtotal:", cart.subtotal().display());
    if let Some(applied) = &cart.coupon {
        println!(
            "{:>59} -{:>9}",
            format!("coupon {}:", applied.code),
            applied.discount.display()
        );
    }
    println!("{:>59} {:>10}", "total:", cart.total().display());
}
