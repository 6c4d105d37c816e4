//! Order commands.

use larkspur_client::{Fault, Shop};
use larkspur_core::{Order, OrderId, ShippingAddress};

/// Place an order from the current cart.
///
/// # Errors
///
/// Returns `Fault::Auth` for guests and `Fault::Validation` for an empty
/// cart.
pub async fn checkout(shop: &Shop, address: &ShippingAddress) -> Result<(), Fault> {
    let order = shop.checkout(address).await?;
    println!("Order {} placed - {}", order.id, order.total.display());
    Ok(())
}

/// List the caller's orders, newest first.
///
/// # Errors
///
/// Returns `Fault::Auth` for guests.
pub async fn list(shop: &Shop) -> Result<(), Fault> {
    let orders = shop.orders().await?;
    if orders.is_empty() {
        println!("No orders yet");
        return Ok(());
    }
    for order in &orders {
        print_order_line(order);
    }
    Ok(())
}

/// Show one order in full.
///
/// # Errors
///
/// Returns `Fault::NotFound` for an unknown id or another caller's order.
pub async fn show(shop: &Shop, order_id: &OrderId) -> Result<(), Fault> {
    let order = shop.order(order_id).await?;

    println!("Order {} - {}", order.id, order.status);
    println!("Placed {}", order.placed_at.format("%Y-%m-%d %H:%M"));
    println!();
    for line in &order.lines {
        println!(
            "{:<40} {:>3} x {:>10}",
            line.title,
            line.quantity,
            line.unit_price.display()
        );
    }
    println!("\nTotal: {}", order.total.display());
    println!(
        "Ship to: {}, {}, {} {}, {}",
        order.shipping_address.name,
        order.shipping_address.street,
        order.shipping_address.city,
        order.shipping_address.postal_code,
        order.shipping_address.country
    );
    Ok(())
}

pub(crate) fn print_order_line(order: &Order) {
    println!(
        "{}  {:<10} {:>10}  {}",
        order.placed_at.format("%Y-%m-%d"),
        order.status.to_string(),
        order.total.display(),
        order.id
    );
}
