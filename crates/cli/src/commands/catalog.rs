//! Catalog browsing commands.

use larkspur_client::{Fault, Shop};
use larkspur_core::{Product, ProductFilter, ProductId, SectionKind};

use larkspur_client::ops::NewReview;

/// List products matching a filter.
///
/// # Errors
///
/// Returns the fault from the backend read.
pub async fn products(shop: &Shop, filter: &ProductFilter) -> Result<(), Fault> {
    let page = shop.products(filter).await?;

    if page.items.is_empty() {
        println!("No products found");
        return Ok(());
    }

    for product in &page.items {
        print_product_line(product);
    }
    println!(
        "\nPage {} ({} of {} items){}",
        page.page_info.page,
        page.items.len(),
        page.page_info.total_items,
        if page.page_info.has_next() {
            " - more available with --page"
        } else {
            ""
        }
    );
    Ok(())
}

/// Show one product in full.
///
/// # Errors
///
/// Returns `Fault::NotFound` for an unknown slug.
pub async fn product(shop: &Shop, slug: &str) -> Result<(), Fault> {
    let product = shop.product(slug).await?;

    println!("{} [{}]", product.title, product.id);
    println!("  slug:     {}", product.slug);
    println!("  price:    {}", product.price.display());
    if let Some(discounted) = &product.discounted_price {
        println!("  on sale:  {}", discounted.display());
    }
    println!(
        "  stock:    {}",
        if product.in_stock { "in stock" } else { "out of stock" }
    );
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }
    Ok(())
}

/// List all categories.
///
/// # Errors
///
/// Returns the fault from the backend read.
pub async fn categories(shop: &Shop) -> Result<(), Fault> {
    let categories = shop.categories().await?;
    for category in &categories {
        match &category.description {
            Some(description) => {
                println!("{} [{}] - {}", category.name, category.slug, description);
            }
            None => println!("{} [{}]", category.name, category.slug),
        }
    }
    Ok(())
}

/// Show the active promotional home-page sections, in display order.
///
/// # Errors
///
/// Returns the fault from the backend read.
pub async fn sections(shop: &Shop) -> Result<(), Fault> {
    for section in shop.home_sections().await? {
        let kind = match &section.kind {
            SectionKind::HeroBanner { .. } => "hero banner",
            SectionKind::ProductStrip { .. } => "product strip",
            SectionKind::CategoryGrid { .. } => "category grid",
        };
        println!("{:>3}. {} ({kind})", section.position, section.title);
    }
    Ok(())
}

/// List reviews and the rating summary for a product.
///
/// # Errors
///
/// Returns the fault from the backend read.
pub async fn reviews(shop: &Shop, product_id: &ProductId) -> Result<(), Fault> {
    let summary = shop.rating_summary(product_id).await?;
    println!(
        "{:.1} stars across {} reviews\n",
        summary.average, summary.count
    );

    for review in shop.reviews(product_id).await? {
        match &review.title {
            Some(title) => println!("{}/5  {title} - {}", review.rating, review.author),
            None => println!("{}/5  {}", review.rating, review.author),
        }
        println!("     {}", review.body);
    }
    Ok(())
}

/// Submit a review.
///
/// # Errors
///
/// Returns `Fault::Validation` for an out-of-range rating.
pub async fn submit_review(
    shop: &Shop,
    product_id: &ProductId,
    rating: u8,
    title: Option<String>,
    body: String,
) -> Result<(), Fault> {
    let review = NewReview {
        author: None,
        rating,
        title,
        body,
    };
    let saved = shop.submit_review(product_id, &review).await?;
    println!("Review {} submitted", saved.id);
    Ok(())
}

fn print_product_line(product: &Product) {
    let price = product.effective_price().display();
    let stock = if product.in_stock { "" } else { "  (out of stock)" };
    println!("{:<40} {:>10}{stock}  [{}]", product.title, price, product.slug);
}
