//! Larkspur CLI - Storefront and admin tooling over the REST backend.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! lark catalog products --query espresso --sort price-asc
//! lark catalog product moka-pot-6-cup
//!
//! # Shop (the same persisted session across invocations)
//! lark cart add prod_123 --quantity 2
//! lark cart show
//!
//! # Authenticate and check out
//! lark account login -e buyer@example.com -p secret
//! lark orders checkout --name "A. Buyer" --street "1 Main St" \
//!     --city Springfield --postal-code 00000 --country US
//!
//! # Administrate (requires an admin token)
//! lark admin users
//! lark admin set-order-status ord_42 shipped
//! ```
//!
//! # Environment Variables
//!
//! - `LARKSPUR_API_BASE_URL` - Base URL of the backend (required)
//! - `LARKSPUR_PROFILE_PATH` - Where the session/token profile is persisted

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod commands;

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use larkspur_client::identity::FileProfileStore;
use larkspur_client::{ClientConfig, Fault, Shop};
use larkspur_core::{
    CartLineId, CategoryId, CouponId, OrderId, OrderStatus, ProductFilter, ProductId, ProductSort,
    UserId,
};

#[derive(Parser)]
#[command(name = "lark")]
#[command(author, version, about = "Larkspur storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products, categories, and reviews
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Register, log in and out, show the current identity
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Check out and review past orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Administrative operations (admin token required)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products
    Products {
        /// Free-text search over title and description
        #[arg(short, long)]
        query: Option<String>,

        /// Restrict to a category id
        #[arg(short, long)]
        category: Option<String>,

        /// Sort order
        #[arg(short, long, value_enum, default_value_t = SortArg::Newest)]
        sort: SortArg,

        /// 1-based page number
        #[arg(long)]
        page: Option<u32>,

        /// Page size
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Show one product by slug
    Product { slug: String },
    /// List categories
    Categories,
    /// Show the promotional home-page sections
    Sections,
    /// List reviews for a product
    Reviews { product_id: String },
    /// Submit a review for a product
    Review {
        product_id: String,

        /// Star rating, 1 through 5
        #[arg(short, long)]
        rating: u8,

        /// Optional headline
        #[arg(short, long)]
        title: Option<String>,

        /// Review text
        #[arg(short, long)]
        body: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the current cart
    Show,
    /// Add a product
    Add {
        product_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity
    Set { line_id: String, quantity: u32 },
    /// Remove a line
    Remove { line_id: String },
    /// Empty the cart
    Clear,
    /// Apply a coupon code
    Coupon { code: String },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        password: String,
    },
    /// Log in
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Log out
    Logout,
    /// Show the current identity and profile
    Whoami,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Place an order from the current cart
    Checkout {
        #[arg(long)]
        name: String,

        #[arg(long)]
        street: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        postal_code: String,

        /// ISO country code
        #[arg(long)]
        country: String,
    },
    /// List past orders
    List,
    /// Show one order
    Show { order_id: String },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List user accounts
    Users,
    /// Disable a user account
    DisableUser { user_id: String },
    /// Re-enable a user account
    EnableUser { user_id: String },
    /// List all orders across users
    Orders,
    /// Move an order to a new status
    SetOrderStatus {
        order_id: String,

        #[arg(value_enum)]
        status: StatusArg,
    },
    /// List coupons
    Coupons,
    /// Create a coupon
    CreateCoupon {
        code: String,

        /// Percentage off the subtotal (mutually exclusive with --amount)
        #[arg(long, conflicts_with = "amount")]
        percent: Option<Decimal>,

        /// Fixed amount off the subtotal, in the default currency
        #[arg(long)]
        amount: Option<Decimal>,
    },
    /// Delete a coupon
    DeleteCoupon { coupon_id: String },
    /// Create a category
    CreateCategory {
        slug: String,
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a category
    DeleteCategory { category_id: String },
    /// Delete a product
    DeleteProduct { product_id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Newest,
    PriceAsc,
    PriceDesc,
    TitleAsc,
}

impl From<SortArg> for ProductSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Newest => Self::Newest,
            SortArg::PriceAsc => Self::PriceAsc,
            SortArg::PriceDesc => Self::PriceDesc,
            SortArg::TitleAsc => Self::TitleAsc,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl From<StatusArg> for OrderStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::Paid => Self::Paid,
            StatusArg::Shipped => Self::Shipped,
            StatusArg::Delivered => Self::Delivered,
            StatusArg::Cancelled => Self::Cancelled,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        if matches!(e.downcast_ref::<Fault>(), Some(f) if f.is_auth()) {
            eprintln!("Log in first: lark account login -e <email> -p <password>");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let store = Arc::new(FileProfileStore::open(&config.profile_path)?);
    let shop = Shop::new(&config, store)?;

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::Products {
                query,
                category,
                sort,
                page,
                per_page,
            } => {
                let filter = ProductFilter {
                    search: query,
                    category: category.map(CategoryId::new),
                    sort: sort.into(),
                    page,
                    per_page,
                };
                commands::catalog::products(&shop, &filter).await?;
            }
            CatalogAction::Product { slug } => commands::catalog::product(&shop, &slug).await?,
            CatalogAction::Categories => commands::catalog::categories(&shop).await?,
            CatalogAction::Sections => commands::catalog::sections(&shop).await?,
            CatalogAction::Reviews { product_id } => {
                commands::catalog::reviews(&shop, &ProductId::new(product_id)).await?;
            }
            CatalogAction::Review {
                product_id,
                rating,
                title,
                body,
            } => {
                commands::catalog::submit_review(
                    &shop,
                    &ProductId::new(product_id),
                    rating,
                    title,
                    body,
                )
                .await?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&shop).await?,
            CartAction::Add {
                product_id,
                quantity,
            } => commands::cart::add(&shop, &ProductId::new(product_id), quantity).await?,
            CartAction::Set { line_id, quantity } => {
                commands::cart::set(&shop, &CartLineId::new(line_id), quantity).await?;
            }
            CartAction::Remove { line_id } => {
                commands::cart::remove(&shop, &CartLineId::new(line_id)).await?;
            }
            CartAction::Clear => commands::cart::clear(&shop).await?,
            CartAction::Coupon { code } => commands::cart::coupon(&shop, &code).await?,
        },
        Commands::Account { action } => match action {
            AccountAction::Register {
                email,
                name,
                password,
            } => commands::account::register(&shop, email, name, password).await?,
            AccountAction::Login { email, password } => {
                commands::account::login(&shop, email, password).await?;
            }
            AccountAction::Logout => commands::account::logout(&shop).await?,
            AccountAction::Whoami => commands::account::whoami(&shop).await?,
        },
        Commands::Orders { action } => match action {
            OrderAction::Checkout {
                name,
                street,
                city,
                postal_code,
                country,
            } => {
                let address = larkspur_core::ShippingAddress {
                    name,
                    street,
                    city,
                    postal_code,
                    country,
                };
                commands::orders::checkout(&shop, &address).await?;
            }
            OrderAction::List => commands::orders::list(&shop).await?,
            OrderAction::Show { order_id } => {
                commands::orders::show(&shop, &OrderId::new(order_id)).await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Users => commands::admin::users(&shop).await?,
            AdminAction::DisableUser { user_id } => {
                commands::admin::set_user_disabled(&shop, &UserId::new(user_id), true).await?;
            }
            AdminAction::EnableUser { user_id } => {
                commands::admin::set_user_disabled(&shop, &UserId::new(user_id), false).await?;
            }
            AdminAction::Orders => commands::admin::orders(&shop).await?,
            AdminAction::SetOrderStatus { order_id, status } => {
                commands::admin::set_order_status(&shop, &OrderId::new(order_id), status.into())
                    .await?;
            }
            AdminAction::Coupons => commands::admin::coupons(&shop).await?,
            AdminAction::CreateCoupon {
                code,
                percent,
                amount,
            } => commands::admin::create_coupon(&shop, code, percent, amount).await?,
            AdminAction::DeleteCoupon { coupon_id } => {
                commands::admin::delete_coupon(&shop, &CouponId::new(coupon_id)).await?;
            }
            AdminAction::CreateCategory {
                slug,
                name,
                description,
            } => commands::admin::create_category(&shop, slug, name, description).await?,
            AdminAction::DeleteCategory { category_id } => {
                commands::admin::delete_category(&shop, &CategoryId::new(category_id)).await?;
            }
            AdminAction::DeleteProduct { product_id } => {
                commands::admin::delete_product(&shop, &ProductId::new(product_id)).await?;
            }
        },
    }
    Ok(())
}
