//! Storefront Example
//!
//! Walks the full storefront flow against the bundled catalog: browse a page
//! of products, fill a cart, apply a coupon, and print the composed order.
//!
//! Use `-c` to point at a different catalog file
//! Use `-s` to choose the cart store directory
//! Use `--coupon` to apply a coupon code before checkout

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use aquarix::{
    browse::{self, Filters, SortOrder},
    checkout::{CustomerDetails, PaymentMethod},
    fixtures::load_catalog,
    session::Storefront,
};
use tabled::{
    builder::Builder,
    settings::{Alignment, Color, Style, object::{Columns, Rows}},
};

/// Arguments for the storefront example
#[derive(Debug, Parser)]
struct StorefrontArgs {
    /// Catalog file to load
    #[clap(short, long, default_value = "fixtures/catalog.yml")]
    catalog: PathBuf,

    /// Directory the cart is persisted under
    #[clap(short, long, default_value = "target/cart-store")]
    store_dir: PathBuf,

    /// Coupon code to apply before checkout
    #[clap(long)]
    coupon: Option<String>,
}

/// Storefront Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = StorefrontArgs::parse();

    let catalog = load_catalog(&args.catalog)?;
    let mut session = Storefront::open(catalog, &args.store_dir);

    let filters = Filters::standard(session.catalog().currency());
    let shelf = browse::browse(session.catalog(), &filters, SortOrder::Popular);
    let page = browse::page_slice(&shelf, 1, browse::DEFAULT_PAGE_SIZE);

    print_shelf(page);

    let featured: Vec<_> = session.catalog().featured().map(|product| product.id).collect();

    for id in featured {
        session.add_to_cart(id, 1, None)?;
    }

    if let Some(code) = args.coupon.as_deref() {
        match session.apply_coupon(code) {
            Ok(description) => println!("Coupon applied: {description} off"),
            Err(error) => println!("Coupon rejected: {error}"),
        }
    }

    let quote = session.quote()?;

    println!("\n Subtotal: {}", quote.subtotal());
    println!(" Discount: {}", quote.discount());
    if quote.free_shipping() {
        println!(" Shipping: FREE");
    } else {
        println!(" Shipping: {}", quote.shipping());
    }
    println!("    Total: {}", quote.total());

    let handoff = session.checkout(&CustomerDetails {
        name: "Demo Customer".to_string(),
        phone: "70000000".to_string(),
        email: None,
        address: "Av. Demo 1".to_string(),
        city: "La Paz".to_string(),
        payment: PaymentMethod::QrPayment,
        notes: None,
    })?;

    println!("\n{}", handoff.message);
    println!("\nHandoff: {}", handoff.url);

    Ok(())
}

#[expect(clippy::print_stdout, reason = "Example code")]
fn print_shelf(page: &[&aquarix::catalog::Product]) {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Product", "Category", "Price", "Stock", "Rating"]);

    for product in page {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.label().to_string(),
            product.effective_price().to_string(),
            product.stock.to_string(),
            format!("{:.1} ({})", product.rating, product.reviews),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..5), Alignment::right());

    println!("{table}");
}
