//! Fixtures
//!
//! YAML catalog documents and the price notation they use. The catalog is the
//! one piece of data loaded at session start; a failure here is fatal for the
//! session's catalog view and is surfaced to the caller, never retried.

use std::{fs, path::Path};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{BOB, Currency, EUR, GBP, USD},
};
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::{Catalog, Category, Product, ProductId, Variant, VariantId};

/// Fixture parsing errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading the catalog document.
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format.
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products.
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),
}

/// Wrapper for the catalog document.
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Ordered product list.
    pub products: Vec<ProductFixture>,
}

/// One product record as written in YAML.
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product id.
    pub id: u32,

    /// Display name.
    pub name: String,

    /// Short description.
    #[serde(default)]
    pub description: String,

    /// Category label.
    pub category: Category,

    /// Base price (e.g. "89.00 BOB").
    pub price: String,

    /// Pre-discount base price.
    #[serde(default)]
    pub original_price: Option<String>,

    /// Variant records.
    #[serde(default)]
    pub variants: Vec<VariantFixture>,

    /// Units in stock.
    #[serde(default)]
    pub stock: u32,

    /// Average rating out of five.
    #[serde(default)]
    pub rating: f32,

    /// Review count.
    #[serde(default)]
    pub reviews: u32,

    /// Recently added flag.
    #[serde(default)]
    pub new: bool,

    /// On-offer flag.
    #[serde(default)]
    pub offer: bool,

    /// Featured flag.
    #[serde(default)]
    pub featured: bool,

    /// Image paths.
    #[serde(default)]
    pub images: Vec<String>,

    /// Stock keeping unit.
    #[serde(default)]
    pub sku: String,

    /// Feature list.
    #[serde(default)]
    pub features: Vec<String>,
}

/// One variant record as written in YAML.
#[derive(Debug, Deserialize)]
pub struct VariantFixture {
    /// Variant id, unique within the product.
    pub id: String,

    /// Size label.
    pub size: String,

    /// Variant price (e.g. "45.00 BOB").
    pub price: String,

    /// Pre-discount price.
    #[serde(default)]
    pub original_price: Option<String>,

    /// Short description.
    #[serde(default)]
    pub description: Option<String>,

    /// Savings label.
    #[serde(default)]
    pub savings: Option<String>,
}

impl TryFrom<VariantFixture> for Variant {
    type Error = FixtureError;

    fn try_from(fixture: VariantFixture) -> Result<Self, Self::Error> {
        let price = parse_money(&fixture.price)?;
        let original_price = fixture
            .original_price
            .as_deref()
            .map(parse_money)
            .transpose()?;

        Ok(Variant {
            id: VariantId(fixture.id),
            size: fixture.size,
            price,
            original_price,
            description: fixture.description,
            savings: fixture.savings,
        })
    }
}

impl TryFrom<ProductFixture> for Product {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let price = parse_money(&fixture.price)?;
        let original_price = fixture
            .original_price
            .as_deref()
            .map(parse_money)
            .transpose()?;

        let variants = fixture
            .variants
            .into_iter()
            .map(Variant::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Product {
            id: ProductId(fixture.id),
            name: fixture.name,
            description: fixture.description,
            category: fixture.category,
            price,
            original_price,
            variants,
            stock: fixture.stock,
            rating: fixture.rating,
            reviews: fixture.reviews,
            new: fixture.new,
            offer: fixture.offer,
            featured: fixture.featured,
            images: fixture.images,
            sku: fixture.sku,
            features: fixture.features,
        })
    }
}

/// Parse a price string (e.g. "2.99 BOB") into minor units and currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "BOB" => BOB,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

fn parse_money(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let (minor_units, currency) = parse_price(s)?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse a catalog document from YAML, validating currency consistency.
///
/// # Errors
///
/// Returns an error if the document cannot be parsed, a price is malformed,
/// or products mix currencies.
pub fn catalog_from_yaml(yaml: &str) -> Result<Catalog, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

    let mut products = Vec::with_capacity(fixture.products.len());
    let mut currency: Option<&'static Currency> = None;

    for product_fixture in fixture.products {
        let (_minor_units, parsed_currency) = parse_price(&product_fixture.price)?;

        if let Some(existing) = currency {
            if existing != parsed_currency {
                return Err(FixtureError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    parsed_currency.iso_alpha_code.to_string(),
                ));
            }
        } else {
            currency = Some(parsed_currency);
        }

        products.push(Product::try_from(product_fixture)?);
    }

    Ok(Catalog::new(products))
}

/// Load a catalog document from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed; see
/// [`catalog_from_yaml`].
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, FixtureError> {
    let contents = fs::read_to_string(path)?;

    catalog_from_yaml(&contents)
}
