//! Coupons
//!
//! Static registry of named discount rules. A coupon is either a percentage
//! of the subtotal or a fixed amount off; the two kinds are a tagged enum
//! dispatched exhaustively by the pricing engine.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors raised when redeeming a coupon code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    /// The submitted code was empty after trimming.
    #[error("Please enter a code")]
    Empty,

    /// The code is not in the registry.
    #[error("Coupon invalid or expired: {0}")]
    Unknown(String),
}

/// A discount rule: percentage of the subtotal, or a fixed amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Discount {
    /// Take this share off the subtotal (e.g. 10%).
    PercentOff(Percentage),

    /// Take a fixed amount off the subtotal, regardless of its size.
    AmountOff(Money<'static, Currency>),
}

impl Discount {
    /// Human-readable magnitude, e.g. "10%" or the formatted amount.
    pub fn describe(&self) -> String {
        match self {
            Discount::PercentOff(percent) => {
                let points = (*percent * Decimal::ONE_HUNDRED).normalize();
                format!("{points}%")
            }
            Discount::AmountOff(amount) => format!("{amount}"),
        }
    }
}

/// A named discount rule resolved from the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    /// Normalized (uppercase) code.
    pub code: String,

    /// The discount the code grants.
    pub discount: Discount,
}

/// Static lookup of coupon code to discount rule.
#[derive(Debug, Default)]
pub struct CouponBook {
    coupons: FxHashMap<String, Discount>,
}

impl CouponBook {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The storefront's built-in coupon set.
    pub fn builtin(currency: &'static Currency) -> Self {
        let mut book = Self::new();

        book.insert("AQUA10", Discount::PercentOff(Percentage::from(0.10)));
        book.insert("AQUA20", Discount::PercentOff(Percentage::from(0.20)));
        book.insert("VERANO2024", Discount::PercentOff(Percentage::from(0.15)));
        book.insert(
            "PRIMERACOMPRA",
            Discount::AmountOff(Money::from_minor(5_000, currency)),
        );

        book
    }

    /// Register a code. Codes are stored uppercase.
    pub fn insert(&mut self, code: &str, discount: Discount) {
        self.coupons.insert(code.trim().to_uppercase(), discount);
    }

    /// Number of registered codes.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }

    /// Resolve a submitted code into a coupon.
    ///
    /// The code is trimmed and uppercased before lookup, so user input like
    /// " aqua10 " resolves to `AQUA10`.
    ///
    /// # Errors
    ///
    /// - [`CouponError::Empty`]: the code was empty after trimming.
    /// - [`CouponError::Unknown`]: the code is not registered.
    pub fn redeem(&self, code: &str) -> Result<Coupon, CouponError> {
        let normalized = code.trim().to_uppercase();

        if normalized.is_empty() {
            return Err(CouponError::Empty);
        }

        let discount = self
            .coupons
            .get(&normalized)
            .ok_or_else(|| CouponError::Unknown(normalized.clone()))?;

        Ok(Coupon {
            code: normalized,
            discount: *discount,
        })
    }
}
