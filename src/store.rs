//! Store
//!
//! Cart persistence as two key-value entries in a store directory: one for
//! the line list, one for the active coupon (absent when none). The original
//! storefront kept these in browser local storage; corrupt or missing
//! entries fall back to the empty state and are never surfaced to the user.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    coupons::{Coupon, Discount},
};

/// File name of the line-list entry.
const CART_ENTRY: &str = "cart.json";

/// File name of the active-coupon entry.
const COUPON_ENTRY: &str = "coupon.json";

/// Errors that can occur while persisting cart state.
///
/// Only writes report errors; reads degrade to the empty state instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error writing an entry.
    #[error("Failed to write store entry: {0}")]
    Io(#[from] io::Error),

    /// Serialization error.
    #[error("Failed to serialize cart state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of the active coupon.
///
/// Keeps the kind and magnitude alongside the code so that a round trip does
/// not depend on the registry still carrying the code.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCoupon {
    code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    percent_off: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    amount_off_minor: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
}

impl From<&Coupon> for StoredCoupon {
    fn from(coupon: &Coupon) -> Self {
        match coupon.discount {
            Discount::PercentOff(percent) => Self {
                code: coupon.code.clone(),
                percent_off: (percent * Decimal::ONE).to_f64(),
                amount_off_minor: None,
                currency: None,
            },
            Discount::AmountOff(amount) => Self {
                code: coupon.code.clone(),
                percent_off: None,
                amount_off_minor: Some(amount.to_minor_units()),
                currency: Some(amount.currency().iso_alpha_code.to_string()),
            },
        }
    }
}

impl StoredCoupon {
    /// Rebuild the coupon; `None` when the record is incomplete.
    fn into_coupon(self) -> Option<Coupon> {
        let discount = if let Some(rate) = self.percent_off {
            Discount::PercentOff(Percentage::from(rate))
        } else {
            let minor = self.amount_off_minor?;
            let currency = iso::find(self.currency.as_deref()?)?;

            Discount::AmountOff(Money::from_minor(minor, currency))
        };

        Some(Coupon {
            code: self.code,
            discount,
        })
    }
}

/// Persisted cart storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct CartStore {
    dir: PathBuf,
}

impl CartStore {
    /// A store rooted at the given directory. The directory is created on
    /// first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the persisted cart.
    ///
    /// Missing or unparsable entries yield the empty state; recovery is
    /// logged at debug level, never propagated.
    pub fn load(&self) -> Cart {
        let lines: Vec<CartLine> = match read_entry(&self.dir.join(CART_ENTRY)) {
            Ok(lines) => lines,
            Err(error) => {
                if let Some(error) = error {
                    tracing::debug!(%error, "discarding unreadable cart entry");
                }
                Vec::new()
            }
        };

        let coupon = match read_entry::<StoredCoupon>(&self.dir.join(COUPON_ENTRY)) {
            Ok(stored) => {
                let coupon = stored.into_coupon();
                if coupon.is_none() {
                    tracing::debug!("discarding incomplete coupon entry");
                }
                coupon
            }
            Err(error) => {
                if let Some(error) = error {
                    tracing::debug!(%error, "discarding unreadable coupon entry");
                }
                None
            }
        };

        Cart::from_parts(lines, coupon)
    }

    /// Persist the whole cart state.
    ///
    /// Writes the line list and either writes or removes the coupon entry,
    /// so that no stale coupon survives its removal from the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if an entry cannot be serialized or written.
    pub fn save(&self, cart: &Cart) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        let lines = serde_json::to_vec_pretty(cart.lines())?;
        fs::write(self.dir.join(CART_ENTRY), lines)?;

        match cart.coupon() {
            Some(coupon) => {
                let stored = serde_json::to_vec_pretty(&StoredCoupon::from(coupon))?;
                fs::write(self.dir.join(COUPON_ENTRY), stored)?;
            }
            None => remove_entry(&self.dir.join(COUPON_ENTRY))?,
        }

        Ok(())
    }

    /// Remove both entries.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if removal fails for a reason other than the
    /// entry being absent.
    pub fn clear(&self) -> Result<(), StoreError> {
        remove_entry(&self.dir.join(CART_ENTRY))?;
        remove_entry(&self.dir.join(COUPON_ENTRY))?;

        Ok(())
    }
}

/// Read one entry; `Err(None)` when absent, `Err(Some(_))` when corrupt.
fn read_entry<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<T, Option<Box<dyn std::error::Error>>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Err(None),
        Err(error) => return Err(Some(error.into())),
    };

    serde_json::from_str(&contents).map_err(|error| Some(error.into()))
}

fn remove_entry(path: &Path) -> Result<(), io::Error> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{cart::LineKey, catalog::ProductId, coupons::CouponBook};

    use super::*;

    fn test_cart() -> Result<Cart, crate::coupons::CouponError> {
        let mut cart = Cart::new();
        cart.add(LineKey::product(ProductId(3)), 2);
        cart.add(LineKey::with_variant(ProductId(1), "v2".into()), 1);
        cart.apply_coupon(CouponBook::builtin(iso::BOB).redeem("AQUA10")?);

        Ok(cart)
    }

    #[test]
    fn round_trip_preserves_lines_order_and_coupon() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = CartStore::new(dir.path());

        let cart = test_cart()?;
        store.save(&cart)?;

        assert_eq!(store.load(), cart);

        Ok(())
    }

    #[test]
    fn round_trip_preserves_fixed_amount_coupon() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = CartStore::new(dir.path());

        let mut cart = Cart::new();
        cart.add(LineKey::product(ProductId(5)), 1);
        cart.apply_coupon(CouponBook::builtin(iso::BOB).redeem("PRIMERACOMPRA")?);

        store.save(&cart)?;

        assert_eq!(store.load(), cart);

        Ok(())
    }

    #[test]
    fn missing_entries_load_as_empty_cart() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = CartStore::new(dir.path().join("never-saved"));

        assert_eq!(store.load(), Cart::new());

        Ok(())
    }

    #[test]
    fn corrupt_cart_entry_loads_as_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = CartStore::new(dir.path());

        store.save(&test_cart()?)?;
        std::fs::write(dir.path().join(CART_ENTRY), "{not json")?;

        let loaded = store.load();

        assert!(loaded.is_empty(), "corrupt lines fall back to empty");
        assert!(loaded.coupon().is_some(), "coupon entry is independent");

        Ok(())
    }

    #[test]
    fn saving_without_coupon_removes_the_coupon_entry() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = CartStore::new(dir.path());

        let mut cart = test_cart()?;
        store.save(&cart)?;
        assert!(dir.path().join(COUPON_ENTRY).exists());

        cart.remove_coupon();
        store.save(&cart)?;

        assert!(!dir.path().join(COUPON_ENTRY).exists());
        assert!(store.load().coupon().is_none());

        Ok(())
    }

    #[test]
    fn clear_removes_both_entries() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = CartStore::new(dir.path());

        store.save(&test_cart()?)?;
        store.clear()?;

        assert!(!dir.path().join(CART_ENTRY).exists());
        assert_eq!(store.load(), Cart::new());

        Ok(())
    }
}
