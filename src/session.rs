//! Session
//!
//! The `Storefront` controller. It owns the catalog, the live cart, the
//! persistence store, the shipping policy, and the coupon registry, and is
//! the single writer of cart state. Every mutation persists before
//! returning, so a new session rooted at the same store directory resumes
//! where the previous one left off.

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    cart::{Cart, LineKey},
    catalog::{Catalog, ProductId, VariantId},
    checkout::{self, CheckoutError, CustomerDetails, Handoff},
    coupons::{CouponBook, CouponError},
    pricing::{self, PricingError, Quote, ShippingPolicy},
    store::{CartStore, StoreError},
};

/// Errors surfaced by storefront operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Cart state could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The submitted coupon code could not be redeemed.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The order could not be composed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

/// A storefront session: catalog plus mutable, persisted cart state.
#[derive(Debug)]
pub struct Storefront {
    catalog: Catalog,
    cart: Cart,
    store: CartStore,
    policy: ShippingPolicy,
    coupons: CouponBook,
    order_phone: String,
}

impl Storefront {
    /// Open a session over a catalog, resuming any cart persisted under the
    /// given store directory.
    pub fn open(catalog: Catalog, store_dir: impl Into<PathBuf>) -> Self {
        let currency = catalog.currency();
        let store = CartStore::new(store_dir);
        let cart = store.load();

        Self {
            catalog,
            cart,
            store,
            policy: ShippingPolicy::standard(currency),
            coupons: CouponBook::builtin(currency),
            order_phone: checkout::DEFAULT_ORDER_PHONE.to_string(),
        }
    }

    /// Override the number orders are handed off to.
    #[must_use]
    pub fn with_order_phone(mut self, phone: impl Into<String>) -> Self {
        self.order_phone = phone.into();
        self
    }

    /// The catalog this session sells from.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The current cart state.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Total units across all lines, for the cart badge.
    pub fn item_count(&self) -> u32 {
        self.cart.total_units()
    }

    /// Add a quantity of a product, merging with an existing line for the
    /// same product and variant.
    ///
    /// An unknown product id is a no-op: the trigger may race a catalog
    /// reload, so it is logged and swallowed rather than surfaced. Returns
    /// whether the cart changed.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the updated cart cannot be persisted.
    pub fn add_to_cart(
        &mut self,
        product: ProductId,
        quantity: u32,
        variant: Option<VariantId>,
    ) -> Result<bool, SessionError> {
        if self.catalog.product(product).is_none() {
            tracing::warn!(%product, "ignoring add of unknown product");
            return Ok(false);
        }

        let key = match variant {
            Some(variant) => LineKey::with_variant(product, variant),
            None => LineKey::product(product),
        };

        self.cart.add(key, quantity);
        self.store.save(&self.cart)?;

        Ok(true)
    }

    /// Raise a line's quantity by one.
    ///
    /// Returns whether a line matched the key; the store is only written
    /// when one did.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the updated cart cannot be persisted.
    pub fn increment(&mut self, key: &LineKey) -> Result<bool, SessionError> {
        let matched = self.cart.increment(key);
        if matched {
            self.store.save(&self.cart)?;
        }

        Ok(matched)
    }

    /// Lower a line's quantity by one, stopping at 1.
    ///
    /// Returns whether a line matched the key; the store is only written
    /// when one did.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the updated cart cannot be persisted.
    pub fn decrement(&mut self, key: &LineKey) -> Result<bool, SessionError> {
        let matched = self.cart.decrement(key);
        if matched {
            self.store.save(&self.cart)?;
        }

        Ok(matched)
    }

    /// Set a line's quantity directly, clamped to at least 1.
    ///
    /// Returns whether a line matched the key; the store is only written
    /// when one did.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the updated cart cannot be persisted.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) -> Result<bool, SessionError> {
        let matched = self.cart.set_quantity(key, quantity);
        if matched {
            self.store.save(&self.cart)?;
        }

        Ok(matched)
    }

    /// Remove a line entirely.
    ///
    /// Returns whether a line was removed; the store is only written when
    /// one was.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the updated cart cannot be persisted.
    pub fn remove(&mut self, key: &LineKey) -> Result<bool, SessionError> {
        let removed = self.cart.remove(key);
        if removed {
            self.store.save(&self.cart)?;
        }

        Ok(removed)
    }

    /// Empty the cart, dropping any active coupon.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the store entries cannot be removed.
    pub fn clear_cart(&mut self) -> Result<(), SessionError> {
        self.cart.clear();
        self.store.clear()?;

        Ok(())
    }

    /// Redeem a code and make it the active coupon, replacing any previous
    /// one. Returns the discount description for the inline confirmation.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Coupon`]: the code is empty or unknown; the active
    ///   coupon is left unchanged.
    /// - [`SessionError::Store`]: the updated cart cannot be persisted.
    pub fn apply_coupon(&mut self, code: &str) -> Result<String, SessionError> {
        let coupon = self.coupons.redeem(code)?;
        let description = coupon.discount.describe();

        self.cart.apply_coupon(coupon);
        self.store.save(&self.cart)?;

        Ok(description)
    }

    /// Drop the active coupon. No-op when none is active.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the updated cart cannot be persisted.
    pub fn remove_coupon(&mut self) -> Result<(), SessionError> {
        self.cart.remove_coupon();
        self.store.save(&self.cart)?;

        Ok(())
    }

    /// Price the current cart.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if totals cannot be computed.
    pub fn quote(&self) -> Result<Quote, SessionError> {
        Ok(pricing::quote(&self.cart, &self.catalog, &self.policy)?)
    }

    /// Compose the order and hand it off.
    ///
    /// On success the cart is emptied, in memory and in the store; the
    /// returned [`Handoff`] carries the message, the outbound URL, and the
    /// totals it was built from.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Checkout`]: the cart is empty or totals failed.
    /// - [`SessionError::Store`]: the cleared cart cannot be persisted.
    pub fn checkout(&mut self, details: &CustomerDetails) -> Result<Handoff, SessionError> {
        let (message, quote) =
            checkout::order_message(&self.cart, &self.catalog, &self.policy, details)?;
        let url = checkout::handoff_url(&self.order_phone, &message);

        self.cart.clear();
        self.store.clear()?;

        Ok(Handoff {
            message,
            url,
            quote,
        })
    }
}
