//! Cart
//!
//! In-memory cart state. Lines are addressed by their stable
//! (product, variant) key rather than by position, so a re-sorted or
//! re-filtered view can never remove the wrong line.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    catalog::{ProductId, VariantId},
    coupons::Coupon,
};

/// Stable identity of a cart line: a product plus an optional variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    /// Product the line refers to.
    pub product: ProductId,

    /// Selected variant, when the product has one.
    pub variant: Option<VariantId>,
}

impl LineKey {
    /// Key for a product without a variant selection.
    pub fn product(product: ProductId) -> Self {
        Self {
            product,
            variant: None,
        }
    }

    /// Key for a product with a selected variant.
    pub fn with_variant(product: ProductId, variant: VariantId) -> Self {
        Self {
            product,
            variant: Some(variant),
        }
    }
}

/// One entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line identity.
    #[serde(flatten)]
    pub key: LineKey,

    /// Number of units; always at least 1.
    pub quantity: u32,
}

/// Cart state: ordered lines plus the active coupon, if any.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Cart {
    lines: SmallVec<[CartLine; 8]>,
    coupon: Option<Coupon>,
}

impl Cart {
    /// An empty cart with no coupon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from persisted lines and coupon.
    ///
    /// Zero-quantity lines are dropped rather than kept, so a tampered store
    /// entry cannot violate the quantity invariant.
    pub fn from_parts(lines: impl IntoIterator<Item = CartLine>, coupon: Option<Coupon>) -> Self {
        let lines = lines
            .into_iter()
            .filter(|line| line.quantity > 0)
            .collect();

        Self { lines, coupon }
    }

    /// Add `quantity` units of a product/variant pair.
    ///
    /// Merges into an existing line with the same key by incrementing its
    /// quantity, otherwise appends a new line. Zero-quantity adds are ignored.
    pub fn add(&mut self, key: LineKey, quantity: u32) {
        if quantity == 0 {
            return;
        }

        if let Some(line) = self.line_mut(&key) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine { key, quantity });
        }
    }

    /// Set the quantity of an existing line, clamped to at least 1.
    ///
    /// Returns false when no line matches the key.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) -> bool {
        match self.line_mut(key) {
            Some(line) => {
                line.quantity = quantity.max(1);
                true
            }
            None => false,
        }
    }

    /// Add one unit to an existing line. Returns false when no line matches.
    pub fn increment(&mut self, key: &LineKey) -> bool {
        match self.line_mut(key) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Remove one unit from an existing line; stops at 1, never auto-removes.
    ///
    /// Returns false when no line matches the key.
    pub fn decrement(&mut self, key: &LineKey) -> bool {
        match self.line_mut(key) {
            Some(line) => {
                if line.quantity > 1 {
                    line.quantity -= 1;
                }
                true
            }
            None => false,
        }
    }

    /// Delete the line with the given key. Returns false when absent.
    pub fn remove(&mut self, key: &LineKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.key != key);

        self.lines.len() < before
    }

    /// Empty the cart and drop the active coupon.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.coupon = None;
    }

    /// Replace the active coupon. At most one coupon is active at a time.
    pub fn apply_coupon(&mut self, coupon: Coupon) {
        self.coupon = Some(coupon);
    }

    /// Drop the active coupon; no effect when none is active.
    pub fn remove_coupon(&mut self) {
        self.coupon = None;
    }

    /// The active coupon, if any.
    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines (the cart badge count).
    pub fn total_units(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |sum, line| sum.saturating_add(line.quantity))
    }

    fn line_mut(&mut self, key: &LineKey) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| &line.key == key)
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::ProductId;

    use super::*;

    fn key(id: u32) -> LineKey {
        LineKey::product(ProductId(id))
    }

    #[test]
    fn add_merges_matching_product_and_variant() {
        let mut cart = Cart::new();
        let variant_key = LineKey::with_variant(ProductId(1), "v1".into());

        cart.add(variant_key.clone(), 2);
        cart.add(variant_key.clone(), 3);

        assert_eq!(cart.len(), 1);
        assert_eq!(
            cart.lines().first().map(|line| line.quantity),
            Some(5),
            "quantities should merge into one line"
        );
    }

    #[test]
    fn add_distinguishes_variants_of_the_same_product() {
        let mut cart = Cart::new();

        cart.add(LineKey::with_variant(ProductId(1), "v1".into()), 1);
        cart.add(LineKey::with_variant(ProductId(1), "v2".into()), 1);
        cart.add(key(1), 1);

        assert_eq!(cart.len(), 3, "base and each variant are distinct lines");
    }

    #[test]
    fn add_preserves_insertion_order() {
        let mut cart = Cart::new();

        cart.add(key(3), 1);
        cart.add(key(1), 1);
        cart.add(key(2), 1);

        let order: Vec<u32> = cart.lines().iter().map(|line| line.key.product.0).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn decrement_floors_at_one() {
        let mut cart = Cart::new();
        cart.add(key(1), 1);

        assert!(cart.decrement(&key(1)));
        assert_eq!(cart.lines().first().map(|line| line.quantity), Some(1));
    }

    #[test]
    fn set_quantity_clamps_to_one() {
        let mut cart = Cart::new();
        cart.add(key(1), 5);

        assert!(cart.set_quantity(&key(1), 0));
        assert_eq!(cart.lines().first().map(|line| line.quantity), Some(1));
    }

    #[test]
    fn remove_unknown_key_is_a_noop() {
        let mut cart = Cart::new();
        cart.add(key(1), 1);

        assert!(!cart.remove(&key(9)));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn removing_last_line_matches_clear() {
        let mut cart = Cart::new();
        cart.add(key(1), 2);

        assert!(cart.remove(&key(1)));

        let mut cleared = Cart::new();
        cleared.add(key(1), 2);
        cleared.clear();

        assert!(cart.is_empty());
        assert_eq!(cart, cleared);
    }

    #[test]
    fn total_units_sums_quantities() {
        let mut cart = Cart::new();
        cart.add(key(1), 2);
        cart.add(key(2), 3);

        assert_eq!(cart.total_units(), 5);
    }

    #[test]
    fn from_parts_drops_zero_quantity_lines() {
        let cart = Cart::from_parts(
            [
                CartLine {
                    key: key(1),
                    quantity: 0,
                },
                CartLine {
                    key: key(2),
                    quantity: 2,
                },
            ],
            None,
        );

        assert_eq!(cart.len(), 1);
    }
}
