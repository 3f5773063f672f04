//! Pricing
//!
//! Pure totals over cart and catalog state: subtotal, coupon discount,
//! shipping, and total. No side effects beyond a warning log when a cart
//! line references a product the catalog no longer carries; such lines
//! contribute nothing rather than failing the whole quote.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::Cart,
    catalog::{Catalog, Product, VariantId},
    coupons::{Coupon, Discount},
};

/// Errors that can occur while computing totals.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// A line total exceeded the representable range.
    #[error("line total overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Shipping rule: free above a subtotal threshold, a flat rate below it.
#[derive(Debug, Clone, Copy)]
pub struct ShippingPolicy {
    /// Subtotal at or above which shipping is free.
    pub free_threshold: Money<'static, Currency>,

    /// Flat rate charged below the threshold.
    pub flat_rate: Money<'static, Currency>,
}

impl ShippingPolicy {
    /// The storefront's policy: free at Bs 200, otherwise Bs 20 flat.
    pub fn standard(currency: &'static Currency) -> Self {
        Self {
            free_threshold: Money::from_minor(20_000, currency),
            flat_rate: Money::from_minor(2_000, currency),
        }
    }
}

/// Effective unit price of a line: the variant's price when the variant
/// resolves, else the product's base price.
pub fn unit_price(product: &Product, variant: Option<&VariantId>) -> Money<'static, Currency> {
    variant
        .and_then(|id| product.variant(id))
        .map_or(product.price, |variant| variant.price)
}

/// Sum of `unit_price * quantity` over all cart lines.
///
/// Lines whose product no longer resolves in the catalog are skipped with a
/// warning; a stale persisted cart must not poison the session.
///
/// # Errors
///
/// Returns a [`PricingError`] if a line total overflows or money arithmetic
/// fails.
pub fn subtotal(cart: &Cart, catalog: &Catalog) -> Result<Money<'static, Currency>, PricingError> {
    let currency = catalog.currency();

    cart.lines()
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            let Some(product) = catalog.product(line.key.product) else {
                tracing::warn!(
                    product = %line.key.product,
                    "cart line references unknown product; skipping"
                );
                return Ok(acc);
            };

            let unit = unit_price(product, line.key.variant.as_ref());

            let line_minor = unit
                .to_minor_units()
                .checked_mul(i64::from(line.quantity))
                .ok_or(PricingError::Overflow)?;

            Ok(acc.add(Money::from_minor(line_minor, unit.currency()))?)
        })
}

/// Discount granted by the active coupon, zero when none is active.
///
/// Percentage coupons are rounded to whole currency units, half away from
/// zero, matching the storefront's integer rounding over major amounts.
/// Fixed-amount coupons are not capped at the subtotal and may exceed it.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] when a percentage cannot be
/// represented in minor units.
pub fn discount_amount(
    subtotal: Money<'static, Currency>,
    coupon: Option<&Coupon>,
) -> Result<Money<'static, Currency>, PricingError> {
    let Some(coupon) = coupon else {
        return Ok(Money::from_minor(0, subtotal.currency()));
    };

    match coupon.discount {
        Discount::PercentOff(percent) => {
            let minor = percent_of_minor(&percent, subtotal.to_minor_units())?;

            Ok(Money::from_minor(minor, subtotal.currency()))
        }
        Discount::AmountOff(amount) => Ok(amount),
    }
}

/// Shipping cost: zero at or above the free threshold, else the flat rate.
pub fn shipping(
    subtotal: Money<'static, Currency>,
    policy: &ShippingPolicy,
) -> Money<'static, Currency> {
    if subtotal.to_minor_units() >= policy.free_threshold.to_minor_units() {
        Money::from_minor(0, subtotal.currency())
    } else {
        policy.flat_rate
    }
}

/// `subtotal - discount + shipping`, exactly.
///
/// # Errors
///
/// Returns a [`PricingError`] if money arithmetic fails (e.g. a coupon in a
/// different currency).
pub fn total(
    subtotal: Money<'static, Currency>,
    discount: Money<'static, Currency>,
    shipping: Money<'static, Currency>,
) -> Result<Money<'static, Currency>, PricingError> {
    Ok(subtotal.sub(discount)?.add(shipping)?)
}

/// Calculate the discount amount in minor units for a percentage.
///
/// The storefront rounds percentage discounts to whole currency units, so
/// the result is the minor-unit equivalent of `round(amount * rate)` over
/// major amounts. [`RoundingStrategy::MidpointAwayFromZero`] matches that
/// rounding for positive amounts.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] when the calculation overflows
/// or cannot be safely represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .checked_div(Decimal::ONE_HUNDRED)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(PricingError::PercentConversion)?
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

/// Computed totals for a cart at a point in time.
#[derive(Debug, Clone, Copy)]
pub struct Quote {
    subtotal: Money<'static, Currency>,
    discount: Money<'static, Currency>,
    shipping: Money<'static, Currency>,
    total: Money<'static, Currency>,
}

impl Quote {
    /// Sum of line totals before discount and shipping.
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Amount taken off by the active coupon.
    pub fn discount(&self) -> Money<'static, Currency> {
        self.discount
    }

    /// Shipping cost; zero means free shipping.
    pub fn shipping(&self) -> Money<'static, Currency> {
        self.shipping
    }

    /// Amount payable: `subtotal - discount + shipping`.
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Whether shipping is free for this quote.
    pub fn free_shipping(&self) -> bool {
        self.shipping.to_minor_units() == 0
    }

    /// Amount still missing to reach free shipping, if any.
    pub fn remaining_for_free_shipping(
        &self,
        policy: &ShippingPolicy,
    ) -> Option<Money<'static, Currency>> {
        let missing = policy.free_threshold.to_minor_units() - self.subtotal.to_minor_units();

        (missing > 0).then(|| Money::from_minor(missing, self.subtotal.currency()))
    }
}

/// Compute the full quote for a cart against a catalog and shipping policy.
///
/// # Errors
///
/// Returns a [`PricingError`] if any of the underlying computations fail.
pub fn quote(
    cart: &Cart,
    catalog: &Catalog,
    policy: &ShippingPolicy,
) -> Result<Quote, PricingError> {
    let subtotal = self::subtotal(cart, catalog)?;
    let discount = discount_amount(subtotal, cart.coupon())?;
    let shipping = self::shipping(subtotal, policy);
    let total = self::total(subtotal, discount, shipping)?;

    Ok(Quote {
        subtotal,
        discount,
        shipping,
        total,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{
        cart::LineKey,
        catalog::{Category, ProductId, Variant},
        coupons::CouponBook,
    };

    use super::*;

    fn product(id: u32, price_minor: i64) -> Product {
        Product {
            id: ProductId(id),
            name: format!("Product {id}"),
            description: String::new(),
            category: Category::Accessories,
            price: Money::from_minor(price_minor, iso::BOB),
            original_price: None,
            variants: Vec::new(),
            stock: 10,
            rating: 4.5,
            reviews: 10,
            new: false,
            offer: false,
            featured: false,
            images: Vec::new(),
            sku: String::new(),
            features: Vec::new(),
        }
    }

    fn variant(id: &str, price_minor: i64) -> Variant {
        Variant {
            id: id.into(),
            size: id.to_string(),
            price: Money::from_minor(price_minor, iso::BOB),
            original_price: None,
            description: None,
            savings: None,
        }
    }

    fn policy() -> ShippingPolicy {
        ShippingPolicy::standard(iso::BOB)
    }

    #[test]
    fn subtotal_multiplies_unit_price_by_quantity() -> TestResult {
        let catalog = Catalog::new(vec![product(1, 2_500), product(2, 1_000)]);

        let mut cart = Cart::new();
        cart.add(LineKey::product(ProductId(1)), 2);
        cart.add(LineKey::product(ProductId(2)), 3);

        assert_eq!(
            subtotal(&cart, &catalog)?,
            Money::from_minor(8_000, iso::BOB)
        );

        Ok(())
    }

    #[test]
    fn subtotal_uses_variant_price_when_it_resolves() -> TestResult {
        let mut with_variants = product(1, 9_999);
        with_variants.variants.push(variant("v1", 4_000));

        let catalog = Catalog::new(vec![with_variants]);

        let mut cart = Cart::new();
        cart.add(LineKey::with_variant(ProductId(1), "v1".into()), 2);

        assert_eq!(
            subtotal(&cart, &catalog)?,
            Money::from_minor(8_000, iso::BOB)
        );

        Ok(())
    }

    #[test]
    fn subtotal_falls_back_to_base_price_for_unknown_variant() -> TestResult {
        let catalog = Catalog::new(vec![product(1, 1_000)]);

        let mut cart = Cart::new();
        cart.add(LineKey::with_variant(ProductId(1), "ghost".into()), 1);

        assert_eq!(
            subtotal(&cart, &catalog)?,
            Money::from_minor(1_000, iso::BOB)
        );

        Ok(())
    }

    #[test]
    fn subtotal_skips_unresolved_products() -> TestResult {
        let catalog = Catalog::new(vec![product(1, 1_000)]);

        let mut cart = Cart::new();
        cart.add(LineKey::product(ProductId(1)), 1);
        cart.add(LineKey::product(ProductId(42)), 5);

        assert_eq!(
            subtotal(&cart, &catalog)?,
            Money::from_minor(1_000, iso::BOB)
        );

        Ok(())
    }

    #[test]
    fn percentage_discount_rounds_to_whole_currency_units() -> TestResult {
        let coupon = CouponBook::builtin(iso::BOB).redeem("VERANO2024")?;

        // 15% of 123.00 is 18.45, which rounds to a flat 18.
        let amount = discount_amount(Money::from_minor(12_300, iso::BOB), Some(&coupon))?;

        assert_eq!(amount, Money::from_minor(1_800, iso::BOB));

        Ok(())
    }

    #[test]
    fn percentage_discount_rounds_half_away_from_zero() -> TestResult {
        let coupon = CouponBook::builtin(iso::BOB).redeem("VERANO2024")?;

        // 15% of 10.00 is 1.50, which rounds up to 2, not down to 1.
        let amount = discount_amount(Money::from_minor(1_000, iso::BOB), Some(&coupon))?;

        assert_eq!(amount, Money::from_minor(200, iso::BOB));

        Ok(())
    }

    #[test]
    fn fixed_discount_is_not_capped_at_subtotal() -> TestResult {
        let coupon = CouponBook::builtin(iso::BOB).redeem("PRIMERACOMPRA")?;

        let amount = discount_amount(Money::from_minor(1_000, iso::BOB), Some(&coupon))?;

        assert_eq!(amount, Money::from_minor(5_000, iso::BOB));

        Ok(())
    }

    #[test]
    fn no_coupon_means_zero_discount() -> TestResult {
        let amount = discount_amount(Money::from_minor(10_000, iso::BOB), None)?;

        assert_eq!(amount, Money::from_minor(0, iso::BOB));

        Ok(())
    }

    #[test]
    fn shipping_boundary_at_free_threshold() {
        assert_eq!(
            shipping(Money::from_minor(20_000, iso::BOB), &policy()),
            Money::from_minor(0, iso::BOB),
            "subtotal of exactly 200 ships free"
        );

        assert_eq!(
            shipping(Money::from_minor(19_900, iso::BOB), &policy()),
            Money::from_minor(2_000, iso::BOB),
            "subtotal of 199 pays the flat rate"
        );
    }

    #[test]
    fn aqua10_calibration_case() -> TestResult {
        // Subtotal 100, AQUA10 -> discount 10, shipping 20, total 110.
        let catalog = Catalog::new(vec![product(1, 10_000)]);

        let mut cart = Cart::new();
        cart.add(LineKey::product(ProductId(1)), 1);
        cart.apply_coupon(CouponBook::builtin(iso::BOB).redeem("AQUA10")?);

        let quote = quote(&cart, &catalog, &policy())?;

        assert_eq!(quote.subtotal(), Money::from_minor(10_000, iso::BOB));
        assert_eq!(quote.discount(), Money::from_minor(1_000, iso::BOB));
        assert_eq!(quote.shipping(), Money::from_minor(2_000, iso::BOB));
        assert_eq!(quote.total(), Money::from_minor(11_000, iso::BOB));

        Ok(())
    }

    #[test]
    fn quote_reports_remaining_for_free_shipping() -> TestResult {
        let catalog = Catalog::new(vec![product(1, 15_000)]);

        let mut cart = Cart::new();
        cart.add(LineKey::product(ProductId(1)), 1);

        let quote = quote(&cart, &catalog, &policy())?;

        assert!(!quote.free_shipping());
        assert_eq!(
            quote.remaining_for_free_shipping(&policy()),
            Some(Money::from_minor(5_000, iso::BOB))
        );

        Ok(())
    }

    #[test]
    fn empty_cart_quotes_flat_shipping_only() -> TestResult {
        let catalog = Catalog::new(Vec::new());
        let cart = Cart::new();

        let quote = quote(&cart, &catalog, &policy())?;

        assert_eq!(quote.subtotal(), Money::from_minor(0, iso::BOB));
        assert_eq!(quote.total(), Money::from_minor(2_000, iso::BOB));

        Ok(())
    }
}
