//! Checkout
//!
//! Builds the order summary handed off to the external messaging link. There
//! is no payment processing here: checkout composes a deterministic text
//! message and a `wa.me` URL carrying it; nothing is awaited or parsed.

use std::fmt::{self, Write};

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;

use crate::{
    cart::Cart,
    catalog::Catalog,
    pricing::{self, PricingError, Quote, ShippingPolicy},
};

/// Number the order message is sent to when none is configured.
pub const DEFAULT_ORDER_PHONE: &str = "59173211815";

/// Errors that can occur while composing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout is not available for an empty cart.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Formatting the message failed.
    #[error("failed to format order message")]
    Format(#[from] fmt::Error),
}

/// Payment methods offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Bank transfer ahead of delivery.
    BankTransfer,

    /// Cash on delivery.
    CashOnDelivery,

    /// QR wallet payment.
    QrPayment,
}

impl PaymentMethod {
    /// Label printed in the order summary.
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "Bank transfer",
            PaymentMethod::CashOnDelivery => "Cash on delivery",
            PaymentMethod::QrPayment => "QR wallet payment",
        }
    }
}

/// Customer details collected by the checkout form.
///
/// Presence validation happens in the form; the formatter only decides which
/// optional sections to include.
#[derive(Debug, Clone)]
pub struct CustomerDetails {
    /// Full name.
    pub name: String,

    /// Contact phone number.
    pub phone: String,

    /// Contact email, optional.
    pub email: Option<String>,

    /// Delivery street address.
    pub address: String,

    /// Delivery city.
    pub city: String,

    /// Chosen payment method.
    pub payment: PaymentMethod,

    /// Free-form order notes, optional.
    pub notes: Option<String>,
}

/// A composed order ready for external handoff.
#[derive(Debug, Clone)]
pub struct Handoff {
    /// The plain-text order summary.
    pub message: String,

    /// The messaging link carrying the summary, URL-encoded.
    pub url: String,

    /// The totals the summary was built from.
    pub quote: Quote,
}

/// Build the multi-section order summary for a cart.
///
/// Sections are emitted in a fixed order so the output is deterministic:
/// header, customer, delivery address, numbered items, summary, payment
/// method, optional notes, footer. Lines whose product no longer resolves
/// are omitted from the item list, consistent with the pricing engine.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`]: the cart holds no lines.
/// - [`CheckoutError::Pricing`]: totals could not be computed.
pub fn order_message(
    cart: &Cart,
    catalog: &Catalog,
    policy: &ShippingPolicy,
    details: &CustomerDetails,
) -> Result<(String, Quote), CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let quote = pricing::quote(cart, catalog, policy)?;

    let mut message = String::new();

    writeln!(message, "*NEW ORDER - AQUARIX*")?;
    writeln!(message)?;

    writeln!(message, "*CUSTOMER*")?;
    writeln!(message, "Name: {}", details.name)?;
    writeln!(message, "Phone: {}", details.phone)?;
    if let Some(email) = &details.email {
        writeln!(message, "Email: {email}")?;
    }
    writeln!(message)?;

    writeln!(message, "*DELIVERY ADDRESS*")?;
    writeln!(message, "{}", details.address)?;
    writeln!(message, "City: {}", details.city)?;
    writeln!(message)?;

    writeln!(message, "*ITEMS*")?;
    let mut position = 0usize;

    for line in cart.lines() {
        let Some(product) = catalog.product(line.key.product) else {
            continue;
        };

        let variant = line
            .key
            .variant
            .as_ref()
            .and_then(|id| product.variant(id));

        let unit = pricing::unit_price(product, line.key.variant.as_ref());
        let line_total = unit
            .to_minor_units()
            .checked_mul(i64::from(line.quantity))
            .ok_or(PricingError::Overflow)?;
        let line_total = rusty_money::Money::from_minor(line_total, unit.currency());

        position += 1;

        match variant {
            Some(variant) => writeln!(message, "{position}. {} - {}", product.name, variant.size)?,
            None => writeln!(message, "{position}. {}", product.name)?,
        }
        writeln!(message, "   Quantity: {}", line.quantity)?;
        writeln!(message, "   Unit price: {unit}")?;
        writeln!(message, "   Line total: {line_total}")?;
    }
    writeln!(message)?;

    writeln!(message, "*SUMMARY*")?;
    writeln!(message, "Subtotal: {}", quote.subtotal())?;
    if quote.discount().to_minor_units() > 0 {
        if let Some(coupon) = cart.coupon() {
            writeln!(message, "Discount ({}): -{}", coupon.code, quote.discount())?;
        }
    }
    if quote.free_shipping() {
        writeln!(message, "Shipping: FREE")?;
    } else {
        writeln!(message, "Shipping: {}", quote.shipping())?;
    }
    writeln!(message, "*TOTAL: {}*", quote.total())?;
    writeln!(message)?;

    writeln!(message, "*PAYMENT METHOD*")?;
    writeln!(message, "{}", details.payment.label())?;

    if let Some(notes) = &details.notes {
        writeln!(message)?;
        writeln!(message, "*NOTES*")?;
        writeln!(message, "{notes}")?;
    }

    writeln!(message)?;
    write!(message, "Thank you for your order!")?;

    Ok((message, quote))
}

/// Build the outbound messaging link for a composed message.
pub fn handoff_url(phone_number: &str, message: &str) -> String {
    let encoded = utf8_percent_encode(message, NON_ALPHANUMERIC);

    format!("https://wa.me/{phone_number}?text={encoded}")
}
