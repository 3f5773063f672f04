//! Aquarix
//!
//! Aquarix is the domain engine of an aquarium-supplies storefront: catalog
//! browsing with filters, sorting and pagination, a persisted shopping cart,
//! a coupon registry, a pure pricing engine, and an order formatter that
//! hands completed orders off to an external messaging link.

pub mod browse;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod coupons;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod session;
pub mod store;
