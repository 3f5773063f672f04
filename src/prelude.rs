//! Aquarix prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    browse::{DEFAULT_PAGE_SIZE, Filters, PageToken, SortOrder, browse, page_controls, search},
    cart::{Cart, CartLine, LineKey},
    catalog::{Catalog, Category, Product, ProductId, StockLevel, Variant, VariantId},
    checkout::{CheckoutError, CustomerDetails, Handoff, PaymentMethod},
    coupons::{Coupon, CouponBook, CouponError, Discount},
    fixtures::{FixtureError, load_catalog},
    pricing::{PricingError, Quote, ShippingPolicy, quote},
    session::{SessionError, Storefront},
    store::{CartStore, StoreError},
};
