//! Browse
//!
//! Catalog views: filter conjunction, sort orders, free-text search, and
//! pagination. All of it is linear scans over the loaded catalog, re-run on
//! every interaction; the catalog is small enough that nothing fancier pays
//! for itself.

use std::cmp::Reverse;

use rusty_money::{Money, iso::Currency};

use crate::catalog::{Catalog, Category, Product};

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Filter conjunction applied to the catalog.
///
/// Price bounds are inclusive and compare against the product's effective
/// price (first variant's price when variants exist).
#[derive(Debug, Clone)]
pub struct Filters {
    /// Restrict to one category, or browse all.
    pub category: Option<Category>,

    /// Inclusive lower price bound.
    pub price_min: Money<'static, Currency>,

    /// Inclusive upper price bound.
    pub price_max: Money<'static, Currency>,

    /// Only show products with stock remaining. On by default.
    pub in_stock_only: bool,

    /// Only show products flagged as on offer. Off by default.
    pub offers_only: bool,
}

impl Filters {
    /// The storefront defaults: all categories, Bs 0 to Bs 2000, in-stock
    /// only, offers off.
    pub fn standard(currency: &'static Currency) -> Self {
        Self {
            category: None,
            price_min: Money::from_minor(0, currency),
            price_max: Money::from_minor(200_000, currency),
            in_stock_only: true,
            offers_only: false,
        }
    }

    /// Restore the defaults, keeping the currency.
    pub fn reset(&mut self) {
        *self = Self::standard(self.price_min.currency());
    }

    /// Whether a product passes every active filter.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category {
            if product.category != category {
                return false;
            }
        }

        let price = product.effective_price().to_minor_units();
        if price < self.price_min.to_minor_units() || price > self.price_max.to_minor_units() {
            return false;
        }

        if self.in_stock_only && !product.in_stock() {
            return false;
        }

        if self.offers_only && !product.offer {
            return false;
        }

        true
    }
}

/// Sort orders offered by the catalog view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending effective price.
    PriceLow,

    /// Descending effective price.
    PriceHigh,

    /// Name A to Z, case-insensitive.
    NameAsc,

    /// Name Z to A, case-insensitive.
    NameDesc,

    /// New-flagged products first, otherwise stable.
    Newest,

    /// Descending review count. The storefront default.
    #[default]
    Popular,
}

/// Filter and sort the catalog into a browsable view.
pub fn browse<'a>(catalog: &'a Catalog, filters: &Filters, order: SortOrder) -> Vec<&'a Product> {
    let mut products: Vec<&Product> = catalog
        .iter()
        .filter(|product| filters.matches(product))
        .collect();

    sort_products(&mut products, order);

    products
}

/// Free-text search over name, description, and category label.
///
/// The term is lowercased and matched as a substring; an empty term matches
/// everything. Search results are sorted like any other view.
pub fn search<'a>(catalog: &'a Catalog, term: &str, order: SortOrder) -> Vec<&'a Product> {
    let term = term.trim().to_lowercase();

    let mut products: Vec<&Product> = catalog
        .iter()
        .filter(|product| {
            term.is_empty()
                || product.name.to_lowercase().contains(&term)
                || product.description.to_lowercase().contains(&term)
                || product.category.label().contains(&term)
        })
        .collect();

    sort_products(&mut products, order);

    products
}

/// Sort a product view in place. All sorts are stable.
pub fn sort_products(products: &mut [&Product], order: SortOrder) {
    match order {
        SortOrder::PriceLow => {
            products.sort_by_key(|product| product.effective_price().to_minor_units());
        }
        SortOrder::PriceHigh => {
            products.sort_by_key(|product| Reverse(product.effective_price().to_minor_units()));
        }
        SortOrder::NameAsc => {
            products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }
        SortOrder::NameDesc => {
            products.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()));
        }
        SortOrder::Newest => {
            products.sort_by_key(|product| !product.new);
        }
        SortOrder::Popular => {
            products.sort_by_key(|product| Reverse(product.reviews));
        }
    }
}

/// Number of pages needed for `total` items; zero when there are none.
pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }

    total.div_ceil(per_page)
}

/// Slice out one page of a view. Pages are 1-based; an out-of-range page
/// yields an empty slice.
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if page == 0 || per_page == 0 {
        return &[];
    }

    let start = (page - 1).saturating_mul(per_page);
    let end = start.saturating_add(per_page).min(items.len());

    items.get(start..end).unwrap_or(&[])
}

/// One entry in the page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageToken {
    /// A clickable page number.
    Page(usize),

    /// A collapsed range shown as an ellipsis.
    Gap,
}

/// Build the page-number strip for the pagination bar.
///
/// Up to seven pages are listed in full. Beyond that the strip collapses:
/// near the start it shows `[1 2 3 4 … last]`, near the end the mirror image,
/// and in the middle `[1 … p-1 p p+1 … last]`.
pub fn page_controls(total_pages: usize, current: usize) -> Vec<PageToken> {
    use PageToken::{Gap, Page};

    if total_pages <= 7 {
        return (1..=total_pages).map(Page).collect();
    }

    if current <= 3 {
        vec![Page(1), Page(2), Page(3), Page(4), Gap, Page(total_pages)]
    } else if current >= total_pages - 2 {
        vec![
            Page(1),
            Gap,
            Page(total_pages - 3),
            Page(total_pages - 2),
            Page(total_pages - 1),
            Page(total_pages),
        ]
    } else {
        vec![
            Page(1),
            Gap,
            Page(current - 1),
            Page(current),
            Page(current + 1),
            Gap,
            Page(total_pages),
        ]
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;

    use crate::catalog::ProductId;

    use super::*;
    use PageToken::{Gap, Page};

    fn product(id: u32, name: &str, price_minor: i64) -> Product {
        Product {
            id: ProductId(id),
            name: name.to_string(),
            description: String::new(),
            category: Category::Accessories,
            price: Money::from_minor(price_minor, iso::BOB),
            original_price: None,
            variants: Vec::new(),
            stock: 5,
            rating: 4.0,
            reviews: 0,
            new: false,
            offer: false,
            featured: false,
            images: Vec::new(),
            sku: String::new(),
            features: Vec::new(),
        }
    }

    fn test_catalog() -> Catalog {
        let mut heater = product(1, "Heater", 12_000);
        heater.category = Category::Accessories;
        heater.reviews = 40;

        let mut pellets = product(2, "Pellets", 3_500);
        pellets.category = Category::Food;
        pellets.reviews = 120;
        pellets.offer = true;

        let mut lamp = product(3, "Lamp", 45_000);
        lamp.category = Category::Lighting;
        lamp.new = true;

        let mut net = product(4, "Net", 1_500);
        net.category = Category::Accessories;
        net.stock = 0;

        Catalog::new(vec![heater, pellets, lamp, net])
    }

    fn ids(products: &[&Product]) -> Vec<u32> {
        products.iter().map(|product| product.id.0).collect()
    }

    #[test]
    fn default_filters_hide_out_of_stock() {
        let catalog = test_catalog();
        let view = browse(&catalog, &Filters::standard(iso::BOB), SortOrder::Popular);

        assert!(
            !ids(&view).contains(&4),
            "out-of-stock product should be filtered"
        );
    }

    #[test]
    fn category_filter_is_an_equality_test() {
        let catalog = test_catalog();

        let mut filters = Filters::standard(iso::BOB);
        filters.category = Some(Category::Food);

        let view = browse(&catalog, &filters, SortOrder::Popular);

        assert_eq!(ids(&view), vec![2]);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let catalog = test_catalog();

        let mut filters = Filters::standard(iso::BOB);
        filters.in_stock_only = false;
        filters.price_min = Money::from_minor(3_500, iso::BOB);
        filters.price_max = Money::from_minor(12_000, iso::BOB);

        let view = browse(&catalog, &filters, SortOrder::PriceLow);

        assert_eq!(ids(&view), vec![2, 1]);
    }

    #[test]
    fn offers_filter_keeps_only_offer_flagged() {
        let catalog = test_catalog();

        let mut filters = Filters::standard(iso::BOB);
        filters.offers_only = true;

        let view = browse(&catalog, &filters, SortOrder::Popular);

        assert_eq!(ids(&view), vec![2]);
    }

    #[test]
    fn sort_by_price_descending() {
        let catalog = test_catalog();
        let view = browse(&catalog, &Filters::standard(iso::BOB), SortOrder::PriceHigh);

        assert_eq!(ids(&view), vec![3, 1, 2]);
    }

    #[test]
    fn sort_by_name_is_case_insensitive() {
        let catalog = Catalog::new(vec![
            product(1, "zebra stone", 100),
            product(2, "Amazon sword", 100),
        ]);

        let view = browse(&catalog, &Filters::standard(iso::BOB), SortOrder::NameAsc);

        assert_eq!(ids(&view), vec![2, 1]);
    }

    #[test]
    fn newest_puts_new_flagged_first_and_is_stable() {
        let catalog = test_catalog();
        let view = browse(&catalog, &Filters::standard(iso::BOB), SortOrder::Newest);

        assert_eq!(ids(&view), vec![3, 1, 2], "lamp is new; rest keep order");
    }

    #[test]
    fn popular_sorts_by_review_count_descending() {
        let catalog = test_catalog();
        let view = browse(&catalog, &Filters::standard(iso::BOB), SortOrder::Popular);

        assert_eq!(ids(&view), vec![2, 1, 3]);
    }

    #[test]
    fn search_matches_name_description_and_category() {
        let catalog = test_catalog();

        assert_eq!(ids(&search(&catalog, "LAMP", SortOrder::Popular)), vec![3]);
        assert_eq!(
            ids(&search(&catalog, "food", SortOrder::Popular)),
            vec![2],
            "category label should match"
        );
        assert!(search(&catalog, "plecostomus", SortOrder::Popular).is_empty());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut filters = Filters::standard(iso::BOB);
        filters.offers_only = true;
        filters.category = Some(Category::Plants);

        filters.reset();

        assert!(!filters.offers_only);
        assert!(filters.category.is_none());
        assert!(filters.in_stock_only);
    }

    #[test]
    fn page_slice_is_one_based_and_clamped() {
        let items: Vec<u32> = (1..=10).collect();

        assert_eq!(page_slice(&items, 1, 4), &[1, 2, 3, 4]);
        assert_eq!(page_slice(&items, 3, 4), &[9, 10]);
        assert!(page_slice(&items, 4, 4).is_empty());
        assert!(page_slice(&items, 0, 4).is_empty());
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 12), 0);
        assert_eq!(page_count(12, 12), 1);
        assert_eq!(page_count(13, 12), 2);
    }

    #[test]
    fn short_strips_list_every_page() {
        assert_eq!(
            page_controls(3, 2),
            vec![Page(1), Page(2), Page(3)],
            "up to seven pages are listed in full"
        );
    }

    #[test]
    fn strip_near_the_start_collapses_the_tail() {
        assert_eq!(
            page_controls(10, 2),
            vec![Page(1), Page(2), Page(3), Page(4), Gap, Page(10)]
        );
    }

    #[test]
    fn strip_near_the_end_collapses_the_head() {
        assert_eq!(
            page_controls(10, 9),
            vec![Page(1), Gap, Page(7), Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn strip_in_the_middle_collapses_both_sides() {
        assert_eq!(
            page_controls(10, 5),
            vec![Page(1), Gap, Page(4), Page(5), Page(6), Gap, Page(10)]
        );
    }
}
