//! Catalog

use std::fmt;

use rusty_money::{
    Money,
    iso::{self, Currency},
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Identifier of a product, as assigned by the catalog document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a priced variant within a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(pub String);

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VariantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The fixed set of product categories carried by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Tanks and full aquarium kits.
    Aquariums,

    /// Internal and external filtration.
    Filters,

    /// Lamps and LED systems.
    Lighting,

    /// Ornaments, substrate and backdrops.
    Decoration,

    /// Live and artificial plants.
    Plants,

    /// Fish food and supplements.
    Food,

    /// Nets, pumps, heaters and other gear.
    Accessories,

    /// Water treatment and cleaning supplies.
    Maintenance,
}

impl Category {
    /// All categories, in the order the storefront lists them.
    pub const ALL: [Category; 8] = [
        Category::Aquariums,
        Category::Filters,
        Category::Lighting,
        Category::Decoration,
        Category::Plants,
        Category::Food,
        Category::Accessories,
        Category::Maintenance,
    ];

    /// Lowercase label used by the catalog document and search matching.
    pub fn label(self) -> &'static str {
        match self {
            Category::Aquariums => "aquariums",
            Category::Filters => "filters",
            Category::Lighting => "lighting",
            Category::Decoration => "decoration",
            Category::Plants => "plants",
            Category::Food => "food",
            Category::Accessories => "accessories",
            Category::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A priced sub-option of a product (e.g. a different package size).
#[derive(Debug, Clone)]
pub struct Variant {
    /// Variant identifier, unique within its product.
    pub id: VariantId,

    /// Size label shown next to the price (e.g. "500 g").
    pub size: String,

    /// Variant price.
    pub price: Money<'static, Currency>,

    /// Pre-discount price, when the variant is on offer.
    pub original_price: Option<Money<'static, Currency>>,

    /// Short description (e.g. price per unit).
    pub description: Option<String>,

    /// Savings label shown on the variant picker.
    pub savings: Option<String>,
}

/// Stock availability bucket, as presented by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    /// More than ten units available.
    InStock,

    /// Ten or fewer units left.
    Low(u32),

    /// Sold out.
    Out,
}

/// A catalog product. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Short description.
    pub description: String,

    /// Category the product is filed under.
    pub category: Category,

    /// Base price, used when no variant is selected.
    pub price: Money<'static, Currency>,

    /// Pre-discount base price, when on offer.
    pub original_price: Option<Money<'static, Currency>>,

    /// Priced variants; may be empty.
    pub variants: Vec<Variant>,

    /// Units in stock.
    pub stock: u32,

    /// Average review rating out of five.
    pub rating: f32,

    /// Number of reviews.
    pub reviews: u32,

    /// Recently added flag.
    pub new: bool,

    /// On-offer flag.
    pub offer: bool,

    /// Featured on the home page.
    pub featured: bool,

    /// Image paths, first entry is the primary image.
    pub images: Vec<String>,

    /// Stock keeping unit code.
    pub sku: String,

    /// Bullet-point feature list.
    pub features: Vec<String>,
}

impl Product {
    /// Price used for filtering and sorting: the first variant's price when
    /// variants exist, else the base price.
    pub fn effective_price(&self) -> Money<'static, Currency> {
        self.variants.first().map_or(self.price, |variant| variant.price)
    }

    /// Look up a variant by id.
    pub fn variant(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|variant| &variant.id == id)
    }

    /// Whether at least one unit is in stock.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Availability bucket for display.
    pub fn stock_level(&self) -> StockLevel {
        match self.stock {
            0 => StockLevel::Out,
            n if n > 10 => StockLevel::InStock,
            n => StockLevel::Low(n),
        }
    }
}

/// Read-only product catalog, loaded once at session start.
#[derive(Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
    by_id: FxHashMap<ProductId, usize>,
    currency: Option<&'static Currency>,
}

impl Catalog {
    /// Build a catalog from an ordered product list.
    ///
    /// When the list carries a duplicate id, lookups resolve to the first
    /// occurrence, matching linear-scan semantics of the source document.
    pub fn new(products: Vec<Product>) -> Self {
        let mut by_id = FxHashMap::default();

        for (index, product) in products.iter().enumerate() {
            by_id.entry(product.id).or_insert(index);
        }

        let currency = products.first().map(|product| product.price.currency());

        Self {
            products,
            by_id,
            currency,
        }
    }

    /// Look up a product by id.
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.by_id.get(&id).and_then(|index| self.products.get(*index))
    }

    /// All products, in document order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Iterate over products in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Currency shared by every product, `BOB` for an empty catalog.
    pub fn currency(&self) -> &'static Currency {
        self.currency.unwrap_or(iso::BOB)
    }

    /// Per-category product counts, in [`Category::ALL`] order.
    pub fn category_counts(&self) -> [(Category, usize); 8] {
        Category::ALL.map(|category| {
            let count = self
                .products
                .iter()
                .filter(|product| product.category == category)
                .count();

            (category, count)
        })
    }

    /// Products flagged for the home page.
    pub fn featured(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|product| product.featured)
    }

    /// Products currently on offer.
    pub fn offers(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|product| product.offer)
    }
}
