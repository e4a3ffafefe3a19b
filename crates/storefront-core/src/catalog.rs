//! # Catalog Filtering
//!
//! Pure derivation of the catalog display list from the fetched products and
//! the current filter/sort parameters.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     derive(products, params)                            │
//! │                                                                         │
//! │  products ──► 1. search    (name | short | full description, no case)  │
//! │           ──► 2. category  (exact match unless "all")                  │
//! │           ──► 3. price     ("min-max" inclusive unless "all";          │
//! │                             malformed → no filtering + warning)        │
//! │           ──► 4. sort      (price-asc | price-desc | name | popular)   │
//! │           ──► CatalogView { products, warnings }                       │
//! │                                                                         │
//! │  Stages 1-3 are independent predicates, so their order never changes   │
//! │  the resulting set. Nothing is cached: call derive() whenever any      │
//! │  input changes.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::Product;
use crate::validation::ValidationResult;

/// Filter value meaning "no filtering" for category and price range.
pub const ALL: &str = "all";

// =============================================================================
// Sort Order
// =============================================================================

/// Catalog sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum SortOrder {
    PriceAsc,
    PriceDesc,
    #[default]
    Name,
    /// Same ordering as `PriceDesc` until a popularity signal exists.
    Popular,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Name,
        SortOrder::PriceAsc,
        SortOrder::PriceDesc,
        SortOrder::Popular,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price-asc",
            SortOrder::PriceDesc => "price-desc",
            SortOrder::Name => "name",
            SortOrder::Popular => "popular",
        }
    }

    /// Caption shown in the sort selector.
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "По цене (возрастание)",
            SortOrder::PriceDesc => "По цене (убывание)",
            SortOrder::Name => "По названию",
            SortOrder::Popular => "По популярности",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "sort".to_string(),
                allowed: SortOrder::ALL.iter().map(|o| o.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Price Range
// =============================================================================

/// Parsed price range filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceRange {
    All,
    /// Inclusive bounds.
    Between { min: i64, max: i64 },
}

impl PriceRange {
    /// Parses `"all"` or `"<min>-<max>"`.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::catalog::PriceRange;
    ///
    /// assert_eq!(PriceRange::parse("all"), Ok(PriceRange::All));
    /// assert_eq!(
    ///     PriceRange::parse("500-5000"),
    ///     Ok(PriceRange::Between { min: 500, max: 5000 })
    /// );
    /// assert!(PriceRange::parse("abc").is_err());
    /// ```
    pub fn parse(raw: &str) -> ValidationResult<Self> {
        let raw = raw.trim();
        if raw == ALL {
            return Ok(PriceRange::All);
        }

        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "price range".to_string(),
            reason: format!("{reason} (got '{raw}')"),
        };

        let (min, max) = raw
            .split_once('-')
            .ok_or_else(|| invalid("expected <min>-<max>"))?;
        let min: i64 = min
            .trim()
            .parse()
            .map_err(|_| invalid("minimum is not a whole number"))?;
        let max: i64 = max
            .trim()
            .parse()
            .map_err(|_| invalid("maximum is not a whole number"))?;

        if min > max {
            return Err(invalid("minimum is greater than maximum"));
        }

        Ok(PriceRange::Between { min, max })
    }

    pub fn contains(&self, price: i64) -> bool {
        match self {
            PriceRange::All => true,
            PriceRange::Between { min, max } => *min <= price && price <= *max,
        }
    }
}

/// A selectable price range option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRangePreset {
    pub value: &'static str,
    pub label: &'static str,
}

/// Price range options offered by the catalog filter.
pub const PRICE_RANGE_PRESETS: [PriceRangePreset; 5] = [
    PriceRangePreset {
        value: ALL,
        label: "Все цены",
    },
    PriceRangePreset {
        value: "500-5000",
        label: "500₽ - 5 000₽",
    },
    PriceRangePreset {
        value: "5000-15000",
        label: "5 000₽ - 15 000₽",
    },
    PriceRangePreset {
        value: "15000-20000",
        label: "15 000₽ - 20 000₽",
    },
    PriceRangePreset {
        value: "20000-50000",
        label: "20 000₽ - 50 000₽",
    },
];

// =============================================================================
// Filter Parameters & View
// =============================================================================

/// Catalog filter and sort inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FilterParams {
    pub search_term: String,
    /// Category label or `"all"`.
    pub category: String,
    /// `"all"` or `"<min>-<max>"`.
    pub price_range: String,
    pub sort_by: SortOrder,
}

impl Default for FilterParams {
    fn default() -> Self {
        FilterParams {
            search_term: String::new(),
            category: ALL.to_string(),
            price_range: ALL.to_string(),
            sort_by: SortOrder::default(),
        }
    }
}

/// Result of a derivation: the ordered products plus any input warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogView {
    pub products: Vec<Product>,
    /// Non-fatal problems with the filter inputs (e.g. a malformed price
    /// range that was ignored).
    pub warnings: Vec<ValidationError>,
}

// =============================================================================
// Derivation
// =============================================================================

/// Derives the display list for `params`.
pub fn derive(products: &[Product], params: &FilterParams) -> CatalogView {
    let mut warnings = Vec::new();

    let range = match PriceRange::parse(&params.price_range) {
        Ok(range) => range,
        Err(err) => {
            tracing::warn!(price_range = %params.price_range, error = %err, "Ignoring malformed price range");
            warnings.push(err);
            PriceRange::All
        }
    };

    let search = params.search_term.to_lowercase();

    let mut filtered: Vec<Product> = products
        .iter()
        .filter(|p| matches_search(p, &search))
        .filter(|p| matches_category(p, &params.category))
        .filter(|p| range.contains(p.price))
        .cloned()
        .collect();

    sort_products(&mut filtered, params.sort_by);

    CatalogView {
        products: filtered,
        warnings,
    }
}

/// Case-insensitive substring match on name or either description.
///
/// An empty term matches everything.
pub fn matches_search(product: &Product, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }

    let term = term.to_lowercase();
    [
        &product.name,
        &product.short_description,
        &product.full_description,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&term))
}

/// Exact category match; `"all"` matches everything.
pub fn matches_category(product: &Product, category: &str) -> bool {
    category == ALL || product.category == category
}

/// Sorts in place. Stable, so equal keys keep their original order.
pub fn sort_products(products: &mut [Product], order: SortOrder) {
    match order {
        SortOrder::PriceAsc => products.sort_by_key(|p| p.price),
        SortOrder::PriceDesc | SortOrder::Popular => {
            products.sort_by(|a, b| b.price.cmp(&a.price))
        }
        SortOrder::Name => products.sort_by(|a, b| compare_names(&a.name, &b.name)),
    }
}

/// Distinct categories of the full, unfiltered collection.
///
/// Ordered by code point, so Latin labels come before Cyrillic ones and
/// uppercase before lowercase. Unlike product names this is not a
/// locale-aware order.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Locale-aware name comparison for Cyrillic and Latin titles.
///
/// Base letters decide first, with Cyrillic ahead of Latin (Russian collation
/// order) and `ё` collating with `е`. Remaining ties put `е` before `ё`, then
/// lowercase before uppercase.
fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| yo_key(a).cmp(yo_key(b)))
        .then_with(|| case_key(a).cmp(case_key(b)))
}

fn collation_key(s: &str) -> Vec<(u8, char)> {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ё' { 'е' } else { c })
        .map(|c| (script_rank(c), c))
        .collect()
}

fn yo_key(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.chars().flat_map(char::to_lowercase).map(|c| c == 'ё')
}

fn case_key(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.chars().map(char::is_uppercase)
}

fn script_rank(c: char) -> u8 {
    match c {
        c if c.is_ascii_digit() => 1,
        '\u{0400}'..='\u{04FF}' => 2,
        c if c.is_alphabetic() => 3,
        _ => 0,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
