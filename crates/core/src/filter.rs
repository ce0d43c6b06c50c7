//! Product filtering and sorting for catalog listings.
//!
//! [`apply`] derives a listing from a raw product list and the shopper's
//! current selections:
//!
//! 1. Products without a resolvable price are dropped and reported in
//!    [`FilterOutcome::excluded`]. A price string that carries no parseable
//!    amount counts as "no price"; the same rule holds for filtering and
//!    sorting, so the sort stage only ever sees parsed prices.
//! 2. The lowest bound of a ranged price (`"$10 - $20"` → 10) is used.
//! 3. Products outside the active price range are dropped.
//! 4. When any category is checked, products must be in at least one of them.
//! 5. Same OR-membership rule for sizes and colors.
//! 6. The survivors are sorted (stable) by the selected [`SortKey`].
//!
//! The output is always derivable from the current products and selections;
//! nothing here holds state between calls.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Product, ProductId, parse_lowest_price};

/// Errors building a filter state from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The lower bound of a price range exceeds the upper bound.
    #[error("invalid price range: min {min} is greater than max {max}")]
    InvertedRange { min: Decimal, max: Decimal },
    /// A price bound is not a number.
    #[error("invalid price bound {0:?}")]
    InvalidBound(String),
    /// Unknown sort key.
    #[error("unknown sort key {0:?}")]
    UnknownSort(String),
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Backend order (insertion order).
    #[default]
    #[serde(alias = "default")]
    Popular,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Highest product id first.
    Newest,
}

impl SortKey {
    /// Query-string value for this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Newest => "newest",
        }
    }

    /// All keys, in the order they are offered to shoppers.
    pub const ALL: [Self; 4] = [Self::Popular, Self::PriceLow, Self::PriceHigh, Self::Newest];
}

impl FromStr for SortKey {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "popular" | "default" => Ok(Self::Popular),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "newest" => Ok(Self::Newest),
            other => Err(FilterError::UnknownSort(other.to_string())),
        }
    }
}

/// Inclusive price interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    min: Decimal,
    max: Decimal,
}

impl PriceRange {
    /// Create a range.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvertedRange` if `min > max`.
    pub fn new(min: Decimal, max: Decimal) -> Result<Self, FilterError> {
        if min > max {
            return Err(FilterError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> Decimal {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> Decimal {
        self.max
    }

    /// Whether `price` lies within the range (inclusive at both ends).
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.min <= price && price <= self.max
    }
}

/// The shopper's current listing selections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    /// Sort order.
    pub sort: SortKey,
    /// Selected sizes.
    pub sizes: BTreeSet<String>,
    /// Selected colors.
    pub colors: BTreeSet<String>,
    /// Active price range; `None` means no price filtering.
    pub price_range: Option<PriceRange>,
    /// Category slug → checked flag.
    pub categories: BTreeMap<String, bool>,
}

impl FilterState {
    /// Slugs of the checked categories.
    pub fn checked_categories(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .filter(|(_, checked)| **checked)
            .map(|(slug, _)| slug.as_str())
    }

    /// Whether any selection narrows the listing.
    #[must_use]
    pub fn is_narrowing(&self) -> bool {
        self.price_range.is_some()
            || !self.sizes.is_empty()
            || !self.colors.is_empty()
            || self.checked_categories().next().is_some()
    }

    /// Build a filter state from decoded query-string pairs.
    ///
    /// Recognised keys: `sort`, `min_price`, `max_price`, and the repeatable
    /// `category`, `size` and `color` (each also accepting comma separated
    /// values). Unknown keys are ignored. When only one price bound is given
    /// the other is open.
    ///
    /// # Errors
    ///
    /// Returns `FilterError` for an unknown sort key, a non-numeric price
    /// bound, or an inverted price range.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut state = Self::default();
        let mut min = None;
        let mut max = None;

        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "sort" => state.sort = value.parse()?,
                "min_price" => min = parse_bound(value)?,
                "max_price" => max = parse_bound(value)?,
                "category" => {
                    for slug in split_values(value) {
                        state.categories.insert(slug, true);
                    }
                }
                "size" => state.sizes.extend(split_values(value)),
                "color" => state.colors.extend(split_values(value)),
                _ => {}
            }
        }

        state.price_range = match (min, max) {
            (None, None) => None,
            (min, max) => Some(PriceRange::new(
                min.unwrap_or(Decimal::ZERO),
                max.unwrap_or(Decimal::MAX),
            )?),
        };

        Ok(state)
    }
}

fn parse_bound(value: &str) -> Result<Option<Decimal>, FilterError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<Decimal>()
        .map(Some)
        .map_err(|_| FilterError::InvalidBound(value.to_string()))
}

fn split_values(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// A product that passed the filter, with its parsed price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    /// The product.
    #[serde(flatten)]
    pub product: Product,
    /// Lowest parsed price.
    pub parsed_price: Decimal,
}

/// Why a product was left out of every listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Exclusion {
    /// `price`, `regular_price` and `sale_price` are all empty or absent.
    MissingPrice { id: ProductId },
    /// A price field is present but carries no parseable amount.
    UnparseablePrice { id: ProductId, raw: String },
}

/// Result of running the filter pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterOutcome {
    /// Filtered and sorted listing.
    pub products: Vec<Listing>,
    /// Products dropped for lack of a usable price.
    pub excluded: Vec<Exclusion>,
}

/// Run the filter pipeline over `products`.
#[must_use]
pub fn apply(products: &[Product], state: &FilterState) -> FilterOutcome {
    let (priced, excluded) = resolve_prices(products);

    let checked: Vec<&str> = state.checked_categories().collect();
    let mut listing: Vec<Listing> = priced
        .into_iter()
        .filter(|l| {
            state
                .price_range
                .is_none_or(|range| range.contains(l.parsed_price))
        })
        .filter(|l| checked.is_empty() || checked.iter().any(|slug| l.product.in_category(slug)))
        .filter(|l| matches_any(&l.product.sizes, &state.sizes))
        .filter(|l| matches_any(&l.product.colors, &state.colors))
        .collect();

    sort(&mut listing, state.sort);

    FilterOutcome {
        products: listing,
        excluded,
    }
}

/// Split products into priced listings and exclusions, preserving order.
fn resolve_prices(products: &[Product]) -> (Vec<Listing>, Vec<Exclusion>) {
    let mut priced = Vec::with_capacity(products.len());
    let mut excluded = Vec::new();

    for product in products {
        match product.resolvable_price() {
            None => excluded.push(Exclusion::MissingPrice { id: product.id }),
            Some(raw) => match parse_lowest_price(raw) {
                Ok(parsed_price) => priced.push(Listing {
                    product: product.clone(),
                    parsed_price,
                }),
                Err(_) => excluded.push(Exclusion::UnparseablePrice {
                    id: product.id,
                    raw: raw.to_string(),
                }),
            },
        }
    }

    (priced, excluded)
}

/// OR-membership: an empty selection matches everything.
fn matches_any(values: &[String], selected: &BTreeSet<String>) -> bool {
    selected.is_empty()
        || values
            .iter()
            .any(|v| selected.iter().any(|s| s.eq_ignore_ascii_case(v)))
}

/// Stable sort of a listing.
pub fn sort(listing: &mut [Listing], key: SortKey) {
    match key {
        SortKey::Popular => {}
        SortKey::PriceLow => listing.sort_by(|a, b| a.parsed_price.cmp(&b.parsed_price)),
        SortKey::PriceHigh => listing.sort_by(|a, b| b.parsed_price.cmp(&a.parsed_price)),
        SortKey::Newest => listing.sort_by(|a, b| b.product.id.cmp(&a.product.id)),
    }
}

/// One selectable facet value with the number of matching products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    /// Filter value (category slug, size or color).
    pub value: String,
    /// Display label.
    pub label: String,
    /// Number of price-valid products carrying the value.
    pub count: usize,
}

/// Available facet values for a product list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Facets {
    pub categories: Vec<FacetCount>,
    pub sizes: Vec<FacetCount>,
    pub colors: Vec<FacetCount>,
    /// Lowest and highest parsed price, for range controls.
    pub price_bounds: Option<PriceRange>,
}

/// Compute facets over the price-valid products in `products`.
#[must_use]
pub fn facets(products: &[Product]) -> Facets {
    let (priced, _) = resolve_prices(products);

    let mut categories: BTreeMap<String, (String, usize)> = BTreeMap::new();
    let mut sizes: BTreeMap<String, (String, usize)> = BTreeMap::new();
    let mut colors: BTreeMap<String, (String, usize)> = BTreeMap::new();

    for listing in &priced {
        for category in &listing.product.categories {
            categories
                .entry(category.slug.clone())
                .or_insert_with(|| (category.name.clone(), 0))
                .1 += 1;
        }
        count_values(&mut sizes, &listing.product.sizes);
        count_values(&mut colors, &listing.product.colors);
    }

    Facets {
        categories: into_counts(categories),
        sizes: into_counts(sizes),
        colors: into_counts(colors),
        price_bounds: price_bounds(&priced),
    }
}

fn count_values(counts: &mut BTreeMap<String, (String, usize)>, values: &[String]) {
    for value in values {
        counts
            .entry(value.to_lowercase())
            .or_insert_with(|| (value.clone(), 0))
            .1 += 1;
    }
}

fn into_counts(counts: BTreeMap<String, (String, usize)>) -> Vec<FacetCount> {
    counts
        .into_iter()
        .map(|(value, (label, count))| FacetCount {
            value,
            label,
            count,
        })
        .collect()
}

fn price_bounds(listing: &[Listing]) -> Option<PriceRange> {
    let min = listing.iter().map(|l| l.parsed_price).min()?;
    let max = listing.iter().map(|l| l.parsed_price).max()?;
    PriceRange::new(min, max).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::product::fixtures::{category, product};
    use rust_decimal::dec;

    fn ids(outcome: &FilterOutcome) -> Vec<i64> {
        outcome
            .products
            .iter()
            .map(|l| l.product.id.as_i64())
            .collect()
    }

    fn catalog() -> Vec<Product> {
        let mut shirt = product(1, Some("$25.00"));
        shirt.categories.push(category("shirts"));
        shirt.sizes = vec!["S".to_string(), "M".to_string()];
        shirt.colors = vec!["Red".to_string()];

        let mut hat = product(2, Some("$10.00 - $20.00"));
        hat.categories.push(category("hats"));
        hat.sizes = vec!["One Size".to_string()];
        hat.colors = vec!["Blue".to_string()];

        let mut hoodie = product(3, Some("$60.00"));
        hoodie.categories.push(category("shirts"));
        hoodie.categories.push(category("winter"));
        hoodie.sizes = vec!["L".to_string()];
        hoodie.colors = vec!["red".to_string(), "Black".to_string()];

        let mut socks = product(4, None);
        socks.regular_price = Some("$5.00".to_string());
        socks.categories.push(category("accessories"));

        let unpriced = product(5, None);
        let call_for_price = product(6, Some("Call us"));

        vec![shirt, hat, hoodie, socks, unpriced, call_for_price]
    }

    #[test]
    fn empty_selection_keeps_priced_products_in_order() {
        let outcome = apply(&catalog(), &FilterState::default());
        assert_eq!(ids(&outcome), vec![1, 2, 3, 4]);
    }

    #[test]
    fn products_without_any_price_are_excluded() {
        let outcome = apply(&catalog(), &FilterState::default());
        assert!(
            outcome
                .excluded
                .contains(&Exclusion::MissingPrice { id: ProductId::new(5) })
        );
        assert!(!ids(&outcome).contains(&5));
    }

    #[test]
    fn unparseable_price_is_excluded_from_listing_and_sorting() {
        for sort in SortKey::ALL {
            let state = FilterState {
                sort,
                ..FilterState::default()
            };
            let outcome = apply(&catalog(), &state);
            assert!(!ids(&outcome).contains(&6), "sort {sort:?} kept product 6");
        }
        let outcome = apply(&catalog(), &FilterState::default());
        assert!(outcome.excluded.contains(&Exclusion::UnparseablePrice {
            id: ProductId::new(6),
            raw: "Call us".to_string()
        }));
    }

    #[test]
    fn ranged_price_uses_lower_bound() {
        let outcome = apply(&catalog(), &FilterState::default());
        let hat = outcome
            .products
            .iter()
            .find(|l| l.product.id.as_i64() == 2)
            .unwrap();
        assert_eq!(hat.parsed_price, dec!(10));
    }

    #[test]
    fn price_range_is_inclusive() {
        let state = FilterState {
            price_range: Some(PriceRange::new(dec!(10), dec!(25)).unwrap()),
            ..FilterState::default()
        };
        let outcome = apply(&catalog(), &state);
        assert_eq!(ids(&outcome), vec![1, 2]);
        for listing in &outcome.products {
            assert!(listing.parsed_price >= dec!(10) && listing.parsed_price <= dec!(25));
        }
    }

    #[test]
    fn categories_use_or_semantics() {
        let mut state = FilterState::default();
        state.categories.insert("hats".to_string(), true);
        state.categories.insert("winter".to_string(), true);
        state.categories.insert("shirts".to_string(), false);
        let outcome = apply(&catalog(), &state);
        assert_eq!(ids(&outcome), vec![2, 3]);
    }

    #[test]
    fn unchecked_categories_do_not_filter() {
        let mut state = FilterState::default();
        state.categories.insert("hats".to_string(), false);
        let outcome = apply(&catalog(), &state);
        assert_eq!(ids(&outcome), vec![1, 2, 3, 4]);
    }

    #[test]
    fn sizes_and_colors_use_or_semantics_case_insensitively() {
        let mut state = FilterState::default();
        state.colors.insert("RED".to_string());
        let outcome = apply(&catalog(), &state);
        assert_eq!(ids(&outcome), vec![1, 3]);

        state.sizes.insert("l".to_string());
        state.sizes.insert("one size".to_string());
        let outcome = apply(&catalog(), &state);
        assert_eq!(ids(&outcome), vec![3]);
    }

    #[test]
    fn sort_price_low_is_non_decreasing() {
        let state = FilterState {
            sort: SortKey::PriceLow,
            ..FilterState::default()
        };
        let outcome = apply(&catalog(), &state);
        assert_eq!(ids(&outcome), vec![4, 2, 1, 3]);
        assert!(
            outcome
                .products
                .windows(2)
                .all(|w| w[0].parsed_price <= w[1].parsed_price)
        );
    }

    #[test]
    fn sort_price_high_is_non_increasing() {
        let state = FilterState {
            sort: SortKey::PriceHigh,
            ..FilterState::default()
        };
        let outcome = apply(&catalog(), &state);
        assert_eq!(ids(&outcome), vec![3, 1, 2, 4]);
    }

    #[test]
    fn sort_newest_orders_by_descending_id() {
        let state = FilterState {
            sort: SortKey::Newest,
            ..FilterState::default()
        };
        let outcome = apply(&catalog(), &state);
        assert_eq!(ids(&outcome), vec![4, 3, 2, 1]);
    }

    #[test]
    fn price_sort_is_stable_for_equal_prices() {
        let products = vec![
            product(10, Some("$5")),
            product(11, Some("$5.00")),
            product(12, Some("$1")),
        ];
        let state = FilterState {
            sort: SortKey::PriceLow,
            ..FilterState::default()
        };
        assert_eq!(ids(&apply(&products, &state)), vec![12, 10, 11]);
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(
            PriceRange::new(dec!(5), dec!(1)),
            Err(FilterError::InvertedRange {
                min: dec!(5),
                max: dec!(1)
            })
        );
    }

    #[test]
    fn from_pairs_reads_query_selections() {
        let state = FilterState::from_pairs([
            ("sort", "price-high"),
            ("min_price", "10"),
            ("category", "shirts,hats"),
            ("size", "M"),
            ("size", "L"),
            ("color", "red"),
            ("utm_source", "newsletter"),
        ])
        .unwrap();

        assert_eq!(state.sort, SortKey::PriceHigh);
        assert_eq!(state.price_range.unwrap().min(), dec!(10));
        assert_eq!(state.price_range.unwrap().max(), Decimal::MAX);
        assert_eq!(
            state.checked_categories().collect::<Vec<_>>(),
            vec!["hats", "shirts"]
        );
        assert_eq!(state.sizes.len(), 2);
        assert!(state.colors.contains("red"));
        assert!(state.is_narrowing());
    }

    #[test]
    fn from_pairs_rejects_bad_input() {
        assert!(matches!(
            FilterState::from_pairs([("sort", "cheapest")]),
            Err(FilterError::UnknownSort(_))
        ));
        assert!(matches!(
            FilterState::from_pairs([("min_price", "ten")]),
            Err(FilterError::InvalidBound(_))
        ));
        assert!(matches!(
            FilterState::from_pairs([("min_price", "50"), ("max_price", "10")]),
            Err(FilterError::InvertedRange { .. })
        ));
    }

    #[test]
    fn empty_pairs_give_default_state() {
        let state = FilterState::from_pairs(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(state, FilterState::default());
        assert!(!state.is_narrowing());
    }

    #[test]
    fn facets_count_price_valid_products() {
        let facets = facets(&catalog());
        let shirts = facets
            .categories
            .iter()
            .find(|f| f.value == "shirts")
            .unwrap();
        assert_eq!(shirts.count, 2);

        let red = facets.colors.iter().find(|f| f.value == "red").unwrap();
        assert_eq!(red.count, 2);

        let bounds = facets.price_bounds.unwrap();
        assert_eq!(bounds.min(), dec!(5));
        assert_eq!(bounds.max(), dec!(60));
    }

    #[test]
    fn sort_key_round_trips_through_query_value() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
        assert_eq!("default".parse::<SortKey>().unwrap(), SortKey::Popular);
    }
}
