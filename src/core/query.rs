//! Query parameters and the listing query engine
//!
//! [`compute_view`] turns a snapshot of listings plus a set of
//! [`QueryParams`] into one page of results. It is a pure function: it
//! never mutates its input, performs no I/O, and returns identical output
//! for identical input, so it is cheap enough to call on every keystroke.
//!
//! Stages run in a fixed order, each narrowing the previous result:
//!
//! 1. text search on `name` (case-insensitive substring)
//! 2. category (case-insensitive equality)
//! 3. price bracket
//! 4. sort (stable)
//! 5. pagination

use crate::core::error::QueryError;
use crate::core::listing::Listing;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Upper bound (inclusive) of the `low` price bracket
pub const LOW_PRICE_CEILING: f64 = 1000.0;

/// Items per page when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Query parameters owned by the browse view
///
/// Deserializes from camelCase keys, so it can be built straight from a URL
/// query string or a JSON payload. Every field has a default.
///
/// # Example
/// ```rust,ignore
/// // ?searchText=bud&category=pets&priceBracket=free&sortOrder=priceAscending&page=2
/// let params: QueryParams = serde_json::from_value(json!({
///     "searchText": "bud",
///     "priceBracket": "free",
/// }))?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryParams {
    /// Case-insensitive substring matched against `name`; empty matches all
    pub search_text: String,

    pub category: CategoryFilter,

    pub price_bracket: PriceBracket,

    pub sort_order: SortOrder,

    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            category: CategoryFilter::All,
            price_bracket: PriceBracket::Any,
            sort_order: SortOrder::Newest,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryParams {
    /// Default parameters with the given page size
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }
}

// =============================================================================
// Parameter enums
// =============================================================================

/// Category filter, either "no filter" or a single category name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Parse a user-facing value; `""` and `"all"` mean no filter
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value.to_string())
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => listing.in_category(category),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().map(Self::parse).unwrap_or_default())
    }
}

/// Coarse price range filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PriceBracket {
    #[default]
    Any,
    /// Price exactly 0 (free adoption)
    Free,
    /// 0 < price <= [`LOW_PRICE_CEILING`]
    Low,
    /// price > [`LOW_PRICE_CEILING`]
    High,
}

impl PriceBracket {
    /// A missing price counts as 0, i.e. free
    pub fn matches(&self, listing: &Listing) -> bool {
        let price = listing.effective_price();
        match self {
            PriceBracket::Any => true,
            PriceBracket::Free => price == 0.0,
            PriceBracket::Low => price > 0.0 && price <= LOW_PRICE_CEILING,
            PriceBracket::High => price > LOW_PRICE_CEILING,
        }
    }
}

impl FromStr for PriceBracket {
    type Err = std::convert::Infallible;

    /// Unknown values fall back to [`PriceBracket::Any`]
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim().to_lowercase().as_str() {
            "free" => PriceBracket::Free,
            "low" => PriceBracket::Low,
            "high" => PriceBracket::High,
            _ => PriceBracket::Any,
        })
    }
}

impl<'de> Deserialize<'de> for PriceBracket {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .as_deref()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default())
    }
}

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Descending by `createdAt`, missing timestamps last
    #[default]
    Newest,
    PriceAscending,
    PriceDescending,
}

impl FromStr for SortOrder {
    type Err = std::convert::Infallible;

    /// Unknown values fall back to [`SortOrder::Newest`]
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        Ok(match normalized.as_str() {
            "priceascending" | "priceasc" | "lowtohigh" => SortOrder::PriceAscending,
            "pricedescending" | "pricedesc" | "hightolow" => SortOrder::PriceDescending,
            _ => SortOrder::Newest,
        })
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .as_deref()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default())
    }
}

// =============================================================================
// Results
// =============================================================================

/// One page of query results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    /// Listings on the requested page, at most `page_size` of them
    pub page_items: Vec<Listing>,

    /// Number of listings that passed every filter
    pub total_count: usize,

    /// Number of pages, never less than 1
    pub total_pages: usize,

    /// Requested page, echoed back
    pub page: usize,

    pub page_size: usize,
}

impl ListingView {
    /// An empty view for an empty snapshot
    pub fn empty(page_size: usize) -> Self {
        Self {
            page_items: Vec::new(),
            total_count: 0,
            total_pages: 1,
            page: 1,
            page_size,
        }
    }

    /// Metadata for pagination controls
    pub fn pagination(&self) -> PaginationMeta {
        PaginationMeta::new(self.page, self.page_size, self.total_count)
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages, at least 1
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let total_pages = total_pages(total, page_size);

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page >= 1 && page < total_pages,
            has_prev: page > 1 && page <= total_pages,
        }
    }
}

/// `ceil(total / page_size)`, minimum 1; a zero page size counts as 1
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

// =============================================================================
// Engine
// =============================================================================

/// Run the full pipeline: filter, sort, paginate
///
/// # Errors
/// [`QueryError::Configuration`] when `params.page_size` is 0. Out-of-range
/// pages are not an error; they produce an empty `page_items`.
pub fn compute_view(listings: &[Listing], params: &QueryParams) -> Result<ListingView, QueryError> {
    if params.page_size == 0 {
        return Err(QueryError::Configuration {
            page_size: params.page_size,
        });
    }

    let mut matched = filter_listings(listings, params);
    sort_listings(&mut matched, params.sort_order);

    let total_count = matched.len();
    let page_items = paginate(&matched, params.page, params.page_size)
        .iter()
        .map(|listing| (*listing).clone())
        .collect();

    Ok(ListingView {
        page_items,
        total_count,
        total_pages: total_pages(total_count, params.page_size),
        page: params.page,
        page_size: params.page_size,
    })
}

/// Apply the search, category and price-bracket filters, in that order
pub fn filter_listings<'a>(listings: &'a [Listing], params: &QueryParams) -> Vec<&'a Listing> {
    let needle = params.search_text.to_lowercase();

    listings
        .iter()
        .filter(|listing| needle.is_empty() || listing.name.to_lowercase().contains(&needle))
        .filter(|listing| params.category.matches(listing))
        .filter(|listing| params.price_bracket.matches(listing))
        .collect()
}

/// Stable sort; equal keys keep their relative order
pub fn sort_listings(listings: &mut [&Listing], order: SortOrder) {
    match order {
        SortOrder::PriceAscending => listings.sort_by(|a, b| compare_price(a, b)),
        SortOrder::PriceDescending => listings.sort_by(|a, b| compare_price(b, a)),
        // None < Some, so reversing puts missing timestamps last
        SortOrder::Newest => listings.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

fn compare_price(a: &Listing, b: &Listing) -> Ordering {
    a.effective_price().total_cmp(&b.effective_price())
}

/// Slice out page `page` (1-based); empty when the page is out of range
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }

    let Some(start) = (page - 1).checked_mul(page_size) else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }

    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<Listing> {
        vec![
            Listing::new("1", "Buddy", "pets", Some(0.0), "Austin"),
            Listing::new("2", "Leash", "accessories", Some(500.0), "Austin"),
            Listing::new("3", "Food", "food", Some(1500.0), "Dallas"),
        ]
    }

    fn names(view: &ListingView) -> Vec<&str> {
        view.page_items.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_query_params_defaults() {
        let params = QueryParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(params.category, CategoryFilter::All);
        assert_eq!(params.price_bracket, PriceBracket::Any);
        assert_eq!(params.sort_order, SortOrder::Newest);
    }

    #[test]
    fn test_query_params_from_json() {
        let params: QueryParams = serde_json::from_value(json!({
            "searchText": "bud",
            "category": "ALL",
            "priceBracket": "cheap",
            "sortOrder": "priceDescending",
            "page": 3
        }))
        .unwrap();

        assert_eq!(params.search_text, "bud");
        assert_eq!(params.category, CategoryFilter::All);
        assert_eq!(params.price_bracket, PriceBracket::Any);
        assert_eq!(params.sort_order, SortOrder::PriceDescending);
        assert_eq!(params.page, 3);
        assert_eq!(params.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_price_ascending() {
        let params = QueryParams {
            sort_order: SortOrder::PriceAscending,
            page_size: 10,
            ..QueryParams::default()
        };
        let view = compute_view(&sample(), &params).unwrap();
        assert_eq!(names(&view), vec!["Buddy", "Leash", "Food"]);
        assert_eq!(view.total_count, 3);
        assert_eq!(view.total_pages, 1);
    }

    #[test]
    fn test_low_bracket_boundary() {
        let listings = vec![
            Listing::new("1", "A", "pets", Some(1000.0), ""),
            Listing::new("2", "B", "pets", Some(1000.01), ""),
            Listing::new("3", "C", "pets", Some(0.0), ""),
        ];
        let low = QueryParams {
            price_bracket: PriceBracket::Low,
            ..QueryParams::default()
        };
        let high = QueryParams {
            price_bracket: PriceBracket::High,
            ..QueryParams::default()
        };
        assert_eq!(names(&compute_view(&listings, &low).unwrap()), vec!["A"]);
        assert_eq!(names(&compute_view(&listings, &high).unwrap()), vec!["B"]);
    }

    #[test]
    fn test_missing_price_is_free() {
        let listings = vec![Listing::new("1", "Stray", "pets", None, "")];
        let free = QueryParams {
            price_bracket: PriceBracket::Free,
            ..QueryParams::default()
        };
        let low = QueryParams {
            price_bracket: PriceBracket::Low,
            ..QueryParams::default()
        };
        assert_eq!(compute_view(&listings, &free).unwrap().total_count, 1);
        assert_eq!(compute_view(&listings, &low).unwrap().total_count, 0);
    }

    #[test]
    fn test_paginate_out_of_range() {
        let items = [1, 2, 3];
        assert_eq!(paginate(&items, 0, 2), &[] as &[i32]);
        assert_eq!(paginate(&items, 2, 2), &[3]);
        assert_eq!(paginate(&items, 3, 2), &[] as &[i32]);
        assert_eq!(paginate(&items, usize::MAX, usize::MAX), &[] as &[i32]);
    }

    #[test]
    fn test_total_pages_minimum_one() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(1, 20, 145);
        assert_eq!(meta.total, 145);
        assert_eq!(meta.total_pages, 8);
        assert!(!meta.has_prev);
        assert!(meta.has_next);

        let last = PaginationMeta::new(8, 20, 145);
        assert!(last.has_prev);
        assert!(!last.has_next);
    }

    #[test]
    fn test_sort_order_aliases() {
        assert_eq!("price-asc".parse::<SortOrder>(), Ok(SortOrder::PriceAscending));
        assert_eq!("Price Descending".parse::<SortOrder>(), Ok(SortOrder::PriceDescending));
        assert_eq!("whatever".parse::<SortOrder>(), Ok(SortOrder::Newest));
    }
}
