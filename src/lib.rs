//! # PawMart
//!
//! Client core for a pet-adoption and pet-supplies marketplace.
//!
//! ## Features
//!
//! - **Listing Query Engine**: pure search, category, price-bracket, sort and
//!   pagination over a fetched snapshot ([`core::query::compute_view`])
//! - **Tolerant Records**: malformed prices and timestamps are absorbed, never
//!   fatal to a page
//! - **Listing Store Client**: reqwest-based client for the marketplace REST API
//!   with a client-side fallback for category pages
//! - **Browse State**: explicit split between parameters that refetch and
//!   parameters that only recompute locally
//! - **Explicit Sessions**: the current user is passed around, never looked up
//!   from ambient state
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pawmart::prelude::*;
//!
//! let config = MarketConfig::from_yaml_file("pawmart.yaml")?;
//! let client = HttpMarketClient::new(&config.api)?;
//!
//! let mut browser = ListingBrowser::new(client, config.browse.page_size)?;
//! browser.load().await;
//!
//! browser.set_price_bracket(PriceBracket::Free);
//! browser.set_sort(SortOrder::Newest);
//!
//! for listing in &browser.view().page_items {
//!     println!("{} ({})", listing.name, listing.location);
//! }
//! ```

pub mod config;
pub mod core;
pub mod market;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Types ===
    pub use crate::core::{
        error::{MarketError, OrderError, QueryError, StoreError},
        listing::Listing,
        notice::{Notice, NoticeKind},
        order::{Order, OrderDetails, OrderReceipt},
        query::{
            CategoryFilter, ListingView, PaginationMeta, PriceBracket, QueryParams, SortOrder,
            compute_view,
        },
        session::{AccessPolicy, DashboardKind, Role, SessionContext, UserIdentity, resolve_role},
        store::{ListingScope, ListingStore, OrderService, RoleDirectory},
    };

    // === Flows ===
    pub use crate::market::{FetchTicket, ListingBrowser, LoadState, place_order};

    // === Storage ===
    pub use crate::storage::{HttpMarketClient, InMemoryMarket};

    // === Config ===
    pub use crate::config::{ApiConfig, BrowseConfig, MarketConfig};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
}
