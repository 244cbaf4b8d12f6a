//! In-memory marketplace backend for testing and development

use crate::core::error::StoreError;
use crate::core::listing::Listing;
use crate::core::order::{Order, OrderReceipt};
use crate::core::session::Role;
use crate::core::store::{ListingScope, ListingStore, OrderService, RoleDirectory};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Default)]
struct MarketState {
    // Insertion order is the order `fetch` returns
    listings: Vec<Listing>,
    orders: Vec<Order>,
    roles: HashMap<String, Role>,
}

/// In-memory listing store, order sink and role directory
///
/// Uses RwLock for thread-safe access. Clones share the same state.
#[derive(Clone, Default)]
pub struct InMemoryMarket {
    state: Arc<RwLock<MarketState>>,
}

impl InMemoryMarket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with listings
    pub fn with_listings(listings: impl IntoIterator<Item = Listing>) -> Self {
        let market = Self::new();
        if let Ok(mut state) = market.state.write() {
            state.listings.extend(listings);
        }
        market
    }

    /// Assign a role to a user email
    pub fn set_role(&self, email: &str, role: Role) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.roles.insert(email.to_lowercase(), role);
        Ok(())
    }

    /// Orders submitted so far
    pub fn orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.read()?.orders.clone())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MarketState>, StoreError> {
        self.state.read().map_err(|e| StoreError::Internal {
            message: format!("Failed to acquire read lock: {}", e),
        })
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MarketState>, StoreError> {
        self.state.write().map_err(|e| StoreError::Internal {
            message: format!("Failed to acquire write lock: {}", e),
        })
    }
}

#[async_trait]
impl ListingStore for InMemoryMarket {
    async fn fetch(&self, scope: &ListingScope) -> Result<Vec<Listing>, StoreError> {
        let state = self.read()?;

        Ok(state
            .listings
            .iter()
            .filter(|listing| scope.contains(listing))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Listing>, StoreError> {
        let state = self.read()?;

        Ok(state.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn create(&self, mut listing: Listing) -> Result<Listing, StoreError> {
        if listing.id.is_empty() {
            listing.id = Uuid::new_v4().to_string();
        }
        if listing.created_at.is_none() {
            listing.created_at = Some(Utc::now());
        }

        let mut state = self.write()?;
        state.listings.push(listing.clone());

        Ok(listing)
    }

    async fn update(&self, id: &str, mut listing: Listing) -> Result<Listing, StoreError> {
        let mut state = self.write()?;

        let slot = state
            .listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        listing.id = id.to_string();
        if listing.created_at.is_none() {
            listing.created_at = slot.created_at;
        }
        *slot = listing.clone();

        Ok(listing)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut state = self.write()?;

        let before = state.listings.len();
        state.listings.retain(|l| l.id != id);
        if state.listings.len() == before {
            return Err(StoreError::NotFound { id: id.to_string() });
        }

        Ok(())
    }
}

#[async_trait]
impl OrderService for InMemoryMarket {
    async fn submit_order(&self, order: &Order) -> Result<OrderReceipt, StoreError> {
        let mut state = self.write()?;
        state.orders.push(order.clone());

        Ok(OrderReceipt {
            order_id: Some(Uuid::new_v4().to_string()),
        })
    }
}

#[async_trait]
impl RoleDirectory for InMemoryMarket {
    async fn fetch_role(&self, email: &str) -> Result<Role, StoreError> {
        let state = self.read()?;

        Ok(state
            .roles
            .get(&email.to_lowercase())
            .copied()
            .unwrap_or_default())
    }
}
