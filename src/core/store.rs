//! Collaborator traits for the remote marketplace API
//!
//! The listing store is the system of record. These traits keep the rest of
//! the crate agnostic to whether it is reached over HTTP or held in memory.

use crate::core::error::StoreError;
use crate::core::listing::Listing;
use crate::core::order::{Order, OrderReceipt};
use crate::core::session::{Role, SessionContext};
use async_trait::async_trait;
use std::fmt;

/// Which slice of the listing collection to fetch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListingScope {
    /// Every listing
    #[default]
    All,

    /// Listings in one category, filtered server-side when possible
    Category(String),

    /// Listings owned by the user with this email
    OwnedBy(String),
}

impl ListingScope {
    /// "My listings" scope for the signed-in user, `None` when anonymous
    pub fn owned_by(session: &SessionContext) -> Option<Self> {
        session
            .email()
            .map(|email| ListingScope::OwnedBy(email.to_string()))
    }

    /// Whether a listing belongs to this scope
    pub fn contains(&self, listing: &Listing) -> bool {
        match self {
            ListingScope::All => true,
            ListingScope::Category(category) => listing.in_category(category),
            ListingScope::OwnedBy(email) => listing.is_owned_by(email),
        }
    }
}

impl fmt::Display for ListingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingScope::All => write!(f, "all"),
            ListingScope::Category(category) => write!(f, "category:{}", category),
            ListingScope::OwnedBy(email) => write!(f, "owner:{}", email),
        }
    }
}

/// Read and write access to listings
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Fetch the full collection for a scope
    async fn fetch(&self, scope: &ListingScope) -> Result<Vec<Listing>, StoreError>;

    /// Get a listing by ID
    async fn get(&self, id: &str) -> Result<Option<Listing>, StoreError>;

    /// Create a listing, returning it as stored
    async fn create(&self, listing: Listing) -> Result<Listing, StoreError>;

    /// Replace an existing listing
    async fn update(&self, id: &str, listing: Listing) -> Result<Listing, StoreError>;

    /// Delete a listing
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Order submission
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn submit_order(&self, order: &Order) -> Result<OrderReceipt, StoreError>;
}

/// Role lookup for a signed-in user
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn fetch_role(&self, email: &str) -> Result<Role, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::UserIdentity;

    #[test]
    fn test_owned_by_requires_session() {
        assert_eq!(ListingScope::owned_by(&SessionContext::Anonymous), None);

        let session = SessionContext::SignedIn(UserIdentity::new("ana@example.com", "Ana"));
        assert_eq!(
            ListingScope::owned_by(&session),
            Some(ListingScope::OwnedBy("ana@example.com".to_string()))
        );
    }

    #[test]
    fn test_scope_contains() {
        let listing = Listing::new("1", "Kibble", "Food", Some(12.0), "").with_owner("Bo@Example.com");

        assert!(ListingScope::All.contains(&listing));
        assert!(ListingScope::Category("food".to_string()).contains(&listing));
        assert!(!ListingScope::Category("pets".to_string()).contains(&listing));
        assert!(ListingScope::OwnedBy("bo@example.com".to_string()).contains(&listing));
    }
}
