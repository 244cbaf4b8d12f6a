//! HTTP client for the remote marketplace API
//!
//! Routes, relative to the configured base URL:
//!
//! | Operation        | Request                                |
//! |------------------|----------------------------------------|
//! | all listings     | `GET /listings`                        |
//! | by category      | `GET /listings/category/{category}`    |
//! | by owner         | `GET /listings?email={email}`          |
//! | single listing   | `GET /listings/{id}`                   |
//! | create / update  | `POST /listings`, `PUT /listings/{id}` |
//! | delete           | `DELETE /listings/{id}`                |
//! | place order      | `POST /orders`                         |
//! | role lookup      | `GET /users/role/{email}`              |
//!
//! The category route is allowed to fail: the client then fetches every
//! listing and filters by category locally.

use crate::config::ApiConfig;
use crate::core::error::StoreError;
use crate::core::listing::Listing;
use crate::core::order::{Order, OrderReceipt};
use crate::core::session::Role;
use crate::core::store::{ListingScope, ListingStore, OrderService, RoleDirectory};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;

/// reqwest-backed implementation of the collaborator traits
#[derive(Debug, Clone)]
pub struct HttpMarketClient {
    client: Client,
    base_url: Url,
}

impl HttpMarketClient {
    /// Build a client from API configuration
    pub fn new(config: &ApiConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Self::with_client(client, &config.base_url)
    }

    /// Use an existing reqwest client
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url).map_err(|e| StoreError::InvalidUrl {
            message: format!("{}: {}", base_url, e),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl {
                message: format!("{} cannot be used as a base url", base_url),
            });
        }

        Ok(Self { client, base_url })
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl {
                message: format!("{} cannot be used as a base url", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, StoreError> {
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        read_json(url, response).await
    }

    async fn fetch_all(&self) -> Result<Vec<Listing>, StoreError> {
        let url = self.endpoint(&["listings"])?;
        decode_listings(self.get_json(url).await?)
    }

    async fn fetch_category(&self, category: &str) -> Result<Vec<Listing>, StoreError> {
        let url = self.endpoint(&["listings", "category", category])?;

        match self.get_json(url).await.and_then(decode_listings) {
            Ok(listings) => Ok(listings),
            Err(e) => {
                tracing::warn!(
                    category = %category,
                    error = %e,
                    "Category fetch failed, filtering the full collection instead"
                );
                let all = self.fetch_all().await?;
                Ok(all.into_iter().filter(|l| l.in_category(category)).collect())
            }
        }
    }

    async fn fetch_owned(&self, email: &str) -> Result<Vec<Listing>, StoreError> {
        let mut url = self.endpoint(&["listings"])?;
        url.query_pairs_mut().append_pair("email", email);
        decode_listings(self.get_json(url).await?)
    }
}

/// Map a non-2xx response to [`StoreError::Status`]
fn ensure_success(url: &Url, response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if !status.is_success() {
        return Err(StoreError::Status {
            status,
            url: url.to_string(),
        });
    }
    Ok(response)
}

/// Turn a response into JSON, mapping non-2xx to [`StoreError::Status`]
///
/// An empty success body reads as `null`.
async fn read_json(url: Url, response: Response) -> Result<Value, StoreError> {
    let body = ensure_success(&url, response)?.bytes().await?;
    if body.is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&body).map_err(|e| StoreError::Decode {
        message: e.to_string(),
    })
}

/// Read the body of a write: the status decides success, the body is a hint
///
/// A 2xx body that is not JSON (e.g. plain `created`) reads as `null`, an
/// acknowledgement without an id.
async fn read_ack(url: Url, response: Response) -> Result<Value, StoreError> {
    let body = ensure_success(&url, response)?.bytes().await?;

    Ok(serde_json::from_slice(&body).unwrap_or_else(|e| {
        if !body.is_empty() {
            tracing::debug!(url = %url, error = %e, "Write acknowledged with a non-JSON body");
        }
        Value::Null
    }))
}

/// Decode a JSON array of listings, skipping records that are not objects
fn decode_listings(body: Value) -> Result<Vec<Listing>, StoreError> {
    let Value::Array(items) = body else {
        return Err(StoreError::Decode {
            message: "expected a JSON array of listings".to_string(),
        });
    };

    let total = items.len();
    let listings: Vec<Listing> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed listing record");
                None
            }
        })
        .collect();

    tracing::debug!(received = total, kept = listings.len(), "Decoded listings");
    Ok(listings)
}

/// Merge a write response into the listing that was sent
///
/// Servers answer either with the stored record or with an acknowledgement
/// such as `{"insertedId": "..."}`.
fn merge_write_response(mut sent: Listing, body: Value) -> Listing {
    if body.get("name").is_some() {
        if let Ok(stored) = serde_json::from_value::<Listing>(body.clone()) {
            if !stored.id.is_empty() {
                return stored;
            }
        }
    }

    if let Some(id) = OrderReceipt::from_response(&body).order_id {
        sent.id = id;
    }
    sent
}

fn not_found_as(id: &str, error: StoreError) -> StoreError {
    match error {
        StoreError::Status { status, .. } if status == StatusCode::NOT_FOUND => {
            StoreError::NotFound { id: id.to_string() }
        }
        other => other,
    }
}

#[async_trait]
impl ListingStore for HttpMarketClient {
    async fn fetch(&self, scope: &ListingScope) -> Result<Vec<Listing>, StoreError> {
        match scope {
            ListingScope::All => self.fetch_all().await,
            ListingScope::Category(category) => self.fetch_category(category).await,
            ListingScope::OwnedBy(email) => self.fetch_owned(email).await,
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Listing>, StoreError> {
        let url = self.endpoint(&["listings", id])?;

        match self.get_json(url).await {
            Ok(Value::Null) => Ok(None),
            Ok(body) => serde_json::from_value(body)
                .map(Some)
                .map_err(|e| StoreError::Decode {
                    message: e.to_string(),
                }),
            Err(StoreError::Status { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create(&self, listing: Listing) -> Result<Listing, StoreError> {
        let url = self.endpoint(&["listings"])?;
        tracing::debug!(url = %url, name = %listing.name, "POST listing");

        let response = self.client.post(url.clone()).json(&listing).send().await?;
        let body = read_ack(url, response).await?;

        let created = merge_write_response(listing, body);
        tracing::info!(id = %created.id, "Listing created");
        Ok(created)
    }

    async fn update(&self, id: &str, mut listing: Listing) -> Result<Listing, StoreError> {
        let url = self.endpoint(&["listings", id])?;
        listing.id = id.to_string();
        tracing::debug!(url = %url, "PUT listing");

        let response = self.client.put(url.clone()).json(&listing).send().await?;
        let body = read_ack(url, response)
            .await
            .map_err(|e| not_found_as(id, e))?;

        let mut updated = merge_write_response(listing, body);
        updated.id = id.to_string();
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let url = self.endpoint(&["listings", id])?;
        tracing::debug!(url = %url, "DELETE listing");

        let response = self.client.delete(url.clone()).send().await?;
        ensure_success(&url, response).map_err(|e| not_found_as(id, e))?;

        tracing::info!(id = %id, "Listing deleted");
        Ok(())
    }
}

#[async_trait]
impl OrderService for HttpMarketClient {
    async fn submit_order(&self, order: &Order) -> Result<OrderReceipt, StoreError> {
        let url = self.endpoint(&["orders"])?;
        tracing::debug!(url = %url, listing_id = %order.listing_id, "POST order");

        let response = self.client.post(url.clone()).json(order).send().await?;
        let body = read_ack(url, response).await?;

        Ok(OrderReceipt::from_response(&body))
    }
}

#[async_trait]
impl RoleDirectory for HttpMarketClient {
    async fn fetch_role(&self, email: &str) -> Result<Role, StoreError> {
        let url = self.endpoint(&["users", "role", email])?;
        let body = self.get_json(url).await?;

        Ok(body
            .get("role")
            .and_then(Value::as_str)
            .map(Role::parse)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::{QueryParams, compute_view};
    use serde_json::json;

    fn client(base: &str) -> HttpMarketClient {
        HttpMarketClient::with_client(Client::new(), base).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://localhost:5000/api/");
        let url = c.endpoint(&["listings", "category", "pet food"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/listings/category/pet%20food");
    }

    #[test]
    fn test_endpoint_without_trailing_slash() {
        let c = client("http://localhost:5000");
        let url = c.endpoint(&["users", "role", "a@b.com"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/users/role/a@b.com");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = HttpMarketClient::with_client(Client::new(), "not a url");
        assert!(matches!(result, Err(StoreError::InvalidUrl { .. })));

        let result = HttpMarketClient::with_client(Client::new(), "mailto:a@b.com");
        assert!(matches!(result, Err(StoreError::InvalidUrl { .. })));
    }

    #[test]
    fn test_decode_listings_skips_bad_records() {
        let listings = decode_listings(json!([
            {"_id": "1", "name": "Buddy", "price": "free"},
            42,
            {"_id": "2", "name": "Leash", "price": 500}
        ]))
        .unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].price, None);
        assert_eq!(listings[1].price, Some(500.0));
    }

    #[test]
    fn test_decode_listings_keeps_null_and_numeric_text() {
        let listings = decode_listings(json!([
            {"_id": "1", "name": "Mystery", "category": null, "location": null, "price": 10},
            {"_id": "2", "name": "Rex", "category": "pets", "age": 2, "gender": null}
        ]))
        .unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].category, "");
        assert_eq!(listings[0].location, "");
        assert_eq!(listings[1].age.as_deref(), Some("2"));
        assert_eq!(listings[1].gender, None);

        let view = compute_view(&listings, &QueryParams::default()).unwrap();
        assert_eq!(view.total_count, 2);
    }

    #[test]
    fn test_decode_listings_rejects_non_array() {
        let result = decode_listings(json!({"listings": []}));
        assert!(matches!(result, Err(StoreError::Decode { .. })));
    }

    #[test]
    fn test_merge_write_response() {
        let sent = Listing::new("", "Brush", "care", Some(8.0), "");

        let acked = merge_write_response(sent.clone(), json!({"insertedId": "abc"}));
        assert_eq!(acked.id, "abc");
        assert_eq!(acked.name, "Brush");

        let stored = merge_write_response(sent, json!({"_id": "xyz", "name": "Brush", "price": 8}));
        assert_eq!(stored.id, "xyz");
    }
}
