//! Order records

use crate::core::error::OrderError;
use crate::core::listing::Listing;
use crate::core::session::SessionContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contact and delivery details entered on the order form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub phone: String,
    pub address: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderDetails {
    pub fn new(phone: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            address: address.into(),
            quantity: 1,
            pickup_date: None,
            notes: None,
        }
    }
}

/// Structured order posted to the orders endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub listing_id: String,
    pub listing_name: String,
    pub buyer_name: String,
    pub buyer_email: String,
    pub unit_price: f64,
    pub total_price: f64,
    pub placed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: OrderDetails,
}

impl Order {
    /// Build an order for a listing on behalf of the signed-in user
    ///
    /// # Errors
    /// - [`OrderError::NotSignedIn`] for an anonymous session
    /// - [`OrderError::MissingField`] when phone or address is blank
    /// - [`OrderError::InvalidQuantity`] when quantity is 0
    pub fn for_listing(
        listing: &Listing,
        session: &SessionContext,
        details: OrderDetails,
    ) -> Result<Self, OrderError> {
        let buyer = session.user().ok_or(OrderError::NotSignedIn)?;

        if details.phone.trim().is_empty() {
            return Err(OrderError::MissingField { field: "phone" });
        }
        if details.address.trim().is_empty() {
            return Err(OrderError::MissingField { field: "address" });
        }
        if details.quantity == 0 {
            return Err(OrderError::InvalidQuantity);
        }

        let unit_price = listing.effective_price();

        Ok(Self {
            listing_id: listing.id.clone(),
            listing_name: listing.name.clone(),
            buyer_name: buyer.display_name.clone(),
            buyer_email: buyer.email.clone(),
            unit_price,
            total_price: unit_price * f64::from(details.quantity),
            placed_at: Utc::now(),
            details,
        })
    }
}

/// Acknowledgement returned by the orders endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    /// Server-assigned id, when the server reports one
    pub order_id: Option<String>,
}

impl OrderReceipt {
    /// Read the id from `insertedId`, `id` or `_id`, whichever is present
    pub fn from_response(body: &Value) -> Self {
        let order_id = ["insertedId", "id", "_id"]
            .iter()
            .filter_map(|key| body.get(*key))
            .find_map(|value| match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        Self { order_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::UserIdentity;
    use serde_json::json;

    fn session() -> SessionContext {
        SessionContext::SignedIn(UserIdentity::new("lee@example.com", "Lee"))
    }

    #[test]
    fn test_order_totals() {
        let listing = Listing::new("7", "Chew toy", "accessories", Some(150.0), "");
        let details = OrderDetails {
            quantity: 3,
            ..OrderDetails::new("555-0100", "12 Elm St")
        };

        let order = Order::for_listing(&listing, &session(), details).unwrap();
        assert_eq!(order.buyer_email, "lee@example.com");
        assert_eq!(order.unit_price, 150.0);
        assert_eq!(order.total_price, 450.0);
    }

    #[test]
    fn test_order_requires_session() {
        let listing = Listing::new("7", "Chew toy", "accessories", Some(150.0), "");
        let result = Order::for_listing(
            &listing,
            &SessionContext::Anonymous,
            OrderDetails::new("555-0100", "12 Elm St"),
        );
        assert_eq!(result, Err(OrderError::NotSignedIn));
    }

    #[test]
    fn test_order_validation() {
        let listing = Listing::new("7", "Chew toy", "accessories", None, "");

        let blank_phone = Order::for_listing(&listing, &session(), OrderDetails::new(" ", "x"));
        assert_eq!(blank_phone, Err(OrderError::MissingField { field: "phone" }));

        let zero = OrderDetails {
            quantity: 0,
            ..OrderDetails::new("1", "x")
        };
        assert_eq!(
            Order::for_listing(&listing, &session(), zero),
            Err(OrderError::InvalidQuantity)
        );
    }

    #[test]
    fn test_order_serializes_flat() {
        let listing = Listing::new("7", "Chew toy", "accessories", Some(1.0), "");
        let order =
            Order::for_listing(&listing, &session(), OrderDetails::new("1", "x")).unwrap();
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["listingId"], json!("7"));
        assert_eq!(value["phone"], json!("1"));
        assert_eq!(value["quantity"], json!(1));
    }

    #[test]
    fn test_receipt_from_response() {
        assert_eq!(
            OrderReceipt::from_response(&json!({"acknowledged": true, "insertedId": "abc"}))
                .order_id
                .as_deref(),
            Some("abc")
        );
        assert_eq!(OrderReceipt::from_response(&json!({"id": 42})).order_id.as_deref(), Some("42"));
        assert_eq!(OrderReceipt::from_response(&json!({})).order_id, None);
    }
}
