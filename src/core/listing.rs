//! The marketplace listing record

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single marketplace entry: a pet up for adoption or a product for sale.
///
/// Records come from a remote API that is not fully trusted, so decoding is
/// tolerant: a malformed `price` or `createdAt` decodes to `None` instead of
/// failing the whole collection. Text fields accept `null` (read as missing)
/// and numbers or booleans (kept as their text form).
///
/// A price of `0` means "free adoption", not "priced at zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Opaque identifier assigned by the listing store
    #[serde(alias = "_id", default, deserialize_with = "lenient_id")]
    pub id: String,

    /// Display name, matched by the text search
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,

    /// Category tag such as "pets", "food", "accessories" or "care"
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: String,

    /// Price in currency units, `None` when missing or not numeric
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,

    /// Free-text location, display only
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: String,

    /// Creation time, used for "newest first" ordering
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient_opt_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Image URL
    #[serde(default, deserialize_with = "lenient_opt_text", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Email of the user who owns the listing
    #[serde(
        alias = "email",
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub owner_email: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_text", skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_text", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl Listing {
    /// Create a listing with the fields the query engine looks at
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: Option<f64>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            price,
            location: location.into(),
            ..Self::default()
        }
    }

    /// Builder-style setter for the creation timestamp
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builder-style setter for the owner email
    pub fn with_owner(mut self, email: impl Into<String>) -> Self {
        self.owner_email = Some(email.into());
        self
    }

    /// Price used for filtering and sorting: a missing price counts as free
    pub fn effective_price(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    /// Whether this is a free-adoption listing
    pub fn is_free(&self) -> bool {
        self.effective_price() == 0.0
    }

    /// Case-insensitive category comparison
    pub fn in_category(&self, category: &str) -> bool {
        self.category.to_lowercase() == category.to_lowercase()
    }

    /// Whether the listing belongs to the given user
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.owner_email
            .as_deref()
            .is_some_and(|owner| owner.eq_ignore_ascii_case(email))
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        // Mongo extended JSON: {"$oid": "..."}
        Value::Object(map) => map
            .get("$oid")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_default(),
        _ => String::new(),
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_text(&value).unwrap_or_default())
}

fn lenient_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_text(&value))
}

/// Text form of a scalar; `None` for null, arrays and objects
pub(crate) fn parse_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_price(&value))
}

/// Interpret a JSON value as a price, `None` for anything unusable
pub(crate) fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    // `-0.0 + 0.0` is `+0.0`; total_cmp would otherwise order -0 first
    (price.is_finite() && price >= 0.0).then_some(price + 0.0)
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_timestamp(&value))
}

/// Accepts RFC 3339 strings and epoch milliseconds
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_record() {
        let listing: Listing = serde_json::from_value(json!({
            "_id": "64f0c1",
            "name": "Buddy",
            "category": "pets",
            "price": 0,
            "location": "Dhaka",
            "createdAt": "2024-03-01T10:00:00Z",
            "email": "owner@example.com",
            "image": "https://img.example.com/buddy.png"
        }))
        .unwrap();

        assert_eq!(listing.id, "64f0c1");
        assert_eq!(listing.price, Some(0.0));
        assert!(listing.is_free());
        assert_eq!(listing.owner_email.as_deref(), Some("owner@example.com"));
        assert!(listing.created_at.is_some());
    }

    #[test]
    fn test_numeric_string_price() {
        let listing: Listing =
            serde_json::from_value(json!({"name": "Leash", "price": " 500 "})).unwrap();
        assert_eq!(listing.price, Some(500.0));
    }

    #[test]
    fn test_bad_price_becomes_none() {
        for price in [json!("free"), json!(null), json!(-3), json!([1]), json!({"a": 1})] {
            let listing: Listing =
                serde_json::from_value(json!({"name": "X", "price": price})).unwrap();
            assert_eq!(listing.price, None);
            assert_eq!(listing.effective_price(), 0.0);
        }
    }

    #[test]
    fn test_missing_fields_default() {
        let listing: Listing = serde_json::from_value(json!({})).unwrap();
        assert_eq!(listing.id, "");
        assert_eq!(listing.name, "");
        assert_eq!(listing.price, None);
        assert_eq!(listing.created_at, None);
    }

    #[test]
    fn test_null_and_scalar_text_fields() {
        let listing: Listing = serde_json::from_value(json!({
            "name": 42,
            "category": null,
            "location": null,
            "description": null,
            "age": 2,
            "gender": true,
            "image": ["a.png"]
        }))
        .unwrap();

        assert_eq!(listing.name, "42");
        assert_eq!(listing.category, "");
        assert_eq!(listing.location, "");
        assert_eq!(listing.description, None);
        assert_eq!(listing.age.as_deref(), Some("2"));
        assert_eq!(listing.gender.as_deref(), Some("true"));
        assert_eq!(listing.image, None);
    }

    #[test]
    fn test_null_owner_email() {
        let listing: Listing = serde_json::from_value(json!({"email": null})).unwrap();
        assert_eq!(listing.owner_email, None);
        assert!(!listing.is_owned_by(""));
    }

    #[test]
    fn test_negative_zero_price_is_zero() {
        for price in [json!("-0"), json!(-0.0)] {
            let listing: Listing = serde_json::from_value(json!({"price": price})).unwrap();
            let parsed = listing.price.unwrap();
            assert_eq!(parsed, 0.0);
            assert!(parsed.is_sign_positive());
            assert!(listing.is_free());
        }
    }

    #[test]
    fn test_timestamp_formats() {
        let millis: Listing =
            serde_json::from_value(json!({"createdAt": 1_700_000_000_000_i64})).unwrap();
        assert_eq!(
            millis.created_at.map(|t| t.timestamp()),
            Some(1_700_000_000)
        );

        let garbage: Listing =
            serde_json::from_value(json!({"createdAt": "last tuesday"})).unwrap();
        assert_eq!(garbage.created_at, None);
    }

    #[test]
    fn test_oid_id() {
        let listing: Listing =
            serde_json::from_value(json!({"_id": {"$oid": "abc123"}})).unwrap();
        assert_eq!(listing.id, "abc123");
    }

    #[test]
    fn test_category_case_insensitive() {
        let listing = Listing::new("1", "Kibble", "Food", Some(10.0), "");
        assert!(listing.in_category("food"));
        assert!(listing.in_category("FOOD"));
        assert!(!listing.in_category("pets"));
    }
}
