//! Typed errors for the marketplace client
//!
//! # Error Categories
//!
//! - [`QueryError`]: invalid query engine configuration
//! - [`StoreError`]: the remote listing store failed (collaborator failure)
//! - [`OrderError`]: an order could not be built from the form input
//!
//! Malformed individual listing records are never reported as errors. They
//! are absorbed when decoding (see [`crate::core::listing::Listing`]) so one
//! bad record cannot blank a whole page.
//!
//! # Example
//!
//! ```rust,ignore
//! match compute_view(&listings, &params) {
//!     Ok(view) => render(view),
//!     Err(QueryError::Configuration { .. }) => unreachable_in_correct_setup(),
//! }
//! ```

use reqwest::StatusCode;
use thiserror::Error;

/// Crate-level error wrapping every category
#[derive(Debug, Error)]
pub enum MarketError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl MarketError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            MarketError::Query(e) => e.error_code(),
            MarketError::Store(e) => e.error_code(),
            MarketError::Order(e) => e.error_code(),
        }
    }

    /// Whether retrying the same operation can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            MarketError::Store(e) => e.is_retryable(),
            _ => false,
        }
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors raised by the query engine
///
/// Only programmer error is reported here; bad data never is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Page size must be a positive integer
    #[error("invalid configuration: page size must be positive, got {page_size}")]
    Configuration { page_size: usize },
}

impl QueryError {
    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::Configuration { .. } => "CONFIGURATION_ERROR",
        }
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Failures talking to the listing store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The server answered with a non-success status
    #[error("listing store returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    /// Connection, timeout or protocol failure
    #[error("listing store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded
    #[error("invalid response from listing store: {message}")]
    Decode { message: String },

    /// A request URL could not be built from the configured base URL
    #[error("invalid listing store url: {message}")]
    InvalidUrl { message: String },

    /// The requested record does not exist
    #[error("listing '{id}' not found")]
    NotFound { id: String },

    /// Storage-internal failure (in-memory backend)
    #[error("listing store failure: {message}")]
    Internal { message: String },
}

impl StoreError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Status { .. } => "STORE_STATUS",
            StoreError::Transport(_) => "STORE_UNAVAILABLE",
            StoreError::Decode { .. } => "STORE_DECODE",
            StoreError::InvalidUrl { .. } => "STORE_URL",
            StoreError::NotFound { .. } => "NOT_FOUND",
            StoreError::Internal { .. } => "STORE_INTERNAL",
        }
    }

    /// Network failures and server-side errors are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Transport(_) => true,
            StoreError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

// =============================================================================
// Order Errors
// =============================================================================

/// Reasons an order cannot be assembled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("sign in to place an order")]
    NotSignedIn,

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

impl OrderError {
    pub fn error_code(&self) -> &'static str {
        match self {
            OrderError::NotSignedIn => "NOT_SIGNED_IN",
            OrderError::MissingField { .. } => "VALIDATION_ERROR",
            OrderError::InvalidQuantity => "VALIDATION_ERROR",
        }
    }
}
