//! Listing store implementations

pub mod http;
pub mod in_memory;

pub use http::HttpMarketClient;
pub use in_memory::InMemoryMarket;
