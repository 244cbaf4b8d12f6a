//! Client-side flows built on the core: browsing and checkout

pub mod browser;
pub mod checkout;

pub use browser::{FetchTicket, ListingBrowser, LoadState};
pub use checkout::place_order;
