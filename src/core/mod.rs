//! Core module containing the marketplace domain types and the query engine

pub mod error;
pub mod listing;
pub mod notice;
pub mod order;
pub mod query;
pub mod session;
pub mod store;

pub use error::{MarketError, OrderError, QueryError, StoreError};
pub use listing::Listing;
pub use notice::{Notice, NoticeKind};
pub use order::{Order, OrderDetails, OrderReceipt};
pub use query::{
    CategoryFilter, ListingView, PaginationMeta, PriceBracket, QueryParams, SortOrder,
    compute_view,
};
pub use session::{AccessPolicy, DashboardKind, Role, SessionContext, UserIdentity};
pub use store::{ListingScope, ListingStore, OrderService, RoleDirectory};
