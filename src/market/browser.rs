//! Browse page state
//!
//! [`ListingBrowser`] owns the query parameters of one browse page, the last
//! snapshot fetched from the listing store, and the page currently shown.
//!
//! Parameters fall in two groups:
//!
//! - the scope ([`ListingScope`]) decides *which collection* is fetched, so
//!   changing it goes back to the network;
//! - search, category filter, price bracket, sort and page only reshape the
//!   snapshot already held, so changing them recomputes locally.
//!
//! Any change to search, filter or sort sends the user back to page 1.

use crate::core::error::{QueryError, StoreError};
use crate::core::listing::Listing;
use crate::core::query::{
    CategoryFilter, ListingView, PriceBracket, QueryParams, SortOrder, compute_view,
};
use crate::core::store::{ListingScope, ListingStore};

/// Where the snapshot came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing fetched yet
    Idle,

    /// A fetch is in flight
    Loading,

    /// The snapshot is the latest good response
    Ready,

    /// The last fetch failed; the snapshot is empty until a retry succeeds
    Failed { message: String, retryable: bool },
}

/// Identifies one fetch; only the most recent ticket may land
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    scope: ListingScope,
}

impl FetchTicket {
    pub fn scope(&self) -> &ListingScope {
        &self.scope
    }
}

/// State holder for one browse page
pub struct ListingBrowser<S> {
    store: S,
    scope: ListingScope,
    params: QueryParams,
    snapshot: Vec<Listing>,
    view: ListingView,
    state: LoadState,
    generation: u64,
}

impl<S: ListingStore> ListingBrowser<S> {
    /// Create a browser over every listing
    ///
    /// # Errors
    /// [`QueryError::Configuration`] when `page_size` is 0.
    pub fn new(store: S, page_size: usize) -> Result<Self, QueryError> {
        Self::with_scope(store, ListingScope::All, page_size)
    }

    /// Create a browser over one scope, e.g. a category page
    pub fn with_scope(store: S, scope: ListingScope, page_size: usize) -> Result<Self, QueryError> {
        let params = QueryParams::with_page_size(page_size);
        let view = compute_view(&[], &params)?;

        Ok(Self {
            store,
            scope,
            params,
            snapshot: Vec::new(),
            view,
            state: LoadState::Idle,
            generation: 0,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scope(&self) -> &ListingScope {
        &self.scope
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// The full collection last fetched
    pub fn snapshot(&self) -> &[Listing] {
        &self.snapshot
    }

    /// The page currently shown
    pub fn view(&self) -> &ListingView {
        &self.view
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetch the current scope and recompute the view
    ///
    /// Failures never propagate: they leave an empty snapshot and a
    /// [`LoadState::Failed`] the caller can show with a retry button.
    pub async fn load(&mut self) -> &LoadState {
        let ticket = self.begin_load();
        let result = self.store.fetch(&ticket.scope).await;
        self.finish_load(ticket, result);
        &self.state
    }

    /// Start a fetch, superseding any fetch still in flight
    pub fn begin_load(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = LoadState::Loading;

        tracing::debug!(scope = %self.scope, generation = self.generation, "Fetching listings");
        FetchTicket {
            generation: self.generation,
            scope: self.scope.clone(),
        }
    }

    /// Apply the result of a fetch
    ///
    /// Returns `false` when the ticket was superseded and the result dropped.
    pub fn finish_load(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Listing>, StoreError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                scope = %ticket.scope,
                generation = ticket.generation,
                current = self.generation,
                "Discarding stale fetch result"
            );
            return false;
        }

        match result {
            Ok(listings) => {
                tracing::debug!(scope = %ticket.scope, count = listings.len(), "Listings loaded");
                self.snapshot = listings;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                tracing::warn!(scope = %ticket.scope, error = %e, "Failed to load listings");
                self.snapshot.clear();
                self.state = LoadState::Failed {
                    message: e.to_string(),
                    retryable: e.is_retryable(),
                };
            }
        }

        self.recompute();
        true
    }

    /// Switch to another collection; refetches only when the scope changed
    pub async fn set_scope(&mut self, scope: ListingScope) -> &LoadState {
        if scope != self.scope {
            self.scope = scope;
            self.params.page = 1;
            self.load().await;
        }
        &self.state
    }

    // =========================================================================
    // Local parameters
    // =========================================================================

    pub fn set_search(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.params.search_text {
            self.params.search_text = text;
            self.reset_page();
        }
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        if category != self.params.category {
            self.params.category = category;
            self.reset_page();
        }
    }

    pub fn set_price_bracket(&mut self, bracket: PriceBracket) {
        if bracket != self.params.price_bracket {
            self.params.price_bracket = bracket;
            self.reset_page();
        }
    }

    pub fn set_sort(&mut self, order: SortOrder) {
        if order != self.params.sort_order {
            self.params.sort_order = order;
            self.reset_page();
        }
    }

    /// Go to a page, clamped to `[1, total_pages]`
    pub fn set_page(&mut self, page: usize) {
        self.params.page = page.clamp(1, self.view.total_pages);
        self.recompute();
    }

    pub fn next_page(&mut self) {
        self.set_page(self.params.page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.params.page.saturating_sub(1));
    }

    fn reset_page(&mut self) {
        self.params.page = 1;
        self.recompute();
    }

    fn recompute(&mut self) {
        // page_size was validated in the constructor and never changes
        self.view = compute_view(&self.snapshot, &self.params)
            .unwrap_or_else(|_| ListingView::empty(self.params.page_size));
    }
}
