//! Paginated restaurant listing with search.
//!
//! A new search (or a change of restaurant type) starts again at page 1 and
//! replaces the list; "load more" appends the next page. [`LiveSearch`]
//! puts the debouncer in front of the search for as-you-type input.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

use tiffin_core::{RestaurantSummary, RestaurantType};

use crate::api::{ApiError, RestaurantQuery};
use crate::catalog::CatalogService;
use crate::debounce::Debouncer;

/// Restaurants loaded so far for one listing.
pub struct RestaurantFeed {
    catalog: CatalogService,
    query: RestaurantQuery,
    restaurants: Vec<RestaurantSummary>,
    total_pages: u32,
}

impl RestaurantFeed {
    /// An empty feed for `kind`; call [`Self::load`] to fetch page 1.
    #[must_use]
    pub fn new(catalog: CatalogService, kind: Option<RestaurantType>) -> Self {
        let query = catalog.query(kind);
        Self {
            catalog,
            query,
            restaurants: Vec::new(),
            total_pages: 1,
        }
    }

    /// Heading for the listing, e.g. "Dining Out".
    #[must_use]
    pub const fn title(&self) -> &'static str {
        RestaurantType::title(self.query.kind)
    }

    #[must_use]
    pub fn restaurants(&self) -> &[RestaurantSummary] {
        &self.restaurants
    }

    /// Current search text, if any.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.query.search.as_deref()
    }

    /// Last page loaded (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.query.page
    }

    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Whether [`Self::load_more`] would fetch anything.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.query.page < self.total_pages
    }

    /// Reload page 1 of the current query, replacing the list.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails; the list is left as it was.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        let query = self.query.clone().with_page(1);
        self.fetch(query, false).await
    }

    /// Search from page 1, replacing the list.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails; the list is left as it was.
    pub async fn search(&mut self, term: &str) -> Result<(), ApiError> {
        let query = self.query.clone().with_search(term).with_page(1);
        self.fetch(query, false).await
    }

    /// Fetch the next page and append it.
    ///
    /// Returns `false` without a request when there is no next page.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails; the list is left as it was.
    pub async fn load_more(&mut self) -> Result<bool, ApiError> {
        if !self.has_more() {
            return Ok(false);
        }
        let query = self.query.clone().with_page(self.query.page + 1);
        self.fetch(query, true).await?;
        Ok(true)
    }

    #[instrument(skip(self, query), fields(page = query.page, search = ?query.search))]
    async fn fetch(&mut self, query: RestaurantQuery, append: bool) -> Result<(), ApiError> {
        let page = self.catalog.list_restaurants(&query).await?;
        debug!(
            count = page.restaurants.len(),
            total_pages = page.total_pages,
            "Loaded restaurants"
        );

        if append {
            self.restaurants.extend(page.restaurants);
        } else {
            self.restaurants = page.restaurants;
        }
        self.total_pages = page.total_pages.max(1);
        self.query = query;
        Ok(())
    }
}

/// What a [`LiveSearch`] last produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResults {
    pub term: Option<String>,
    pub restaurants: Vec<RestaurantSummary>,
    pub has_more: bool,
}

/// Debounced remote search over a [`RestaurantFeed`].
///
/// Each call to [`LiveSearch::input`] restarts the quiet period; when it
/// ends the feed is searched and the results are published.
pub struct LiveSearch {
    feed: Arc<Mutex<RestaurantFeed>>,
    debouncer: Debouncer,
    results: Arc<watch::Sender<SearchResults>>,
}

impl LiveSearch {
    #[must_use]
    pub fn new(feed: RestaurantFeed, debouncer: Debouncer) -> Self {
        let (results, _) = watch::channel(SearchResults {
            term: feed.search_term().map(str::to_owned),
            restaurants: feed.restaurants().to_vec(),
            has_more: feed.has_more(),
        });
        Self {
            feed: Arc::new(Mutex::new(feed)),
            debouncer,
            results: Arc::new(results),
        }
    }

    /// Receive results as searches complete.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchResults> {
        self.results.subscribe()
    }

    /// The feed behind the search, for paging.
    #[must_use]
    pub fn feed(&self) -> Arc<Mutex<RestaurantFeed>> {
        Arc::clone(&self.feed)
    }

    /// Record new search text; the request goes out once typing pauses.
    pub fn input(&self, term: &str) {
        let feed = Arc::clone(&self.feed);
        let results = Arc::clone(&self.results);
        let term = term.to_owned();

        self.debouncer.schedule(async move {
            let mut feed = feed.lock().await;
            match feed.search(&term).await {
                Ok(()) => {
                    results.send_replace(SearchResults {
                        term: feed.search_term().map(str::to_owned),
                        restaurants: feed.restaurants().to_vec(),
                        has_more: feed.has_more(),
                    });
                }
                Err(e) => warn!(error = %e, term = %term, "Restaurant search failed"),
            }
        });
    }

    /// Whether a search is waiting for typing to pause.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::StorefrontApi;
    use crate::testing::{MockApi, restaurant};

    fn feed_with(count: usize, page_size: u32) -> (Arc<MockApi>, RestaurantFeed) {
        let restaurants = (1..=count)
            .map(|i| restaurant(&format!("r{i}"), &format!("Place {i}"), &["Indian"]))
            .chain(std::iter::once(restaurant("pz", "Pizza Hut", &["Pizza"])))
            .collect();
        let api = Arc::new(MockApi::new().with_restaurants(restaurants));
        let catalog = CatalogService::new(Arc::clone(&api) as Arc<dyn StorefrontApi>, page_size);
        (api, RestaurantFeed::new(catalog, Some(RestaurantType::FoodDelivery)))
    }

    #[tokio::test]
    async fn test_load_more_appends_next_page() {
        // 4 "Place" restaurants + Pizza Hut = 5, three per page
        let (api, mut feed) = feed_with(4, 3);
        assert_eq!(feed.title(), "Food Delivery");

        feed.load().await.unwrap();
        assert_eq!(feed.restaurants().len(), 3);
        assert_eq!(feed.total_pages(), 2);
        assert!(feed.has_more());

        assert!(feed.load_more().await.unwrap());
        assert_eq!(feed.restaurants().len(), 5);
        assert_eq!(feed.page(), 2);
        assert!(!feed.has_more());

        assert!(!feed.load_more().await.unwrap());
        assert_eq!(api.count("list_restaurants"), 2);
    }

    #[tokio::test]
    async fn test_search_resets_to_first_page() {
        let (_, mut feed) = feed_with(4, 3);
        feed.load().await.unwrap();
        feed.load_more().await.unwrap();
        assert_eq!(feed.page(), 2);

        feed.search("pizza").await.unwrap();
        assert_eq!(feed.page(), 1);
        assert_eq!(feed.search_term(), Some("pizza"));
        assert_eq!(feed.restaurants().len(), 1);
        assert_eq!(feed.restaurants()[0].restaurant_name, "Pizza Hut");

        feed.search("  ").await.unwrap();
        assert_eq!(feed.search_term(), None);
        assert_eq!(feed.restaurants().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_page_keeps_list() {
        let (api, mut feed) = feed_with(4, 3);
        feed.load().await.unwrap();

        api.fail("list_restaurants");
        assert!(feed.load_more().await.is_err());
        assert_eq!(feed.restaurants().len(), 3);
        assert_eq!(feed.page(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_search_only_sends_last_term() {
        let (api, feed) = feed_with(4, 12);
        let search = LiveSearch::new(feed, Debouncer::new(Duration::from_millis(500)));
        let mut rx = search.subscribe();

        search.input("p");
        search.input("pi");
        search.input("pizza");
        assert!(search.is_pending());

        rx.changed().await.unwrap();
        let results = rx.borrow_and_update().clone();
        assert_eq!(results.term.as_deref(), Some("pizza"));
        assert_eq!(results.restaurants.len(), 1);
        assert_eq!(api.count("list_restaurants"), 1);
    }
}
