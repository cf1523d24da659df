//! Application context shared by every view.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::warn;

use tiffin_core::{Order, RestaurantType, UserProfile};

use crate::api::{ApiClient, ApiError, StorefrontApi};
use crate::cart::CartStore;
use crate::catalog::CatalogService;
use crate::config::StorefrontConfig;
use crate::debounce::Debouncer;
use crate::feed::{LiveSearch, RestaurantFeed};
use crate::orders::{OrderError, OrderService};
use crate::session::{AuthError, Navigation, SessionState, SessionStore};

/// Owns one of each store and keeps the cart following the session.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    session: SessionStore,
    cart: CartStore,
    catalog: CatalogService,
    orders: OrderService,
}

impl Storefront {
    /// Create a context talking to the configured API over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        Ok(Self::with_api(config, Arc::new(api)))
    }

    /// Create a context over any API implementation.
    #[must_use]
    pub fn with_api(config: StorefrontConfig, api: Arc<dyn StorefrontApi>) -> Self {
        let session = SessionStore::new(Arc::clone(&api));
        let cart = CartStore::new(Arc::clone(&api), session.subscribe());
        let catalog = CatalogService::new(Arc::clone(&api), config.page_size);
        let orders = OrderService::new(api);

        Self {
            inner: Arc::new(StorefrontInner {
                config,
                session,
                cart,
                catalog,
                orders,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    /// Resolve the session and, if signed in, load the cart.
    pub async fn start(&self) -> SessionState {
        let state = self.inner.session.initialize().await;
        self.sync_cart(&state).await;
        state
    }

    /// Sign in, then load the cart.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the login fails; nothing changes then.
    pub async fn login(&self, email: &str, otp: SecretString) -> Result<UserProfile, AuthError> {
        let user = self.inner.session.login(email, otp).await?;
        self.sync_cart(&self.inner.session.state()).await;
        Ok(user)
    }

    /// Sign out and clear the cart.
    pub async fn logout(&self) -> Navigation {
        let navigation = self.inner.session.logout().await;
        self.sync_cart(&self.inner.session.state()).await;
        navigation
    }

    /// Place a cash-on-delivery order, then refetch the emptied cart.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] if the address is blank or the server refuses.
    pub async fn place_order(&self, address: &str, notes: &str) -> Result<Order, OrderError> {
        let order = self.inner.orders.place_cash_order(address, notes).await?;
        if let Err(e) = self.inner.cart.refresh().await {
            warn!(error = %e, "Cart refresh after order failed");
        }
        Ok(order)
    }

    /// A restaurant listing for `kind`, not yet loaded.
    #[must_use]
    pub fn restaurant_feed(&self, kind: Option<RestaurantType>) -> RestaurantFeed {
        RestaurantFeed::new(self.inner.catalog.clone(), kind)
    }

    /// Debounced search over a listing for `kind`.
    #[must_use]
    pub fn live_search(&self, kind: Option<RestaurantType>) -> LiveSearch {
        LiveSearch::new(
            self.restaurant_feed(kind),
            Debouncer::new(self.inner.config.search_debounce),
        )
    }

    async fn sync_cart(&self, state: &SessionState) {
        if let Err(e) = self.inner.cart.reconcile(state).await {
            warn!(error = %e, "Cart sync after session change failed");
        }
    }
}
