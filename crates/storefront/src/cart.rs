//! Cart store: the locally held copy of the server cart.
//!
//! The server is authoritative. Every mutation is sent, then the whole cart
//! (items and summary) is fetched again; nothing is recomputed locally.
//!
//! # Rules
//!
//! - Session becomes authenticated: fetch items and summary together and
//!   commit only if both arrive.
//! - Session becomes unauthenticated: clear, without a request.
//! - A mutation while signed out fails with [`CartError::LoginRequired`] and
//!   sends nothing.
//! - One mutation at a time. Another mutation issued while one is in flight
//!   fails with [`CartError::Busy`] and sends nothing.
//! - A failed mutation or refetch leaves the last loaded cart in place.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use tiffin_core::{Cart, CartItem, CartItemKey, CartSummary, CartType, MenuItemId, Price};

use crate::api::{
    self, AddToCartRequest, ApiError, StorefrontApi, UpdateQuantityRequest,
};
use crate::error::add_breadcrumb;
use crate::session::SessionState;

const CART_TYPE: CartType = CartType::FoodCart;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The customer is not signed in.
    #[error("Please log in to add items to your cart")]
    LoginRequired,

    /// Another cart change is still being applied.
    #[error("Your cart is being updated, please wait")]
    Busy,

    /// Items are added one or more at a time.
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// The server refused the change or could not be reached.
    #[error("Cart update failed: {0}")]
    Api(#[from] ApiError),
}

impl CartError {
    /// Message suitable for showing to a customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// A consistent copy of the cart store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartSnapshot {
    pub cart: Cart,
    /// Whether a fetch has completed since the last sign-in.
    pub loaded: bool,
    /// Whether a mutation is in flight.
    pub busy: bool,
}

#[derive(Debug, Default)]
struct CartState {
    cart: Cart,
    loaded: bool,
}

/// Holds the cart and applies changes through the API.
pub struct CartStore {
    api: Arc<dyn StorefrontApi>,
    session: watch::Receiver<SessionState>,
    state: RwLock<CartState>,
    busy: AtomicBool,
}

/// Marks the store busy until dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, CartError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| CartError::Busy)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CartStore {
    /// Create a store that follows the session published on `session`.
    #[must_use]
    pub fn new(api: Arc<dyn StorefrontApi>, session: watch::Receiver<SessionState>) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(CartState::default()),
            busy: AtomicBool::new(false),
        }
    }

    /// A consistent copy of the cart and its flags.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        let state = self.state.read();
        CartSnapshot {
            cart: state.cart.clone(),
            loaded: state.loaded,
            busy: self.is_busy(),
        }
    }

    /// Cart lines in server order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.state.read().cart.items().to_vec()
    }

    /// Server-computed summary, if one is loaded.
    #[must_use]
    pub fn summary(&self) -> Option<CartSummary> {
        self.state.read().cart.summary().cloned()
    }

    /// Server-computed total, if a summary is loaded.
    #[must_use]
    pub fn total_amount(&self) -> Option<Price> {
        self.state.read().cart.total_amount()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.state.read().cart.item_count()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn is_authenticated(&self) -> bool {
        self.session.borrow().is_authenticated()
    }

    fn clear(&self) {
        *self.state.write() = CartState::default();
    }

    /// Bring the cart in line with a session transition.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Api`] if the fetch after sign-in fails; the
    /// previous cart is kept.
    pub async fn reconcile(&self, session: &SessionState) -> Result<(), CartError> {
        match session {
            SessionState::Authenticated(_) => self.refresh().await,
            SessionState::Unauthenticated => {
                debug!("Session ended; clearing cart");
                self.clear();
                Ok(())
            }
            SessionState::Unknown => Ok(()),
        }
    }

    /// Fetch items and summary together and replace the local cart.
    ///
    /// Signed out, this just clears the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Api`] if either request fails. Nothing is
    /// committed in that case.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), CartError> {
        if !self.is_authenticated() {
            self.clear();
            return Ok(());
        }

        let (items, summary) = tokio::try_join!(
            self.api.cart_items(),
            self.api.cart_summary(CART_TYPE)
        )
        .map_err(|e| {
            warn!(error = %e, "Cart refresh failed; keeping last loaded cart");
            e
        })?;

        // Signed out while the fetch was in flight.
        if !self.is_authenticated() {
            self.clear();
            return Ok(());
        }

        let cart = Cart::new(items, summary);
        debug!(lines = cart.items().len(), "Cart refreshed");
        *self.state.write() = CartState { cart, loaded: true };
        Ok(())
    }

    /// Add `quantity` units of a menu item, then refetch.
    ///
    /// # Errors
    ///
    /// - [`CartError::LoginRequired`] when signed out (no request is sent)
    /// - [`CartError::InvalidQuantity`] for a zero quantity
    /// - [`CartError::Busy`] while another change is in flight
    /// - [`CartError::Api`] if the server rejects the add
    #[instrument(skip(self), fields(menu_item_id = %menu_item_id))]
    pub async fn add_to_cart(
        &self,
        menu_item_id: &MenuItemId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if !self.is_authenticated() {
            return Err(CartError::LoginRequired);
        }
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let _busy = BusyGuard::acquire(&self.busy)?;

        self.api
            .add_to_cart(&AddToCartRequest {
                menu_item_id: menu_item_id.clone(),
                quantity,
                cart_type: CART_TYPE,
            })
            .await?;

        info!(quantity, "Added to cart");
        add_breadcrumb(
            "cart",
            "Added item",
            Some(&[("menu_item_id", menu_item_id.as_str())]),
        );
        self.refetch_after_mutation().await;
        Ok(())
    }

    /// Set a line's quantity, then refetch.
    ///
    /// A quantity of zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Same as [`Self::add_to_cart`], minus the quantity check.
    #[instrument(skip(self), fields(cart_item_key = %key))]
    pub async fn update_quantity(&self, key: &CartItemKey, quantity: i64) -> Result<(), CartError> {
        if !self.is_authenticated() {
            return Err(CartError::LoginRequired);
        }
        let _busy = BusyGuard::acquire(&self.busy)?;

        match u32::try_from(quantity) {
            Ok(quantity) if quantity > 0 => {
                self.api
                    .update_cart_quantity(&UpdateQuantityRequest {
                        cart_type: CART_TYPE,
                        cart_item_key: key.clone(),
                        quantity,
                    })
                    .await?;
                info!(quantity, "Updated cart quantity");
            }
            _ => {
                self.api.remove_cart_item(&api::remove_request(key)).await?;
                info!("Removed cart line");
            }
        }

        self.refetch_after_mutation().await;
        Ok(())
    }

    /// Remove a line, then refetch.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_quantity`].
    pub async fn remove_item(&self, key: &CartItemKey) -> Result<(), CartError> {
        self.update_quantity(key, 0).await
    }

    // The mutation already went through; a failed refetch only means the
    // local copy is stale until the next refresh.
    async fn refetch_after_mutation(&self) {
        if let Err(e) = self.refresh().await {
            debug!(error = %e, "Refetch after mutation failed");
        }
    }
}
