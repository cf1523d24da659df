//! Storefront API gateway.
//!
//! # Architecture
//!
//! - [`StorefrontApi`] is the seam every store talks through; the stores never
//!   see `reqwest` directly, which keeps them testable with an in-memory fake.
//! - [`ApiClient`] is the production implementation: one `reqwest` client with
//!   a cookie jar, so the session cookie set by `verify-otp` rides along on
//!   every later request.
//! - The API is the source of truth - nothing is cached locally.
//!
//! # Responses
//!
//! Every endpoint answers `{ success, data?, message?, totalPages? }`. A
//! non-2xx status or `success: false` is a failure; the server message is kept
//! so the View Layer can show it.

mod client;
pub mod types;

pub use client::ApiClient;
pub use types::*;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use tiffin_core::{
    CartItem, CartItemKey, CartSummary, CartType, Email, MenuItem, Order, RestaurantId,
    RestaurantSummary, UserProfile,
};

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("Network error: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The API answered 2xx but with `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether the server refused the request for lack of a valid session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    /// Whether the failure happened below HTTP.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Message suitable for showing to a customer.
    ///
    /// Server-provided messages are passed through; transport and parsing
    /// details are not.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::Rejected(message) if !message.is_empty() => {
                message.clone()
            }
            Self::Transport(_) => "Could not reach the server. Check your connection.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Operations the storefront API offers.
///
/// Implemented by [`ApiClient`]; tests substitute an in-memory fake.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// `GET /user/profile`
    async fn current_profile(&self) -> Result<UserProfile, ApiError>;

    /// `POST /auth/request-otp`
    async fn request_otp(&self, email: &Email) -> Result<(), ApiError>;

    /// `POST /auth/verify-otp`
    async fn verify_otp(&self, email: &Email, otp: &SecretString) -> Result<UserProfile, ApiError>;

    /// `POST /auth/logout`
    async fn logout(&self) -> Result<(), ApiError>;

    /// `GET /restaurants`
    async fn list_restaurants(&self, query: &RestaurantQuery) -> Result<RestaurantPage, ApiError>;

    /// `GET /restaurants/:id`
    async fn restaurant(&self, id: &RestaurantId) -> Result<RestaurantSummary, ApiError>;

    /// `GET /menu-items/restaurant/:id`
    async fn menu(
        &self,
        id: &RestaurantId,
        available: Option<bool>,
    ) -> Result<Vec<MenuItem>, ApiError>;

    /// `GET /cart`
    async fn cart_items(&self) -> Result<Vec<CartItem>, ApiError>;

    /// `GET /cart/summary`; `None` when the server has nothing to summarize.
    async fn cart_summary(&self, cart_type: CartType) -> Result<Option<CartSummary>, ApiError>;

    /// `POST /cart/add`
    async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<(), ApiError>;

    /// `PUT /cart/update-quantity`
    async fn update_cart_quantity(&self, request: &UpdateQuantityRequest) -> Result<(), ApiError>;

    /// `DELETE /cart/remove-item`
    async fn remove_cart_item(&self, request: &RemoveItemRequest) -> Result<(), ApiError>;

    /// `POST /orders/place-cash-order`
    async fn place_cash_order(&self, request: &PlaceOrderRequest) -> Result<Order, ApiError>;

    /// `GET /orders/user/my-orders`
    async fn my_orders(&self) -> Result<Vec<Order>, ApiError>;
}

/// Convenience for building a remove request for the single cart type in use.
#[must_use]
pub fn remove_request(key: &CartItemKey) -> RemoveItemRequest {
    RemoveItemRequest {
        cart_type: CartType::FoodCart,
        cart_item_key: key.clone(),
    }
}
