//! `reqwest` implementation of the storefront API.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, instrument, warn};
use url::Url;

use tiffin_core::{
    CartItem, CartSummary, CartType, Email, MenuItem, Order, RestaurantId, RestaurantSummary,
    UserProfile,
};

use super::types::{CartData, Envelope, ErrorBody};
use super::{
    AddToCartRequest, ApiError, PlaceOrderRequest, RemoveItemRequest, RestaurantPage,
    RestaurantQuery, StorefrontApi, UpdateQuantityRequest,
};
use crate::config::StorefrontConfig;

/// Longest slice of a response body copied into logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront JSON API.
///
/// Cheap to clone; clones share the connection pool and the cookie jar.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    // Swapped for a fresh client on logout so the old session cookie is gone
    // even if the server never answered.
    http: RwLock<reqwest::Client>,
    base_url: Url,
    timeout: std::time::Duration,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let http = build_http_client(config.request_timeout)?;
        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http: RwLock::new(http),
                base_url: config.api_url.clone(),
                timeout: config.request_timeout,
            }),
        })
    }

    /// The API base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner.http.read().request(method, url)
    }

    /// Drop all cookies by replacing the underlying client.
    fn reset_session(&self) {
        match build_http_client(self.inner.timeout) {
            Ok(fresh) => *self.inner.http.write() = fresh,
            Err(e) => warn!(error = %e, "Failed to rebuild HTTP client; keeping cookie jar"),
        }
    }

    /// Send a request and unwrap the response envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_owned();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let message = parsed
                .message
                .or(parsed.error)
                .or_else(|| status.canonical_reason().map(str::to_owned))
                .unwrap_or_default();
            warn!(
                status = %status,
                path = %url,
                message = %message,
                "Storefront API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %url,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Failed to parse storefront API response"
            );
            ApiError::Parse(e.to_string())
        })?;

        if !envelope.success {
            let message = envelope
                .message
                .clone()
                .unwrap_or_else(|| "request was not successful".to_string());
            debug!(path = %url, message = %message, "Storefront API rejected request");
            return Err(ApiError::Rejected(message));
        }

        Ok(envelope)
    }

    /// Send a request whose envelope must carry `data`.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        self.send::<T>(request)
            .await?
            .data
            .ok_or_else(|| ApiError::Parse("response has no data".to_string()))
    }

    /// Send a request where only success matters.
    async fn execute(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send::<IgnoredAny>(request).await.map(|_| ())
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.request(Method::GET, self.endpoint(path)?))
    }

    fn with_body<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self.request(method, self.endpoint(path)?).json(body))
    }
}

fn build_http_client(timeout: std::time::Duration) -> Result<reqwest::Client, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Ok(reqwest::Client::builder()
        .cookie_store(true)
        .timeout(timeout)
        .default_headers(headers)
        .build()?)
}

// =============================================================================
// StorefrontApi
// =============================================================================

#[async_trait]
impl StorefrontApi for ApiClient {
    #[instrument(skip(self))]
    async fn current_profile(&self) -> Result<UserProfile, ApiError> {
        self.fetch(self.get("user/profile")?).await
    }

    #[instrument(skip(self), fields(email = %email))]
    async fn request_otp(&self, email: &Email) -> Result<(), ApiError> {
        let body = serde_json::json!({ "email": email });
        self.execute(self.with_body(Method::POST, "auth/request-otp", &body)?)
            .await
    }

    #[instrument(skip(self, otp), fields(email = %email))]
    async fn verify_otp(&self, email: &Email, otp: &SecretString) -> Result<UserProfile, ApiError> {
        let body = serde_json::json!({ "email": email, "otp": otp.expose_secret() });
        self.fetch(self.with_body(Method::POST, "auth/verify-otp", &body)?)
            .await
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<(), ApiError> {
        let result = match self.endpoint("auth/logout") {
            Ok(url) => self.execute(self.request(Method::POST, url)).await,
            Err(e) => Err(e),
        };
        self.reset_session();
        result
    }

    #[instrument(skip(self), fields(page = query.page, search = ?query.search))]
    async fn list_restaurants(&self, query: &RestaurantQuery) -> Result<RestaurantPage, ApiError> {
        let mut url = self.endpoint("restaurants")?;
        query.apply_to(&mut url);

        let envelope = self
            .send::<Vec<RestaurantSummary>>(self.request(Method::GET, url))
            .await?;

        Ok(RestaurantPage {
            restaurants: envelope.data.unwrap_or_default(),
            page: query.page,
            total_pages: envelope.total_pages.unwrap_or(query.page),
        })
    }

    #[instrument(skip(self), fields(restaurant_id = %id))]
    async fn restaurant(&self, id: &RestaurantId) -> Result<RestaurantSummary, ApiError> {
        self.fetch(self.get(&format!("restaurants/{id}"))?).await
    }

    #[instrument(skip(self), fields(restaurant_id = %id))]
    async fn menu(
        &self,
        id: &RestaurantId,
        available: Option<bool>,
    ) -> Result<Vec<MenuItem>, ApiError> {
        let mut url = self.endpoint(&format!("menu-items/restaurant/{id}"))?;
        if let Some(available) = available {
            url.query_pairs_mut()
                .append_pair("isAvailable", if available { "true" } else { "false" });
        }

        let envelope = self
            .send::<Vec<MenuItem>>(self.request(Method::GET, url))
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn cart_items(&self) -> Result<Vec<CartItem>, ApiError> {
        let envelope = self.send::<CartData>(self.get("cart")?).await?;
        Ok(envelope.data.unwrap_or_default().food_cart)
    }

    #[instrument(skip(self))]
    async fn cart_summary(&self, cart_type: CartType) -> Result<Option<CartSummary>, ApiError> {
        let mut url = self.endpoint("cart/summary")?;
        url.query_pairs_mut()
            .append_pair("cartType", cart_type.as_str());

        let envelope = self
            .send::<CartSummary>(self.request(Method::GET, url))
            .await?;
        Ok(envelope.data)
    }

    #[instrument(
        skip(self),
        fields(menu_item_id = %request.menu_item_id, quantity = request.quantity)
    )]
    async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<(), ApiError> {
        self.execute(self.with_body(Method::POST, "cart/add", request)?)
            .await
    }

    #[instrument(
        skip(self),
        fields(cart_item_key = %request.cart_item_key, quantity = request.quantity)
    )]
    async fn update_cart_quantity(&self, request: &UpdateQuantityRequest) -> Result<(), ApiError> {
        self.execute(self.with_body(Method::PUT, "cart/update-quantity", request)?)
            .await
    }

    #[instrument(skip(self), fields(cart_item_key = %request.cart_item_key))]
    async fn remove_cart_item(&self, request: &RemoveItemRequest) -> Result<(), ApiError> {
        self.execute(self.with_body(Method::DELETE, "cart/remove-item", request)?)
            .await
    }

    #[instrument(skip(self, request))]
    async fn place_cash_order(&self, request: &PlaceOrderRequest) -> Result<Order, ApiError> {
        self.fetch(self.with_body(Method::POST, "orders/place-cash-order", request)?)
            .await
    }

    #[instrument(skip(self))]
    async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        let envelope = self
            .send::<Vec<Order>>(self.get("orders/user/my-orders")?)
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }
}
