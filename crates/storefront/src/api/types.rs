//! Request and response shapes for the storefront API.

use serde::{Deserialize, Serialize};
use url::Url;

use tiffin_core::{
    CartItem, CartItemKey, CartType, DeliveryAddress, MenuItemId, RestaurantSummary,
    RestaurantType,
};

// =============================================================================
// Envelope
// =============================================================================

/// The `{success, data, message}` wrapper around every response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub total_pages: Option<u32>,
}

/// Error bodies only need the message.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

/// `data` of `GET /cart`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CartData {
    #[serde(rename = "foodCart", default)]
    pub food_cart: Vec<CartItem>,
}

// =============================================================================
// Restaurant listing
// =============================================================================

/// Query for `GET /restaurants`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantQuery {
    pub kind: Option<RestaurantType>,
    pub search: Option<String>,
    pub accepts_dining: Option<bool>,
    pub page: u32,
    pub limit: u32,
}

impl RestaurantQuery {
    /// First page of an unfiltered listing.
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self {
            kind: None,
            search: None,
            accepts_dining: None,
            page: 1,
            limit,
        }
    }

    /// Narrow to one service line.
    #[must_use]
    pub const fn with_kind(mut self, kind: Option<RestaurantType>) -> Self {
        self.kind = kind;
        self
    }

    /// Server-side search text; blank text clears it.
    #[must_use]
    pub fn with_search(mut self, search: &str) -> Self {
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_owned());
        self
    }

    /// Only restaurants that take dine-in guests.
    #[must_use]
    pub const fn with_accepts_dining(mut self, accepts_dining: Option<bool>) -> Self {
        self.accepts_dining = accepts_dining;
        self
    }

    /// Jump to a 1-based page.
    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = if page == 0 { 1 } else { page };
        self
    }

    /// Append the query string to `url`.
    pub fn apply_to(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        if let Some(kind) = self.kind {
            pairs.append_pair("type", kind.as_str());
        }
        if let Some(search) = &self.search {
            pairs.append_pair("search", search);
        }
        if let Some(accepts_dining) = self.accepts_dining {
            pairs.append_pair("acceptsDining", if accepts_dining { "true" } else { "false" });
        }
        pairs.append_pair("page", &self.page.to_string());
        pairs.append_pair("limit", &self.limit.to_string());
    }
}

/// One page of restaurants.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RestaurantPage {
    pub restaurants: Vec<RestaurantSummary>,
    pub page: u32,
    pub total_pages: u32,
}

impl RestaurantPage {
    /// Whether a later page exists.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

// =============================================================================
// Cart and order requests
// =============================================================================

/// Body of `POST /cart/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    pub cart_type: CartType,
}

/// Body of `PUT /cart/update-quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub cart_type: CartType,
    pub cart_item_key: CartItemKey,
    pub quantity: u32,
}

/// Body of `DELETE /cart/remove-item`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub cart_type: CartType,
    pub cart_item_key: CartItemKey,
}

/// Body of `POST /orders/place-cash-order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub cart_type: CartType,
    pub delivery_address: DeliveryAddress,
    pub notes: String,
}
