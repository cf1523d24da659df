//! In-memory `StorefrontApi` used by the store tests.
//!
//! Behaves like a tiny backend: it keeps a session flag, prices cart lines
//! from a price table, and records every call so tests can assert on traffic.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Notify;

use tiffin_core::{
    CartItem, CartItemKey, CartSummary, CartType, DietaryType, Email, MenuItem, MenuItemId,
    MenuItemRef, Order, OrderId, OrderLine, OrderStatus, Price, RestaurantId, RestaurantSummary,
    UserId, UserProfile,
};

use crate::api::{
    AddToCartRequest, ApiError, PlaceOrderRequest, RemoveItemRequest, RestaurantPage,
    RestaurantQuery, StorefrontApi, UpdateQuantityRequest,
};

pub const OTP: &str = "123456";
const DEFAULT_UNIT_PAISE: i64 = 10_000;

pub fn user() -> UserProfile {
    UserProfile {
        id: UserId::new("u1"),
        name: Some("Asha".to_string()),
        email: Email::parse("asha@example.com").unwrap(),
        phone: None,
    }
}

pub fn restaurant(id: &str, name: &str, cuisines: &[&str]) -> RestaurantSummary {
    serde_json::from_value(serde_json::json!({
        "_id": id,
        "restaurantName": name,
        "cuisineTypes": cuisines,
    }))
    .unwrap()
}

pub fn menu_item(id: &str, name: &str, kind: DietaryType, category: &str, paise: i64) -> MenuItem {
    serde_json::from_value(serde_json::json!({
        "_id": id,
        "itemName": name,
        "itemType": kind.as_str(),
        "category": category,
        "basePrice": Price::from_paise(paise),
    }))
    .unwrap()
}

#[derive(Debug, Clone)]
struct Line {
    key: CartItemKey,
    menu_item_id: MenuItemId,
    quantity: u32,
    unit_paise: i64,
}

#[derive(Default)]
struct Backend {
    signed_in: bool,
    profile_expired: bool,
    lines: Vec<Line>,
    next_key: u32,
    restaurants: Vec<RestaurantSummary>,
    menu: Vec<MenuItem>,
    prices: HashMap<MenuItemId, i64>,
    orders: Vec<Order>,
    failing: HashSet<&'static str>,
}

#[derive(Default)]
pub struct MockApi {
    backend: Mutex<Backend>,
    calls: Mutex<Vec<&'static str>>,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that already has a session cookie for [`user`].
    pub fn signed_in() -> Self {
        let api = Self::new();
        api.backend.lock().signed_in = true;
        api
    }

    /// Answer the profile endpoint with 401, as for a stale cookie.
    pub fn expire_profile(self) -> Self {
        self.backend.lock().profile_expired = true;
        self
    }

    pub fn with_restaurants(self, restaurants: Vec<RestaurantSummary>) -> Self {
        self.backend.lock().restaurants = restaurants;
        self
    }

    pub fn with_menu(self, menu: Vec<MenuItem>) -> Self {
        self.backend.lock().menu = menu;
        self
    }

    /// Price new lines of `menu_item_id` at `paise` each.
    pub fn with_price(self, menu_item_id: &str, paise: i64) -> Self {
        self.backend
            .lock()
            .prices
            .insert(MenuItemId::new(menu_item_id), paise);
        self
    }

    /// Seed a cart line directly, returning its key.
    pub fn seed_line(&self, menu_item_id: &str, quantity: u32) -> CartItemKey {
        let mut backend = self.backend.lock();
        backend.next_key += 1;
        let key = CartItemKey::new(format!("key-{}", backend.next_key));
        let id = MenuItemId::new(menu_item_id);
        let unit_paise = backend.prices.get(&id).copied().unwrap_or(DEFAULT_UNIT_PAISE);
        backend.lines.push(Line {
            key: key.clone(),
            menu_item_id: id,
            quantity,
            unit_paise,
        });
        key
    }

    /// Make `endpoint` fail with a transport error until [`Self::recover`].
    pub fn fail(&self, endpoint: &'static str) {
        self.backend.lock().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.backend.lock().failing.remove(endpoint);
    }

    /// Park cart mutations until the returned notifier fires.
    pub fn hold_mutations(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold.lock() = Some(Arc::clone(&notify));
        notify
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == endpoint).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn line_count(&self) -> usize {
        self.backend.lock().lines.len()
    }

    fn record(&self, endpoint: &'static str) -> Result<(), ApiError> {
        self.calls.lock().push(endpoint);
        if self.backend.lock().failing.contains(endpoint) {
            return Err(ApiError::Transport(format!("{endpoint} unavailable")));
        }
        Ok(())
    }

    fn require_session(&self) -> Result<(), ApiError> {
        if self.backend.lock().signed_in {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: 401,
                message: "Not authenticated".to_string(),
            })
        }
    }

    async fn wait_if_held(&self) {
        let hold = self.hold.lock().clone();
        if let Some(notify) = hold {
            notify.notified().await;
        }
    }
}

fn cart_item(line: &Line) -> CartItem {
    CartItem {
        cart_item_key: line.key.clone(),
        menu_item: MenuItemRef::Id(line.menu_item_id.clone()),
        quantity: line.quantity,
        total_price: Price::from_paise(line.unit_paise * i64::from(line.quantity)),
        item_name: None,
        unit_price: Some(Price::from_paise(line.unit_paise)),
    }
}

#[async_trait]
impl StorefrontApi for MockApi {
    async fn current_profile(&self) -> Result<UserProfile, ApiError> {
        self.record("current_profile")?;
        let backend = self.backend.lock();
        if backend.profile_expired {
            return Err(ApiError::Status {
                status: 401,
                message: "Session expired".to_string(),
            });
        }
        if backend.signed_in {
            Ok(user())
        } else {
            Err(ApiError::Rejected("Not authenticated".to_string()))
        }
    }

    async fn request_otp(&self, _email: &Email) -> Result<(), ApiError> {
        self.record("request_otp")
    }

    async fn verify_otp(&self, email: &Email, otp: &SecretString) -> Result<UserProfile, ApiError> {
        self.record("verify_otp")?;
        if otp.expose_secret() != OTP {
            return Err(ApiError::Status {
                status: 400,
                message: "Invalid or expired OTP".to_string(),
            });
        }
        self.backend.lock().signed_in = true;
        Ok(UserProfile {
            email: email.clone(),
            ..user()
        })
    }

    async fn logout(&self) -> Result<(), ApiError> {
        // The cookie is gone locally whether or not the server heard us.
        let result = self.record("logout");
        self.backend.lock().signed_in = false;
        result
    }

    async fn list_restaurants(&self, query: &RestaurantQuery) -> Result<RestaurantPage, ApiError> {
        self.record("list_restaurants")?;
        let backend = self.backend.lock();
        let matching: Vec<_> = backend
            .restaurants
            .iter()
            .filter(|r| {
                query.search.as_deref().is_none_or(|s| {
                    r.restaurant_name
                        .to_lowercase()
                        .contains(&s.to_lowercase())
                })
            })
            .cloned()
            .collect();

        let limit = query.limit.max(1) as usize;
        let total_pages = u32::try_from(matching.len().div_ceil(limit))
            .unwrap_or(u32::MAX)
            .max(1);
        let start = (query.page.saturating_sub(1) as usize) * limit;
        Ok(RestaurantPage {
            restaurants: matching.into_iter().skip(start).take(limit).collect(),
            page: query.page,
            total_pages,
        })
    }

    async fn restaurant(&self, id: &RestaurantId) -> Result<RestaurantSummary, ApiError> {
        self.record("restaurant")?;
        self.backend
            .lock()
            .restaurants
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "Restaurant not found".to_string(),
            })
    }

    async fn menu(
        &self,
        _id: &RestaurantId,
        _available: Option<bool>,
    ) -> Result<Vec<MenuItem>, ApiError> {
        self.record("menu")?;
        Ok(self.backend.lock().menu.clone())
    }

    async fn cart_items(&self) -> Result<Vec<CartItem>, ApiError> {
        self.record("cart_items")?;
        self.require_session()?;
        Ok(self.backend.lock().lines.iter().map(cart_item).collect())
    }

    async fn cart_summary(&self, _cart_type: CartType) -> Result<Option<CartSummary>, ApiError> {
        self.record("cart_summary")?;
        self.require_session()?;
        let backend = self.backend.lock();
        if backend.lines.is_empty() {
            return Ok(None);
        }
        let total: i64 = backend
            .lines
            .iter()
            .map(|l| l.unit_paise * i64::from(l.quantity))
            .sum();
        Ok(Some(CartSummary {
            total_amount: Price::from_paise(total),
            subtotal: Some(Price::from_paise(total)),
            tax_amount: None,
            delivery_fee: None,
            handling_charges: None,
            discount: None,
            item_count: Some(backend.lines.iter().map(|l| l.quantity).sum()),
        }))
    }

    async fn add_to_cart(&self, request: &AddToCartRequest) -> Result<(), ApiError> {
        self.record("add_to_cart")?;
        self.wait_if_held().await;
        self.require_session()?;

        let mut backend = self.backend.lock();
        if let Some(line) = backend
            .lines
            .iter_mut()
            .find(|l| l.menu_item_id == request.menu_item_id)
        {
            line.quantity += request.quantity;
            return Ok(());
        }
        backend.next_key += 1;
        let key = CartItemKey::new(format!("key-{}", backend.next_key));
        let unit_paise = backend
            .prices
            .get(&request.menu_item_id)
            .copied()
            .unwrap_or(DEFAULT_UNIT_PAISE);
        backend.lines.push(Line {
            key,
            menu_item_id: request.menu_item_id.clone(),
            quantity: request.quantity,
            unit_paise,
        });
        Ok(())
    }

    async fn update_cart_quantity(&self, request: &UpdateQuantityRequest) -> Result<(), ApiError> {
        self.record("update_cart_quantity")?;
        self.wait_if_held().await;
        self.require_session()?;

        let mut backend = self.backend.lock();
        let line = backend
            .lines
            .iter_mut()
            .find(|l| l.key == request.cart_item_key)
            .ok_or_else(|| ApiError::Rejected("Item not in cart".to_string()))?;
        line.quantity = request.quantity;
        Ok(())
    }

    async fn remove_cart_item(&self, request: &RemoveItemRequest) -> Result<(), ApiError> {
        self.record("remove_cart_item")?;
        self.wait_if_held().await;
        self.require_session()?;
        self.backend
            .lock()
            .lines
            .retain(|l| l.key != request.cart_item_key);
        Ok(())
    }

    async fn place_cash_order(&self, request: &PlaceOrderRequest) -> Result<Order, ApiError> {
        self.record("place_cash_order")?;
        self.require_session()?;

        let mut backend = self.backend.lock();
        if backend.lines.is_empty() {
            return Err(ApiError::Rejected("Cart is empty".to_string()));
        }
        let items: Vec<OrderLine> = backend
            .lines
            .iter()
            .map(|l| OrderLine {
                item_name: Some(l.menu_item_id.to_string()),
                quantity: l.quantity,
                total_price: Some(Price::from_paise(l.unit_paise * i64::from(l.quantity))),
            })
            .collect();
        let total: i64 = backend
            .lines
            .iter()
            .map(|l| l.unit_paise * i64::from(l.quantity))
            .sum();
        let order = Order {
            id: OrderId::new(format!("o{}", backend.orders.len() + 1)),
            order_number: Some(format!("ORD-{:04}", backend.orders.len() + 1)),
            status: OrderStatus::Pending,
            payment_method: Some("cash".to_string()),
            payment_status: None,
            total_amount: Price::from_paise(total),
            items,
            delivery_address: Some(request.delivery_address.clone()),
            notes: Some(request.notes.clone()),
            created_at: None,
        };
        backend.lines.clear();
        backend.orders.push(order.clone());
        Ok(order)
    }

    async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.record("my_orders")?;
        self.require_session()?;
        Ok(self.backend.lock().orders.clone())
    }
}
