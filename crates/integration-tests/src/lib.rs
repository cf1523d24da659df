//! Integration tests for Tiffin.
//!
//! The tests drive a real [`Storefront`](tiffin_storefront::Storefront) over
//! HTTP against [`StubApi`], an in-process axum server that speaks the
//! food-delivery API: `{success, data, message}` envelopes, a `session`
//! cookie set by OTP login, and a cart that lives on the server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tiffin-integration-tests
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use tiffin_storefront::StorefrontConfig;

/// The one-time code the stub accepts.
pub const OTP: &str = "424242";

const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone)]
struct Line {
    key: String,
    menu_item_id: String,
    quantity: u32,
}

#[derive(Default)]
struct Backend {
    users: HashMap<String, Value>,
    sessions: HashMap<String, String>,
    next_session: u32,
    otp_requests: Vec<String>,
    restaurants: Vec<Value>,
    menus: HashMap<String, Vec<Value>>,
    prices: HashMap<String, u32>,
    carts: HashMap<String, Vec<Line>>,
    next_line: u32,
    orders: HashMap<String, Vec<Value>>,
    /// `(path, had session cookie)` for every request, in arrival order.
    log: Vec<(String, bool)>,
}

type Shared = Arc<Mutex<Backend>>;

/// An in-process storefront API bound to an ephemeral local port.
pub struct StubApi {
    addr: SocketAddr,
    backend: Shared,
    server: JoinHandle<()>,
}

impl StubApi {
    /// Start the stub with one registered customer, `asha@example.com`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let backend: Shared = Arc::default();
        backend.lock().users.insert(
            "asha@example.com".to_owned(),
            json!({"_id": "u1", "name": "Asha", "email": "asha@example.com"}),
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("bind stub API: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("stub API address: {e}"));
        let app = router(Arc::clone(&backend));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            backend,
            server,
        }
    }

    /// Client configuration pointed at this stub.
    ///
    /// # Panics
    ///
    /// Panics if the stub address does not form a valid URL.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::default()
            .with_api_url(&format!("http://{}/api", self.addr))
            .unwrap_or_else(|e| panic!("stub API URL: {e}"))
    }

    /// Add a restaurant with the given menu; each dish is `(id, name, price in rupees)`.
    pub fn add_restaurant(
        &self,
        id: &str,
        name: &str,
        cuisines: &[&str],
        dishes: &[(&str, &str, u32)],
    ) {
        let mut backend = self.backend.lock();
        backend.restaurants.push(json!({
            "_id": id,
            "restaurantName": name,
            "restaurantType": "food_delivery",
            "cuisineTypes": cuisines,
            "address": {"city": "Pune", "area": "Baner"},
        }));
        let menu = dishes
            .iter()
            .map(|(dish, dish_name, price)| {
                json!({
                    "_id": dish,
                    "itemName": dish_name,
                    "itemType": "veg",
                    "category": "Mains",
                    "basePrice": price,
                    "restaurantId": id,
                })
            })
            .collect();
        for (dish, _, price) in dishes {
            backend.prices.insert((*dish).to_owned(), *price);
        }
        backend.menus.insert(id.to_owned(), menu);
    }

    /// Emails that asked for a code.
    #[must_use]
    pub fn otp_requests(&self) -> Vec<String> {
        self.backend.lock().otp_requests.clone()
    }

    /// Request paths seen so far, with whether each carried the session cookie.
    #[must_use]
    pub fn log(&self) -> Vec<(String, bool)> {
        self.backend.lock().log.clone()
    }

    /// Forget the request log.
    pub fn clear_log(&self) {
        self.backend.lock().log.clear();
    }

    /// Server-side quantity for `menu_item_id` in `email`'s cart.
    #[must_use]
    pub fn cart_quantity(&self, email: &str, menu_item_id: &str) -> u32 {
        self.backend
            .lock()
            .carts
            .get(email)
            .and_then(|lines| lines.iter().find(|l| l.menu_item_id == menu_item_id))
            .map_or(0, |l| l.quantity)
    }

    /// Orders on record for `email`.
    #[must_use]
    pub fn order_count(&self, email: &str) -> usize {
        self.backend.lock().orders.get(email).map_or(0, Vec::len)
    }
}

impl Drop for StubApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Routes
// =============================================================================

fn router(backend: Shared) -> Router {
    let api = Router::new()
        .route("/user/profile", get(profile))
        .route("/auth/request-otp", post(request_otp))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/logout", post(logout))
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/{id}", get(restaurant))
        .route("/menu-items/restaurant/{id}", get(menu))
        .route("/cart", get(cart))
        .route("/cart/summary", get(cart_summary))
        .route("/cart/add", post(add_to_cart))
        .route("/cart/update-quantity", put(update_quantity))
        .route("/cart/remove-item", delete(remove_item))
        .route("/orders/place-cash-order", post(place_cash_order))
        .route("/orders/user/my-orders", get(my_orders));

    Router::new().nest("/api", api).with_state(backend)
}

fn ok(data: Value) -> Response {
    Json(json!({"success": true, "data": data})).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "message": message}))).into_response()
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_owned())
}

/// Log the request and resolve the signed-in email, if any.
fn authenticate(backend: &mut Backend, path: &str, headers: &HeaderMap) -> Option<String> {
    let token = session_token(headers);
    backend.log.push((path.to_owned(), token.is_some()));
    token.and_then(|t| backend.sessions.get(&t).cloned())
}

macro_rules! signed_in {
    ($backend:expr, $path:expr, $headers:expr) => {
        match authenticate(&mut $backend, $path, &$headers) {
            Some(email) => email,
            None => return fail(StatusCode::UNAUTHORIZED, "Not authenticated"),
        }
    };
}

async fn profile(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    let mut backend = backend.lock();
    let email = signed_in!(backend, "user/profile", headers);
    ok(backend.users.get(&email).cloned().unwrap_or(Value::Null))
}

#[derive(Deserialize)]
struct OtpBody {
    email: String,
    otp: Option<String>,
}

async fn request_otp(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<OtpBody>,
) -> Response {
    let mut backend = backend.lock();
    authenticate(&mut backend, "auth/request-otp", &headers);
    backend.otp_requests.push(body.email);
    Json(json!({"success": true, "message": "OTP sent"})).into_response()
}

async fn verify_otp(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<OtpBody>,
) -> Response {
    let mut backend = backend.lock();
    authenticate(&mut backend, "auth/verify-otp", &headers);
    if body.otp.as_deref() != Some(OTP) {
        return fail(StatusCode::BAD_REQUEST, "Invalid or expired OTP");
    }
    let Some(user) = backend.users.get(&body.email).cloned() else {
        return fail(StatusCode::NOT_FOUND, "User not found");
    };

    backend.next_session += 1;
    let token = format!("s{}", backend.next_session);
    backend.sessions.insert(token.clone(), body.email);

    let mut response = ok(user);
    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly");
    if let Ok(cookie) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

/// Acknowledges without dropping the server-side session, so only the
/// client forgetting its cookie ends the session.
async fn logout(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    let mut backend = backend.lock();
    authenticate(&mut backend, "auth/logout", &headers);
    Json(json!({"success": true, "message": "Logged out"})).into_response()
}

#[derive(Deserialize)]
struct ListParams {
    search: Option<String>,
    page: Option<usize>,
    limit: Option<usize>,
}

async fn list_restaurants(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    let mut backend = backend.lock();
    authenticate(&mut backend, "restaurants", &headers);

    let needle = params.search.unwrap_or_default().to_lowercase();
    let matching: Vec<&Value> = backend
        .restaurants
        .iter()
        .filter(|r| {
            r["restaurantName"]
                .as_str()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
        .collect();

    let limit = params.limit.unwrap_or(12).max(1);
    let page = params.page.unwrap_or(1).max(1);
    let total_pages = matching.len().div_ceil(limit).max(1);
    let data: Vec<&Value> = matching.into_iter().skip((page - 1) * limit).take(limit).collect();

    Json(json!({"success": true, "data": data, "totalPages": total_pages})).into_response()
}

async fn restaurant(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut backend = backend.lock();
    authenticate(&mut backend, "restaurants/:id", &headers);
    match backend.restaurants.iter().find(|r| r["_id"] == id.as_str()) {
        Some(r) => ok(r.clone()),
        None => fail(StatusCode::NOT_FOUND, "Restaurant not found"),
    }
}

async fn menu(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut backend = backend.lock();
    authenticate(&mut backend, "menu-items/restaurant/:id", &headers);
    ok(json!(backend.menus.get(&id).cloned().unwrap_or_default()))
}

fn line_json(backend: &Backend, line: &Line) -> Value {
    let unit = backend.prices.get(&line.menu_item_id).copied().unwrap_or(0);
    json!({
        "cartItemKey": line.key,
        "menuItemId": line.menu_item_id,
        "quantity": line.quantity,
        "totalPrice": unit * line.quantity,
        "unitPrice": unit,
    })
}

fn cart_total(backend: &Backend, email: &str) -> (u32, u32) {
    backend.carts.get(email).map_or((0, 0), |lines| {
        lines.iter().fold((0, 0), |(count, total), line| {
            let unit = backend.prices.get(&line.menu_item_id).copied().unwrap_or(0);
            (count + line.quantity, total + unit * line.quantity)
        })
    })
}

async fn cart(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    let mut backend = backend.lock();
    let email = signed_in!(backend, "cart", headers);
    let lines: Vec<Value> = backend
        .carts
        .get(&email)
        .map(|lines| lines.iter().map(|l| line_json(&backend, l)).collect())
        .unwrap_or_default();
    ok(json!({"foodCart": lines}))
}

async fn cart_summary(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    let mut backend = backend.lock();
    let email = signed_in!(backend, "cart/summary", headers);
    let (count, total) = cart_total(&backend, &email);
    if count == 0 {
        return ok(Value::Null);
    }
    let delivery_fee = 30;
    ok(json!({
        "subtotal": total,
        "deliveryFee": delivery_fee,
        "totalAmount": total + delivery_fee,
        "itemCount": count,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBody {
    menu_item_id: String,
    quantity: u32,
}

async fn add_to_cart(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    let mut backend = backend.lock();
    let email = signed_in!(backend, "cart/add", headers);
    if !backend.prices.contains_key(&body.menu_item_id) {
        return fail(StatusCode::NOT_FOUND, "Menu item not found");
    }
    backend.next_line += 1;
    let key = format!("line-{}", backend.next_line);
    let lines = backend.carts.entry(email).or_default();
    match lines.iter_mut().find(|l| l.menu_item_id == body.menu_item_id) {
        Some(line) => line.quantity += body.quantity,
        None => lines.push(Line {
            key,
            menu_item_id: body.menu_item_id,
            quantity: body.quantity,
        }),
    }
    Json(json!({"success": true, "message": "Added to cart"})).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineBody {
    cart_item_key: String,
    #[serde(default)]
    quantity: u32,
}

async fn update_quantity(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<LineBody>,
) -> Response {
    let mut backend = backend.lock();
    let email = signed_in!(backend, "cart/update-quantity", headers);
    let lines = backend.carts.entry(email).or_default();
    match lines.iter_mut().find(|l| l.key == body.cart_item_key) {
        Some(line) => {
            line.quantity = body.quantity;
            Json(json!({"success": true})).into_response()
        }
        None => fail(StatusCode::NOT_FOUND, "Cart item not found"),
    }
}

async fn remove_item(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<LineBody>,
) -> Response {
    let mut backend = backend.lock();
    let email = signed_in!(backend, "cart/remove-item", headers);
    backend
        .carts
        .entry(email)
        .or_default()
        .retain(|l| l.key != body.cart_item_key);
    Json(json!({"success": true})).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderBody {
    delivery_address: Value,
    #[serde(default)]
    notes: String,
}

async fn place_cash_order(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<OrderBody>,
) -> Response {
    let mut backend = backend.lock();
    let email = signed_in!(backend, "orders/place-cash-order", headers);
    let (count, total) = cart_total(&backend, &email);
    if count == 0 {
        return fail(StatusCode::BAD_REQUEST, "Cart is empty");
    }

    let items: Vec<Value> = backend
        .carts
        .get(&email)
        .map(|lines| lines.iter().map(|l| line_json(&backend, l)).collect())
        .unwrap_or_default();
    let number = backend.orders.values().map(Vec::len).sum::<usize>() + 1;
    let order = json!({
        "_id": format!("o{number}"),
        "orderNumber": format!("ORD-{number:04}"),
        "status": "pending",
        "paymentMethod": "cash",
        "paymentStatus": "pending",
        "totalAmount": total + 30,
        "items": items,
        "deliveryAddress": body.delivery_address,
        "notes": body.notes,
    });

    backend.carts.remove(&email);
    backend.orders.entry(email).or_default().push(order.clone());
    ok(order)
}

async fn my_orders(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    let mut backend = backend.lock();
    let email = signed_in!(backend, "orders/user/my-orders", headers);
    ok(json!(backend.orders.get(&email).cloned().unwrap_or_default()))
}
