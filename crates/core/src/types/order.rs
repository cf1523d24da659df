//! Orders and delivery addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderId, OrderStatus, PaymentStatus, Price};

/// City recorded when the customer only typed a street address.
pub const UNKNOWN_CITY: &str = "Unknown";

/// Validation errors raised before an order request is sent.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryAddressError {
    /// No address line was entered.
    #[error("please enter a delivery address")]
    Empty,
}

/// A GeoJSON point, `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub coordinates: [f64; 2],
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self {
            coordinates: [0.0, 0.0],
        }
    }
}

/// Where a cash-on-delivery order should go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub address_line1: String,
    pub city: String,
    #[serde(default)]
    pub coordinates: GeoPoint,
}

impl DeliveryAddress {
    /// Build an address from the single free-text line the customer typed.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryAddressError::Empty`] if the line is blank.
    pub fn from_line(line: &str) -> Result<Self, DeliveryAddressError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(DeliveryAddressError::Empty);
        }
        Ok(Self {
            address_line1: line.to_owned(),
            city: UNKNOWN_CITY.to_owned(),
            coordinates: GeoPoint::default(),
        })
    }

    /// Replace the placeholder city.
    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub item_name: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub total_price: Option<Price>,
}

/// An order as returned by the order endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default = "pending")]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub total_amount: Price,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub delivery_address: Option<DeliveryAddress>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

const fn pending() -> OrderStatus {
    OrderStatus::Pending
}

impl Order {
    /// Human-facing reference: the order number if assigned, else the id.
    #[must_use]
    pub fn reference(&self) -> &str {
        self.order_number.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}
