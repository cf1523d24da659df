//! Enumerations shared between listings, menus, carts and orders.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a textual enum value is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// The service line a restaurant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestaurantType {
    FoodDelivery,
    FoodDeliveryAndDining,
    Groceries,
}

impl RestaurantType {
    /// Wire value used in the `type` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FoodDelivery => "food_delivery",
            Self::FoodDeliveryAndDining => "food_delivery_and_dining",
            Self::Groceries => "groceries",
        }
    }

    /// Heading shown above a listing of this type.
    ///
    /// `None` means the listing is not narrowed to a type.
    #[must_use]
    pub const fn title(kind: Option<Self>) -> &'static str {
        match kind {
            Some(Self::FoodDelivery) => "Food Delivery",
            Some(Self::FoodDeliveryAndDining) => "Dining Out",
            Some(Self::Groceries) => "Groceries",
            None => "All Restaurants",
        }
    }
}

impl FromStr for RestaurantType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "food_delivery" => Ok(Self::FoodDelivery),
            "food_delivery_and_dining" => Ok(Self::FoodDeliveryAndDining),
            "groceries" => Ok(Self::Groceries),
            other => Err(UnknownVariant {
                kind: "restaurant type",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for RestaurantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dietary classification of a menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DietaryType {
    #[serde(rename = "veg")]
    Veg,
    #[serde(rename = "non-veg")]
    NonVeg,
    #[serde(rename = "egg")]
    Egg,
}

impl DietaryType {
    /// Wire value (`veg`, `non-veg`, `egg`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Veg => "veg",
            Self::NonVeg => "non-veg",
            Self::Egg => "egg",
        }
    }
}

impl FromStr for DietaryType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "veg" => Ok(Self::Veg),
            "non-veg" => Ok(Self::NonVeg),
            "egg" => Ok(Self::Egg),
            other => Err(UnknownVariant {
                kind: "dietary type",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for DietaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which cart a request targets. The storefront only ever uses the food cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CartType {
    #[default]
    #[serde(rename = "foodCart")]
    FoodCart,
}

impl CartType {
    /// Wire value used in query strings and request bodies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FoodCart => "foodCart",
        }
    }
}

/// Lifecycle status of an order.
///
/// Unrecognized values are preserved so a new backend status never breaks
/// order history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    ReadyForPickup,
    OutForDelivery,
    Delivered,
    Cancelled,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Preparing => "Preparing",
            Self::ReadyForPickup => "Ready for pickup",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Other(raw) => raw,
        };
        f.write_str(label)
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
    #[serde(untagged)]
    Other(String),
}
