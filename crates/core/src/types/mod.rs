//! Core types for Tiffin.
//!
//! This module provides type-safe wrappers and read-only projections of the
//! records the storefront API returns.

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod restaurant;
pub mod status;
pub mod user;

pub use cart::{Cart, CartItem, CartSummary, MenuItemRef};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{DeliveryAddress, DeliveryAddressError, GeoPoint, Order, OrderLine, UNKNOWN_CITY};
pub use price::Price;
pub use restaurant::{
    DEFAULT_MENU_CATEGORY, DeliverySettings, MenuItem, RestaurantAddress, RestaurantSummary,
};
pub use status::*;
pub use user::UserProfile;
