//! Tiffin storefront client library.
//!
//! Talks to the food-delivery API and keeps the signed-in user and their
//! cart in step with the server:
//!
//! - [`api`] - HTTP gateway with a cookie-backed session
//! - [`session`] - who is signed in
//! - [`cart`] - the server cart, refetched after every change
//! - [`catalog`], [`feed`] - restaurant listings, menus and paged search
//! - [`orders`] - cash-on-delivery checkout and history
//! - [`state`] - the [`Storefront`] context that owns all of the above

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod feed;
pub mod orders;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::StorefrontConfig;
pub use error::StorefrontError;
pub use state::Storefront;
