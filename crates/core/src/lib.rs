//! Tiffin Core - Shared types library.
//!
//! This crate provides the types used across all Tiffin components:
//! - `storefront` - API client, session and cart stores
//! - `cli` - Terminal front-end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email, price, statuses and API records
//! - [`catalog`] - Search, filter and grouping over restaurant and menu listings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use types::*;
