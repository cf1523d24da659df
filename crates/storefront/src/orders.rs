//! Cash-on-delivery checkout and order history.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};

use tiffin_core::{CartType, DeliveryAddress, DeliveryAddressError, Order};

use crate::api::{ApiError, PlaceOrderRequest, StorefrontApi};
use crate::error::add_breadcrumb;

/// Errors from placing or listing orders.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order was rejected before any request was sent.
    #[error(transparent)]
    Validation(#[from] DeliveryAddressError),

    /// The server refused the order or could not be reached.
    #[error("Order failed: {0}")]
    Api(#[from] ApiError),
}

impl OrderError {
    /// Message suitable for showing to a customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Api(err) => err.user_message(),
        }
    }
}

/// Places orders and reads order history.
#[derive(Clone)]
pub struct OrderService {
    api: Arc<dyn StorefrontApi>,
}

impl OrderService {
    #[must_use]
    pub fn new(api: Arc<dyn StorefrontApi>) -> Self {
        Self { api }
    }

    /// Place a cash-on-delivery order for the whole cart.
    ///
    /// The server empties the cart on success; callers should refresh their
    /// copy afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Validation`] for a blank address (nothing is
    /// sent) or [`OrderError::Api`] if the server refuses.
    #[instrument(skip(self, address, notes))]
    pub async fn place_cash_order(&self, address: &str, notes: &str) -> Result<Order, OrderError> {
        let delivery_address = DeliveryAddress::from_line(address)?;
        let order = self
            .api
            .place_cash_order(&PlaceOrderRequest {
                cart_type: CartType::FoodCart,
                delivery_address,
                notes: notes.trim().to_owned(),
            })
            .await?;

        info!(order_id = %order.id, total = %order.total_amount, "Order placed");
        add_breadcrumb("order", "Placed order", Some(&[("order_id", order.id.as_str())]));
        Ok(order)
    }

    /// The signed-in user's orders, newest first as the server returns them.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Api`] if the request fails.
    pub async fn my_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.api.my_orders().await?)
    }
}
