//! CLI command implementations.

pub mod menu;
pub mod restaurants;
pub mod shell;

use thiserror::Error;

use tiffin_storefront::StorefrontError;
use tiffin_storefront::api::ApiError;
use tiffin_storefront::cart::CartError;
use tiffin_storefront::orders::OrderError;
use tiffin_storefront::session::AuthError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A storefront operation failed.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// Writing output or reading input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An argument could not be understood.
    #[error("{0}")]
    InvalidArgument(String),
}

macro_rules! via_storefront_error {
    ($($source:ty),+) => {
        $(
            impl From<$source> for CommandError {
                fn from(err: $source) -> Self {
                    Self::Storefront(err.into())
                }
            }
        )+
    };
}

via_storefront_error!(ApiError, AuthError, CartError, OrderError);

impl CommandError {
    /// Message suitable for showing to a customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storefront(err) => err.user_message(),
            other => other.to_string(),
        }
    }

    /// Send unexpected failures to Sentry.
    pub fn report(&self) {
        match self {
            Self::Storefront(err) => err.report(),
            Self::Io(err) => tracing::error!(error = %err, "I/O failure"),
            Self::InvalidArgument(_) => {}
        }
    }
}
