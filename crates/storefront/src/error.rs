//! Unified error handling with Sentry integration.
//!
//! Each store has its own error type; [`StorefrontError`] gathers them for
//! the view, which only needs a message to show and a decision on whether
//! the failure is worth reporting.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::config::ConfigError;
use crate::orders::OrderError;
use crate::session::AuthError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A direct API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Login or OTP request failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Placing or listing orders failed.
    #[error(transparent)]
    Order(#[from] OrderError),
}

impl StorefrontError {
    /// Message suitable for showing to a customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Api(err) => err.user_message(),
            Self::Auth(err) => err.user_message(),
            Self::Cart(err) => err.user_message(),
            Self::Order(err) => err.user_message(),
        }
    }

    /// Whether this is an unexpected failure rather than a customer mistake
    /// or a business rule the server enforced.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        let api = match self {
            Self::Config(_) => return true,
            Self::Api(err) => err,
            Self::Auth(AuthError::Api(err))
            | Self::Cart(CartError::Api(err))
            | Self::Order(OrderError::Api(err)) => err,
            _ => return false,
        };
        matches!(
            api,
            ApiError::Transport(_) | ApiError::Parse(_) | ApiError::Url(_)
        ) || matches!(api, ApiError::Status { status, .. } if *status >= 500)
    }

    /// Capture unexpected failures to Sentry and log them.
    pub fn report(&self) {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Storefront operation refused");
        }
    }
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("menu_item_id", "m1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storefront_error_display() {
        let err = StorefrontError::from(CartError::LoginRequired);
        assert_eq!(err.to_string(), "Please log in to add items to your cart");
        assert_eq!(err.user_message(), "Please log in to add items to your cart");
    }

    #[test]
    fn test_is_unexpected() {
        assert!(!StorefrontError::from(CartError::Busy).is_unexpected());
        assert!(
            !StorefrontError::from(ApiError::Rejected("Cart is empty".to_string()))
                .is_unexpected()
        );
        assert!(
            StorefrontError::from(ApiError::Transport("reset".to_string())).is_unexpected()
        );
        assert!(
            StorefrontError::from(CartError::Api(ApiError::Status {
                status: 502,
                message: String::new(),
            }))
            .is_unexpected()
        );
    }
}
