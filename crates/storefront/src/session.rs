//! Session store: who, if anyone, is signed in.
//!
//! The state machine is `Unknown -> {Authenticated, Unauthenticated}` and
//! `Authenticated -> Unauthenticated` on logout. Nothing ever moves back to
//! `Unknown`. Transitions are published on a [`watch`] channel so the view
//! can follow them.
//!
//! The transitions themselves are crate-private: outside callers go through
//! [`Storefront`](crate::Storefront), which reconciles the cart after each
//! one.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use tiffin_core::{Email, EmailError, UserProfile};

use crate::api::{ApiError, StorefrontApi};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};

/// Errors from login and OTP requests.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email was rejected before any request was sent.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No passcode was entered.
    #[error("Please enter the code sent to your email")]
    MissingOtp,

    /// The server refused the request or could not be reached.
    #[error("Login failed: {0}")]
    Api(#[from] ApiError),
}

impl AuthError {
    /// Message suitable for showing to a customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// Current authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The profile has not been checked yet.
    #[default]
    Unknown,
    Authenticated(UserProfile),
    Unauthenticated,
}

impl SessionState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Where the view should go after a session operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Back to the login entry point.
    Login,
}

/// Holds the session and performs login/logout against the API.
pub struct SessionStore {
    api: Arc<dyn StorefrontApi>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    #[must_use]
    pub fn new(api: Arc<dyn StorefrontApi>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self { api, state }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user().cloned()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Receive every later state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolve the initial state from the profile endpoint.
    ///
    /// Any failure, including "not signed in", resolves to
    /// [`SessionState::Unauthenticated`]. Never fails.
    #[instrument(skip(self))]
    pub(crate) async fn initialize(&self) -> SessionState {
        let next = match self.api.current_profile().await {
            Ok(user) => {
                info!(user_id = %user.id, "Restored session");
                set_sentry_user(&user.id, Some(user.email.as_str()));
                SessionState::Authenticated(user)
            }
            Err(e) if e.is_unauthorized() || matches!(e, ApiError::Rejected(_)) => {
                debug!(error = %e, "No active session");
                SessionState::Unauthenticated
            }
            Err(e) => {
                warn!(error = %e, "Could not restore session; treating as signed out");
                SessionState::Unauthenticated
            }
        };
        self.state.send_replace(next.clone());
        next
    }

    /// Ask the server to email a one-time passcode.
    ///
    /// The address is validated locally first; a malformed one is rejected
    /// without a request. The session is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] for a malformed address or
    /// [`AuthError::Api`] if the server refuses.
    #[instrument(skip(self))]
    pub async fn request_otp(&self, email: &str) -> Result<Email, AuthError> {
        let email = Email::parse(email)?;
        self.api.request_otp(&email).await?;
        add_breadcrumb("auth", "Requested login code", Some(&[("domain", email.domain())]));
        Ok(email)
    }

    /// Sign in with an email and passcode.
    ///
    /// On failure the session is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the input is invalid or the server rejects
    /// the passcode.
    #[instrument(skip(self, otp))]
    pub(crate) async fn login(
        &self,
        email: &str,
        otp: SecretString,
    ) -> Result<UserProfile, AuthError> {
        let email = Email::parse(email)?;
        if otp.expose_secret().trim().is_empty() {
            return Err(AuthError::MissingOtp);
        }

        let otp = SecretString::from(otp.expose_secret().trim().to_owned());
        let user = self.api.verify_otp(&email, &otp).await.map_err(|e| {
            warn!(error = %e, "Login rejected");
            e
        })?;

        info!(user_id = %user.id, "Signed in");
        set_sentry_user(&user.id, Some(user.email.as_str()));
        self.state
            .send_replace(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    /// Sign out.
    ///
    /// The server is told on a best-effort basis; the local session is
    /// cleared whatever happens.
    #[instrument(skip(self))]
    pub(crate) async fn logout(&self) -> Navigation {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Logout request failed; clearing session anyway");
        }

        self.state.send_replace(SessionState::Unauthenticated);
        clear_sentry_user();
        info!("Signed out");
        Navigation::Login
    }
}
