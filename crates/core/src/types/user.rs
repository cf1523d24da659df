//! The authenticated customer's profile.

use serde::{Deserialize, Serialize};

use super::{Email, UserId};

/// Profile returned by `GET /user/profile` and `POST /auth/verify-otp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    /// Display name; accounts created through OTP login may not have one yet.
    #[serde(default, alias = "fullName")]
    pub name: Option<String>,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
}

impl UserProfile {
    /// Name to greet the user with, falling back to the mailbox name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self
                .email
                .as_str()
                .split_once('@')
                .map_or(self.email.as_str(), |(local, _)| local),
        }
    }
}
