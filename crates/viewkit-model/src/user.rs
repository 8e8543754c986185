//! Session identity, consumed only by advisory mutation gating.

use serde::{Deserialize, Serialize};

/// The signed-in user as reported by the session endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    #[serde(default, alias = "admin")]
    pub is_admin: bool,
}

impl CurrentUser {
    pub fn new(username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            username: username.into(),
            is_admin,
        }
    }

    /// Derive admin status from a role list (`ROLE_ADMIN` or bare `ADMIN`).
    pub fn from_roles<S: AsRef<str>>(username: impl Into<String>, roles: &[S]) -> Self {
        let is_admin = roles.iter().any(|role| {
            let role = role.as_ref().trim();
            role.eq_ignore_ascii_case("ROLE_ADMIN") || role.eq_ignore_ascii_case("ADMIN")
        });
        Self::new(username, is_admin)
    }
}
