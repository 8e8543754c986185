//! Addressing keys and render identities.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Which kind of key a record resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Numeric,
    Textual,
    None,
}

/// The identifier used to address a record in update/delete calls.
///
/// `None` is a capability flag, not an error: the record cannot be addressed
/// individually and mutations on it must be refused before reaching the
/// transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ResolvedKey {
    /// Designated numeric primary key (e.g. `postId`).
    Numeric(Number),
    /// First non-blank textual candidate (e.g. `uuid`, `user_id`).
    Textual(String),
    /// No usable key.
    #[default]
    None,
}

impl ResolvedKey {
    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Numeric(_) => KeyKind::Numeric,
            Self::Textual(_) => KeyKind::Textual,
            Self::None => KeyKind::None,
        }
    }

    /// Returns true unless the key is [`ResolvedKey::None`].
    pub fn is_addressable(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Key rendered as a path segment / identity seed.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Self::Numeric(n) => Some(n.to_string()),
            Self::Textual(s) => Some(s.clone()),
            Self::None => None,
        }
    }
}

impl fmt::Display for ResolvedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Textual(s) => f.write_str(s),
            Self::None => f.write_str("-"),
        }
    }
}

/// Prefix carried by every synthetic render identity.
pub const SYNTHETIC_PREFIX: &str = "tmp-";

/// Stable string used only to key list rendering across re-renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderIdentity(String);

impl RenderIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identity was synthesized rather than taken from a
    /// natural key.
    pub fn is_synthetic(&self) -> bool {
        self.0.starts_with(SYNTHETIC_PREFIX)
    }
}

impl fmt::Display for RenderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RenderIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
