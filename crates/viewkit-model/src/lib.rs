//! Data model types for the viewkit reconciliation engine.
//!
//! This crate provides the shapes that flow between an inconsistent HTTP API
//! and a rendered list view:
//! - **Records**: schema-less API objects with narrow typed accessors
//! - **Keys**: addressing keys (numeric / textual / none) and render identities
//! - **Queries**: typed keyword and time-range filters
//! - **Trees**: records arranged into priority-ordered forests
//! - **Configuration**: per-resource field profiles and engine settings (TOML)
//!
//! # Module Organization
//!
//! - [`record`]: [`Record`] and the [`record!`] literal macro
//! - [`key`]: [`ResolvedKey`], [`KeyKind`], [`RenderIdentity`]
//! - [`query`]: [`Query`], [`QueryKind`]
//! - [`tree`]: [`TreeNode`], [`flatten_forest`]
//! - [`user`]: [`CurrentUser`]
//! - [`profile`]: [`ViewConfig`], [`ResourceProfile`] and the other sections

pub mod error;
pub mod key;
pub mod profile;
pub mod query;
pub mod record;
pub mod tree;
pub mod user;

// === Error Types ===
pub use error::{ConfigError, Result};

// === Records & Keys ===
pub use key::{KeyKind, RenderIdentity, ResolvedKey, SYNTHETIC_PREFIX};
pub use record::Record;

// === Queries ===
pub use query::{Query, QueryKind};

// === Trees ===
pub use tree::{TreeNode, flatten_forest};

// === Session ===
pub use user::CurrentUser;

// === Configuration ===
pub use profile::{
    JoinProfile, MenuSettings, PagingSettings, ResourceProfile, TreeProfile, ViewConfig,
    builtin_resources,
};
