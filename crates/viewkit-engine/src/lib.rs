//! Reconciliation engine for list views over inconsistent APIs.
//!
//! Turns raw, heterogeneously shaped payloads into a stable, addressable,
//! paginated and searchable view model.
//!
//! # Overview
//!
//! - **Normalization**: extract a record sequence from any supported envelope
//! - **Identity**: addressing keys and render identities per record
//! - **Joins**: attach attributes from a secondary collection by fuzzy key
//! - **Trees**: rebuild priority-ordered forests from parent references
//! - **Search**: evaluate keyword and time-range queries in memory
//! - **Pagination**: server-paged and client-filtered page state
//! - **Menus**: hover-intent open/close state with a delayed close
//! - **Controller**: one owner per view, driving a [`Transport`]
//!
//! # Example
//!
//! ```ignore
//! use viewkit_engine::{ListController, PagingMode, ScriptedTransport};
//! use viewkit_model::ViewConfig;
//!
//! let transport = ScriptedTransport::new();
//! transport.push_ok(payload);
//! let mut view = ListController::new(transport, "posts", &ViewConfig::default(), PagingMode::ServerPaged);
//! view.load().await?;
//! for row in view.rows() {
//!     println!("{} {}", row.identity, row.key);
//! }
//! ```

mod controller;
mod error;
mod identity;
mod join;
mod menu;
mod normalize;
mod pagination;
mod search;
mod transport;
mod tree;

// Error types
pub use error::{Result, TransportError, ViewError};

// Records in
pub use normalize::normalize;

// Identity
pub use identity::{IdentityResolver, TaggedRecord};

// Joins
pub use join::{JoinIndex, attach_fields, decorate, group_values};

// Trees
pub use tree::TreeBuilder;

// Search
pub use search::{SearchFilter, parse_timestamp};

// Pagination
pub use pagination::{PageMeta, PageState};

// Menus
pub use menu::{MenuNodeState, MenuState};

// Transport boundary
pub use transport::{ScriptedTransport, Transport, TransportCall};

// View controller
pub use controller::{ListController, PagingMode, RowView, can_mutate};
