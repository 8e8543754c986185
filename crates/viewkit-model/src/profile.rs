//! View configuration: per-resource field profiles and engine settings.
//!
//! Serialized as TOML. Every section has defaults, so an empty document is a
//! valid configuration; resource profiles named in the file replace the
//! built-in profile of the same name and leave the others in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

// =============================================================================
// ROOT CONFIG
// =============================================================================

/// Engine configuration for one view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Page sizes and page-number base.
    pub paging: PagingSettings,

    /// Hover-intent menu timing.
    pub menu: MenuSettings,

    /// Field names used to rebuild menu/comment trees.
    pub tree: TreeProfile,

    /// Candidate fields for joining a secondary collection.
    pub join: JoinProfile,

    /// Per-resource field profiles, keyed by resource name.
    pub resources: BTreeMap<String, ResourceProfile>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            paging: PagingSettings::default(),
            menu: MenuSettings::default(),
            tree: TreeProfile::default(),
            join: JoinProfile::default(),
            resources: builtin_resources(),
        }
    }
}

impl ViewConfig {
    /// Parse a TOML document, filling in built-in resource profiles the
    /// document does not mention.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        for (name, profile) in builtin_resources() {
            config.resources.entry(name).or_insert(profile);
        }
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Profile for `resource`, falling back to the generic profile.
    pub fn resource(&self, resource: &str) -> ResourceProfile {
        self.resources.get(resource).cloned().unwrap_or_default()
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

/// Pagination settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingSettings {
    /// Rows per page shown to the user.
    pub page_size: usize,
    /// Page size used for the single fetch in client-filtered mode.
    pub client_fetch_size: usize,
    /// Number the server uses for the first page (0 or 1).
    pub first_page: usize,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            client_fetch_size: 1000,
            first_page: 0,
        }
    }
}

/// Menu interaction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSettings {
    /// Delay between pointer-leave and close, in milliseconds.
    pub close_delay_ms: u64,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self { close_delay_ms: 150 }
    }
}

/// Field names for flat-to-tree conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeProfile {
    pub id_field: String,
    pub parent_field: String,
    pub priority_field: String,
    /// Field shown when a node is rendered.
    pub label_field: String,
}

impl Default for TreeProfile {
    fn default() -> Self {
        Self {
            id_field: "uuid".to_string(),
            parent_field: "parent_uuid".to_string(),
            priority_field: "priority".to_string(),
            label_field: "menu_name".to_string(),
        }
    }
}

/// Fuzzy join configuration for one primary/secondary pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinProfile {
    /// Candidate key fields, probed in this order.
    pub candidate_fields: Vec<String>,
    /// Secondary attributes copied onto a matched primary record.
    pub attach_fields: Vec<String>,
    /// Values written when no secondary record matches.
    pub defaults: BTreeMap<String, Value>,
}

impl Default for JoinProfile {
    fn default() -> Self {
        Self {
            candidate_fields: strings(&["user_id", "userId", "username", "id", "email"]),
            attach_fields: strings(&["role", "roles"]),
            defaults: BTreeMap::from([("role".to_string(), Value::from("ROLE_USER"))]),
        }
    }
}

/// Field profile for one resource type.
///
/// Candidate lists are ordered; the first usable field wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceProfile {
    /// Designated numeric primary key.
    pub numeric_key: String,
    /// Textual key candidates, in priority order.
    pub key_fields: Vec<String>,
    /// Extra natural-key fields used only for render identity.
    pub render_fields: Vec<String>,
    /// Fields compared by author queries.
    pub author_fields: Vec<String>,
    /// Fields compared by content queries.
    pub content_fields: Vec<String>,
    /// Timestamp fields compared by time queries.
    pub time_fields: Vec<String>,
    /// Fields naming the record owner, for advisory mutation gating.
    pub owner_fields: Vec<String>,
}

impl Default for ResourceProfile {
    fn default() -> Self {
        Self {
            numeric_key: "id".to_string(),
            key_fields: strings(&["uuid", "key", "user_id", "userId", "username"]),
            render_fields: Vec::new(),
            author_fields: strings(&[
                "writerName",
                "writerId",
                "author",
                "author_id",
                "username",
                "name",
            ]),
            content_fields: strings(&["title", "content", "body"]),
            time_fields: strings(&["createdAt", "created_at", "updatedAt", "updated_at"]),
            owner_fields: strings(&["writerId", "author_id", "authorId", "username", "user_id"]),
        }
    }
}

// =============================================================================
// BUILT-IN PROFILES
// =============================================================================

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

/// Profiles for the resources served by the board API.
pub fn builtin_resources() -> BTreeMap<String, ResourceProfile> {
    let users = ResourceProfile {
        numeric_key: "id".to_string(),
        key_fields: strings(&["user_id", "userId", "username"]),
        render_fields: strings(&["email"]),
        author_fields: strings(&["name", "user_id", "userId", "username"]),
        content_fields: strings(&["email", "phone"]),
        time_fields: strings(&["created_at", "createdAt"]),
        owner_fields: strings(&["user_id", "userId", "username"]),
    };
    let posts = ResourceProfile {
        numeric_key: "postId".to_string(),
        key_fields: strings(&["uuid", "postKey", "key"]),
        render_fields: strings(&["postIdStr"]),
        author_fields: strings(&["writerName", "writerId", "author", "username"]),
        content_fields: strings(&["title", "content"]),
        time_fields: strings(&["createdAt", "created_at", "updatedAt"]),
        owner_fields: strings(&["writerId", "author_id", "username"]),
    };
    let comments = ResourceProfile {
        numeric_key: "commentId".to_string(),
        key_fields: strings(&["uuid"]),
        render_fields: Vec::new(),
        author_fields: strings(&["writerName", "writerId", "author_id"]),
        content_fields: strings(&["content"]),
        time_fields: strings(&["createdAt", "created_at"]),
        owner_fields: strings(&["writerId", "author_id"]),
    };
    let roles = ResourceProfile {
        numeric_key: "id".to_string(),
        key_fields: strings(&["username", "user_id"]),
        render_fields: Vec::new(),
        author_fields: strings(&["username", "user_id"]),
        content_fields: strings(&["role"]),
        time_fields: Vec::new(),
        owner_fields: Vec::new(),
    };
    let menus = ResourceProfile {
        numeric_key: "id".to_string(),
        key_fields: strings(&["uuid"]),
        render_fields: strings(&["path"]),
        author_fields: Vec::new(),
        content_fields: strings(&["menu_name", "path"]),
        time_fields: Vec::new(),
        owner_fields: Vec::new(),
    };

    BTreeMap::from([
        ("users".to_string(), users),
        ("posts".to_string(), posts),
        ("comments".to_string(), comments),
        ("roles".to_string(), roles),
        ("menus".to_string(), menus),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = ViewConfig::from_toml_str("").unwrap();
        assert_eq!(config.paging, PagingSettings::default());
        assert_eq!(config.resource("posts").numeric_key, "postId");
    }

    #[test]
    fn file_profiles_override_builtins_by_name() {
        let config = ViewConfig::from_toml_str(
            r#"
            [paging]
            page_size = 25

            [resources.posts]
            numeric_key = "seq"
            key_fields = ["slug"]
            "#,
        )
        .unwrap();
        assert_eq!(config.paging.page_size, 25);
        assert_eq!(config.paging.client_fetch_size, 1000);
        let posts = config.resource("posts");
        assert_eq!(posts.numeric_key, "seq");
        assert_eq!(posts.key_fields, vec!["slug".to_string()]);
        // unspecified lists fall back to the generic profile
        assert!(posts.time_fields.contains(&"createdAt".to_string()));
        assert_eq!(config.resource("comments").numeric_key, "commentId");
    }

    #[test]
    fn unknown_resource_uses_generic_profile() {
        let config = ViewConfig::default();
        assert_eq!(config.resource("stops"), ResourceProfile::default());
    }

    #[test]
    fn join_defaults_parse_from_toml() {
        let config = ViewConfig::from_toml_str(
            r#"
            [join]
            candidate_fields = ["email"]
            defaults = { role = "GUEST", active = false }
            "#,
        )
        .unwrap();
        assert_eq!(config.join.candidate_fields, vec!["email".to_string()]);
        assert_eq!(config.join.defaults["role"], Value::from("GUEST"));
        assert_eq!(config.join.defaults["active"], Value::from(false));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = ViewConfig::default();
        let text = config.to_toml_string().unwrap();
        let parsed = ViewConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.resources, config.resources);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(ViewConfig::from_toml_str("paging = 3").is_err());
    }
}
