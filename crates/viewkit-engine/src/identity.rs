//! Per-record identity resolution.
//!
//! Two separate identifiers come out of a record:
//! - the [`ResolvedKey`] used to address it in update/delete calls, and
//! - the [`RenderIdentity`] used only to keep list rendering stable.
//!
//! Resources disagree on their primary key (numeric `postId` here, `uuid` or
//! `user_id` there), so both are resolved from ordered candidate lists taken
//! from the [`ResourceProfile`].

use std::collections::HashSet;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use viewkit_model::{Record, RenderIdentity, ResolvedKey, ResourceProfile, SYNTHETIC_PREFIX};

/// Process-local synthetic identity counter, seeded once from the clock.
static SYNTHETIC_SEED: OnceLock<AtomicU64> = OnceLock::new();

fn next_synthetic_seed() -> u64 {
    SYNTHETIC_SEED
        .get_or_init(|| {
            let millis = chrono::Utc::now().timestamp_millis();
            AtomicU64::new(u64::try_from(millis).unwrap_or_default())
        })
        .fetch_add(1, Ordering::Relaxed)
}

/// A record together with its derived identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedRecord {
    pub record: Record,
    pub key: ResolvedKey,
    pub identity: RenderIdentity,
}

/// Resolves addressing keys and render identities for one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResolver {
    numeric_field: String,
    key_fields: Vec<String>,
    render_fields: Vec<String>,
}

impl IdentityResolver {
    pub fn new<S: Into<String>>(numeric_field: impl Into<String>, key_fields: Vec<S>) -> Self {
        Self {
            numeric_field: numeric_field.into(),
            key_fields: key_fields.into_iter().map(Into::into).collect(),
            render_fields: Vec::new(),
        }
    }

    /// Add natural-key fields consulted only for render identity.
    #[must_use]
    pub fn with_render_fields<S: Into<String>>(mut self, fields: Vec<S>) -> Self {
        self.render_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_profile(profile: &ResourceProfile) -> Self {
        Self::new(profile.numeric_key.clone(), profile.key_fields.clone())
            .with_render_fields(profile.render_fields.clone())
    }

    /// Resolve the addressing key.
    ///
    /// A JSON number in the numeric field always wins. Otherwise the first
    /// candidate field holding a non-blank string is used, in configured
    /// order.
    pub fn resolve_key(&self, record: &Record) -> ResolvedKey {
        if let Some(number) = record.number(&self.numeric_field) {
            return ResolvedKey::Numeric(number.clone());
        }
        match record.first_text(&self.key_fields) {
            Some((_, value)) => ResolvedKey::Textual(value.to_string()),
            None => ResolvedKey::None,
        }
    }

    /// Render identity for a record at `position` in its batch.
    ///
    /// Falls back to a synthetic `tmp-<seed>-<position>` value (random suffix
    /// without a position) when the record has no natural key. Synthetic
    /// values are never handed out twice in one process.
    pub fn render_identity(&self, record: &Record, position: Option<usize>) -> RenderIdentity {
        match self.natural_identity(record) {
            Some(natural) => RenderIdentity::new(natural),
            None => synthetic_identity(position),
        }
    }

    fn natural_identity(&self, record: &Record) -> Option<String> {
        self.resolve_key(record)
            .as_string()
            .or_else(|| record.first_text(&self.render_fields).map(|(_, v)| v.to_string()))
    }

    /// Resolve key and identity for a whole batch.
    ///
    /// A natural identity already taken in the batch gets the lowest free
    /// `~n` suffix (n >= 2), so no two rows of one list share an identity.
    pub fn tag_batch(&self, records: Vec<Record>) -> Vec<TaggedRecord> {
        let mut used: HashSet<String> = HashSet::new();
        let mut duplicates = 0usize;
        let tagged: Vec<TaggedRecord> = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| {
                let key = self.resolve_key(&record);
                let identity = match self.natural_identity(&record) {
                    Some(natural) if used.insert(natural.clone()) => RenderIdentity::new(natural),
                    Some(natural) => {
                        duplicates += 1;
                        let candidate = (2..)
                            .map(|n| format!("{natural}~{n}"))
                            .find(|candidate| !used.contains(candidate))
                            .unwrap_or_default();
                        used.insert(candidate.clone());
                        RenderIdentity::new(candidate)
                    }
                    None => synthetic_identity(Some(position)),
                };
                TaggedRecord {
                    record,
                    key,
                    identity,
                }
            })
            .collect();

        if duplicates > 0 {
            tracing::debug!(duplicates, "Disambiguated repeated natural keys in batch");
        }
        tagged
    }
}

fn synthetic_identity(position: Option<usize>) -> RenderIdentity {
    let seed = next_synthetic_seed();
    let suffix = match position {
        Some(position) => position.to_string(),
        None => uuid::Uuid::new_v4().simple().to_string(),
    };
    RenderIdentity::new(format!("{SYNTHETIC_PREFIX}{seed}-{suffix}"))
}
