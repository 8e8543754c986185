//! The list-view controller.
//!
//! [`ListController`] is the single owner of a view's mutable state: page
//! position, active query, loaded rows and session user. Each async
//! operation computes its result on locals and commits only after the
//! transport call succeeded, so a failed request leaves the view exactly as
//! it was.

use serde_json::Value;
use viewkit_model::{
    CurrentUser, PagingSettings, Query, Record, RenderIdentity, ResolvedKey, ResourceProfile,
    ViewConfig,
};

use crate::error::{Result, ViewError};
use crate::identity::{IdentityResolver, TaggedRecord};
use crate::normalize::normalize;
use crate::pagination::{PageMeta, PageState};
use crate::search::SearchFilter;
use crate::transport::Transport;

/// Who owns paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagingMode {
    /// Every page and query goes to the server; metadata drives the state.
    #[default]
    ServerPaged,
    /// One bounded fetch; filtering and paging happen in memory.
    ClientFiltered,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub key: ResolvedKey,
    pub identity: RenderIdentity,
    pub record: Record,
    /// Advisory: whether edit/delete controls should be offered.
    pub can_mutate: bool,
}

/// Advisory mutation check.
///
/// Admins may modify anything. Other users may modify records whose owner
/// fields name them. Without a signed-in user nothing is modifiable.
pub fn can_mutate<S: AsRef<str>>(
    record: &Record,
    user: Option<&CurrentUser>,
    owner_fields: &[S],
) -> bool {
    let Some(user) = user else {
        return false;
    };
    if user.is_admin {
        return true;
    }
    let username = user.username.trim();
    !username.is_empty()
        && owner_fields
            .iter()
            .any(|field| record.scalar_string(field.as_ref()).as_deref() == Some(username))
}

/// Owns the state of one list view over one resource.
#[derive(Debug)]
pub struct ListController<T> {
    transport: T,
    resource: String,
    profile: ResourceProfile,
    paging: PagingSettings,
    mode: PagingMode,
    resolver: IdentityResolver,
    filter: SearchFilter,
    state: PageState,
    query: Query,
    /// Client mode: the full fetched set. Server mode: unused.
    fetched: Vec<TaggedRecord>,
    /// Server mode: the current page. Client mode: the filtered set.
    rows: Vec<TaggedRecord>,
    user: Option<CurrentUser>,
}

impl<T: Transport> ListController<T> {
    pub fn new(
        transport: T,
        resource: impl Into<String>,
        config: &ViewConfig,
        mode: PagingMode,
    ) -> Self {
        let resource = resource.into();
        let profile = config.resource(&resource);
        Self {
            transport,
            resolver: IdentityResolver::from_profile(&profile),
            filter: SearchFilter::from_profile(&profile),
            state: PageState::new(config.paging.page_size).with_page_base(config.paging.first_page),
            paging: config.paging,
            profile,
            resource,
            mode,
            query: Query::default(),
            fetched: Vec::new(),
            rows: Vec::new(),
            user: None,
        }
    }

    /// Set the session user used for advisory mutation gating.
    #[must_use]
    pub fn with_user(mut self, user: CurrentUser) -> Self {
        self.user = Some(user);
        self
    }

    pub fn set_user(&mut self, user: Option<CurrentUser>) {
        self.user = user;
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn mode(&self) -> PagingMode {
        self.mode
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch with the current query and page.
    pub async fn load(&mut self) -> Result<()> {
        match self.mode {
            PagingMode::ServerPaged => {
                let (state, rows) = self.fetch_page(self.state.clone(), &self.query).await?;
                self.state = state;
                self.rows = rows;
            }
            PagingMode::ClientFiltered => {
                let fetched = self.fetch_all().await?;
                let rows = self.filtered(&fetched, &self.query);
                self.state.set_total(rows.len());
                self.fetched = fetched;
                self.rows = rows;
            }
        }
        tracing::info!(
            resource = %self.resource,
            rows = self.rows.len(),
            page = self.state.page(),
            pages = self.state.page_count(),
            total = self.state.total(),
            "Loaded list"
        );
        Ok(())
    }

    /// Apply a new query, starting again from the first page.
    ///
    /// Server mode fetches; client mode filters the already fetched set.
    pub async fn search(&mut self, query: Query) -> Result<()> {
        match self.mode {
            PagingMode::ServerPaged => {
                let fresh = PageState::new(self.state.page_size())
                    .with_page_base(self.paging.first_page);
                let (state, rows) = self.fetch_page(fresh, &query).await?;
                self.state = state;
                self.rows = rows;
            }
            PagingMode::ClientFiltered => {
                let rows = self.filtered(&self.fetched, &query);
                let page_size = self.state.page_size();
                self.state.set_page_size(page_size);
                self.state.set_total(rows.len());
                self.rows = rows;
            }
        }
        tracing::debug!(
            resource = %self.resource,
            active = query.is_active(),
            matches = self.state.total(),
            "Applied query"
        );
        self.query = query;
        Ok(())
    }

    /// Change the page size and return to the first page.
    pub async fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        let mut next = self.state.clone();
        next.set_page_size(page_size);
        self.navigate(next).await.map(|_| ())
    }

    pub async fn first(&mut self) -> Result<bool> {
        self.go_to(0).await
    }

    pub async fn prev(&mut self) -> Result<bool> {
        match self.state.page().checked_sub(1) {
            Some(page) => self.go_to(page).await,
            None => Ok(false),
        }
    }

    pub async fn next(&mut self) -> Result<bool> {
        self.go_to(self.state.page() + 1).await
    }

    pub async fn last(&mut self) -> Result<bool> {
        self.go_to(self.state.page_count() - 1).await
    }

    /// Move to a zero-based page. Out-of-range targets are a no-op.
    pub async fn go_to(&mut self, page: usize) -> Result<bool> {
        let mut next = self.state.clone();
        if !next.go_to(page) {
            return Ok(false);
        }
        self.navigate(next).await
    }

    async fn navigate(&mut self, next: PageState) -> Result<bool> {
        match self.mode {
            PagingMode::ServerPaged => {
                let (state, rows) = self.fetch_page(next, &self.query).await?;
                self.state = state;
                self.rows = rows;
            }
            PagingMode::ClientFiltered => self.state = next,
        }
        Ok(true)
    }

    /// Rows of the current page.
    pub fn rows(&self) -> Vec<RowView> {
        let visible = match self.mode {
            PagingMode::ServerPaged => &self.rows[..],
            PagingMode::ClientFiltered => self.state.slice(&self.rows),
        };
        visible
            .iter()
            .map(|tagged| RowView {
                key: tagged.key.clone(),
                identity: tagged.identity.clone(),
                record: tagged.record.clone(),
                can_mutate: tagged.key.is_addressable()
                    && can_mutate(&tagged.record, self.user.as_ref(), &self.profile.owner_fields),
            })
            .collect()
    }

    /// Create a record and insert it at the front of the list.
    pub async fn create(&mut self, body: Record) -> Result<RenderIdentity> {
        let response = self
            .transport
            .create(&self.resource, &body.clone().into_value())
            .await?;
        let record = match response {
            Value::Object(map) => Record::from(map),
            _ => body,
        };
        let key = self.resolver.resolve_key(&record);
        let identity = self.unique_identity(self.resolver.render_identity(&record, None));
        let tagged = TaggedRecord {
            record,
            key,
            identity: identity.clone(),
        };

        match self.mode {
            PagingMode::ServerPaged => {
                self.rows.insert(0, tagged);
                self.state.set_total(self.state.total() + 1);
            }
            PagingMode::ClientFiltered => {
                if self.filter.matches(&tagged.record, &self.query) {
                    self.rows.insert(0, tagged.clone());
                }
                self.fetched.insert(0, tagged);
                self.state.set_total(self.rows.len());
            }
        }
        tracing::info!(resource = %self.resource, identity = %identity, "Created record");
        Ok(identity)
    }

    /// Send `patch` for the row with `identity` and merge the result.
    pub async fn update(&mut self, identity: &RenderIdentity, patch: &Record) -> Result<()> {
        let key = self.mutable_key(identity)?;
        let response = self
            .transport
            .update(&self.resource, &key, &patch.clone().into_value())
            .await?;

        let mut merged = self
            .find(identity)
            .map(|tagged| tagged.record.clone())
            .unwrap_or_default();
        merged.merge(patch);
        if let Some(server) = Record::from_value(response) {
            merged.merge(&server);
        }
        for list in [&mut self.rows, &mut self.fetched] {
            if let Some(tagged) = list.iter_mut().find(|t| &t.identity == identity) {
                tagged.record = merged.clone();
            }
        }
        if self.mode == PagingMode::ClientFiltered && !self.filter.matches(&merged, &self.query) {
            self.rows.retain(|t| &t.identity != identity);
            self.state.set_total(self.rows.len());
            tracing::debug!(identity = %identity, "Updated record no longer matches the query");
        }
        tracing::info!(resource = %self.resource, key = %key, "Updated record");
        Ok(())
    }

    /// Delete the row with `identity` and recompute pagination.
    pub async fn delete(&mut self, identity: &RenderIdentity) -> Result<()> {
        let key = self.mutable_key(identity)?;
        self.transport.delete(&self.resource, &key).await?;

        self.rows.retain(|t| &t.identity != identity);
        self.fetched.retain(|t| &t.identity != identity);
        let total = match self.mode {
            PagingMode::ServerPaged => self.state.total().saturating_sub(1),
            PagingMode::ClientFiltered => self.rows.len(),
        };
        self.state.set_total(total);
        tracing::info!(resource = %self.resource, key = %key, "Deleted record");
        Ok(())
    }

    fn find(&self, identity: &RenderIdentity) -> Option<&TaggedRecord> {
        self.rows.iter().find(|t| &t.identity == identity)
    }

    /// Key for a mutation, or the local refusal.
    fn mutable_key(&self, identity: &RenderIdentity) -> Result<ResolvedKey> {
        let tagged = self.find(identity).ok_or_else(|| ViewError::UnknownRow {
            identity: identity.clone(),
        })?;
        if !tagged.key.is_addressable() {
            tracing::warn!(
                resource = %self.resource,
                identity = %identity,
                "Refusing mutation of unaddressable record"
            );
            return Err(ViewError::UnaddressableRecord {
                identity: identity.clone(),
            });
        }
        if !can_mutate(&tagged.record, self.user.as_ref(), &self.profile.owner_fields) {
            return Err(ViewError::NotPermitted {
                identity: identity.clone(),
            });
        }
        Ok(tagged.key.clone())
    }

    fn unique_identity(&self, identity: RenderIdentity) -> RenderIdentity {
        let taken = |candidate: &str| {
            self.rows
                .iter()
                .chain(&self.fetched)
                .any(|t| t.identity.as_str() == candidate)
        };
        if !taken(identity.as_str()) {
            return identity;
        }
        let suffixed = (2..)
            .map(|n| format!("{identity}~{n}"))
            .find(|candidate| !taken(candidate));
        suffixed.map_or(identity, RenderIdentity::new)
    }

    fn filtered(&self, records: &[TaggedRecord], query: &Query) -> Vec<TaggedRecord> {
        records
            .iter()
            .filter(|t| self.filter.matches(&t.record, query))
            .cloned()
            .collect()
    }

    async fn fetch_page(
        &self,
        mut next: PageState,
        query: &Query,
    ) -> Result<(PageState, Vec<TaggedRecord>)> {
        let params = query.to_params(next.server_page(), next.page_size());
        let payload = self.transport.get(&self.resource, &params).await?;
        let meta = PageMeta::extract(&payload);
        let rows = self.resolver.tag_batch(normalize(&payload));
        next.apply_server_meta(&meta, rows.len());
        Ok((next, rows))
    }

    async fn fetch_all(&self) -> Result<Vec<TaggedRecord>> {
        let params =
            Query::default().to_params(self.paging.first_page, self.paging.client_fetch_size);
        let payload = self.transport.get(&self.resource, &params).await?;
        Ok(self.resolver.tag_batch(normalize(&payload)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewkit_model::record;

    #[test]
    fn admins_may_modify_anything() {
        let admin = CurrentUser::new("root", true);
        assert!(can_mutate(&record!({}), Some(&admin), &["writerId"]));
    }

    #[test]
    fn owners_match_by_owner_field() {
        let kim = CurrentUser::new("kim", false);
        let post = record!({"writerId": "kim"});
        assert!(can_mutate(&post, Some(&kim), &["author_id", "writerId"]));
        assert!(!can_mutate(&post, Some(&CurrentUser::new("lee", false)), &["writerId"]));
        assert!(!can_mutate(&post, None, &["writerId"]));
        assert!(!can_mutate(&post, Some(&CurrentUser::new(" ", false)), &["writerId"]));
    }
}
