//! Pagination state for server-paged and client-filtered lists.
//!
//! [`PageState`] is the only place that derives `page_count` and clamps
//! `page`. Every mutating operation re-derives both before returning, so a
//! slice computed afterwards never sees a stale page count.

use std::ops::Range;

use serde_json::{Map, Value};

/// Metadata aliases, in priority order.
const TOTAL_ALIASES: &[&str] = &["total", "totalElements"];
const PAGE_COUNT_ALIASES: &[&str] = &["totalPages", "pages"];
const PAGE_ALIASES: &[&str] = &["page", "number"];
const SIZE_ALIASES: &[&str] = &["size"];

/// Pagination metadata read from a server response.
///
/// Every value is optional; servers report any subset. `page` is the raw
/// server page number, before the page base is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub total: Option<usize>,
    pub page_count: Option<usize>,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl PageMeta {
    /// Read metadata from a response payload.
    ///
    /// Top-level fields win over fields inside an object-valued `page`
    /// wrapper. Non-negative integers and integer strings are accepted.
    pub fn extract(payload: &Value) -> Self {
        let Some(top) = payload.as_object() else {
            return Self::default();
        };
        let wrapper = top.get("page").and_then(Value::as_object);
        let read = |aliases: &[&str]| {
            read_count(top, aliases).or_else(|| wrapper.and_then(|page| read_count(page, aliases)))
        };
        Self {
            total: read(TOTAL_ALIASES),
            page_count: read(PAGE_COUNT_ALIASES),
            page: read(PAGE_ALIASES),
            size: read(SIZE_ALIASES),
        }
    }

    /// True when neither a total nor a page count was reported.
    pub fn is_ambiguous(&self) -> bool {
        self.total.is_none() && self.page_count.is_none()
    }
}

fn read_count(object: &Map<String, Value>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|alias| match object.get(*alias)? {
        Value::Number(n) => n.as_u64().and_then(|v| usize::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    })
}

/// Position and extent of a paginated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    page: usize,
    page_size: usize,
    total: usize,
    page_count: usize,
    page_base: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PageState {
    /// Empty state on page 0. A zero page size is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
            total: 0,
            page_count: 1,
            page_base: 0,
        }
    }

    /// Set the number the server uses for its first page (0 or 1).
    #[must_use]
    pub fn with_page_base(mut self, first_page: usize) -> Self {
        self.page_base = first_page;
        self
    }

    /// Zero-based current page.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Current page in the server's numbering.
    pub fn server_page(&self) -> usize {
        self.page + self.page_base
    }

    /// Replace the total and re-clamp.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.recompute();
    }

    /// Change the page size and return to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 0;
        self.recompute();
    }

    pub fn first(&mut self) -> bool {
        self.go_to(0)
    }

    pub fn prev(&mut self) -> bool {
        match self.page.checked_sub(1) {
            Some(page) => self.go_to(page),
            None => false,
        }
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.page + 1)
    }

    pub fn last(&mut self) -> bool {
        self.go_to(self.page_count - 1)
    }

    /// Move to `page`. Out-of-range targets are ignored.
    ///
    /// Returns true if the current page changed.
    pub fn go_to(&mut self, page: usize) -> bool {
        if page >= self.page_count || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    /// Index range of the current page within a list of `len` items.
    pub fn range(&self, len: usize) -> Range<usize> {
        let start = self.page.saturating_mul(self.page_size).min(len);
        let end = start.saturating_add(self.page_size).min(len);
        start..end
    }

    /// The items of the current page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.range(items.len())]
    }

    /// Apply server metadata after a server-paged fetch.
    ///
    /// - An explicit total is taken as is.
    /// - A page count alone approximates the total as `page_count * page_size`.
    /// - With neither, the total becomes a lower bound that never shrinks:
    ///   `max(previous total, records_seen + page * page_size)`.
    ///
    /// The lower bound never exceeds the rows already seen, so a bare-array
    /// endpoint ends on the current page and `next` stays a no-op. Use
    /// client-filtered paging for such endpoints.
    pub fn apply_server_meta(&mut self, meta: &PageMeta, records_seen: usize) {
        if let Some(size) = meta.size.filter(|&size| size > 0) {
            self.page_size = size;
        }
        if let Some(page) = meta.page {
            self.page = page.saturating_sub(self.page_base);
        }
        self.total = match (meta.total, meta.page_count) {
            (Some(total), _) => total,
            (None, Some(page_count)) => page_count.saturating_mul(self.page_size),
            (None, None) => {
                let seen = records_seen.saturating_add(self.page.saturating_mul(self.page_size));
                tracing::debug!(
                    previous = self.total,
                    estimate = seen,
                    "No total in page metadata, using lower bound"
                );
                self.total.max(seen)
            }
        };
        self.recompute();
    }

    fn recompute(&mut self) {
        self.page_count = self.total.div_ceil(self.page_size).max(1);
        if self.page >= self.page_count {
            self.page = self.page_count - 1;
        }
    }
}
