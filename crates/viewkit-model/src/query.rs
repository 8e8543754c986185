//! Typed search queries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which record fields a query compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Name / author / username-like fields.
    Author,
    /// Title / body-like fields.
    Content,
    /// Author OR content.
    #[default]
    All,
    /// Creation/update timestamp range.
    Time,
}

impl QueryKind {
    /// Value sent upstream as `qType`.
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Content => "content",
            Self::All => "all",
            Self::Time => "time",
        }
    }
}

impl std::str::FromStr for QueryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "author" | "writer" => Ok(Self::Author),
            "content" | "title" => Ok(Self::Content),
            "all" | "" => Ok(Self::All),
            "time" | "date" => Ok(Self::Time),
            other => Err(format!("unknown query kind '{other}'")),
        }
    }
}

/// A keyword or time-range filter.
///
/// A keyword query with a blank keyword, or a time query with neither bound,
/// is inactive and matches every record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub kind: QueryKind,
    pub keyword: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Query {
    pub fn keyword(kind: QueryKind, keyword: impl Into<String>) -> Self {
        Self {
            kind,
            keyword: keyword.into(),
            from: None,
            to: None,
        }
    }

    pub fn time_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            kind: QueryKind::Time,
            keyword: String::new(),
            from,
            to,
        }
    }

    pub fn is_active(&self) -> bool {
        match self.kind {
            QueryKind::Time => self.from.is_some() || self.to.is_some(),
            _ => !self.keyword.trim().is_empty(),
        }
    }

    /// Upstream query parameters for a server-paged request.
    ///
    /// Only `page` and `size` are sent for an inactive query; time queries
    /// send whichever bounds are set.
    pub fn to_params(&self, page: usize, size: usize) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), page.to_string()),
            ("size".to_string(), size.to_string()),
        ];
        if !self.is_active() {
            return params;
        }
        params.push(("qType".to_string(), self.kind.as_param().to_string()));
        match self.kind {
            QueryKind::Time => {
                if let Some(from) = self.from {
                    params.push(("from".to_string(), from.format("%Y-%m-%d").to_string()));
                }
                if let Some(to) = self.to {
                    params.push(("to".to_string(), to.format("%Y-%m-%d").to_string()));
                }
            }
            _ => params.push(("q".to_string(), self.keyword.trim().to_string())),
        }
        params
    }
}
