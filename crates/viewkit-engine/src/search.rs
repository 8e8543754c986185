//! Client-side evaluation of typed queries.
//!
//! Filtering only ever narrows: inactive queries match everything, and a
//! record without a usable timestamp is never excluded by a time query.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use viewkit_model::{Query, QueryKind, Record, ResourceProfile};

/// Accepted naive timestamp layouts, tried in order.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Evaluates [`Query`] values against records of one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    author_fields: Vec<String>,
    content_fields: Vec<String>,
    time_fields: Vec<String>,
}

impl SearchFilter {
    pub fn new(author_fields: Vec<String>, content_fields: Vec<String>, time_fields: Vec<String>) -> Self {
        Self {
            author_fields,
            content_fields,
            time_fields,
        }
    }

    pub fn from_profile(profile: &ResourceProfile) -> Self {
        Self::new(
            profile.author_fields.clone(),
            profile.content_fields.clone(),
            profile.time_fields.clone(),
        )
    }

    /// Returns true if `record` satisfies `query`.
    pub fn matches(&self, record: &Record, query: &Query) -> bool {
        if !query.is_active() {
            return true;
        }
        match query.kind {
            QueryKind::Time => self.matches_time(record, query.from, query.to),
            QueryKind::Author => keyword_hit(record, &self.author_fields, &query.keyword),
            QueryKind::Content => keyword_hit(record, &self.content_fields, &query.keyword),
            QueryKind::All => {
                keyword_hit(record, &self.author_fields, &query.keyword)
                    || keyword_hit(record, &self.content_fields, &query.keyword)
            }
        }
    }

    /// Keep the records matching `query`, preserving order.
    pub fn filter<'a, I>(&self, records: I, query: &Query) -> Vec<&'a Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .filter(|record| self.matches(record, query))
            .collect()
    }

    fn matches_time(&self, record: &Record, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        let Some(stamp) = self.record_time(record) else {
            return true;
        };
        if let Some(from) = from {
            if stamp < from.and_time(NaiveTime::MIN) {
                return false;
            }
        }
        if let Some(to) = to {
            let end = to.and_time(NaiveTime::MIN) + Duration::hours(24) - Duration::milliseconds(1);
            if stamp > end {
                return false;
            }
        }
        true
    }

    /// First candidate time field that parses.
    fn record_time(&self, record: &Record) -> Option<NaiveDateTime> {
        self.time_fields
            .iter()
            .find_map(|field| record.get(field).and_then(parse_timestamp))
    }
}

fn keyword_hit(record: &Record, fields: &[String], keyword: &str) -> bool {
    let needle = keyword.trim().to_lowercase();
    let haystack = fields
        .iter()
        .filter_map(|field| record.scalar_string(field))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    haystack.contains(&needle)
}

/// Parse a timestamp value into naive local time.
///
/// Accepts RFC 3339 (the wall-clock part is kept, the offset ignored), naive
/// datetimes, bare dates (midnight) and epoch milliseconds (UTC).
pub fn parse_timestamp(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|stamp| stamp.naive_utc()),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewkit_model::record;

    fn filter() -> SearchFilter {
        SearchFilter::new(
            vec!["writerName".into(), "writerId".into()],
            vec!["title".into(), "content".into()],
            vec!["createdAt".into(), "created_at".into()],
        )
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn to_bound_is_inclusive_through_end_of_day() {
        let query = Query::time_range(Some(date("2024-01-01")), Some(date("2024-01-01")));
        assert!(filter().matches(&record!({"createdAt": "2024-01-01T23:59:59"}), &query));
        assert!(!filter().matches(&record!({"createdAt": "2024-01-02T00:00:01"}), &query));
        assert!(!filter().matches(&record!({"createdAt": "2023-12-31T23:59:59"}), &query));
    }

    #[test]
    fn open_ended_ranges() {
        let since = Query::time_range(Some(date("2024-03-01")), None);
        assert!(filter().matches(&record!({"createdAt": "2030-01-01 00:00:00"}), &since));
        assert!(!filter().matches(&record!({"createdAt": "2024-02-29"}), &since));

        let until = Query::time_range(None, Some(date("2024-03-01")));
        assert!(filter().matches(&record!({"created_at": "2024-03-01T12:00"}), &until));
    }

    #[test]
    fn records_without_time_always_match() {
        let query = Query::time_range(Some(date("2024-01-01")), Some(date("2024-01-01")));
        assert!(filter().matches(&record!({"title": "undated"}), &query));
        assert!(filter().matches(&record!({"createdAt": "garbage"}), &query));
    }

    #[test]
    fn accepts_rfc3339_and_epoch_millis() {
        let query = Query::time_range(Some(date("2024-01-01")), Some(date("2024-01-01")));
        assert!(filter().matches(&record!({"createdAt": "2024-01-01T10:00:00+09:00"}), &query));
        // 2024-01-01T12:00:00Z
        assert!(filter().matches(&record!({"createdAt": 1_704_110_400_000_i64}), &query));
        assert!(!filter().matches(&record!({"createdAt": 1_704_240_000_000_i64}), &query));
    }

    #[test]
    fn keyword_kinds_compare_their_own_fields() {
        let post = record!({"writerName": "Kim", "title": "Bus schedule", "content": "Route 5"});
        let f = filter();
        assert!(f.matches(&post, &Query::keyword(QueryKind::Author, "KIM")));
        assert!(!f.matches(&post, &Query::keyword(QueryKind::Author, "bus")));
        assert!(f.matches(&post, &Query::keyword(QueryKind::Content, " route ")));
        assert!(!f.matches(&post, &Query::keyword(QueryKind::Content, "kim")));
        assert!(f.matches(&post, &Query::keyword(QueryKind::All, "kim")));
        assert!(f.matches(&post, &Query::keyword(QueryKind::All, "schedule")));
        assert!(!f.matches(&post, &Query::keyword(QueryKind::All, "train")));
    }

    #[test]
    fn inactive_queries_match_everything() {
        let f = filter();
        let empty = record!({});
        assert!(f.matches(&empty, &Query::keyword(QueryKind::Author, "  ")));
        assert!(f.matches(&empty, &Query::time_range(None, None)));
    }

    #[test]
    fn filter_preserves_order() {
        let rows = [
            record!({"title": "a bus"}),
            record!({"title": "a train"}),
            record!({"title": "b bus"}),
        ];
        let hits = filter().filter(&rows, &Query::keyword(QueryKind::Content, "bus"));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].text("title"), Some("b bus"));
    }
}
