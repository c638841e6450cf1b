//! Filter-to-query translation.
//!
//! `compose` turns the ephemeral [`FilterSelection`] a browsing surface holds
//! into a single store-agnostic [`ListQuery`]: conjunctive predicates, one
//! sort order, and a fixed result cap. The evaluation half (`matches`,
//! `apply`) lives here too so the memory and DynamoDB backends share exactly
//! one predicate semantics.

use crate::models::{Format, Tone};
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;

/// Fixed result cap per query. Pagination beyond the first 50 records is
/// client-side; matches past the cap are unreachable through this path.
pub const QUERY_LIMIT: usize = 50;

/// A single field predicate. All predicates on a query are conjunctive.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Exact equality on a field.
    Eq(String, Value),
    /// Case-insensitive substring match against a string field.
    Contains(String, String),
    /// Set membership: the field equals one of the given values.
    In(String, Vec<Value>),
}

impl Condition {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Condition::Eq(field.to_string(), value.into())
    }

    pub fn contains(field: &str, needle: &str) -> Self {
        Condition::Contains(field.to_string(), needle.to_string())
    }

    pub fn is_in(field: &str, values: Vec<Value>) -> Self {
        Condition::In(field.to_string(), values)
    }

    /// Whether a JSON record satisfies this predicate. A missing field is
    /// treated as JSON null.
    pub fn matches(&self, record: &Value) -> bool {
        let field_value = |f: &str| record.get(f).cloned().unwrap_or(Value::Null);
        match self {
            Condition::Eq(field, expected) => values_equal(&field_value(field), expected),
            Condition::Contains(field, needle) => field_value(field)
                .as_str()
                .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase())),
            Condition::In(field, values) => {
                let actual = field_value(field);
                values.iter().any(|v| values_equal(&actual, v))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Sort order of a query: exactly one field, one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: &str) -> Self {
        Sort { field: field.to_string(), direction: Direction::Asc }
    }

    pub fn desc(field: &str) -> Self {
        Sort { field: field.to_string(), direction: Direction::Desc }
    }
}

/// The structured, store-agnostic query description handed to a
/// [`crate::domain::DataStore`]: predicates + ordering + result cap.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub conditions: Vec<Condition>,
    pub sort: Sort,
    pub limit: usize,
}

impl ListQuery {
    /// An unfiltered query with the default newest-first ordering.
    pub fn all() -> Self {
        ListQuery {
            conditions: Vec::new(),
            sort: Sort::desc("created_at"),
            limit: QUERY_LIMIT,
        }
    }

    pub fn filtered(conditions: Vec<Condition>) -> Self {
        ListQuery { conditions, ..ListQuery::all() }
    }

    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Evaluates the query against an in-memory record set:
    /// filter, then sort, then truncate to the cap.
    pub fn apply(&self, records: Vec<Value>) -> Vec<Value> {
        let mut matched: Vec<Value> = records
            .into_iter()
            .filter(|r| self.conditions.iter().all(|c| c.matches(r)))
            .collect();
        matched.sort_by(|a, b| {
            let av = a.get(&self.sort.field).unwrap_or(&Value::Null);
            let bv = b.get(&self.sort.field).unwrap_or(&Value::Null);
            match self.sort.direction {
                Direction::Asc => value_cmp(av, bv),
                Direction::Desc => value_cmp(bv, av),
            }
        });
        matched.truncate(self.limit);
        matched
    }
}

/// Sort key selected by the browsing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Newest,
    Trending,
    MostDownloaded,
    MostLiked,
    Alphabetical,
}

impl SortKey {
    pub fn sort(&self) -> Sort {
        match self {
            SortKey::Newest => Sort::desc("created_at"),
            // "Trending" ranks by downloads, same as most-downloaded.
            SortKey::Trending | SortKey::MostDownloaded => Sort::desc("downloads"),
            SortKey::MostLiked => Sort::desc("likes"),
            SortKey::Alphabetical => Sort::asc("title"),
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortKey::Newest),
            "trending" => Ok(SortKey::Trending),
            "most-downloaded" => Ok(SortKey::MostDownloaded),
            "most-liked" => Ok(SortKey::MostLiked),
            "alphabetical" => Ok(SortKey::Alphabetical),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Ephemeral browsing state: zero or more selected values per filterable
/// dimension. Empty/absent means "no constraint on this dimension".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub tones: Vec<Tone>,
    pub formats: Vec<Format>,
    pub use_cases: Vec<String>,
    pub trending: bool,
    pub featured: bool,
    pub sort: Option<SortKey>,
    /// Free-text search term; matched against titles only.
    pub query: Option<String>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        *self == FilterSelection::default()
    }
}

/// Translates a filter selection into one query description. Pure: no
/// network or storage access, same input always yields the same query.
///
/// Multi-select tone/format lists honor only the *first* selected value;
/// the rest are dropped from the predicate. This narrowing is carried over
/// deliberately from the source behavior rather than widened into an OR.
pub fn compose(filters: &FilterSelection) -> ListQuery {
    let mut conditions = Vec::new();

    if let Some(category) = &filters.category {
        conditions.push(Condition::eq("category", category.as_str()));
    }
    if let Some(subcategory) = &filters.subcategory {
        conditions.push(Condition::eq("subcategory", subcategory.as_str()));
    }
    if let Some(tone) = filters.tones.first() {
        conditions.push(Condition::eq("tone", tone.as_str()));
    }
    if let Some(format) = filters.formats.first() {
        conditions.push(Condition::eq("format", format.as_str()));
    }
    if filters.trending {
        conditions.push(Condition::eq("is_trending", true));
    }
    if filters.featured {
        conditions.push(Condition::eq("is_featured", true));
    }
    if let Some(term) = filters.query.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        conditions.push(Condition::contains("title", term));
    }

    let sort = filters.sort.unwrap_or_default().sort();
    ListQuery { conditions, sort, limit: QUERY_LIMIT }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        // Numbers compare by value, not representation (1 == 1.0).
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Total order over JSON values for sorting: null < bool < number < string.
/// RFC 3339 timestamp strings compare chronologically, since lexicographic
/// order breaks down across differing fractional-second precision.
pub fn value_cmp(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => {
            use chrono::{DateTime, FixedOffset};
            match (
                DateTime::<FixedOffset>::parse_from_rfc3339(x),
                DateTime::<FixedOffset>::parse_from_rfc3339(y),
            ) {
                (Ok(tx), Ok(ty)) => tx.cmp(&ty),
                _ => x.cmp(y),
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_selection_yields_unconstrained_newest_query() {
        let filters = FilterSelection::default();
        assert!(filters.is_empty());
        let query = compose(&filters);
        assert!(query.conditions.is_empty());
        assert_eq!(query.sort, Sort::desc("created_at"));
        assert_eq!(query.limit, QUERY_LIMIT);
    }

    #[test]
    fn single_tone_becomes_equality_predicate() {
        let filters = FilterSelection { tones: vec![Tone::Funny], ..Default::default() };
        let query = compose(&filters);
        assert_eq!(query.conditions, vec![Condition::eq("tone", "funny")]);
    }

    #[test]
    fn second_tone_does_not_change_the_predicate() {
        let one = FilterSelection { tones: vec![Tone::Funny], ..Default::default() };
        let two = FilterSelection {
            tones: vec![Tone::Funny, Tone::Professional],
            ..Default::default()
        };
        assert_eq!(compose(&one), compose(&two));
    }

    #[test]
    fn use_case_selection_produces_no_predicate() {
        let filters = FilterSelection {
            use_cases: vec!["slack".to_string(), "email".to_string()],
            ..Default::default()
        };
        assert!(compose(&filters).conditions.is_empty());
    }

    #[test]
    fn whitespace_only_search_produces_no_title_predicate() {
        let filters = FilterSelection { query: Some("   \t ".to_string()), ..Default::default() };
        assert!(compose(&filters).conditions.is_empty());
    }

    #[test]
    fn composition_is_idempotent() {
        let filters = FilterSelection {
            category: Some("marketing".to_string()),
            formats: vec![Format::Meme],
            featured: true,
            sort: Some(SortKey::MostLiked),
            query: Some("deadline".to_string()),
            ..Default::default()
        };
        assert_eq!(compose(&filters), compose(&filters));
    }

    #[test]
    fn category_and_trending_scenario() {
        let filters = FilterSelection {
            category: Some("developers".to_string()),
            trending: true,
            ..Default::default()
        };
        let query = compose(&filters);
        assert_eq!(
            query.conditions,
            vec![
                Condition::eq("category", "developers"),
                Condition::eq("is_trending", true),
            ]
        );
        assert_eq!(query.sort, Sort::desc("created_at"));
        assert_eq!(query.limit, 50);
    }

    #[test]
    fn search_term_composes_with_other_predicates() {
        let filters = FilterSelection {
            category: Some("startups".to_string()),
            query: Some("  launch ".to_string()),
            ..Default::default()
        };
        let query = compose(&filters);
        assert_eq!(
            query.conditions,
            vec![
                Condition::eq("category", "startups"),
                Condition::contains("title", "launch"),
            ]
        );
    }

    #[test]
    fn sort_key_mapping() {
        assert_eq!(SortKey::Newest.sort(), Sort::desc("created_at"));
        assert_eq!(SortKey::Trending.sort(), Sort::desc("downloads"));
        assert_eq!(SortKey::MostDownloaded.sort(), Sort::desc("downloads"));
        assert_eq!(SortKey::MostLiked.sort(), Sort::desc("likes"));
        assert_eq!(SortKey::Alphabetical.sort(), Sort::asc("title"));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let condition = Condition::contains("title", "Monday");
        assert!(condition.matches(&json!({"title": "that MONDAY feeling"})));
        assert!(!condition.matches(&json!({"title": "friday"})));
        assert!(!condition.matches(&json!({"views": 3})));
    }

    #[test]
    fn missing_field_is_null_for_equality() {
        let condition = Condition::eq("subcategory", "remote-work");
        assert!(!condition.matches(&json!({"category": "developers"})));
    }

    #[test]
    fn in_condition_matches_membership() {
        let condition = Condition::is_in("id", vec![json!("a"), json!("c")]);
        assert!(condition.matches(&json!({"id": "a"})));
        assert!(!condition.matches(&json!({"id": "b"})));
    }

    #[test]
    fn apply_filters_sorts_and_truncates() {
        let records: Vec<Value> = (0..60)
            .map(|i| json!({"id": i.to_string(), "downloads": i, "kept": true}))
            .collect();
        let query = ListQuery::filtered(vec![Condition::eq("kept", true)])
            .sorted(Sort::desc("downloads"));
        let result = query.apply(records);
        assert_eq!(result.len(), QUERY_LIMIT);
        assert_eq!(result[0]["downloads"], json!(59));
        assert_eq!(result[49]["downloads"], json!(10));
    }

    #[test]
    fn apply_orders_rfc3339_timestamps_chronologically() {
        let older = json!({"id": "old", "created_at": "2026-01-01T00:00:00Z"});
        // Chronologically later, but lexicographically smaller ('.' < 'Z').
        let newer = json!({"id": "new", "created_at": "2026-01-01T00:00:00.500Z"});
        let result = ListQuery::all().apply(vec![older, newer]);
        assert_eq!(result[0]["id"], json!("new"));
    }
}
