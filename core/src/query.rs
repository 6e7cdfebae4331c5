//! Translation from validated requests to the registry's query vocabulary.
//!
//! The registry takes flat, dot-notation keys (`query.cond`,
//! `filter.overallStatus`, `postFilter.geo`), comma-joined lists and
//! lowercase boolean strings. Absent optionals never produce a key.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::fields::join_fields;
use crate::request::{FieldValuesLookup, QueryFacets, StudyLookup, StudySearch};
use crate::types::OverallStatus;

/// One query-string value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Text(String),
    Number(u32),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Number(value)
    }
}

/// Flat wire parameters for one request. Key order carries no meaning; the
/// map is ordered only so output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TranslatedQuery(BTreeMap<&'static str, QueryValue>);

impl TranslatedQuery {
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &QueryValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Rendered `(key, value)` pairs ready for a query string.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn set(&mut self, key: &'static str, value: impl Into<QueryValue>) {
        self.0.insert(key, value.into());
    }

    fn set_opt(&mut self, key: &'static str, value: Option<&str>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    fn set_joined(&mut self, key: &'static str, joined: String) {
        if !joined.is_empty() {
            self.set(key, joined);
        }
    }
}

pub fn translate_get_study(lookup: &StudyLookup) -> TranslatedQuery {
    let mut query = TranslatedQuery::default();
    query.set("format", lookup.format.as_str());
    query.set("markupFormat", lookup.markup_format.as_str());
    query.set_joined("fields", join_fields(&lookup.fields));
    query
}

pub fn translate_search(search: &StudySearch) -> TranslatedQuery {
    let mut query = TranslatedQuery::default();
    query.set("format", search.format.as_str());
    query.set("markupFormat", search.markup_format.as_str());
    query.set("pageSize", search.page_size);
    query.set("countTotal", if search.count_total { "true" } else { "false" });

    for (key, value) in facet_params(&search.query) {
        query.set_opt(key, value);
    }

    query.set_joined("filter.overallStatus", join_statuses(&search.filter_overall_status));
    query.set_opt("filter.geo", search.filter_geo.as_deref());
    query.set_joined("filter.ids", search.filter_ids.join(","));
    query.set_joined(
        "postFilter.overallStatus",
        join_statuses(&search.post_filter_overall_status),
    );
    query.set_opt("postFilter.geo", search.post_filter_geo.as_deref());
    query.set_opt("aggFilters", search.agg_filters.as_deref());

    query.set_opt("sort", search.sort.as_deref());
    query.set_opt("pageToken", search.page_token.as_deref());
    query.set_joined("fields", join_fields(&search.fields));
    query
}

pub fn translate_field_values(lookup: &FieldValuesLookup) -> TranslatedQuery {
    let mut query = TranslatedQuery::default();
    query.set("fields", join_fields(&lookup.fields));
    query
}

fn facet_params(facets: &QueryFacets) -> [(&'static str, Option<&str>); 8] {
    [
        ("query.cond", facets.cond.as_deref()),
        ("query.term", facets.term.as_deref()),
        ("query.intr", facets.intr.as_deref()),
        ("query.titles", facets.titles.as_deref()),
        ("query.id", facets.id.as_deref()),
        ("query.spons", facets.spons.as_deref()),
        ("query.locn", facets.locn.as_deref()),
        ("query.patient", facets.patient.as_deref()),
    ]
}

fn join_statuses(statuses: &[OverallStatus]) -> String {
    statuses
        .iter()
        .map(OverallStatus::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
