//! Validation: raw inputs in, validated request values out.
//!
//! # Design
//! Validation runs in two stages. Strict deserialization (`from_value`)
//! checks shape, enum membership and unknown keys; `validate` then checks
//! every remaining constraint in one pass and reports all violations
//! together. Blank strings and empty lists are normalized to "absent" here,
//! so later stages never see a present-but-empty value.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ValidationError, Violation};
use crate::fields::StudyField;
use crate::types::{
    GetFieldValuesInput, GetStudyInput, MarkupFormat, OverallStatus, ResponseFormat,
    SearchStudiesInput,
};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MIN_PAGE_SIZE: i64 = 1;
pub const MAX_PAGE_SIZE: i64 = 1000;

const FACET_REQUIRED_MESSAGE: &str = "At least one query parameter (query_cond, query_term, \
     query_intr, query_titles, query_id, query_spons, query_locn, query_patient) or filter_ids \
     must be provided.";

/// A validated single-study lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyLookup {
    /// Always uppercase and matching `^NCT\d+$`.
    pub nct_id: String,
    pub format: ResponseFormat,
    pub markup_format: MarkupFormat,
    /// Empty means "all fields".
    pub fields: Vec<StudyField>,
}

/// The eight free-text facets of a search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFacets {
    pub cond: Option<String>,
    pub term: Option<String>,
    pub intr: Option<String>,
    pub titles: Option<String>,
    pub id: Option<String>,
    pub spons: Option<String>,
    pub locn: Option<String>,
    pub patient: Option<String>,
}

impl QueryFacets {
    pub fn is_empty(&self) -> bool {
        [
            &self.cond,
            &self.term,
            &self.intr,
            &self.titles,
            &self.id,
            &self.spons,
            &self.locn,
            &self.patient,
        ]
        .iter()
        .all(|facet| facet.is_none())
    }
}

/// A validated search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySearch {
    pub query: QueryFacets,
    pub filter_overall_status: Vec<OverallStatus>,
    pub filter_geo: Option<String>,
    pub filter_ids: Vec<String>,
    pub post_filter_overall_status: Vec<OverallStatus>,
    pub post_filter_geo: Option<String>,
    pub agg_filters: Option<String>,
    pub sort: Option<String>,
    pub page_size: u32,
    pub page_token: Option<String>,
    pub count_total: bool,
    pub format: ResponseFormat,
    pub markup_format: MarkupFormat,
    pub fields: Vec<StudyField>,
}

/// A validated field-distribution lookup. `fields` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValuesLookup {
    pub fields: Vec<StudyField>,
}

impl GetStudyInput {
    /// Strictly deserialize tool-call arguments.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        deserialize_strict(value)
    }

    pub fn validate(&self) -> Result<StudyLookup, ValidationError> {
        let mut violations = Vec::new();

        let nct_id = self.nct_id.trim().to_uppercase();
        if !is_nct_id(&nct_id) {
            violations.push(violation(
                "nct_id",
                format!(
                    "'{}' is not an NCT identifier; expected 'NCT' followed by digits (e.g., 'NCT00000102')",
                    self.nct_id.trim()
                ),
            ));
        }
        let fields = check_fields("fields", self.fields.as_deref(), &mut violations);

        finish(violations, || StudyLookup {
            nct_id,
            format: self.format,
            markup_format: self.markup_format,
            fields,
        })
    }
}

impl SearchStudiesInput {
    /// Strictly deserialize tool-call arguments.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        deserialize_strict(value)
    }

    pub fn validate(&self) -> Result<StudySearch, ValidationError> {
        let mut violations = Vec::new();

        let query = QueryFacets {
            cond: clean(&self.query_cond),
            term: clean(&self.query_term),
            intr: clean(&self.query_intr),
            titles: clean(&self.query_titles),
            id: clean(&self.query_id),
            spons: clean(&self.query_spons),
            locn: clean(&self.query_locn),
            patient: clean(&self.query_patient),
        };
        let filter_ids: Vec<String> = self
            .filter_ids
            .iter()
            .flatten()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        if query.is_empty() && filter_ids.is_empty() {
            violations.push(violation("", FACET_REQUIRED_MESSAGE));
        }

        let page_size = match self.page_size {
            None => DEFAULT_PAGE_SIZE,
            Some(size) if (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&size) => size as u32,
            Some(size) => {
                violations.push(violation(
                    "page_size",
                    format!("must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}, got {size}"),
                ));
                DEFAULT_PAGE_SIZE
            }
        };
        let fields = check_fields("fields", self.fields.as_deref(), &mut violations);

        finish(violations, || StudySearch {
            query,
            filter_overall_status: self.filter_overall_status.clone().unwrap_or_default(),
            filter_geo: clean(&self.filter_geo),
            filter_ids,
            post_filter_overall_status: self
                .post_filter_overall_status
                .clone()
                .unwrap_or_default(),
            post_filter_geo: clean(&self.post_filter_geo),
            agg_filters: clean(&self.agg_filters),
            sort: clean(&self.sort),
            page_size,
            page_token: clean(&self.page_token),
            count_total: self.count_total,
            format: self.format,
            markup_format: self.markup_format,
            fields,
        })
    }
}

impl GetFieldValuesInput {
    /// Strictly deserialize tool-call arguments.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        deserialize_strict(value)
    }

    pub fn validate(&self) -> Result<FieldValuesLookup, ValidationError> {
        let mut violations = Vec::new();
        let fields = check_fields("fields", Some(&self.fields), &mut violations);
        if fields.is_empty() && violations.is_empty() {
            violations.push(violation("fields", "at least one field is required"));
        }
        finish(violations, || FieldValuesLookup { fields })
    }
}

/// `^NCT\d+$` on an already-uppercased identifier.
pub fn is_nct_id(candidate: &str) -> bool {
    candidate
        .strip_prefix("NCT")
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn deserialize_strict<T: DeserializeOwned>(value: Value) -> Result<T, ValidationError> {
    serde_json::from_value(value).map_err(ValidationError::from)
}

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn check_fields(
    key: &str,
    names: Option<&[String]>,
    violations: &mut Vec<Violation>,
) -> Vec<StudyField> {
    let mut fields = Vec::new();
    for name in names.unwrap_or_default() {
        let name = name.trim();
        match StudyField::parse(name) {
            Some(field) => fields.push(field),
            None => violations.push(violation(key, format!("unknown field name '{name}'"))),
        }
    }
    fields
}

fn violation(field: &str, message: impl Into<String>) -> Violation {
    Violation {
        field: field.to_string(),
        message: message.into(),
    }
}

fn finish<T>(violations: Vec<Violation>, build: impl FnOnce() -> T) -> Result<T, ValidationError> {
    if violations.is_empty() {
        Ok(build())
    } else {
        Err(ValidationError::new(violations))
    }
}
