//! Input schema for the three registry operations.
//!
//! # Design
//! These structs describe caller input exactly as it arrives on the wire
//! (tool-call JSON, CLI flags, FFI strings). Serde enforces the closed sets:
//! unknown enum values and unknown top-level keys fail deserialization.
//! Everything that needs more than shape checking (identifier pattern, page
//! size range, field catalog membership, the search facet rule) lives in
//! `request`, which turns these into validated values.
//!
//! Doc comments on fields double as the published JSON schema descriptions.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Response body format requested from the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Structured JSON (default).
    #[default]
    Json,
    /// Tabular CSV text.
    Csv,
}

impl ResponseFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Media type sent in the `accept` header.
    pub const fn media_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markup used for rich-text fields inside study records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MarkupFormat {
    /// Markdown (default).
    #[default]
    Markdown,
    /// The registry's legacy markup.
    Legacy,
}

impl MarkupFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for MarkupFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall recruitment status of a study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Recruiting,
    NotYetRecruiting,
    ActiveNotRecruiting,
    Completed,
    EnrollingByInvitation,
    Terminated,
    Withdrawn,
    Suspended,
    Unknown,
}

impl OverallStatus {
    pub const ALL: [OverallStatus; 9] = [
        Self::Recruiting,
        Self::NotYetRecruiting,
        Self::ActiveNotRecruiting,
        Self::Completed,
        Self::EnrollingByInvitation,
        Self::Terminated,
        Self::Withdrawn,
        Self::Suspended,
        Self::Unknown,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recruiting => "RECRUITING",
            Self::NotYetRecruiting => "NOT_YET_RECRUITING",
            Self::ActiveNotRecruiting => "ACTIVE_NOT_RECRUITING",
            Self::Completed => "COMPLETED",
            Self::EnrollingByInvitation => "ENROLLING_BY_INVITATION",
            Self::Terminated => "TERMINATED",
            Self::Withdrawn => "WITHDRAWN",
            Self::Suspended => "SUSPENDED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse the wire spelling. Case-sensitive, matching the registry.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for `clinicaltrials_get_study`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetStudyInput {
    /// NCT identifier for the clinical study (e.g., 'NCT00000102'). Must be
    /// 'NCT' followed by digits; lowercase input is accepted and uppercased.
    pub nct_id: String,

    /// Response format: 'json' (default) for structured data or 'csv' for
    /// tabular output.
    #[serde(default)]
    pub format: ResponseFormat,

    /// Markup format for text fields: 'markdown' (default) or 'legacy'.
    #[serde(default)]
    pub markup_format: MarkupFormat,

    /// Specific fields to include in the response (e.g., ['NCTId',
    /// 'BriefTitle', 'OverallStatus', 'Phase']). Omit to return all fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

/// Input for `clinicaltrials_search_studies`.
///
/// At least one `query_*` facet or `filter_ids` must be provided.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchStudiesInput {
    /// Search by condition or disease (e.g., 'diabetes', 'breast cancer').
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_cond: Option<String>,

    /// General keyword search across all study fields (e.g., 'mRNA vaccine').
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_term: Option<String>,

    /// Search by intervention or treatment name (e.g., 'insulin').
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_intr: Option<String>,

    /// Search within study titles only (e.g., 'long COVID fatigue').
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_titles: Option<String>,

    /// Search by study ID, including NCT IDs and secondary identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,

    /// Search by sponsor or collaborator name (e.g., 'NIH', 'Pfizer').
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_spons: Option<String>,

    /// Search by location terms such as facility name or city (e.g., 'Boston').
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_locn: Option<String>,

    /// Patient-friendly search using plain language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_patient: Option<String>,

    /// Filter by recruitment status (e.g., ['RECRUITING', 'COMPLETED']).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_overall_status: Option<Vec<OverallStatus>>,

    /// Geographic radius filter, 'distance(lat,lon,radius)' with 'mi' or
    /// 'km' (e.g., 'distance(39.0,-77.0,50mi)').
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_geo: Option<String>,

    /// Restrict results to these NCT IDs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_ids: Option<Vec<String>>,

    /// Same as filter_overall_status but applied after aggregation counts
    /// are computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_filter_overall_status: Option<Vec<OverallStatus>>,

    /// Same as filter_geo but applied after aggregation counts are computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_filter_geo: Option<String>,

    /// Aggregation filters, e.g. 'phase:2 3,studyType:int'. Phase values:
    /// 0 (early phase 1), 1, 2, 3, 4, na. Study types: int, obs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agg_filters: Option<String>,

    /// Sort order as 'field:direction', e.g. 'LastUpdatePostDate:desc'.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    /// Number of studies per page (1-1000, default 20).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1, max = 1000))]
    pub page_size: Option<i64>,

    /// Cursor returned as 'nextPageToken' by a previous search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,

    /// Include the total number of matching studies in the response.
    #[serde(default)]
    pub count_total: bool,

    /// Response format: 'json' (default) or 'csv'.
    #[serde(default)]
    pub format: ResponseFormat,

    /// Markup format for text fields: 'markdown' (default) or 'legacy'.
    #[serde(default)]
    pub markup_format: MarkupFormat,

    /// Specific fields to return. Omit to return all fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

/// Input for `clinicaltrials_get_field_values`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetFieldValuesInput {
    /// One or more fields to get value distributions for. Best suited to
    /// enumerable fields such as Phase, OverallStatus, StudyType, Sex,
    /// StdAge, LeadSponsorClass, InterventionType, LocationCountry.
    pub fields: Vec<String>,
}
