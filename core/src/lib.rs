//! I/O-free core of the ClinicalTrials.gov v2 proxy.
//!
//! # Overview
//! Validates caller input for the three read-only registry operations,
//! translates it into the registry's query vocabulary, builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network
//! (host-does-IO pattern). The caller executes the HTTP round-trip.
//!
//! # Design
//! - `types` is the wire schema; `request` turns it into validated values.
//! - `query` is the pure translator; `client` wraps it into requests and
//!   formats responses.
//! - `error` owns the fixed vocabulary of `"Error: "` strings. Validation
//!   failures are a separate type and never pass through it.
//! - `tools` describes the operations for tool hosts.

pub mod client;
pub mod error;
pub mod fields;
pub mod http;
pub mod query;
pub mod request;
pub mod tools;
pub mod types;

pub use client::{render, CtGovClient, DEFAULT_BASE_URL};
pub use error::{ApiError, TransportError, ValidationError, Violation};
pub use fields::{StudyField, STUDY_FIELDS};
pub use http::{HttpRequest, HttpResponse};
pub use query::{QueryValue, TranslatedQuery};
pub use request::{FieldValuesLookup, QueryFacets, StudyLookup, StudySearch};
pub use tools::ToolKind;
pub use types::{
    GetFieldValuesInput, GetStudyInput, MarkupFormat, OverallStatus, ResponseFormat,
    SearchStudiesInput,
};
