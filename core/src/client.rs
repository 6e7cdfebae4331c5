//! Stateless request builder and response parser for the registry API.
//!
//! # Design
//! `CtGovClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that turns a
//! validated request into an `HttpRequest` and a `parse_*` method that turns
//! the `HttpResponse` into the caller-facing payload. The caller executes the
//! actual HTTP round-trip in between.
//!
//! Success payloads are strings: JSON bodies are re-serialized with 2-space
//! indentation (upstream key order kept), CSV bodies pass through untouched.

use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::query::{translate_field_values, translate_get_study, translate_search, TranslatedQuery};
use crate::request::{FieldValuesLookup, StudyLookup, StudySearch};
use crate::types::ResponseFormat;

/// Public v2 API root.
pub const DEFAULT_BASE_URL: &str = "https://clinicaltrials.gov/api/v2";

/// Synchronous, stateless client for the registry API.
#[derive(Debug, Clone)]
pub struct CtGovClient {
    base_url: String,
}

impl Default for CtGovClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl CtGovClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /studies/{nctId}`.
    pub fn build_get_study(&self, lookup: &StudyLookup) -> HttpRequest {
        self.get(
            format!("{}/studies/{}", self.base_url, lookup.nct_id),
            &translate_get_study(lookup),
            lookup.format,
        )
    }

    /// `GET /studies`.
    pub fn build_search_studies(&self, search: &StudySearch) -> HttpRequest {
        self.get(
            format!("{}/studies", self.base_url),
            &translate_search(search),
            search.format,
        )
    }

    /// `GET /stats/fieldValues`.
    pub fn build_get_field_values(&self, lookup: &FieldValuesLookup) -> HttpRequest {
        self.get(
            format!("{}/stats/fieldValues", self.base_url),
            &translate_field_values(lookup),
            ResponseFormat::Json,
        )
    }

    pub fn parse_get_study(
        &self,
        lookup: &StudyLookup,
        response: HttpResponse,
    ) -> Result<String, ApiError> {
        self.parse_payload(lookup.format, response)
    }

    pub fn parse_search_studies(
        &self,
        search: &StudySearch,
        response: HttpResponse,
    ) -> Result<String, ApiError> {
        self.parse_payload(search.format, response)
    }

    /// Field distributions only come back as JSON.
    pub fn parse_get_field_values(&self, response: HttpResponse) -> Result<String, ApiError> {
        self.parse_payload(ResponseFormat::Json, response)
    }

    /// Status check plus body formatting for a response requested in `format`.
    /// For callers that kept the format but not the validated request.
    pub fn parse_payload(
        &self,
        format: ResponseFormat,
        response: HttpResponse,
    ) -> Result<String, ApiError> {
        check_status(&response)?;
        format_body(format, response.body)
    }

    fn get(&self, url: String, query: &TranslatedQuery, format: ResponseFormat) -> HttpRequest {
        HttpRequest {
            url,
            query: query.to_pairs(),
            headers: vec![("accept".to_string(), format.media_type().to_string())],
        }
    }
}

/// Collapse a parse outcome into the single string handed to the caller.
pub fn render(result: Result<String, ApiError>) -> String {
    result.unwrap_or_else(|err| err.user_message())
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, &response.body))
}

fn format_body(format: ResponseFormat, body: String) -> Result<String, ApiError> {
    match format {
        ResponseFormat::Csv => Ok(body),
        ResponseFormat::Json => {
            let value: Value = serde_json::from_str(&body).map_err(decode_error)?;
            serde_json::to_string_pretty(&value).map_err(decode_error)
        }
    }
}

fn decode_error(err: serde_json::Error) -> ApiError {
    ApiError::Unexpected {
        kind: "DecodeError".to_string(),
        message: err.to_string(),
    }
}
