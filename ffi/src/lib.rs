//! C-ABI wrapper around `ctgov-core`.
//!
//! # Overview
//! Exposes the three registry operations through `extern "C"` functions so
//! any language with a C FFI can validate input, build the GET request and
//! normalize the response without linking an async runtime or serde.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Operation parameters cross as a JSON string, the same document a tool
//!   host would send. `ctgov_build_*` validates it and either returns the
//!   request or every violation at once.
//! - `ctgov_parse_*` always yields one output string: the payload, or the
//!   normalized `"Error: "` message, tagged with an `FfiErrorCode`.
//! - The C caller owns all returned pointers and must call the matching
//!   `ctgov_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use ctgov_core::{
    ApiError, GetFieldValuesInput, GetStudyInput, HttpRequest, HttpResponse, ResponseFormat,
    SearchStudiesInput, TransportError, ValidationError,
};
use serde_json::Value;

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url` (e.g.
/// `https://clinicaltrials.gov/api/v2`).
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `ctgov_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_client_new(base_url: *const c_char) -> *mut FfiCtgovClient {
    catch_unwind(|| {
        let Some(url) = read_str(base_url) else {
            return std::ptr::null_mut();
        };
        let client = ctgov_core::CtGovClient::new(url);
        Box::into_raw(Box::new(FfiCtgovClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `ctgov_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_client_free(client: *mut FfiCtgovClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Read a NUL-terminated UTF-8 string. Null and invalid UTF-8 yield `None`.
fn read_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

fn read_params(params_json: *const c_char) -> Result<Value, ValidationError> {
    let raw = read_str(params_json)
        .ok_or_else(|| ValidationError::single("", "parameters are not valid UTF-8"))?;
    Ok(serde_json::from_str(raw)?)
}

/// Shared shape of the three builders: null checks, JSON decode, validate,
/// build.
fn build_with(
    client: *const FfiCtgovClient,
    params_json: *const c_char,
    build: impl FnOnce(&ctgov_core::CtGovClient, Value) -> Result<(HttpRequest, ResponseFormat), ValidationError>,
) -> *mut FfiBuildResult {
    if client.is_null() {
        return FfiBuildResult::null_arg("client");
    }
    if params_json.is_null() {
        return FfiBuildResult::null_arg("params_json");
    }
    let client = unsafe { &*client };
    match read_params(params_json).and_then(|params| build(&client.inner, params)) {
        Ok((req, format)) => FfiBuildResult::ok(req, format),
        Err(err) => FfiBuildResult::invalid(err),
    }
}

/// Build the request for fetching one study.
///
/// `params_json` is an object such as `{"nct_id":"NCT04280705","format":"csv"}`.
/// The caller must free the returned pointer with `ctgov_free_build_result`.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_build_get_study(
    client: *const FfiCtgovClient,
    params_json: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(|| {
        build_with(client, params_json, |client, params| {
            let lookup = GetStudyInput::from_value(params)?.validate()?;
            Ok((client.build_get_study(&lookup), lookup.format))
        })
    })
    .unwrap_or_else(|_| FfiBuildResult::panic("panic in ctgov_build_get_study"))
}

/// Build the request for a study search.
///
/// At least one `query_*` parameter or `filter_ids` must be present.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_build_search_studies(
    client: *const FfiCtgovClient,
    params_json: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(|| {
        build_with(client, params_json, |client, params| {
            let search = SearchStudiesInput::from_value(params)?.validate()?;
            Ok((client.build_search_studies(&search), search.format))
        })
    })
    .unwrap_or_else(|_| FfiBuildResult::panic("panic in ctgov_build_search_studies"))
}

/// Build the request for field value distributions, e.g.
/// `{"fields":["Phase","OverallStatus"]}`.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_build_get_field_values(
    client: *const FfiCtgovClient,
    params_json: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(|| {
        build_with(client, params_json, |client, params| {
            let lookup = GetFieldValuesInput::from_value(params)?.validate()?;
            Ok((client.build_get_field_values(&lookup), ResponseFormat::Json))
        })
    })
    .unwrap_or_else(|_| FfiBuildResult::panic("panic in ctgov_build_get_field_values"))
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as empty. A 2xx body that is not UTF-8 is a decode failure; error bodies
/// are decoded lossily since they only feed the error message.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> Result<HttpResponse, ApiError> {
    if resp.body.is_null() {
        return Ok(HttpResponse::new(resp.status, ""));
    }
    let raw = unsafe { CStr::from_ptr(resp.body) };
    match raw.to_str() {
        Ok(body) => Ok(HttpResponse::new(resp.status, body)),
        Err(_) if !(200..300).contains(&resp.status) => {
            Ok(HttpResponse::new(resp.status, raw.to_string_lossy()))
        }
        Err(err) => Err(ApiError::Unexpected {
            kind: "DecodeError".to_string(),
            message: format!("response body is not valid UTF-8: {err}"),
        }),
    }
}

fn parse_with(
    client: *const FfiCtgovClient,
    response: *const FfiHttpResponse,
    format: ResponseFormat,
) -> *mut FfiCtgovResult {
    if client.is_null() {
        return FfiCtgovResult::null_arg("client");
    }
    if response.is_null() {
        return FfiCtgovResult::null_arg("response");
    }
    let client = unsafe { &*client };
    let outcome = ffi_response_to_core(unsafe { &*response })
        .and_then(|resp| client.inner.parse_payload(format, resp));
    FfiCtgovResult::from_outcome(outcome)
}

/// Parse the response to a `ctgov_build_get_study` request. Pass the
/// `format` reported by the build result.
///
/// The caller must free the returned pointer with `ctgov_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_parse_get_study(
    client: *const FfiCtgovClient,
    format: FfiResponseFormat,
    response: *const FfiHttpResponse,
) -> *mut FfiCtgovResult {
    catch_unwind(|| parse_with(client, response, format.into()))
        .unwrap_or_else(|_| FfiCtgovResult::panic("panic in ctgov_parse_get_study"))
}

/// Parse the response to a `ctgov_build_search_studies` request.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_parse_search_studies(
    client: *const FfiCtgovClient,
    format: FfiResponseFormat,
    response: *const FfiHttpResponse,
) -> *mut FfiCtgovResult {
    catch_unwind(|| parse_with(client, response, format.into()))
        .unwrap_or_else(|_| FfiCtgovResult::panic("panic in ctgov_parse_search_studies"))
}

/// Parse the response to a `ctgov_build_get_field_values` request.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_parse_get_field_values(
    client: *const FfiCtgovClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCtgovResult {
    catch_unwind(|| parse_with(client, response, ResponseFormat::Json))
        .unwrap_or_else(|_| FfiCtgovResult::panic("panic in ctgov_parse_get_field_values"))
}

/// Normalize a failed round-trip where no response arrived.
///
/// `kind` names the failure class for `Other` (e.g. `"ConnectError"`) and
/// `message` describes it; both may be null.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_transport_failure(
    failure: FfiTransportFailure,
    kind: *const c_char,
    message: *const c_char,
) -> *mut FfiCtgovResult {
    catch_unwind(|| {
        let err = match failure {
            FfiTransportFailure::Timeout => TransportError::Timeout,
            FfiTransportFailure::Other => TransportError::other(
                read_str(kind).unwrap_or("TransportError"),
                read_str(message).unwrap_or(""),
            ),
        };
        FfiCtgovResult::from_error(&ApiError::from(err))
    })
    .unwrap_or_else(|_| FfiCtgovResult::panic("panic in ctgov_transport_failure"))
}

/// JSON array describing the three operations: name, description,
/// annotations and input schema.
///
/// Returns null on failure. Free with `ctgov_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_tool_catalog() -> *mut c_char {
    catch_unwind(|| match serde_json::to_string(&ctgov_core::tools::catalog()) {
        Ok(json) => c_string(json),
        Err(_) => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiBuildResult` and the request it owns. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_free_build_result(result: *mut FfiBuildResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if !result.request.is_null() {
            FfiHttpRequest::free(result.request);
        }
    });
}

/// Free an `FfiCtgovResult` returned by any `ctgov_parse_*` function or
/// `ctgov_transport_failure`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_free_result(result: *mut FfiCtgovResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.output);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ctgov_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod roundtrip_tests;
