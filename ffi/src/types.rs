//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.
//!
//! Strings handed to C never fail to convert: an interior NUL (impossible for
//! the values produced here, but not statically ruled out) becomes an empty
//! string rather than a panic.

use std::ffi::CString;
use std::os::raw::c_char;

use ctgov_core::{ApiError, ResponseFormat, ValidationError};

/// Opaque handle to a `CtGovClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiCtgovClient {
    pub(crate) inner: ctgov_core::CtGovClient,
}

pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Free a string produced by `c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Response format the registry was asked for. Pass it back to the matching
/// `ctgov_parse_*` call.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiResponseFormat {
    Json = 0,
    Csv = 1,
}

impl From<ResponseFormat> for FfiResponseFormat {
    fn from(f: ResponseFormat) -> Self {
        match f {
            ResponseFormat::Json => FfiResponseFormat::Json,
            ResponseFormat::Csv => FfiResponseFormat::Csv,
        }
    }
}

impl From<FfiResponseFormat> for ResponseFormat {
    fn from(f: FfiResponseFormat) -> Self {
        match f {
            FfiResponseFormat::Json => ResponseFormat::Json,
            FfiResponseFormat::Csv => ResponseFormat::Csv,
        }
    }
}

/// A key-value pair of C strings, used for query parameters and headers.
#[repr(C)]
pub struct FfiPair {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A GET request described as C-compatible plain data.
///
/// Query values are not percent-encoded; the C caller encodes them when it
/// assembles the final URL.
#[repr(C)]
pub struct FfiHttpRequest {
    pub url: *mut c_char,
    pub query: *mut FfiPair,
    pub query_len: u32,
    pub headers: *mut FfiPair,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: ctgov_core::HttpRequest) -> *mut Self {
        let (query, query_len) = pairs_into_raw(req.query);
        let (headers, headers_len) = pairs_into_raw(req.headers);
        Box::into_raw(Box::new(FfiHttpRequest {
            url: c_string(req.url),
            query,
            query_len,
            headers,
            headers_len,
        }))
    }

    /// Release everything owned by the request, then the request itself.
    pub(crate) fn free(req: *mut Self) {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_pairs(req.query, req.query_len);
        free_pairs(req.headers, req.headers_len);
    }
}

fn pairs_into_raw(pairs: Vec<(String, String)>) -> (*mut FfiPair, u32) {
    if pairs.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let ffi_pairs: Box<[FfiPair]> = pairs
        .into_iter()
        .map(|(k, v)| FfiPair {
            key: c_string(k),
            value: c_string(v),
        })
        .collect();
    let len = ffi_pairs.len() as u32;
    (Box::into_raw(ffi_pairs) as *mut FfiPair, len)
}

fn free_pairs(pairs: *mut FfiPair, len: u32) {
    if pairs.is_null() || len == 0 {
        return;
    }
    let slice = std::ptr::slice_from_raw_parts_mut(pairs, len as usize);
    let pairs = unsafe { Box::from_raw(slice) };
    for pair in pairs.iter() {
        free_c_string(pair.key);
        free_c_string(pair.value);
    }
}

/// Outcome of a `ctgov_build_*` call.
///
/// On success `request` is non-null and `error_message` is null. On invalid
/// input `request` is null and `error_message` lists every violation.
#[repr(C)]
pub struct FfiBuildResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub format: FfiResponseFormat,
    pub request: *mut FfiHttpRequest,
}

impl FfiBuildResult {
    pub(crate) fn ok(req: ctgov_core::HttpRequest, format: ResponseFormat) -> *mut Self {
        Box::into_raw(Box::new(FfiBuildResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            format: format.into(),
            request: FfiHttpRequest::from_core(req),
        }))
    }

    pub(crate) fn invalid(err: ValidationError) -> *mut Self {
        Self::failed(FfiErrorCode::Validation, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failed(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failed(FfiErrorCode::Panic, msg.to_string())
    }

    fn failed(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiBuildResult {
            error_code,
            error_message: c_string(msg),
            format: FfiResponseFormat::Json,
            request: std::ptr::null_mut(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing the request,
/// then passes a pointer to a `ctgov_parse_*` function. The FFI layer reads
/// but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

/// Why the C caller got no response at all.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiTransportFailure {
    Timeout = 0,
    Other = 1,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes carried by `FfiCtgovResult` and `FfiBuildResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    BadRequest = 2,
    RateLimited = 3,
    Http = 4,
    Timeout = 5,
    Unexpected = 6,
    Validation = 7,
    NullArg = 8,
    Panic = 9,
}

/// Result envelope for parse operations.
///
/// `output` is always non-null: the success payload when `error_code` is
/// `Ok`, otherwise the normalized `"Error: "` string the host should show.
/// `http_status` is the upstream status when one was received, else 0.
#[repr(C)]
pub struct FfiCtgovResult {
    pub error_code: FfiErrorCode,
    pub http_status: u16,
    pub output: *mut c_char,
}

impl FfiCtgovResult {
    pub(crate) fn from_outcome(outcome: Result<String, ApiError>) -> *mut Self {
        match outcome {
            Ok(output) => Self::new(FfiErrorCode::Ok, 0, output),
            Err(err) => Self::from_error(&err),
        }
    }

    pub(crate) fn from_error(err: &ApiError) -> *mut Self {
        let code = match err {
            ApiError::NotFound => FfiErrorCode::NotFound,
            ApiError::BadRequest { .. } => FfiErrorCode::BadRequest,
            ApiError::RateLimited => FfiErrorCode::RateLimited,
            ApiError::Status { .. } => FfiErrorCode::Http,
            ApiError::Timeout => FfiErrorCode::Timeout,
            ApiError::Unexpected { .. } => FfiErrorCode::Unexpected,
        };
        Self::new(code, err.http_status().unwrap_or(0), err.user_message())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::new(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::new(FfiErrorCode::Panic, 0, msg.to_string())
    }

    fn new(error_code: FfiErrorCode, http_status: u16, output: String) -> *mut Self {
        Box::into_raw(Box::new(FfiCtgovResult {
            error_code,
            http_status,
            output: c_string(output),
        }))
    }
}
