//! Drives the C surface the way a host application would: build through the
//! FFI, execute the GET with ureq against the mock registry, parse through
//! the FFI.

use std::ffi::{CStr, CString};

use super::*;

fn c_str<'a>(ptr: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
}

fn start_mock() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}{}", mock_server::API_PREFIX)
}

/// Execute an `FfiHttpRequest` and hand back status and body.
fn execute(req: &FfiHttpRequest) -> (u16, CString) {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut builder = agent.get(c_str(req.url));
    if !req.query.is_null() {
        for pair in unsafe { std::slice::from_raw_parts(req.query, req.query_len as usize) } {
            builder = builder.query(c_str(pair.key), c_str(pair.value));
        }
    }
    if !req.headers.is_null() {
        for pair in unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) } {
            builder = builder.header(c_str(pair.key), c_str(pair.value));
        }
    }
    let mut response = builder.call().expect("HTTP transport error");
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    (status, CString::new(body).unwrap())
}

#[derive(Clone, Copy)]
enum Op {
    Study,
    Search,
    FieldValues,
}

/// Build, execute and parse one call; returns error code and output.
fn call(client: *const FfiCtgovClient, op: Op, params: &str) -> (FfiErrorCode, String) {
    let params = CString::new(params).unwrap();
    let built = match op {
        Op::Study => ctgov_build_get_study(client, params.as_ptr()),
        Op::Search => ctgov_build_search_studies(client, params.as_ptr()),
        Op::FieldValues => ctgov_build_get_field_values(client, params.as_ptr()),
    };
    let b = unsafe { &*built };
    assert_eq!(b.error_code, FfiErrorCode::Ok, "build failed");

    let (status, body) = execute(unsafe { &*b.request });
    let resp = FfiHttpResponse {
        status,
        body: body.as_ptr(),
    };
    let result = match op {
        Op::Study => ctgov_parse_get_study(client, b.format, &resp),
        Op::Search => ctgov_parse_search_studies(client, b.format, &resp),
        Op::FieldValues => ctgov_parse_get_field_values(client, &resp),
    };
    let r = unsafe { &*result };
    let out = (r.error_code, c_str(r.output).to_string());

    ctgov_free_result(result);
    ctgov_free_build_result(built);
    out
}

#[test]
fn host_round_trips() {
    let url = CString::new(start_mock()).unwrap();
    let client = ctgov_client_new(url.as_ptr());

    let (code, out) = call(client, Op::Study, r#"{"nct_id":"nct00000102"}"#);
    assert_eq!(code, FfiErrorCode::Ok);
    let study: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        study["protocolSection"]["identificationModule"]["nctId"],
        "NCT00000102"
    );

    let (code, out) = call(client, Op::Study, r#"{"nct_id":"NCT99999999"}"#);
    assert_eq!(code, FfiErrorCode::NotFound);
    assert_eq!(out, "Error: Study not found. Verify the NCT ID is correct.");

    let (code, out) = call(
        client,
        Op::Search,
        r#"{"query_cond":"covid","format":"csv"}"#,
    );
    assert_eq!(code, FfiErrorCode::Ok);
    assert!(out.starts_with("NCT Number,Study Title,Study Status\r\nNCT04280705,"));

    let (code, out) = call(
        client,
        Op::FieldValues,
        r#"{"fields":["OverallStatus"]}"#,
    );
    assert_eq!(code, FfiErrorCode::Ok);
    let stats: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats[0]["topValues"][0]["value"], "COMPLETED");

    ctgov_client_free(client);
}
