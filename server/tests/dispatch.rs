//! Dispatcher against the mock registry over real HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use ctgov_core::tools::{GET_FIELD_VALUES, GET_STUDY, SEARCH_STUDIES};
use ctgov_core::GetFieldValuesInput;
use ctgov_server::{DispatchError, Dispatcher, ServerConfig};
use mock_server::{MockConfig, Recorded, API_PREFIX};
use serde_json::{json, Value};

async fn start(mock: MockConfig) -> (Dispatcher, Recorded) {
    start_with_timeout(mock, Duration::from_secs(30)).await
}

async fn start_with_timeout(mock: MockConfig, timeout: Duration) -> (Dispatcher, Recorded) {
    let (addr, recorded) = mock_server::spawn(mock).await.unwrap();
    (dispatcher_for(addr, timeout), recorded)
}

fn dispatcher_for(addr: SocketAddr, timeout: Duration) -> Dispatcher {
    let config = ServerConfig::default()
        .with_base_url(format!("http://{addr}{API_PREFIX}"), "test")
        .unwrap()
        .with_timeout(timeout);
    Dispatcher::from_config(&config).unwrap()
}

fn forced(status: u16) -> MockConfig {
    MockConfig {
        forced_status: Some(status),
        ..Default::default()
    }
}

fn query_of(recorded: &[mock_server::RecordedRequest]) -> Value {
    assert_eq!(recorded.len(), 1, "exactly one upstream request");
    serde_json::to_value(&recorded[0].query).unwrap()
}

#[tokio::test]
async fn lookup_normalizes_identifier() {
    let (d, recorded) = start(MockConfig::default()).await;
    let out = d
        .call(GET_STUDY, json!({"nct_id": "nct00000102"}))
        .await
        .unwrap();

    let study: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        study["protocolSection"]["identificationModule"]["nctId"],
        "NCT00000102"
    );
    assert!(out.starts_with("{\n  \"protocolSection\": {\n    \"identificationModule\""));

    let log = recorded.read().await;
    assert_eq!(log[0].path, format!("{API_PREFIX}/studies/NCT00000102"));
    assert_eq!(
        query_of(&log),
        json!({"format": "json", "markupFormat": "markdown"})
    );
}

#[tokio::test]
async fn search_sends_translated_query() {
    let (d, recorded) = start(MockConfig::default()).await;
    let out = d
        .call(
            SEARCH_STUDIES,
            json!({
                "query_cond": "diabetes",
                "filter_overall_status": ["RECRUITING"],
                "agg_filters": "phase:3",
            }),
        )
        .await
        .unwrap();

    let page: Value = serde_json::from_str(&out).unwrap();
    let studies = page["studies"].as_array().unwrap();
    assert_eq!(studies.len(), 1);

    let log = recorded.read().await;
    assert_eq!(
        query_of(&log),
        json!({
            "query.cond": "diabetes",
            "filter.overallStatus": "RECRUITING",
            "aggFilters": "phase:3",
            "format": "json",
            "markupFormat": "markdown",
            "pageSize": "20",
            "countTotal": "false",
        })
    );
}

#[tokio::test]
async fn csv_is_returned_verbatim() {
    let (d, _) = start(MockConfig::default()).await;
    let out = d
        .call(GET_STUDY, json!({"nct_id": "NCT04280705", "format": "csv"}))
        .await
        .unwrap();
    assert_eq!(
        out,
        "NCT Number,Study Title,Study Status\r\nNCT04280705,\"Adaptive COVID-19 Treatment Trial (ACTT)\",COMPLETED\r\n"
    );
}

#[tokio::test]
async fn missing_study_is_not_found() {
    let (d, _) = start(MockConfig::default()).await;
    let out = d
        .call(GET_STUDY, json!({"nct_id": "NCT99999999"}))
        .await
        .unwrap();
    assert_eq!(out, "Error: Study not found. Verify the NCT ID is correct.");
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let (d, _) = start_with_timeout(
        MockConfig {
            latency: Duration::from_secs(2),
            ..Default::default()
        },
        Duration::from_millis(200),
    )
    .await;
    let out = d
        .call(GET_FIELD_VALUES, json!({"fields": ["Phase"]}))
        .await
        .unwrap();
    assert_eq!(out, "Error: Request timed out. Please try again.");
}

#[tokio::test]
async fn empty_field_set_fails_before_dispatch() {
    let (d, recorded) = start(MockConfig::default()).await;
    let err = d
        .get_field_values(&GetFieldValuesInput { fields: Vec::new() })
        .await
        .unwrap_err();
    assert!(err.mentions("fields"));
    assert!(recorded.read().await.is_empty());
}

#[tokio::test]
async fn search_without_facets_fails_before_dispatch() {
    let (d, recorded) = start(MockConfig::default()).await;
    let err = d
        .call(SEARCH_STUDIES, json!({"page_size": 10, "query_cond": "  "}))
        .await
        .unwrap_err();
    let DispatchError::Validation(err) = err else {
        panic!("expected validation error");
    };
    assert_eq!(
        err.violations()[0].message,
        "At least one query parameter (query_cond, query_term, query_intr, query_titles, query_id, query_spons, query_locn, query_patient) or filter_ids must be provided."
    );
    assert!(recorded.read().await.is_empty());
}

#[tokio::test]
async fn upstream_statuses_are_normalized() {
    let cases = [
        (429, "Error: Rate limit exceeded. Please wait before retrying."),
        (
            400,
            "Error: Bad request — check your parameters. Details: forced status 400",
        ),
        (
            503,
            "Error: API request failed with status 503: forced status 503",
        ),
    ];
    for (status, expected) in cases {
        let (d, _) = start(forced(status)).await;
        let out = d
            .call(SEARCH_STUDIES, json!({"query_term": "covid"}))
            .await
            .unwrap();
        assert_eq!(out, expected, "status {status}");
    }
}

#[tokio::test]
async fn unreachable_upstream_is_unexpected() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let d = dispatcher_for(addr, Duration::from_secs(5));
    let out = d
        .call(GET_STUDY, json!({"nct_id": "NCT00000102"}))
        .await
        .unwrap();
    assert!(
        out.starts_with("Error: Unexpected error — ConnectError: "),
        "{out}"
    );
}
