use std::time::Duration;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, MockConfig};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- single study ---

#[tokio::test]
async fn get_known_study() {
    let resp = app().oneshot(get("/api/v2/studies/NCT04280705")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let study = body_json(resp).await;
    assert_eq!(
        study["protocolSection"]["identificationModule"]["nctId"],
        "NCT04280705"
    );
    assert_eq!(study["hasResults"], true);
}

#[tokio::test]
async fn get_unknown_study_returns_404() {
    let resp = app().oneshot(get("/api/v2/studies/NCT99999999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_study_as_csv() {
    let resp = app()
        .oneshot(get("/api/v2/studies/NCT00000102?format=csv"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "text/csv");
    let body = body_bytes(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.starts_with("NCT Number,Study Title,Study Status\r\n"));
    assert!(text.contains("NCT00000102,"));
}

// --- search ---

#[tokio::test]
async fn search_filters_by_condition_and_status() {
    let resp = app()
        .oneshot(get(
            "/api/v2/studies?query.cond=diabetes&filter.overallStatus=RECRUITING&pageSize=5",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_json(resp).await;
    let studies = page["studies"].as_array().unwrap();
    assert_eq!(studies.len(), 1);
    assert_eq!(
        studies[0]["protocolSection"]["identificationModule"]["nctId"],
        "NCT05000001"
    );
    assert!(page.get("nextPageToken").is_none());
    assert!(page.get("totalCount").is_none());
}

#[tokio::test]
async fn search_paginates_with_token() {
    let resp = app()
        .oneshot(get("/api/v2/studies?pageSize=3&countTotal=true"))
        .await
        .unwrap();
    let page = body_json(resp).await;
    assert_eq!(page["totalCount"], 4);
    assert_eq!(page["studies"].as_array().unwrap().len(), 3);
    assert_eq!(page["nextPageToken"], "3");

    let resp = app()
        .oneshot(get("/api/v2/studies?pageSize=3&pageToken=3"))
        .await
        .unwrap();
    let page = body_json(resp).await;
    assert_eq!(page["studies"].as_array().unwrap().len(), 1);
    assert!(page.get("nextPageToken").is_none());
}

#[tokio::test]
async fn search_by_ids() {
    let resp = app()
        .oneshot(get("/api/v2/studies?filter.ids=NCT00000102,NCT05000002"))
        .await
        .unwrap();
    let page = body_json(resp).await;
    assert_eq!(page["studies"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn search_rejects_out_of_range_page_size() {
    let resp = app()
        .oneshot(get("/api/v2/studies?pageSize=5000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"pageSize must be between 1 and 1000");
}

// --- field values ---

#[tokio::test]
async fn field_values_counts_each_piece() {
    let resp = app()
        .oneshot(get("/api/v2/stats/fieldValues?fields=OverallStatus,Phase"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let stats = body_json(resp).await;
    let stats = stats.as_array().unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0]["piece"], "OverallStatus");
    assert_eq!(stats[0]["topValues"][0]["value"], "COMPLETED");
    assert_eq!(stats[0]["topValues"][0]["studiesCount"], 2);
    assert_eq!(stats[1]["piece"], "Phase");
}

#[tokio::test]
async fn field_values_without_fields_returns_400() {
    let resp = app().oneshot(get("/api/v2/stats/fieldValues")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- behaviour knobs ---

#[tokio::test]
async fn forced_status_overrides_every_route() {
    let (router, _) = app_with(MockConfig {
        forced_status: Some(429),
        ..Default::default()
    });
    let resp = router
        .oneshot(get("/api/v2/studies/NCT00000102"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn requests_are_recorded() {
    let (router, recorded) = app_with(MockConfig {
        latency: Duration::from_millis(1),
        ..Default::default()
    });
    router
        .oneshot(get("/api/v2/studies?query.term=covid&pageSize=20"))
        .await
        .unwrap();

    let log = recorded.read().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].path, "/api/v2/studies");
    assert_eq!(log[0].query["query.term"], "covid");
    assert_eq!(log[0].query["pageSize"], "20");
}
