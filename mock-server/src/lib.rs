//! In-memory fake of the three ClinicalTrials.gov v2 endpoints the proxy uses.
//!
//! Serves a handful of fixture studies under `/api/v2`. Every request is
//! recorded so tests can assert on the exact query the proxy sent, and
//! `MockConfig` can force a status code or add latency.

use std::{collections::BTreeMap, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const API_PREFIX: &str = "/api/v2";

/// One study in the fixture set.
#[derive(Clone, Debug, Serialize)]
pub struct FixtureStudy {
    pub nct_id: &'static str,
    pub title: &'static str,
    pub status: &'static str,
    pub conditions: &'static [&'static str],
    pub phases: &'static [&'static str],
    pub study_type: &'static str,
    pub has_results: bool,
}

impl FixtureStudy {
    fn to_json(&self) -> Value {
        json!({
            "protocolSection": {
                "identificationModule": {
                    "nctId": self.nct_id,
                    "briefTitle": self.title,
                },
                "statusModule": {
                    "overallStatus": self.status,
                },
                "conditionsModule": {
                    "conditions": self.conditions,
                },
                "designModule": {
                    "studyType": self.study_type,
                    "phases": self.phases,
                },
            },
            "hasResults": self.has_results,
        })
    }

    fn csv_row(&self) -> String {
        format!("{},\"{}\",{}\r\n", self.nct_id, self.title.replace('"', "\"\""), self.status)
    }

    fn matches_text(&self, haystack: &str, needle: &str) -> bool {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

pub const FIXTURES: &[FixtureStudy] = &[
    FixtureStudy {
        nct_id: "NCT00000102",
        title: "Congenital Adrenal Hyperplasia: Calcium Channels as Therapeutic Targets",
        status: "COMPLETED",
        conditions: &["Congenital Adrenal Hyperplasia"],
        phases: &["PHASE1", "PHASE2"],
        study_type: "INTERVENTIONAL",
        has_results: false,
    },
    FixtureStudy {
        nct_id: "NCT04280705",
        title: "Adaptive COVID-19 Treatment Trial (ACTT)",
        status: "COMPLETED",
        conditions: &["COVID-19"],
        phases: &["PHASE3"],
        study_type: "INTERVENTIONAL",
        has_results: true,
    },
    FixtureStudy {
        nct_id: "NCT05000001",
        title: "Metformin and Structured Exercise in Type 2 Diabetes",
        status: "RECRUITING",
        conditions: &["Type 2 Diabetes"],
        phases: &["PHASE3"],
        study_type: "INTERVENTIONAL",
        has_results: false,
    },
    FixtureStudy {
        nct_id: "NCT05000002",
        title: "Continuous Glucose Monitoring in Gestational Diabetes",
        status: "NOT_YET_RECRUITING",
        conditions: &["Gestational Diabetes"],
        phases: &[],
        study_type: "OBSERVATIONAL",
        has_results: false,
    },
];

const CSV_HEADER: &str = "NCT Number,Study Title,Study Status\r\n";

/// Behaviour knobs for a mock instance.
#[derive(Clone, Debug, Default)]
pub struct MockConfig {
    /// Delay applied before every response.
    pub latency: Duration,
    /// When set, every request is answered with this status and a short body.
    pub forced_status: Option<u16>,
}

/// A request as the mock saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: BTreeMap<String, String>,
}

pub type Recorded = Arc<RwLock<Vec<RecordedRequest>>>;

#[derive(Clone)]
struct MockState {
    config: Arc<MockConfig>,
    recorded: Recorded,
}

type Params = Query<BTreeMap<String, String>>;

pub fn app() -> Router {
    app_with(MockConfig::default()).0
}

/// Build the router and hand back the request log.
pub fn app_with(config: MockConfig) -> (Router, Recorded) {
    let recorded: Recorded = Arc::new(RwLock::new(Vec::new()));
    let state = MockState {
        config: Arc::new(config),
        recorded: Arc::clone(&recorded),
    };
    let router = Router::new()
        .route(&format!("{API_PREFIX}/studies"), get(search_studies))
        .route(&format!("{API_PREFIX}/studies/{{nct_id}}"), get(get_study))
        .route(&format!("{API_PREFIX}/stats/fieldValues"), get(field_values))
        .with_state(state);
    (router, recorded)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config).0).await
}

/// Bind a random local port and serve in the background on the current
/// runtime. Returns the bound address and the request log.
pub async fn spawn(config: MockConfig) -> Result<(SocketAddr, Recorded), std::io::Error> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (router, recorded) = app_with(config);
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router).await {
            tracing::error!(%err, "mock registry stopped");
        }
    });
    Ok((addr, recorded))
}

/// Record the request, apply latency, and short-circuit on a forced status.
async fn prelude(
    state: &MockState,
    path: String,
    query: &BTreeMap<String, String>,
) -> Option<Response> {
    tracing::debug!(%path, ?query, "mock request");
    state.recorded.write().await.push(RecordedRequest {
        path,
        query: query.clone(),
    });
    if !state.config.latency.is_zero() {
        tokio::time::sleep(state.config.latency).await;
    }
    let status = state.config.forced_status?;
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Some((status, format!("forced status {}", status.as_u16())).into_response())
}

async fn get_study(
    State(state): State<MockState>,
    Path(nct_id): Path<String>,
    Query(query): Params,
) -> Response {
    let path = format!("{API_PREFIX}/studies/{nct_id}");
    if let Some(forced) = prelude(&state, path, &query).await {
        return forced;
    }
    let Some(study) = FIXTURES.iter().find(|s| s.nct_id == nct_id) else {
        return (StatusCode::NOT_FOUND, format!("study {nct_id} not found")).into_response();
    };
    if is_csv(&query) {
        return csv_response(CSV_HEADER.to_string() + &study.csv_row());
    }
    Json(study.to_json()).into_response()
}

async fn search_studies(State(state): State<MockState>, Query(query): Params) -> Response {
    if let Some(forced) = prelude(&state, format!("{API_PREFIX}/studies"), &query).await {
        return forced;
    }
    let page_size = match query.get("pageSize").map(|v| v.parse::<usize>()) {
        None => 10,
        Some(Ok(size)) if (1..=1000).contains(&size) => size,
        Some(_) => {
            return (StatusCode::BAD_REQUEST, "pageSize must be between 1 and 1000")
                .into_response();
        }
    };
    let offset = match query.get("pageToken").map(|t| t.parse::<usize>()) {
        None => 0,
        Some(Ok(offset)) => offset,
        Some(Err(_)) => return (StatusCode::BAD_REQUEST, "invalid pageToken").into_response(),
    };

    let matching: Vec<&FixtureStudy> = FIXTURES.iter().filter(|s| matches(s, &query)).collect();
    let page: Vec<&FixtureStudy> = matching.iter().skip(offset).take(page_size).copied().collect();
    let next = offset + page.len();

    if is_csv(&query) {
        let body: String = page.iter().map(|s| s.csv_row()).collect();
        return csv_response(CSV_HEADER.to_string() + &body);
    }

    let mut body = Map::new();
    if query.get("countTotal").map(String::as_str) == Some("true") {
        body.insert("totalCount".to_string(), json!(matching.len()));
    }
    body.insert(
        "studies".to_string(),
        Value::Array(page.iter().map(|s| s.to_json()).collect()),
    );
    if next < matching.len() {
        body.insert("nextPageToken".to_string(), json!(next.to_string()));
    }
    Json(Value::Object(body)).into_response()
}

async fn field_values(State(state): State<MockState>, Query(query): Params) -> Response {
    let path = format!("{API_PREFIX}/stats/fieldValues");
    if let Some(forced) = prelude(&state, path, &query).await {
        return forced;
    }
    let Some(fields) = query.get("fields").filter(|f| !f.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "fields is required").into_response();
    };

    let mut out = Vec::new();
    for piece in fields.split(',') {
        let Some((path, values)) = distribution(piece) else {
            return (StatusCode::BAD_REQUEST, format!("unsupported field {piece}")).into_response();
        };
        let mut counts: Vec<(String, usize)> = Vec::new();
        for value in values {
            match counts.iter_mut().find(|(v, _)| *v == value) {
                Some((_, count)) => *count += 1,
                None => counts.push((value, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out.push(json!({
            "type": "ENUM",
            "piece": piece,
            "field": path,
            "missingStudiesCount": 0,
            "uniqueValuesCount": counts.len(),
            "topValues": counts
                .iter()
                .map(|(value, count)| json!({"value": value, "studiesCount": count}))
                .collect::<Vec<_>>(),
        }));
    }
    Json(Value::Array(out)).into_response()
}

fn matches(study: &FixtureStudy, query: &BTreeMap<String, String>) -> bool {
    if let Some(cond) = query.get("query.cond") {
        if !study.conditions.iter().any(|c| study.matches_text(c, cond)) {
            return false;
        }
    }
    if let Some(term) = query.get("query.term") {
        if !study.matches_text(study.title, term) {
            return false;
        }
    }
    if let Some(ids) = query.get("filter.ids") {
        if !ids.split(',').any(|id| id == study.nct_id) {
            return false;
        }
    }
    if let Some(statuses) = query.get("filter.overallStatus") {
        if !statuses.split(',').any(|s| s == study.status) {
            return false;
        }
    }
    true
}

/// Field path and per-study values for the pieces the mock can aggregate.
fn distribution(piece: &str) -> Option<(&'static str, Vec<String>)> {
    let (path, values) = match piece {
        "OverallStatus" => (
            "protocolSection.statusModule.overallStatus",
            FIXTURES.iter().map(|s| s.status.to_string()).collect(),
        ),
        "StudyType" => (
            "protocolSection.designModule.studyType",
            FIXTURES.iter().map(|s| s.study_type.to_string()).collect(),
        ),
        "Phase" => (
            "protocolSection.designModule.phases",
            FIXTURES
                .iter()
                .flat_map(|s| {
                    if s.phases.is_empty() {
                        vec!["NA".to_string()]
                    } else {
                        s.phases.iter().map(|p| p.to_string()).collect()
                    }
                })
                .collect(),
        ),
        _ => return None,
    };
    Some((path, values))
}

fn is_csv(query: &BTreeMap<String, String>) -> bool {
    query.get("format").map(String::as_str) == Some("csv")
}

fn csv_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/csv")], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_ids_are_unique() {
        let mut ids: Vec<&str> = FIXTURES.iter().map(|s| s.nct_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), FIXTURES.len());
    }

    #[test]
    fn study_json_has_registry_shape() {
        let json = FIXTURES[0].to_json();
        assert_eq!(
            json["protocolSection"]["identificationModule"]["nctId"],
            "NCT00000102"
        );
        assert_eq!(json["hasResults"], false);
    }

    #[test]
    fn csv_row_quotes_title() {
        assert_eq!(
            FIXTURES[1].csv_row(),
            "NCT04280705,\"Adaptive COVID-19 Treatment Trial (ACTT)\",COMPLETED\r\n"
        );
    }

    #[test]
    fn condition_match_is_case_insensitive() {
        let mut query = BTreeMap::new();
        query.insert("query.cond".to_string(), "DIABETES".to_string());
        let hits: Vec<&str> = FIXTURES
            .iter()
            .filter(|s| matches(s, &query))
            .map(|s| s.nct_id)
            .collect();
        assert_eq!(hits, ["NCT05000001", "NCT05000002"]);
    }

    #[test]
    fn unknown_piece_has_no_distribution() {
        assert!(distribution("BriefSummary").is_none());
        let (_, phases) = distribution("Phase").unwrap();
        assert!(phases.contains(&"NA".to_string()));
    }
}
