//! The three operations as async calls: validate, build, GET, normalize.
//!
//! Every operation resolves to either a `ValidationError` (nothing was sent)
//! or a single string: the pretty JSON or CSV payload, or one of the fixed
//! `"Error: "` messages. Upstream and transport failures never surface as
//! `Err`.

use std::time::Instant;

use ctgov_core::tools::{GET_FIELD_VALUES, GET_STUDY, SEARCH_STUDIES};
use ctgov_core::{
    render, ApiError, CtGovClient, GetFieldValuesInput, GetStudyInput, HttpRequest, HttpResponse,
    SearchStudiesInput, ToolKind, ValidationError,
};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::transport::{BrowserTransport, Transport};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unknown tool '{0}'")]
    UnknownTool(String),
}

pub struct Dispatcher<T = BrowserTransport> {
    client: CtGovClient,
    transport: T,
}

impl Dispatcher<BrowserTransport> {
    /// Dispatcher over a fresh browser-emulating client built from `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self, wreq::Error> {
        Ok(Self::new(
            CtGovClient::new(&config.base_url),
            BrowserTransport::new(config)?,
        ))
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(client: CtGovClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &CtGovClient {
        &self.client
    }

    pub async fn get_study(&self, input: &GetStudyInput) -> Result<String, ValidationError> {
        let lookup = input.validate()?;
        let request = self.client.build_get_study(&lookup);
        let started = Instant::now();
        let outcome = match self.execute(GET_STUDY, request).await {
            Ok(response) => self.client.parse_get_study(&lookup, response),
            Err(err) => Err(err),
        };
        Ok(finish(GET_STUDY, started, outcome))
    }

    pub async fn search_studies(
        &self,
        input: &SearchStudiesInput,
    ) -> Result<String, ValidationError> {
        let search = input.validate()?;
        let request = self.client.build_search_studies(&search);
        let started = Instant::now();
        let outcome = match self.execute(SEARCH_STUDIES, request).await {
            Ok(response) => self.client.parse_search_studies(&search, response),
            Err(err) => Err(err),
        };
        Ok(finish(SEARCH_STUDIES, started, outcome))
    }

    pub async fn get_field_values(
        &self,
        input: &GetFieldValuesInput,
    ) -> Result<String, ValidationError> {
        let lookup = input.validate()?;
        let request = self.client.build_get_field_values(&lookup);
        let started = Instant::now();
        let outcome = match self.execute(GET_FIELD_VALUES, request).await {
            Ok(response) => self.client.parse_get_field_values(response),
            Err(err) => Err(err),
        };
        Ok(finish(GET_FIELD_VALUES, started, outcome))
    }

    /// Route a tool call by name with raw JSON arguments. Unknown keys in
    /// `arguments` are rejected.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<String, DispatchError> {
        let kind = ToolKind::from_name(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;
        let output = match kind {
            ToolKind::GetStudy => self.get_study(&GetStudyInput::from_value(arguments)?).await?,
            ToolKind::SearchStudies => {
                let input = SearchStudiesInput::from_value(arguments)?;
                self.search_studies(&input).await?
            }
            ToolKind::GetFieldValues => {
                let input = GetFieldValuesInput::from_value(arguments)?;
                self.get_field_values(&input).await?
            }
        };
        Ok(output)
    }

    async fn execute(&self, tool: &str, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(tool, url = %request.url, params = request.query.len(), "dispatching");
        self.transport.get(request).await.map_err(ApiError::from)
    }
}

fn finish(tool: &str, started: Instant, outcome: Result<String, ApiError>) -> String {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &outcome {
        Ok(payload) => info!(tool, bytes = payload.len(), elapsed_ms, "request succeeded"),
        Err(err) => warn!(
            tool,
            status = ?err.http_status(),
            elapsed_ms,
            error = %err,
            "request failed"
        ),
    }
    render(outcome)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use ctgov_core::TransportError;
    use serde_json::json;

    use super::*;

    /// Canned transport that records what it was asked to fetch.
    struct Canned {
        reply: Result<HttpResponse, TransportError>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn new(reply: Result<HttpResponse, TransportError>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    fn dispatcher(reply: Result<HttpResponse, TransportError>) -> Dispatcher<Canned> {
        Dispatcher::new(CtGovClient::new("http://registry.test/api/v2"), Canned::new(reply))
    }

    #[tokio::test]
    async fn validation_failure_sends_nothing() {
        let d = dispatcher(Ok(HttpResponse::new(200, "{}")));
        let err = d
            .get_field_values(&GetFieldValuesInput { fields: Vec::new() })
            .await
            .unwrap_err();
        assert!(err.mentions("fields"));
        assert!(d.transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn timeout_becomes_fixed_message() {
        let d = dispatcher(Err(TransportError::Timeout));
        let out = d
            .get_study(&GetStudyInput {
                nct_id: "NCT00000102".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(out, "Error: Request timed out. Please try again.");
    }

    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn outcome_is_logged_with_elapsed_time() {
        let logs = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&logs);
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || Capture(Arc::clone(&sink)))
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let d = dispatcher(Ok(HttpResponse::new(404, "")));
        d.call(GET_STUDY, json!({"nct_id": "NCT00000102"}))
            .await
            .unwrap();

        let text = String::from_utf8(logs.lock().unwrap().clone()).unwrap();
        assert!(text.contains("request failed"), "{text}");
        assert!(text.contains("clinicaltrials_get_study"), "{text}");
        assert!(text.contains("elapsed_ms="), "{text}");
    }

    #[tokio::test]
    async fn other_transport_failure_is_unexpected() {
        let d = dispatcher(Err(TransportError::other("ConnectError", "refused")));
        let out = d
            .call(SEARCH_STUDIES, json!({"query_term": "covid"}))
            .await
            .unwrap();
        assert_eq!(out, "Error: Unexpected error — ConnectError: refused");
    }

    #[tokio::test]
    async fn call_routes_by_name() {
        let d = dispatcher(Ok(HttpResponse::new(200, r#"[{"field":"Phase"}]"#)));
        let out = d
            .call(GET_FIELD_VALUES, json!({"fields": ["Phase"]}))
            .await
            .unwrap();
        assert_eq!(out, "[\n  {\n    \"field\": \"Phase\"\n  }\n]");

        let seen = d.transport.seen.lock().unwrap();
        assert_eq!(seen[0].url, "http://registry.test/api/v2/stats/fieldValues");
        assert_eq!(seen[0].query_value("fields"), Some("Phase"));
    }

    #[tokio::test]
    async fn unknown_tool_and_unknown_key_are_rejected() {
        let d = dispatcher(Ok(HttpResponse::new(200, "{}")));
        let err = d.call("clinicaltrials_delete_study", json!({})).await.unwrap_err();
        assert!(matches!(err, DispatchError::UnknownTool(_)));

        let err = d
            .call(GET_STUDY, json!({"nct_id": "NCT1", "verbose": true}))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Validation(_)));
        assert!(d.transport.seen.lock().unwrap().is_empty());
    }
}
