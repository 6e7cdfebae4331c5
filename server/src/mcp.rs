//! MCP tool server over stdio or streamable HTTP.
//!
//! Publishes the three registry operations as read-only tools. Argument
//! decoding (including rejection of unknown keys) and validation failures
//! are reported as `invalid_params` errors; everything that reached the
//! network, successful or not, is a successful tool result carrying the
//! operation's string.
//!
//! The HTTP mode is stateless: no session id is issued and every POST is
//! answered by a clone of the same server, sharing one dispatcher.

use std::net::SocketAddr;
use std::sync::Arc;

use ctgov_core::{GetFieldValuesInput, GetStudyInput, SearchStudiesInput, ValidationError};
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
    transport::{
        stdio,
        streamable_http_server::{
            session::local::LocalSessionManager, StreamableHttpServerConfig,
            StreamableHttpService,
        },
    },
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde_json::json;

use crate::dispatch::Dispatcher;

#[derive(Clone)]
pub struct CtGovServer {
    dispatcher: Arc<Dispatcher>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CtGovServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "clinicaltrials_get_study",
        description = "Retrieve a single clinical study record from ClinicalTrials.gov by its NCT identifier.\n\
         \n\
         Fetches the full study record, or only the requested fields, from the ClinicalTrials.gov v2 API.\n\
         \n\
         Arguments:\n\
         - nct_id: NCT identifier such as 'NCT00000102'. Case-insensitive; must match NCT followed by digits.\n\
         - format: 'json' (default) or 'csv'.\n\
         - markup_format: 'markdown' (default) or 'legacy' for rich-text fields.\n\
         - fields: list of field names to include, e.g. [\"NCTId\", \"BriefTitle\", \"OverallStatus\", \"Phase\"]. Omit to return every field.\n\
         \n\
         Returns the study as pretty-printed JSON or as CSV text. JSON records have the top-level keys \"protocolSection\" (identificationModule, statusModule, descriptionModule, conditionsModule, designModule, eligibilityModule, contactsLocationsModule, ...), \"derivedSection\" and \"hasResults\".\n\
         \n\
         Failures come back as text starting with 'Error:', for example:\n\
         - \"Error: Study not found. Verify the NCT ID is correct.\"\n\
         - \"Error: Rate limit exceeded. Please wait before retrying.\"\n\
         - \"Error: Request timed out. Please try again.\"\n\
         \n\
         Examples:\n\
         - \"Get full details for NCT00000102\" -> nct_id='NCT00000102'\n\
         - \"What is the status and phase of study NCT04280705?\" -> nct_id='NCT04280705', fields=[\"NCTId\", \"OverallStatus\", \"Phase\"]\n\
         - Not for searching by condition or sponsor; use clinicaltrials_search_studies.",
        annotations(
            title = "Get Clinical Study by NCT ID",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn get_study(
        &self,
        Parameters(input): Parameters<GetStudyInput>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.dispatcher.get_study(&input).await.map_err(invalid_params)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "clinicaltrials_search_studies",
        description = "Search for clinical studies on ClinicalTrials.gov by condition, intervention, sponsor, location and more.\n\
         \n\
         Returns one page of matching studies. At least one query_* parameter or filter_ids must be provided.\n\
         \n\
         Query parameters:\n\
         - query_cond: condition or disease, e.g. 'diabetes'.\n\
         - query_term: general keywords, e.g. 'mRNA vaccine'.\n\
         - query_intr: intervention name, e.g. 'insulin'.\n\
         - query_titles: words in study titles only.\n\
         - query_id: study ID or NCT number.\n\
         - query_spons: sponsor or collaborator, e.g. 'NIH'.\n\
         - query_locn: location terms, e.g. 'Boston'.\n\
         - query_patient: plain-language patient search.\n\
         \n\
         Filters:\n\
         - filter_overall_status: list of recruitment statuses such as RECRUITING or COMPLETED.\n\
         - filter_geo: geographic radius, e.g. 'distance(39.0,-77.0,50mi)'.\n\
         - filter_ids: list of NCT IDs to retrieve.\n\
         - post_filter_overall_status, post_filter_geo: the same filters applied after aggregation.\n\
         - agg_filters: aggregation filter expression, e.g. 'phase:2 3,studyType:int'.\n\
         \n\
         Sorting and paging:\n\
         - sort: field and direction, e.g. 'LastUpdatePostDate:desc'.\n\
         - page_size: results per page, 1 to 1000 (default 20).\n\
         - page_token: the 'nextPageToken' of a previous response.\n\
         - count_total: include 'totalCount' in the response (default false).\n\
         \n\
         Output: format ('json' or 'csv'), markup_format ('markdown' or 'legacy') and fields (list of field names).\n\
         \n\
         JSON responses look like {\"totalCount\": int (only with count_total), \"studies\": [{\"protocolSection\": {...}}, ...], \"nextPageToken\": str (when more pages exist)}. Failures come back as text starting with 'Error:', such as \"Error: Bad request — check your parameters.\"\n\
         \n\
         Examples:\n\
         - \"Find recruiting Phase 3 diabetes trials\" -> query_cond='diabetes', filter_overall_status=[\"RECRUITING\"], agg_filters='phase:3'\n\
         - \"NIH-sponsored cancer studies updated recently\" -> query_cond='cancer', query_spons='NIH', sort='LastUpdatePostDate:desc'\n\
         - \"Trials near Boston for asthma\" -> query_cond='asthma', filter_geo='distance(42.36,-71.06,25mi)'\n\
         - \"Details for NCT04280705 and NCT00000102\" -> filter_ids=[\"NCT04280705\", \"NCT00000102\"]\n\
         - Not for a single known NCT ID; use clinicaltrials_get_study.",
        annotations(
            title = "Search Clinical Studies",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn search_studies(
        &self,
        Parameters(input): Parameters<SearchStudiesInput>,
    ) -> Result<CallToolResult, McpError> {
        let text = self
            .dispatcher
            .search_studies(&input)
            .await
            .map_err(invalid_params)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(
        name = "clinicaltrials_get_field_values",
        description = "Get the distribution of values across all studies for one or more fields.\n\
         \n\
         Reports how many studies carry each distinct value of the requested fields. Works best with enumerable fields such as Phase, OverallStatus, StudyType, Sex, StdAge, LeadSponsorClass, InterventionType, LocationCountry, DesignAllocation, DesignPrimaryPurpose, DesignMasking, IsFDARegulatedDrug, HasResults and IPDSharing; free-text fields only report their most frequent values.\n\
         \n\
         Arguments:\n\
         - fields: one or more field names (at least one).\n\
         \n\
         Returns a JSON array with one element per field: {\"type\": \"ENUM\" or \"STRING\", \"piece\": field name, \"field\": JSON path in the study record, \"missingStudiesCount\": int, \"uniqueValuesCount\": int, \"topValues\": [{\"value\": str, \"studiesCount\": int}, ...]}. Failures come back as text starting with 'Error:'.\n\
         \n\
         Examples:\n\
         - \"How many studies are in each phase?\" -> fields=[\"Phase\"]\n\
         - \"Breakdown of recruiting status and study type?\" -> fields=[\"OverallStatus\", \"StudyType\"]\n\
         - \"Which countries have the most trial locations?\" -> fields=[\"LocationCountry\"]\n\
         - Not for full study records; use clinicaltrials_search_studies.",
        annotations(
            title = "Get Field Value Distributions",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn get_field_values(
        &self,
        Parameters(input): Parameters<GetFieldValuesInput>,
    ) -> Result<CallToolResult, McpError> {
        let text = self
            .dispatcher
            .get_field_values(&input)
            .await
            .map_err(invalid_params)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

fn invalid_params(err: ValidationError) -> McpError {
    let violations: Vec<_> = err
        .violations()
        .iter()
        .map(|v| json!({"field": v.field, "message": v.message}))
        .collect();
    McpError::invalid_params(err.to_string(), Some(json!({ "violations": violations })))
}

#[tool_handler]
impl ServerHandler for CtGovServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "clinicaltrials".to_string(),
                title: Some("ClinicalTrials.gov Registry".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only access to the ClinicalTrials.gov v2 API: look up a study by NCT \
                 ID, search studies, and get field value distributions."
                    .to_string(),
            ),
        }
    }
}

/// Path the HTTP mode answers on.
pub const MCP_HTTP_PATH: &str = "/mcp";

/// Serve MCP on stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: CtGovServer) -> anyhow::Result<()> {
    let running = server.serve(stdio()).await?;
    tracing::info!("server ready, waiting for requests on stdio");
    running.waiting().await?;
    tracing::info!("server shutdown complete");
    Ok(())
}

/// axum router exposing `server` as stateless streamable HTTP at
/// [`MCP_HTTP_PATH`].
pub fn http_router(server: CtGovServer) -> axum::Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: false,
            ..Default::default()
        },
    );
    axum::Router::new().nest_service(MCP_HTTP_PATH, service)
}

/// Serve MCP over HTTP on `addr` until Ctrl-C.
pub async fn serve_http(server: CtGovServer, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        path = MCP_HTTP_PATH,
        "server ready, waiting for HTTP requests"
    );
    axum::serve(listener, http_router(server))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    tracing::info!("server shutdown complete");
    Ok(())
}
