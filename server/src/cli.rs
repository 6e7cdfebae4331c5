//! Command-line definitions for the `ctgov` binary.
//!
//! One-shot subcommands turn their flags into the same JSON arguments a tool
//! host would send, so strict decoding and validation behave identically on
//! both surfaces.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(
    name = "ctgov",
    version,
    about = "ClinicalTrials.gov v2 proxy: MCP tool server and one-shot queries",
    long_about = "Schema-validated proxy for the ClinicalTrials.gov v2 API.\n\n\
                  `serve` speaks MCP over stdio, or over streamable HTTP with `--http`.\n\
                  The other subcommands run a single operation and print its\n\
                  output to stdout."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// API root (overrides CTGOV_BASE_URL).
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds (overrides CTGOV_TIMEOUT_SECS).
    #[arg(long = "timeout-secs", value_name = "SECS", global = true)]
    pub timeout_secs: Option<f64>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the three tools over MCP (stdin/stdout unless --http is given).
    Serve(ServeArgs),

    /// Fetch one study by NCT identifier.
    Study(StudyArgs),

    /// Search studies.
    Search(SearchArgs),

    /// Value distributions for one or more fields.
    FieldValues(FieldValuesArgs),

    /// Invoke a tool by name with JSON arguments.
    Call(CallArgs),

    /// Print the tool catalog as JSON.
    Tools,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen for stateless streamable-HTTP MCP requests on ADDR (path /mcp).
    #[arg(long, value_name = "ADDR")]
    pub http: Option<SocketAddr>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MarkupArg {
    Markdown,
    Legacy,
}

/// Output shape flags shared by `study` and `search`.
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Response format.
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Markup of rich-text fields.
    #[arg(long = "markup-format", value_enum)]
    pub markup_format: Option<MarkupArg>,

    /// Restrict the returned fields (comma-separated or repeated).
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
}

#[derive(Args, Debug)]
pub struct StudyArgs {
    /// NCT identifier, e.g. NCT04280705.
    #[arg(value_name = "NCT_ID")]
    pub nct_id: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Conditions or disease.
    #[arg(long)]
    pub cond: Option<String>,
    /// Other terms.
    #[arg(long)]
    pub term: Option<String>,
    /// Intervention or treatment.
    #[arg(long)]
    pub intr: Option<String>,
    /// Title or acronym.
    #[arg(long)]
    pub titles: Option<String>,
    /// Study identifiers.
    #[arg(long)]
    pub id: Option<String>,
    /// Sponsor or collaborator.
    #[arg(long)]
    pub spons: Option<String>,
    /// Location terms.
    #[arg(long)]
    pub locn: Option<String>,
    /// Patient-friendly search.
    #[arg(long)]
    pub patient: Option<String>,

    /// Overall status filter, e.g. RECRUITING (comma-separated or repeated).
    #[arg(long, value_delimiter = ',')]
    pub status: Vec<String>,
    /// Geo filter, e.g. distance(39.0,-77.1,50mi).
    #[arg(long)]
    pub geo: Option<String>,
    /// Restrict to these NCT identifiers.
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,
    /// Status filter applied after aggregation.
    #[arg(long = "post-status", value_delimiter = ',')]
    pub post_status: Vec<String>,
    /// Geo filter applied after aggregation.
    #[arg(long = "post-geo")]
    pub post_geo: Option<String>,
    /// Aggregation filters, e.g. "phase:2 3,results:with".
    #[arg(long = "agg-filters")]
    pub agg_filters: Option<String>,

    /// Sort order, e.g. LastUpdatePostDate:desc.
    #[arg(long)]
    pub sort: Option<String>,
    /// Results per page (1-1000, default 20).
    #[arg(long = "page-size")]
    pub page_size: Option<i64>,
    /// Cursor from a previous page's nextPageToken.
    #[arg(long = "page-token")]
    pub page_token: Option<String>,
    /// Include totalCount in the response.
    #[arg(long = "count-total")]
    pub count_total: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct FieldValuesArgs {
    /// Field names, e.g. Phase OverallStatus.
    #[arg(value_name = "FIELD", required = true, num_args = 1..)]
    pub fields: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Tool name, e.g. clinicaltrials_search_studies.
    pub tool: String,

    /// Arguments as a JSON object.
    #[arg(default_value = "{}")]
    pub arguments: String,
}

impl OutputArgs {
    fn write_into(&self, args: &mut Map<String, Value>) {
        if let Some(format) = self.format {
            let format = match format {
                FormatArg::Json => "json",
                FormatArg::Csv => "csv",
            };
            args.insert("format".into(), json!(format));
        }
        if let Some(markup) = self.markup_format {
            let markup = match markup {
                MarkupArg::Markdown => "markdown",
                MarkupArg::Legacy => "legacy",
            };
            args.insert("markup_format".into(), json!(markup));
        }
        insert_list(args, "fields", &self.fields);
    }
}

impl StudyArgs {
    pub fn to_arguments(&self) -> Value {
        let mut args = Map::new();
        args.insert("nct_id".into(), json!(self.nct_id));
        self.output.write_into(&mut args);
        Value::Object(args)
    }
}

impl SearchArgs {
    pub fn to_arguments(&self) -> Value {
        let mut args = Map::new();
        let text = [
            ("query_cond", &self.cond),
            ("query_term", &self.term),
            ("query_intr", &self.intr),
            ("query_titles", &self.titles),
            ("query_id", &self.id),
            ("query_spons", &self.spons),
            ("query_locn", &self.locn),
            ("query_patient", &self.patient),
            ("filter_geo", &self.geo),
            ("post_filter_geo", &self.post_geo),
            ("agg_filters", &self.agg_filters),
            ("sort", &self.sort),
            ("page_token", &self.page_token),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                args.insert(key.into(), json!(value));
            }
        }
        insert_list(&mut args, "filter_overall_status", &self.status);
        insert_list(&mut args, "filter_ids", &self.ids);
        insert_list(&mut args, "post_filter_overall_status", &self.post_status);
        if let Some(size) = self.page_size {
            args.insert("page_size".into(), json!(size));
        }
        if self.count_total {
            args.insert("count_total".into(), json!(true));
        }
        self.output.write_into(&mut args);
        Value::Object(args)
    }
}

impl FieldValuesArgs {
    pub fn to_arguments(&self) -> Value {
        json!({ "fields": self.fields })
    }
}

fn insert_list(args: &mut Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        args.insert(key.into(), json!(values));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn search_flags_become_tool_arguments() {
        let cli = Cli::parse_from([
            "ctgov",
            "search",
            "--cond",
            "diabetes",
            "--status",
            "RECRUITING,NOT_YET_RECRUITING",
            "--agg-filters",
            "phase:3",
            "--page-size",
            "5",
            "--count-total",
            "--format",
            "csv",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(
            args.to_arguments(),
            json!({
                "query_cond": "diabetes",
                "agg_filters": "phase:3",
                "filter_overall_status": ["RECRUITING", "NOT_YET_RECRUITING"],
                "page_size": 5,
                "count_total": true,
                "format": "csv",
            })
        );
    }

    #[test]
    fn study_flags_become_tool_arguments() {
        let cli = Cli::parse_from([
            "ctgov",
            "study",
            "nct00000102",
            "--fields",
            "NCTId,BriefTitle",
            "--markup-format",
            "legacy",
        ]);
        let Command::Study(args) = cli.command else {
            panic!("expected study");
        };
        assert_eq!(
            args.to_arguments(),
            json!({
                "nct_id": "nct00000102",
                "markup_format": "legacy",
                "fields": ["NCTId", "BriefTitle"],
            })
        );
    }

    #[test]
    fn serve_defaults_to_stdio() {
        let cli = Cli::parse_from(["ctgov", "serve"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.http, None);

        let cli = Cli::parse_from(["ctgov", "serve", "--http", "127.0.0.1:8000"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.http, Some("127.0.0.1:8000".parse().unwrap()));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from([
            "ctgov",
            "field-values",
            "Phase",
            "StudyType",
            "--timeout-secs",
            "5",
            "--base-url",
            "http://127.0.0.1:3000/api/v2",
        ]);
        assert_eq!(cli.timeout_secs, Some(5.0));
        assert_eq!(cli.base_url.as_deref(), Some("http://127.0.0.1:3000/api/v2"));
        let Command::FieldValues(args) = cli.command else {
            panic!("expected field-values");
        };
        assert_eq!(args.to_arguments(), json!({"fields": ["Phase", "StudyType"]}));
    }
}
