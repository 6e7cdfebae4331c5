//! `ctgov` binary.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use ctgov_core::tools::{self, GET_FIELD_VALUES, GET_STUDY, SEARCH_STUDIES};
use ctgov_server::cli::{Cli, Command, LogFormatArg};
use ctgov_server::logging::{init_logging, LogConfig, LogFormat};
use ctgov_server::mcp::{serve_http, serve_stdio, CtGovServer};
use ctgov_server::config::timeout_from_secs;
use ctgov_server::{DispatchError, Dispatcher, ServerConfig};

/// Exit status for input rejected before any request was sent.
const EXIT_INVALID_INPUT: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&log_config_from_cli(&cli)).context("failed to initialize logging")?;

    let config = config_from_cli(&cli)?;
    tracing::debug!(base_url = %config.base_url, timeout = ?config.timeout, "configuration");
    let dispatcher = Dispatcher::from_config(&config).context("failed to build HTTP client")?;

    let (tool, arguments) = match cli.command {
        Command::Serve(args) => {
            tracing::info!("starting MCP server v{}", env!("CARGO_PKG_VERSION"));
            let server = CtGovServer::new(dispatcher);
            match args.http {
                Some(addr) => serve_http(server, addr).await?,
                None => serve_stdio(server).await?,
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Tools => {
            let catalog = serde_json::to_string_pretty(&tools::catalog())?;
            println!("{catalog}");
            return Ok(ExitCode::SUCCESS);
        }
        Command::Study(args) => (GET_STUDY.to_string(), args.to_arguments()),
        Command::Search(args) => (SEARCH_STUDIES.to_string(), args.to_arguments()),
        Command::FieldValues(args) => (GET_FIELD_VALUES.to_string(), args.to_arguments()),
        Command::Call(args) => {
            let arguments = match serde_json::from_str(&args.arguments) {
                Ok(arguments) => arguments,
                Err(err) => {
                    eprintln!("error: arguments are not valid JSON: {err}");
                    return Ok(ExitCode::from(EXIT_INVALID_INPUT));
                }
            };
            (args.tool, arguments)
        }
    };

    match dispatcher.call(&tool, arguments).await {
        Ok(output) => {
            println!("{output}");
            if output.starts_with("Error: ") {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Err(DispatchError::Validation(err)) => {
            for violation in err.violations() {
                eprintln!("error: {violation}");
            }
            Ok(ExitCode::from(EXIT_INVALID_INPUT))
        }
        Err(err @ DispatchError::UnknownTool(_)) => {
            eprintln!("error: {err}");
            Ok(ExitCode::from(EXIT_INVALID_INPUT))
        }
    }
}

/// Environment first, then command-line overrides.
fn config_from_cli(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = ServerConfig::from_env()?;
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.clone(), "--base-url")?;
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(timeout_from_secs("--timeout-secs", secs)?);
    }
    Ok(config)
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
        with_ansi: cli.log_file.is_none() && io::stderr().is_terminal(),
        log_file: cli.log_file.clone(),
    }
}
