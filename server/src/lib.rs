//! Async host for the ClinicalTrials.gov proxy.
//!
//! # Overview
//! Pairs the I/O-free `ctgov-core` with a browser-emulating `wreq` transport
//! and exposes the result two ways: an MCP tool server over stdio or
//! streamable HTTP (`mcp`) and one-shot CLI commands (`cli`). Both go through
//! the same `Dispatcher`.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod mcp;
pub mod transport;

pub use config::{ConfigError, ServerConfig};
pub use dispatch::{DispatchError, Dispatcher};
pub use transport::{BrowserTransport, Transport};
