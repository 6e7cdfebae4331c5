//! Execution of core `HttpRequest` values over the network.
//!
//! # Design
//! `Transport` is the seam between the I/O-free core and the outside world.
//! Implementations never report an HTTP status as an error: any response
//! that arrives, 2xx or not, comes back as an `HttpResponse` for the core to
//! classify. Only the absence of a response is a `TransportError`, and a
//! deadline overrun is always reported as `TransportError::Timeout`.
//!
//! The registry's edge filters clients by TLS fingerprint, so the production
//! transport emulates a Chrome handshake (cipher order, extensions, HTTP/2
//! settings and default headers), not just a browser `User-Agent`.

use std::future::Future;
use std::time::Duration;

use ctgov_core::{HttpRequest, HttpResponse, TransportError};
use tracing::debug;
use wreq::Client;
use wreq_util::Emulation;

use crate::config::ServerConfig;

/// Browser profile presented to the registry.
pub const EMULATION: Emulation = Emulation::Chrome131;

/// Performs one GET described by an `HttpRequest`.
pub trait Transport: Send + Sync {
    fn get(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Transport that looks like Chrome on the wire. Built once at startup and
/// shared; the inner client pools connections.
#[derive(Clone)]
pub struct BrowserTransport {
    client: Client,
    timeout: Duration,
}

impl std::fmt::Debug for BrowserTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserTransport")
            .field("emulation", &EMULATION)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BrowserTransport {
    pub fn new(config: &ServerConfig) -> Result<Self, wreq::Error> {
        let mut builder = Client::builder()
            .emulation(EMULATION)
            .timeout(config.timeout);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.as_str());
        }
        Ok(Self {
            client: builder.build()?,
            timeout: config.timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transport for BrowserTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut url = wreq::Url::parse(&request.url)
            .map_err(|e| TransportError::other("InvalidUrl", e.to_string()))?;
        if !request.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        debug!(%url, "GET");
        let mut builder = self.client.get(url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        debug!(status, bytes = body.len(), "response");

        Ok(HttpResponse { status, body })
    }
}

/// Map a client failure onto the transport vocabulary. The kind names the
/// failure class and ends up in the user-facing message.
fn classify(err: wreq::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout;
    }
    let kind = if err.is_connect() {
        "ConnectError"
    } else if err.is_redirect() {
        "RedirectError"
    } else if err.is_body() {
        "BodyError"
    } else if err.is_decode() {
        "DecodeError"
    } else if err.is_builder() {
        "BuilderError"
    } else if err.is_request() {
        "RequestError"
    } else {
        "TransportError"
    };
    TransportError::other(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_keeps_configured_timeout() {
        let config = ServerConfig::default().with_timeout(Duration::from_secs(5));
        let transport = BrowserTransport::new(&config).unwrap();
        assert_eq!(transport.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn user_agent_override_is_accepted() {
        let config = ServerConfig {
            user_agent: Some("ctgov-test/1.0".to_string()),
            ..ServerConfig::default()
        };
        assert!(BrowserTransport::new(&config).is_ok());
    }

    #[tokio::test]
    async fn malformed_url_is_reported_not_panicked() {
        let transport = BrowserTransport::new(&ServerConfig::default()).unwrap();
        let err = transport
            .get(HttpRequest {
                url: "not a url".to_string(),
                query: Vec::new(),
                headers: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Other { ref kind, .. } if kind == "InvalidUrl"));
    }
}
