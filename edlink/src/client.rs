//! HTTP/WebSocket client for the companion server
//!
//! The companion server exposes, relative to its base URL:
//!
//! - `GET {base}/{challenge_route}/{token}` echoing `token` back
//! - `GET {base}/file/Journal` with the journal as newline-delimited JSON
//! - WebSocket streams at `{base as ws}/game`, `/file/Status` and
//!   `/file/Journal`
//!
//! # Example
//!
//! ```no_run
//! use edlink::{CompanionTransport, EdlaClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EdlaClient::builder()
//!         .base_url("http://localhost:10986")
//!         .build()?;
//!
//!     let echoed = client.challenge("ping").await?;
//!     println!("Server answered {echoed}");
//!     Ok(())
//! }
//! ```

use crate::error::{Error, Result};
use crate::models::{Frame, StreamKind};
use crate::transport::{CompanionTransport, FrameStream};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::debug;
use url::Url;

/// Default companion server address
pub const DEFAULT_BASE_URL: &str = "http://localhost:10986";

/// Default route of the challenge endpoint
pub const DEFAULT_CHALLENGE_ROUTE: &str = "edla/challenge";

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "EDCockpit/0.1.0 (edlink)";

/// Companion server client
///
/// Stateless: every call opens its own request or connection. Requests have
/// no timeout unless one is set on the builder.
#[derive(Debug, Clone)]
pub struct EdlaClient {
    client: Client,
    base_url: String,
    challenge_route: String,
    timeout: Option<Duration>,
}

impl EdlaClient {
    /// Create a new client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Absolute HTTP URL of `route`
    pub fn http_url(&self, route: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            route.trim_start_matches('/')
        ))?)
    }

    /// Absolute WebSocket URL of `route` (`http` becomes `ws`, `https` becomes `wss`)
    pub fn ws_url(&self, route: &str) -> Result<Url> {
        let mut url = self.http_url(route)?;
        let scheme = match url.scheme() {
            "http" => "ws",
            "https" => "wss",
            "ws" | "wss" => return Ok(url),
            other => return Err(Error::other(format!("Unsupported URL scheme: {other}"))),
        };
        url.set_scheme(scheme)
            .map_err(|_| Error::other(format!("Cannot switch {url} to {scheme}")))?;
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::api_error(format!(
                "Server returned status: {}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl CompanionTransport for EdlaClient {
    async fn challenge(&self, token: &str) -> Result<String> {
        let url = self.http_url(&format!("{}/{}", self.challenge_route, token))?;
        self.get_text(url).await
    }

    async fn open_stream(&self, kind: StreamKind) -> Result<FrameStream> {
        let url = self.ws_url(kind.route())?;
        debug!(stream = %kind, %url, "Opening WebSocket stream");

        let (socket, _response) = connect_async(url.as_str()).await?;

        Ok(socket
            .filter_map(|message| async move {
                match message {
                    Ok(Message::Text(text)) => Some(Ok(Frame::Text(text))),
                    Ok(Message::Binary(data)) => Some(Ok(Frame::Binary(data))),
                    // ping/pong are answered by tungstenite, close ends the stream
                    Ok(_) => None,
                    Err(err) => Some(Err(Error::from(err))),
                }
            })
            .boxed())
    }

    async fn fetch_journal(&self) -> Result<String> {
        let url = self.http_url(StreamKind::Journal.route())?;
        self.get_text(url).await
    }
}

/// Builder for configuring an [`EdlaClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    base_url: String,
    challenge_route: String,
    timeout: Option<Duration>,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            challenge_route: DEFAULT_CHALLENGE_ROUTE.to_string(),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the server base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the challenge route, relative to the base URL
    pub fn challenge_route(mut self, route: impl Into<String>) -> Self {
        self.challenge_route = route.into().trim_matches('/').to_string();
        self
    }

    /// Set a per-request timeout for HTTP calls
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<EdlaClient> {
        // fail early on a malformed base URL
        Url::parse(&self.base_url)?;

        let client = match self.client {
            Some(client) => client,
            None => Client::builder().user_agent(&self.user_agent).build()?,
        };

        Ok(EdlaClient {
            client,
            base_url: self.base_url,
            challenge_route: self.challenge_route,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::default();
        assert_eq!(builder.base_url, DEFAULT_BASE_URL);
        assert_eq!(builder.challenge_route, DEFAULT_CHALLENGE_ROUTE);
        assert!(builder.timeout.is_none());
    }

    #[test]
    fn test_urls() {
        let client = EdlaClient::builder()
            .base_url("http://localhost:10986/")
            .build()
            .unwrap();

        assert_eq!(
            client.http_url("file/Journal").unwrap().as_str(),
            "http://localhost:10986/file/Journal"
        );
        assert_eq!(
            client.ws_url(StreamKind::Game.route()).unwrap().as_str(),
            "ws://localhost:10986/game"
        );
        assert_eq!(
            client.ws_url(StreamKind::Status.route()).unwrap().as_str(),
            "ws://localhost:10986/file/Status"
        );
    }

    #[test]
    fn test_secure_ws_url() {
        let client = EdlaClient::builder()
            .base_url("https://cockpit.example:443")
            .build()
            .unwrap();
        assert_eq!(client.ws_url("game").unwrap().scheme(), "wss");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(EdlaClient::builder().base_url("not a url").build().is_err());

        let client = EdlaClient::builder().base_url("ftp://host").build().unwrap();
        assert!(client.ws_url("game").is_err());
    }

    #[test]
    fn test_challenge_route_is_normalized() {
        let builder = ClientBuilder::new().challenge_route("/challenge/");
        assert_eq!(builder.challenge_route, "challenge");
    }
}
