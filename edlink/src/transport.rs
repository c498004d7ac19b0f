//! Transport seam between the link state machine and the network
//!
//! [`EdlaClient`](crate::client::EdlaClient) is the production
//! implementation. Tests drive the state machine through scripted
//! implementations of the same trait.

use crate::error::Result;
use crate::models::{Frame, StreamKind};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Stream of data frames from one WebSocket connection.
///
/// The stream ends when the connection closes; dropping it closes the
/// connection.
pub type FrameStream = BoxStream<'static, Result<Frame>>;

/// Everything the link needs from the companion server
#[async_trait]
pub trait CompanionTransport: Send + Sync + 'static {
    /// Sends `token` to the challenge endpoint and returns the response body
    async fn challenge(&self, token: &str) -> Result<String>;

    /// Opens one of the server's WebSocket streams
    async fn open_stream(&self, kind: StreamKind) -> Result<FrameStream>;

    /// Fetches the complete journal of the current session as
    /// newline-delimited JSON
    async fn fetch_journal(&self) -> Result<String>;
}
