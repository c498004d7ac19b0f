//! # edlink - Elite Dangerous companion server link
//!
//! Keeps a live link to the local companion server that mirrors the game's
//! journal and `Status.json`, and folds what it receives into an observable
//! [`TelemetryState`].
//!
//! ## Components
//!
//! - [`LivenessProber`]: echo challenge on a fixed interval while disconnected
//! - [`GameLink`]: control stream supervision, data stream attach/detach and
//!   journal replay
//! - [`TelemetryState`]: connection phase plus the Status, Location and
//!   Commander slots
//! - [`EdlaClient`]: reqwest/tokio-tungstenite implementation of
//!   [`CompanionTransport`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use edlink::{EdlaClient, GameLink, TelemetryState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = TelemetryState::new();
//!     let client = Arc::new(EdlaClient::new()?);
//!     let link = GameLink::new(client, state.clone()).spawn();
//!
//!     let mut phase = state.subscribe_phase();
//!     while phase.changed().await.is_ok() {
//!         println!("Link is now {}", *phase.borrow());
//!     }
//!
//!     link.abort();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config_ext;
pub mod error;
pub mod journal;
pub mod link;
pub mod models;
pub mod prober;
pub mod state;
pub mod transport;

pub use client::{ClientBuilder, EdlaClient};
pub use config_ext::LinkConfigExt;
pub use error::{Error, Result};
pub use journal::{classify, parse_journal_log, JournalUpdate};
pub use link::{GameLink, LinkHandle};
pub use models::{ConnectionPhase, ControlMessage, Frame, StreamKind};
pub use prober::{verify_challenge, LivenessProber};
pub use state::{TelemetrySnapshot, TelemetryState};
pub use transport::{CompanionTransport, FrameStream};
