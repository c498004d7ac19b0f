//! # edradio - Now-playing metadata for community radio stations
//!
//! Polls each station's metadata API on its own schedule and publishes the
//! result as an observable [`SongSnapshot`] per station.
//!
//! ## Features
//!
//! - **Heterogeneous sources**: Centova Cast history, Airtime live-info and
//!   metadata-less streams behind one [`MetadataSource`] trait
//! - **Self-scheduling**: the next poll happens when the current item ends,
//!   never sooner than a 15 s floor, never again for unbounded streams
//! - **Isolation**: one worker task per station; errors become an absent song
//!
//! ## Quick Start
//!
//! ```no_run
//! use edradio::{default_stations, MetadataScheduler, StationStates};
//!
//! #[tokio::main]
//! async fn main() {
//!     let states = StationStates::new();
//!     let mut scheduler = MetadataScheduler::new(states.clone());
//!     scheduler.start_all(default_stations(&reqwest::Client::new()));
//!
//!     let mut sidewinder = states.subscribe("Radio Sidewinder").unwrap();
//!     while sidewinder.changed().await.is_ok() {
//!         if let Some(song) = sidewinder.borrow_and_update().as_ref() {
//!             println!("Radio Sidewinder: {song}");
//!         }
//!     }
//! }
//! ```

pub mod config_ext;
pub mod error;
pub mod models;
pub mod registry;
pub mod scheduler;
pub mod sources;
pub mod state;
pub mod station;

pub use config_ext::RadioConfigExt;
pub use error::{Error, Result};
pub use models::{ProgressFormula, SongDuration, SongSnapshot};
pub use registry::{configured_stations, default_stations};
pub use scheduler::{next_delay, MetadataScheduler, StationWorker};
pub use sources::{AirtimeLiveInfoSource, CentovaHistorySource, MetadataSource, StaticSource};
pub use state::{SongSlot, StationStates};
pub use station::StationDescriptor;
