//! Metadata refresh scheduler
//!
//! Each station gets its own worker task that polls, publishes the result
//! and sleeps until the current item should be over:
//!
//! | Poll result | Next poll |
//! |---|---|
//! | absent (error) | after the floor (15 s) |
//! | unbounded duration | never, the worker stops |
//! | duration `D` started at `S` | after `max(floor, D - (now - S))` |
//!
//! Workers never interact, and a failure in one station has no effect on
//! the others.

use crate::models::SongSnapshot;
use crate::state::{SongSlot, StationStates};
use crate::station::StationDescriptor;
use anyhow::anyhow;
use edutils::now_millis;
use std::collections::HashSet;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Shortest delay between two polls of the same station
pub const DEFAULT_MIN_REFRESH_MS: u64 = 15_000;

/// Delay before the next poll, `None` when the station should not be
/// polled again
pub fn next_delay(song: Option<&SongSnapshot>, now_ms: u64, floor: Duration) -> Option<Duration> {
    let Some(song) = song else {
        return Some(floor);
    };
    let remaining = Duration::from_millis(song.remaining_ms(now_ms)?);
    Some(remaining.max(floor))
}

/// Handle to one station's polling task
pub struct StationWorker {
    station: String,
    join_handle: JoinHandle<()>,
}

impl StationWorker {
    pub fn spawn(descriptor: StationDescriptor, slot: SongSlot, floor: Duration) -> Self {
        let station = descriptor.name().to_string();

        let join_handle = tokio::spawn(async move {
            info!(station = descriptor.name(), "Starting metadata worker");

            loop {
                let song = descriptor.fetch().await;
                let delay = next_delay(song.as_ref(), now_millis(), floor);

                match &song {
                    Some(song) => debug!(station = descriptor.name(), %song, "Fetched song info"),
                    None => debug!(station = descriptor.name(), "No song info"),
                }
                slot.set(song);

                match delay {
                    Some(delay) => {
                        debug!(
                            station = descriptor.name(),
                            delay_ms = delay.as_millis() as u64,
                            "Next poll scheduled"
                        );
                        sleep(delay).await;
                    }
                    None => break,
                }
            }

            info!(
                station = descriptor.name(),
                "Station never changes its song, worker stopped"
            );
        });

        Self {
            station,
            join_handle,
        }
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }

    pub fn abort(&self) {
        self.join_handle.abort();
    }

    pub async fn wait(self) -> anyhow::Result<()> {
        if let Err(err) = self.join_handle.await {
            if err.is_cancelled() {
                warn!(station = %self.station, "Metadata worker cancelled: {err}");
                return Ok(());
            }
            return Err(anyhow!("Metadata worker join error: {}", err));
        }
        Ok(())
    }
}

/// Starts one worker per station, at most once per station name
pub struct MetadataScheduler {
    states: StationStates,
    floor: Duration,
    started: HashSet<String>,
    workers: Vec<StationWorker>,
}

impl MetadataScheduler {
    pub fn new(states: StationStates) -> Self {
        Self {
            states,
            floor: Duration::from_millis(DEFAULT_MIN_REFRESH_MS),
            started: HashSet::new(),
            workers: Vec::new(),
        }
    }

    /// Replaces the minimum delay between polls
    pub fn with_min_refresh(mut self, floor: Duration) -> Self {
        self.floor = floor;
        self
    }

    pub fn states(&self) -> &StationStates {
        &self.states
    }

    /// Starts polling `descriptor`.
    ///
    /// Returns `false`, without spawning anything, if a station with the
    /// same name was already started.
    pub fn start(&mut self, descriptor: StationDescriptor) -> bool {
        if !self.started.insert(descriptor.name().to_string()) {
            debug!(station = descriptor.name(), "Station already scheduled");
            return false;
        }

        let slot = self.states.register(descriptor.name());
        self.workers
            .push(StationWorker::spawn(descriptor, slot, self.floor));
        true
    }

    /// Starts every station of `stations`. Returns how many were new.
    pub fn start_all(&mut self, stations: impl IntoIterator<Item = StationDescriptor>) -> usize {
        stations
            .into_iter()
            .map(|station| self.start(station))
            .filter(|started| *started)
            .count()
    }

    pub fn is_started(&self, name: &str) -> bool {
        self.started.contains(name)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops every worker. Started stations stay marked as started.
    pub fn abort_all(&mut self) {
        for worker in self.workers.drain(..) {
            worker.abort();
        }
    }
}
