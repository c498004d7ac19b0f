//! Song snapshot model
//!
//! A [`SongSnapshot`] is what one poll of a station learned about the item
//! on air. It is never mutated: the next poll produces a new snapshot.
//! Progress is computed from plain fields through a per-source
//! [`ProgressFormula`] rather than captured state.

use serde::Serialize;
use std::fmt;

/// Length of the item on air
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SongDuration {
    /// Known length in milliseconds
    Finite(u64),
    /// The station never reports a change (continuous streams)
    Unbounded,
}

impl SongDuration {
    pub fn as_millis(self) -> Option<u64> {
        match self {
            Self::Finite(ms) => Some(ms),
            Self::Unbounded => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

/// How a station expresses playback progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressFormula {
    /// `(now - started_at) / duration`
    Elapsed,
    /// `now / ends_at`, as reported by live-info style APIs
    EndRatio { ends_at_ms: u64 },
    /// Constant value
    Fixed(f64),
}

/// Immutable description of what a station is playing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongSnapshot {
    title: Option<String>,
    artist: Option<String>,
    artwork_url: Option<String>,
    duration: SongDuration,
    started_at_ms: u64,
    progress: ProgressFormula,
}

impl SongSnapshot {
    /// Snapshot with unknown title, artist and artwork
    pub fn new(duration: SongDuration, started_at_ms: u64, progress: ProgressFormula) -> Self {
        Self {
            title: None,
            artist: None,
            artwork_url: None,
            duration,
            started_at_ms,
            progress,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn with_artist(mut self, artist: Option<String>) -> Self {
        self.artist = artist;
        self
    }

    pub fn with_artwork(mut self, artwork_url: Option<String>) -> Self {
        self.artwork_url = artwork_url;
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    pub fn artwork_url(&self) -> Option<&str> {
        self.artwork_url.as_deref()
    }

    pub fn duration(&self) -> SongDuration {
        self.duration
    }

    pub fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    pub fn progress_formula(&self) -> ProgressFormula {
        self.progress
    }

    /// Playback progress at `now_ms` with this station's formula.
    ///
    /// Not clamped: a stale snapshot can report more than 1.0.
    pub fn progress_at(&self, now_ms: u64) -> f64 {
        match self.progress {
            ProgressFormula::Elapsed => match self.duration {
                SongDuration::Finite(0) | SongDuration::Unbounded => 0.0,
                SongDuration::Finite(duration) => {
                    (now_ms as f64 - self.started_at_ms as f64) / duration as f64
                }
            },
            ProgressFormula::EndRatio { ends_at_ms: 0 } => 0.0,
            ProgressFormula::EndRatio { ends_at_ms } => now_ms as f64 / ends_at_ms as f64,
            ProgressFormula::Fixed(value) => value,
        }
    }

    /// Progress right now
    pub fn progress(&self) -> f64 {
        self.progress_at(edutils::now_millis())
    }

    /// Milliseconds left at `now_ms`, `None` for unbounded items.
    ///
    /// Zero once the reported end has passed. A start in the future (clock
    /// skew) yields more than the full duration.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        let duration = self.duration.as_millis()?;
        let elapsed = i128::from(now_ms) - i128::from(self.started_at_ms);
        let remaining = (i128::from(duration) - elapsed).max(0);
        Some(u64::try_from(remaining).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for SongSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.artist(), self.title()) {
            (Some(artist), Some(title)) => write!(f, "{artist} - {title}"),
            (None, Some(title)) => f.write_str(title),
            (Some(artist), None) => write!(f, "{artist} - (unknown title)"),
            (None, None) => f.write_str("(unknown)"),
        }
    }
}
