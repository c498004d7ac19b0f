//! Station metadata adapters
//!
//! Every station publishes its now-playing data in its own shape. Each
//! adapter maps one shape onto [`SongSnapshot`] and fills in what the
//! upstream lacks (fallback artwork, unknown artist).
//!
//! | Adapter | Upstream |
//! |---|---|
//! | [`CentovaHistorySource`] | Centova Cast `api/v2/history` (`results[0]`) |
//! | [`AirtimeLiveInfoSource`] | Airtime `api/live-info` (`current`) |
//! | [`StaticSource`] | none, continuous streams without metadata |

use crate::error::{Error, Result};
use crate::models::{ProgressFormula, SongDuration, SongSnapshot};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::trace;

/// Source of now-playing metadata for one station
#[async_trait]
pub trait MetadataSource: Debug + Send + Sync {
    /// Polls the upstream once
    async fn fetch_current(&self) -> Result<SongSnapshot>;
}

async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    trace!(%url, "Fetching station metadata");
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(Error::ApiError(format!(
            "Server returned status: {}",
            response.status()
        )));
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Empty strings count as missing, like missing keys and nulls
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

// ============================================================================
// Centova Cast history
// ============================================================================

#[derive(Debug, Deserialize)]
struct CentovaHistory {
    #[serde(default)]
    results: Vec<CentovaTrack>,
}

#[derive(Debug, Deserialize)]
struct CentovaTrack {
    title: Option<String>,
    author: Option<String>,
    img_large_url: Option<String>,
    length: Option<u64>,
    ts: Option<u64>,
}

/// Centova Cast history endpoint, newest track first
#[derive(Debug, Clone)]
pub struct CentovaHistorySource {
    client: Client,
    api_url: String,
    fallback_artwork: Option<String>,
}

impl CentovaHistorySource {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            fallback_artwork: None,
        }
    }

    /// Artwork used when the track has none
    pub fn with_fallback_artwork(mut self, url: impl Into<String>) -> Self {
        self.fallback_artwork = Some(url.into());
        self
    }

    fn snapshot(&self, history: CentovaHistory) -> Result<SongSnapshot> {
        let track = history
            .results
            .into_iter()
            .next()
            .ok_or(Error::MissingField("results[0]"))?;
        let length = track.length.ok_or(Error::MissingField("length"))?;
        let started_at = track.ts.ok_or(Error::MissingField("ts"))?;

        Ok(
            SongSnapshot::new(SongDuration::Finite(length), started_at, ProgressFormula::Elapsed)
                .with_title(track.title)
                .with_artist(track.author)
                .with_artwork(non_empty(track.img_large_url).or_else(|| self.fallback_artwork.clone())),
        )
    }
}

#[async_trait]
impl MetadataSource for CentovaHistorySource {
    async fn fetch_current(&self) -> Result<SongSnapshot> {
        let history = get_json(&self.client, &self.api_url).await?;
        self.snapshot(history)
    }
}

// ============================================================================
// Airtime live-info
// ============================================================================

#[derive(Debug, Deserialize)]
struct AirtimeLiveInfo {
    current: Option<AirtimeCurrent>,
}

#[derive(Debug, Deserialize)]
struct AirtimeCurrent {
    starts: Option<String>,
    ends: Option<String>,
    metadata: Option<AirtimeMetadata>,
    album_artwork_image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AirtimeMetadata {
    track_title: Option<String>,
    artist_name: Option<String>,
}

/// Parses an Airtime timestamp into epoch milliseconds.
///
/// Accepts RFC 3339 and the bare `YYYY-MM-DD HH:MM:SS[.ffffff]` form, which
/// is read as UTC.
pub fn parse_airtime_timestamp(value: &str) -> Result<u64> {
    let millis = match DateTime::parse_from_rfc3339(value) {
        Ok(datetime) => datetime.timestamp_millis(),
        Err(_) => NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
            .map_err(|err| Error::InvalidTimestamp(format!("{value}: {err}")))?
            .and_utc()
            .timestamp_millis(),
    };
    u64::try_from(millis).map_err(|_| Error::InvalidTimestamp(value.to_string()))
}

/// Airtime live-info endpoint
///
/// Progress follows the upstream's `now / ends` convention
/// ([`ProgressFormula::EndRatio`]).
#[derive(Debug, Clone)]
pub struct AirtimeLiveInfoSource {
    client: Client,
    api_url: String,
    fallback_artwork: Option<String>,
}

impl AirtimeLiveInfoSource {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            fallback_artwork: None,
        }
    }

    /// Artwork used when the item has none
    pub fn with_fallback_artwork(mut self, url: impl Into<String>) -> Self {
        self.fallback_artwork = Some(url.into());
        self
    }

    fn snapshot(&self, info: AirtimeLiveInfo) -> Result<SongSnapshot> {
        let current = info.current.ok_or(Error::MissingField("current"))?;
        let starts = current.starts.ok_or(Error::MissingField("current.starts"))?;
        let ends = current.ends.ok_or(Error::MissingField("current.ends"))?;

        let started_at = parse_airtime_timestamp(&starts)?;
        let ends_at = parse_airtime_timestamp(&ends)?;
        if ends_at < started_at {
            return Err(Error::InvalidTimestamp(format!("{ends} is before {starts}")));
        }

        let metadata = current.metadata.unwrap_or_default();
        Ok(SongSnapshot::new(
            SongDuration::Finite(ends_at - started_at),
            started_at,
            ProgressFormula::EndRatio {
                ends_at_ms: ends_at,
            },
        )
        .with_title(metadata.track_title)
        .with_artist(metadata.artist_name)
        .with_artwork(non_empty(current.album_artwork_image).or_else(|| self.fallback_artwork.clone())))
    }
}

#[async_trait]
impl MetadataSource for AirtimeLiveInfoSource {
    async fn fetch_current(&self) -> Result<SongSnapshot> {
        let info = get_json(&self.client, &self.api_url).await?;
        self.snapshot(info)
    }
}

// ============================================================================
// Static
// ============================================================================

/// Station without a metadata API
///
/// Always reports an unknown item of unbounded length, so the scheduler
/// polls it once.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    artwork_url: Option<String>,
}

impl StaticSource {
    pub fn new(artwork_url: impl Into<String>) -> Self {
        Self {
            artwork_url: Some(artwork_url.into()),
        }
    }
}

#[async_trait]
impl MetadataSource for StaticSource {
    async fn fetch_current(&self) -> Result<SongSnapshot> {
        Ok(
            SongSnapshot::new(SongDuration::Unbounded, 0, ProgressFormula::Fixed(0.0))
                .with_artwork(self.artwork_url.clone()),
        )
    }
}
