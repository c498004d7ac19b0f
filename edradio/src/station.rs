//! Station descriptors

use crate::models::SongSnapshot;
use crate::sources::MetadataSource;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// One radio station, fixed at startup
#[derive(Clone)]
pub struct StationDescriptor {
    slug: String,
    name: String,
    stream_url: String,
    volume: f32,
    source: Arc<dyn MetadataSource>,
}

impl StationDescriptor {
    /// Station at full volume
    pub fn new(
        slug: impl Into<String>,
        name: impl Into<String>,
        stream_url: impl Into<String>,
        source: Arc<dyn MetadataSource>,
    ) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            stream_url: stream_url.into(),
            volume: 1.0,
            source,
        }
    }

    /// Loudness scale factor, clamped to `0.0..=1.0`
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = if volume.is_nan() {
            1.0
        } else {
            volume.clamp(0.0, 1.0)
        };
        self
    }

    /// Configuration key of the station
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Display name, unique across stations
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn source(&self) -> &Arc<dyn MetadataSource> {
        &self.source
    }

    /// Polls the station's source. Every failure becomes `None`.
    pub async fn fetch(&self) -> Option<SongSnapshot> {
        match self.source.fetch_current().await {
            Ok(song) => Some(song),
            Err(err) => {
                warn!(station = %self.name, "Failed to fetch song info: {err}");
                None
            }
        }
    }
}

impl fmt::Debug for StationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StationDescriptor")
            .field("slug", &self.slug)
            .field("name", &self.name)
            .field("stream_url", &self.stream_url)
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}
