//! Built-in station list
//!
//! The stations of the Elite Dangerous community radio scene, with their
//! stream addresses and metadata endpoints.

use crate::config_ext::RadioConfigExt;
use crate::sources::{AirtimeLiveInfoSource, CentovaHistorySource, StaticSource};
use crate::station::StationDescriptor;
use anyhow::Result;
use edconfig::Config;
use reqwest::Client;
use std::sync::Arc;

pub const SKVORTSOV_STREAM: &str = "https://cast1.torontocast.com:3225/stream";
pub const SKVORTSOV_HISTORY: &str =
    "https://cast1.torontocast.com:3210/api/v2/history/?limit=1&offset=0&server=1";
pub const SKVORTSOV_ARTWORK: &str =
    "https://cast1.torontocast.com:3210/media/widgets/skvortsovdisc_orb_s.png";

pub const HUTTON_STREAM: &str = "https://quincy.torontocast.com/hutton";
pub const HUTTON_HISTORY: &str =
    "https://quincy.torontocast.com:2760/api/v2/history/?limit=1&offset=0&server=1";

pub const SIDEWINDER_STREAM: &str = "https://radiosidewinder.out.airtime.pro:8000/radiosidewinder_a";
pub const SIDEWINDER_LIVE_INFO: &str = "https://radiosidewinder.airtime.pro/api/live-info";
pub const SIDEWINDER_ARTWORK: &str = "https://radiosidewinder.airtime.pro/images/cover-art.png";

pub const THIRD_ROCK_STREAM: &str = "https://rfcm.streamguys1.com/thirdrock-mp3";
pub const THIRD_ROCK_ARTWORK: &str =
    "https://player.streamguys.com/thirdrock/sgplayer/include/image/ThirdRockRadio500x500.jpg";

pub const BLUEMARS_STREAM: &str = "http://streams.echoesofbluemars.org:8000/bluemars";
pub const CRYOSLEEP_STREAM: &str = "http://streams.echoesofbluemars.org:8000/cryosleep";
pub const VOICES_FROM_WITHIN_STREAM: &str =
    "http://streams.echoesofbluemars.org:8000/voicesfromwithin";
pub const BLUEMARS_ARTWORK: &str =
    "http://echoesofbluemars.org/images/echoes_of_bluemars_700x394.jpg";

/// Built-in stations, in display order
pub fn default_stations(client: &Client) -> Vec<StationDescriptor> {
    vec![
        StationDescriptor::new(
            "skvortsov",
            "Radio Skvortsov",
            SKVORTSOV_STREAM,
            Arc::new(
                CentovaHistorySource::new(client.clone(), SKVORTSOV_HISTORY)
                    .with_fallback_artwork(SKVORTSOV_ARTWORK),
            ),
        ),
        StationDescriptor::new(
            "hutton",
            "Hutton Orbital Radio",
            HUTTON_STREAM,
            Arc::new(CentovaHistorySource::new(client.clone(), HUTTON_HISTORY)),
        ),
        StationDescriptor::new(
            "sidewinder",
            "Radio Sidewinder",
            SIDEWINDER_STREAM,
            Arc::new(
                AirtimeLiveInfoSource::new(client.clone(), SIDEWINDER_LIVE_INFO)
                    .with_fallback_artwork(SIDEWINDER_ARTWORK),
            ),
        ),
        StationDescriptor::new(
            "thirdrock",
            "NASA's Third Rock Radio",
            THIRD_ROCK_STREAM,
            Arc::new(StaticSource::new(THIRD_ROCK_ARTWORK)),
        ),
        StationDescriptor::new(
            "bluemars",
            "Echos of Bluemars",
            BLUEMARS_STREAM,
            Arc::new(StaticSource::new(BLUEMARS_ARTWORK)),
        ),
        StationDescriptor::new(
            "cryosleep",
            "Echos of Bluemars: Cryosleep",
            CRYOSLEEP_STREAM,
            Arc::new(StaticSource::new(BLUEMARS_ARTWORK)),
        ),
        StationDescriptor::new(
            "voicesfromwithin",
            "Echos of Bluemars: Voices From Within",
            VOICES_FROM_WITHIN_STREAM,
            Arc::new(StaticSource::new(BLUEMARS_ARTWORK)),
        ),
    ]
}

/// Built-in stations with the volume overrides of `config` applied
pub fn configured_stations(client: &Client, config: &Config) -> Result<Vec<StationDescriptor>> {
    default_stations(client)
        .into_iter()
        .map(|station| {
            let volume = config.get_radio_station_volume(station.slug(), station.volume())?;
            Ok(station.with_volume(volume))
        })
        .collect()
}
