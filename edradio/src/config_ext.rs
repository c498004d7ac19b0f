//! Radio settings in the EDCockpit configuration
//!
//! ```yaml
//! radio:
//!   enabled: true
//!   min_refresh_ms: 15000
//!   request_timeout_ms: 0      # 0 disables the timeout
//!   stations:
//!     hutton:
//!       volume: 0.8
//! ```
//!
//! Station entries are keyed by [`StationDescriptor::slug`](crate::StationDescriptor::slug).
//! Getters persist the default value when a key is missing or malformed.

use crate::scheduler::DEFAULT_MIN_REFRESH_MS;
use anyhow::Result;
use edconfig::Config;
use serde_yaml::Value;

/// Default request timeout, disabled
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 0;

/// Radio accessors for [`edconfig::Config`]
pub trait RadioConfigExt {
    fn get_radio_enabled(&self) -> Result<bool>;
    fn set_radio_enabled(&self, enabled: bool) -> Result<()>;

    /// Shortest delay between two polls of one station (default: 15000 ms)
    fn get_radio_min_refresh_ms(&self) -> Result<u64>;
    fn set_radio_min_refresh_ms(&self, refresh_ms: u64) -> Result<()>;

    /// Per-request HTTP timeout, `0` when disabled
    fn get_radio_request_timeout_ms(&self) -> Result<u64>;
    fn set_radio_request_timeout_ms(&self, timeout_ms: u64) -> Result<()>;

    /// Volume of the station `slug`, `default` when not configured
    fn get_radio_station_volume(&self, slug: &str, default: f32) -> Result<f32>;
    fn set_radio_station_volume(&self, slug: &str, volume: f32) -> Result<()>;
}

impl RadioConfigExt for Config {
    fn get_radio_enabled(&self) -> Result<bool> {
        match self.get_value(&["radio", "enabled"]) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_radio_enabled(true)?;
                Ok(true)
            }
        }
    }

    fn set_radio_enabled(&self, enabled: bool) -> Result<()> {
        self.set_value(&["radio", "enabled"], Value::Bool(enabled))
    }

    fn get_radio_min_refresh_ms(&self) -> Result<u64> {
        let value = self.get_value(&["radio", "min_refresh_ms"]).ok();
        match value.as_ref().and_then(Value::as_u64) {
            Some(ms) if ms > 0 => Ok(ms),
            _ => {
                self.set_radio_min_refresh_ms(DEFAULT_MIN_REFRESH_MS)?;
                Ok(DEFAULT_MIN_REFRESH_MS)
            }
        }
    }

    fn set_radio_min_refresh_ms(&self, refresh_ms: u64) -> Result<()> {
        self.set_value(
            &["radio", "min_refresh_ms"],
            Value::Number(serde_yaml::Number::from(refresh_ms)),
        )
    }

    fn get_radio_request_timeout_ms(&self) -> Result<u64> {
        let value = self.get_value(&["radio", "request_timeout_ms"]).ok();
        match value.as_ref().and_then(Value::as_u64) {
            Some(ms) => Ok(ms),
            None => {
                self.set_radio_request_timeout_ms(DEFAULT_REQUEST_TIMEOUT_MS)?;
                Ok(DEFAULT_REQUEST_TIMEOUT_MS)
            }
        }
    }

    fn set_radio_request_timeout_ms(&self, timeout_ms: u64) -> Result<()> {
        self.set_value(
            &["radio", "request_timeout_ms"],
            Value::Number(serde_yaml::Number::from(timeout_ms)),
        )
    }

    fn get_radio_station_volume(&self, slug: &str, default: f32) -> Result<f32> {
        let value = self.get_value(&["radio", "stations", slug, "volume"]).ok();
        match value.as_ref().and_then(Value::as_f64) {
            Some(volume) if (0.0..=1.0).contains(&volume) => Ok(volume as f32),
            _ => {
                self.set_radio_station_volume(slug, default)?;
                Ok(default)
            }
        }
    }

    fn set_radio_station_volume(&self, slug: &str, volume: f32) -> Result<()> {
        self.set_value(
            &["radio", "stations", slug, "volume"],
            Value::Number(serde_yaml::Number::from(f64::from(volume))),
        )
    }
}
