//! Companion link settings in the EDCockpit configuration
//!
//! All keys live under `link`:
//!
//! ```yaml
//! link:
//!   enabled: true
//!   base_url: http://localhost:10986
//!   challenge_route: edla/challenge
//!   probe_interval_ms: 5000
//!   request_timeout_ms: 0     # 0 disables the timeout
//! ```
//!
//! Getters persist the default value when a key is missing or malformed.
//!
//! # Example
//!
//! ```no_run
//! use edconfig::get_config;
//! use edlink::LinkConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! if config.get_link_enabled()? {
//!     println!("Linking to {}", config.get_link_base_url()?);
//! }
//! # Ok(())
//! # }
//! ```

use crate::client::{DEFAULT_BASE_URL, DEFAULT_CHALLENGE_ROUTE};
use crate::prober::DEFAULT_PROBE_INTERVAL_MS;
use anyhow::Result;
use edconfig::Config;
use serde_yaml::Value;

/// Default request timeout, disabled
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 0;

/// Link accessors for [`edconfig::Config`]
pub trait LinkConfigExt {
    fn get_link_enabled(&self) -> Result<bool>;
    fn set_link_enabled(&self, enabled: bool) -> Result<()>;

    /// Companion server base URL
    fn get_link_base_url(&self) -> Result<String>;
    fn set_link_base_url(&self, url: &str) -> Result<()>;

    /// Challenge route relative to the base URL
    fn get_link_challenge_route(&self) -> Result<String>;
    fn set_link_challenge_route(&self, route: &str) -> Result<()>;

    /// Delay between liveness probes (default: 5000 ms)
    fn get_link_probe_interval_ms(&self) -> Result<u64>;
    fn set_link_probe_interval_ms(&self, interval_ms: u64) -> Result<()>;

    /// Per-request HTTP timeout, `0` when disabled
    fn get_link_request_timeout_ms(&self) -> Result<u64>;
    fn set_link_request_timeout_ms(&self, timeout_ms: u64) -> Result<()>;
}

impl LinkConfigExt for Config {
    fn get_link_enabled(&self) -> Result<bool> {
        match self.get_value(&["link", "enabled"]) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_link_enabled(true)?;
                Ok(true)
            }
        }
    }

    fn set_link_enabled(&self, enabled: bool) -> Result<()> {
        self.set_value(&["link", "enabled"], Value::Bool(enabled))
    }

    fn get_link_base_url(&self) -> Result<String> {
        match self.get_value(&["link", "base_url"]) {
            Ok(Value::String(url)) if !url.is_empty() => Ok(url),
            _ => {
                self.set_link_base_url(DEFAULT_BASE_URL)?;
                Ok(DEFAULT_BASE_URL.to_string())
            }
        }
    }

    fn set_link_base_url(&self, url: &str) -> Result<()> {
        self.set_value(&["link", "base_url"], Value::String(url.to_string()))
    }

    fn get_link_challenge_route(&self) -> Result<String> {
        match self.get_value(&["link", "challenge_route"]) {
            Ok(Value::String(route)) if !route.is_empty() => Ok(route),
            _ => {
                self.set_link_challenge_route(DEFAULT_CHALLENGE_ROUTE)?;
                Ok(DEFAULT_CHALLENGE_ROUTE.to_string())
            }
        }
    }

    fn set_link_challenge_route(&self, route: &str) -> Result<()> {
        self.set_value(&["link", "challenge_route"], Value::String(route.to_string()))
    }

    fn get_link_probe_interval_ms(&self) -> Result<u64> {
        let value = self.get_value(&["link", "probe_interval_ms"]).ok();
        match value.as_ref().and_then(Value::as_u64) {
            Some(ms) if ms > 0 => Ok(ms),
            _ => {
                self.set_link_probe_interval_ms(DEFAULT_PROBE_INTERVAL_MS)?;
                Ok(DEFAULT_PROBE_INTERVAL_MS)
            }
        }
    }

    fn set_link_probe_interval_ms(&self, interval_ms: u64) -> Result<()> {
        self.set_value(
            &["link", "probe_interval_ms"],
            Value::Number(serde_yaml::Number::from(interval_ms)),
        )
    }

    fn get_link_request_timeout_ms(&self) -> Result<u64> {
        let value = self.get_value(&["link", "request_timeout_ms"]).ok();
        match value.as_ref().and_then(Value::as_u64) {
            Some(ms) => Ok(ms),
            None => {
                self.set_link_request_timeout_ms(DEFAULT_REQUEST_TIMEOUT_MS)?;
                Ok(DEFAULT_REQUEST_TIMEOUT_MS)
            }
        }
    }

    fn set_link_request_timeout_ms(&self, timeout_ms: u64) -> Result<()> {
        self.set_value(
            &["link", "request_timeout_ms"],
            Value::Number(serde_yaml::Number::from(timeout_ms)),
        )
    }
}
