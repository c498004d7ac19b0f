//! Shared plumbing for the EDCockpit crates.
//!
//! - [`Observable`] : a single-writer, many-reader value slot with change
//!   notification, used by the telemetry and station state stores
//! - [`now_millis`] : wall-clock time as Unix epoch milliseconds
//!
//! # Examples
//!
//! ```
//! use edutils::Observable;
//!
//! let slot = Observable::new(None::<String>);
//! let mut rx = slot.subscribe();
//!
//! assert!(slot.set(Some("Sol".to_string())));
//! assert!(rx.has_changed().unwrap());
//! assert_eq!(rx.borrow_and_update().as_deref(), Some("Sol"));
//! ```
mod observable;

pub use observable::Observable;

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Clocks set before 1970 yield 0.
pub fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
