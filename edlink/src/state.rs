//! Telemetry state store
//!
//! [`TelemetryState`] holds the connection phase and the three telemetry
//! slots. Clones share the same slots. Observers read values or subscribe
//! to changes; only the Game Link writes, through the crate-private
//! mutators.
//!
//! Slot policy:
//! - Status is replaced by every status frame and cleared whenever the
//!   phase leaves [`ConnectionPhase::LinkedActive`]
//! - Location and Commander are replaced by their journal events and
//!   survive disconnects
//! - writing a value equal to the current one is a no-op and wakes nobody

use crate::journal::{classify, JournalUpdate};
use crate::models::ConnectionPhase;
use edutils::Observable;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Plain copy of everything the store holds
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetrySnapshot {
    pub phase: ConnectionPhase,
    pub status: Option<Value>,
    pub location: Option<Value>,
    pub commander: Option<Value>,
}

impl TelemetrySnapshot {
    /// Folds one journal event into the snapshot, with the same rules the
    /// store applies to live and replayed events
    pub fn apply_journal(&mut self, event: &Value) {
        match classify(event) {
            Some(JournalUpdate::Commander(value)) => self.commander = Some(value),
            Some(JournalUpdate::Location(value)) => self.location = Some(value),
            None => {}
        }
    }

    /// Replaces the Status slot
    pub fn apply_status(&mut self, status: Value) {
        self.status = Some(status);
    }
}

#[derive(Debug, Default)]
struct Slots {
    phase: Observable<ConnectionPhase>,
    status: Observable<Option<Value>>,
    location: Observable<Option<Value>>,
    commander: Observable<Option<Value>>,
}

/// Shared, observable telemetry state
#[derive(Debug, Clone, Default)]
pub struct TelemetryState {
    slots: Arc<Slots>,
}

impl TelemetryState {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn phase(&self) -> ConnectionPhase {
        self.slots.phase.get()
    }

    pub fn status(&self) -> Option<Value> {
        self.slots.status.get()
    }

    pub fn location(&self) -> Option<Value> {
        self.slots.location.get()
    }

    pub fn commander(&self) -> Option<Value> {
        self.slots.commander.get()
    }

    /// Commander name from the last `Commander` event
    pub fn commander_name(&self) -> Option<String> {
        self.slots.commander.with(|commander| {
            commander
                .as_ref()
                .and_then(|c| c.get("Name"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
    }

    /// Copies every slot at once
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            phase: self.phase(),
            status: self.status(),
            location: self.location(),
            commander: self.commander(),
        }
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<ConnectionPhase> {
        self.slots.phase.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<Option<Value>> {
        self.slots.status.subscribe()
    }

    pub fn subscribe_location(&self) -> watch::Receiver<Option<Value>> {
        self.slots.location.subscribe()
    }

    pub fn subscribe_commander(&self) -> watch::Receiver<Option<Value>> {
        self.slots.commander.subscribe()
    }

    // ========================================================================
    // Mutations (Game Link only)
    // ========================================================================

    /// Moves to `phase`, clearing Status when leaving the active phase
    pub(crate) fn set_phase(&self, phase: ConnectionPhase) -> bool {
        let previous = self.slots.phase.get();
        if previous == phase {
            return false;
        }

        if previous.is_active() {
            self.clear_status();
        }
        self.slots.phase.set(phase);
        info!(from = %previous, to = %phase, "Connection phase changed");
        true
    }

    pub(crate) fn fold_status(&self, status: Value) -> bool {
        self.slots.status.set(Some(status))
    }

    /// Folds one journal event. Returns `true` if a slot changed.
    pub(crate) fn fold_journal(&self, event: &Value) -> bool {
        match classify(event) {
            Some(JournalUpdate::Commander(value)) => {
                let changed = self.slots.commander.set(Some(value));
                if changed {
                    debug!(commander = ?self.commander_name(), "Commander updated");
                }
                changed
            }
            Some(JournalUpdate::Location(value)) => self.slots.location.set(Some(value)),
            None => false,
        }
    }

    pub(crate) fn clear_status(&self) -> bool {
        self.slots.status.set(None)
    }
}
