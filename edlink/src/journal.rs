//! Journal event classification
//!
//! Every journal event carries its kind in the `event` field. Only a few
//! kinds matter to the telemetry store:
//!
//! | Kind | Effect |
//! |---|---|
//! | `Commander` | replaces the Commander slot |
//! | one of [`LOCATION_EVENTS`] | replaces the Location slot with the event verbatim |
//! | `StartJump` with `JumpType == "Hyperspace"` | replaces the Location slot with [`hyperspace_placeholder`] |
//!
//! Everything else is ignored. Live frames and replayed journal lines go
//! through the same [`classify`] function.

use serde_json::{json, Value};
use tracing::debug;

/// Identity event
pub const COMMANDER_EVENT: &str = "Commander";

/// Jump initiation event
pub const START_JUMP_EVENT: &str = "StartJump";

/// `JumpType` value of a jump to another system
pub const HYPERSPACE_JUMP_TYPE: &str = "Hyperspace";

/// Navigation events copied verbatim into the Location slot
pub const LOCATION_EVENTS: &[&str] = &[
    "Docked",
    "Undocked",
    "FSDJump",
    "Location",
    "ApproachBody",
    "LeaveBody",
    "ApproachSettlement",
    "SupercruiseEntry",
    "SupercruiseExit",
    "DockingRequested",
];

/// Slot update derived from one journal event
#[derive(Debug, Clone, PartialEq)]
pub enum JournalUpdate {
    Commander(Value),
    Location(Value),
}

/// Location reported while travelling through hyperspace.
///
/// No journal event describes the ship's position between `StartJump` and
/// the following `FSDJump`, so this fixed value stands in for it.
pub fn hyperspace_placeholder() -> Value {
    json!({
        "event": "Hyperspace",
        "StarSystem": null,
        "Body": null,
        "Docked": false,
    })
}

/// Kind of a journal event, if it has one
pub fn event_kind(event: &Value) -> Option<&str> {
    event.get("event").and_then(Value::as_str)
}

/// Maps an event to the slot it updates, or `None` for ignored kinds
pub fn classify(event: &Value) -> Option<JournalUpdate> {
    let kind = event_kind(event)?;

    if kind == COMMANDER_EVENT {
        return Some(JournalUpdate::Commander(event.clone()));
    }

    if kind == START_JUMP_EVENT {
        let jump_type = event.get("JumpType").and_then(Value::as_str);
        return (jump_type == Some(HYPERSPACE_JUMP_TYPE))
            .then(|| JournalUpdate::Location(hyperspace_placeholder()));
    }

    LOCATION_EVENTS
        .contains(&kind)
        .then(|| JournalUpdate::Location(event.clone()))
}

/// Splits a journal dump into events, oldest first.
///
/// Blank lines (the dump usually ends with one) are skipped, and so are
/// lines that are not valid JSON.
pub fn parse_journal_log(text: &str) -> Vec<Value> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<Value>(line) {
            Ok(event) => Some(event),
            Err(err) => {
                debug!("Skipping unparsable journal line: {err}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commander_event() {
        let event = json!({"event": "Commander", "Name": "Jameson", "FID": "F123"});
        assert_eq!(classify(&event), Some(JournalUpdate::Commander(event.clone())));
    }

    #[test]
    fn test_location_events_are_verbatim() {
        for kind in LOCATION_EVENTS {
            let event = json!({"event": kind, "StarSystem": "Shinrarta Dezhra"});
            assert_eq!(
                classify(&event),
                Some(JournalUpdate::Location(event.clone())),
                "{kind} should update the location"
            );
        }
    }

    #[test]
    fn test_hyperspace_jump_synthesizes_placeholder() {
        let event = json!({
            "event": "StartJump",
            "JumpType": "Hyperspace",
            "StarSystem": "Achenar",
        });
        assert_eq!(
            classify(&event),
            Some(JournalUpdate::Location(hyperspace_placeholder()))
        );
    }

    #[test]
    fn test_supercruise_jump_is_ignored() {
        let event = json!({"event": "StartJump", "JumpType": "Supercruise"});
        assert_eq!(classify(&event), None);

        let untyped = json!({"event": "StartJump"});
        assert_eq!(classify(&untyped), None);
    }

    #[test]
    fn test_unknown_and_malformed_events_are_ignored() {
        assert_eq!(classify(&json!({"event": "Music", "MusicTrack": "NoTrack"})), None);
        assert_eq!(classify(&json!({"timestamp": "2024-01-01T00:00:00Z"})), None);
        assert_eq!(classify(&json!({"event": 42})), None);
        assert_eq!(classify(&json!("Commander")), None);
        assert_eq!(classify(&Value::Null), None);
    }

    #[test]
    fn test_parse_journal_log() {
        let text = concat!(
            r#"{"event":"Fileheader","part":1}"#,
            "\r\n",
            "\n",
            r#"{"event":"Commander","Name":"Jameson"}"#,
            "\n",
            "not json\n",
            "   \n",
            r#"{"event":"Location","StarSystem":"Sol"}"#,
            "\n",
        );

        let events = parse_journal_log(text);
        let kinds: Vec<_> = events.iter().filter_map(event_kind).collect();
        assert_eq!(kinds, ["Fileheader", "Commander", "Location"]);
    }

    #[test]
    fn test_parse_empty_journal() {
        assert!(parse_journal_log("").is_empty());
        assert!(parse_journal_log("\n\n").is_empty());
    }
}
