//! Wire and state types shared by the link components

use serde::{Deserialize, Serialize};
use std::fmt;

/// How far the link to the companion server currently reaches.
///
/// Exactly one phase holds at a time. Only the Game Link moves between
/// phases, and only the liveness prober's success can leave
/// [`ConnectionPhase::Disconnected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionPhase {
    /// Companion server unreachable or not yet probed
    #[default]
    Disconnected,
    /// Control stream attached, game not running
    LinkedIdle,
    /// Game running, status and journal streams attached
    LinkedActive,
}

impl ConnectionPhase {
    pub fn is_linked(self) -> bool {
        !matches!(self, Self::Disconnected)
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::LinkedActive)
    }
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::LinkedIdle => "linked (game not running)",
            Self::LinkedActive => "linked (game running)",
        })
    }
}

/// Frame received on the `/game` control stream
///
/// A missing `isGameRunning` field reads as "not running".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlMessage {
    #[serde(default)]
    pub is_game_running: bool,
}

/// The three WebSocket streams served by the companion server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Game process lifecycle (`{ isGameRunning }`)
    Game,
    /// `Status.json` updates
    Status,
    /// Journal events, one per frame
    Journal,
}

impl StreamKind {
    /// Route relative to the server base
    pub const fn route(self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Status => "file/Status",
            Self::Journal => "file/Journal",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}

/// A WebSocket data frame, stripped of control frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_message_parsing() {
        let running: ControlMessage = serde_json::from_str(r#"{"isGameRunning":true}"#).unwrap();
        assert!(running.is_game_running);

        let stopped: ControlMessage = serde_json::from_str(r#"{"isGameRunning":false}"#).unwrap();
        assert!(!stopped.is_game_running);

        let empty: ControlMessage = serde_json::from_str("{}").unwrap();
        assert!(!empty.is_game_running);

        assert!(serde_json::from_str::<ControlMessage>("[1,2]").is_err());
    }

    #[test]
    fn test_stream_routes() {
        assert_eq!(StreamKind::Game.route(), "game");
        assert_eq!(StreamKind::Status.route(), "file/Status");
        assert_eq!(StreamKind::Journal.to_string(), "file/Journal");
    }

    #[test]
    fn test_phase_helpers() {
        assert_eq!(ConnectionPhase::default(), ConnectionPhase::Disconnected);
        assert!(!ConnectionPhase::Disconnected.is_linked());
        assert!(ConnectionPhase::LinkedIdle.is_linked());
        assert!(!ConnectionPhase::LinkedIdle.is_active());
        assert!(ConnectionPhase::LinkedActive.is_active());
    }
}
