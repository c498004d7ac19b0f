//! Traces every state change the subsystems publish

use edlink::TelemetryState;
use edradio::StationStates;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

fn spawn_watch<T, F>(mut rx: watch::Receiver<T>, mut on_change: F) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
    F: FnMut(&T) + Send + 'static,
{
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            on_change(&rx.borrow_and_update());
        }
    })
}

/// One-line summary of a Location slot value
pub fn describe_location(location: &Value) -> String {
    let field = |name: &str| location.get(name).and_then(Value::as_str);

    let event = field("event").unwrap_or("Unknown");
    match (field("StarSystem"), field("StationName").or_else(|| field("Body"))) {
        (Some(system), Some(place)) => format!("{event}: {system} / {place}"),
        (Some(system), None) => format!("{event}: {system}"),
        (None, _) => event.to_string(),
    }
}

/// Spawns one watcher per observable slot
pub fn spawn_observers(telemetry: &TelemetryState, stations: &StationStates) -> Vec<JoinHandle<()>> {
    let mut observers = Vec::new();

    let state = telemetry.clone();
    observers.push(spawn_watch(telemetry.subscribe_commander(), move |_| {
        if let Some(name) = state.commander_name() {
            info!(commander = %name, "Commander identified");
        }
    }));

    observers.push(spawn_watch(telemetry.subscribe_location(), |location| {
        if let Some(location) = location {
            info!(location = %describe_location(location), "Location changed");
        }
    }));

    for name in stations.names() {
        let Some(rx) = stations.subscribe(&name) else {
            continue;
        };
        observers.push(spawn_watch(rx, move |song| match song {
            Some(song) => info!(station = %name, %song, "Now playing"),
            None => info!(station = %name, "No song info"),
        }));
    }

    observers
}
