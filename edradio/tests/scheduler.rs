//! Timing tests for the metadata scheduler
//!
//! Sources are scripted in memory and the tokio clock is paused, so every
//! poll happens at an exact virtual time.

use async_trait::async_trait;
use edradio::{
    Error, MetadataScheduler, MetadataSource, ProgressFormula, Result, SongDuration, SongSnapshot,
    StationDescriptor, StationStates,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy)]
enum Reply {
    Fail,
    Unbounded,
    /// Item of `duration` ms that started `elapsed` ms ago
    Playing { duration: u64, elapsed: u64 },
}

#[derive(Debug)]
struct ScriptedSource {
    reply: Reply,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for ScriptedSource {
    async fn fetch_current(&self) -> Result<SongSnapshot> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.reply {
            Reply::Fail => Err(Error::MissingField("results[0]")),
            Reply::Unbounded => Ok(SongSnapshot::new(
                SongDuration::Unbounded,
                0,
                ProgressFormula::Fixed(0.0),
            )),
            Reply::Playing { duration, elapsed } => Ok(SongSnapshot::new(
                SongDuration::Finite(duration),
                edutils::now_millis() - elapsed,
                ProgressFormula::Elapsed,
            )
            .with_title(Some(format!("Track {call}")))),
        }
    }
}

fn station(name: &str, source: &Arc<ScriptedSource>) -> StationDescriptor {
    let source: Arc<dyn MetadataSource> = source.clone();
    StationDescriptor::new(name.to_lowercase(), name, "http://localhost/stream", source)
}

/// Advances the paused clock to `ms` after the test started
async fn advance_to(start: tokio::time::Instant, ms: u64) {
    tokio::time::sleep_until(start + Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_failing_station_polls_every_floor() {
    let start = tokio::time::Instant::now();
    let source = ScriptedSource::new(Reply::Fail);
    let mut scheduler = MetadataScheduler::new(StationStates::new());
    scheduler.start(station("Broken FM", &source));

    advance_to(start, 100).await;
    assert_eq!(source.calls(), 1);
    assert_eq!(scheduler.states().get("Broken FM"), None);

    advance_to(start, 14_900).await;
    assert_eq!(source.calls(), 1);

    advance_to(start, 15_100).await;
    assert_eq!(source.calls(), 2);

    advance_to(start, 30_100).await;
    assert_eq!(source.calls(), 3);

    scheduler.abort_all();
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_station_is_polled_once() {
    let start = tokio::time::Instant::now();
    let source = ScriptedSource::new(Reply::Unbounded);
    let mut scheduler = MetadataScheduler::new(StationStates::new());
    scheduler.start(station("Echos of Bluemars", &source));

    advance_to(start, 600_000).await;

    assert_eq!(source.calls(), 1);
    let song = scheduler.states().get("Echos of Bluemars").unwrap();
    assert!(song.duration().is_unbounded());
}

#[tokio::test(start_paused = true)]
async fn test_nearly_finished_song_waits_for_floor() {
    let start = tokio::time::Instant::now();
    // 200 s song, 190 s in: 10 s left, raised to 15 s
    let source = ScriptedSource::new(Reply::Playing {
        duration: 200_000,
        elapsed: 190_000,
    });
    let mut scheduler = MetadataScheduler::new(StationStates::new());
    scheduler.start(station("Radio Skvortsov", &source));

    advance_to(start, 14_900).await;
    assert_eq!(source.calls(), 1);

    advance_to(start, 15_100).await;
    assert_eq!(source.calls(), 2);

    scheduler.abort_all();
}

#[tokio::test(start_paused = true)]
async fn test_next_poll_at_song_end() {
    let start = tokio::time::Instant::now();
    let source = ScriptedSource::new(Reply::Playing {
        duration: 60_000,
        elapsed: 0,
    });
    let states = StationStates::new();
    let mut scheduler = MetadataScheduler::new(states.clone());
    scheduler.start(station("Hutton Orbital Radio", &source));

    advance_to(start, 100).await;
    assert_eq!(
        states.get("Hutton Orbital Radio").unwrap().title(),
        Some("Track 1")
    );

    advance_to(start, 59_900).await;
    assert_eq!(source.calls(), 1);

    advance_to(start, 60_100).await;
    assert_eq!(source.calls(), 2);
    assert_eq!(
        states.get("Hutton Orbital Radio").unwrap().title(),
        Some("Track 2")
    );

    scheduler.abort_all();
}

#[tokio::test(start_paused = true)]
async fn test_start_is_idempotent() {
    let start = tokio::time::Instant::now();
    let source = ScriptedSource::new(Reply::Fail);
    let mut scheduler = MetadataScheduler::new(StationStates::new());

    assert!(scheduler.start(station("Radio Sidewinder", &source)));
    assert!(!scheduler.start(station("Radio Sidewinder", &source)));
    assert_eq!(
        scheduler.start_all([
            station("Radio Sidewinder", &source),
            station("Radio Sidewinder", &source),
        ]),
        0
    );

    assert!(scheduler.is_started("Radio Sidewinder"));
    assert!(!scheduler.is_started("Hutton Orbital Radio"));
    assert_eq!(scheduler.worker_count(), 1);
    assert_eq!(scheduler.states().names(), ["Radio Sidewinder"]);

    advance_to(start, 100).await;
    assert_eq!(source.calls(), 1);

    scheduler.abort_all();
}

#[tokio::test(start_paused = true)]
async fn test_stations_are_isolated() {
    let start = tokio::time::Instant::now();
    let broken = ScriptedSource::new(Reply::Fail);
    let healthy = ScriptedSource::new(Reply::Playing {
        duration: 120_000,
        elapsed: 0,
    });

    let mut scheduler = MetadataScheduler::new(StationStates::new());
    assert_eq!(
        scheduler.start_all([station("Broken FM", &broken), station("Healthy FM", &healthy)]),
        2
    );

    advance_to(start, 45_100).await;

    assert_eq!(broken.calls(), 4);
    assert_eq!(healthy.calls(), 1);
    assert_eq!(scheduler.states().get("Broken FM"), None);
    assert!(scheduler.states().get("Healthy FM").is_some());

    scheduler.abort_all();
}

#[tokio::test(start_paused = true)]
async fn test_custom_floor() {
    let start = tokio::time::Instant::now();
    let source = ScriptedSource::new(Reply::Fail);
    let mut scheduler =
        MetadataScheduler::new(StationStates::new()).with_min_refresh(Duration::from_secs(30));
    scheduler.start(station("Broken FM", &source));

    advance_to(start, 29_900).await;
    assert_eq!(source.calls(), 1);
    advance_to(start, 30_100).await;
    assert_eq!(source.calls(), 2);

    scheduler.abort_all();
}

#[tokio::test(start_paused = true)]
async fn test_abort_stops_polling() {
    let source = ScriptedSource::new(Reply::Fail);
    let mut scheduler = MetadataScheduler::new(StationStates::new());
    scheduler.start(station("Broken FM", &source));

    sleep(Duration::from_millis(100)).await;
    scheduler.abort_all();
    assert_eq!(scheduler.worker_count(), 0);

    sleep(Duration::from_secs(120)).await;
    assert_eq!(source.calls(), 1);
    // aborted stations are not started again
    assert!(!scheduler.start(station("Broken FM", &source)));
}
