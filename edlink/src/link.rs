//! Game Link supervisor
//!
//! Owns the connection lifecycle:
//!
//! ```text
//! Disconnected --probe ok--> LinkedIdle --game running--> LinkedActive
//!      ^                      |    ^                         |
//!      |                      |    +------game stopped-------+
//!      +---control stream closed or failed (from any phase)--+
//! ```
//!
//! While the game runs, one pump task per data stream forwards text frames
//! onto a single FIFO channel. The link loop drains that channel only after
//! the journal replay has been folded, so live events always land after
//! the history they follow.

use crate::error::Result;
use crate::journal::parse_journal_log;
use crate::models::{ConnectionPhase, ControlMessage, Frame, StreamKind};
use crate::prober::{LivenessProber, DEFAULT_PROBE_INTERVAL_MS};
use crate::state::TelemetryState;
use crate::transport::{CompanionTransport, FrameStream};
use anyhow::anyhow;
use futures::StreamExt;
use serde_json::Value;
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Connection supervisor for one companion server
pub struct GameLink<T> {
    transport: Arc<T>,
    state: TelemetryState,
    prober: LivenessProber<T>,
}

impl<T: CompanionTransport> GameLink<T> {
    pub fn new(transport: Arc<T>, state: TelemetryState) -> Self {
        let prober = LivenessProber::new(
            Arc::clone(&transport),
            Duration::from_millis(DEFAULT_PROBE_INTERVAL_MS),
        );
        Self {
            transport,
            state,
            prober,
        }
    }

    /// Replaces the delay between liveness probes
    pub fn with_probe_interval(mut self, period: Duration) -> Self {
        self.prober = LivenessProber::new(Arc::clone(&self.transport), period);
        self
    }

    pub fn state(&self) -> &TelemetryState {
        &self.state
    }

    /// Runs the supervisor on a background task
    pub fn spawn(self) -> LinkHandle {
        let join_handle = tokio::spawn(self.run());
        LinkHandle { join_handle }
    }

    /// Probes, links, and starts over whenever the link drops. Never returns.
    pub async fn run(mut self) {
        info!(
            probe_interval_ms = self.prober.period().as_millis() as u64,
            "Starting game link"
        );

        loop {
            self.prober.wait_until_live().await;
            self.run_session().await;
        }
    }

    /// One control-stream lifetime. Returns with the phase back at
    /// `Disconnected`.
    async fn run_session(&self) {
        let mut control = match self.transport.open_stream(StreamKind::Game).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!("Failed to open game stream: {err}");
                return;
            }
        };

        self.state.set_phase(ConnectionPhase::LinkedIdle);
        let mut session: Option<ActiveSession> = None;

        loop {
            let event = tokio::select! {
                biased;
                frame = control.next() => LinkEvent::Control(frame),
                (kind, text) = next_data(&mut session) => LinkEvent::Data(kind, text),
            };

            match event {
                LinkEvent::Control(Some(Ok(Frame::Text(text)))) => {
                    if let Err(err) = self.on_control(&text, &mut session).await {
                        warn!("Failed to attach game streams: {err}");
                        break;
                    }
                }
                LinkEvent::Control(Some(Ok(Frame::Binary(_)))) => {
                    trace!("Ignoring binary control frame");
                }
                LinkEvent::Control(Some(Err(err))) => {
                    warn!("Game stream failed: {err}");
                    break;
                }
                LinkEvent::Control(None) => {
                    info!("Game stream closed");
                    break;
                }
                LinkEvent::Data(kind, text) => self.on_data(kind, &text),
            }
        }

        drop(session);
        self.state.set_phase(ConnectionPhase::Disconnected);
    }

    async fn on_control(&self, text: &str, session: &mut Option<ActiveSession>) -> Result<()> {
        let message: ControlMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(err) => {
                debug!("Ignoring malformed control frame: {err}");
                return Ok(());
            }
        };

        match (message.is_game_running, session.is_some()) {
            (true, false) => {
                info!("Game started, attaching status and journal streams");
                *session = Some(self.activate().await?);
                self.state.set_phase(ConnectionPhase::LinkedActive);
            }
            (false, true) => {
                info!("Game stopped, detaching status and journal streams");
                *session = None;
                self.state.set_phase(ConnectionPhase::LinkedIdle);
            }
            (running, _) => trace!(running, "Control frame without phase change"),
        }

        Ok(())
    }

    /// Opens both data streams, then folds the journal history.
    ///
    /// The streams are opened first so nothing written between the replay
    /// fetch and the subscription is lost. Live frames queue up in the
    /// session channel meanwhile.
    async fn activate(&self) -> Result<ActiveSession> {
        let status = self.transport.open_stream(StreamKind::Status).await?;
        let journal = self.transport.open_stream(StreamKind::Journal).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let session = ActiveSession {
            pumps: vec![
                spawn_pump(StreamKind::Status, status, tx.clone()),
                spawn_pump(StreamKind::Journal, journal, tx),
            ],
            rx,
        };

        self.replay_journal().await;
        Ok(session)
    }

    async fn replay_journal(&self) {
        match self.transport.fetch_journal().await {
            Ok(text) => {
                let events = parse_journal_log(&text);
                for event in &events {
                    self.state.fold_journal(event);
                }
                info!(events = events.len(), "Journal replayed");
            }
            Err(err) => {
                warn!("Journal replay failed, continuing with live events only: {err}");
            }
        }
    }

    fn on_data(&self, kind: StreamKind, text: &str) {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                debug!(stream = %kind, "Ignoring non-JSON frame: {err}");
                return;
            }
        };

        match kind {
            StreamKind::Status => {
                self.state.fold_status(value);
            }
            StreamKind::Journal => {
                self.state.fold_journal(&value);
            }
            StreamKind::Game => {}
        }
    }
}

enum LinkEvent {
    Control(Option<Result<Frame>>),
    Data(StreamKind, String),
}

/// Data streams attached while the game runs. Dropping the session aborts
/// the pumps, which closes both sockets.
struct ActiveSession {
    pumps: Vec<JoinHandle<()>>,
    rx: mpsc::UnboundedReceiver<(StreamKind, String)>,
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        for pump in &self.pumps {
            pump.abort();
        }
    }
}

/// Next queued data frame, or never when no session is attached or every
/// pump has ended
async fn next_data(session: &mut Option<ActiveSession>) -> (StreamKind, String) {
    match session {
        Some(session) => match session.rx.recv().await {
            Some(item) => item,
            None => pending().await,
        },
        None => pending().await,
    }
}

fn spawn_pump(
    kind: StreamKind,
    mut stream: FrameStream,
    tx: mpsc::UnboundedSender<(StreamKind, String)>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Frame::Text(text)) => {
                    if tx.send((kind, text)).is_err() {
                        break;
                    }
                }
                Ok(Frame::Binary(_)) => trace!(stream = %kind, "Ignoring binary frame"),
                Err(err) => {
                    warn!(stream = %kind, "Stream failed: {err}");
                    break;
                }
            }
        }
        debug!(stream = %kind, "Stream ended");
    })
}

/// Handle to a spawned [`GameLink`]
pub struct LinkHandle {
    join_handle: JoinHandle<()>,
}

impl LinkHandle {
    /// Stops the link. Open streams close with the task.
    pub fn abort(&self) {
        self.join_handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }

    pub async fn wait(self) -> anyhow::Result<()> {
        if let Err(err) = self.join_handle.await {
            if err.is_cancelled() {
                debug!("Game link task cancelled");
                return Ok(());
            }
            return Err(anyhow!("Game link join error: {err}"));
        }
        Ok(())
    }
}
