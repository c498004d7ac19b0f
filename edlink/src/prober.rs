//! Liveness probing of the companion server
//!
//! A probe sends a fresh random token to the challenge endpoint and counts
//! as successful only if the body that comes back is byte-for-byte the same
//! token. Mismatches, network failures and timeouts are all "not live".
//! Probes repeat on a fixed interval with no backoff.

use crate::error::{Error, Result};
use crate::transport::CompanionTransport;
use rand::distr::Alphanumeric;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, trace};

/// Default delay between two probes
pub const DEFAULT_PROBE_INTERVAL_MS: u64 = 5_000;

/// Length of the random challenge token
pub const TOKEN_LENGTH: usize = 16;

/// Periodic challenge prober
pub struct LivenessProber<T> {
    transport: Arc<T>,
    period: Duration,
    ticker: Option<Interval>,
}

impl<T: CompanionTransport> LivenessProber<T> {
    pub fn new(transport: Arc<T>, period: Duration) -> Self {
        Self {
            transport,
            period,
            ticker: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Random alphanumeric token, safe to embed in a URL path
    pub fn generate_token() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Runs one challenge with a fresh token
    pub async fn probe_once(&self) -> bool {
        let token = Self::generate_token();
        self.probe_with_token(&token).await
    }

    /// Runs one challenge with `token`
    pub async fn probe_with_token(&self, token: &str) -> bool {
        challenge_matches(self.transport.as_ref(), token).await
    }

    /// Probes on every tick until the server answers correctly.
    ///
    /// The tick schedule persists across calls: the first call probes
    /// immediately, and a call made after a long linked session probes at
    /// most once right away before falling back to the fixed period. A
    /// server that accepts the challenge but then drops every stream is
    /// therefore retried at the probe rate, never in a tight loop.
    pub async fn wait_until_live(&mut self) {
        let period = self.period;
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        let transport = self.transport.as_ref();

        loop {
            ticker.tick().await;
            if challenge_matches(transport, &Self::generate_token()).await {
                info!("Companion server is live");
                return;
            }
        }
    }
}

/// Sends `token` and checks the echo
pub async fn verify_challenge<T: CompanionTransport>(transport: &T, token: &str) -> Result<()> {
    let echoed = transport.challenge(token).await?;
    if echoed != token {
        return Err(Error::ChallengeMismatch {
            sent: token.to_string(),
            received: echoed,
        });
    }
    Ok(())
}

async fn challenge_matches<T: CompanionTransport>(transport: &T, token: &str) -> bool {
    match verify_challenge(transport, token).await {
        Ok(()) => true,
        Err(err @ Error::ChallengeMismatch { .. }) => {
            debug!("{err}");
            false
        }
        Err(err) => {
            trace!("Companion server unreachable: {err}");
            false
        }
    }
}
