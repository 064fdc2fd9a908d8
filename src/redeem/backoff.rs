use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Server-imposed cool-down shared by every token and every code.
#[derive(Debug, Clone, Default)]
pub struct BackoffState {
    state: Arc<Mutex<BackoffRecord>>,
}

#[derive(Debug, Default)]
struct BackoffRecord {
    /// Wall-clock time of the signal, reported in status only.
    signalled_at: Option<DateTime<Utc>>,
    /// Monotonic time of the signal, used for every elapsed check.
    started: Option<Instant>,
    delay: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackoffStatus {
    pub signalled_at: Option<DateTime<Utc>>,
    pub delay: Duration,
    pub remaining: Option<Duration>,
}

impl BackoffRecord {
    fn remaining(&self, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.started?);

        self.delay
            .checked_sub(elapsed)
            .filter(|remaining| !remaining.is_zero())
    }
}

impl BackoffState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while less time than the last signalled delay has passed.
    pub async fn is_active(&self) -> bool {
        self.remaining().await.is_some()
    }

    pub async fn remaining(&self) -> Option<Duration> {
        let state = self.state.lock().await;
        state.remaining(Instant::now())
    }

    /// Overwrites any previous signal.
    pub async fn record(&self, delay: Duration) {
        let mut state = self.state.lock().await;
        state.signalled_at = Some(Utc::now());
        state.started = Some(Instant::now());
        state.delay = delay;
    }

    pub async fn status(&self) -> BackoffStatus {
        let state = self.state.lock().await;
        BackoffStatus {
            signalled_at: state.signalled_at,
            delay: state.delay,
            remaining: state.remaining(Instant::now()),
        }
    }
}

/// Reads the numeric `retry_after` field (seconds) from a rate-limit body.
pub fn parse_retry_after(body: &str) -> Option<Duration> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let seconds = value.get("retry_after")?.as_f64()?;
    Duration::try_from_secs_f64(seconds).ok()
}
