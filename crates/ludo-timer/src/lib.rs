//! Single-shot turn alarm for room actors.
//!
//! A room has at most one pending alarm: the turn deadline of a human, or
//! the think/move delay of a bot. Arming a new alarm replaces the old one,
//! so a human acting early simply re-arms for the next player.
//!
//! # Disarmed mode
//!
//! With nothing armed, [`TurnTimer::expired`] pends forever. That makes it
//! safe to poll unconditionally from a `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = receiver.recv() => { /* handle commands */ }
//!         alarm = timer.expired() => { /* timeout, or bot tick */ }
//!     }
//! }
//! ```
//!
//! `expired` is cancel-safe: if another branch wins, the alarm stays
//! armed and fires on a later poll.

use std::fmt;
use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// An alarm observed later than this past its deadline logs a warning.
    /// A busy actor shows up here first.
    pub late_warn_threshold: Duration,
    /// Keep [`TimerMetrics`] up to date.
    pub metrics_enabled: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            late_warn_threshold: Duration::from_millis(50),
            metrics_enabled: true,
        }
    }
}

impl TimerConfig {
    pub const MIN_LATE_WARN: Duration = Duration::from_millis(1);
    pub const MAX_LATE_WARN: Duration = Duration::from_secs(10);

    /// Clamps out-of-range values. Called by [`TurnTimer::new`].
    pub fn validated(mut self) -> Self {
        let clamped = self
            .late_warn_threshold
            .clamp(Self::MIN_LATE_WARN, Self::MAX_LATE_WARN);
        if clamped != self.late_warn_threshold {
            warn!(
                requested_ms = self.late_warn_threshold.as_millis() as u64,
                clamped_ms = clamped.as_millis() as u64,
                "late_warn_threshold out of range, clamping"
            );
            self.late_warn_threshold = clamped;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Alarm (returned when the timer fires)
// ---------------------------------------------------------------------------

/// A fired alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm<K> {
    /// What the alarm was armed for.
    pub kind: K,
    pub deadline: Instant,
    /// How long after the deadline it was observed.
    pub late_by: Duration,
    /// Counter value of the arm call that set this alarm. Starts at 1.
    pub generation: u64,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerMetrics {
    pub armed: u64,
    pub fired: u64,
    /// Explicit cancels of a pending alarm.
    pub cancelled: u64,
    /// Pending alarms overwritten by a new arm.
    pub replaced: u64,
    /// Alarms observed past `late_warn_threshold`.
    pub late: u64,
    pub max_late: Duration,
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Pending<K> {
    kind: K,
    deadline: Instant,
    generation: u64,
}

/// One cancellable alarm, generic over what it is armed for.
pub struct TurnTimer<K> {
    config: TimerConfig,
    pending: Option<Pending<K>>,
    generation: u64,
    metrics: TimerMetrics,
}

impl<K: Clone + fmt::Debug> TurnTimer<K> {
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config: config.validated(),
            pending: None,
            generation: 0,
            metrics: TimerMetrics::default(),
        }
    }

    /// Arms the alarm `after` from now, replacing any pending one.
    /// Returns the deadline.
    pub fn arm(&mut self, after: Duration, kind: K) -> Instant {
        self.arm_at(Instant::now() + after, kind)
    }

    /// Arms the alarm for an absolute deadline, replacing any pending one.
    pub fn arm_at(&mut self, deadline: Instant, kind: K) -> Instant {
        if let Some(old) = self.pending.take() {
            trace!(kind = ?old.kind, generation = old.generation, "pending alarm replaced");
            self.bump(|m| m.replaced += 1);
        }
        self.generation += 1;
        debug!(?kind, generation = self.generation, "alarm armed");
        self.pending = Some(Pending {
            kind,
            deadline,
            generation: self.generation,
        });
        self.bump(|m| m.armed += 1);
        deadline
    }

    /// Disarms the pending alarm, returning what it was armed for.
    /// Idempotent.
    pub fn cancel(&mut self) -> Option<K> {
        let old = self.pending.take()?;
        debug!(kind = ?old.kind, generation = old.generation, "alarm cancelled");
        self.bump(|m| m.cancelled += 1);
        Some(old.kind)
    }

    /// Waits for the pending alarm and disarms it.
    ///
    /// Pends forever while disarmed.
    pub async fn expired(&mut self) -> Alarm<K> {
        let Some(deadline) = self.pending.as_ref().map(|p| p.deadline) else {
            return std::future::pending().await;
        };

        time::sleep_until(deadline).await;

        let Some(fired) = self.pending.take() else {
            return std::future::pending().await;
        };
        let late_by = Instant::now().saturating_duration_since(fired.deadline);

        if late_by > self.config.late_warn_threshold {
            warn!(
                kind = ?fired.kind,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "alarm observed late"
            );
            self.bump(|m| {
                m.late += 1;
                m.max_late = m.max_late.max(late_by);
            });
        }
        self.bump(|m| m.fired += 1);
        trace!(kind = ?fired.kind, generation = fired.generation, "alarm fired");

        Alarm {
            kind: fired.kind,
            deadline: fired.deadline,
            late_by,
            generation: fired.generation,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn kind(&self) -> Option<&K> {
        self.pending.as_ref().map(|p| &p.kind)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Time left until the pending deadline; zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Number of arm calls so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn metrics(&self) -> &TimerMetrics {
        &self.metrics
    }

    fn bump(&mut self, update: impl FnOnce(&mut TimerMetrics)) {
        if self.config.metrics_enabled {
            update(&mut self.metrics);
        }
    }
}

impl<K: Clone + fmt::Debug> Default for TurnTimer<K> {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}
