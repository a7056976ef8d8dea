//! Bounded polling of the Remote Summary Source.
//!
//! The poller is a pure state machine. It never performs I/O itself; each
//! transition returns a [`PollStep`] telling the caller what to do next
//! (fetch, arm a retry timer, or stop). An empty list means the source is still
//! indexing and is retried; any [`FetchError`] is terminal.
//!
//! ```text
//! Idle -> Loading -> Populated
//!                 -> Failed
//!                 -> WaitingRetry(n) -> Loading ... -> Exhausted   (n == max_attempts)
//! Any non-terminal phase -> Cancelled on teardown
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capabilities::{FetchError, TimerId, TimerIds};
use crate::model::CollectionSummary;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const RICH_MAX_ATTEMPTS: u32 = 10;
pub const SIMPLE_MAX_ATTEMPTS: u32 = 5;

/// How many times to ask, and how long to wait between empty answers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl PollPolicy {
    /// `max_attempts` is clamped to at least one; a poller always asks once.
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn single_shot() -> Self {
        Self::new(1, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(
            RICH_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollPhase {
    #[default]
    Idle,
    Loading,
    WaitingRetry,
    Populated,
    Exhausted,
    Failed,
    Cancelled,
}

impl PollPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Populated | Self::Exhausted | Self::Failed | Self::Cancelled
        )
    }
}

/// What the owner of a [`Poller`] must do after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollStep {
    /// Issue exactly one call to the summary source.
    Fetch,
    /// Empty answer; arm `timer` and come back through [`Poller::on_timer`].
    ScheduleRetry { timer: TimerId, delay: Duration },
    Populated(Vec<CollectionSummary>),
    /// Every attempt came back empty. Not an error: use placeholder content.
    Exhausted,
    Failed(FetchError),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Poller {
    policy: PollPolicy,
    attempts: u32,
    phase: PollPhase,
    pending_timer: Option<TimerId>,
}

impl Poller {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            phase: PollPhase::Idle,
            pending_timer: None,
        }
    }

    /// Number of fetches issued so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn phase(&self) -> &PollPhase {
        &self.phase
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending_timer
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, PollPhase::Loading | PollPhase::WaitingRetry)
    }

    /// Kick off the first attempt. Only valid from `Idle`.
    pub fn start(&mut self) -> Option<PollStep> {
        if self.phase != PollPhase::Idle {
            debug!(phase = ?self.phase, "poller already started");
            return None;
        }
        Some(self.begin_attempt())
    }

    /// Feed the outcome of the in-flight fetch. Answers that arrive while no
    /// fetch is in flight are dropped.
    pub fn on_response(
        &mut self,
        result: Result<Vec<CollectionSummary>, FetchError>,
        timer_ids: &mut TimerIds,
    ) -> Option<PollStep> {
        if self.phase != PollPhase::Loading {
            debug!(phase = ?self.phase, "ignoring summary response with no fetch in flight");
            return None;
        }

        let step = match result {
            Err(error) => {
                warn!(attempt = self.attempts, %error, "summary fetch failed");
                self.phase = PollPhase::Failed;
                PollStep::Failed(error)
            }
            Ok(data) if !data.is_empty() => {
                info!(attempt = self.attempts, count = data.len(), "summaries available");
                self.phase = PollPhase::Populated;
                PollStep::Populated(data)
            }
            Ok(_) if self.attempts < self.policy.max_attempts => {
                let timer = timer_ids.next_id();
                debug!(
                    attempt = self.attempts,
                    max_attempts = self.policy.max_attempts,
                    %timer,
                    "summary source still empty, scheduling retry"
                );
                self.pending_timer = Some(timer);
                self.phase = PollPhase::WaitingRetry;
                PollStep::ScheduleRetry {
                    timer,
                    delay: self.policy.interval(),
                }
            }
            Ok(_) => {
                info!(attempts = self.attempts, "summary source still empty, giving up");
                self.phase = PollPhase::Exhausted;
                PollStep::Exhausted
            }
        };
        Some(step)
    }

    /// A timer fired. Only the currently armed timer starts a new attempt.
    pub fn on_timer(&mut self, id: TimerId) -> Option<PollStep> {
        if self.phase != PollPhase::WaitingRetry || self.pending_timer != Some(id) {
            return None;
        }
        self.pending_timer = None;
        Some(self.begin_attempt())
    }

    /// Teardown. Returns the timer the caller must cancel with the shell, if any.
    pub fn cancel(&mut self) -> Option<TimerId> {
        if !self.phase.is_terminal() {
            self.phase = PollPhase::Cancelled;
        }
        self.pending_timer.take()
    }

    fn begin_attempt(&mut self) -> PollStep {
        self.attempts += 1;
        self.phase = PollPhase::Loading;
        PollStep::Fetch
    }
}
