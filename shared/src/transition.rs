//! Timer-driven scene transitions for presentation screens.
//!
//! A [`SceneClock`] holds the current scene and at most one pending
//! transition. Scheduling a new transition cancels the old one, and teardown
//! cancels whatever is pending, so a late timer can never move a screen that
//! is gone.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capabilities::{TimerId, TimerIds};

pub const VAULT_SCENE_MS: u64 = 2_500;
pub const OVERVIEW_SCENE_MS: u64 = 4_000;
pub const CITY_OPEN_DELAY_MS: u64 = 100;

pub trait Scene: Clone + PartialEq + std::fmt::Debug {
    /// The scene this one advances to on its own, and after how long.
    fn auto_advance(&self) -> Option<(Self, Duration)>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scene", rename_all = "snake_case")]
pub enum ItineraryScene {
    Vault,
    Overview,
    Timeline,
    City { city_id: String },
}

impl Scene for ItineraryScene {
    fn auto_advance(&self) -> Option<(Self, Duration)> {
        match self {
            Self::Vault => Some((Self::Overview, Duration::from_millis(VAULT_SCENE_MS))),
            Self::Overview => Some((Self::Timeline, Duration::from_millis(OVERVIEW_SCENE_MS))),
            Self::Timeline | Self::City { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct PendingTransition<S> {
    timer: TimerId,
    to: S,
}

/// Timer requests produced by a clock transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClockStep {
    pub cancel: Option<TimerId>,
    pub start: Option<(TimerId, Duration)>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneClock<S> {
    current: S,
    pending: Option<PendingTransition<S>>,
}

impl<S: Scene> SceneClock<S> {
    pub fn start(initial: S, timer_ids: &mut TimerIds) -> (Self, ClockStep) {
        let mut clock = Self {
            current: initial,
            pending: None,
        };
        let start = clock.schedule_auto(timer_ids);
        (clock, ClockStep { cancel: None, start })
    }

    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending.as_ref().map(|p| p.timer)
    }

    /// Advance if `id` is the pending transition. `None` for foreign or stale timers.
    pub fn on_timer(&mut self, id: TimerId, timer_ids: &mut TimerIds) -> Option<ClockStep> {
        if self.pending_timer() != Some(id) {
            return None;
        }
        let pending = self.pending.take()?;
        debug!(from = ?self.current, to = ?pending.to, "scene transition");
        self.current = pending.to;
        let start = self.schedule_auto(timer_ids);
        Some(ClockStep { cancel: None, start })
    }

    /// Move to `to` after `delay`, replacing any pending transition.
    pub fn go_to_after(&mut self, to: S, delay: Duration, timer_ids: &mut TimerIds) -> ClockStep {
        let cancel = self.cancel();
        let timer = timer_ids.next_id();
        self.pending = Some(PendingTransition { timer, to });
        ClockStep {
            cancel,
            start: Some((timer, delay)),
        }
    }

    /// Teardown. Returns the timer the caller must cancel, if any.
    pub fn cancel(&mut self) -> Option<TimerId> {
        self.pending.take().map(|p| p.timer)
    }

    fn schedule_auto(&mut self, timer_ids: &mut TimerIds) -> Option<(TimerId, Duration)> {
        let (to, delay) = self.current.auto_advance()?;
        let timer = timer_ids.next_id();
        self.pending = Some(PendingTransition { timer, to });
        Some((timer, delay))
    }
}
