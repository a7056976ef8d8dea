use std::fmt;
use std::time::Duration;

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

/// Identifier of a single timer requested from the shell.
///
/// Ids are allocated by the core, never by the shell, so a cancel always names
/// exactly the timer it was meant for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Monotonic allocator for [`TimerId`]s. Lives in the model for the whole session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimerIds {
    next: u64,
}

impl TimerIds {
    pub fn next_id(&mut self) -> TimerId {
        self.next += 1;
        TimerId(self.next)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOperation {
    Start { id: TimerId, millis: u64 },
    Cancel { id: TimerId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOutput {
    Fired { id: TimerId },
    Cancelled { id: TimerId },
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

pub struct Timer<Ev> {
    context: CapabilityContext<TimerOperation, Ev>,
}

impl<Ev> Capability<Ev> for Timer<Ev> {
    type Operation = TimerOperation;
    type MappedSelf<MappedEv> = Timer<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Timer::new(self.context.map_event(f))
    }
}

impl<Ev> Timer<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<TimerOperation, Ev>) -> Self {
        Self { context }
    }

    /// Ask the shell to fire `id` after `delay`. The callback only runs for
    /// `Fired`; a cancelled timer produces no event.
    pub fn start<F>(&self, id: TimerId, delay: Duration, make_event: F)
    where
        F: FnOnce(TimerId) -> Ev + Send + 'static,
    {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let context = self.context.clone();
        self.context.spawn(async move {
            let output = context
                .request_from_shell(TimerOperation::Start { id, millis })
                .await;
            if let TimerOutput::Fired { id } = output {
                context.update_app(make_event(id));
            }
        });
    }

    pub fn cancel(&self, id: TimerId) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(TimerOperation::Cancel { id }).await;
        });
    }
}
