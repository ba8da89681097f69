//! Repeating tick sources.
//!
//! The controller never sleeps or spawns on its own; it asks a
//! [`TickScheduler`] for a handle and gets ticks delivered back through its
//! event loop. [`ManualScheduler`] lets tests fire ticks by hand,
//! [`TokioScheduler`] drives the real countdown.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::models::countdown::TimerHandle;

/// Events processed one at a time by the countdown event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownEvent {
    Set(String),
    Reset,
    Status,
    Tick(TimerHandle),
    Quit,
}

pub trait TickScheduler {
    /// Starts a repeating schedule that fires every `every`.
    fn schedule(&mut self, every: Duration) -> TimerHandle;

    /// Stops a schedule. Unknown or already cancelled handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    active: BTreeMap<TimerHandle, Duration>,
    scheduled: usize,
    cancelled: usize,
}

/// Deterministic scheduler for tests and simulations. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles that are currently scheduled, oldest first.
    pub fn active_handles(&self) -> Vec<TimerHandle> {
        self.state.borrow().active.keys().copied().collect()
    }

    pub fn active_count(&self) -> usize {
        self.state.borrow().active.len()
    }

    pub fn interval_of(&self, handle: TimerHandle) -> Option<Duration> {
        self.state.borrow().active.get(&handle).copied()
    }

    /// Total schedules ever created.
    pub fn scheduled_count(&self) -> usize {
        self.state.borrow().scheduled
    }

    /// Total schedules cancelled while active.
    pub fn cancelled_count(&self) -> usize {
        self.state.borrow().cancelled
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, every: Duration) -> TimerHandle {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let handle = TimerHandle(state.next_id);
        state.active.insert(handle, every);
        state.scheduled += 1;
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        let mut state = self.state.borrow_mut();
        if state.active.remove(&handle).is_some() {
            state.cancelled += 1;
        }
    }
}

/// Runs each schedule as a tokio interval task that posts
/// [`CountdownEvent::Tick`] into the event loop's channel.
///
/// Must be used from inside a tokio runtime.
pub struct TokioScheduler {
    events: UnboundedSender<CountdownEvent>,
    next_id: u64,
    tasks: HashMap<TimerHandle, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(events: UnboundedSender<CountdownEvent>) -> Self {
        Self {
            events,
            next_id: 0,
            tasks: HashMap::new(),
        }
    }
}

impl TickScheduler for TokioScheduler {
    fn schedule(&mut self, every: Duration) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let mut interval = time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the controller already
            // ran its synchronous tick.
            interval.tick().await;
            loop {
                interval.tick().await;
                if events.send(CountdownEvent::Tick(handle)).is_err() {
                    break;
                }
            }
        });

        log::debug!("Scheduled tick {:?} every {:?}", handle, every);
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            log::debug!("Cancelled tick {:?}", handle);
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
