// Test fixtures - reusable test data
// Builds a controller wired to deterministic collaborators

#![allow(dead_code)]

use chrono::{DateTime, Duration, Local, TimeZone};
use rust_countdown::services::countdown::{
    Collaborators, ControllerOptions, CountdownController, KeyValueStore, ManualClock,
    ManualScheduler, MemoryStore, RecordingView,
};

/// Sample instants for testing
pub mod dates {
    use super::*;

    /// Returns May 17, 2030 at 10:00 local time
    pub fn base() -> DateTime<Local> {
        Local.with_ymd_and_hms(2030, 5, 17, 10, 0, 0).unwrap()
    }

    /// `base()` shifted by `seconds`, as RFC 3339 text for `set_target`
    pub fn offset_input(seconds: i64) -> String {
        (base() + Duration::seconds(seconds)).to_rfc3339()
    }
}

/// A controller plus handles onto everything it talks to.
pub struct Rig {
    pub controller: CountdownController,
    pub clock: ManualClock,
    pub scheduler: ManualScheduler,
    pub view: RecordingView,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    pub fn with_store(store: Box<dyn KeyValueStore>) -> Self {
        Self::at(dates::base(), store)
    }

    pub fn at(now: DateTime<Local>, store: Box<dyn KeyValueStore>) -> Self {
        let clock = ManualClock::new(now);
        let scheduler = ManualScheduler::new();
        let view = RecordingView::new();
        let controller = CountdownController::new(
            Collaborators {
                clock: Box::new(clock.clone()),
                store,
                scheduler: Box::new(scheduler.clone()),
                view: Box::new(view.clone()),
                input: Box::new(view.clone()),
            },
            ControllerOptions::default(),
        );
        Self {
            controller,
            clock,
            scheduler,
            view,
        }
    }

    /// Advances one second and fires every active schedule once.
    /// Returns how many ticks the controller accepted.
    pub fn advance_one_second(&mut self) -> usize {
        self.clock.advance(Duration::seconds(1));
        self.scheduler
            .active_handles()
            .into_iter()
            .filter_map(|handle| self.controller.on_tick(handle))
            .count()
    }
}
