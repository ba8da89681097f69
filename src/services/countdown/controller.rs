use std::time::Duration;

use chrono::{DateTime, Local};

use super::collaborators::{Clock, CountdownView, InputField};
use super::decompose::decompose;
use super::error::CountdownError;
use super::input::parse_target_input;
use super::persistence::{KeyValueStore, TargetSlot};
use super::scheduler::TickScheduler;
use crate::models::countdown::{
    CountdownPhase, Decomposition, DisplayFields, InputBounds, StatusLine, TickState, TimeFormat,
    TimerHandle,
};
use crate::utils::date::{format_for_input, localized_timestamp, tomorrow_midnight};

/// Timings and presentation knobs for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub tick_interval: Duration,
    pub highlight_hold: Duration,
    pub celebration_hold: Duration,
    pub time_format: TimeFormat,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            highlight_hold: Duration::from_millis(500),
            celebration_hold: Duration::from_secs(8),
            time_format: TimeFormat::default(),
        }
    }
}

/// External pieces the controller drives.
pub struct Collaborators {
    pub clock: Box<dyn Clock>,
    pub store: Box<dyn KeyValueStore>,
    pub scheduler: Box<dyn TickScheduler>,
    pub view: Box<dyn CountdownView>,
    pub input: Box<dyn InputField>,
}

/// Owns the single countdown: its target, its phase and the one repeating
/// tick schedule that drives it.
///
/// All methods run to completion on one thread. Any previous schedule is
/// released before a new one is acquired, so at most one tick stream is ever
/// active.
pub struct CountdownController {
    clock: Box<dyn Clock>,
    slot: TargetSlot,
    scheduler: Box<dyn TickScheduler>,
    view: Box<dyn CountdownView>,
    input: Box<dyn InputField>,
    options: ControllerOptions,
    target: Option<DateTime<Local>>,
    phase: CountdownPhase,
    timer: Option<TimerHandle>,
    last_tick: TickState,
}

impl CountdownController {
    pub fn new(collaborators: Collaborators, options: ControllerOptions) -> Self {
        let Collaborators {
            clock,
            store,
            scheduler,
            view,
            input,
        } = collaborators;

        Self {
            clock,
            slot: TargetSlot::new(store),
            scheduler,
            view,
            input,
            options,
            target: None,
            phase: CountdownPhase::Idle,
            timer: None,
            last_tick: TickState::Idle,
        }
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn target(&self) -> Option<DateTime<Local>> {
        self.target
    }

    pub fn last_tick(&self) -> TickState {
        self.last_tick
    }

    pub fn active_timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Status line matching the current phase.
    pub fn status(&self) -> StatusLine {
        match (self.phase, self.target) {
            (CountdownPhase::Running, Some(target)) => StatusLine::CountingDown {
                target,
                format: self.options.time_format,
            },
            (CountdownPhase::Finished, _) => StatusLine::Finished,
            _ => StatusLine::Prompt,
        }
    }

    /// Prepares the input and restores a saved target, if any.
    ///
    /// A restored target is not checked against the clock; if it already
    /// passed, the first tick finishes the countdown.
    pub fn initialize(&mut self) {
        let now = self.clock.now();
        self.input.configure(&InputBounds {
            min: format_for_input(now),
            default_value: format_for_input(tomorrow_midnight(now)),
        });

        let saved = match self.slot.load() {
            Ok(saved) => saved,
            Err(err) => {
                log::warn!("Failed to load saved countdown target: {:#}", err);
                None
            }
        };

        match saved {
            Some(target) => {
                log::info!("Restoring saved countdown target {}", target);
                self.target = Some(target);
                self.input.set_value(&format_for_input(target));
                self.start_countdown();
            }
            None => self.show_idle(),
        }
    }

    /// Validates `raw` and, if it names a future instant, starts counting
    /// down to it. On error only the status line changes.
    pub fn set_target(&mut self, raw: &str) -> Result<(), CountdownError> {
        let target = match parse_target_input(raw) {
            Ok(target) => target,
            Err(err) => return self.reject(raw, err),
        };

        if target <= self.clock.now() {
            return self.reject(raw, CountdownError::NotFuture);
        }

        self.target = Some(target);
        if let Err(err) = self.slot.save(target) {
            log::warn!("Failed to persist countdown target: {:#}", err);
        }
        log::info!("Counting down to {}", target);
        self.start_countdown();
        Ok(())
    }

    /// Entry point for scheduled ticks. Returns `None` for a handle that is
    /// no longer the active one, e.g. a tick queued before a cancel.
    pub fn on_tick(&mut self, handle: TimerHandle) -> Option<TickState> {
        if self.timer != Some(handle) {
            log::debug!("Ignoring tick from stale schedule {:?}", handle);
            return None;
        }
        Some(self.tick())
    }

    /// Recomputes the remaining time and pushes it to the view.
    pub fn tick(&mut self) -> TickState {
        let state = match (self.phase, self.target) {
            (CountdownPhase::Finished, _) => TickState::Finished,
            (_, None) => TickState::Idle,
            (_, Some(target)) => match decompose(&target, &self.clock.now()) {
                Decomposition::Elapsed => self.finish(target),
                Decomposition::Remaining(breakdown) => {
                    self.view.show_fields(&breakdown.display_fields());
                    self.view.pulse_seconds(self.options.highlight_hold);
                    TickState::Running(breakdown)
                }
            },
        };

        self.last_tick = state;
        state
    }

    /// Stops the countdown and forgets the target, in memory and on disk.
    pub fn reset(&mut self) {
        self.release_timer();
        self.target = None;
        if let Err(err) = self.slot.delete() {
            log::warn!("Failed to delete saved countdown target: {:#}", err);
        }
        self.show_idle();
        self.input.clear();
        log::info!("Countdown reset");
    }

    fn start_countdown(&mut self) {
        self.release_timer();
        self.phase = CountdownPhase::Running;
        let status = self.status();
        self.view.show_status(&status);
        self.view.animate_entrance();

        self.tick();

        if self.phase == CountdownPhase::Running {
            self.timer = Some(self.scheduler.schedule(self.options.tick_interval));
        }
    }

    fn finish(&mut self, target: DateTime<Local>) -> TickState {
        self.release_timer();
        self.phase = CountdownPhase::Finished;
        self.view.show_fields(&DisplayFields::zeroed());
        self.view.show_status(&StatusLine::Finished);
        let reached = localized_timestamp(target, self.options.time_format);
        self.view.celebrate(&reached, self.options.celebration_hold);
        log::info!("Countdown finished");
        TickState::Finished
    }

    fn show_idle(&mut self) {
        self.phase = CountdownPhase::Idle;
        self.last_tick = TickState::Idle;
        self.view.show_fields(&DisplayFields::zeroed());
        self.view.show_status(&StatusLine::Prompt);
    }

    fn reject(&mut self, raw: &str, err: CountdownError) -> Result<(), CountdownError> {
        log::debug!("Rejected countdown input {:?}: {}", raw, err);
        self.view.show_status(&StatusLine::Error(err.to_string()));
        Err(err)
    }

    fn release_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            self.scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::countdown::collaborators::{ManualClock, RecordingView, ViewCall};
    use crate::services::countdown::persistence::{MemoryStore, MockKeyValueStore, TARGET_DATE_KEY};
    use crate::services::countdown::scheduler::ManualScheduler;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use mockall::predicate::eq;

    struct Harness {
        controller: CountdownController,
        clock: ManualClock,
        scheduler: ManualScheduler,
        view: RecordingView,
    }

    fn start_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2030, 5, 17, 10, 0, 0).unwrap()
    }

    fn harness_with_store(store: Box<dyn KeyValueStore>) -> Harness {
        let clock = ManualClock::new(start_time());
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
        Harness {
            controller,
            clock,
            scheduler,
            view,
        }
    }

    fn harness() -> Harness {
        harness_with_store(Box::new(MemoryStore::new()))
    }

    fn input_value(offset: ChronoDuration) -> String {
        (start_time() + offset).to_rfc3339()
    }

    #[test]
    fn initialize_without_saved_target_shows_prompt() {
        let mut h = harness();
        h.controller.initialize();

        assert_eq!(h.controller.phase(), CountdownPhase::Idle);
        assert_eq!(h.scheduler.active_count(), 0);
        assert_eq!(h.view.last_fields(), Some(DisplayFields::zeroed()));
        assert_eq!(
            h.view.last_status().as_deref(),
            Some("Set a date to start counting down")
        );
        assert!(h.view.calls().contains(&ViewCall::Configure(InputBounds {
            min: "2030-05-17T10:00".into(),
            default_value: "2030-05-18T00:00".into(),
        })));
    }

    #[test]
    fn set_target_ticks_immediately_then_schedules_once() {
        let mut h = harness();
        h.controller
            .set_target(&input_value(ChronoDuration::seconds(90_061)))
            .unwrap();

        assert_eq!(h.controller.phase(), CountdownPhase::Running);
        assert_eq!(h.scheduler.active_count(), 1);
        let handle = h.scheduler.active_handles()[0];
        assert_eq!(h.scheduler.interval_of(handle), Some(Duration::from_secs(1)));

        let fields = h.view.last_fields().unwrap();
        assert_eq!(
            (fields.days.as_str(), fields.hours.as_str(), fields.minutes.as_str(), fields.seconds.as_str()),
            ("01", "01", "01", "01")
        );
        assert_eq!(h.view.count(|c| *c == ViewCall::Entrance), 1);
        assert_eq!(
            h.view.count(|c| *c == ViewCall::Pulse(Duration::from_millis(500))),
            1
        );
        assert!(h
            .view
            .last_status()
            .unwrap()
            .starts_with("Counting down to: 5/18/2030"));
    }

    #[test]
    fn empty_input_is_rejected_without_writes() {
        let mut store = MockKeyValueStore::new();
        store.expect_set().times(0);
        store.expect_remove().times(0);
        let mut h = harness_with_store(Box::new(store));

        assert_eq!(h.controller.set_target(""), Err(CountdownError::InvalidInput));
        assert_eq!(h.controller.phase(), CountdownPhase::Idle);
        assert_eq!(h.controller.target(), None);
        assert_eq!(h.scheduler.scheduled_count(), 0);
        assert_eq!(
            h.view.last_status().as_deref(),
            Some("Please select a valid date and time")
        );
    }

    #[test]
    fn past_or_present_input_is_not_future() {
        let mut h = harness();
        assert_eq!(
            h.controller.set_target(&input_value(ChronoDuration::zero())),
            Err(CountdownError::NotFuture)
        );
        assert_eq!(
            h.controller.set_target(&input_value(ChronoDuration::seconds(-5))),
            Err(CountdownError::NotFuture)
        );
        assert_eq!(h.controller.phase(), CountdownPhase::Idle);
        assert_eq!(
            h.view.last_status().as_deref(),
            Some("Please select a future date and time")
        );
    }

    #[test]
    fn rejected_input_keeps_running_countdown() {
        let mut h = harness();
        h.controller
            .set_target(&input_value(ChronoDuration::hours(2)))
            .unwrap();
        let target = h.controller.target();
        let handle = h.controller.active_timer();

        assert!(h.controller.set_target("garbage").is_err());

        assert_eq!(h.controller.phase(), CountdownPhase::Running);
        assert_eq!(h.controller.target(), target);
        assert_eq!(h.controller.active_timer(), handle);
        assert_eq!(h.scheduler.active_count(), 1);
    }

    #[test]
    fn successful_set_persists_under_target_key() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .with(eq(TARGET_DATE_KEY), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Ok(()));
        let mut h = harness_with_store(Box::new(store));

        h.controller
            .set_target(&input_value(ChronoDuration::minutes(5)))
            .unwrap();
    }

    #[test]
    fn persistence_failure_does_not_stop_the_countdown() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .returning(|_, _| Err(anyhow::anyhow!("disk full")));
        let mut h = harness_with_store(Box::new(store));

        assert!(h
            .controller
            .set_target(&input_value(ChronoDuration::minutes(5)))
            .is_ok());
        assert_eq!(h.controller.phase(), CountdownPhase::Running);
    }

    #[test]
    fn reaching_target_finishes_and_releases_timer() {
        let mut h = harness();
        h.controller
            .set_target(&input_value(ChronoDuration::seconds(2)))
            .unwrap();
        let handle = h.scheduler.active_handles()[0];

        h.clock.advance(ChronoDuration::seconds(1));
        assert!(matches!(h.controller.on_tick(handle), Some(TickState::Running(_))));

        h.clock.advance(ChronoDuration::seconds(1));
        assert_eq!(h.controller.on_tick(handle), Some(TickState::Finished));

        assert_eq!(h.controller.phase(), CountdownPhase::Finished);
        assert_eq!(h.scheduler.active_count(), 0);
        assert_eq!(h.controller.active_timer(), None);
        assert_eq!(h.view.last_fields(), Some(DisplayFields::zeroed()));
        assert_eq!(h.view.last_status().as_deref(), Some("Countdown finished!"));
        assert_eq!(
            h.view.count(|c| matches!(
                c,
                ViewCall::Celebrate { hold, .. } if *hold == Duration::from_secs(8)
            )),
            1
        );
        // The target survives completion until reset.
        assert!(h.controller.target().is_some());
    }

    #[test]
    fn celebration_names_a_typed_target() {
        let mut h = harness();
        h.controller
            .set_target("2030-05-17T10:00:02")
            .unwrap();
        h.clock.advance(ChronoDuration::seconds(2));
        h.controller.tick();

        assert!(h.view.calls().contains(&ViewCall::Celebrate {
            reached: "5/17/2030, 10:00:02 AM".to_string(),
            hold: Duration::from_secs(8),
        }));
    }

    #[test]
    fn ticks_after_finishing_do_nothing() {
        let mut h = harness();
        h.controller
            .set_target(&input_value(ChronoDuration::seconds(1)))
            .unwrap();
        h.clock.advance(ChronoDuration::seconds(1));
        h.controller.tick();
        h.view.clear_calls();

        assert_eq!(h.controller.tick(), TickState::Finished);
        assert!(h.view.calls().is_empty());
    }

    #[test]
    fn stale_handle_is_ignored() {
        let mut h = harness();
        h.controller
            .set_target(&input_value(ChronoDuration::hours(1)))
            .unwrap();
        let first = h.scheduler.active_handles()[0];
        h.controller
            .set_target(&input_value(ChronoDuration::hours(2)))
            .unwrap();

        h.view.clear_calls();
        assert_eq!(h.controller.on_tick(first), None);
        assert!(h.view.calls().is_empty());
    }

    #[test]
    fn reset_when_idle_only_deletes() {
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_set().times(0);
        store
            .expect_remove()
            .with(eq(TARGET_DATE_KEY))
            .times(1)
            .returning(|_| Ok(()));
        let mut h = harness_with_store(Box::new(store));
        h.controller.initialize();

        h.controller.reset();

        assert_eq!(h.controller.phase(), CountdownPhase::Idle);
        assert_eq!(h.controller.last_tick(), TickState::Idle);
        assert_eq!(h.scheduler.scheduled_count(), 0);
    }

    #[test]
    fn reset_while_running_clears_everything() {
        let store = MemoryStore::new();
        let mut h = harness_with_store(Box::new(store.clone()));
        h.controller
            .set_target(&input_value(ChronoDuration::days(3)))
            .unwrap();

        h.controller.reset();

        assert_eq!(h.controller.phase(), CountdownPhase::Idle);
        assert_eq!(h.controller.target(), None);
        assert_eq!(h.scheduler.active_count(), 0);
        assert_eq!(store.get(TARGET_DATE_KEY).unwrap(), None);
        assert_eq!(h.view.last_fields(), Some(DisplayFields::zeroed()));
        assert_eq!(
            h.view.last_status().as_deref(),
            Some("Set a date to start counting down")
        );
        assert_eq!(h.view.calls().last(), Some(&ViewCall::ClearInput));
    }

    #[test]
    fn restored_past_target_finishes_without_scheduling() {
        let mut store = MemoryStore::new();
        let past = start_time() - ChronoDuration::seconds(5);
        store.set(TARGET_DATE_KEY, &past.to_rfc3339()).unwrap();
        let mut h = harness_with_store(Box::new(store));

        h.controller.initialize();

        assert_eq!(h.controller.phase(), CountdownPhase::Finished);
        assert_eq!(h.scheduler.scheduled_count(), 0);
        assert_eq!(h.view.last_status().as_deref(), Some("Countdown finished!"));
        assert!(h
            .view
            .calls()
            .contains(&ViewCall::SetValue("2030-05-17T09:59".into())));
    }

    #[test]
    fn load_failure_falls_back_to_idle() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Err(anyhow::anyhow!("unreadable")));
        let mut h = harness_with_store(Box::new(store));

        h.controller.initialize();

        assert_eq!(h.controller.phase(), CountdownPhase::Idle);
        assert_eq!(h.controller.target(), None);
    }
}
