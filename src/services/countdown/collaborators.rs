//! Seams between the controller and the outside world: the clock, the view
//! that draws the countdown, and the date/time input it echoes into.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::models::countdown::{DisplayFields, InputBounds, StatusLine};

pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock in the local frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Local>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

/// Rendering side. The controller only pushes text and triggers; visual
/// parameters and the clearing of transient effects belong to the view.
pub trait CountdownView {
    fn show_fields(&mut self, fields: &DisplayFields);
    fn show_status(&mut self, status: &StatusLine);
    /// Entrance animation for the time blocks when a countdown starts.
    fn animate_entrance(&mut self);
    /// Short "changed" pulse on the seconds block, cleared after `hold`.
    fn pulse_seconds(&mut self, hold: Duration);
    /// Completion celebration, cleared after `hold`. `reached` is the
    /// target as shown on the status line.
    fn celebrate(&mut self, reached: &str, hold: Duration);
}

/// The date/time picker the user types the target into.
pub trait InputField {
    fn configure(&mut self, bounds: &InputBounds);
    fn set_value(&mut self, value: &str);
    fn clear(&mut self);
}

/// Everything a [`RecordingView`] has been asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Fields(DisplayFields),
    Status(String),
    Entrance,
    Pulse(Duration),
    Celebrate { reached: String, hold: Duration },
    Configure(InputBounds),
    SetValue(String),
    ClearInput,
}

/// View and input double that records calls. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    calls: Rc<RefCell<Vec<ViewCall>>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn field_updates(&self) -> Vec<DisplayFields> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                ViewCall::Fields(fields) => Some(fields.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_fields(&self) -> Option<DisplayFields> {
        self.field_updates().pop()
    }

    pub fn last_status(&self) -> Option<String> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            ViewCall::Status(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn count(&self, predicate: impl Fn(&ViewCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    fn push(&self, call: ViewCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl CountdownView for RecordingView {
    fn show_fields(&mut self, fields: &DisplayFields) {
        self.push(ViewCall::Fields(fields.clone()));
    }

    fn show_status(&mut self, status: &StatusLine) {
        self.push(ViewCall::Status(status.to_string()));
    }

    fn animate_entrance(&mut self) {
        self.push(ViewCall::Entrance);
    }

    fn pulse_seconds(&mut self, hold: Duration) {
        self.push(ViewCall::Pulse(hold));
    }

    fn celebrate(&mut self, reached: &str, hold: Duration) {
        self.push(ViewCall::Celebrate {
            reached: reached.to_string(),
            hold,
        });
    }
}

impl InputField for RecordingView {
    fn configure(&mut self, bounds: &InputBounds) {
        self.push(ViewCall::Configure(bounds.clone()));
    }

    fn set_value(&mut self, value: &str) {
        self.push(ViewCall::SetValue(value.to_string()));
    }

    fn clear(&mut self) {
        self.push(ViewCall::ClearInput);
    }
}
