use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};

use crate::models::countdown::{DisplayFields, InputBounds, StatusLine};
use crate::services::countdown::{CountdownView, InputField};
use crate::services::notification::NotificationService;

struct ViewState {
    out: Box<dyn Write>,
    fields: DisplayFields,
    input_value: Option<String>,
    highlight_until: Option<Instant>,
    celebrate_until: Option<Instant>,
    notifications: NotificationService,
}

/// Draws the countdown on a terminal line and echoes the input value.
///
/// Clones share one output, so the event loop can keep a handle to expire
/// transient effects while the controller owns another.
#[derive(Clone)]
pub struct TerminalView {
    state: Rc<RefCell<ViewState>>,
}

impl TerminalView {
    pub fn new(out: Box<dyn Write>, notifications: NotificationService) -> Self {
        Self {
            state: Rc::new(RefCell::new(ViewState {
                out,
                fields: DisplayFields::zeroed(),
                input_value: None,
                highlight_until: None,
                celebrate_until: None,
                notifications,
            })),
        }
    }

    pub fn stdout(notifications: NotificationService) -> Self {
        Self::new(Box::new(io::stdout()), notifications)
    }

    /// Current input echo, if any.
    pub fn input_value(&self) -> Option<String> {
        self.state.borrow().input_value.clone()
    }

    pub fn is_highlighted(&self, now: Instant) -> bool {
        matches!(self.state.borrow().highlight_until, Some(until) if until > now)
    }

    pub fn is_celebrating(&self, now: Instant) -> bool {
        matches!(self.state.borrow().celebrate_until, Some(until) if until > now)
    }

    /// Earliest instant at which a transient effect should be cleared.
    pub fn next_expiry(&self) -> Option<Instant> {
        let state = self.state.borrow();
        match (state.highlight_until, state.celebrate_until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Clears every effect whose hold has run out by `now`.
    pub fn expire(&mut self, now: Instant) {
        let mut state = self.state.borrow_mut();
        if matches!(state.highlight_until, Some(until) if until <= now) {
            state.highlight_until = None;
            let line = render_fields(&state.fields, false);
            redraw(&mut state.out, &line);
        }
        if matches!(state.celebrate_until, Some(until) if until <= now) {
            state.celebrate_until = None;
            log::debug!("Celebration finished");
        }
    }
}

fn render_fields(fields: &DisplayFields, highlight_seconds: bool) -> String {
    let seconds = if highlight_seconds {
        fields.seconds.as_str().cyan().bold().to_string()
    } else {
        fields.seconds.clone()
    };
    format!(
        "{}y {}mo {}d {}h {}m {}s",
        fields.years, fields.months, fields.days, fields.hours, fields.minutes, seconds
    )
}

/// Replaces the current terminal line with `text`.
fn redraw(out: &mut Box<dyn Write>, text: &str) {
    let result = queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(text))
        .and_then(|_| out.flush());
    report(result);
}

/// Writes `text` after whatever is already on the line.
fn append(out: &mut Box<dyn Write>, text: &str) {
    let result = queue!(out, Print(text)).and_then(|_| out.flush());
    report(result);
}

fn report(result: io::Result<()>) {
    if let Err(err) = result {
        log::warn!("Failed to write to terminal: {}", err);
    }
}

impl CountdownView for TerminalView {
    fn show_fields(&mut self, fields: &DisplayFields) {
        let now = Instant::now();
        let highlighted = self.is_highlighted(now);
        let mut state = self.state.borrow_mut();
        state.fields = fields.clone();
        let line = render_fields(fields, highlighted);
        redraw(&mut state.out, &line);
    }

    fn show_status(&mut self, status: &StatusLine) {
        let mut state = self.state.borrow_mut();
        redraw(&mut state.out, &format!("{}\n", status));
    }

    fn animate_entrance(&mut self) {
        let mut state = self.state.borrow_mut();
        redraw(&mut state.out, "years months days hours minutes seconds\n");
    }

    fn pulse_seconds(&mut self, hold: Duration) {
        let mut state = self.state.borrow_mut();
        state.highlight_until = Some(Instant::now() + hold);
        let line = render_fields(&state.fields, true);
        redraw(&mut state.out, &line);
    }

    fn celebrate(&mut self, reached: &str, hold: Duration) {
        let mut state = self.state.borrow_mut();
        state.highlight_until = None;
        state.celebrate_until = Some(Instant::now() + hold);
        let banner = "*** Countdown finished! ***".cyan().bold();
        append(&mut state.out, &format!("\n{}\n", banner));

        if let Err(err) = state
            .notifications
            .show_countdown_finished(&format!("Reached {}", reached))
        {
            log::warn!("{:#}", err);
        }
    }
}

impl InputField for TerminalView {
    fn configure(&mut self, bounds: &InputBounds) {
        let mut state = self.state.borrow_mut();
        redraw(
            &mut state.out,
            &format!(
                "Enter `set <date time>` (earliest {}, e.g. {}), `reset`, `status` or `quit`\n",
                bounds.min, bounds.default_value
            ),
        );
    }

    fn set_value(&mut self, value: &str) {
        let mut state = self.state.borrow_mut();
        state.input_value = Some(value.to_string());
        redraw(&mut state.out, &format!("> {}\n", value));
    }

    fn clear(&mut self) {
        self.state.borrow_mut().input_value = None;
    }
}
