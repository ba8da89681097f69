// Terminal front end: renders the countdown and feeds stdin commands and
// scheduled ticks into the controller.

mod app;
#[cfg(test)]
mod test_support;
mod view;

pub use app::{dispatch, drive, open_store, parse_command, run, start, RunOptions};
pub use view::TerminalView;
