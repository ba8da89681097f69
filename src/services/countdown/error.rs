use thiserror::Error;

/// Validation failures from `set_target`. Both are recoverable and leave
/// the countdown untouched; the message is shown on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CountdownError {
    #[error("Please select a valid date and time")]
    InvalidInput,

    #[error("Please select a future date and time")]
    NotFuture,
}
