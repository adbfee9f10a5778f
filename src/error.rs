// src/error.rs
//
// Errors raised by misuse of the harness itself.
// Failures of the handler under test travel as eyre::Report instead.

/// Error type for harness operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// `end` was called on a harness that already dispatched.
    AlreadyDispatched,
    /// The harness was constructed without a handler to test.
    MissingHandler,
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessError::AlreadyDispatched => {
                write!(f, "Harness already dispatched; create a new one for each invocation")
            }
            HarnessError::MissingHandler => write!(f, "No handler was supplied to test"),
        }
    }
}

impl std::error::Error for HarnessError {}
