//! Common result and error types for the mapping engine.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates an internal consistency failure (a bug in topology or
/// routing construction), never a user input problem. Input problems are
/// reported with dedicated error variants before any search starts.
pub type MapResult<T> = Result<T, InternalError>;

/// An internal consistency failure, e.g. a routing direction with no link.
///
/// These errors should never occur during normal operation. If one does occur,
/// the topology or the routing tables were built incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal consistency failure: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
