//! Handler error types.

use thiserror::Error;

/// Error a handler returns when it cannot process an event.
///
/// The bus logs these and never surfaces them to the publisher.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A failure described by a message.
    #[error("{0}")]
    Message(String),

    /// A failure raised by a collaborator of the handler.
    #[error("{0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Creates a handler error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        HandlerError::Message(message.into())
    }

    /// Wraps any error raised while handling an event.
    pub fn from_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        HandlerError::Source(Box::new(error))
    }
}

/// How a handler invocation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The handler returned an error.
    Error(String),

    /// The handler panicked.
    Panic(String),
}

/// A caught handler failure, collected by the bus during a publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    /// Name of the handler that failed.
    pub handler: String,

    /// What went wrong.
    pub kind: FailureKind,
}

impl std::fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FailureKind::Error(reason) => write!(f, "handler '{}' failed: {reason}", self.handler),
            FailureKind::Panic(reason) => {
                write!(f, "handler '{}' panicked: {reason}", self.handler)
            }
        }
    }
}
