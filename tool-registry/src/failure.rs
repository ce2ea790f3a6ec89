//! Failures raised by tool implementations.

use std::any::Any;

use thiserror::Error;

/// Outcome of a single tool invocation: display text or a failure.
pub type ToolOutcome = Result<String, ToolFailure>;

/// Failure raised while a tool runs.
///
/// Every variant except [`ToolFailure::Interrupted`] is absorbed by the
/// [`ExceptionBoundary`](crate::boundary::ExceptionBoundary) and turned into
/// display text for the caller.
#[derive(Debug, Error)]
pub enum ToolFailure {
    /// Message that is already fit to show to the calling agent.
    #[error("{0}")]
    UserFacing(String),

    /// Arguments were missing or did not match the tool's parameters.
    #[error("invalid arguments: {reason}")]
    InvalidArguments {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A remote service call failed.
    #[error("{service} request failed: {message}")]
    Upstream {
        /// Service that produced the fault, e.g. `sheets`.
        service: String,
        /// Message reported by the service or transport.
        message: String,
    },

    /// The tool panicked while running.
    #[error("{message}")]
    Panicked {
        /// Panic payload rendered as text.
        message: String,
        /// `file:line:column` of the panic, when it was recorded.
        location: Option<String>,
    },

    /// Operator-initiated shutdown. Never absorbed by the boundary.
    #[error("tool invocation interrupted by shutdown")]
    Interrupted,

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ToolFailure {
    /// Creates a failure whose message is shown to the caller verbatim.
    #[must_use]
    pub fn user_facing(message: impl Into<String>) -> Self {
        Self::UserFacing(message.into())
    }

    /// Creates an argument validation failure.
    #[must_use]
    pub fn invalid_arguments(reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            reason: reason.into(),
        }
    }

    /// Creates a remote service failure.
    #[must_use]
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates an untyped failure from a displayable message.
    #[must_use]
    pub fn msg<M>(message: M) -> Self
    where
        M: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        Self::Other(anyhow::Error::msg(message))
    }

    /// Converts a panic payload captured by `catch_unwind`.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>, location: Option<String>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "tool panicked".to_owned()
        };
        Self::Panicked { message, location }
    }

    /// Stable name of the failure category, used in logs and messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserFacing(_) => "UserFacing",
            Self::InvalidArguments { .. } => "InvalidArguments",
            Self::Upstream { .. } => "UpstreamError",
            Self::Panicked { .. } => "Panic",
            Self::Interrupted => "Interrupted",
            Self::Other(_) => "Error",
        }
    }

    /// Returns `true` for the shutdown signal.
    #[must_use]
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Self::Interrupted)
    }

    /// Returns `true` when the failure was explicitly marked as user-facing.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::UserFacing(_))
    }
}

impl From<serde_json::Error> for ToolFailure {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_arguments(err.to_string())
    }
}
