use crate::types::ActionResult;
use thiserror::Error;

/// Failures raised by a capability provider while touching the desktop.
#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Platform-specific error: {0}")]
    PlatformError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Registration and dispatch failures.
///
/// These indicate misconfiguration or a caller/implementation bug and are
/// propagated. Expected runtime failures (bad element index, a launch that
/// did not work) are reported through [`ActionResult::error`] instead.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Action '{0}' is already registered")]
    DuplicateAction(String),

    #[error("Action '{0}' is excluded from this registry")]
    ExcludedAction(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid parameters for action '{action}': {reason}")]
    InvalidParameters { action: String, reason: String },

    #[error("Action '{0}' requires a UI element context but none was supplied")]
    MissingContext(String),

    #[error("Invalid result type returned by action '{action}': {found}")]
    InvalidResultType { action: String, found: String },

    #[error(transparent)]
    Automation(#[from] AutomationError),

    #[error("Sequence aborted at step {step} after {} completed action(s): {source}", .completed.len())]
    SequenceAborted {
        step: usize,
        completed: Vec<ActionResult>,
        #[source]
        source: Box<ActionError>,
    },
}
