//! Framework Error Types

use crate::framework::bundle::BundleState;

/// Error returned by an activator's start or stop hook
pub type ActivatorError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for framework operations
pub type FrameworkResult<T> = std::result::Result<T, FrameworkError>;

#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    /// Lifecycle operation requested in the wrong state
    #[error("Bundle '{bundle}' not in a resolved state (state: {state})")]
    IllegalState { bundle: String, state: BundleState },

    #[error("Bundle '{bundle}' not found")]
    BundleNotFound { bundle: String },

    #[error("Invalid filter syntax '{filter}': {reason}")]
    InvalidSyntax { filter: String, reason: String },

    #[error("Service '{interface_name}' has been unregistered")]
    ServiceUnregistered { interface_name: String },

    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    #[error("Cannot start bundle '{bundle}'")]
    StartFailed {
        bundle: String,
        #[source]
        source: ActivatorError,
    },

    #[error("Cannot stop bundle '{bundle}'")]
    StopFailed {
        bundle: String,
        #[source]
        source: ActivatorError,
    },

    /// The registry or bundle behind a context has been dropped
    #[error("Bundle context for '{bundle}' is no longer valid")]
    ContextInvalid { bundle: String },

    #[error("{message}")]
    Synchronisation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl FrameworkError {
    /// Name of the bundle the error refers to, if any
    pub fn bundle_name(&self) -> Option<&str> {
        match self {
            Self::IllegalState { bundle, .. }
            | Self::BundleNotFound { bundle }
            | Self::StartFailed { bundle, .. }
            | Self::StopFailed { bundle, .. }
            | Self::ContextInvalid { bundle } => Some(bundle),
            _ => None,
        }
    }
}

impl crate::core::error_handling::ContextualError for FrameworkError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Self::IllegalState { .. }
                | Self::BundleNotFound { .. }
                | Self::InvalidSyntax { .. }
                | Self::Config { .. }
        )
    }

    fn user_message(&self) -> Option<String> {
        match self {
            Self::InvalidSyntax { reason, .. } => Some(reason.clone()),
            Self::Config { message } => Some(message.clone()),
            Self::IllegalState { .. } | Self::BundleNotFound { .. } => Some(self.to_string()),
            _ => None,
        }
    }
}
