//! Error logging at best-effort boundaries
//!
//! Some framework entry points (registry start/stop, single reference lookup)
//! never return their errors; they log them here instead. Errors that carry a
//! message the caller can act on are logged verbatim. Everything else is
//! logged with the operation context and the full source chain.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if the error message is meaningful to whoever drives the framework
    /// (an unknown bundle name, a malformed filter, a bad configuration value)
    fn is_user_actionable(&self) -> bool;

    /// The message to show for user-actionable errors
    fn user_message(&self) -> Option<String>;
}

/// An error's message followed by each of its sources, joined with ": "
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Log a swallowed error with a detail level that depends on its kind
///
/// # Examples
/// ```
/// use bundlekit::core::error_handling::log_error_with_context;
/// use bundlekit::framework::api::FrameworkError;
///
/// let err = FrameworkError::BundleNotFound { bundle: "audit".to_string() };
/// log_error_with_context(&err, "Stopping bundle audit");
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("{}: {}", operation_context, user_msg);
        }
        _ => {
            log::error!("{} failed: {}", operation_context, error_chain(error));
        }
    }
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
