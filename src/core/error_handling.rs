//! Generic error handling utilities
//!
//! Provides unified error logging that works across the crate's error types
//! while keeping the distinction between problems the operator can fix
//! (unknown job, unknown plugin, bad configuration) and platform faults.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a helpful, actionable message. When it returns
/// `false`, `user_message()` should return `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message the operator can act on
    ///
    /// Examples of user-actionable errors:
    /// - Unknown job or plugin identifiers
    /// - Configuration file validation failures
    ///
    /// Examples of system errors:
    /// - Store backend failures
    /// - Plugin defects raised from lifecycle hooks
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<String>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// - User-actionable errors log their specific message
/// - System errors log the generic operation context
/// - Full detail is always available at debug level
///
/// # Examples
/// ```rust
/// use intelrun::core::error_handling::log_error_with_context;
/// use intelrun::plugin::api::PluginError;
///
/// let error = PluginError::JobNotFound { job_id: 42 };
/// log_error_with_context(&error, "Running plugin");
/// // Logs: "FATAL: Job #42 not found"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message().filter(|_| error.is_user_actionable()) {
        Some(user_msg) => log::error!("FATAL: {}", user_msg),
        None => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
