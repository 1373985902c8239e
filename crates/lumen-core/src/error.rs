//! Error types for Lumen core.

/// The main error type for Lumen core operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Scheduler-related error.
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
    /// Signal-related error.
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),
}

/// Scheduler-specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// The task ID is invalid, already fired, or has already been cancelled.
    #[error("Invalid, fired or cancelled scheduled task ID")]
    InvalidTaskId,
}

/// Signal-specific errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    #[error("Invalid or disconnected connection ID")]
    InvalidConnection,
    /// The signal has been dropped and is no longer available.
    #[error("Signal has been dropped")]
    SignalDropped,
}

/// A specialized Result type for Lumen core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_error_converts_into_core_error() {
        let err: CoreError = SchedulerError::InvalidTaskId.into();
        assert_eq!(err, CoreError::Scheduler(SchedulerError::InvalidTaskId));
        assert_eq!(
            err.to_string(),
            "Scheduler error: Invalid, fired or cancelled scheduled task ID"
        );
    }

    #[test]
    fn test_signal_error_display() {
        let err: CoreError = SignalError::SignalDropped.into();
        assert_eq!(err.to_string(), "Signal error: Signal has been dropped");
    }
}
