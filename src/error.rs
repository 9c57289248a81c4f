//! Error types for the event hub and its host binary.

/// Errors surfaced synchronously by subscription management.
///
/// Raising or firing an event type nobody ever subscribed to is not an
/// error and has no variant here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DispatchError {
    #[error("Handler is already subscribed to `{event_type}`.")]
    DuplicateSubscriber { event_type: &'static str },

    #[error("Handler is not subscribed to `{event_type}`.")]
    NotSubscribed { event_type: &'static str },

    #[error("No dispatcher registered for `{event_type}`.")]
    NoDispatcher { event_type: &'static str },
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Invalid value \"{value}\" for config key \"{key}\"")]
    InvalidConfig { key: String, value: String },

    #[error("Configuration error: {msg}")]
    ConfigurationError { msg: String },
}
