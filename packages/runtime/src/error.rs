//! Error types for the Lectern runtime.

use lectern_widget::WidgetKind;
use thiserror::Error;

/// Errors that can occur in the Lectern runtime.
///
/// Load and mount failures never cross the controller boundary as `Err`;
/// the controller catches them and surfaces a `LoadFailed` event instead.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Module resolution failed for a path.
    #[error("load failed for {path}: {message}")]
    LoadFailure { path: String, message: String },

    /// A mount strategy failed during an operation.
    #[error("mount failed for {kind} widget: {message}")]
    MountFailure { kind: WidgetKind, message: String },

    /// A widget value's kind has no registered mount strategy.
    #[error("unrecognized widget kind: {0}")]
    UnknownWidgetKind(String),

    /// The bridge transport rejected a send.
    #[error("bridge transport error: {0}")]
    Transport(String),

    /// The channel to the child page was closed unexpectedly.
    #[error("channel closed")]
    ChannelClosed,
}

impl RuntimeError {
    /// Build a load failure for `path` from any error message.
    pub fn load(path: impl Into<String>, message: impl ToString) -> Self {
        RuntimeError::LoadFailure {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Build a mount failure for a widget kind from any error message.
    pub fn mount(kind: WidgetKind, message: impl ToString) -> Self {
        RuntimeError::MountFailure {
            kind,
            message: message.to_string(),
        }
    }
}

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
