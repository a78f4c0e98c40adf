//! Error types for the showcase controller.

/// Top-level error type for the autopilot, preview and voice layers.
#[derive(Debug, thiserror::Error)]
pub enum ShowcaseError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Catalog source or catalog lookup error.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Durable preference store error.
    #[error("preference store error: {0}")]
    Store(String),

    /// An entry cannot be previewed or launched because its URL is unusable.
    #[error("\"{title}\" has no launchable URL")]
    Unlaunchable {
        /// Display title of the rejected entry.
        title: String,
    },

    /// Speech source refused to start.
    #[error("speech error: {0}")]
    Speech(#[from] crate::ports::SpeechStartError),

    /// Runtime loop / channel error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialisation error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ShowcaseError>;
