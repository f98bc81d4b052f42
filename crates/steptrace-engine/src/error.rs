//! Error types for the step inspector binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and feed processing.

/// Top-level error for the step inspector binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: steptrace_core::config::ConfigError,
    },

    /// Reading or decoding the feed failed.
    #[error("feed error: {source}")]
    Feed {
        /// The underlying feed error.
        #[from]
        source: steptrace_core::feed::FeedError,
    },

    /// The feed file could not be opened.
    #[error("failed to open feed `{path}`: {source}")]
    OpenFeed {
        /// Path given on the command line.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A frame could not be encoded.
    #[error("failed to encode frame: {source}")]
    Encode {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// Writing a frame to stdout failed.
    #[error("failed to write frame: {source}")]
    Output {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The feed reader task panicked or was cancelled.
    #[error("feed reader task failed: {source}")]
    Reader {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },
}
