//! Error types for the relay daemon.
//!
//! The sanitizer has its own error ([`SanitizeError`]) because it is a pure
//! library operation; everything that can go wrong around it is collected
//! here and converted into a failure envelope at the dispatch boundary.

use crate::sanitizer::SanitizeError;

/// Errors produced by the relay and its managed browser.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Browser process or CDP transport failure.
    #[error("browser error: {0}")]
    Browser(String),

    /// The submitted code failed to evaluate in the page.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// A page snapshot could not be sanitized.
    #[error(transparent)]
    Sanitize(#[from] SanitizeError),

    /// Socket-level failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result` with [`ConsoleError`].
pub type ConsoleResult<T> = Result<T, ConsoleError>;
