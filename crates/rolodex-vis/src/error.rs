//! Error types for rolodex-vis.

use thiserror::Error;

/// Result type for rolodex-vis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the driver and the demo binary.
///
/// A guard timeout on a transition is not an error: the animator recovers
/// from it locally and only logs it.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested list or arrangement is invalid.
    #[error("record list error: {0}")]
    Records(#[from] rolodex_algo::Error),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
