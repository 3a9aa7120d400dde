//! Error types for avs3probe-core

/// Errors that can occur while detecting or demuxing a stream
///
/// Content anomalies found while probing (out-of-order slices, unknown
/// profiles, reserved start codes) are not errors; they only lower the
/// probe score to zero.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No registered format accepted the probe sample
    #[error("Stream not recognized: {filename}")]
    NotRecognized {
        /// Name of the probed input
        filename: String,
    },

    /// Demuxer option out of range
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
