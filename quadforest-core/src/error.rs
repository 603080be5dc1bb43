//! Error types for quadforest-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// An identifier has no mapping in the interner that is decoding it.
    ///
    /// This indicates state corruption (an identifier leaked across
    /// interners, or a forest outlived its interner) and aborts the
    /// operation that detected it.
    #[error("stale identifier: {0} is not mapped by this interner")]
    StaleIdentifier(u32),

    /// An identifier sequence has the wrong shape
    #[error("input shape mismatch: {0}")]
    InputShape(String),

    /// An underlying stream surfaced an error
    #[error("stream error: {0}")]
    Stream(String),
}

impl Error {
    /// Create an input shape error
    pub fn input_shape(msg: impl Into<String>) -> Self {
        Error::InputShape(msg.into())
    }

    /// Create a stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        Error::Stream(msg.into())
    }
}
