//! Error types shared by the service and the board binary.
//!
//! The `FeedError` enum unifies the failure cases of the quote feed: I/O and
//! settings (de)serialization, transport and HTTP status failures, and responses
//! that do not follow the `var hq_str_<code>="...";` statement shape.
use std::io;

use thiserror::Error;

/// Unified error type shared across the workspace.
#[derive(Error, Debug)]
pub enum FeedError {
    /// I/O error originating from the standard library (settings and code files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding the settings file via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// The quote endpoint could not be reached or the body could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The quote endpoint answered with a non-success HTTP status.
    #[error("Unexpected HTTP status {status} from {url}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// A response statement could not be split into code and fields.
    #[error("Malformed quote statement: {0}")]
    Malformed(String),

    /// Error while parsing a code list file.
    #[error("Parse codes file error: {0}")]
    ParseCodesFile(String),
}
