use std::fmt;
use std::time::Duration;

/// Why a remote inference attempt produced no reply.
///
/// The router falls back to the offline brain for every variant; the
/// distinction only matters for diagnostics.
#[derive(Debug)]
pub enum InferenceError {
    /// The health probe failed: nothing is listening, or it answered non-2xx.
    Unavailable(String),
    /// The generate call answered with a non-success status.
    Status { status: u16, message: String },
    Network(reqwest::Error),
    /// No chunk arrived within the allowed interval.
    Timeout(Duration),
    /// The server reported an error inside the stream.
    Server(String),
    /// The stream completed without any text.
    EmptyReply,
    /// Writing the streamed text to the console failed.
    Io(std::io::Error),
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceError::Unavailable(reason) => {
                write!(f, "inference service unavailable: {}", reason)
            }
            InferenceError::Status { status, message } => {
                write!(f, "HTTP error (status {}): {}", status, message)
            }
            InferenceError::Network(e) => write!(f, "network error: {}", e),
            InferenceError::Timeout(after) => {
                write!(f, "no data received for {} seconds", after.as_secs())
            }
            InferenceError::Server(msg) => write!(f, "server error: {}", msg),
            InferenceError::EmptyReply => write!(f, "empty reply"),
            InferenceError::Io(e) => write!(f, "output error: {}", e),
        }
    }
}

impl std::error::Error for InferenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InferenceError::Network(e) => Some(e),
            InferenceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        InferenceError::Network(err)
    }
}
