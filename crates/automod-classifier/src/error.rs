//! Classification failure taxonomy
//!
//! None of these reach the message-handling path: the client logs them and
//! answers with an unknown verdict instead.

use reqwest::StatusCode;
use tokio_util::codec::AnyDelimiterCodecError;

/// Why a classification call produced no verdict
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// No HTTP session or no credential configured
    #[error("classification service unavailable: {0}")]
    Unavailable(&'static str),

    /// The service answered with a non-success status
    #[error("classification service returned {0}")]
    Status(StatusCode),

    /// Connect, send, or timeout failure
    #[error("classification request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body broke off or could not be framed
    #[error("classification stream failed: {0}")]
    Body(#[from] AnyDelimiterCodecError),
}

impl ClassifyError {
    /// Whether the failure was the request timeout elapsing
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::Body(AnyDelimiterCodecError::Io(e)) => {
                e.kind() == std::io::ErrorKind::TimedOut
                    || e
                        .get_ref()
                        .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
                        .map_or(false, reqwest::Error::is_timeout)
            }
            _ => false,
        }
    }
}
