//! WebDriver error types.

use tzweb::{DomError, Locator};

/// Errors from the WebDriver wire.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The HTTP request itself failed.
    #[error("http error: {0}")]
    Http(String),

    /// The driver answered with a protocol error object.
    #[error("{error}: {message}")]
    Protocol { error: String, message: String },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    #[error("failed to start driver: {0}")]
    Spawn(String),

    #[error("no browser session")]
    NoSession,
}

impl WireError {
    /// The protocol error code, if the driver sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            WireError::Protocol { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Translate into the port's error for a call about `locator`.
    pub fn into_dom(self, locator: Option<&Locator>) -> DomError {
        match (self.code(), locator) {
            (Some("no such element"), Some(loc)) => DomError::NotFound(loc.clone()),
            (Some("stale element reference"), Some(loc)) => DomError::Stale(loc.clone()),
            (Some("invalid session id" | "no such window"), _) => DomError::Closed,
            _ if matches!(self, WireError::NoSession) => DomError::Closed,
            _ => DomError::Driver(self.to_string()),
        }
    }
}
