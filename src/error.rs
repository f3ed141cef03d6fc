//! Error types for session, quote, locate and order workflows.

use chrono::NaiveTime;

use crate::dom::Locator;
use crate::types::Symbol;

/// Failures reported by a [`DomSession`](crate::dom::DomSession).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("element not found: {0}")]
    NotFound(Locator),

    #[error("stale element reference: {0}")]
    Stale(Locator),

    #[error("browser session is closed")]
    Closed,

    #[error("driver error: {0}")]
    Driver(String),
}

/// Errors returned by the workflows.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad caller input: quantity, time-in-force, prices. Never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A polling budget ran out before the page reached a terminal state.
    #[error("timed out waiting for {what} after {attempts} attempts")]
    Timeout { what: String, attempts: u32 },

    /// The platform confirmed through its notification feed that the symbol
    /// does not exist.
    #[error("symbol not found: {0}")]
    SymbolNotFound(Symbol),

    #[error("{kind} orders are not allowed at {at} (regular session {open}-{close})")]
    OutsideMarketHours {
        kind: &'static str,
        at: NaiveTime,
        open: NaiveTime,
        close: NaiveTime,
    },

    /// Neither a fresh login nor a reload brought the trading layout back.
    #[error("not able to reconnect, max retries exceeded")]
    ReconnectExhausted,

    #[error("no locate offer appeared for {0}")]
    NoLocateOffer(Symbol),

    #[error("{0} is not in the locate inventory")]
    NotLocated(Symbol),

    #[error("unexpected text {text:?} in {locator}")]
    UnexpectedText { locator: Locator, text: String },

    #[error("cookie store error: {0}")]
    CookieStore(String),

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl Error {
    /// True for failures a polling loop may retry within its budget.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Dom(DomError::Stale(_)))
    }

    /// True when the failure is a missing element.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Dom(DomError::NotFound(_)))
    }
}

/// Workflow `Result` alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
