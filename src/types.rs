//! Core types: Symbol, Quote, ActiveOrderRef

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Ticker symbol, always held uppercase.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Symbol(String);

impl Symbol {
    /// Build a symbol, uppercasing and trimming the input.
    ///
    /// Accepts anything; use [`Symbol::try_new`] for user input.
    pub fn new(s: impl AsRef<str>) -> Self {
        Symbol(s.as_ref().trim().to_ascii_uppercase())
    }

    /// Build a symbol from user input, rejecting empty or non-ticker text.
    pub fn try_new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref().trim();
        let valid = !s.is_empty()
            && s.len() <= 12
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !valid {
            return Err(Error::InvalidArgument(format!("bad symbol {s:?}")));
        }
        Ok(Symbol::new(s))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form typed into the platform's lookup fields.
    pub fn lookup_text(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::try_new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Symbol::try_new(s)
    }
}

impl From<Symbol> for String {
    fn from(s: Symbol) -> String {
        s.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Snapshot of the quote panel. All zeros means the market is closed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quote {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub last: f64,
    pub ask: f64,
    pub bid: f64,
}

impl Quote {
    /// The all-zero quote returned while the market is closed.
    pub const CLOSED: Quote = Quote {
        open: 0.0,
        high: 0.0,
        low: 0.0,
        close: 0.0,
        volume: 0.0,
        last: 0.0,
        ask: 0.0,
        bid: 0.0,
    };

    #[inline]
    pub fn is_closed(&self) -> bool {
        *self == Quote::CLOSED
    }

    /// Ask minus bid.
    #[inline]
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

/// Reference number of a working order, as rendered in the active-orders table.
///
/// Only used to ask the platform to cancel the order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveOrderRef(pub String);

impl ActiveOrderRef {
    /// The `order-id` attribute of the table row for this reference.
    ///
    /// Rendered references look like `S.s:1234` or `XX S.s:9 S.s:1234`; the row
    /// id is the part from the second `S.s:` marker on (or the whole text when
    /// there is only one), with every `S.` removed.
    pub fn row_id(&self) -> String {
        const MARKER: &str = "S.s:";
        let raw = self.0.trim();
        let tail = match raw.find(MARKER) {
            Some(first) => match raw[first + 1..].find(MARKER) {
                Some(second) => &raw[first + 1 + second..],
                None => raw,
            },
            None => raw,
        };
        tail.replace("S.", "")
    }
}

impl fmt::Display for ActiveOrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
