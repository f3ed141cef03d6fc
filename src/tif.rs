//! Time-in-force as offered by the order-entry dropdown

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// How long a submitted order stays working.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeInForce {
    /// Expires at the end of the regular session.
    #[default]
    DAY,

    /// Good-til-cancelled.
    GTC,

    /// Good-til-extended: also works in the extended-hours sessions.
    GTX,
}

impl TimeInForce {
    /// Visible label of the dropdown option.
    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            TimeInForce::DAY => "DAY",
            TimeInForce::GTC => "GTC",
            TimeInForce::GTX => "GTX",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeInForce {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAY" => Ok(TimeInForce::DAY),
            "GTC" => Ok(TimeInForce::GTC),
            "GTX" => Ok(TimeInForce::GTX),
            _ => Err(Error::InvalidArgument(format!(
                "time in force must be one of DAY, GTC, GTX (got {s:?})"
            ))),
        }
    }
}
