//! Order direction: Buy, Sell, Short, Cover

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Which directional submit button an order goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Buy,
    Sell,
    Short,
    Cover,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Buy,
        Direction::Sell,
        Direction::Short,
        Direction::Cover,
    ];

    /// Suffix of the submit button id, `trading-order-button-<suffix>`.
    #[inline]
    pub fn button_suffix(self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
            Direction::Short => "short",
            Direction::Cover => "cover",
        }
    }

    /// Returns true for the directions that open or close a short position.
    #[inline]
    pub fn is_short_side(self) -> bool {
        matches!(self, Direction::Short | Direction::Cover)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
            Direction::Short => write!(f, "SHORT"),
            Direction::Cover => write!(f, "COVER"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Direction::Buy),
            "sell" => Ok(Direction::Sell),
            "short" => Ok(Direction::Short),
            "cover" => Ok(Direction::Cover),
            other => Err(Error::InvalidArgument(format!("unknown direction {other:?}"))),
        }
    }
}
