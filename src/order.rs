//! Order tickets as entered into the order form

use std::fmt;

use crate::direction::Direction;
use crate::error::{Error, Result};
use crate::ids;
use crate::tif::TimeInForce;
use crate::types::Symbol;

/// Order type and the prices it carries.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum OrderKind {
    Market,
    Limit { price: f64 },
    StopMarket { stop: f64 },
    StopLimit { limit: f64, stop: f64 },
    Range { low: f64, high: f64 },
}

impl OrderKind {
    /// Position of this type in the order-type dropdown.
    #[inline]
    pub fn dropdown_index(self) -> usize {
        match self {
            OrderKind::Market => 0,
            OrderKind::Limit { .. } => 1,
            OrderKind::StopMarket { .. } => 2,
            OrderKind::StopLimit { .. } => 3,
            OrderKind::Range { .. } => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OrderKind::Market => "Market",
            OrderKind::Limit { .. } => "Limit",
            OrderKind::StopMarket { .. } => "StopMarket",
            OrderKind::StopLimit { .. } => "StopLimit",
            OrderKind::Range { .. } => "Range",
        }
    }

    /// Returns true for the types only accepted during the regular session.
    #[inline]
    pub fn is_time_gated(self) -> bool {
        matches!(self, OrderKind::Market | OrderKind::StopMarket { .. })
    }

    /// Price inputs to fill, in entry order.
    pub fn price_fields(self) -> Vec<(&'static str, f64)> {
        match self {
            OrderKind::Market => vec![],
            OrderKind::Limit { price } => vec![(ids::ORDER_PRICE, price)],
            OrderKind::StopMarket { stop } => vec![(ids::ORDER_STOP_PRICE, stop)],
            OrderKind::StopLimit { limit, stop } => {
                vec![(ids::ORDER_PRICE, limit), (ids::ORDER_STOP_PRICE, stop)]
            }
            OrderKind::Range { low, high } => {
                vec![(ids::ORDER_PRICE, low), (ids::ORDER_STOP_PRICE, high)]
            }
        }
    }

    fn validate(self) -> Result<()> {
        for (field, price) in self.price_fields() {
            if !price.is_finite() || price <= 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "{} order: {field} must be a positive price (got {price})",
                    self.name()
                )));
            }
        }
        if let OrderKind::Range { low, high } = self {
            if low >= high {
                return Err(Error::InvalidArgument(format!(
                    "range order: low {low} must be below high {high}"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            OrderKind::Market => write!(f, "MKT"),
            OrderKind::Limit { price } => write!(f, "LMT {price}"),
            OrderKind::StopMarket { stop } => write!(f, "STP {stop}"),
            OrderKind::StopLimit { limit, stop } => write!(f, "STP LMT {limit} stop {stop}"),
            OrderKind::Range { low, high } => write!(f, "RANGE {low}-{high}"),
        }
    }
}

/// One order ticket. Built per call and never stored.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    pub direction: Direction,
    pub symbol: Symbol,
    pub quantity: u32,
    pub kind: OrderKind,
    pub time_in_force: TimeInForce,
}

impl Order {
    /// A DAY order.
    pub fn new(direction: Direction, symbol: Symbol, quantity: u32, kind: OrderKind) -> Self {
        Self {
            direction,
            symbol,
            quantity,
            kind,
            time_in_force: TimeInForce::DAY,
        }
    }

    pub fn market(direction: Direction, symbol: Symbol, quantity: u32) -> Self {
        Self::new(direction, symbol, quantity, OrderKind::Market)
    }

    pub fn limit(direction: Direction, symbol: Symbol, quantity: u32, price: f64) -> Self {
        Self::new(direction, symbol, quantity, OrderKind::Limit { price })
    }

    pub fn stop_market(direction: Direction, symbol: Symbol, quantity: u32, stop: f64) -> Self {
        Self::new(direction, symbol, quantity, OrderKind::StopMarket { stop })
    }

    pub fn stop_limit(
        direction: Direction,
        symbol: Symbol,
        quantity: u32,
        limit: f64,
        stop: f64,
    ) -> Self {
        Self::new(direction, symbol, quantity, OrderKind::StopLimit { limit, stop })
    }

    pub fn range(direction: Direction, symbol: Symbol, quantity: u32, low: f64, high: f64) -> Self {
        Self::new(direction, symbol, quantity, OrderKind::Range { low, high })
    }

    pub fn with_tif(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    /// Check quantity and prices. Does not look at the clock.
    pub fn validate(&self) -> Result<()> {
        if self.quantity == 0 {
            return Err(Error::InvalidArgument(format!(
                "{} {}: quantity must be positive",
                self.direction, self.symbol
            )));
        }
        self.kind.validate()
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.direction, self.quantity, self.symbol, self.kind, self.time_in_force
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym() -> Symbol {
        Symbol::new("AAPL")
    }

    #[test]
    fn dropdown_indices() {
        assert_eq!(OrderKind::Market.dropdown_index(), 0);
        assert_eq!(OrderKind::Limit { price: 1.0 }.dropdown_index(), 1);
        assert_eq!(OrderKind::StopMarket { stop: 1.0 }.dropdown_index(), 2);
        assert_eq!(
            OrderKind::StopLimit {
                limit: 1.0,
                stop: 1.0
            }
            .dropdown_index(),
            3
        );
        assert_eq!(OrderKind::Range { low: 1.0, high: 2.0 }.dropdown_index(), 6);
    }

    #[test]
    fn time_gating() {
        assert!(OrderKind::Market.is_time_gated());
        assert!(OrderKind::StopMarket { stop: 1.0 }.is_time_gated());
        assert!(!OrderKind::Limit { price: 1.0 }.is_time_gated());
        assert!(!OrderKind::Range { low: 1.0, high: 2.0 }.is_time_gated());
    }

    #[test]
    fn price_field_order() {
        assert_eq!(
            OrderKind::StopLimit {
                limit: 10.0,
                stop: 9.5
            }
            .price_fields(),
            vec![(ids::ORDER_PRICE, 10.0), (ids::ORDER_STOP_PRICE, 9.5)]
        );
        assert_eq!(
            OrderKind::Range { low: 9.0, high: 11.0 }.price_fields(),
            vec![(ids::ORDER_PRICE, 9.0), (ids::ORDER_STOP_PRICE, 11.0)]
        );
        assert!(OrderKind::Market.price_fields().is_empty());
    }

    #[test]
    fn zero_quantity_rejected() {
        let order = Order::market(Direction::Buy, sym(), 0);
        assert!(matches!(order.validate(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn bad_prices_rejected() {
        for kind in [
            OrderKind::Limit { price: 0.0 },
            OrderKind::Limit { price: -1.0 },
            OrderKind::StopMarket { stop: f64::NAN },
            OrderKind::StopLimit {
                limit: 10.0,
                stop: f64::INFINITY,
            },
            OrderKind::Range { low: 11.0, high: 9.0 },
            OrderKind::Range { low: 10.0, high: 10.0 },
        ] {
            let order = Order::new(Direction::Buy, sym(), 100, kind);
            assert!(order.validate().is_err(), "{kind:?} should be rejected");
        }
    }

    #[test]
    fn default_tif_is_day() {
        let order = Order::limit(Direction::Sell, sym(), 10, 200.0);
        assert_eq!(order.time_in_force, TimeInForce::DAY);
        let order = order.with_tif(TimeInForce::GTC);
        assert_eq!(order.time_in_force, TimeInForce::GTC);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn display() {
        let order = Order::limit(Direction::Buy, sym(), 100, 189.5);
        assert_eq!(order.to_string(), "BUY 100 AAPL LMT 189.5 DAY");
    }
}
