//! Quote reads and position sizing off the quote panel.

use crate::error::{Error, Result};
use crate::ids;
use crate::loader::{LoadResult, load_symbol};
use crate::page::Page;
use crate::types::{Quote, Symbol};

pub fn bid(page: &mut Page<'_>) -> Result<f64> {
    page.number(&ids::id(ids::BID))
}

pub fn ask(page: &mut Page<'_>) -> Result<f64> {
    page.number(&ids::id(ids::ASK))
}

/// Last traded price.
pub fn last(page: &mut Page<'_>) -> Result<f64> {
    page.number(&ids::id(ids::LAST))
}

/// Load `symbol` and read the whole panel. All zeros while the market is closed.
pub fn quote(page: &mut Page<'_>, symbol: &Symbol) -> Result<Quote> {
    if load_symbol(page, symbol)? == LoadResult::MarketClosed {
        return Ok(Quote::CLOSED);
    }
    let mut read = |id: &str| page.number(&ids::id(id));
    Ok(Quote {
        open: read(ids::OPEN)?,
        high: read(ids::HIGH)?,
        low: read(ids::LOW)?,
        close: read(ids::CLOSE)?,
        volume: read(ids::VOLUME)?,
        last: read(ids::LAST)?,
        ask: read(ids::ASK)?,
        bid: read(ids::BID)?,
    })
}

/// Shares `buying_power` buys at the last price.
///
/// Truncated to whole shares unless `fractional`. `None` while the market is
/// closed.
pub fn order_quantity(
    page: &mut Page<'_>,
    symbol: &Symbol,
    buying_power: f64,
    fractional: bool,
) -> Result<Option<f64>> {
    if !buying_power.is_finite() || buying_power < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "buying power must be a non-negative amount (got {buying_power})"
        )));
    }
    if load_symbol(page, symbol)? == LoadResult::MarketClosed {
        return Ok(None);
    }
    let last = last(page)?;
    if last <= 0.0 {
        return Ok(None);
    }
    let qty = buying_power / last;
    Ok(Some(if fractional { qty } else { qty.trunc() }))
}
