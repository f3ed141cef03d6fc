//! Order entry: fill the form, press the directional button, and check for
//! the short-locate popup.

use std::fmt;

use log::{info, warn};

use crate::direction::Direction;
use crate::dom::SelectBy;
use crate::error::{DomError, Error, Result};
use crate::ids;
use crate::loader::{LoadResult, load_symbol};
use crate::order::Order;
use crate::page::Page;
use crate::timing::MarketHours;

/// What the page showed after the submit button was pressed.
///
/// There is no fill tracking; `Submitted` only means nothing objected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderOutcome {
    Submitted,
    /// A short was refused for lack of a locate and the popup was dismissed.
    NotFilled,
}

impl fmt::Display for OrderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderOutcome::Submitted => write!(f, "submitted"),
            OrderOutcome::NotFilled => write!(f, "not filled"),
        }
    }
}

/// Reject time-gated order types outside the regular session.
pub fn check_market_hours(order: &Order, page: &Page<'_>, hours: &MarketHours) -> Result<()> {
    if !order.kind.is_time_gated() {
        return Ok(());
    }
    let now = page.clock().now();
    if hours.is_open_at(now) {
        return Ok(());
    }
    Err(Error::OutsideMarketHours {
        kind: order.kind.name(),
        at: now.time(),
        open: hours.open,
        close: hours.close,
    })
}

/// Click the short-locate popup's cancel button if it is showing.
///
/// Returns true when a popup was dismissed.
pub fn clear_popups(page: &mut Page<'_>) -> Result<bool> {
    match page.dom().click(&ids::id(ids::SHORT_POPUP_CANCEL)) {
        Ok(()) => {
            info!("short locate popup closed");
            Ok(true)
        }
        Err(DomError::NotFound(_) | DomError::Stale(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Enter and submit `order`.
///
/// All argument and market-hours checks happen before the page is touched.
pub fn submit_order(page: &mut Page<'_>, order: &Order, hours: &MarketHours) -> Result<OrderOutcome> {
    order.validate()?;
    check_market_hours(order, page, hours)?;

    if load_symbol(page, &order.symbol)? == LoadResult::MarketClosed {
        warn!("placing {order} while quotes show the market closed");
    }

    page.select(
        &ids::id(ids::ORDER_TYPE_SELECT),
        SelectBy::Index(order.kind.dropdown_index()),
    )?;
    page.select(
        &ids::id(ids::ORDER_TIF_SELECT),
        SelectBy::Label(order.time_in_force.label().to_string()),
    )?;
    page.type_into(&ids::id(ids::ORDER_QUANTITY), &order.quantity.to_string(), false)?;
    for (field, price) in order.kind.price_fields() {
        page.type_into(&ids::id(field), &price.to_string(), false)?;
    }
    page.click(&ids::submit_button(order.direction))?;
    info!("order sent: {order}");

    if order.direction != Direction::Short {
        return Ok(OrderOutcome::Submitted);
    }

    let timing = page.timing();
    page.sleep(timing.popup_wait());
    if clear_popups(page)? {
        warn!("short {} {} not filled, locate required", order.quantity, order.symbol);
        Ok(OrderOutcome::NotFilled)
    } else {
        Ok(OrderOutcome::Submitted)
    }
}
