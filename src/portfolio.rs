//! Open positions, working orders and the locate inventory, read from the
//! portfolio tables.

use log::{debug, info, warn};

use crate::dom::Locator;
use crate::error::{DomError, Error, Result};
use crate::ids;
use crate::page::{Page, parse_number};
use crate::types::{ActiveOrderRef, Symbol};

/// A row of the open-positions table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub symbol: Symbol,
    /// `Long` or `Short` as rendered.
    pub side: String,
    pub quantity: f64,
    pub prev_close: f64,
    pub entry: f64,
    pub price: f64,
    pub change: f64,
    pub pct_change: f64,
    pub day_pnl: f64,
    pub pnl: f64,
    /// Held since a previous session.
    pub overnight: bool,
}

/// A row of the active-orders table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveOrder {
    pub reference: ActiveOrderRef,
    pub symbol: Symbol,
    pub side: String,
    pub quantity: f64,
    pub open: f64,
    pub executed: f64,
    pub order_type: String,
    pub status: String,
    pub time_in_force: String,
    pub limit: Option<f64>,
    pub stop: Option<f64>,
    pub placed: String,
}

/// A row of the locate inventory.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocateInventoryEntry {
    pub symbol: Symbol,
    pub available: f64,
    pub unavailable: f64,
}

const POSITION_COLUMNS: usize = 11;
// Leading cancel-button cell plus twelve data columns.
const ACTIVE_ORDER_COLUMNS: usize = 13;
const INVENTORY_COLUMNS: usize = 4;

struct Row<'r> {
    table: &'static str,
    cells: &'r [String],
}

impl Row<'_> {
    fn text(&self, i: usize) -> &str {
        self.cells.get(i).map(|s| s.trim()).unwrap_or("")
    }

    fn number(&self, i: usize) -> Result<f64> {
        let raw = self.text(i);
        parse_number(raw.trim_end_matches('%')).ok_or_else(|| Error::UnexpectedText {
            locator: Locator::id(self.table),
            text: raw.to_string(),
        })
    }

    fn optional_number(&self, i: usize) -> Option<f64> {
        parse_number(self.text(i))
    }
}

fn parse_position(cells: &[String]) -> Result<Position> {
    let row = Row {
        table: ids::POSITIONS_TABLE,
        cells,
    };
    Ok(Position {
        symbol: Symbol::new(row.text(0)),
        side: row.text(1).to_string(),
        quantity: row.number(2)?,
        prev_close: row.number(3)?,
        entry: row.number(4)?,
        price: row.number(5)?,
        change: row.number(6)?,
        pct_change: row.number(7)?,
        day_pnl: row.number(8)?,
        pnl: row.number(9)?,
        overnight: row.text(10).eq_ignore_ascii_case("yes"),
    })
}

fn parse_active_order(cells: &[String]) -> Result<ActiveOrder> {
    let row = Row {
        table: ids::ACTIVE_ORDERS_TABLE,
        cells,
    };
    Ok(ActiveOrder {
        reference: ActiveOrderRef(row.text(1).to_string()),
        symbol: Symbol::new(row.text(2)),
        side: row.text(3).to_string(),
        quantity: row.number(4)?,
        open: row.number(5)?,
        executed: row.number(6)?,
        order_type: row.text(7).to_string(),
        status: row.text(8).to_string(),
        time_in_force: row.text(9).to_string(),
        limit: row.optional_number(10),
        stop: row.optional_number(11),
        placed: row.text(12).to_string(),
    })
}

fn parse_inventory(cells: &[String]) -> Result<LocateInventoryEntry> {
    let row = Row {
        table: ids::LOCATE_INVENTORY_TABLE,
        cells,
    };
    Ok(LocateInventoryEntry {
        symbol: Symbol::new(row.text(0)),
        available: row.number(2)?,
        unavailable: row.number(3)?,
    })
}

/// Rows with fewer than `width` cells are placeholders ("no open positions").
fn data_rows(rows: Vec<Vec<String>>, width: usize, table: &str) -> Vec<Vec<String>> {
    rows.into_iter()
        .filter(|r| {
            let keep = r.len() >= width;
            if !keep {
                debug!("{table}: skipping placeholder row {r:?}");
            }
            keep
        })
        .collect()
}

/// All open positions. Empty when the table shows its placeholder.
pub fn positions(page: &mut Page<'_>) -> Result<Vec<Position>> {
    let rows = page.table_rows(&ids::id(ids::POSITIONS_TABLE))?;
    let empty = rows.first().and_then(|r| r.first()).is_some_and(|c| {
        c.trim().eq_ignore_ascii_case(ids::NO_POSITIONS_TEXT)
    });
    if rows.is_empty() || empty {
        debug!("portfolio is empty");
        return Ok(Vec::new());
    }
    data_rows(rows, POSITION_COLUMNS, ids::POSITIONS_TABLE)
        .iter()
        .map(|r| parse_position(r))
        .collect()
}

/// Positions opened during the current session.
pub fn intraday_positions(page: &mut Page<'_>) -> Result<Vec<Position>> {
    Ok(positions(page)?.into_iter().filter(|p| !p.overnight).collect())
}

/// True if there is an open position in `symbol`.
pub fn invested(page: &mut Page<'_>, symbol: &Symbol) -> Result<bool> {
    Ok(positions(page)?.iter().any(|p| &p.symbol == symbol))
}

/// All working orders.
pub fn active_orders(page: &mut Page<'_>) -> Result<Vec<ActiveOrder>> {
    let rows = page.table_rows(&ids::id(ids::ACTIVE_ORDERS_TABLE))?;
    data_rows(rows, ACTIVE_ORDER_COLUMNS, ids::ACTIVE_ORDERS_TABLE)
        .iter()
        .map(|r| parse_active_order(r))
        .collect()
}

pub fn symbol_in_active_orders(page: &mut Page<'_>, symbol: &Symbol) -> Result<bool> {
    Ok(active_orders(page)?.iter().any(|o| &o.symbol == symbol))
}

/// References of every working order in `symbol`.
pub fn active_order_refs(page: &mut Page<'_>, symbol: &Symbol) -> Result<Vec<ActiveOrderRef>> {
    page.click(&ids::id(ids::ACTIVE_ORDERS_TAB))?;
    Ok(active_orders(page)?
        .into_iter()
        .filter(|o| &o.symbol == symbol)
        .map(|o| o.reference)
        .collect())
}

/// Cancel the given working orders. Orders that can no longer be found are
/// logged and skipped. Returns how many cancel buttons were pressed.
pub fn cancel_active_orders(
    page: &mut Page<'_>,
    symbol: &Symbol,
    refs: &[ActiveOrderRef],
) -> Result<usize> {
    page.click(&ids::id(ids::ACTIVE_ORDERS_TAB))?;
    let mut cancelled = 0;
    for reference in refs {
        let row_id = reference.row_id();
        match page.dom().click(&ids::cancel_order_button(&row_id)) {
            Ok(()) => {
                info!("cancelled {symbol} order {reference}");
                cancelled += 1;
            }
            Err(DomError::NotFound(_) | DomError::Stale(_)) => {
                warn!("could not cancel {symbol} order {reference}, already executed or cancelled?");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(cancelled)
}

/// Symbols currently located, with their share counts.
pub fn locate_inventory(page: &mut Page<'_>) -> Result<Vec<LocateInventoryEntry>> {
    let rows = page.table_rows(&ids::id(ids::LOCATE_INVENTORY_TABLE))?;
    data_rows(rows, INVENTORY_COLUMNS, ids::LOCATE_INVENTORY_TABLE)
        .iter()
        .map(|r| parse_inventory(r))
        .collect()
}
