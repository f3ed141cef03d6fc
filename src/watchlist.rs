//! The watchlist panel and the set of symbols this session keeps on it.
//!
//! The platform sometimes drops watchlist rows after a reconnect, so the
//! session remembers what it added and [`Watchlist::restore`] puts back
//! whatever is missing.

use log::{debug, info};

use crate::error::Result;
use crate::ids;
use crate::page::Page;
use crate::types::Symbol;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Watchlist {
    tracked: Vec<Symbol>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking symbols without touching the page.
    pub fn with_symbols(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let mut list = Self::new();
        for s in symbols {
            list.track(s);
        }
        list
    }

    pub fn tracked(&self) -> &[Symbol] {
        &self.tracked
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.tracked.contains(symbol)
    }

    fn track(&mut self, symbol: Symbol) {
        if !self.tracked.contains(&symbol) {
            self.tracked.push(symbol);
        }
    }

    /// Symbols currently rendered in the panel.
    pub fn rendered(page: &mut Page<'_>) -> Result<Vec<Symbol>> {
        Ok(page
            .texts(&ids::watchlist_symbols())?
            .iter()
            .filter(|s| !s.is_empty())
            .map(Symbol::new)
            .collect())
    }

    /// Add `symbol` to the panel and track it.
    pub fn add(&mut self, page: &mut Page<'_>, symbol: &Symbol) -> Result<()> {
        page.type_into(&ids::id(ids::WATCHLIST_INPUT), &symbol.lookup_text(), true)?;
        self.track(symbol.clone());
        info!("watching {symbol}");
        Ok(())
    }

    /// Remove `symbol` from the panel and stop tracking it.
    pub fn remove(&mut self, page: &mut Page<'_>, symbol: &Symbol) -> Result<()> {
        self.tracked.retain(|s| s != symbol);
        page.click(&ids::watchlist_remove(symbol))?;
        info!("stopped watching {symbol}");
        Ok(())
    }

    /// Re-add tracked symbols missing from the panel. Returns how many were
    /// re-added.
    pub fn restore(&self, page: &mut Page<'_>) -> Result<usize> {
        if self.tracked.is_empty() {
            return Ok(0);
        }
        let shown = Self::rendered(page)?;
        let mut added = 0;
        for symbol in self.tracked.iter().filter(|s| !shown.contains(s)) {
            page.type_into(&ids::id(ids::WATCHLIST_INPUT), &symbol.lookup_text(), true)?;
            added += 1;
        }
        debug!("watchlist restored, {added} symbol(s) re-added");
        Ok(added)
    }
}
