//! Loading a symbol into the quote panel.
//!
//! The panel fills asynchronously after a lookup: the ask field renders empty,
//! then either a price, `0.00` when the market is closed, or nothing at all
//! while the platform posts "Symbol not found" to its notification feed.

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::ids;
use crate::notification;
use crate::page::Page;
use crate::poll::{Poll, poll_until};
use crate::types::Symbol;

/// How a successful load ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadResult {
    /// Quote data is populated with live prices.
    Ready,
    /// The symbol exists but the panel shows zero prices.
    MarketClosed,
}

impl LoadResult {
    #[inline]
    pub fn is_ready(self) -> bool {
        matches!(self, LoadResult::Ready)
    }
}

/// Symbol currently shown in the quote panel.
pub fn current_symbol(page: &mut Page<'_>) -> Result<Symbol> {
    let text = page.text(&ids::id(ids::CURRENT_SYMBOL))?;
    Ok(Symbol::new(text.replace("(USD)", "")))
}

/// Classify one ask reading. `None` means keep waiting.
fn classify_ask(ask: Option<f64>) -> Option<LoadResult> {
    match ask {
        Some(v) if v > 0.0 => Some(LoadResult::Ready),
        Some(v) if v == 0.0 => Some(LoadResult::MarketClosed),
        _ => None,
    }
}

/// True when the panel already shows `symbol` with a live ask.
fn already_loaded(page: &mut Page<'_>, symbol: &Symbol) -> bool {
    let shown = match current_symbol(page) {
        Ok(s) => s,
        Err(e) => {
            debug!("current symbol unreadable ({e}), reloading {symbol}");
            return false;
        }
    };
    if shown != *symbol {
        return false;
    }
    matches!(
        page.maybe_number(&ids::id(ids::ASK)),
        Ok(Some(ask)) if ask > 0.0
    )
}

/// Make sure the quote panel holds `symbol`.
///
/// Fails with [`Error::SymbolNotFound`] when the notification feed confirms the
/// lookup failed, or [`Error::Timeout`] when the ask never settles.
pub fn load_symbol(page: &mut Page<'_>, symbol: &Symbol) -> Result<LoadResult> {
    if already_loaded(page, symbol) {
        debug!("{symbol} already loaded");
        return Ok(LoadResult::Ready);
    }

    page.type_into(&ids::id(ids::SYMBOL_INPUT), &symbol.lookup_text(), true)?;
    let timing = page.timing();
    page.sleep(timing.symbol_submit_delay());

    let ask = ids::id(ids::ASK);
    let not_found = notification::symbol_not_found_message(symbol);
    let clock = page.clock();
    let what = format!("quote for {symbol}");

    let result = poll_until(
        clock,
        &what,
        timing.quote_attempts,
        timing.quote_interval(),
        |attempt| {
            if let Some(done) = classify_ask(page.maybe_number(&ask)?) {
                return Ok(Poll::Ready(done));
            }
            if timing.is_not_found_checkpoint(attempt)
                && notification::last_notification_message(page)? == not_found
            {
                return Err(Error::SymbolNotFound(symbol.clone()));
            }
            Ok(Poll::Pending)
        },
    )?;

    if result == LoadResult::MarketClosed {
        warn!("market closed, {symbol} quotes are zero");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Locator;
    use crate::mock::{DomAction, ManualClock, MockDom};
    use crate::timing::Timing;

    fn notif() -> Locator {
        Locator::xpath(ids::NOTIFICATION_MESSAGES_XPATH)
    }

    #[test]
    fn classify() {
        assert_eq!(classify_ask(Some(1.5)), Some(LoadResult::Ready));
        assert_eq!(classify_ask(Some(0.0)), Some(LoadResult::MarketClosed));
        assert_eq!(classify_ask(None), None);
        assert_eq!(classify_ask(Some(-1.0)), None);
    }

    #[test]
    fn ready_after_empty_reads() {
        let mut dom = MockDom::builder()
            .trading_layout()
            .text(ids::CURRENT_SYMBOL, "MSFT(USD)")
            .text_seq(ids::ASK, ["", "", "", "1,234.56"])
            .build();
        let clock = ManualClock::default();
        let timing = Timing::default();
        let mut page = Page::new(&mut dom, &clock, &timing);

        let result = load_symbol(&mut page, &Symbol::new("aapl")).unwrap();
        assert_eq!(result, LoadResult::Ready);
        assert_eq!(
            dom.actions()[0],
            DomAction::Type {
                locator: Locator::id(ids::SYMBOL_INPUT),
                text: "aapl".into(),
                submit: true,
            }
        );
    }

    #[test]
    fn zero_ask_is_market_closed() {
        let mut dom = MockDom::builder()
            .trading_layout()
            .text(ids::CURRENT_SYMBOL, "MSFT")
            .text_seq(ids::ASK, ["", "0.00"])
            .build();
        let clock = ManualClock::default();
        let timing = Timing::default();
        let mut page = Page::new(&mut dom, &clock, &timing);
        assert_eq!(
            load_symbol(&mut page, &Symbol::new("AAPL")).unwrap(),
            LoadResult::MarketClosed
        );
    }

    #[test]
    fn already_loaded_touches_nothing() {
        let mut dom = MockDom::builder()
            .trading_layout()
            .text(ids::CURRENT_SYMBOL, "AAPL(USD)")
            .text(ids::ASK, "189.20")
            .build();
        let clock = ManualClock::default();
        let timing = Timing::default();
        let mut page = Page::new(&mut dom, &clock, &timing);
        assert_eq!(
            load_symbol(&mut page, &Symbol::new("aapl")).unwrap(),
            LoadResult::Ready
        );
        assert!(dom.actions().is_empty());
        assert_eq!(clock.slept(), std::time::Duration::ZERO);
    }

    #[test]
    fn same_symbol_with_zero_ask_is_reloaded() {
        let mut dom = MockDom::builder()
            .trading_layout()
            .text(ids::CURRENT_SYMBOL, "AAPL")
            .text(ids::ASK, "0.00")
            .build();
        let clock = ManualClock::default();
        let timing = Timing::default();
        let mut page = Page::new(&mut dom, &clock, &timing);
        assert_eq!(
            load_symbol(&mut page, &Symbol::new("AAPL")).unwrap(),
            LoadResult::MarketClosed
        );
        assert_eq!(dom.actions().len(), 1);
    }

    #[test]
    fn not_found_at_first_checkpoint() {
        let mut dom = MockDom::builder()
            .trading_layout()
            .text(ids::CURRENT_SYMBOL, "AAPL")
            .text(ids::ASK, "")
            .list(notif(), &["Symbol not found: ZZZQ"])
            .build();
        let clock = ManualClock::default();
        let timing = Timing::default();
        let mut page = Page::new(&mut dom, &clock, &timing);
        let err = load_symbol(&mut page, &Symbol::new("zzzq")).unwrap_err();
        assert!(matches!(err, Error::SymbolNotFound(ref s) if s.as_str() == "ZZZQ"));
        // Attempts 0..=15 each read the ask once.
        assert_eq!(dom.reads(&Locator::id(ids::ASK)), 16);
        assert_eq!(dom.reads(&notif()), 1);
    }

    fn late_not_found(timing: &Timing) -> (Result<LoadResult>, MockDom) {
        let mut dom = MockDom::builder()
            .trading_layout()
            .text(ids::CURRENT_SYMBOL, "AAPL")
            .text(ids::ASK, "")
            .list_seq(notif(), [vec![], vec!["Symbol not found: ZZZQ"]])
            .build();
        let clock = ManualClock::default();
        let result = load_symbol(&mut Page::new(&mut dom, &clock, timing), &Symbol::new("ZZZQ"));
        (result, dom)
    }

    #[test]
    fn not_found_at_last_attempt() {
        let (result, dom) = late_not_found(&Timing::default());
        assert!(matches!(result, Err(Error::SymbolNotFound(ref s)) if s.as_str() == "ZZZQ"));
        assert_eq!(dom.reads(&Locator::id(ids::ASK)), 300);
        assert_eq!(dom.reads(&notif()), 2);
    }

    #[test]
    fn last_attempt_check_follows_a_shorter_budget() {
        let timing = Timing {
            quote_attempts: 100,
            ..Timing::default()
        };
        let (result, dom) = late_not_found(&timing);
        assert!(matches!(result, Err(Error::SymbolNotFound(_))), "{result:?}");
        assert_eq!(dom.reads(&Locator::id(ids::ASK)), 100);
        assert_eq!(dom.reads(&notif()), 2);
    }

    #[test]
    fn unrelated_notification_times_out() {
        let mut dom = MockDom::builder()
            .trading_layout()
            .text(ids::CURRENT_SYMBOL, "AAPL")
            .text(ids::ASK, "")
            .list(notif(), &["Symbol not found: OTHER"])
            .build();
        let clock = ManualClock::default();
        let timing = Timing::default();
        let mut page = Page::new(&mut dom, &clock, &timing);
        let err = load_symbol(&mut page, &Symbol::new("ZZZQ")).unwrap_err();
        assert!(matches!(err, Error::Timeout { attempts: 300, .. }));
        assert_eq!(dom.reads(&notif()), 2);
    }

    #[test]
    fn stale_ask_is_retried() {
        let ask = Locator::id(ids::ASK);
        let mut dom = MockDom::builder()
            .trading_layout()
            .text(ids::CURRENT_SYMBOL, "AAPL")
            .read_error(ask.clone(), crate::error::DomError::Stale(ask.clone()))
            .text(ids::ASK, "10.00")
            .build();
        let clock = ManualClock::default();
        let timing = Timing::default();
        let mut page = Page::new(&mut dom, &clock, &timing);
        assert_eq!(
            load_symbol(&mut page, &Symbol::new("TSLA")).unwrap(),
            LoadResult::Ready
        );
    }
}
