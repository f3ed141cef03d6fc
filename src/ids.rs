//! Element locators of the TradeZero web layout.
//!
//! All knowledge of the page structure lives here.

use crate::direction::Direction;
use crate::dom::{Locator, xpath_literal};
use crate::types::Symbol;

pub const HOME_URL: &str = "https://standard.tradezeroweb.us/";

// Login form
pub const LOGIN_USER: &str = "login";
pub const LOGIN_PASSWORD: &str = "password";

/// Heading that only renders once the authenticated layout is up.
pub const LAYOUT_MARKER_XPATH: &str = "//*[contains(@id,'portfolio-container')]//div//div//h2";
pub const LAYOUT_MARKER_TEXT: &str = "Portfolio";

// Order entry
pub const ORDER_TYPE_SELECT: &str = "trading-order-select-type";
pub const ORDER_TIF_SELECT: &str = "trading-order-select-time";
pub const ORDER_QUANTITY: &str = "trading-order-input-quantity";
pub const ORDER_PRICE: &str = "trading-order-input-price";
pub const ORDER_STOP_PRICE: &str = "trading-order-input-sprice";
pub const SHORT_POPUP_CANCEL: &str = "short-locate-button-cancel";

// Quote panel
pub const SYMBOL_INPUT: &str = "trading-order-input-symbol";
pub const CURRENT_SYMBOL: &str = "trading-order-symbol";
pub const ASK: &str = "trading-order-ask";
pub const BID: &str = "trading-order-bid";
pub const LAST: &str = "trading-order-p";
pub const OPEN: &str = "trading-order-open";
pub const HIGH: &str = "trading-order-high";
pub const LOW: &str = "trading-order-low";
pub const CLOSE: &str = "trading-order-close";
pub const VOLUME: &str = "trading-order-vol";

// Locate panel
pub const LOCATE_TAB: &str = "locate-tab-1";
pub const LOCATE_SYMBOL: &str = "short-list-input-symbol";
pub const LOCATE_SHARES: &str = "short-list-input-shares";
pub const LOCATE_STATUS: &str = "short-list-locate-status";
pub const LOCATE_BUTTON: &str = "short-list-button-locate";
pub const EASY_TO_BORROW: &str = "Easy to borrow";

// Portfolio tables
pub const POSITIONS_TAB: &str = "portfolio-tab-op-1";
pub const POSITIONS_TABLE: &str = "opTable-1";
pub const ACTIVE_ORDERS_TAB: &str = "portfolio-tab-ao-1";
pub const ACTIVE_ORDERS_TABLE: &str = "aoTable-1";
pub const LOCATE_INVENTORY_TABLE: &str = "locate-inventory-table";
pub const NO_POSITIONS_TEXT: &str = "you have no open positions.";

// Notifications
pub const NOTIFICATION_MESSAGES_XPATH: &str = "//span[@class=\"message\"]";

// Watchlist
pub const WATCHLIST_INPUT: &str = "trading-watchlist-input-symbol";
pub const WATCHLIST_TABLE: &str = "wlTable-1";

/// Header fields that show account identity and balances.
pub const ACCOUNT_FIELDS: [&str; 7] = [
    "h-acc-value",
    "h-equity-value",
    "h-exposure-value",
    "h-buyingpower-value",
    "h-cash-value",
    "h-realized-value",
    "h-unrealizd-value",
];

pub fn id(s: &str) -> Locator {
    Locator::id(s)
}

pub fn layout_marker() -> Locator {
    Locator::xpath(LAYOUT_MARKER_XPATH)
}

pub fn submit_button(direction: Direction) -> Locator {
    Locator::id(format!("trading-order-button-{}", direction.button_suffix()))
}

/// Locate offer tiers, in the order they are evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocateTier {
    PreBorrow,
    SingleUse,
    Locate,
}

impl LocateTier {
    pub const ALL: [LocateTier; 3] = [LocateTier::PreBorrow, LocateTier::SingleUse, LocateTier::Locate];

    /// Tier name as it appears inside offer row ids.
    pub fn as_str(self) -> &'static str {
        match self {
            LocateTier::PreBorrow => "PreBorrow",
            LocateTier::SingleUse => "SingleUse",
            LocateTier::Locate => "Locate",
        }
    }
}

impl std::fmt::Display for LocateTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn offer_cell(symbol: &Symbol, tier: LocateTier, cell: u8) -> String {
    format!(
        "//*[contains(@id, {}) and contains(@id, '-cell-{cell}')]",
        xpath_literal(&format!("oitem-l-{symbol}-{tier}"))
    )
}

pub fn offer_price_per_share(symbol: &Symbol, tier: LocateTier) -> Locator {
    Locator::xpath(offer_cell(symbol, tier, 2))
}

pub fn offer_total(symbol: &Symbol, tier: LocateTier) -> Locator {
    Locator::xpath(offer_cell(symbol, tier, 6))
}

pub fn offer_accept(symbol: &Symbol, tier: LocateTier) -> Locator {
    Locator::xpath(format!("{}/span[1]", offer_cell(symbol, tier, 8)))
}

pub fn offer_decline(symbol: &Symbol, tier: LocateTier) -> Locator {
    Locator::xpath(format!("{}/span[2]", offer_cell(symbol, tier, 8)))
}

pub fn located_symbols() -> Locator {
    Locator::xpath(format!("//*[@id=\"{LOCATE_INVENTORY_TABLE}\"]/tbody/tr/td[1]"))
}

pub fn located_shares(symbol: &Symbol) -> Locator {
    Locator::id(format!("inv-{symbol}-SingleUse-cell-2"))
}

pub fn credit_quantity(symbol: &Symbol) -> Locator {
    Locator::id(format!("inv-{symbol}-SingleUse-sell-qty"))
}

pub fn credit_button(symbol: &Symbol) -> Locator {
    let id = xpath_literal(&format!("inv-{symbol}-SingleUse-sell"));
    Locator::xpath(format!("//*[@id={id}]/button"))
}

pub fn cancel_order_button(row_id: &str) -> Locator {
    Locator::xpath(format!(
        "//div[@id=\"portfolio-content-tab-ao-1\"]//*[@order-id={}]/td[@class=\"red\"]",
        xpath_literal(row_id)
    ))
}

pub fn watchlist_symbols() -> Locator {
    Locator::xpath(format!("//*[@id=\"{WATCHLIST_TABLE}\"]/tbody/tr/td[1]"))
}

pub fn watchlist_remove(symbol: &Symbol) -> Locator {
    Locator::xpath(format!(
        "//*[@id=\"{WATCHLIST_TABLE}\"]/tbody/tr[td[1]={}]/td[last()]",
        xpath_literal(symbol.as_str())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_locators() {
        let sym = Symbol::new("gme");
        assert_eq!(
            offer_total(&sym, LocateTier::SingleUse),
            Locator::xpath(
                "//*[contains(@id, \"oitem-l-GME-SingleUse\") and contains(@id, '-cell-6')]"
            )
        );
        assert_eq!(
            offer_decline(&sym, LocateTier::PreBorrow),
            Locator::xpath(
                "//*[contains(@id, \"oitem-l-GME-PreBorrow\") and contains(@id, '-cell-8')]/span[2]"
            )
        );
    }

    #[test]
    fn submit_buttons() {
        assert_eq!(
            submit_button(Direction::Short),
            Locator::id("trading-order-button-short")
        );
    }

    #[test]
    fn credit_locators() {
        let sym = Symbol::new("amc");
        assert_eq!(located_shares(&sym), Locator::id("inv-AMC-SingleUse-cell-2"));
        assert_eq!(
            credit_button(&sym),
            Locator::xpath("//*[@id=\"inv-AMC-SingleUse-sell\"]/button")
        );
    }

    #[test]
    fn quotes_in_symbols_stay_inside_literals() {
        let sym = Symbol::new("o'x");
        assert_eq!(
            offer_price_per_share(&sym, LocateTier::SingleUse),
            Locator::xpath(
                "//*[contains(@id, \"oitem-l-O'X-SingleUse\") and contains(@id, '-cell-2')]"
            )
        );
        assert_eq!(
            credit_button(&sym),
            Locator::xpath("//*[@id=\"inv-O'X-SingleUse-sell\"]/button")
        );

        let both = Symbol::new("a\"b'c");
        assert_eq!(
            watchlist_remove(&both),
            Locator::xpath(format!(
                "//*[@id=\"{WATCHLIST_TABLE}\"]/tbody/tr[td[1]=concat(\"A\", '\"', \"B'C\")]/td[last()]"
            ))
        );
        assert_eq!(
            credit_button(&both),
            Locator::xpath(
                "//*[@id=concat(\"inv-A\", '\"', \"B'C-SingleUse-sell\")]/button"
            )
        );
    }

    #[test]
    fn cancel_button() {
        assert_eq!(
            cancel_order_button("s:1234"),
            Locator::xpath(
                "//div[@id=\"portfolio-content-tab-ao-1\"]//*[@order-id=\"s:1234\"]/td[@class=\"red\"]"
            )
        );
    }
}
