//! Short-locate negotiation and crediting of unused locates.
//!
//! A locate request renders up to three priced offers, one per [`LocateTier`].
//! The cheapest is accepted when its total fits the budget and declined
//! otherwise.

use std::fmt;

use log::{debug, info, warn};

use crate::dom::Locator;
use crate::error::{DomError, Error, Result};
use crate::ids::{self, LocateTier};
use crate::loader::{LoadResult, load_symbol};
use crate::page::{Page, parse_number};
use crate::poll::{Poll, poll_until};
use crate::types::Symbol;

/// Locates are sold in round lots.
pub const LOT_SIZE: u32 = 100;

/// One priced offer row.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocateOffer {
    pub tier: LocateTier,
    pub price_per_share: f64,
    pub total: f64,
}

/// What was done with the selected offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocateDecision {
    Accepted,
    Declined,
    /// No bid needed; nothing was clicked.
    EasyToBorrow,
}

impl fmt::Display for LocateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocateDecision::Accepted => write!(f, "accepted"),
            LocateDecision::Declined => write!(f, "declined"),
            LocateDecision::EasyToBorrow => write!(f, "easy to borrow"),
        }
    }
}

/// Outcome of [`locate`]. Price and total are reported whether or not the
/// offer was accepted.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocateResult {
    /// `None` when the symbol is easy to borrow.
    pub tier: Option<LocateTier>,
    pub price_per_share: f64,
    pub total: f64,
    pub decision: LocateDecision,
}

impl LocateResult {
    pub fn easy_to_borrow() -> Self {
        Self {
            tier: None,
            price_per_share: 0.0,
            total: 0.0,
            decision: LocateDecision::EasyToBorrow,
        }
    }

    /// True when the shares are available to short afterwards.
    pub fn is_located(&self) -> bool {
        !matches!(self.decision, LocateDecision::Declined)
    }
}

/// Reject share amounts that are not a positive multiple of [`LOT_SIZE`].
pub fn validate_lot(shares: u32) -> Result<()> {
    if shares == 0 || shares % LOT_SIZE != 0 {
        return Err(Error::InvalidArgument(format!(
            "share amount must be a positive multiple of {LOT_SIZE} (got {shares})"
        )));
    }
    Ok(())
}

/// Cheapest present offer by total.
///
/// Offers are evaluated in the order given; on equal totals the earlier one
/// wins.
pub fn select_cheapest(offers: &[LocateOffer]) -> Option<LocateOffer> {
    offers.iter().copied().fold(None, |best, offer| match best {
        Some(b) if b.total <= offer.total => Some(b),
        _ => Some(offer),
    })
}

/// Read one tier's offer row. Missing, stale or unparseable cells mean the
/// offer is absent.
fn read_offer(page: &mut Page<'_>, symbol: &Symbol, tier: LocateTier) -> Result<Option<LocateOffer>> {
    let mut cell = |locator: Locator| match page.dom().find_text(&locator) {
        Ok(text) => Ok(parse_number(&text)),
        Err(DomError::NotFound(_) | DomError::Stale(_)) => Ok(None),
        Err(e) => Err(Error::from(e)),
    };
    let Some(price_per_share) = cell(ids::offer_price_per_share(symbol, tier))? else {
        return Ok(None);
    };
    let Some(total) = cell(ids::offer_total(symbol, tier))? else {
        return Ok(None);
    };
    Ok(Some(LocateOffer {
        tier,
        price_per_share,
        total,
    }))
}

fn read_offers(page: &mut Page<'_>, symbol: &Symbol) -> Result<Vec<LocateOffer>> {
    let mut offers = Vec::with_capacity(LocateTier::ALL.len());
    for tier in LocateTier::ALL {
        if let Some(offer) = read_offer(page, symbol, tier)? {
            offers.push(offer);
        }
    }
    Ok(offers)
}

/// Request a locate for `shares` of `symbol` and accept the cheapest offer if
/// its total is at most `max_price`.
pub fn locate(
    page: &mut Page<'_>,
    symbol: &Symbol,
    shares: u32,
    max_price: f64,
) -> Result<LocateResult> {
    validate_lot(shares)?;
    if !max_price.is_finite() || max_price < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "max price must be a non-negative amount (got {max_price})"
        )));
    }

    if load_symbol(page, symbol)? == LoadResult::MarketClosed {
        warn!("locating {symbol} while the market is closed");
    }

    page.click(&ids::id(ids::LOCATE_TAB))?;
    page.type_into(&ids::id(ids::LOCATE_SYMBOL), symbol.as_str(), true)?;
    page.type_into(&ids::id(ids::LOCATE_SHARES), &shares.to_string(), false)?;

    let timing = page.timing();
    let clock = page.clock();
    let status_field = ids::id(ids::LOCATE_STATUS);
    let status = poll_until(
        clock,
        "locate status",
        timing.locate_status_attempts,
        timing.locate_status_interval(),
        |_| {
            let text = page.text(&status_field)?;
            Ok(if text.is_empty() {
                Poll::Pending
            } else {
                Poll::Ready(text)
            })
        },
    )?;
    debug!("locate status for {symbol}: {status}");

    if status == ids::EASY_TO_BORROW {
        info!("{symbol} is easy to borrow, no locate needed");
        return Ok(LocateResult::easy_to_borrow());
    }

    page.click(&ids::id(ids::LOCATE_BUTTON))?;

    let offers = poll_until(
        clock,
        "locate offers",
        timing.locate_offer_attempts,
        timing.locate_offer_interval(),
        |_| {
            let offers = read_offers(page, symbol)?;
            Ok(if offers.is_empty() {
                Poll::Pending
            } else {
                Poll::Ready(offers)
            })
        },
    )
    .map_err(|e| match e {
        Error::Timeout { .. } => Error::NoLocateOffer(symbol.clone()),
        other => other,
    })?;

    let Some(best) = select_cheapest(&offers) else {
        return Err(Error::NoLocateOffer(symbol.clone()));
    };

    let decision = if best.total <= max_price {
        page.click(&ids::offer_accept(symbol, best.tier))?;
        info!(
            "locate accepted: {shares} {symbol} {} at {:.4}/share, total {:.2}",
            best.tier, best.price_per_share, best.total
        );
        LocateDecision::Accepted
    } else {
        page.click(&ids::offer_decline(symbol, best.tier))?;
        info!(
            "locate declined: {symbol} {} total {:.2} exceeds {:.2}",
            best.tier, best.total, max_price
        );
        LocateDecision::Declined
    };

    Ok(LocateResult {
        tier: Some(best.tier),
        price_per_share: best.price_per_share,
        total: best.total,
        decision,
    })
}

/// Sell back located shares. `None` credits everything held for `symbol`.
pub fn credit_locates(page: &mut Page<'_>, symbol: &Symbol, quantity: Option<u32>) -> Result<()> {
    if let Some(q) = quantity {
        validate_lot(q)?;
    }

    let located = page.texts(&ids::located_symbols())?;
    if !located.iter().any(|s| s == symbol.as_str()) {
        return Err(Error::NotLocated(symbol.clone()));
    }

    if let Some(q) = quantity {
        let held = page.number(&ids::located_shares(symbol))?;
        if f64::from(q) > held {
            return Err(Error::InvalidArgument(format!(
                "cannot credit {q} {symbol}, only {held} located"
            )));
        }
        page.type_into(&ids::credit_quantity(symbol), &q.to_string(), false)?;
    }

    page.click(&ids::credit_button(symbol))?;
    match quantity {
        Some(q) => info!("credited {q} {symbol} locates"),
        None => info!("credited all {symbol} locates"),
    }
    Ok(())
}
