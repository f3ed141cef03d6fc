//! # tzweb
//!
//! Drive the TradeZero web platform from Rust: log in, read quotes, negotiate
//! short locates and place orders by reading and operating the rendered page.
//!
//! The crate never talks to a browser directly. Everything goes through the
//! [`DomSession`] port; `tzweb-webdriver` implements it over the W3C WebDriver
//! protocol and [`mock::MockDom`] implements it for tests.
//!
//! ## Quick Start
//!
//! ```
//! use tzweb::mock::{ManualClock, MockDom};
//! use tzweb::{Credentials, Direction, Order, OrderOutcome, Session, Symbol};
//!
//! let dom = MockDom::builder()
//!     .trading_layout()
//!     .list(tzweb::ids::layout_marker(), &["Portfolio"])
//!     .text(tzweb::ids::CURRENT_SYMBOL, "AAPL(USD)")
//!     .text(tzweb::ids::ASK, "190.10")
//!     .build();
//!
//! let mut session = Session::builder(dom, Credentials::new("trader", "secret"))
//!     .clock(ManualClock::default())
//!     .build();
//!
//! session.ensure_connected().unwrap();
//! let order = Order::limit(Direction::Buy, Symbol::new("aapl"), 100, 189.50);
//! assert_eq!(session.submit_order(&order).unwrap(), OrderOutcome::Submitted);
//! ```
//!
//! ## Waiting on the page
//!
//! The platform updates asynchronously. Every wait is a bounded poll
//! ([`poll::poll_until`]) with budgets from [`Timing`]; nothing blocks forever.
//! Stale element reads are retried inside a poll and surface as errors
//! anywhere else.
//!
//! ## Locates
//!
//! ```
//! use tzweb::locate::{select_cheapest, LocateOffer};
//! use tzweb::ids::LocateTier;
//!
//! let offers = [
//!     LocateOffer { tier: LocateTier::PreBorrow, price_per_share: 0.12, total: 12.0 },
//!     LocateOffer { tier: LocateTier::SingleUse, price_per_share: 0.10, total: 10.0 },
//!     LocateOffer { tier: LocateTier::Locate, price_per_share: 0.10, total: 10.0 },
//! ];
//! // Lowest total wins; on a tie the earlier tier wins.
//! assert_eq!(select_cheapest(&offers).unwrap().tier, LocateTier::SingleUse);
//! ```

pub mod account;
pub mod clock;
pub mod cookies;
mod direction;
pub mod dom;
mod error;
pub mod ids;
pub mod loader;
pub mod locate;
pub mod market_data;
pub mod mock;
pub mod notification;
mod order;
pub mod page;
pub mod poll;
pub mod portfolio;
pub mod session;
pub mod submit;
mod tif;
pub mod timing;
mod types;
pub mod watchlist;

// Re-export public API
pub use clock::{Clock, SystemClock};
#[cfg(feature = "persistence")]
pub use cookies::FileCookieStore;
pub use cookies::{CookieStore, MemoryCookieStore};
pub use direction::Direction;
pub use dom::{Cookie, DomSession, Locator, SelectBy};
pub use error::{DomError, Error, Result};
pub use ids::LocateTier;
pub use loader::LoadResult;
pub use locate::{LocateDecision, LocateOffer, LocateResult};
pub use order::{Order, OrderKind};
pub use portfolio::{ActiveOrder, LocateInventoryEntry, Position};
pub use session::{ConnectionState, Credentials, ReconnectPath, Session, SessionBuilder};
pub use submit::OrderOutcome;
pub use tif::TimeInForce;
pub use timing::{MarketHours, Timing};
pub use types::{ActiveOrderRef, Quote, Symbol};
