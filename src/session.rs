//! Session lifecycle: open, login, connectivity checks and shutdown.
//!
//! A [`Session`] exclusively owns the DOM session for the length of a run. Every
//! workflow borrows it through a short-lived [`Page`].
//!
//! ```text
//! Disconnected ──login──▶ Authenticating ──layout rendered──▶ Connected
//! Connected ──probe fails──▶ Reconnecting ──login or reload──▶ Connected
//!                                         └──neither works──▶ Fatal
//! ```

use std::fmt;

use log::{debug, info, warn};
use zeroize::Zeroizing;

use crate::account;
use crate::clock::{Clock, SystemClock};
use crate::cookies::{CookieStore, MemoryCookieStore};
use crate::dom::{DomSession, SelectBy};
use crate::error::{Error, Result};
use crate::ids;
use crate::loader::{self, LoadResult};
use crate::locate::{self, LocateResult};
use crate::market_data;
use crate::notification;
use crate::order::{Order, OrderKind};
use crate::page::Page;
use crate::poll::{Poll, poll_until};
use crate::portfolio::{self, ActiveOrder, LocateInventoryEntry, Position};
use crate::submit::{self, OrderOutcome};
use crate::timing::{MarketHours, Timing};
use crate::types::{ActiveOrderRef, Quote, Symbol};
use crate::watchlist::Watchlist;

/// Login name and password. The password is wiped from memory on drop.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Authenticating,
    Connected,
    Reconnecting,
    /// Reconnection failed; the session is unusable.
    Fatal,
}

/// How [`Session::ensure_connected`] got the layout back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconnectPath {
    AlreadyConnected,
    LoggedIn,
    Reloaded,
}

/// Builder for [`Session`].
pub struct SessionBuilder<D: DomSession> {
    dom: D,
    credentials: Credentials,
    hide_attributes: bool,
    clock: Box<dyn Clock>,
    cookie_store: Box<dyn CookieStore>,
    timing: Timing,
    market_hours: MarketHours,
    home_url: String,
    watchlist: Watchlist,
}

impl<D: DomSession> SessionBuilder<D> {
    /// Mask account fields in the header after every login.
    pub fn hide_attributes(mut self, hide: bool) -> Self {
        self.hide_attributes = hide;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn cookie_store(mut self, store: impl CookieStore + 'static) -> Self {
        self.cookie_store = Box::new(store);
        self
    }

    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn market_hours(mut self, hours: MarketHours) -> Self {
        self.market_hours = hours;
        self
    }

    pub fn home_url(mut self, url: impl Into<String>) -> Self {
        self.home_url = url.into();
        self
    }

    /// Track `symbol` on the watchlist so reconnects restore it.
    pub fn watch(mut self, symbol: Symbol) -> Self {
        self.watchlist = Watchlist::with_symbols(
            self.watchlist.tracked().iter().cloned().chain([symbol]),
        );
        self
    }

    pub fn build(self) -> Session<D> {
        Session {
            dom: self.dom,
            credentials: self.credentials,
            hide_attributes: self.hide_attributes,
            clock: self.clock,
            cookie_store: self.cookie_store,
            timing: self.timing,
            market_hours: self.market_hours,
            home_url: self.home_url,
            watchlist: self.watchlist,
            state: ConnectionState::Disconnected,
        }
    }
}

/// A logged-in (or logging-in) browser session on the trading platform.
pub struct Session<D: DomSession> {
    dom: D,
    credentials: Credentials,
    hide_attributes: bool,
    clock: Box<dyn Clock>,
    cookie_store: Box<dyn CookieStore>,
    timing: Timing,
    market_hours: MarketHours,
    home_url: String,
    watchlist: Watchlist,
    state: ConnectionState,
}

impl<D: DomSession> Session<D> {
    pub fn builder(dom: D, credentials: Credentials) -> SessionBuilder<D> {
        SessionBuilder {
            dom,
            credentials,
            hide_attributes: false,
            clock: Box::new(SystemClock),
            cookie_store: Box::new(MemoryCookieStore::new()),
            timing: Timing::default(),
            market_hours: MarketHours::default(),
            home_url: ids::HOME_URL.to_string(),
            watchlist: Watchlist::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn market_hours(&self) -> &MarketHours {
        &self.market_hours
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn page(&mut self) -> Page<'_> {
        Page::new(&mut self.dom, self.clock.as_ref(), &self.timing)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Load the home page and install saved cookies.
    ///
    /// Cookie problems are logged, never fatal.
    pub fn open(&mut self) -> Result<()> {
        self.dom.navigate(&self.home_url)?;
        match self.cookie_store.load() {
            Ok(Some(cookies)) if !cookies.is_empty() => match self.dom.add_cookies(&cookies) {
                Ok(()) => debug!("restored {} cookie(s)", cookies.len()),
                Err(e) => warn!("error loading cookies: {e}"),
            },
            Ok(_) => debug!("no saved cookies"),
            Err(e) => warn!("error loading cookies: {e}"),
        }
        Ok(())
    }

    /// Single probe for the authenticated layout.
    pub fn is_connected(&mut self) -> bool {
        self.dom
            .has_marker(&ids::layout_marker(), ids::LAYOUT_MARKER_TEXT)
    }

    fn wait_for_layout(&mut self) -> Result<()> {
        let attempts = self.timing.login_attempts;
        let interval = self.timing.login_interval();
        let marker = ids::layout_marker();
        let dom = &mut self.dom;
        poll_until(self.clock.as_ref(), "trading layout", attempts, interval, |_| {
            Ok(if dom.has_marker(&marker, ids::LAYOUT_MARKER_TEXT) {
                Poll::Ready(())
            } else {
                Poll::Pending
            })
        })
    }

    fn mask_account(&mut self) -> Result<()> {
        if self.hide_attributes {
            account::hide_attributes(&mut self.page())?;
        }
        Ok(())
    }

    fn save_cookies(&mut self) {
        let saved = self
            .dom
            .cookies()
            .map_err(Error::from)
            .and_then(|cookies| self.cookie_store.save(&cookies));
        if let Err(e) = saved {
            warn!("error saving cookies: {e}");
        }
    }

    /// Submit credentials and wait for the trading layout.
    pub fn login(&mut self) -> Result<()> {
        self.state = ConnectionState::Authenticating;
        match self.try_login() {
            Ok(()) => {
                self.state = ConnectionState::Connected;
                info!("logged in as {}", self.credentials.username);
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    fn try_login(&mut self) -> Result<()> {
        let user = ids::id(ids::LOGIN_USER);
        let password = ids::id(ids::LOGIN_PASSWORD);
        self.dom.type_into(&user, &self.credentials.username, false)?;
        self.dom
            .type_into(&password, self.credentials.password.as_str(), true)?;

        self.wait_for_layout()?;
        self.mask_account()?;
        self.clock.sleep(self.timing.settle());
        self.dom.select_option(
            &ids::id(ids::ORDER_TYPE_SELECT),
            &SelectBy::Index(OrderKind::Limit { price: 0.0 }.dropdown_index()),
        )?;
        self.save_cookies();
        Ok(())
    }

    /// Make sure the trading layout is up, logging in or reloading if not.
    ///
    /// When the layout is already rendered this costs one probe and nothing
    /// else. After a successful reconnect the watchlist is restored.
    pub fn ensure_connected(&mut self) -> Result<ReconnectPath> {
        if self.is_connected() {
            self.state = ConnectionState::Connected;
            return Ok(ReconnectPath::AlreadyConnected);
        }

        self.state = ConnectionState::Reconnecting;
        let path = match self.reconnect() {
            Ok(path) => path,
            Err(e) => {
                self.state = ConnectionState::Fatal;
                return Err(match e {
                    Error::Timeout { .. } => Error::ReconnectExhausted,
                    other => other,
                });
            }
        };

        let watchlist = &self.watchlist;
        let mut page = Page::new(&mut self.dom, self.clock.as_ref(), &self.timing);
        if let Err(e) = watchlist.restore(&mut page) {
            warn!("watchlist restore failed: {e}");
        }

        self.state = ConnectionState::Connected;
        info!("reconnected ({path:?})");
        Ok(path)
    }

    fn reconnect(&mut self) -> Result<ReconnectPath> {
        if self.dom.find_text(&ids::id(ids::LOGIN_USER)).is_ok() {
            self.login()?;
            return Ok(ReconnectPath::LoggedIn);
        }
        debug!("login form absent, reloading home page");
        self.dom.navigate(&self.home_url)?;
        self.wait_for_layout()?;
        self.mask_account()?;
        Ok(ReconnectPath::Reloaded)
    }

    /// Close the window and end the browser session.
    ///
    /// A window that is already gone is not an error; the driver is told to
    /// quit regardless.
    pub fn close(mut self) -> Result<()> {
        if let Err(e) = self.dom.close_window() {
            debug!("close window: {e}");
        }
        self.state = ConnectionState::Disconnected;
        self.dom.quit()?;
        info!("session closed");
        Ok(())
    }

    // ========================================================================
    // Quotes
    // ========================================================================

    pub fn load_symbol(&mut self, symbol: &Symbol) -> Result<LoadResult> {
        loader::load_symbol(&mut self.page(), symbol)
    }

    pub fn current_symbol(&mut self) -> Result<Symbol> {
        loader::current_symbol(&mut self.page())
    }

    pub fn quote(&mut self, symbol: &Symbol) -> Result<Quote> {
        market_data::quote(&mut self.page(), symbol)
    }

    pub fn bid(&mut self) -> Result<f64> {
        market_data::bid(&mut self.page())
    }

    pub fn ask(&mut self) -> Result<f64> {
        market_data::ask(&mut self.page())
    }

    pub fn last(&mut self) -> Result<f64> {
        market_data::last(&mut self.page())
    }

    pub fn order_quantity(
        &mut self,
        symbol: &Symbol,
        buying_power: f64,
        fractional: bool,
    ) -> Result<Option<f64>> {
        market_data::order_quantity(&mut self.page(), symbol, buying_power, fractional)
    }

    // ========================================================================
    // Orders and locates
    // ========================================================================

    pub fn submit_order(&mut self, order: &Order) -> Result<OrderOutcome> {
        let hours = self.market_hours;
        submit::submit_order(&mut self.page(), order, &hours)
    }

    pub fn clear_popups(&mut self) -> Result<bool> {
        submit::clear_popups(&mut self.page())
    }

    pub fn locate(&mut self, symbol: &Symbol, shares: u32, max_price: f64) -> Result<LocateResult> {
        locate::locate(&mut self.page(), symbol, shares, max_price)
    }

    pub fn credit_locates(&mut self, symbol: &Symbol, quantity: Option<u32>) -> Result<()> {
        locate::credit_locates(&mut self.page(), symbol, quantity)
    }

    // ========================================================================
    // Portfolio
    // ========================================================================

    pub fn positions(&mut self) -> Result<Vec<Position>> {
        portfolio::positions(&mut self.page())
    }

    pub fn intraday_positions(&mut self) -> Result<Vec<Position>> {
        portfolio::intraday_positions(&mut self.page())
    }

    pub fn invested(&mut self, symbol: &Symbol) -> Result<bool> {
        portfolio::invested(&mut self.page(), symbol)
    }

    pub fn active_orders(&mut self) -> Result<Vec<ActiveOrder>> {
        portfolio::active_orders(&mut self.page())
    }

    pub fn symbol_in_active_orders(&mut self, symbol: &Symbol) -> Result<bool> {
        portfolio::symbol_in_active_orders(&mut self.page(), symbol)
    }

    pub fn active_order_refs(&mut self, symbol: &Symbol) -> Result<Vec<ActiveOrderRef>> {
        portfolio::active_order_refs(&mut self.page(), symbol)
    }

    pub fn cancel_active_orders(
        &mut self,
        symbol: &Symbol,
        refs: &[ActiveOrderRef],
    ) -> Result<usize> {
        portfolio::cancel_active_orders(&mut self.page(), symbol, refs)
    }

    pub fn locate_inventory(&mut self) -> Result<Vec<LocateInventoryEntry>> {
        portfolio::locate_inventory(&mut self.page())
    }

    // ========================================================================
    // Notifications, account, watchlist
    // ========================================================================

    pub fn last_notification_message(&mut self) -> Result<String> {
        notification::last_notification_message(&mut self.page())
    }

    pub fn notifications(&mut self) -> Result<Vec<String>> {
        notification::notifications(&mut self.page())
    }

    pub fn hide_attributes(&mut self) -> Result<usize> {
        account::hide_attributes(&mut self.page())
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn watch(&mut self, symbol: &Symbol) -> Result<()> {
        let mut page = Page::new(&mut self.dom, self.clock.as_ref(), &self.timing);
        self.watchlist.add(&mut page, symbol)
    }

    pub fn unwatch(&mut self, symbol: &Symbol) -> Result<()> {
        let mut page = Page::new(&mut self.dom, self.clock.as_ref(), &self.timing);
        self.watchlist.remove(&mut page, symbol)
    }

    pub fn restore_watchlist(&mut self) -> Result<usize> {
        let mut page = Page::new(&mut self.dom, self.clock.as_ref(), &self.timing);
        self.watchlist.restore(&mut page)
    }
}
