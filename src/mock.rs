//! Scripted DOM session and manual clock for tests.
//!
//! `MockDom` answers reads from per-locator scripts and records every
//! mutating call, so a test can drive a full workflow and then assert on what
//! was clicked and typed. Elements must be declared; acting on an undeclared
//! element fails with [`DomError::NotFound`] like a real page would.
//!
//! ```
//! use tzweb::mock::MockDom;
//! use tzweb::dom::{DomSession, Locator};
//!
//! let mut dom = MockDom::builder()
//!     .text_seq("trading-order-ask", ["", "", "12.34"])
//!     .element("trading-order-input-symbol")
//!     .build();
//!
//! let ask = Locator::id("trading-order-ask");
//! assert_eq!(dom.find_text(&ask).unwrap(), "");
//! assert_eq!(dom.find_text(&ask).unwrap(), "");
//! assert_eq!(dom.find_text(&ask).unwrap(), "12.34");
//! // The last reading sticks.
//! assert_eq!(dom.find_text(&ask).unwrap(), "12.34");
//! assert_eq!(dom.reads(&ask), 4);
//! ```

use std::cell::Cell;
use std::collections::VecDeque;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::clock::Clock;
use crate::dom::{Cookie, DomResult, DomSession, Locator, SelectBy};
use crate::error::DomError;
use crate::ids;

/// A mutating call recorded by [`MockDom`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomAction {
    Navigate(String),
    Reload,
    Click(Locator),
    Type {
        locator: Locator,
        text: String,
        submit: bool,
    },
    Select {
        locator: Locator,
        option: SelectBy,
    },
    Hide(Locator),
    AddCookies(usize),
    CloseWindow,
    Quit,
}

/// Queue of readings; the last one is returned forever once reached.
#[derive(Clone, Debug)]
struct Script<T>(VecDeque<DomResult<T>>);

impl<T: Clone> Script<T> {
    fn next(&mut self) -> Option<DomResult<T>> {
        if self.0.len() > 1 {
            self.0.pop_front()
        } else {
            self.0.front().cloned()
        }
    }
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Script(VecDeque::new())
    }
}

/// Builder for [`MockDom`].
#[derive(Default)]
pub struct MockDomBuilder {
    elements: FxHashSet<Locator>,
    texts: FxHashMap<Locator, Script<String>>,
    lists: FxHashMap<Locator, Script<Vec<String>>>,
    tables: FxHashMap<Locator, Vec<Vec<String>>>,
    click_failures: FxHashMap<Locator, DomError>,
    cookies: Vec<Cookie>,
    window_closed: bool,
}

impl MockDomBuilder {
    /// Declare an element by id so it can be clicked, typed into or hidden.
    pub fn element(self, id: &str) -> Self {
        self.element_at(Locator::id(id))
    }

    pub fn element_at(mut self, locator: Locator) -> Self {
        self.elements.insert(locator);
        self
    }

    /// Every order-entry, quote and locate control of the trading layout.
    pub fn trading_layout(mut self) -> Self {
        for id in [
            ids::SYMBOL_INPUT,
            ids::ORDER_TYPE_SELECT,
            ids::ORDER_TIF_SELECT,
            ids::ORDER_QUANTITY,
            ids::ORDER_PRICE,
            ids::ORDER_STOP_PRICE,
            ids::LOCATE_TAB,
            ids::LOCATE_SYMBOL,
            ids::LOCATE_SHARES,
            ids::LOCATE_BUTTON,
            ids::POSITIONS_TAB,
            ids::ACTIVE_ORDERS_TAB,
            ids::WATCHLIST_INPUT,
        ] {
            self.elements.insert(Locator::id(id));
        }
        for d in crate::direction::Direction::ALL {
            self.elements.insert(ids::submit_button(d));
        }
        self
    }

    /// A single sticky text reading.
    pub fn text(self, id: &str, text: &str) -> Self {
        self.text_seq(id, [text])
    }

    /// Successive text readings; the last one sticks.
    pub fn text_seq<'s>(self, id: &str, texts: impl IntoIterator<Item = &'s str>) -> Self {
        self.text_seq_at(Locator::id(id), texts)
    }

    pub fn text_at(self, locator: Locator, text: &str) -> Self {
        self.text_seq_at(locator, [text])
    }

    pub fn text_seq_at<'s>(
        mut self,
        locator: Locator,
        texts: impl IntoIterator<Item = &'s str>,
    ) -> Self {
        let script = self.texts.entry(locator).or_default();
        script.0.extend(texts.into_iter().map(|t| Ok(t.to_string())));
        self
    }

    /// Append a failing read to an element's script.
    pub fn read_error(mut self, locator: Locator, err: DomError) -> Self {
        self.texts.entry(locator).or_default().0.push_back(Err(err));
        self
    }

    /// A single sticky `find_all_text` answer.
    pub fn list(self, locator: Locator, items: &[&str]) -> Self {
        self.list_seq(locator, [items.to_vec()])
    }

    /// Successive `find_all_text` answers; the last one sticks.
    pub fn list_seq<'s>(
        mut self,
        locator: Locator,
        answers: impl IntoIterator<Item = Vec<&'s str>>,
    ) -> Self {
        let script = self.lists.entry(locator).or_default();
        script.0.extend(
            answers
                .into_iter()
                .map(|items| Ok(items.into_iter().map(str::to_string).collect())),
        );
        self
    }

    pub fn table(mut self, id: &str, rows: Vec<Vec<&str>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect();
        self.tables.insert(Locator::id(id), rows);
        self
    }

    /// Make every click on `locator` fail with `err`.
    pub fn fail_click(mut self, locator: Locator, err: DomError) -> Self {
        self.click_failures.insert(locator, err);
        self
    }

    pub fn cookies(mut self, cookies: Vec<Cookie>) -> Self {
        self.cookies = cookies;
        self
    }

    /// The window is already gone: `close_window` fails.
    pub fn window_closed(mut self) -> Self {
        self.window_closed = true;
        self
    }

    pub fn build(self) -> MockDom {
        MockDom {
            elements: self.elements,
            texts: self.texts,
            lists: self.lists,
            tables: self.tables,
            click_failures: self.click_failures,
            cookies: self.cookies,
            window_closed: self.window_closed,
            quit: false,
            actions: Vec::new(),
            reads: FxHashMap::default(),
        }
    }
}

/// A scripted in-memory page.
pub struct MockDom {
    elements: FxHashSet<Locator>,
    texts: FxHashMap<Locator, Script<String>>,
    lists: FxHashMap<Locator, Script<Vec<String>>>,
    tables: FxHashMap<Locator, Vec<Vec<String>>>,
    click_failures: FxHashMap<Locator, DomError>,
    cookies: Vec<Cookie>,
    window_closed: bool,
    quit: bool,
    actions: Vec<DomAction>,
    reads: FxHashMap<Locator, u32>,
}

impl MockDom {
    pub fn builder() -> MockDomBuilder {
        MockDomBuilder::default()
    }

    /// Every mutating call, in order.
    pub fn actions(&self) -> &[DomAction] {
        &self.actions
    }

    /// Locators that were clicked, in order.
    pub fn clicks(&self) -> Vec<&Locator> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                DomAction::Click(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    pub fn was_clicked(&self, locator: &Locator) -> bool {
        self.clicks().contains(&locator)
    }

    /// Last text typed into `locator`.
    pub fn typed(&self, locator: &Locator) -> Option<&str> {
        self.actions.iter().rev().find_map(|a| match a {
            DomAction::Type {
                locator: l, text, ..
            } if l == locator => Some(text.as_str()),
            _ => None,
        })
    }

    /// Options selected in `locator`, in order.
    pub fn selections(&self, locator: &Locator) -> Vec<&SelectBy> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                DomAction::Select { locator: l, option } if l == locator => Some(option),
                _ => None,
            })
            .collect()
    }

    /// Number of read calls made against `locator`.
    pub fn reads(&self, locator: &Locator) -> u32 {
        self.reads.get(locator).copied().unwrap_or(0)
    }

    /// Number of read calls across all locators.
    pub fn total_reads(&self) -> u32 {
        self.reads.values().sum()
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    fn check_open(&self) -> DomResult<()> {
        if self.quit {
            return Err(DomError::Closed);
        }
        Ok(())
    }

    fn is_declared(&self, locator: &Locator) -> bool {
        self.elements.contains(locator)
            || self.texts.contains_key(locator)
            || self.tables.contains_key(locator)
    }

    fn require(&self, locator: &Locator) -> DomResult<()> {
        self.check_open()?;
        if self.is_declared(locator) {
            Ok(())
        } else {
            Err(DomError::NotFound(locator.clone()))
        }
    }

    fn count_read(&mut self, locator: &Locator) {
        *self.reads.entry(locator.clone()).or_insert(0) += 1;
    }
}

impl DomSession for MockDom {
    fn navigate(&mut self, url: &str) -> DomResult<()> {
        self.check_open()?;
        self.actions.push(DomAction::Navigate(url.to_string()));
        Ok(())
    }

    fn reload(&mut self) -> DomResult<()> {
        self.check_open()?;
        self.actions.push(DomAction::Reload);
        Ok(())
    }

    fn find_text(&mut self, locator: &Locator) -> DomResult<String> {
        self.check_open()?;
        self.count_read(locator);
        match self.texts.get_mut(locator).and_then(Script::next) {
            Some(reading) => reading,
            None => Err(DomError::NotFound(locator.clone())),
        }
    }

    fn find_all_text(&mut self, locator: &Locator) -> DomResult<Vec<String>> {
        self.check_open()?;
        self.count_read(locator);
        match self.lists.get_mut(locator).and_then(Script::next) {
            Some(reading) => reading,
            None => Ok(Vec::new()),
        }
    }

    fn table_rows(&mut self, locator: &Locator) -> DomResult<Vec<Vec<String>>> {
        self.check_open()?;
        self.count_read(locator);
        self.tables
            .get(locator)
            .cloned()
            .ok_or_else(|| DomError::NotFound(locator.clone()))
    }

    fn click(&mut self, locator: &Locator) -> DomResult<()> {
        if let Some(err) = self.click_failures.get(locator) {
            return Err(err.clone());
        }
        self.require(locator)?;
        self.actions.push(DomAction::Click(locator.clone()));
        Ok(())
    }

    fn type_into(&mut self, locator: &Locator, text: &str, submit: bool) -> DomResult<()> {
        self.require(locator)?;
        self.actions.push(DomAction::Type {
            locator: locator.clone(),
            text: text.to_string(),
            submit,
        });
        Ok(())
    }

    fn select_option(&mut self, locator: &Locator, option: &SelectBy) -> DomResult<()> {
        self.require(locator)?;
        self.actions.push(DomAction::Select {
            locator: locator.clone(),
            option: option.clone(),
        });
        Ok(())
    }

    fn hide(&mut self, locator: &Locator) -> DomResult<()> {
        self.require(locator)?;
        self.actions.push(DomAction::Hide(locator.clone()));
        Ok(())
    }

    fn cookies(&mut self) -> DomResult<Vec<Cookie>> {
        self.check_open()?;
        Ok(self.cookies.clone())
    }

    fn add_cookies(&mut self, cookies: &[Cookie]) -> DomResult<()> {
        self.check_open()?;
        self.actions.push(DomAction::AddCookies(cookies.len()));
        self.cookies.extend_from_slice(cookies);
        Ok(())
    }

    fn close_window(&mut self) -> DomResult<()> {
        self.check_open()?;
        if self.window_closed {
            return Err(DomError::Closed);
        }
        self.window_closed = true;
        self.actions.push(DomAction::CloseWindow);
        Ok(())
    }

    fn quit(&mut self) -> DomResult<()> {
        self.check_open()?;
        self.quit = true;
        self.actions.push(DomAction::Quit);
        Ok(())
    }
}

/// A clock whose time only moves when something sleeps on it.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<NaiveDateTime>,
    slept: Cell<Duration>,
    sleeps: Cell<u32>,
}

impl Default for ManualClock {
    /// A weekday at 10:00, inside regular hours.
    fn default() -> Self {
        Self::at(10, 0, 0)
    }
}

impl ManualClock {
    /// A clock set to the given time of day on a fixed weekday.
    pub fn at(hour: u32, min: u32, sec: u32) -> Self {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap_or_default();
        let time = NaiveTime::from_hms_opt(hour, min, sec).unwrap_or(NaiveTime::MIN);
        Self::starting(date.and_time(time))
    }

    pub fn starting(now: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
            slept: Cell::new(Duration::ZERO),
            sleeps: Cell::new(0),
        }
    }

    /// Total virtual time spent sleeping.
    pub fn slept(&self) -> Duration {
        self.slept.get()
    }

    /// Number of sleep calls.
    pub fn sleeps(&self) -> u32 {
        self.sleeps.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }

    fn sleep(&self, d: Duration) {
        self.now.set(self.now.get() + d);
        self.slept.set(self.slept.get() + d);
        self.sleeps.set(self.sleeps.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undeclared_elements_are_not_found() {
        let mut dom = MockDom::builder().build();
        let loc = Locator::id("nope");
        assert_eq!(dom.click(&loc), Err(DomError::NotFound(loc.clone())));
        assert_eq!(dom.find_text(&loc), Err(DomError::NotFound(loc.clone())));
        assert!(dom.find_all_text(&loc).unwrap().is_empty());
        assert!(dom.actions().is_empty());
    }

    #[test]
    fn records_actions() {
        let mut dom = MockDom::builder().element("qty").build();
        let loc = Locator::id("qty");
        dom.type_into(&loc, "100", false).unwrap();
        dom.click(&loc).unwrap();
        assert_eq!(dom.typed(&loc), Some("100"));
        assert!(dom.was_clicked(&loc));
        assert_eq!(dom.actions().len(), 2);
    }

    #[test]
    fn reload_is_recorded_until_quit() {
        let mut dom = MockDom::builder().build();
        dom.reload().unwrap();
        assert_eq!(dom.actions(), &[DomAction::Reload]);
        dom.quit().unwrap();
        assert_eq!(dom.reload(), Err(DomError::Closed));
    }

    #[test]
    fn scripted_errors_are_returned_in_order() {
        let loc = Locator::id("ask");
        let mut dom = MockDom::builder()
            .read_error(loc.clone(), DomError::Stale(loc.clone()))
            .text_seq("ask", ["1.00"])
            .build();
        assert_eq!(dom.find_text(&loc), Err(DomError::Stale(loc.clone())));
        assert_eq!(dom.find_text(&loc).unwrap(), "1.00");
    }

    #[test]
    fn close_then_quit() {
        let mut dom = MockDom::builder().build();
        dom.close_window().unwrap();
        assert_eq!(dom.close_window(), Err(DomError::Closed));
        dom.quit().unwrap();
        assert!(dom.is_quit());
        assert_eq!(dom.navigate("x"), Err(DomError::Closed));
    }

    #[test]
    fn manual_clock_advances_on_sleep() {
        let clock = ManualClock::at(9, 29, 59);
        clock.sleep(Duration::from_secs(1));
        assert_eq!(clock.now().time(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(clock.slept(), Duration::from_secs(1));
        assert_eq!(clock.sleeps(), 1);
    }
}
