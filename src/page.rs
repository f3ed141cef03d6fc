//! Per-call view of the page: the borrowed DOM session plus pacing.

use std::time::Duration;

use crate::clock::Clock;
use crate::dom::{DomSession, Locator, SelectBy};
use crate::error::{Error, Result};
use crate::timing::Timing;

/// Parse a rendered number such as `"1,234.50"`.
///
/// Returns `None` for empty, non-numeric or non-finite text.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Everything a workflow step needs, borrowed for the length of one call.
pub struct Page<'a> {
    dom: &'a mut dyn DomSession,
    clock: &'a dyn Clock,
    timing: &'a Timing,
}

impl<'a> Page<'a> {
    pub fn new(dom: &'a mut dyn DomSession, clock: &'a dyn Clock, timing: &'a Timing) -> Self {
        Self { dom, clock, timing }
    }

    #[inline]
    pub fn clock(&self) -> &'a dyn Clock {
        self.clock
    }

    #[inline]
    pub fn timing(&self) -> &'a Timing {
        self.timing
    }

    #[inline]
    pub fn dom(&mut self) -> &mut dyn DomSession {
        &mut *self.dom
    }

    pub fn sleep(&self, d: Duration) {
        self.clock.sleep(d);
    }

    /// Trimmed text of an element.
    pub fn text(&mut self, locator: &Locator) -> Result<String> {
        Ok(self.dom.find_text(locator)?.trim().to_string())
    }

    pub fn texts(&mut self, locator: &Locator) -> Result<Vec<String>> {
        Ok(self
            .dom
            .find_all_text(locator)?
            .into_iter()
            .map(|t| t.trim().to_string())
            .collect())
    }

    /// Text of an element that must render a number.
    pub fn number(&mut self, locator: &Locator) -> Result<f64> {
        let text = self.text(locator)?;
        parse_number(&text).ok_or_else(|| Error::UnexpectedText {
            locator: locator.clone(),
            text,
        })
    }

    /// Like [`Page::number`] but empty or non-numeric text is `None`.
    pub fn maybe_number(&mut self, locator: &Locator) -> Result<Option<f64>> {
        let text = self.text(locator)?;
        Ok(parse_number(&text))
    }

    pub fn click(&mut self, locator: &Locator) -> Result<()> {
        Ok(self.dom.click(locator)?)
    }

    pub fn type_into(&mut self, locator: &Locator, text: &str, submit: bool) -> Result<()> {
        Ok(self.dom.type_into(locator, text, submit)?)
    }

    pub fn select(&mut self, locator: &Locator, option: SelectBy) -> Result<()> {
        Ok(self.dom.select_option(locator, &option)?)
    }

    pub fn table_rows(&mut self, locator: &Locator) -> Result<Vec<Vec<String>>> {
        Ok(self.dom.table_rows(locator)?)
    }

    pub fn has_marker(&mut self, locator: &Locator, text: &str) -> bool {
        self.dom.has_marker(locator, text)
    }

    /// Reborrow for a nested step.
    pub fn reborrow(&mut self) -> Page<'_> {
        Page {
            dom: &mut *self.dom,
            clock: self.clock,
            timing: self.timing,
        }
    }
}
