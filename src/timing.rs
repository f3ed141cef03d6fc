//! Poll budgets, pacing delays and the regular trading session.

use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};

/// Attempt counts and intervals for every wait in the workflows.
///
/// Intervals are milliseconds so the struct maps one-to-one onto a config
/// table. Defaults are the pacing the platform is known to tolerate.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Timing {
    /// Waits for the authenticated layout after login or reload.
    pub login_attempts: u32,
    pub login_interval_ms: u64,

    /// Waits for the ask field after a symbol lookup.
    pub quote_attempts: u32,
    pub quote_interval_ms: u64,
    /// Early attempts (0-based) at which the notification feed is checked
    /// for "Symbol not found". The last attempt is always checked.
    pub not_found_checkpoints: Vec<u32>,
    /// Pause between submitting a symbol and the first ask read.
    pub symbol_submit_delay_ms: u64,

    /// Waits for the locate status field.
    pub locate_status_attempts: u32,
    pub locate_status_interval_ms: u64,
    /// Waits for the first locate offer row.
    pub locate_offer_attempts: u32,
    pub locate_offer_interval_ms: u64,

    /// Wait before looking for the short-locate popup.
    pub popup_wait_ms: u64,
    /// Pause after login before touching the order form.
    pub settle_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            login_attempts: 150,
            login_interval_ms: 500,
            quote_attempts: 300,
            quote_interval_ms: 10,
            not_found_checkpoints: vec![15],
            symbol_submit_delay_ms: 40,
            locate_status_attempts: 300,
            locate_status_interval_ms: 100,
            locate_offer_attempts: 300,
            locate_offer_interval_ms: 150,
            popup_wait_ms: 1000,
            settle_ms: 300,
        }
    }
}

impl Timing {
    /// Every wait collapsed to a single attempt with no delay.
    pub fn immediate() -> Self {
        Self {
            login_attempts: 1,
            login_interval_ms: 0,
            quote_attempts: 1,
            quote_interval_ms: 0,
            not_found_checkpoints: Vec::new(),
            symbol_submit_delay_ms: 0,
            locate_status_attempts: 1,
            locate_status_interval_ms: 0,
            locate_offer_attempts: 1,
            locate_offer_interval_ms: 0,
            popup_wait_ms: 0,
            settle_ms: 0,
        }
    }

    pub fn login_interval(&self) -> Duration {
        Duration::from_millis(self.login_interval_ms)
    }

    pub fn quote_interval(&self) -> Duration {
        Duration::from_millis(self.quote_interval_ms)
    }

    pub fn symbol_submit_delay(&self) -> Duration {
        Duration::from_millis(self.symbol_submit_delay_ms)
    }

    pub fn locate_status_interval(&self) -> Duration {
        Duration::from_millis(self.locate_status_interval_ms)
    }

    pub fn locate_offer_interval(&self) -> Duration {
        Duration::from_millis(self.locate_offer_interval_ms)
    }

    pub fn popup_wait(&self) -> Duration {
        Duration::from_millis(self.popup_wait_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// True if attempt `n` (0-based) of the quote poll should consult the
    /// notification feed.
    #[inline]
    pub fn is_not_found_checkpoint(&self, n: u32) -> bool {
        self.quote_attempts.checked_sub(1) == Some(n) || self.not_found_checkpoints.contains(&n)
    }

    /// Check that every budget allows at least one attempt.
    pub fn validate(&self) -> Result<(), String> {
        let budgets = [
            ("login_attempts", self.login_attempts),
            ("quote_attempts", self.quote_attempts),
            ("locate_status_attempts", self.locate_status_attempts),
            ("locate_offer_attempts", self.locate_offer_attempts),
        ];
        for (name, n) in budgets {
            if n == 0 {
                return Err(format!("timing.{name} must be at least 1"));
            }
        }
        if let Some(n) = self
            .not_found_checkpoints
            .iter()
            .find(|&&n| n >= self.quote_attempts)
        {
            return Err(format!(
                "timing.not_found_checkpoints: {n} is past the last quote attempt ({})",
                self.quote_attempts - 1
            ));
        }
        Ok(())
    }
}

/// The regular session during which market and stop-market orders are allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarketHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for MarketHours {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl MarketHours {
    /// Half-open: the opening minute counts, 16:00:00 does not.
    pub fn contains(&self, at: NaiveTime) -> bool {
        self.open <= at && at < self.close
    }

    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        self.contains(now.time())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.open >= self.close {
            return Err(format!(
                "market_hours.open ({}) must be before market_hours.close ({})",
                self.open, self.close
            ));
        }
        Ok(())
    }
}
