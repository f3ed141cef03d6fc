//! Wall-clock port used for market-hours checks and poll pacing.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};

/// Source of "now" and of blocking sleeps.
pub trait Clock {
    /// Exchange-local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Block the calling thread for `d`.
    fn sleep(&self, d: Duration);
}

/// The machine clock, assumed to run in exchange-local time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}
