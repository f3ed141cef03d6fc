//! Bounded polling against DOM state that settles asynchronously.
//!
//! Every wait in the workflows is a fixed number of probes separated by a
//! fixed sleep. A probe either finishes the wait, asks for another attempt, or
//! fails. Stale-element failures are retried inside the budget; any other
//! failure ends the wait immediately.

use std::time::Duration;

use log::debug;

use crate::clock::Clock;
use crate::error::{Error, Result};

/// Outcome of a single probe.
#[derive(Clone, Debug, PartialEq)]
pub enum Poll<T> {
    /// The wait is over.
    Ready(T),
    /// Not there yet; probe again after the interval.
    Pending,
}

/// Run `probe` up to `max_attempts` times, sleeping `interval` between attempts.
///
/// The probe receives the 0-based attempt number. There is no sleep after the
/// last attempt. Exhausting the budget gives [`Error::Timeout`] naming `what`.
pub fn poll_until<T, F>(
    clock: &dyn Clock,
    what: &str,
    max_attempts: u32,
    interval: Duration,
    mut probe: F,
) -> Result<T>
where
    F: FnMut(u32) -> Result<Poll<T>>,
{
    for attempt in 0..max_attempts {
        match probe(attempt) {
            Ok(Poll::Ready(value)) => {
                debug!("{what}: ready after {} attempt(s)", attempt + 1);
                return Ok(value);
            }
            Ok(Poll::Pending) => {}
            Err(e) if e.is_transient() => {
                debug!("{what}: attempt {attempt} hit {e}, retrying");
            }
            Err(e) => return Err(e),
        }
        if attempt + 1 < max_attempts {
            clock.sleep(interval);
        }
    }
    Err(Error::Timeout {
        what: what.to_string(),
        attempts: max_attempts,
    })
}
