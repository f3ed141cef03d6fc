//! The platform's notification feed.

use crate::error::Result;
use crate::ids;
use crate::page::Page;

/// Every notification message currently rendered, oldest first.
pub fn notifications(page: &mut Page<'_>) -> Result<Vec<String>> {
    page.texts(&crate::dom::Locator::xpath(ids::NOTIFICATION_MESSAGES_XPATH))
}

/// The most recent notification, or `""` when the feed is empty.
pub fn last_notification_message(page: &mut Page<'_>) -> Result<String> {
    Ok(notifications(page)?.pop().unwrap_or_default())
}

/// The message the platform shows after looking up an unknown ticker.
pub fn symbol_not_found_message(symbol: &crate::types::Symbol) -> String {
    format!("Symbol not found: {symbol}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Locator;
    use crate::mock::{ManualClock, MockDom};
    use crate::timing::Timing;
    use crate::types::Symbol;

    #[test]
    fn last_message() {
        let mut dom = MockDom::builder()
            .list(
                Locator::xpath(ids::NOTIFICATION_MESSAGES_XPATH),
                &["Order placed", " Symbol not found: XYZQ "],
            )
            .build();
        let clock = ManualClock::default();
        let timing = Timing::default();
        let mut page = Page::new(&mut dom, &clock, &timing);
        assert_eq!(
            last_notification_message(&mut page).unwrap(),
            symbol_not_found_message(&Symbol::new("xyzq"))
        );
    }

    #[test]
    fn empty_feed() {
        let mut dom = MockDom::builder().build();
        let clock = ManualClock::default();
        let timing = Timing::default();
        let mut page = Page::new(&mut dom, &clock, &timing);
        assert_eq!(last_notification_message(&mut page).unwrap(), "");
        assert!(notifications(&mut page).unwrap().is_empty());
    }
}
