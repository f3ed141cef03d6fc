//! Masking of the account header.

use log::debug;

use crate::error::{DomError, Result};
use crate::ids;
use crate::page::Page;

/// Hide the account name and balance fields in the page header.
///
/// Fields the layout does not render are skipped. Returns how many were
/// hidden.
pub fn hide_attributes(page: &mut Page<'_>) -> Result<usize> {
    let mut hidden = 0;
    for field in ids::ACCOUNT_FIELDS {
        match page.dom().hide(&ids::id(field)) {
            Ok(()) => hidden += 1,
            Err(DomError::NotFound(_)) => debug!("account field {field} not rendered"),
            Err(e) => return Err(e.into()),
        }
    }
    debug!("hid {hidden} account field(s)");
    Ok(hidden)
}
