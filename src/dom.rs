//! The DOM session port: everything the workflows need from a live browser page.
//!
//! Implementations own the browser (see the `tzweb-webdriver` crate); the
//! workflows only borrow a `&mut dyn DomSession` for the duration of one call
//! and never hold element handles across calls.

use std::fmt;

use crate::error::DomError;

/// Result alias for port calls.
pub type DomResult<T> = std::result::Result<T, DomError>;

/// How to find an element on the page.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Match on the `id` attribute.
    Id(String),
    /// Match with an XPath expression.
    XPath(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }
}

/// XPath string literal for `text`, quoting with whichever quote it lacks.
///
/// Text holding both quote kinds becomes a `concat(...)` expression.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('"') {
        format!("\"{text}\"")
    } else if !text.contains('\'') {
        format!("'{text}'")
    } else {
        let parts: Vec<String> = text.split('"').map(|p| format!("\"{p}\"")).collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "#{id}"),
            Locator::XPath(expr) => write!(f, "xpath:{expr}"),
        }
    }
}

/// Which `<option>` of a `<select>` to pick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectBy {
    /// Zero-based position in the dropdown.
    Index(usize),
    /// Exact visible label.
    Label(String),
}

impl fmt::Display for SelectBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectBy::Index(i) => write!(f, "index {i}"),
            SelectBy::Label(label) => write!(f, "label {label:?}"),
        }
    }
}

/// A browser cookie, passed through opaquely between the page and a
/// [`CookieStore`](crate::cookies::CookieStore).
///
/// Field names follow the WebDriver cookie object so the list can be handed
/// straight back to the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub path: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub domain: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub secure: Option<bool>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "httpOnly", default, skip_serializing_if = "Option::is_none")
    )]
    pub http_only: Option<bool>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub expiry: Option<u64>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "sameSite", default, skip_serializing_if = "Option::is_none")
    )]
    pub same_site: Option<String>,
}

impl Cookie {
    /// A session cookie with only a name and value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            secure: None,
            http_only: None,
            expiry: None,
            same_site: None,
        }
    }
}

/// A live page that can be read and driven.
///
/// Every call is synchronous and may fail with [`DomError`]. A missing element
/// is [`DomError::NotFound`]; an element that disappeared between lookup and use
/// is [`DomError::Stale`], which polling loops treat as transient.
pub trait DomSession {
    /// Load a URL in the current window.
    fn navigate(&mut self, url: &str) -> DomResult<()>;

    /// Reload the current page.
    ///
    /// None of the built-in workflows call this: reconnecting navigates to the
    /// home URL instead, since the current page may be an error page. It is
    /// here for callers driving the page directly.
    fn reload(&mut self) -> DomResult<()>;

    /// Rendered text of the first element matching `locator`.
    fn find_text(&mut self, locator: &Locator) -> DomResult<String>;

    /// Rendered text of every element matching `locator`; empty if none match.
    fn find_all_text(&mut self, locator: &Locator) -> DomResult<Vec<String>>;

    /// Cell texts of every body row of the table matching `locator`.
    fn table_rows(&mut self, locator: &Locator) -> DomResult<Vec<Vec<String>>>;

    /// Click the first element matching `locator`.
    fn click(&mut self, locator: &Locator) -> DomResult<()>;

    /// Replace the content of an input with `text`, optionally pressing Enter.
    fn type_into(&mut self, locator: &Locator, text: &str, submit: bool) -> DomResult<()>;

    /// Pick an option of the `<select>` matching `locator`.
    fn select_option(&mut self, locator: &Locator, option: &SelectBy) -> DomResult<()>;

    /// Hide an element from view without removing it from the page.
    fn hide(&mut self, locator: &Locator) -> DomResult<()>;

    /// All cookies visible to the current page.
    fn cookies(&mut self) -> DomResult<Vec<Cookie>>;

    /// Install cookies into the current page's domain.
    fn add_cookies(&mut self, cookies: &[Cookie]) -> DomResult<()>;

    /// Close the browser window. Fails if it is already gone.
    fn close_window(&mut self) -> DomResult<()>;

    /// End the browser session and terminate its process.
    fn quit(&mut self) -> DomResult<()>;

    /// True when any element matching `locator` renders exactly `text`.
    ///
    /// Lookup failures count as "not present".
    fn has_marker(&mut self, locator: &Locator, text: &str) -> bool {
        self.find_all_text(locator)
            .map(|texts| texts.iter().any(|t| t.trim() == text))
            .unwrap_or(false)
    }
}
