//! W3C WebDriver implementation of the tzweb DOM session port.
//!
//! [`WebDriverDom`] speaks the WebDriver HTTP protocol to a running driver
//! (geckodriver, chromedriver) and implements [`tzweb::DomSession`] on top of
//! it. The driver can be started and stopped by the adapter itself.
//!
//! ```no_run
//! use tzweb_webdriver::{WebDriverConfig, WebDriverDom};
//!
//! let config = WebDriverConfig {
//!     driver_binary: Some("geckodriver".into()),
//!     headless: true,
//!     ..WebDriverConfig::default()
//! };
//! let dom = WebDriverDom::launch(&config)?;
//! # Ok::<(), tzweb_webdriver::WireError>(())
//! ```

pub mod client;
pub mod dom;
pub mod error;
pub mod process;
pub mod types;

pub use dom::{Browser, WebDriverConfig, WebDriverDom};
pub use error::WireError;
