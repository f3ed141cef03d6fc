//! [`DomSession`] over WebDriver.

use std::path::PathBuf;
use std::str::FromStr;

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Value as Json, json};
use tzweb::dom::{DomResult, xpath_literal};
use tzweb::{Cookie, DomError, DomSession, Locator, SelectBy};

use crate::client::WireClient;
use crate::error::WireError;
use crate::process::DriverProcess;
use crate::types::{ENTER, ElementRef, FindRequest, WindowRect};

const TABLE_ROWS_SCRIPT: &str = "return Array.from(arguments[0].querySelectorAll('tbody tr'))\
    .map(r => Array.from(r.cells).map(c => c.innerText.trim()));";

const HIDE_SCRIPT: &str = "arguments[0].style.visibility = 'hidden';";

/// Which browser the driver should start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Firefox,
    Chrome,
}

impl Browser {
    /// Session capabilities for this browser.
    pub fn capabilities(self, headless: bool, window: &WindowRect) -> Json {
        match self {
            Browser::Firefox => {
                let mut args = vec![
                    format!("--width={}", window.width),
                    format!("--height={}", window.height),
                ];
                if headless {
                    args.push("-headless".to_string());
                }
                json!({ "browserName": "firefox", "moz:firefoxOptions": { "args": args } })
            }
            Browser::Chrome => {
                let mut args = vec![format!("--window-size={},{}", window.width, window.height)];
                if headless {
                    args.push("--headless=new".to_string());
                }
                json!({ "browserName": "chrome", "goog:chromeOptions": { "args": args } })
            }
        }
    }
}

impl FromStr for Browser {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "firefox" | "gecko" => Ok(Browser::Firefox),
            "chrome" | "chromium" => Ok(Browser::Chrome),
            other => Err(WireError::Spawn(format!("unsupported browser: {other}"))),
        }
    }
}

/// How to reach (or start) the driver.
#[derive(Clone, Debug)]
pub struct WebDriverConfig {
    pub browser: Browser,
    /// Driver endpoint when `driver_binary` is not set.
    pub driver_url: String,
    /// Spawn this binary on `port` instead of connecting to `driver_url`.
    pub driver_binary: Option<PathBuf>,
    pub port: u16,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Firefox,
            driver_url: "http://127.0.0.1:4444".to_string(),
            driver_binary: None,
            port: 4444,
            headless: false,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

/// A live browser page reached over WebDriver.
pub struct WebDriverDom {
    client: WireClient,
    driver: Option<DriverProcess>,
    closed: bool,
}

impl WebDriverDom {
    /// Start (if configured) the driver, open a browser session and size the window.
    pub fn launch(config: &WebDriverConfig) -> Result<Self, WireError> {
        let driver = match &config.driver_binary {
            Some(binary) => Some(DriverProcess::spawn(binary, config.port)?),
            None => None,
        };
        let url = driver
            .as_ref()
            .map(DriverProcess::url)
            .unwrap_or_else(|| config.driver_url.clone());

        let mut client = WireClient::new(&url)?;
        let window = WindowRect {
            width: config.window_width,
            height: config.window_height,
        };
        client.new_session(config.browser.capabilities(config.headless, &window))?;
        if let Err(e) = client.set_window_rect(&window) {
            warn!("could not resize window: {e}");
        }
        info!("{:?} session open via {url}", config.browser);

        Ok(Self {
            client,
            driver,
            closed: false,
        })
    }

    fn live(&self) -> DomResult<&WireClient> {
        if self.closed {
            Err(DomError::Closed)
        } else {
            Ok(&self.client)
        }
    }

    fn element(&self, locator: &Locator) -> DomResult<ElementRef> {
        self.live()?
            .find_element(locator)
            .map_err(|e| e.into_dom(Some(locator)))
    }

    fn shutdown(&mut self) -> Result<(), WireError> {
        self.closed = true;
        let result = if self.client.session_id().is_some() {
            // Closing the last window ends the session on most drivers.
            match self.client.delete_session() {
                Err(e) if e.code() == Some("invalid session id") => Ok(()),
                other => other,
            }
        } else {
            Ok(())
        };
        if let Some(mut driver) = self.driver.take() {
            driver.stop();
        }
        result
    }
}

impl DomSession for WebDriverDom {
    fn navigate(&mut self, url: &str) -> DomResult<()> {
        debug!("navigate {url}");
        self.live()?.navigate(url).map_err(|e| e.into_dom(None))
    }

    fn reload(&mut self) -> DomResult<()> {
        self.live()?.refresh().map_err(|e| e.into_dom(None))
    }

    fn find_text(&mut self, locator: &Locator) -> DomResult<String> {
        let el = self.element(locator)?;
        self.live()?
            .element_text(&el)
            .map_err(|e| e.into_dom(Some(locator)))
    }

    fn find_all_text(&mut self, locator: &Locator) -> DomResult<Vec<String>> {
        let client = self.live()?;
        let elements = client
            .find_elements(locator)
            .map_err(|e| e.into_dom(Some(locator)))?;
        elements
            .iter()
            .map(|el| client.element_text(el).map_err(|e| e.into_dom(Some(locator))))
            .collect()
    }

    fn table_rows(&mut self, locator: &Locator) -> DomResult<Vec<Vec<String>>> {
        let table = self.element(locator)?;
        self.live()?
            .execute(TABLE_ROWS_SCRIPT, vec![table.as_arg()])
            .map_err(|e| e.into_dom(Some(locator)))
    }

    fn click(&mut self, locator: &Locator) -> DomResult<()> {
        let el = self.element(locator)?;
        self.live()?
            .element_click(&el)
            .map_err(|e| e.into_dom(Some(locator)))
    }

    fn type_into(&mut self, locator: &Locator, text: &str, submit: bool) -> DomResult<()> {
        let el = self.element(locator)?;
        let client = self.live()?;
        client
            .element_clear(&el)
            .map_err(|e| e.into_dom(Some(locator)))?;
        let mut keys = text.to_string();
        if submit {
            keys.push(ENTER);
        }
        client
            .element_send_keys(&el, &keys)
            .map_err(|e| e.into_dom(Some(locator)))
    }

    fn select_option(&mut self, locator: &Locator, option: &SelectBy) -> DomResult<()> {
        let select = self.element(locator)?;
        let client = self.live()?;
        let request = match option {
            SelectBy::Index(_) => FindRequest::xpath("./option"),
            SelectBy::Label(label) => FindRequest::xpath(format!(
                "./option[normalize-space(.)={}]",
                xpath_literal(label)
            )),
        };
        let options = client
            .find_elements_from(&select, &request)
            .map_err(|e| e.into_dom(Some(locator)))?;
        let target = match option {
            SelectBy::Index(i) => options.get(*i),
            SelectBy::Label(_) => options.first(),
        };
        let target = target.ok_or_else(|| DomError::NotFound(locator.clone()))?;
        client
            .element_click(target)
            .map_err(|e| e.into_dom(Some(locator)))
    }

    fn hide(&mut self, locator: &Locator) -> DomResult<()> {
        let el = self.element(locator)?;
        self.live()?
            .execute::<Json>(HIDE_SCRIPT, vec![el.as_arg()])
            .map(drop)
            .map_err(|e| e.into_dom(Some(locator)))
    }

    fn cookies(&mut self) -> DomResult<Vec<Cookie>> {
        self.live()?.cookies().map_err(|e| e.into_dom(None))
    }

    fn add_cookies(&mut self, cookies: &[Cookie]) -> DomResult<()> {
        let client = self.live()?;
        for cookie in cookies {
            client.add_cookie(cookie).map_err(|e| e.into_dom(None))?;
        }
        Ok(())
    }

    fn close_window(&mut self) -> DomResult<()> {
        self.live()?.close_window().map_err(|e| e.into_dom(None))
    }

    fn quit(&mut self) -> DomResult<()> {
        if self.closed {
            return Err(DomError::Closed);
        }
        self.shutdown().map_err(|e| e.into_dom(None))
    }
}

impl Drop for WebDriverDom {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.shutdown() {
                debug!("session teardown on drop: {e}");
            }
        }
    }
}
