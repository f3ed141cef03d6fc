//! TOML configuration loading and validation.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tzweb::{MarketHours, Timing};
use tzweb_webdriver::{Browser, WebDriverConfig};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub account: AccountConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub market_hours: MarketHours,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    pub username: String,
    /// Environment variable holding the password.
    #[serde(default = "default_password_env")]
    pub password_env: String,
    /// Hide the account value fields in the page header after login.
    #[serde(default)]
    pub hide_attributes: bool,
    /// Symbols kept on the watchlist across reconnects.
    #[serde(default)]
    pub watchlist: Vec<String>,
}

fn default_password_env() -> String {
    "TZ_PASSWORD".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub browser: Browser,
    /// Start this driver binary instead of connecting to `driver_url`.
    #[serde(default)]
    pub driver_binary: Option<PathBuf>,
    #[serde(default = "default_driver_url")]
    pub driver_url: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(default = "default_width")]
    pub window_width: u32,
    #[serde(default = "default_height")]
    pub window_height: u32,
    #[serde(default = "default_home_url")]
    pub home_url: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            browser: Browser::default(),
            driver_binary: None,
            driver_url: default_driver_url(),
            port: default_port(),
            headless: default_true(),
            window_width: default_width(),
            window_height: default_height(),
            home_url: default_home_url(),
        }
    }
}

fn default_driver_url() -> String {
    "http://127.0.0.1:4444".into()
}
fn default_port() -> u16 {
    4444
}
fn default_true() -> bool {
    true
}
fn default_width() -> u32 {
    1920
}
fn default_height() -> u32 {
    1080
}
fn default_home_url() -> String {
    tzweb::ids::HOME_URL.into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Where session cookies are kept between runs. Empty disables persistence.
    #[serde(default = "default_cookie_file")]
    pub cookie_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cookie_file: default_cookie_file(),
        }
    }
}

fn default_cookie_file() -> String {
    "./state/cookies.jsonl".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

fn default_level() -> String {
    "info".into()
}
fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents)
    }

    /// Parse and validate config text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.account.username.trim().is_empty() {
            return Err(Error::Config("account.username must not be empty".into()));
        }
        if self.account.password_env.trim().is_empty() {
            return Err(Error::Config("account.password_env must not be empty".into()));
        }
        for sym in &self.account.watchlist {
            tzweb::Symbol::try_new(sym)
                .map_err(|e| Error::Config(format!("account.watchlist: {e}")))?;
        }
        if self.browser.port == 0 {
            return Err(Error::Config("browser.port must be > 0".into()));
        }
        if self.browser.window_width == 0 || self.browser.window_height == 0 {
            return Err(Error::Config("browser window size must be > 0".into()));
        }
        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(Error::Config(format!(
                "logging.level {:?} is not a log level",
                self.logging.level
            )));
        }
        self.timing.validate().map_err(Error::Config)?;
        self.market_hours.validate().map_err(Error::Config)?;
        Ok(())
    }

    /// Read the password from the configured environment variable.
    pub fn password(&self) -> Result<Zeroizing<String>> {
        std::env::var(&self.account.password_env)
            .map(Zeroizing::new)
            .map_err(|_| Error::MissingPassword(self.account.password_env.clone()))
    }

    /// Driver settings for the WebDriver adapter.
    pub fn webdriver(&self) -> WebDriverConfig {
        WebDriverConfig {
            browser: self.browser.browser,
            driver_url: self.browser.driver_url.clone(),
            driver_binary: self.browser.driver_binary.clone(),
            port: self.browser.port,
            headless: self.browser.headless,
            window_width: self.browser.window_width,
            window_height: self.browser.window_height,
        }
    }

    /// Cookie file, if persistence is enabled.
    pub fn cookie_path(&self) -> Option<PathBuf> {
        let file = self.storage.cookie_file.trim();
        (!file.is_empty()).then(|| PathBuf::from(file))
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}
