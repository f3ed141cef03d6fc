//! Error types for the CLI.

use std::path::PathBuf;

/// All errors that can occur while running a command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("password variable {0} is not set")]
    MissingPassword(String),

    #[error("browser error: {0}")]
    Browser(#[from] tzweb_webdriver::WireError),

    #[error(transparent)]
    Workflow(#[from] tzweb::Error),

    #[error("aborted: {0}")]
    Aborted(String),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
