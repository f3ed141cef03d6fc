//! tzweb-cli: trade on the TradeZero web platform from the command line.
//!
//! Reads a TOML config, opens a browser session through WebDriver, runs one
//! command and appends what it did to a JSONL audit trail.

pub mod audit;
pub mod commands;
pub mod config;
pub mod error;
