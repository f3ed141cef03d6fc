//! CLI entry point for tzweb.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{debug, warn};

use tzweb::{Credentials, FileCookieStore, Session, Symbol};
use tzweb_cli::audit::AuditLog;
use tzweb_cli::commands::{self, Command, Outcome};
use tzweb_cli::config::Config;
use tzweb_cli::error::{Error, Result};
use tzweb_webdriver::WebDriverDom;

#[derive(Parser)]
#[command(name = "tz")]
#[command(about = "Trade on the TradeZero web platform from the command line")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .format_timestamp_secs()
    .init();

    match execute(&config, cli.command) {
        Ok(outcome) => process::exit(outcome.exit_code()),
        Err(Error::Aborted(msg)) => {
            eprintln!("{msg}");
            process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn execute(config: &Config, command: Command) -> Result<Outcome> {
    let password = config.password()?;
    let credentials = Credentials::new(config.account.username.as_str(), password.as_str());

    let dom = WebDriverDom::launch(&config.webdriver())?;
    let mut builder = Session::builder(dom, credentials)
        .hide_attributes(config.account.hide_attributes)
        .timing(config.timing.clone())
        .market_hours(config.market_hours)
        .home_url(config.browser.home_url.as_str());
    if let Some(path) = config.cookie_path() {
        builder = builder.cookie_store(FileCookieStore::new(path));
    }
    for sym in &config.account.watchlist {
        builder = builder.watch(Symbol::new(sym));
    }
    let mut session = builder.build();
    session.open()?;

    let mut audit = AuditLog::open(&config.audit_path())?;
    let result = commands::run(&mut session, &mut audit, command, confirm);

    if let Err(e) = session.close() {
        warn!("browser shutdown: {e}");
    }
    debug!("audit trail at {}", config.audit_path().display());
    result
}

fn confirm(order: &tzweb::Order) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(format!("Send {order}?"))
        .default(false)
        .interact()
        .map_err(|e| Error::Aborted(format!("confirmation prompt failed: {e}")))
}
