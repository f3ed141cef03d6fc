//! Subcommands: connect, run one workflow, report, audit.

use clap::Subcommand;
use log::info;
use tzweb::{
    Direction, DomSession, LocateDecision, Order, OrderKind, OrderOutcome, ReconnectPath, Session,
    Symbol, TimeInForce,
};

use crate::audit::{self, AuditLog};
use crate::error::{Error, Result};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in (or confirm the session is alive)
    Status,

    /// Show the quote panel for a symbol
    Quote { symbol: Symbol },

    /// Negotiate a short locate
    Locate {
        symbol: Symbol,
        /// Shares to locate, a multiple of 100
        shares: u32,
        /// Highest acceptable total fee in dollars
        #[arg(long)]
        max_price: f64,
    },

    /// Return located shares
    Credit {
        symbol: Symbol,
        /// Shares to credit back; all located shares when omitted
        quantity: Option<u32>,
    },

    /// Submit an order
    Order {
        /// buy, sell, short or cover
        direction: Direction,
        symbol: Symbol,
        quantity: u32,
        #[arg(long)]
        limit: Option<f64>,
        #[arg(long)]
        stop: Option<f64>,
        /// Range order bounds
        #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"], conflicts_with_all = ["limit", "stop"])]
        range: Option<Vec<f64>>,
        #[arg(long, default_value = "DAY")]
        tif: TimeInForce,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Show open positions
    Positions {
        /// Only positions opened today
        #[arg(long)]
        intraday: bool,
    },

    /// Show working orders
    Orders,

    /// Cancel every working order in a symbol
    Cancel { symbol: Symbol },

    /// Show located shares
    Inventory,
}

/// How a command finished, mapped to the process exit code by the binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The user declined the confirmation prompt.
    Aborted,
    /// The order was rejected by the short-locate popup.
    NotFilled,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Done | Outcome::Aborted => 0,
            Outcome::NotFilled => 2,
        }
    }
}

/// Order type from the price flags.
pub fn order_kind(limit: Option<f64>, stop: Option<f64>, range: Option<&[f64]>) -> Result<OrderKind> {
    match (limit, stop, range) {
        (None, None, Some(&[low, high])) => Ok(OrderKind::Range { low, high }),
        (_, _, Some(_)) => Err(Error::Workflow(tzweb::Error::InvalidArgument(
            "--range takes exactly LOW HIGH and excludes --limit/--stop".into(),
        ))),
        (Some(limit), Some(stop), None) => Ok(OrderKind::StopLimit { limit, stop }),
        (Some(price), None, None) => Ok(OrderKind::Limit { price }),
        (None, Some(stop), None) => Ok(OrderKind::StopMarket { stop }),
        (None, None, None) => Ok(OrderKind::Market),
    }
}

/// Make sure the page is logged in before a command runs.
pub fn connect<D: DomSession>(session: &mut Session<D>, audit: &mut AuditLog) -> Result<ReconnectPath> {
    let path = session.ensure_connected()?;
    let username = session.credentials().username().to_string();
    info!("session ready for {username} ({path:?})");
    audit::log_session_opened(audit, &username, path)?;
    Ok(path)
}

/// Connect, then run `command`.
///
/// `confirm` is asked before any order is sent unless the command carries
/// `--force`.
pub fn run<D, F>(
    session: &mut Session<D>,
    audit: &mut AuditLog,
    command: Command,
    confirm: F,
) -> Result<Outcome>
where
    D: DomSession,
    F: FnOnce(&Order) -> Result<bool>,
{
    let path = connect(session, audit)?;

    match command {
        Command::Status => {
            println!(
                "Connected as {} ({})",
                session.credentials().username(),
                match path {
                    ReconnectPath::AlreadyConnected => "already logged in",
                    ReconnectPath::LoggedIn => "logged in",
                    ReconnectPath::Reloaded => "reloaded",
                }
            );
            Ok(Outcome::Done)
        }
        Command::Quote { symbol } => quote(session, audit, &symbol),
        Command::Locate {
            symbol,
            shares,
            max_price,
        } => locate(session, audit, &symbol, shares, max_price),
        Command::Credit { symbol, quantity } => {
            session.credit_locates(&symbol, quantity)?;
            audit::log_locates_credited(audit, &symbol, quantity)?;
            match quantity {
                Some(q) => println!("Credited {q} {symbol}"),
                None => println!("Credited all {symbol}"),
            }
            Ok(Outcome::Done)
        }
        Command::Order {
            direction,
            symbol,
            quantity,
            limit,
            stop,
            range,
            tif,
            force,
        } => {
            let kind = order_kind(limit, stop, range.as_deref())?;
            let order = Order::new(direction, symbol, quantity, kind).with_tif(tif);
            order.validate()?;
            if !force && !confirm(&order)? {
                println!("Aborted.");
                return Ok(Outcome::Aborted);
            }
            submit(session, audit, &order)
        }
        Command::Positions { intraday } => positions(session, intraday),
        Command::Orders => orders(session),
        Command::Cancel { symbol } => cancel(session, audit, &symbol),
        Command::Inventory => inventory(session),
    }
}

fn quote<D: DomSession>(
    session: &mut Session<D>,
    audit: &mut AuditLog,
    symbol: &Symbol,
) -> Result<Outcome> {
    let q = session.quote(symbol)?;
    audit::log_quote(audit, symbol, &q)?;
    if q.is_closed() {
        println!("{symbol}: market closed");
        return Ok(Outcome::Done);
    }
    println!("{symbol}");
    println!("  bid {:>10.2}   ask {:>10.2}   spread {:.2}", q.bid, q.ask, q.spread());
    println!("  last {:>9.2}   volume {:>10.0}", q.last, q.volume);
    println!(
        "  open {:>9.2}   high {:>9.2}   low {:>9.2}   close {:>9.2}",
        q.open, q.high, q.low, q.close
    );
    Ok(Outcome::Done)
}

fn locate<D: DomSession>(
    session: &mut Session<D>,
    audit: &mut AuditLog,
    symbol: &Symbol,
    shares: u32,
    max_price: f64,
) -> Result<Outcome> {
    let r = session.locate(symbol, shares, max_price)?;
    audit::log_locate(audit, symbol, shares, max_price, &r)?;
    match r.decision {
        LocateDecision::EasyToBorrow => println!("{symbol} is easy to borrow, no locate needed"),
        LocateDecision::Accepted => println!(
            "Located {shares} {symbol} for ${:.2} (${:.4}/share)",
            r.total, r.price_per_share
        ),
        LocateDecision::Declined => println!(
            "Declined: {shares} {symbol} costs ${:.2}, above ${max_price:.2}",
            r.total
        ),
    }
    Ok(Outcome::Done)
}

fn submit<D: DomSession>(
    session: &mut Session<D>,
    audit: &mut AuditLog,
    order: &Order,
) -> Result<Outcome> {
    let outcome = session.submit_order(order)?;
    audit::log_order_submitted(audit, order, outcome)?;
    match outcome {
        OrderOutcome::Submitted => {
            println!("Submitted {order}");
            Ok(Outcome::Done)
        }
        OrderOutcome::NotFilled => {
            println!("Not filled: {order} needs a locate");
            Ok(Outcome::NotFilled)
        }
    }
}

fn positions<D: DomSession>(session: &mut Session<D>, intraday: bool) -> Result<Outcome> {
    let rows = if intraday {
        session.intraday_positions()?
    } else {
        session.positions()?
    };
    if rows.is_empty() {
        println!("No positions.");
        return Ok(Outcome::Done);
    }
    println!(
        "  {:8} {:6} {:>8} {:>10} {:>10} {:>10} {:>10}",
        "Symbol", "Side", "Qty", "Entry", "Price", "Day P&L", "P&L"
    );
    for p in &rows {
        println!(
            "  {:8} {:6} {:>8} {:>10.2} {:>10.2} {:>10.2} {:>10.2}{}",
            p.symbol.as_str(),
            p.side,
            p.quantity,
            p.entry,
            p.price,
            p.day_pnl,
            p.pnl,
            if p.overnight { "  (overnight)" } else { "" }
        );
    }
    Ok(Outcome::Done)
}

fn orders<D: DomSession>(session: &mut Session<D>) -> Result<Outcome> {
    let rows = session.active_orders()?;
    if rows.is_empty() {
        println!("No working orders.");
        return Ok(Outcome::Done);
    }
    for o in &rows {
        let price = match (o.limit, o.stop) {
            (Some(l), Some(s)) => format!("{l:.2} stop {s:.2}"),
            (Some(l), None) => format!("{l:.2}"),
            (None, Some(s)) => format!("stop {s:.2}"),
            (None, None) => String::new(),
        };
        println!(
            "  {:14} {:8} {:6} {:>6}/{:<6} {:8} {:14} {:4} {}",
            o.reference.0,
            o.symbol.as_str(),
            o.side,
            o.executed,
            o.quantity,
            o.order_type,
            price,
            o.time_in_force,
            o.status
        );
    }
    Ok(Outcome::Done)
}

fn cancel<D: DomSession>(
    session: &mut Session<D>,
    audit: &mut AuditLog,
    symbol: &Symbol,
) -> Result<Outcome> {
    let refs = session.active_order_refs(symbol)?;
    if refs.is_empty() {
        println!("No working {symbol} orders.");
        audit::log_orders_cancelled(audit, symbol, 0, 0)?;
        return Ok(Outcome::Done);
    }
    let cancelled = session.cancel_active_orders(symbol, &refs)?;
    audit::log_orders_cancelled(audit, symbol, refs.len(), cancelled)?;
    println!("Cancelled {cancelled} of {} {symbol} orders", refs.len());
    Ok(Outcome::Done)
}

fn inventory<D: DomSession>(session: &mut Session<D>) -> Result<Outcome> {
    let rows = session.locate_inventory()?;
    if rows.is_empty() {
        println!("No located shares.");
        return Ok(Outcome::Done);
    }
    println!("  {:8} {:>10} {:>12}", "Symbol", "Available", "Unavailable");
    for e in &rows {
        println!(
            "  {:8} {:>10} {:>12}",
            e.symbol.as_str(),
            e.available,
            e.unavailable
        );
    }
    Ok(Outcome::Done)
}
