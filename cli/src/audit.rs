//! JSONL audit trail.
//!
//! Every command appends what it did to the audit file, one JSON object per
//! line.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tzweb::{LocateResult, Order, OrderOutcome, Quote, ReconnectPath, Symbol};

use crate::error::Result;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let line = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn log_simple(&mut self, event: &'static str) -> Result<()> {
        self.log(event, json!({}))
    }
}

pub fn log_session_opened(audit: &mut AuditLog, username: &str, path: ReconnectPath) -> Result<()> {
    audit.log(
        "session_opened",
        json!({ "username": username, "path": format!("{path:?}") }),
    )
}

pub fn log_quote(audit: &mut AuditLog, symbol: &Symbol, quote: &Quote) -> Result<()> {
    audit.log(
        "quote",
        json!({
            "symbol": symbol.as_str(),
            "bid": quote.bid,
            "ask": quote.ask,
            "last": quote.last,
            "volume": quote.volume,
            "closed": quote.is_closed(),
        }),
    )
}

pub fn log_locate(
    audit: &mut AuditLog,
    symbol: &Symbol,
    shares: u32,
    max_price: f64,
    result: &LocateResult,
) -> Result<()> {
    audit.log(
        "locate",
        json!({
            "symbol": symbol.as_str(),
            "shares": shares,
            "max_price": max_price,
            "tier": result.tier.map(|t| t.as_str()),
            "price_per_share": result.price_per_share,
            "total": result.total,
            "decision": format!("{:?}", result.decision),
        }),
    )
}

pub fn log_order_submitted(
    audit: &mut AuditLog,
    order: &Order,
    outcome: OrderOutcome,
) -> Result<()> {
    audit.log(
        "order_submitted",
        json!({
            "order": order.to_string(),
            "symbol": order.symbol.as_str(),
            "direction": order.direction.to_string(),
            "quantity": order.quantity,
            "type": order.kind.name(),
            "tif": order.time_in_force.to_string(),
            "outcome": format!("{outcome:?}"),
        }),
    )
}

pub fn log_orders_cancelled(
    audit: &mut AuditLog,
    symbol: &Symbol,
    requested: usize,
    cancelled: usize,
) -> Result<()> {
    audit.log(
        "orders_cancelled",
        json!({ "symbol": symbol.as_str(), "requested": requested, "cancelled": cancelled }),
    )
}

pub fn log_locates_credited(
    audit: &mut AuditLog,
    symbol: &Symbol,
    quantity: Option<u32>,
) -> Result<()> {
    audit.log(
        "locates_credited",
        json!({ "symbol": symbol.as_str(), "quantity": quantity }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tzweb::Direction;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn audit_log_writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        {
            let mut log = AuditLog::open(&path).unwrap();
            log.log_simple("ping").unwrap();
            log.log("custom", json!({"key": "value"})).unwrap();
        }
        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "ping");
        assert_eq!(lines[1]["key"], "value");
        assert!(lines[1]["ts"].is_string());
    }

    #[test]
    fn reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        AuditLog::open(&path).unwrap().log_simple("first").unwrap();
        AuditLog::open(&path).unwrap().log_simple("second").unwrap();
        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn audit_log_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("audit.jsonl");
        AuditLog::open(&path).unwrap().log_simple("x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn order_event_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let mut log = AuditLog::open(&path).unwrap();
        let order = Order::limit(Direction::Short, Symbol::new("GME"), 100, 21.5);
        log_order_submitted(&mut log, &order, OrderOutcome::NotFilled).unwrap();

        let line = &read_lines(&path)[0];
        assert_eq!(line["event"], "order_submitted");
        assert_eq!(line["symbol"], "GME");
        assert_eq!(line["direction"], "SHORT");
        assert_eq!(line["quantity"], 100);
        assert_eq!(line["outcome"], "NotFilled");
    }
}
