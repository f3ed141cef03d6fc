//! Integration tests for the CLI commands against a scripted page.

use std::path::Path;

use tempfile::TempDir;
use tzweb::ids::{self, LocateTier};
use tzweb::mock::{ManualClock, MockDom, MockDomBuilder};
use tzweb::{
    ActiveOrderRef, Credentials, Direction, Error as WorkflowError, Session, Symbol, TimeInForce,
};
use tzweb_cli::audit::AuditLog;
use tzweb_cli::commands::{self, Command, Outcome};
use tzweb_cli::error::Error;

fn logged_in() -> MockDomBuilder {
    MockDom::builder()
        .trading_layout()
        .list(ids::layout_marker(), &["Portfolio"])
        .text(ids::CURRENT_SYMBOL, "GME(USD)")
        .text(ids::ASK, "21.50")
}

fn session(dom: MockDom) -> Session<MockDom> {
    Session::builder(dom, Credentials::new("trader01", "secret"))
        .clock(ManualClock::default())
        .build()
}

fn events(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn order(direction: Direction, limit: Option<f64>, force: bool) -> Command {
    Command::Order {
        direction,
        symbol: Symbol::new("GME"),
        quantity: 100,
        limit,
        stop: None,
        range: None,
        tif: TimeInForce::DAY,
        force,
    }
}

struct Fixture {
    _dir: TempDir,
    path: std::path::PathBuf,
    audit: AuditLog,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audit.jsonl");
    let audit = AuditLog::open(&path).unwrap();
    Fixture {
        _dir: dir,
        path,
        audit,
    }
}

// ============================================================================
// Orders
// ============================================================================

#[test]
fn confirmed_order_is_submitted_and_audited() {
    let mut f = fixture();
    let mut s = session(logged_in().build());
    let mut asked = false;

    let outcome = commands::run(&mut s, &mut f.audit, order(Direction::Buy, Some(21.0), false), |o| {
        asked = true;
        assert_eq!(o.to_string(), "BUY 100 GME LMT 21 DAY");
        Ok(true)
    })
    .unwrap();

    assert!(asked);
    assert_eq!(outcome, Outcome::Done);
    assert!(s.dom().was_clicked(&ids::submit_button(Direction::Buy)));

    let ev = events(&f.path);
    assert_eq!(ev[0]["event"], "session_opened");
    assert_eq!(ev[0]["path"], "AlreadyConnected");
    assert_eq!(ev[1]["event"], "order_submitted");
    assert_eq!(ev[1]["outcome"], "Submitted");
}

#[test]
fn declined_confirmation_sends_nothing() {
    let mut f = fixture();
    let mut s = session(logged_in().build());
    let outcome = commands::run(
        &mut s,
        &mut f.audit,
        order(Direction::Buy, Some(21.0), false),
        |_| Ok(false),
    )
    .unwrap();
    assert_eq!(outcome, Outcome::Aborted);
    assert_eq!(outcome.exit_code(), 0);
    assert!(s.dom().actions().is_empty());
    assert_eq!(events(&f.path).len(), 1);
}

#[test]
fn force_skips_the_prompt() {
    let mut f = fixture();
    let mut s = session(logged_in().build());
    let outcome = commands::run(&mut s, &mut f.audit, order(Direction::Sell, None, true), |_| {
        panic!("prompt shown despite --force")
    })
    .unwrap();
    assert_eq!(outcome, Outcome::Done);
}

#[test]
fn short_rejected_by_popup_exits_two() {
    let mut f = fixture();
    let dom = logged_in().element(ids::SHORT_POPUP_CANCEL).build();
    let mut s = session(dom);
    let outcome = commands::run(&mut s, &mut f.audit, order(Direction::Short, Some(21.0), true), |_| {
        Ok(true)
    })
    .unwrap();
    assert_eq!(outcome, Outcome::NotFilled);
    assert_eq!(outcome.exit_code(), 2);
    assert_eq!(events(&f.path)[1]["outcome"], "NotFilled");
}

#[test]
fn invalid_order_fails_before_prompt() {
    let mut f = fixture();
    let mut s = session(logged_in().build());
    let cmd = Command::Order {
        direction: Direction::Buy,
        symbol: Symbol::new("GME"),
        quantity: 0,
        limit: Some(21.0),
        stop: None,
        range: None,
        tif: TimeInForce::GTC,
        force: false,
    };
    let err = commands::run(&mut s, &mut f.audit, cmd, |_| panic!("prompted")).unwrap_err();
    assert!(matches!(err, Error::Workflow(WorkflowError::InvalidArgument(_))));
}

// ============================================================================
// Locates
// ============================================================================

#[test]
fn locate_is_audited_with_its_decision() {
    let mut f = fixture();
    let gme = Symbol::new("GME");
    let dom = logged_in()
        .text(ids::LOCATE_STATUS, "Hard to borrow")
        .text_at(ids::offer_price_per_share(&gme, LocateTier::Locate), "0.03")
        .text_at(ids::offer_total(&gme, LocateTier::Locate), "3.00")
        .element_at(ids::offer_accept(&gme, LocateTier::Locate))
        .build();
    let mut s = session(dom);
    let cmd = Command::Locate {
        symbol: gme.clone(),
        shares: 100,
        max_price: 5.0,
    };
    commands::run(&mut s, &mut f.audit, cmd, |_| Ok(true)).unwrap();

    let ev = &events(&f.path)[1];
    assert_eq!(ev["event"], "locate");
    assert_eq!(ev["tier"], "Locate");
    assert_eq!(ev["total"], 3.0);
    assert_eq!(ev["decision"], "Accepted");
}

#[test]
fn credit_all() {
    let mut f = fixture();
    let gme = Symbol::new("GME");
    let dom = logged_in()
        .list(ids::located_symbols(), &["GME"])
        .element_at(ids::credit_button(&gme))
        .build();
    let mut s = session(dom);
    let cmd = Command::Credit {
        symbol: gme.clone(),
        quantity: None,
    };
    commands::run(&mut s, &mut f.audit, cmd, |_| Ok(true)).unwrap();
    assert!(s.dom().was_clicked(&ids::credit_button(&gme)));
    assert!(events(&f.path)[1]["quantity"].is_null());
}

// ============================================================================
// Portfolio
// ============================================================================

#[test]
fn cancel_counts_what_was_pressed() {
    let mut f = fixture();
    let live = ActiveOrderRef("S.s:1001".into());
    let gone = ActiveOrderRef("S.s:1002".into());
    let dom = logged_in()
        .table(
            ids::ACTIVE_ORDERS_TABLE,
            vec![
                vec!["x", live.0.as_str(), "GME", "Buy", "100", "100", "0", "LMT", "Accepted", "DAY", "20.00", "", "09:41:02"],
                vec!["x", gone.0.as_str(), "GME", "Buy", "50", "50", "0", "LMT", "Accepted", "DAY", "19.00", "", "09:42:10"],
                vec!["x", "S.s:1003", "AMC", "Sell", "10", "10", "0", "LMT", "Accepted", "DAY", "5.00", "", "09:43:00"],
            ],
        )
        .element_at(ids::cancel_order_button(&live.row_id()))
        .build();
    let mut s = session(dom);

    let cmd = Command::Cancel {
        symbol: Symbol::new("GME"),
    };
    commands::run(&mut s, &mut f.audit, cmd, |_| Ok(true)).unwrap();

    let ev = &events(&f.path)[1];
    assert_eq!(ev["event"], "orders_cancelled");
    assert_eq!(ev["requested"], 2);
    assert_eq!(ev["cancelled"], 1);
}

#[test]
fn read_only_commands_do_not_audit_beyond_connect() {
    let mut f = fixture();
    let dom = logged_in()
        .table(ids::POSITIONS_TABLE, vec![vec!["You have no open positions."]])
        .table(ids::ACTIVE_ORDERS_TABLE, vec![])
        .table(ids::LOCATE_INVENTORY_TABLE, vec![vec!["GME", "300", "0", ""]])
        .build();
    let mut s = session(dom);
    for cmd in [
        Command::Positions { intraday: false },
        Command::Orders,
        Command::Inventory,
    ] {
        assert_eq!(
            commands::run(&mut s, &mut f.audit, cmd, |_| Ok(true)).unwrap(),
            Outcome::Done
        );
    }
    let ev = events(&f.path);
    assert_eq!(ev.len(), 3);
    assert!(ev.iter().all(|e| e["event"] == "session_opened"));
}

// ============================================================================
// Connection
// ============================================================================

#[test]
fn status_logs_in_when_needed() {
    let mut f = fixture();
    let dom = MockDom::builder()
        .trading_layout()
        .text(ids::LOGIN_USER, "")
        .element(ids::LOGIN_PASSWORD)
        .list_seq(ids::layout_marker(), [vec![], vec!["Portfolio"]])
        .build();
    let mut s = session(dom);
    commands::run(&mut s, &mut f.audit, Command::Status, |_| Ok(true)).unwrap();
    assert_eq!(events(&f.path)[0]["path"], "LoggedIn");
    assert_eq!(events(&f.path)[0]["username"], "trader01");
}

#[test]
fn unreachable_layout_is_an_error() {
    let mut f = fixture();
    let mut s = session(MockDom::builder().build());
    let err = commands::run(&mut s, &mut f.audit, Command::Status, |_| Ok(true)).unwrap_err();
    assert!(matches!(err, Error::Workflow(WorkflowError::ReconnectExhausted)));
    assert!(events(&f.path).is_empty());
}
