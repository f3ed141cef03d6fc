//! Property-based tests for the workflow invariants that hold for any input.

use chrono::{NaiveTime, Timelike};
use proptest::prelude::*;
use tzweb::ids::{self, LocateTier};
use tzweb::locate::{select_cheapest, LocateOffer};
use tzweb::mock::{ManualClock, MockDom};
use tzweb::{
    Credentials, Direction, Error, LoadResult, MarketHours, Order, OrderKind, Session, Symbol,
};

fn session(dom: MockDom, clock: ManualClock) -> Session<MockDom> {
    Session::builder(dom, Credentials::new("trader", "secret"))
        .clock(clock)
        .build()
}

fn tier_strategy() -> impl Strategy<Value = LocateTier> {
    prop_oneof![
        Just(LocateTier::PreBorrow),
        Just(LocateTier::SingleUse),
        Just(LocateTier::Locate),
    ]
}

/// Totals in whole cents so ties actually happen.
fn offer_strategy() -> impl Strategy<Value = LocateOffer> {
    (tier_strategy(), 0u32..2_000).prop_map(|(tier, cents)| LocateOffer {
        tier,
        price_per_share: f64::from(cents) / 10_000.0,
        total: f64::from(cents) / 100.0,
    })
}

fn time_strategy() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60, 0u32..60)
        .prop_map(|(h, m, s)| NaiveTime::from_hms_opt(h, m, s).unwrap())
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Buy),
        Just(Direction::Sell),
        Just(Direction::Short),
        Just(Direction::Cover),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // ========================================================================
    // LOCATES
    // ========================================================================

    /// Anything that is not a positive multiple of 100 is refused untouched.
    #[test]
    fn odd_lots_never_reach_the_page(shares in 0u32..100_000) {
        prop_assume!(shares == 0 || shares % 100 != 0);
        let mut s = session(MockDom::builder().trading_layout().build(), ManualClock::default());

        let err = s.locate(&Symbol::new("GME"), shares, 1_000.0).unwrap_err();
        prop_assert!(matches!(err, Error::InvalidArgument(_)));
        prop_assert!(s.dom().actions().is_empty());
        prop_assert_eq!(s.dom().total_reads(), 0);
    }

    /// The pick has the lowest total and is the first offer with that total.
    #[test]
    fn cheapest_is_minimal_and_first(offers in prop::collection::vec(offer_strategy(), 0..6)) {
        let best = select_cheapest(&offers);
        match best {
            None => prop_assert!(offers.is_empty()),
            Some(best) => {
                for o in &offers {
                    prop_assert!(best.total <= o.total);
                }
                let first = offers.iter().position(|o| o.total == best.total).unwrap();
                prop_assert_eq!(offers[first], best);
            }
        }
    }

    // ========================================================================
    // QUOTES
    // ========================================================================

    /// However long the panel stays blank, a positive ask means ready and a
    /// zero ask means the market is closed.
    #[test]
    fn load_classifies_the_first_settled_ask(
        blanks in 0usize..60,
        cents in 0u32..100_000,
    ) {
        let ask = format!("{:.2}", f64::from(cents) / 100.0);
        let mut readings = vec![""; blanks];
        readings.push(&ask);
        let dom = MockDom::builder()
            .trading_layout()
            .text_seq(ids::ASK, readings)
            .build();
        let mut s = session(dom, ManualClock::default());

        let result = s.load_symbol(&Symbol::new("spy")).unwrap();
        let expected = if cents > 0 { LoadResult::Ready } else { LoadResult::MarketClosed };
        prop_assert_eq!(result, expected);
    }

    // ========================================================================
    // ORDERS
    // ========================================================================

    /// Market and stop-market orders are submitted only inside the session.
    #[test]
    fn time_gated_orders_follow_market_hours(
        at in time_strategy(),
        direction in direction_strategy(),
        stop in any::<bool>(),
    ) {
        let hours = MarketHours::default();
        let symbol = Symbol::new("GME");
        let order = if stop {
            Order::stop_market(direction, symbol, 10, 20.0)
        } else {
            Order::market(direction, symbol, 10)
        };
        let dom = MockDom::builder()
            .trading_layout()
            .text(ids::CURRENT_SYMBOL, "GME(USD)")
            .text(ids::ASK, "21.00")
            .build();
        let clock = ManualClock::at(at.hour(), at.minute(), at.second());
        let mut s = session(dom, clock);

        let result = s.submit_order(&order);
        if hours.contains(at) {
            prop_assert!(result.is_ok(), "{at}: {result:?}");
        } else {
            let gated = matches!(result, Err(Error::OutsideMarketHours { .. }));
            prop_assert!(gated, "{at}: {result:?}");
            prop_assert!(s.dom().actions().is_empty());
        }
    }

    /// Limit-style orders ignore the clock.
    #[test]
    fn limit_orders_are_never_gated(at in time_strategy(), cents in 1u32..100_000) {
        let price = f64::from(cents) / 100.0;
        let order = Order::new(
            Direction::Buy,
            Symbol::new("GME"),
            10,
            OrderKind::Limit { price },
        );
        let dom = MockDom::builder()
            .trading_layout()
            .text(ids::CURRENT_SYMBOL, "GME(USD)")
            .text(ids::ASK, "21.00")
            .build();
        let clock = ManualClock::at(at.hour(), at.minute(), at.second());
        let mut s = session(dom, clock);
        prop_assert!(s.submit_order(&order).is_ok());
    }
}
