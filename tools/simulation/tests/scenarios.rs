//! End-to-end tick pipeline scenarios
//!
//! Scripted competitors drive the clock through the documented book,
//! fault-isolation and scoring cases.

use rust_decimal::Decimal;
use simulation::clock::ClockState;
use simulation::strategy::{CompetitorView, MarketView, Quote, Strategy};
use simulation::{SimulationClock, SimulationConfig, SymbolConfig};
use std::sync::Arc;
use std::time::Duration;
use types::errors::{ScoringUndefined, SimulationError};
use types::ids::{CompetitorId, Symbol, Tick};
use types::numeric::{Price, Quantity};
use types::order::Side;

fn test_config() -> SimulationConfig {
    SimulationConfig {
        tick_interval_ms: 0,
        max_ticks: None,
        strategy_time_budget_ms: 200,
        symbols: vec![SymbolConfig::new("NVR", 100, 0.0, 0.0)],
        bots: vec![],
        ..SimulationConfig::default()
    }
}

/// Strategy that sends fixed quotes on one tick and nothing otherwise
fn on_tick(at: u64, quotes: Vec<Quote>) -> Arc<dyn Strategy> {
    Arc::new(move |m: &MarketView, _: &CompetitorView| {
        if m.tick.value() == at {
            quotes.clone()
        } else {
            Vec::new()
        }
    })
}

fn idle() -> Arc<dyn Strategy> {
    Arc::new(|_: &MarketView, _: &CompetitorView| Vec::new())
}

fn nvr() -> Symbol {
    Symbol::new("NVR")
}

#[tokio::test]
async fn test_single_bid_on_empty_book() {
    let mut clock = SimulationClock::new(test_config()).unwrap();
    clock
        .register(
            "alice",
            on_tick(0, vec![Quote::limit("NVR", Side::Bid, Decimal::from(100), Decimal::from(10))]),
        )
        .unwrap();
    let feed = clock.feed();
    clock.start().unwrap();
    clock.advance().await.unwrap();

    let book = feed.order_book(&nvr(), 30).unwrap();
    assert_eq!(
        book.bids,
        vec![(Price::from_u64(100), Quantity::from_u64(10), Tick::ZERO)]
    );
    assert!(book.asks.is_empty());
}

#[tokio::test]
async fn test_crossing_bid_trades_at_resting_price_and_rests_remainder() {
    let mut clock = SimulationClock::new(test_config()).unwrap();
    clock
        .register(
            "seller",
            on_tick(0, vec![Quote::limit("NVR", Side::Ask, Decimal::from(101), Decimal::from(5))]),
        )
        .unwrap();
    clock
        .register(
            "buyer",
            on_tick(1, vec![Quote::limit("NVR", Side::Bid, Decimal::from(102), Decimal::from(8))]),
        )
        .unwrap();
    clock.start().unwrap();

    clock.advance().await.unwrap();
    let summary = clock.advance().await.unwrap();
    assert_eq!(summary.trades, 1);

    let engine = &clock.state().engine;
    let trade = &engine.trades()[0];
    assert_eq!(trade.price, Price::from_u64(101));
    assert_eq!(trade.quantity, Quantity::from_u64(5));
    assert_eq!(trade.buyer_id, CompetitorId::new("buyer"));
    assert_eq!(trade.tick, Tick::new(1));

    assert_eq!(engine.best_ask(&nvr()), None);
    let book = clock.feed().order_book(&nvr(), 30).unwrap();
    assert_eq!(
        book.bids,
        vec![(Price::from_u64(102), Quantity::from_u64(3), Tick::new(1))]
    );
    assert!(book.asks.is_empty());

    let ledger = engine.ledger();
    assert_eq!(ledger.get(&CompetitorId::new("buyer")).unwrap().position(&nvr()), Decimal::from(5));
    let seller = ledger.get(&CompetitorId::new("seller")).unwrap();
    assert_eq!(seller.position(&nvr()), Decimal::from(-5));
}

#[tokio::test]
async fn test_panicking_strategy_is_contained() {
    let mut clock = SimulationClock::new(test_config()).unwrap();
    clock
        .register(
            "faulty",
            Arc::new(|_: &MarketView, _: &CompetitorView| -> Vec<Quote> {
                panic!("strategy bug")
            }),
        )
        .unwrap();
    clock
        .register(
            "steady",
            Arc::new(|m: &MarketView, _: &CompetitorView| {
                vec![Quote::limit(
                    "NVR",
                    Side::Bid,
                    Decimal::from(90 + m.tick.value()),
                    Decimal::ONE,
                )]
            }),
        )
        .unwrap();
    clock.start().unwrap();

    for _ in 0..3 {
        let summary = clock.advance().await.unwrap();
        assert_eq!(summary.faults, 1);
        assert_eq!(summary.orders_accepted, 1);
        assert_eq!(summary.state, ClockState::Running);
    }

    assert_eq!(clock.tick(), Tick::new(3));
    assert_eq!(clock.metrics().strategy_faults["panicked"], 3);
    let engine = &clock.state().engine;
    assert!(engine.open_orders(&CompetitorId::new("faulty")).is_empty());
    assert_eq!(engine.open_orders(&CompetitorId::new("steady")).len(), 3);
}

#[tokio::test]
async fn test_slow_strategy_skips_tick() {
    let mut clock = SimulationClock::new(SimulationConfig {
        strategy_time_budget_ms: 20,
        ..test_config()
    })
    .unwrap();
    clock
        .register(
            "slow",
            Arc::new(|_: &MarketView, _: &CompetitorView| {
                std::thread::sleep(Duration::from_millis(200));
                vec![Quote::limit("NVR", Side::Bid, Decimal::from(99), Decimal::ONE)]
            }),
        )
        .unwrap();
    clock.register("idle", idle()).unwrap();
    clock.start().unwrap();

    let summary = clock.advance().await.unwrap();
    assert_eq!(summary.faults, 1);
    assert_eq!(summary.orders_accepted, 0);
    assert_eq!(clock.metrics().strategy_faults["timeout"], 1);
    assert!(clock.state().engine.open_orders(&CompetitorId::new("slow")).is_empty());
}

#[tokio::test]
async fn test_zero_returns_report_undefined_sharpe() {
    let mut clock = SimulationClock::new(test_config()).unwrap();
    clock.register("flat", idle()).unwrap();
    clock.start().unwrap();

    for _ in 0..10 {
        clock.advance().await.unwrap();
    }

    let report = clock.state().scoring.report(&CompetitorId::new("flat")).unwrap();
    assert_eq!(report.samples, 10);
    assert_eq!(report.full_run, None);
    assert_eq!(report.window, None);
    assert_eq!(report.undefined, Some(ScoringUndefined::ZeroVariance));
    assert_eq!(clock.leaderboard()[0].sharpe, None);
}

#[tokio::test]
async fn test_invalid_quotes_rejected_without_side_effects() {
    let mut clock = SimulationClock::new(test_config()).unwrap();
    clock
        .register(
            "sloppy",
            on_tick(
                0,
                vec![
                    Quote::limit("NVR", Side::Bid, Decimal::from(-5), Decimal::ONE),
                    Quote::limit("NVR", Side::Bid, Decimal::from(99), Decimal::ZERO),
                    Quote::limit("XYZ", Side::Bid, Decimal::from(99), Decimal::ONE),
                    Quote::limit("NVR", Side::Bid, Decimal::from(99), Decimal::ONE),
                ],
            ),
        )
        .unwrap();
    clock.start().unwrap();

    let summary = clock.advance().await.unwrap();
    assert_eq!(summary.orders_rejected, 3);
    assert_eq!(summary.orders_accepted, 1);
    assert_eq!(clock.journal().len(), 1);
    assert_eq!(clock.state().engine.best_bid(&nvr()), Some(Price::from_u64(99)));
}

#[tokio::test]
async fn test_price_time_priority_follows_registration_order() {
    let mut clock = SimulationClock::new(test_config()).unwrap();
    let ask = Quote::limit("NVR", Side::Ask, Decimal::from(101), Decimal::from(2));
    for who in ["first", "second"] {
        clock.register(who, on_tick(0, vec![ask.clone()])).unwrap();
    }
    clock
        .register("taker", on_tick(1, vec![Quote::market("NVR", Side::Bid, Decimal::from(3))]))
        .unwrap();
    clock.start().unwrap();
    clock.advance().await.unwrap();
    clock.advance().await.unwrap();

    let trades = clock.state().engine.trades();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].seller_id, CompetitorId::new("first"));
    assert_eq!(trades[0].quantity, Quantity::from_u64(2));
    assert_eq!(trades[1].seller_id, CompetitorId::new("second"));
    assert_eq!(trades[1].quantity, Quantity::from_u64(1));
}

#[tokio::test]
async fn test_returns_follow_mark_to_market() {
    let mut clock = SimulationClock::new(test_config()).unwrap();
    clock
        .register(
            "seller",
            Arc::new(|m: &MarketView, _: &CompetitorView| match m.tick.value() {
                0 => vec![Quote::limit("NVR", Side::Ask, Decimal::from(100), Decimal::from(10))],
                2 => vec![Quote::limit("NVR", Side::Ask, Decimal::from(120), Decimal::from(1))],
                _ => vec![],
            }),
        )
        .unwrap();
    clock
        .register(
            "buyer",
            Arc::new(|m: &MarketView, _: &CompetitorView| match m.tick.value() {
                1 => vec![Quote::market("NVR", Side::Bid, Decimal::from(10))],
                2 => vec![Quote::limit("NVR", Side::Bid, Decimal::from(110), Decimal::from(1))],
                _ => vec![],
            }),
        )
        .unwrap();
    clock.start().unwrap();
    for _ in 0..3 {
        clock.advance().await.unwrap();
    }

    // Tick 2 marks at mid (110 + 120) / 2 = 115
    let buyer = clock.state().engine.ledger().get(&CompetitorId::new("buyer")).unwrap().clone();
    assert_eq!(buyer.last_equity, Decimal::from(100_150));
    let returns = clock.state().scoring.returns(&CompetitorId::new("buyer")).unwrap();
    assert_eq!(returns.len(), 3);
    assert_eq!(returns[0], 0.0);
    assert_eq!(returns[1], 0.0);
    assert!((returns[2] - 150.0 / 100_000.0).abs() < 1e-12);
}

#[tokio::test]
async fn test_advance_after_stop_fails() {
    let mut clock = SimulationClock::new(SimulationConfig {
        max_ticks: Some(1),
        ..test_config()
    })
    .unwrap();
    clock.start().unwrap();
    clock.advance().await.unwrap();
    assert_eq!(
        clock.advance().await.unwrap_err(),
        SimulationError::ClockStopped { tick: Tick::new(1) }
    );
}

#[tokio::test]
async fn test_oversized_quotes_rejected_and_clock_continues() {
    let huge: Decimal = "1000000000000000000000000000".parse().unwrap();
    let mut clock = SimulationClock::new(test_config()).unwrap();
    clock
        .register(
            "seller",
            on_tick(0, vec![Quote::limit("NVR", Side::Ask, Decimal::from(100), huge)]),
        )
        .unwrap();
    clock
        .register(
            "buyer",
            Arc::new(move |m: &MarketView, _: &CompetitorView| match m.tick.value() {
                0 => vec![
                    Quote::limit("NVR", Side::Bid, Decimal::from(100), huge),
                    Quote::market("NVR", Side::Bid, huge),
                ],
                1 => vec![Quote::limit("NVR", Side::Bid, Decimal::from(99), Decimal::from(5))],
                _ => vec![],
            }),
        )
        .unwrap();
    clock.start().unwrap();

    let summary = clock.advance().await.unwrap();
    assert_eq!(summary.orders_rejected, 3);
    assert_eq!(summary.orders_accepted, 0);
    assert_eq!(summary.trades, 0);
    assert!(clock.journal().is_empty());

    let summary = clock.advance().await.unwrap();
    assert_eq!(summary.orders_accepted, 1);
    assert_eq!(summary.state, ClockState::Running);

    let engine = &clock.state().engine;
    assert_eq!(engine.best_bid(&nvr()), Some(Price::from_u64(99)));
    assert_eq!(engine.best_ask(&nvr()), None);
    for who in ["seller", "buyer"] {
        let competitor = engine.ledger().get(&CompetitorId::new(who)).unwrap();
        assert_eq!(competitor.cash, Decimal::from(100_000));
        assert_eq!(competitor.position(&nvr()), Decimal::ZERO);
    }
}
