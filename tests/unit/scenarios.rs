//! End-to-end scenarios exercised through the public API only.

use clob_rs::{MatchingEngine, OrderBook, Side};
use std::sync::Arc;

fn engine() -> MatchingEngine {
    MatchingEngine::new(Arc::new(OrderBook::new("BTC/USD")))
}

#[test]
fn scenario_simple_cross() {
    let engine = engine();
    engine.process_order(1, Side::Sell, 10_500, 100).unwrap();
    let trades = engine.process_order(2, Side::Buy, 10_500, 50).unwrap();

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].buy_order_id, 2);
    assert_eq!(trades[0].sell_order_id, 1);
    assert_eq!(trades[0].price, 10_500);
    assert_eq!(trades[0].quantity, 50);

    let book = engine.book();
    assert_eq!(book.find_order(1).unwrap().quantity, 50);
    assert_eq!(book.best_ask(), Some(10_500));
    assert_eq!(book.best_bid(), None);
}

#[test]
fn scenario_partial_fill_with_residue_flip() {
    let engine = engine();
    engine.process_order(1, Side::Sell, 10_500, 100).unwrap();
    let trades = engine.process_order(2, Side::Buy, 10_500, 150).unwrap();

    assert_eq!(trades.len(), 1);
    assert_eq!(
        (trades[0].buy_order_id, trades[0].sell_order_id, trades[0].price, trades[0].quantity),
        (2, 1, 10_500, 100)
    );

    let book = engine.book();
    assert_eq!(book.best_bid(), Some(10_500));
    assert_eq!(book.find_order(2).unwrap().quantity, 50);
    assert_eq!(book.best_ask(), None);
}

#[test]
fn scenario_fifo_three_way() {
    let engine = engine();
    engine.process_order(1, Side::Sell, 10_500, 30).unwrap();
    engine.process_order(2, Side::Sell, 10_500, 30).unwrap();
    engine.process_order(3, Side::Sell, 10_500, 30).unwrap();

    let trades = engine.process_order(4, Side::Buy, 10_500, 90).unwrap();
    let summary: Vec<_> = trades
        .iter()
        .map(|t| (t.buy_order_id, t.sell_order_id, t.price, t.quantity))
        .collect();
    assert_eq!(
        summary,
        vec![(4, 1, 10_500, 30), (4, 2, 10_500, 30), (4, 3, 10_500, 30)]
    );

    let book = engine.book();
    assert_eq!(book.best_bid(), None);
    assert_eq!(book.best_ask(), None);
    let snapshot = book.depth_snapshot(usize::MAX);
    assert!(snapshot.bids.is_empty());
    assert!(snapshot.asks.is_empty());
}

#[test]
fn scenario_cancel() {
    let engine = engine();
    engine.process_order(1, Side::Buy, 10_000, 100).unwrap();

    assert!(engine.cancel_order(1));

    let book = engine.book();
    assert_eq!(book.best_bid(), None);
    let stats = book.stats();
    assert_eq!(stats.pool_available, stats.pool_capacity);
    assert_eq!(stats.resting_orders, 0);

    assert!(!engine.cancel_order(1));
}

#[test]
fn scenario_best_bid_ask_ordering() {
    let engine = engine();
    engine.process_order(1, Side::Buy, 10_000, 10).unwrap();
    engine.process_order(2, Side::Buy, 10_100, 10).unwrap();
    engine.process_order(3, Side::Sell, 10_200, 10).unwrap();
    engine.process_order(4, Side::Sell, 10_150, 10).unwrap();

    assert_eq!(engine.book().best_bid(), Some(10_100));
    assert_eq!(engine.book().best_ask(), Some(10_150));
}

#[test]
fn scenario_concurrency_stress() {
    use std::sync::Barrier;
    use std::thread;
    use std::time::{Duration, Instant};

    let engine = Arc::new(engine());
    for id in 1..=5 {
        engine.process_order(id, Side::Sell, 10_000, 100).unwrap();
    }

    let started = Instant::now();
    let barrier = Arc::new(Barrier::new(5));
    let mut handles = Vec::new();
    for thread_id in 0..5u64 {
        let engine = engine.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            barrier.wait();
            let trades = engine
                .process_order(10 + thread_id, Side::Buy, 10_000, 100)
                .unwrap();
            trades.iter().map(|t| t.quantity).sum::<u64>()
        }));
    }

    let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 500);
    assert!(started.elapsed() < Duration::from_secs(5));

    let book = engine.book();
    assert_eq!(book.best_bid(), None);
    assert_eq!(book.best_ask(), None);
    let stats = book.stats();
    assert_eq!(stats.resting_orders, 0);
    assert_eq!(stats.pool_available, stats.pool_capacity);
}

#[test]
fn scenario_quantity_conservation() {
    // traded + resting + cancelled must equal everything submitted.
    let engine = engine();
    let submissions: &[(u64, Side, i64, u64)] = &[
        (1, Side::Sell, 10_500, 100),
        (2, Side::Sell, 10_600, 80),
        (3, Side::Buy, 10_550, 120),
        (4, Side::Buy, 10_400, 40),
        (5, Side::Sell, 10_400, 20),
    ];

    let mut traded = 0u64;
    let mut submitted = 0u64;
    for &(id, side, price, quantity) in submissions {
        submitted += quantity;
        let trades = engine.process_order(id, side, price, quantity).unwrap();
        // Each trade consumes quantity from both sides of the print.
        traded += 2 * trades.iter().map(|t| t.quantity).sum::<u64>();
    }

    let mut cancelled = 0u64;
    for id in [1, 2, 3, 4, 5] {
        if let Some(resting) = engine.book().find_order(id) {
            cancelled += resting.quantity;
            assert!(engine.cancel_order(id));
        }
    }

    assert_eq!(traded + cancelled, submitted);
    let stats = engine.book().stats();
    assert_eq!(stats.pool_available, stats.pool_capacity);
}
