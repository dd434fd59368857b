//! Algebraic laws of the engine operations.

use clob_rs::{MatchingEngine, OrderBook, Side};
use std::sync::Arc;

fn engine() -> MatchingEngine {
    MatchingEngine::new(Arc::new(OrderBook::new("BTC/USD")))
}

#[test]
fn law_cancel_is_one_shot() {
    let engine = engine();
    engine.process_order(1, Side::Buy, 10_000, 10).unwrap();
    assert_eq!(
        (engine.cancel_order(1), engine.cancel_order(1)),
        (true, false)
    );
}

#[test]
fn law_modify_equals_cancel_then_process() {
    // Two books receive the same prelude; one modifies, the other
    // cancels and resubmits by hand. Their observable states must
    // agree.
    let modified = engine();
    let manual = engine();

    for engine in [&modified, &manual] {
        engine.process_order(1, Side::Sell, 10_500, 50).unwrap();
        engine.process_order(2, Side::Sell, 10_500, 50).unwrap();
        engine.process_order(3, Side::Buy, 10_300, 25).unwrap();
    }

    let trades_a = modified.modify_order(2, Side::Sell, 10_400, 30).unwrap();

    assert!(manual.cancel_order(2));
    let trades_b = manual.process_order(2, Side::Sell, 10_400, 30).unwrap();

    assert_eq!(trades_a.len(), trades_b.len());
    assert_eq!(modified.book().best_ask(), manual.book().best_ask());
    assert_eq!(modified.book().best_bid(), manual.book().best_bid());

    let snapshot_a = modified.book().depth_snapshot(usize::MAX);
    let snapshot_b = manual.book().depth_snapshot(usize::MAX);
    assert_eq!(snapshot_a.bids, snapshot_b.bids);
    assert_eq!(snapshot_a.asks, snapshot_b.asks);
}

#[test]
fn law_add_then_cancel_is_identity() {
    let engine = engine();
    engine.process_order(1, Side::Buy, 10_000, 10).unwrap();
    engine.process_order(2, Side::Sell, 10_500, 20).unwrap();

    let before = engine.book().depth_snapshot(usize::MAX);
    let stats_before = engine.book().stats();

    // A non-crossing order in, then out.
    engine.process_order(3, Side::Buy, 10_100, 15).unwrap();
    assert!(engine.cancel_order(3));

    let after = engine.book().depth_snapshot(usize::MAX);
    assert_eq!(before.bids, after.bids);
    assert_eq!(before.asks, after.asks);

    let stats_after = engine.book().stats();
    assert_eq!(stats_before.pool_available, stats_after.pool_available);
    assert_eq!(stats_before.resting_orders, stats_after.resting_orders);
    assert_eq!(stats_before.bid_levels, stats_after.bid_levels);
}

#[test]
fn law_index_matches_book_contents() {
    let engine = engine();
    engine.process_order(1, Side::Buy, 10_000, 10).unwrap();
    engine.process_order(2, Side::Buy, 10_000, 10).unwrap();
    engine.process_order(3, Side::Sell, 10_500, 30).unwrap();
    engine.process_order(4, Side::Buy, 10_500, 12).unwrap();

    // Order 3 is partially consumed; everything resting must be
    // findable at the price and side it was placed at.
    let book = engine.book();
    assert_eq!(book.find_order(1).unwrap().price, 10_000);
    assert_eq!(book.find_order(2).unwrap().side, Side::Buy);
    let partial = book.find_order(3).unwrap();
    assert_eq!((partial.side, partial.price, partial.quantity), (Side::Sell, 10_500, 18));
    assert!(book.find_order(4).is_none(), "fully filled id must be gone");

    let snapshot = book.depth_snapshot(usize::MAX);
    let resting_quantity: u64 = snapshot
        .bids
        .iter()
        .chain(snapshot.asks.iter())
        .map(|level| level.quantity)
        .sum();
    assert_eq!(resting_quantity, 10 + 10 + 18);
    assert_eq!(book.stats().resting_orders, 3);
}

#[test]
fn law_quiescent_book_never_crossed() {
    let engine = engine();
    let orders: &[(u64, Side, i64, u64)] = &[
        (1, Side::Buy, 10_000, 10),
        (2, Side::Sell, 10_400, 10),
        (3, Side::Buy, 10_350, 10),
        (4, Side::Sell, 10_100, 25),
        (5, Side::Buy, 10_050, 5),
        (6, Side::Sell, 10_020, 5),
    ];
    for &(id, side, price, quantity) in orders {
        engine.process_order(id, side, price, quantity).unwrap();
    }

    if let (Some(bid), Some(ask)) = engine.book().quote() {
        assert!(bid < ask, "book locked or crossed at rest: {bid} >= {ask}");
    }
}
