//! Mixed multithreaded workload: makers, takers, and cancellers
//! hammering one book. Verifies the quiescent invariants rather than a
//! particular interleaving.

use clob_rs::{MatchingEngine, OrderBook, OrderBookError, Side};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn stress_mixed_workload_quiescent_invariants() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let engine = Arc::new(MatchingEngine::new(Arc::new(OrderBook::new("BTC/USD"))));
    let threads = 8u64;
    let per_thread = 250u64;
    let barrier = Arc::new(Barrier::new(threads as usize));
    let started = Instant::now();

    let mut handles = Vec::new();
    for thread_id in 0..threads {
        let engine = engine.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..per_thread {
                let order_id = thread_id * 1_000_000 + i + 1;
                let side = if (thread_id + i) % 2 == 0 { Side::Buy } else { Side::Sell };
                // Prices oscillate around 10_000 so the flows cross
                // constantly.
                let price = 9_990 + ((order_id * 7) % 21) as i64;
                match engine.process_order(order_id, side, price, 1 + (i % 5)) {
                    Ok(_) | Err(OrderBookError::DuplicateOrderId { .. }) => {}
                    Err(err) => panic!("unexpected rejection: {err}"),
                }
                // Cancel roughly a third of own orders right away.
                if i % 3 == 0 {
                    engine.cancel_order(order_id);
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(started.elapsed() < Duration::from_secs(5));

    let book = engine.book();
    let stats = book.stats();

    // Every slot not resting must be back in the pool.
    assert_eq!(stats.pool_in_use, stats.resting_orders);
    assert_eq!(stats.pool_available + stats.pool_in_use, stats.pool_capacity);

    // The index and the levels agree on what is resting.
    let snapshot = book.depth_snapshot(usize::MAX);
    let orders_in_levels: usize = snapshot
        .bids
        .iter()
        .chain(snapshot.asks.iter())
        .map(|level| level.orders)
        .sum();
    assert_eq!(orders_in_levels, stats.resting_orders);

    // Levels reported in the snapshot are non-empty and the book is
    // not crossed at rest.
    assert!(snapshot.bids.iter().all(|level| level.quantity > 0));
    assert!(snapshot.asks.iter().all(|level| level.quantity > 0));
    if let (Some(bid), Some(ask)) = book.quote() {
        assert!(bid < ask, "quiescent book crossed: {bid} >= {ask}");
    }
}

#[test]
fn stress_single_price_contention() {
    // Everything at one price: maximum level-lock contention, pure
    // FIFO. Equal buy and sell volume must fully annihilate.
    let engine = Arc::new(MatchingEngine::new(Arc::new(OrderBook::new("BTC/USD"))));
    let pairs = 4u64;
    let per_thread = 200u64;
    let barrier = Arc::new(Barrier::new((pairs * 2) as usize));

    let mut handles = Vec::new();
    for thread_id in 0..pairs * 2 {
        let engine = engine.clone();
        let barrier = barrier.clone();
        let side = if thread_id % 2 == 0 { Side::Buy } else { Side::Sell };
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..per_thread {
                let order_id = thread_id * 1_000_000 + i + 1;
                engine.process_order(order_id, side, 10_000, 10).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let book = engine.book();
    let stats = book.stats();

    // Equal volume on both sides at one price: the book drains
    // completely.
    assert_eq!(stats.resting_orders, 0, "residual orders after symmetric flow");
    assert_eq!(stats.pool_available, stats.pool_capacity);
    assert_eq!(book.best_bid(), None);
    assert_eq!(book.best_ask(), None);
}
