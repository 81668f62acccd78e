use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use matching_engine::order::{Order, OrderType, Side};
use matching_engine::orderbook::OrderBook;
use uuid::Uuid;

const TICKER: &str = "BTCUSD";

fn seeded_book(depth: u64, orders_per_level: u64) -> OrderBook {
    let mut book = OrderBook::new(TICKER.to_string());
    let mut trader = 0u64;
    for price in 1..=depth {
        for _ in 0..orders_per_level {
            trader += 1;
            book.submit(Order::new(
                Uuid::new_v4(),
                format!("ask-{trader}"),
                TICKER.to_string(),
                Side::Sell,
                OrderType::Limit,
                Some(price as f64),
                1,
            ));
            trader += 1;
            book.submit(Order::new(
                Uuid::new_v4(),
                format!("bid-{trader}"),
                TICKER.to_string(),
                Side::Buy,
                OrderType::Limit,
                Some(price as f64),
                1,
            ));
        }
    }
    book
}

// Matching consumes resting liquidity, so each iteration rebuilds the book
// via `iter_batched` rather than reusing one across the whole sample.
fn bench_match_order(c: &mut Criterion) {
    let depth = 100;
    let orders_per_level = 10;

    c.bench_function("market order sweeps half the book", |b| {
        b.iter_batched(
            || seeded_book(depth, orders_per_level),
            |mut book| {
                book.submit(Order::new(
                    Uuid::new_v4(),
                    "market-taker".to_string(),
                    TICKER.to_string(),
                    Side::Buy,
                    OrderType::Market,
                    None,
                    depth * orders_per_level / 2,
                ));
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("limit order crosses and sweeps the whole book", |b| {
        b.iter_batched(
            || seeded_book(depth, orders_per_level),
            |mut book| {
                book.submit(Order::new(
                    Uuid::new_v4(),
                    "limit-taker".to_string(),
                    TICKER.to_string(),
                    Side::Sell,
                    OrderType::Limit,
                    Some((depth / 2) as f64),
                    depth * orders_per_level,
                ));
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_match_order);
criterion_main!(benches);
