use crate::order::{OrderId, Ticker};
use std::time::SystemTime;

/// A single match between an incoming (taker) order and a resting (maker)
/// order. This is not part of the wire protocol — trades are observable only
/// through point queries on orders (`Order.trades`, §1 Non-goals) — it exists
/// purely so the book has something structured to log per fill.
///
/// - The price is always the maker's (resting) price.
/// - Quantity is the amount filled in this step of the matching loop.
#[derive(Debug, Clone)]
pub struct Trade {
    pub ticker: Ticker,
    pub price: f64,
    pub quantity: u64,
    pub maker_id: OrderId,
    pub taker_id: OrderId,
    pub timestamp: SystemTime,
}
