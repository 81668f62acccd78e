//! The atomic unit traded by the engine: an [`Order`] and the small closed
//! sum types (`Side`, `OrderType`) that describe it.

use serde::{Deserialize, Serialize, Serializer};
use std::time::SystemTime;
use uuid::Uuid;

/// Opaque order identity, assigned centrally by the [`crate::engine::MatchingEngine`].
pub type OrderId = Uuid;

/// Opaque trader identity, supplied by the caller.
pub type TraderId = String;

/// Ticker symbol an order applies to, e.g. `"FB"`.
pub type Ticker = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn from_str(value: &str) -> Result<Self, String> {
        match value.trim().to_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!("bad side: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
    Ioc,
}

impl OrderType {
    pub fn from_str(value: &str) -> Result<Self, String> {
        match value.trim().to_uppercase().as_str() {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            "IOC" => Ok(OrderType::Ioc),
            other => Err(format!("bad order type: {other}")),
        }
    }

    /// Whether this order type carries a price on input.
    pub fn requires_price(self) -> bool {
        matches!(self, OrderType::Limit | OrderType::Ioc)
    }
}

/// Sentinel price a resting MARKET order takes on its own side of the book,
/// until a crossing order discovers a real counter-price (§4.2.3).
pub fn market_sentinel(side: Side) -> f64 {
    match side {
        Side::Buy => f64::INFINITY,
        Side::Sell => 0.0,
    }
}

/// A single fill attributed to an order: the counterparty's order id and the
/// signed cash flow of this fill from the attributed order's point of view.
pub type Fill = (OrderId, f64);

fn serialize_price<S: Serializer>(price: &f64, s: S) -> Result<S::Ok, S::Error> {
    // `+inf` is the sentinel for a still-resting MARKET order with no
    // discovered counter-price yet; JSON has no representation for it.
    if price.is_finite() {
        s.serialize_f64(*price)
    } else {
        s.serialize_none()
    }
}

// A `null` price on the wire always means "not finite"; which non-finite
// value it was doesn't matter to a caller, who only ever checks `is_finite`.
fn deserialize_price<'de, D: serde::Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub trader_id: TraderId,
    pub ticker: Ticker,
    pub side: Side,
    pub ordertype: OrderType,
    #[serde(serialize_with = "serialize_price", deserialize_with = "deserialize_price")]
    pub price: f64,
    pub quantity: u64,
    pub filled: u64,
    pub is_executed: bool,
    pub trades: Vec<Fill>,
    #[serde(skip, default = "SystemTime::now")]
    pub timestamp: SystemTime,
}

impl Order {
    /// Builds a new, unfilled order. `price` must already be resolved by the
    /// caller: `Some(p)` for LIMIT/IOC, `None` for MARKET (the book assigns
    /// the sentinel on insertion).
    pub fn new(
        order_id: OrderId,
        trader_id: TraderId,
        ticker: Ticker,
        side: Side,
        ordertype: OrderType,
        price: Option<f64>,
        quantity: u64,
    ) -> Self {
        let price = match (ordertype, price) {
            (OrderType::Market, _) => market_sentinel(side),
            (_, Some(p)) => p,
            (_, None) => unreachable!("LIMIT/IOC orders must carry a price at construction"),
        };
        Order {
            order_id,
            trader_id,
            ticker,
            side,
            ordertype,
            price,
            quantity,
            filled: 0,
            is_executed: false,
            trades: Vec::new(),
            timestamp: SystemTime::now(),
        }
    }

    /// Fills `qty` units, capping at `quantity` (I1).
    pub fn fill(&mut self, qty: u64) {
        self.filled = (self.filled + qty).min(self.quantity);
        debug_assert!(self.filled <= self.quantity, "I1 violated: overfill");
    }

    pub fn is_fulfilled(&self) -> bool {
        self.filled >= self.quantity
    }

    pub fn remaining(&self) -> u64 {
        self.quantity - self.filled
    }
}
