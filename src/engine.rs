//! The [`MatchingEngine`]: routes commands to the right [`OrderBook`], keeps
//! the cross-book trader-uniqueness invariant, and is the only thing that
//! ever allocates an [`OrderId`].

use crate::order::{Order, OrderId, OrderType, Side, Ticker, TraderId};
use crate::orderbook::{OrderBook, SubmitOutcome};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Everything SUBMIT needs beyond what the engine itself allocates.
pub struct NewOrder {
    pub trader_id: TraderId,
    pub ticker: Ticker,
    pub side: Side,
    pub ordertype: OrderType,
    pub price: Option<f64>,
    pub quantity: u64,
}

/// Outcome of [`MatchingEngine::submit`].
pub enum EngineSubmit {
    /// `trader_id` already has an active order somewhere in the engine.
    RejectedDuplicateTrader { order: Order },
    Accepted { order: Order, success: bool, pnl: f64 },
}

/// Outcome of [`MatchingEngine::amend`] / [`MatchingEngine::cancel`].
pub enum EngineAck {
    Ok,
    Failed,
}

/// Central engine state, guarded by a single mutex at the session layer
/// (§5: "this implementation takes the acceptable single-engine-wide-
/// exclusive-lock option").
pub struct MatchingEngine {
    books: HashMap<Ticker, OrderBook>,
    order_tickers: HashMap<OrderId, Ticker>,
    trader_orders: HashMap<TraderId, OrderId>,
    order_history: HashMap<OrderId, Order>,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self {
            books: HashMap::new(),
            order_tickers: HashMap::new(),
            trader_orders: HashMap::new(),
            order_history: HashMap::new(),
        }
    }

    /// §4.6 SUBMIT dispatch.
    pub fn submit(&mut self, new_order: NewOrder) -> EngineSubmit {
        let order_id = Uuid::new_v4();
        let order = Order::new(
            order_id,
            new_order.trader_id.clone(),
            new_order.ticker.clone(),
            new_order.side,
            new_order.ordertype,
            new_order.price,
            new_order.quantity,
        );

        // OQ3: the order is recorded in history even when rejected.
        self.order_history.insert(order_id, order.clone());

        if self.trader_orders.contains_key(&new_order.trader_id) {
            warn!(trader_id = %new_order.trader_id, "rejected: trader already has an active order");
            return EngineSubmit::RejectedDuplicateTrader { order };
        }

        self.trader_orders.insert(new_order.trader_id.clone(), order_id);
        self.order_tickers.insert(order_id, new_order.ticker.clone());
        let book = self
            .books
            .entry(new_order.ticker.clone())
            .or_insert_with(|| OrderBook::new(new_order.ticker.clone()));

        let (pnl, touched) = match book.submit(order) {
            SubmitOutcome::Rejected => {
                // Per-book safeguard tripped even though the engine-wide gate
                // above didn't; treat identically to the engine-level reject.
                self.trader_orders.remove(&new_order.trader_id);
                self.order_tickers.remove(&order_id);
                let order = self.order_history[&order_id].clone();
                warn!(trader_id = %new_order.trader_id, "rejected by book-level trader_orders check");
                return EngineSubmit::RejectedDuplicateTrader { order };
            }
            SubmitOutcome::Handled { pnl, touched } => (pnl, touched),
        };

        // Pull every order this submission touched out of the book (ending
        // the borrow of `self.books`) before mutating other engine fields.
        let mut touched_orders: Vec<Order> = vec![book.get_order(&order_id).unwrap().clone()];
        touched_orders.extend(touched.iter().map(|cid| book.get_order(cid).unwrap().clone()));

        let final_order = touched_orders[0].clone();
        for order in touched_orders {
            let trader_id = order.trader_id.clone();
            let oid = order.order_id;
            let done = order.is_fulfilled() || (order.ordertype == OrderType::Ioc && order.is_executed);
            self.order_history.insert(oid, order);
            if done && self.trader_orders.get(&trader_id) == Some(&oid) {
                self.trader_orders.remove(&trader_id);
            }
        }

        let success = if final_order.ordertype == OrderType::Ioc {
            final_order.is_executed
        } else {
            final_order.is_fulfilled()
        };

        info!(order_id = %order_id, ticker = %new_order.ticker, success, pnl, "submit handled");
        EngineSubmit::Accepted { order: final_order, success, pnl }
    }

    /// §4.6 AMEND.
    pub fn amend(&mut self, order_id: OrderId, new_quantity: u64) -> EngineAck {
        let Some(ticker) = self.order_tickers.get(&order_id).cloned() else {
            return EngineAck::Failed;
        };
        let Some(book) = self.books.get_mut(&ticker) else {
            return EngineAck::Failed;
        };
        if book.amend(order_id, new_quantity) {
            if let Some(order) = book.get_order(&order_id).cloned() {
                self.order_history.insert(order_id, order);
            }
            EngineAck::Ok
        } else {
            EngineAck::Failed
        }
    }

    /// §4.6 CANCEL.
    pub fn cancel(&mut self, order_id: OrderId) -> EngineAck {
        let Some(ticker) = self.order_tickers.get(&order_id).cloned() else {
            return EngineAck::Failed;
        };
        let Some(book) = self.books.get_mut(&ticker) else {
            return EngineAck::Failed;
        };
        if book.cancel(order_id) {
            self.order_tickers.remove(&order_id);
            if let Some(order) = self.order_history.get(&order_id) {
                self.trader_orders.remove(&order.trader_id);
            }
            EngineAck::Ok
        } else {
            EngineAck::Failed
        }
    }

    /// §4.6 GET.
    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        self.order_history.get(order_id)
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_order(trader: &str, ticker: &str, side: Side, ordertype: OrderType, price: Option<f64>, qty: u64) -> NewOrder {
        NewOrder {
            trader_id: trader.to_string(),
            ticker: ticker.to_string(),
            side,
            ordertype,
            price,
            quantity: qty,
        }
    }

    #[test]
    fn simple_cross_across_the_engine_boundary() {
        let mut engine = MatchingEngine::new();
        let buy = new_order("1", "FB", Side::Buy, OrderType::Limit, Some(100.0), 5);
        let buy_outcome = engine.submit(buy);
        let EngineSubmit::Accepted { order: buy_order, success, .. } = buy_outcome else {
            panic!("expected accepted")
        };
        assert!(!success);

        let sell = new_order("2", "FB", Side::Sell, OrderType::Limit, Some(100.0), 5);
        let sell_outcome = engine.submit(sell);
        let EngineSubmit::Accepted { order: sell_order, success, pnl } = sell_outcome else {
            panic!("expected accepted")
        };
        assert!(success);
        assert_eq!(pnl, 500.0);

        let fetched_buy = engine.get(&buy_order.order_id).unwrap();
        assert!(fetched_buy.is_fulfilled());
        let fetched_sell = engine.get(&sell_order.order_id).unwrap();
        assert!(fetched_sell.is_fulfilled());
    }

    #[test]
    fn duplicate_trader_is_rejected_but_still_recorded_in_history() {
        let mut engine = MatchingEngine::new();
        let first = new_order("7", "FB", Side::Buy, OrderType::Limit, Some(50.0), 10);
        engine.submit(first);

        let second = new_order("7", "GOOG", Side::Sell, OrderType::Limit, Some(10.0), 1);
        let outcome = engine.submit(second);
        let EngineSubmit::RejectedDuplicateTrader { order } = outcome else {
            panic!("expected rejection")
        };
        assert!(engine.get(&order.order_id).is_some());
    }

    #[test]
    fn cancel_releases_trader_orders_slot_for_a_new_submission() {
        let mut engine = MatchingEngine::new();
        let first = new_order("7", "FB", Side::Buy, OrderType::Limit, Some(50.0), 10);
        let EngineSubmit::Accepted { order, .. } = engine.submit(first) else {
            panic!()
        };

        assert!(matches!(engine.cancel(order.order_id), EngineAck::Ok));

        let second = new_order("7", "FB", Side::Sell, OrderType::Limit, Some(999.0), 1);
        assert!(matches!(engine.submit(second), EngineSubmit::Accepted { .. }));
    }

    #[test]
    fn get_on_unknown_id_returns_none() {
        let engine = MatchingEngine::new();
        assert!(engine.get(&Uuid::new_v4()).is_none());
    }
}
