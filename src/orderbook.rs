//! Per-ticker order book: priority sequences, the matching algorithm for all
//! three order types, and amend/cancel.

use crate::order::{Fill, Order, OrderId, OrderType, Side, Ticker, TraderId};
use crate::trade::Trade;
use std::collections::HashMap;
use tracing::{info, warn};

/// Result of [`OrderBook::submit`].
pub enum SubmitOutcome {
    /// The trader already has an active order resting on this book.
    Rejected,
    /// The order was accepted and run through the matching loop.
    Handled {
        /// Cash flow of the incoming order from its own point of view (§4.3).
        pnl: f64,
        /// Every counterparty order id that took part in a fill, in the order
        /// the fills happened. The caller (the engine) uses this to decide
        /// whose `trader_orders` entry may need releasing.
        touched: Vec<OrderId>,
    },
}

/// An [`OrderBook`] holds two priority sequences — `bids` (buy orders,
/// highest price first) and `offers` (sell orders, lowest price first) —
/// plus the order/trade bookkeeping for a single ticker.
///
/// Orders live in `orders`, keyed by id; `bids`/`offers` hold only ids, which
/// keeps the priority sequences cheap to reorder and avoids two places
/// holding the same record (§9 "Cross-references between orders and books").
pub struct OrderBook {
    pub ticker: Ticker,
    pub bids: Vec<OrderId>,
    pub offers: Vec<OrderId>,
    pub orders: HashMap<OrderId, Order>,
    pub trades: HashMap<OrderId, Vec<Fill>>,
    pub trader_orders: HashMap<TraderId, OrderId>,
}

impl OrderBook {
    pub fn new(ticker: Ticker) -> Self {
        Self {
            ticker,
            bids: Vec::new(),
            offers: Vec::new(),
            orders: HashMap::new(),
            trades: HashMap::new(),
            trader_orders: HashMap::new(),
        }
    }

    pub fn get_order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Inserts before the first existing bid whose price is `<= price`
    /// (§4.2.1): newer orders sit ahead of equally-priced older ones.
    fn insert_bid(&mut self, id: OrderId) {
        let price = self.orders[&id].price;
        let pos = self
            .bids
            .iter()
            .position(|existing| self.orders[existing].price <= price);
        match pos {
            Some(i) => self.bids.insert(i, id),
            None => self.bids.push(id),
        }
    }

    /// Dual of [`Self::insert_bid`] for the offer side.
    fn insert_offer(&mut self, id: OrderId) {
        let price = self.orders[&id].price;
        let pos = self
            .offers
            .iter()
            .position(|existing| self.orders[existing].price >= price);
        match pos {
            Some(i) => self.offers.insert(i, id),
            None => self.offers.push(id),
        }
    }

    /// Records one fill on both sides of `trades`, mirrors it onto each
    /// `Order.trades`, and emits a trace event (§4.3).
    fn record_fill(&mut self, incoming_id: OrderId, counter_id: OrderId, qty: u64, price: f64) {
        let incoming_side = self.orders[&incoming_id].side;
        let cash = qty as f64 * price;
        let (incoming_signed, counter_signed) = match incoming_side {
            Side::Buy => (-cash, cash),
            Side::Sell => (cash, -cash),
        };
        self.trades
            .entry(incoming_id)
            .or_default()
            .push((counter_id, incoming_signed));
        self.trades
            .entry(counter_id)
            .or_default()
            .push((incoming_id, counter_signed));

        let incoming_trades = self.trades[&incoming_id].clone();
        let counter_trades = self.trades[&counter_id].clone();
        self.orders.get_mut(&incoming_id).unwrap().trades = incoming_trades;
        self.orders.get_mut(&counter_id).unwrap().trades = counter_trades;

        let trade = Trade {
            ticker: self.ticker.clone(),
            price,
            quantity: qty,
            maker_id: counter_id,
            taker_id: incoming_id,
            timestamp: std::time::SystemTime::now(),
        };
        info!(?trade, "fill");
    }

    /// Removes a trader's `trader_orders` entry once their order is done:
    /// fully filled, or an IOC that has had its one shot (§4.5).
    fn release_if_done(&mut self, id: OrderId) {
        let Some(order) = self.orders.get(&id) else {
            return;
        };
        let done = order.is_fulfilled() || (order.ordertype == OrderType::Ioc && order.is_executed);
        if done && self.trader_orders.get(&order.trader_id) == Some(&id) {
            self.trader_orders.remove(&order.trader_id);
        }
    }

    /// Accepts a new order: rejects on a duplicate active trader (§4.5),
    /// otherwise dispatches to the matching routine for its order type and
    /// releases any trader locks the match just satisfied.
    pub fn submit(&mut self, order: Order) -> SubmitOutcome {
        if self.trader_orders.contains_key(&order.trader_id) {
            return SubmitOutcome::Rejected;
        }
        let incoming_id = order.order_id;
        let ordertype = order.ordertype;
        self.trader_orders.insert(order.trader_id.clone(), incoming_id);
        self.orders.insert(incoming_id, order);
        self.trades.entry(incoming_id).or_default();

        let pnl = match ordertype {
            OrderType::Market => self.handle_market(incoming_id),
            OrderType::Limit => self.handle_limit(incoming_id),
            OrderType::Ioc => self.handle_ioc(incoming_id),
        };

        let touched: Vec<OrderId> = self.trades[&incoming_id].iter().map(|(cid, _)| *cid).collect();

        self.release_if_done(incoming_id);
        for cid in &touched {
            self.release_if_done(*cid);
        }

        SubmitOutcome::Handled { pnl, touched }
    }

    /// Shrinks a resting order's quantity (§4.4). Never grows it, never moves
    /// its priority position.
    pub fn amend(&mut self, order_id: OrderId, new_quantity: u64) -> bool {
        let resting = self.bids.contains(&order_id) || self.offers.contains(&order_id);
        if !resting {
            return false;
        }
        let Some(order) = self.orders.get(&order_id) else {
            return false;
        };
        if order.remaining() > new_quantity {
            self.orders.get_mut(&order_id).unwrap().quantity = new_quantity;
            true
        } else {
            false
        }
    }

    /// Removes a resting order entirely (§4.4).
    pub fn cancel(&mut self, order_id: OrderId) -> bool {
        let removed = if let Some(pos) = self.bids.iter().position(|&id| id == order_id) {
            self.bids.remove(pos);
            true
        } else if let Some(pos) = self.offers.iter().position(|&id| id == order_id) {
            self.offers.remove(pos);
            true
        } else {
            false
        };
        if removed {
            if let Some(order) = self.orders.remove(&order_id) {
                self.trader_orders.remove(&order.trader_id);
            }
        }
        removed
    }

    /// LIMIT buy/sell: standard crossing test against the top of the
    /// opposite side, sweeping as many levels as the incoming quantity
    /// allows (§4.2.3).
    fn handle_limit(&mut self, incoming_id: OrderId) -> f64 {
        let side = self.orders[&incoming_id].side;
        let mut pnl = 0.0;
        match side {
            Side::Sell => {
                while let Some(&bid_id) = self.bids.first() {
                    if self.orders[&bid_id].ordertype == OrderType::Market {
                        let incoming_price = self.orders[&incoming_id].price;
                        self.orders.get_mut(&bid_id).unwrap().price = incoming_price;
                    }
                    let incoming_price = self.orders[&incoming_id].price;
                    let bid_price = self.orders[&bid_id].price;
                    if incoming_price > bid_price {
                        break;
                    }
                    if self.orders[&bid_id].ordertype == OrderType::Ioc && self.orders[&bid_id].is_executed {
                        self.bids.remove(0);
                        continue;
                    }
                    if self.orders[&bid_id].ordertype == OrderType::Ioc {
                        self.orders.get_mut(&bid_id).unwrap().is_executed = true;
                    }

                    let incoming_remaining = self.orders[&incoming_id].remaining();
                    let bid_remaining = self.orders[&bid_id].remaining();
                    let qty = incoming_remaining.min(bid_remaining);
                    let price = bid_price;
                    self.orders.get_mut(&incoming_id).unwrap().fill(qty);
                    self.orders.get_mut(&bid_id).unwrap().fill(qty);
                    pnl += qty as f64 * price;
                    self.record_fill(incoming_id, bid_id, qty, price);

                    if incoming_remaining < bid_remaining {
                        if self.orders[&bid_id].ordertype == OrderType::Ioc {
                            self.bids.remove(0);
                        }
                        break;
                    } else if incoming_remaining > bid_remaining {
                        self.bids.remove(0);
                    } else {
                        self.bids.remove(0);
                        break;
                    }
                }
                if !self.orders[&incoming_id].is_fulfilled() {
                    self.insert_offer(incoming_id);
                }
            }
            Side::Buy => {
                while let Some(&offer_id) = self.offers.first() {
                    if self.orders[&offer_id].ordertype == OrderType::Market {
                        let incoming_price = self.orders[&incoming_id].price;
                        self.orders.get_mut(&offer_id).unwrap().price = incoming_price;
                    }
                    let incoming_price = self.orders[&incoming_id].price;
                    let offer_price = self.orders[&offer_id].price;
                    if incoming_price < offer_price {
                        break;
                    }
                    if self.orders[&offer_id].ordertype == OrderType::Ioc && self.orders[&offer_id].is_executed {
                        self.offers.remove(0);
                        continue;
                    }
                    if self.orders[&offer_id].ordertype == OrderType::Ioc {
                        self.orders.get_mut(&offer_id).unwrap().is_executed = true;
                    }

                    let incoming_remaining = self.orders[&incoming_id].remaining();
                    let offer_remaining = self.orders[&offer_id].remaining();
                    let qty = incoming_remaining.min(offer_remaining);
                    let price = offer_price;
                    self.orders.get_mut(&incoming_id).unwrap().fill(qty);
                    self.orders.get_mut(&offer_id).unwrap().fill(qty);
                    pnl -= qty as f64 * price;
                    self.record_fill(incoming_id, offer_id, qty, price);

                    if incoming_remaining < offer_remaining {
                        if self.orders[&offer_id].ordertype == OrderType::Ioc {
                            self.offers.remove(0);
                        }
                        break;
                    } else if incoming_remaining > offer_remaining {
                        self.offers.remove(0);
                    } else {
                        self.offers.remove(0);
                        break;
                    }
                }
                if !self.orders[&incoming_id].is_fulfilled() {
                    self.insert_bid(incoming_id);
                }
            }
        }
        pnl
    }

    /// IOC buy/sell: one attempt against the current top of book only
    /// (skipping over already-spent resting IOCs first); the remainder is
    /// re-rested only when nothing matched at all (§3, §4.2.3).
    fn handle_ioc(&mut self, incoming_id: OrderId) -> f64 {
        let side = self.orders[&incoming_id].side;
        let mut pnl = 0.0;
        match side {
            Side::Sell => {
                while matches!(self.bids.first(), Some(&id) if self.orders[&id].ordertype == OrderType::Ioc && self.orders[&id].is_executed)
                {
                    self.bids.remove(0);
                }
                if let Some(&bid_id) = self.bids.first() {
                    if self.orders[&bid_id].ordertype == OrderType::Market {
                        let incoming_price = self.orders[&incoming_id].price;
                        self.orders.get_mut(&bid_id).unwrap().price = incoming_price;
                    }
                    let incoming_price = self.orders[&incoming_id].price;
                    let bid_price = self.orders[&bid_id].price;
                    if incoming_price <= bid_price {
                        self.orders.get_mut(&incoming_id).unwrap().is_executed = true;
                        if self.orders[&bid_id].ordertype == OrderType::Ioc {
                            self.orders.get_mut(&bid_id).unwrap().is_executed = true;
                        }
                        let incoming_remaining = self.orders[&incoming_id].remaining();
                        let bid_remaining = self.orders[&bid_id].remaining();
                        let qty = incoming_remaining.min(bid_remaining);
                        let price = bid_price;
                        self.orders.get_mut(&incoming_id).unwrap().fill(qty);
                        self.orders.get_mut(&bid_id).unwrap().fill(qty);
                        pnl += qty as f64 * price;
                        self.record_fill(incoming_id, bid_id, qty, price);

                        if incoming_remaining >= bid_remaining || self.orders[&bid_id].ordertype == OrderType::Ioc {
                            self.bids.remove(0);
                        }
                    }
                }
                if !self.orders[&incoming_id].is_executed {
                    self.insert_offer(incoming_id);
                }
            }
            Side::Buy => {
                while matches!(self.offers.first(), Some(&id) if self.orders[&id].ordertype == OrderType::Ioc && self.orders[&id].is_executed)
                {
                    self.offers.remove(0);
                }
                if let Some(&offer_id) = self.offers.first() {
                    if self.orders[&offer_id].ordertype == OrderType::Market {
                        let incoming_price = self.orders[&incoming_id].price;
                        self.orders.get_mut(&offer_id).unwrap().price = incoming_price;
                    }
                    let incoming_price = self.orders[&incoming_id].price;
                    let offer_price = self.orders[&offer_id].price;
                    if incoming_price >= offer_price {
                        self.orders.get_mut(&incoming_id).unwrap().is_executed = true;
                        if self.orders[&offer_id].ordertype == OrderType::Ioc {
                            self.orders.get_mut(&offer_id).unwrap().is_executed = true;
                        }
                        let incoming_remaining = self.orders[&incoming_id].remaining();
                        let offer_remaining = self.orders[&offer_id].remaining();
                        let qty = incoming_remaining.min(offer_remaining);
                        let price = offer_price;
                        self.orders.get_mut(&incoming_id).unwrap().fill(qty);
                        self.orders.get_mut(&offer_id).unwrap().fill(qty);
                        pnl -= qty as f64 * price;
                        self.record_fill(incoming_id, offer_id, qty, price);

                        if incoming_remaining >= offer_remaining || self.orders[&offer_id].ordertype == OrderType::Ioc
                        {
                            self.offers.remove(0);
                        }
                    }
                }
                if !self.orders[&incoming_id].is_executed {
                    self.insert_bid(incoming_id);
                }
            }
        }
        pnl
    }

    /// MARKET buy/sell: no intrinsic price, so no crossing test — it sweeps
    /// quantity against whatever is resting, resolving any leading MARKET
    /// counter-orders to the next real price first (§4.2.3).
    fn handle_market(&mut self, incoming_id: OrderId) -> f64 {
        let side = self.orders[&incoming_id].side;
        let mut pnl = 0.0;
        let mut stash: Vec<OrderId> = Vec::new();
        match side {
            Side::Sell => {
                loop {
                    let Some(&bid_id) = self.bids.first() else { break };
                    if self.orders[&bid_id].price.is_infinite() {
                        let mut discovered = None;
                        let mut idx = 1;
                        while idx < self.bids.len() {
                            if self.orders[&self.bids[idx]].price.is_infinite() {
                                idx += 1;
                            } else {
                                discovered = Some(self.orders[&self.bids[idx]].price);
                                break;
                            }
                        }
                        match discovered {
                            Some(p) => {
                                let removed: Vec<OrderId> = self.bids.drain(1..idx).collect();
                                stash.extend(removed);
                                self.orders.get_mut(&bid_id).unwrap().price = p;
                            }
                            None => {
                                warn!(ticker = %self.ticker, "market order has no counter-price to discover");
                                break;
                            }
                        }
                    }
                    if self.orders[&bid_id].ordertype == OrderType::Ioc && self.orders[&bid_id].is_executed {
                        self.bids.remove(0);
                        continue;
                    }
                    if self.orders[&bid_id].ordertype == OrderType::Ioc {
                        self.orders.get_mut(&bid_id).unwrap().is_executed = true;
                    }

                    let incoming_remaining = self.orders[&incoming_id].remaining();
                    let bid_remaining = self.orders[&bid_id].remaining();
                    let qty = incoming_remaining.min(bid_remaining);
                    let price = self.orders[&bid_id].price;
                    self.orders.get_mut(&incoming_id).unwrap().fill(qty);
                    self.orders.get_mut(&bid_id).unwrap().fill(qty);
                    pnl += qty as f64 * price;
                    self.record_fill(incoming_id, bid_id, qty, price);

                    if incoming_remaining < bid_remaining {
                        if self.orders[&bid_id].ordertype == OrderType::Ioc {
                            self.bids.remove(0);
                        }
                        break;
                    } else if incoming_remaining > bid_remaining {
                        self.bids.remove(0);
                    } else {
                        self.bids.remove(0);
                        break;
                    }
                }
                if !self.orders[&incoming_id].is_fulfilled() {
                    self.insert_offer(incoming_id);
                }
                if !stash.is_empty() {
                    stash.append(&mut self.bids);
                    self.bids = stash;
                }
            }
            Side::Buy => {
                loop {
                    let Some(&offer_id) = self.offers.first() else { break };
                    if self.orders[&offer_id].price == 0.0 {
                        let mut discovered = None;
                        let mut idx = 1;
                        while idx < self.offers.len() {
                            if self.orders[&self.offers[idx]].price == 0.0 {
                                idx += 1;
                            } else {
                                discovered = Some(self.orders[&self.offers[idx]].price);
                                break;
                            }
                        }
                        match discovered {
                            Some(p) => {
                                let removed: Vec<OrderId> = self.offers.drain(1..idx).collect();
                                stash.extend(removed);
                                self.orders.get_mut(&offer_id).unwrap().price = p;
                            }
                            None => {
                                warn!(ticker = %self.ticker, "market order has no counter-price to discover");
                                break;
                            }
                        }
                    }
                    if self.orders[&offer_id].ordertype == OrderType::Ioc && self.orders[&offer_id].is_executed {
                        self.offers.remove(0);
                        continue;
                    }
                    if self.orders[&offer_id].ordertype == OrderType::Ioc {
                        self.orders.get_mut(&offer_id).unwrap().is_executed = true;
                    }

                    let incoming_remaining = self.orders[&incoming_id].remaining();
                    let offer_remaining = self.orders[&offer_id].remaining();
                    let qty = incoming_remaining.min(offer_remaining);
                    let price = self.orders[&offer_id].price;
                    self.orders.get_mut(&incoming_id).unwrap().fill(qty);
                    self.orders.get_mut(&offer_id).unwrap().fill(qty);
                    pnl -= qty as f64 * price;
                    self.record_fill(incoming_id, offer_id, qty, price);

                    if incoming_remaining < offer_remaining {
                        if self.orders[&offer_id].ordertype == OrderType::Ioc {
                            self.offers.remove(0);
                        }
                        break;
                    } else if incoming_remaining > offer_remaining {
                        self.offers.remove(0);
                    } else {
                        self.offers.remove(0);
                        break;
                    }
                }
                if !self.orders[&incoming_id].is_fulfilled() {
                    self.insert_bid(incoming_id);
                }
                if !stash.is_empty() {
                    stash.append(&mut self.offers);
                    self.offers = stash;
                }
            }
        }
        pnl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;
    use uuid::Uuid;

    fn limit(trader: &str, side: Side, price: f64, qty: u64) -> Order {
        Order::new(
            Uuid::new_v4(),
            trader.to_string(),
            "FB".to_string(),
            side,
            OrderType::Limit,
            Some(price),
            qty,
        )
    }

    fn ioc(trader: &str, side: Side, price: f64, qty: u64) -> Order {
        Order::new(
            Uuid::new_v4(),
            trader.to_string(),
            "FB".to_string(),
            side,
            OrderType::Ioc,
            Some(price),
            qty,
        )
    }

    fn market(trader: &str, side: Side, qty: u64) -> Order {
        Order::new(Uuid::new_v4(), trader.to_string(), "FB".to_string(), side, OrderType::Market, None, qty)
    }

    fn handled(outcome: SubmitOutcome) -> (f64, Vec<OrderId>) {
        match outcome {
            SubmitOutcome::Handled { pnl, touched } => (pnl, touched),
            SubmitOutcome::Rejected => panic!("expected Handled"),
        }
    }

    #[test]
    fn simple_limit_cross_fully_fills_both_sides() {
        let mut book = OrderBook::new("FB".into());
        let buy = limit("1", Side::Buy, 100.0, 5);
        let buy_id = buy.order_id;
        handled(book.submit(buy));

        let sell = limit("2", Side::Sell, 100.0, 5);
        let sell_id = sell.order_id;
        let (pnl, touched) = handled(book.submit(sell));

        assert_eq!(pnl, 500.0);
        assert_eq!(touched, vec![buy_id]);
        assert!(book.orders[&buy_id].is_fulfilled());
        assert!(book.orders[&sell_id].is_fulfilled());
        assert_eq!(book.orders[&buy_id].trades, vec![(sell_id, -500.0)]);
        assert_eq!(book.orders[&sell_id].trades, vec![(buy_id, 500.0)]);
        assert!(book.bids.is_empty());
        assert!(book.offers.is_empty());
        assert!(book.trader_orders.is_empty());
    }

    #[test]
    fn partial_limit_sweep_walks_price_levels_in_priority_order() {
        let mut book = OrderBook::new("FB".into());
        let t1 = limit("1", Side::Buy, 100.0, 10);
        let t1_id = t1.order_id;
        handled(book.submit(t1));
        let t2 = limit("2", Side::Buy, 120.0, 8);
        let t2_id = t2.order_id;
        handled(book.submit(t2));
        let t3 = limit("3", Side::Buy, 90.0, 5);
        handled(book.submit(t3));

        let incoming = limit("5", Side::Sell, 90.0, 10);
        let incoming_id = incoming.order_id;
        let (pnl, touched) = handled(book.submit(incoming));

        assert_eq!(pnl, 1160.0);
        assert_eq!(touched, vec![t2_id, t1_id]);
        assert_eq!(book.orders[&incoming_id].trades, vec![(t2_id, 960.0), (t1_id, 200.0)]);
        assert!(book.orders[&t2_id].is_fulfilled());
        assert_eq!(book.orders[&t1_id].remaining(), 8);
        assert_eq!(book.bids.len(), 2);
    }

    #[test]
    fn market_against_empty_book_rests_at_sentinel_and_does_not_cross_another_market() {
        let mut book = OrderBook::new("X".into());
        let buy = market("1", Side::Buy, 10);
        let buy_id = buy.order_id;
        let (pnl, _) = handled(book.submit(buy));
        assert_eq!(pnl, 0.0);
        assert_eq!(book.bids, vec![buy_id]);
        assert!(book.orders[&buy_id].price.is_infinite());

        let sell = market("2", Side::Sell, 10);
        let sell_id = sell.order_id;
        let (pnl2, touched) = handled(book.submit(sell));
        assert_eq!(pnl2, 0.0);
        assert!(touched.is_empty());
        assert!(book.bids.contains(&buy_id));
        assert!(book.offers.contains(&sell_id));
        assert_eq!(book.orders[&sell_id].price, 0.0);
    }

    #[test]
    fn market_resolves_price_through_a_stashed_resting_market_order() {
        let mut book = OrderBook::new("X".into());
        let resting_market = market("1", Side::Buy, 10);
        let resting_id = resting_market.order_id;
        handled(book.submit(resting_market));

        let resting_limit = limit("2", Side::Buy, 100.0, 10);
        let limit_id = resting_limit.order_id;
        handled(book.submit(resting_limit));

        let incoming = market("3", Side::Sell, 10);
        let incoming_id = incoming.order_id;
        let (pnl, touched) = handled(book.submit(incoming));

        assert_eq!(pnl, 1000.0);
        assert_eq!(touched, vec![resting_id]);
        assert_eq!(book.orders[&resting_id].trades, vec![(incoming_id, -1000.0)]);
        assert_eq!(book.orders[&incoming_id].trades, vec![(resting_id, 1000.0)]);
        assert!(book.orders[&resting_id].is_fulfilled());
        assert_eq!(book.orders[&limit_id].remaining(), 10);
        assert!(book.bids.contains(&limit_id));
    }

    #[test]
    fn ioc_partial_fill_marks_executed_and_resting_counter_survives() {
        let mut book = OrderBook::new("FB".into());
        let resting = limit("1", Side::Sell, 100.0, 5);
        let resting_id = resting.order_id;
        handled(book.submit(resting));

        let incoming = ioc("2", Side::Buy, 100.0, 3);
        let incoming_id = incoming.order_id;
        handled(book.submit(incoming));

        assert!(book.orders[&incoming_id].is_executed);
        assert!(book.orders[&incoming_id].is_fulfilled());
        assert_eq!(book.orders[&resting_id].filled, 3);
        assert_eq!(book.orders[&resting_id].quantity, 5);
        assert!(book.offers.contains(&resting_id));
    }

    #[test]
    fn ioc_with_no_counter_rests_fully_but_one_that_partially_matched_does_not() {
        let mut book = OrderBook::new("FB".into());
        let lonely = ioc("1", Side::Buy, 50.0, 10);
        let lonely_id = lonely.order_id;
        handled(book.submit(lonely));
        assert!(!book.orders[&lonely_id].is_executed);
        assert!(book.bids.contains(&lonely_id));

        let resting = limit("2", Side::Sell, 100.0, 3);
        handled(book.submit(resting));
        let partial = ioc("3", Side::Buy, 100.0, 5);
        let partial_id = partial.order_id;
        handled(book.submit(partial));
        assert!(book.orders[&partial_id].is_executed);
        assert_eq!(book.orders[&partial_id].remaining(), 2);
        assert!(!book.bids.contains(&partial_id)); // matched something, so it is not re-rested
    }

    #[test]
    fn trader_with_a_resting_order_cannot_submit_a_second_one() {
        let mut book = OrderBook::new("FB".into());
        let first = limit("7", Side::Buy, 50.0, 10);
        handled(book.submit(first));

        let second = limit("7", Side::Sell, 999.0, 1);
        match book.submit(second) {
            SubmitOutcome::Rejected => {}
            SubmitOutcome::Handled { .. } => panic!("expected rejection"),
        }
    }

    #[test]
    fn amend_only_succeeds_when_shrinking_below_remaining() {
        let mut book = OrderBook::new("FB".into());
        let order = limit("1", Side::Buy, 50.0, 10);
        let id = order.order_id;
        handled(book.submit(order));

        assert!(!book.amend(id, 10)); // not strictly less
        assert!(!book.amend(id, 11));
        assert!(book.amend(id, 4));
        assert_eq!(book.orders[&id].quantity, 4);
    }

    #[test]
    fn cancel_removes_from_book_but_fulfilled_orders_cannot_be_cancelled() {
        let mut book = OrderBook::new("FB".into());
        let buy = limit("1", Side::Buy, 100.0, 5);
        let buy_id = buy.order_id;
        handled(book.submit(buy));
        let sell = limit("2", Side::Sell, 100.0, 5);
        handled(book.submit(sell));

        assert!(!book.cancel(buy_id)); // fully filled, no longer resting
    }

    #[test]
    fn equal_price_tie_break_puts_the_newer_order_first() {
        let mut book = OrderBook::new("FB".into());
        let first = limit("1", Side::Buy, 100.0, 1);
        let first_id = first.order_id;
        handled(book.submit(first));
        let second = limit("2", Side::Buy, 100.0, 1);
        let second_id = second.order_id;
        handled(book.submit(second));

        assert_eq!(book.bids, vec![second_id, first_id]);
    }
}
