//! Wire envelopes: one JSON object per line in, one JSON object per line out
//! (§6). This module owns parsing and field validation; nothing downstream
//! of [`Command::validate`] ever inspects a raw string again.

use crate::order::{Order, OrderId, OrderType, Side, Ticker, TraderId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestType {
    Submit,
    Amend,
    Cancel,
    Get,
}

impl RequestType {
    pub fn from_str(value: &str) -> Result<Self, CommandError> {
        match value.trim().to_uppercase().as_str() {
            "SUBMIT" => Ok(RequestType::Submit),
            "AMEND" => Ok(RequestType::Amend),
            "CANCEL" => Ok(RequestType::Cancel),
            "GET" => Ok(RequestType::Get),
            other => Err(CommandError::BadInput(format!("unknown request_type: {other}"))),
        }
    }
}

/// Raw wire shape for an incoming command. Every field beyond `request_type`
/// is optional here; [`RawCommand::validate`] enforces the per-type
/// requirements from §6.
#[derive(Debug, Deserialize)]
pub struct RawCommand {
    pub request_type: String,
    pub trader_id: Option<TraderId>,
    pub order_id: Option<OrderId>,
    pub order_type: Option<String>,
    pub order_side: Option<String>,
    pub ticker: Option<Ticker>,
    pub quantity: Option<u64>,
    pub price: Option<f64>,
}

/// A validated command, ready for the engine.
#[derive(Debug)]
pub enum Command {
    Submit {
        trader_id: TraderId,
        ticker: Ticker,
        side: Side,
        ordertype: OrderType,
        price: Option<f64>,
        quantity: u64,
    },
    Amend { order_id: OrderId, quantity: u64 },
    Cancel { order_id: OrderId },
    Get { order_id: OrderId },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("bad input: {0}")]
    BadInput(String),
}

impl RawCommand {
    pub fn validate(self) -> Result<Command, CommandError> {
        let request_type = RequestType::from_str(&self.request_type)?;
        match request_type {
            RequestType::Submit => {
                let trader_id = self
                    .trader_id
                    .ok_or_else(|| CommandError::BadInput("SUBMIT requires trader_id".into()))?;
                let ticker = self
                    .ticker
                    .ok_or_else(|| CommandError::BadInput("SUBMIT requires ticker".into()))?;
                let quantity = self
                    .quantity
                    .ok_or_else(|| CommandError::BadInput("SUBMIT requires quantity".into()))?;
                if quantity == 0 {
                    return Err(CommandError::BadInput("quantity must be positive".into()));
                }
                let side = Side::from_str(
                    self.order_side
                        .as_deref()
                        .ok_or_else(|| CommandError::BadInput("SUBMIT requires order_side".into()))?,
                )
                .map_err(CommandError::BadInput)?;
                let ordertype = OrderType::from_str(
                    self.order_type
                        .as_deref()
                        .ok_or_else(|| CommandError::BadInput("SUBMIT requires order_type".into()))?,
                )
                .map_err(CommandError::BadInput)?;
                let price = if ordertype.requires_price() {
                    let p = self
                        .price
                        .ok_or_else(|| CommandError::BadInput(format!("{ordertype:?} requires price")))?;
                    if p <= 0.0 {
                        return Err(CommandError::BadInput("price must be strictly positive".into()));
                    }
                    Some(p)
                } else {
                    None
                };
                Ok(Command::Submit { trader_id, ticker, side, ordertype, price, quantity })
            }
            RequestType::Amend => {
                let order_id = self
                    .order_id
                    .ok_or_else(|| CommandError::BadInput("AMEND requires order_id".into()))?;
                let quantity = self
                    .quantity
                    .ok_or_else(|| CommandError::BadInput("AMEND requires quantity".into()))?;
                Ok(Command::Amend { order_id, quantity })
            }
            RequestType::Cancel => {
                let order_id = self
                    .order_id
                    .ok_or_else(|| CommandError::BadInput("CANCEL requires order_id".into()))?;
                Ok(Command::Cancel { order_id })
            }
            RequestType::Get => {
                let order_id = self
                    .order_id
                    .ok_or_else(|| CommandError::BadInput("GET requires order_id".into()))?;
                Ok(Command::Get { order_id })
            }
        }
    }
}

/// Wire shape for a response: `success` plus the order touched, if any
/// (§6 — AMEND/CANCEL never return an order).
#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub order: Option<Order>,
}

impl Response {
    pub fn ok(order: Order, success: bool) -> Self {
        Response { success, order: Some(order) }
    }

    pub fn ack(success: bool) -> Self {
        Response { success, order: None }
    }

    pub fn not_found() -> Self {
        Response { success: false, order: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_without_price_on_limit_is_bad_input() {
        let raw = RawCommand {
            request_type: "submit".into(),
            trader_id: Some("1".into()),
            order_id: None,
            order_type: Some("limit".into()),
            order_side: Some("buy".into()),
            ticker: Some("FB".into()),
            quantity: Some(5),
            price: None,
        };
        assert!(raw.validate().is_err());
    }

    #[test]
    fn submit_market_order_does_not_require_price() {
        let raw = RawCommand {
            request_type: "SUBMIT".into(),
            trader_id: Some("1".into()),
            order_id: None,
            order_type: Some("MARKET".into()),
            order_side: Some("SELL".into()),
            ticker: Some("FB".into()),
            quantity: Some(5),
            price: None,
        };
        let command = raw.validate().unwrap();
        assert!(matches!(command, Command::Submit { ordertype: OrderType::Market, price: None, .. }));
    }

    #[test]
    fn unknown_request_type_is_bad_input() {
        let raw = RawCommand {
            request_type: "FROB".into(),
            trader_id: None,
            order_id: None,
            order_type: None,
            order_side: None,
            ticker: None,
            quantity: None,
            price: None,
        };
        assert!(raw.validate().is_err());
    }

    #[test]
    fn get_requires_only_an_order_id() {
        let raw = RawCommand {
            request_type: "get".into(),
            trader_id: None,
            order_id: Some(uuid::Uuid::new_v4()),
            order_type: None,
            order_side: None,
            ticker: None,
            quantity: None,
            price: None,
        };
        assert!(matches!(raw.validate().unwrap(), Command::Get { .. }));
    }
}
