//! Trader-facing CLI: sends one command per invocation to a running engine
//! and prints the response. Enum strings are case-insensitive and trimmed
//! (§6); the CLI itself never talks to the engine in-process — it's just
//! another client of the wire protocol in `client.rs`.

use clap::{Parser, Subcommand};
use serde_json::json;
use uuid::Uuid;

use crate::client::send_command;
use crate::command::Response;

#[derive(Parser)]
#[command(name = "matching-engine-cli")]
#[command(version, about = "Trader CLI for the matching engine")]
pub struct Cli {
    /// Address of a running `serve` instance.
    #[arg(long, env = "ENGINE_ADDR", default_value = "127.0.0.1:9999")]
    pub addr: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a new order (CommandType::NEW).
    New {
        trader_id: String,
        ticker: String,
        /// BUY or SELL
        side: String,
        /// MARKET, LIMIT, or IOC
        order_type: String,
        quantity: u64,
        /// Required for LIMIT and IOC.
        price: Option<f64>,
    },
    /// Shrink a resting order's quantity.
    Amend { order_id: Uuid, quantity: u64 },
    /// Remove a resting order.
    Cancel { order_id: Uuid },
    /// Fetch an order by id.
    Get { order_id: Uuid },
}

pub async fn run_cli(cli: Cli) -> anyhow::Result<()> {
    dispatch(&cli.addr, cli.command).await
}

/// Sends one `command` to the engine at `addr` and prints the response.
/// Split out from [`run_cli`] so a host binary can fold these subcommands
/// into its own top-level `clap` tree instead of parsing a standalone `Cli`.
pub async fn dispatch(addr: &str, command: Commands) -> anyhow::Result<()> {
    let envelope = match command {
        Commands::New { trader_id, ticker, side, order_type, quantity, price } => json!({
            "request_type": "SUBMIT",
            "trader_id": trader_id,
            "ticker": ticker,
            "order_side": side,
            "order_type": order_type,
            "quantity": quantity,
            "price": price,
        }),
        Commands::Amend { order_id, quantity } => json!({
            "request_type": "AMEND",
            "order_id": order_id,
            "quantity": quantity,
        }),
        Commands::Cancel { order_id } => json!({
            "request_type": "CANCEL",
            "order_id": order_id,
        }),
        Commands::Get { order_id } => json!({
            "request_type": "GET",
            "order_id": order_id,
        }),
    };

    let response = send_command(addr, &envelope).await?;
    print_response(&response);
    Ok(())
}

/// A human-readable dump of a [`Response`], in the spirit of the original
/// implementation's `print_response` helper.
fn print_response(response: &Response) {
    println!("success: {}", response.success);
    match &response.order {
        Some(order) => {
            println!("order_id:   {}", order.order_id);
            println!("trader_id:  {}", order.trader_id);
            println!("ticker:     {}", order.ticker);
            println!("side:       {:?}", order.side);
            println!("type:       {:?}", order.ordertype);
            println!("price:      {}", if order.price.is_finite() { order.price.to_string() } else { "n/a".to_string() });
            println!("quantity:   {}", order.quantity);
            println!("filled:     {}", order.filled);
            println!("is_executed:{}", order.is_executed);
            if !order.trades.is_empty() {
                println!("trades:");
                for (counterparty, cash) in &order.trades {
                    println!("  {counterparty} -> {cash}");
                }
            }
        }
        None => println!("order:      (none)"),
    }
}
