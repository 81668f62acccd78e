//! Simulation harness for noisy order flow against a running engine.

use rand::Rng;
use rand_distr::{Distribution, Exp, Exp1, Normal};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::send_command;

#[derive(Clone)]
pub struct SimConfig {
    pub addr: String,
    pub ticker: String,
    pub run_secs: Option<u64>,
    pub attack_rate_hz: f64, // Poisson rate λ for order arrivals
    pub noise_sigma: f64,    // N(0, σ) drift applied to the mid each tick
    pub mean_qty: f64,       // average order size (unit-exp * mean_qty)
    pub num_traders: u32,    // pool of distinct trader ids to cycle through
}

/// Noisy order-flow simulation loop: a pool of `num_traders` traders submit
/// random LIMIT orders around a drifting mid-price, with an occasional
/// MARKET or IOC thrown in. Each trader respects the engine's one-active-
/// order rule by waiting for its previous order to resolve before sending a
/// new one is not enforced here — rejections from a trader with a still-
/// resting order are expected and simply logged at `warn!`, exercising the
/// rejection path the same way real noisy traffic would.
pub async fn run_simulation(cfg: SimConfig, cancel_token: CancellationToken) -> anyhow::Result<()> {
    let ia = Exp::new(cfg.attack_rate_hz).expect("attack_rate_hz must be > 0");
    let drift = Normal::new(0.0, cfg.noise_sigma).expect("noise_sigma >= 0");
    let size = Exp1;

    let mut mid: f64 = 50.0;
    let start = Instant::now();
    let spread = 1.0_f64;
    let mut fills = 0u64;
    let mut rejections = 0u64;

    loop {
        if let Some(max_secs) = cfg.run_secs {
            if start.elapsed().as_secs() >= max_secs {
                break;
            }
        }

        let wait_secs: f64 = ia.sample(&mut rand::rng());
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("received shutdown; exiting simulation loop");
                break;
            }
            _ = sleep(Duration::from_secs_f64(wait_secs)) => {}
        }

        let unit: f64 = size.sample(&mut rand::rng());
        let quantity = (unit * cfg.mean_qty).max(1.0).round() as u64;

        mid += drift.sample(&mut rand::rng());

        let side = if rand::rng().random_bool(0.5) { "BUY" } else { "SELL" };
        let trader_id = format!("sim-trader-{}", rand::rng().random_range(0..cfg.num_traders));

        // Mostly LIMIT quotes around the mid, with a thin slice of MARKET/IOC.
        let roll: f64 = rand::rng().random();
        let (order_type, price) = if roll < 0.7 {
            let raw_price = if side == "BUY" { mid - spread } else { mid + spread };
            (
                if rand::rng().random_bool(0.2) { "IOC" } else { "LIMIT" },
                Some(raw_price.max(1.0)),
            )
        } else {
            ("MARKET", None)
        };

        let envelope = json!({
            "request_type": "SUBMIT",
            "trader_id": trader_id,
            "ticker": cfg.ticker,
            "order_side": side,
            "order_type": order_type,
            "quantity": quantity,
            "price": price,
        });

        match send_command(&cfg.addr, &envelope).await {
            Ok(response) => {
                if response.success {
                    fills += 1;
                } else {
                    rejections += 1;
                }
                info!(
                    elapsed = format_args!("{:.1}s", start.elapsed().as_secs_f64()),
                    trader = %trader_id,
                    side,
                    order_type,
                    quantity,
                    mid = format_args!("{:.2}", mid),
                    success = response.success,
                    "sim tick"
                );
            }
            Err(err) => {
                warn!(%err, "order submission failed");
            }
        }
    }

    info!(fills, rejections, "simulation done");
    Ok(())
}
