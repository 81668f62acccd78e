use clap::{Parser, Subcommand};
use matching_engine::cli;
use matching_engine::engine::MatchingEngine;
use matching_engine::session;
use matching_engine::simulate::{self, SimConfig};
use matching_engine::utils::shutdown_token;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "matching-engine")]
#[command(version, about = "A multi-symbol price-priority matching engine")]
struct Cli {
    /// Address of a running `serve` instance; ignored by `serve` itself.
    #[arg(long, env = "ENGINE_ADDR", default_value = "127.0.0.1:9999")]
    addr: String,

    #[command(subcommand)]
    command: TopCommand,
}

#[derive(Subcommand)]
enum TopCommand {
    /// Run the engine, listening for wire commands on `--addr`.
    Serve,
    /// Drive noisy order flow against a running engine.
    Simulate {
        #[arg(long, default_value = "FB")]
        ticker: String,
        /// Run forever if omitted.
        #[arg(long)]
        secs: Option<u64>,
        #[arg(long, default_value_t = 5.0)]
        rate_hz: f64,
        #[arg(long, default_value_t = 0.25)]
        noise_sigma: f64,
        #[arg(long, default_value_t = 10.0)]
        mean_qty: f64,
        #[arg(long, default_value_t = 8)]
        num_traders: u32,
    },
    #[command(flatten)]
    Client(cli::Commands),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    match cli.command {
        TopCommand::Serve => {
            let token = shutdown_token();
            let engine = Arc::new(Mutex::new(MatchingEngine::new()));
            let addr = cli.addr.parse()?;
            session::serve(addr, engine, token).await?;
        }
        TopCommand::Simulate { ticker, secs, rate_hz, noise_sigma, mean_qty, num_traders } => {
            let token = shutdown_token();
            simulate::run_simulation(
                SimConfig {
                    addr: cli.addr,
                    ticker,
                    run_secs: secs,
                    attack_rate_hz: rate_hz,
                    noise_sigma,
                    mean_qty,
                    num_traders,
                },
                token,
            )
            .await?;
        }
        TopCommand::Client(command) => {
            cli::dispatch(&cli.addr, command).await?;
        }
    }
    Ok(())
}
