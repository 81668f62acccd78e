//! Session surface: a raw TCP line server. One task per accepted connection,
//! reading and answering newline-delimited JSON envelopes until EOF (§6).

use crate::command::{Command, RawCommand, Response};
use crate::engine::{EngineAck, EngineSubmit, MatchingEngine, NewOrder};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Accepts connections on `addr` until `shutdown` fires, handling each one on
/// its own task against the shared `engine`.
pub async fn serve(
    addr: SocketAddr,
    engine: Arc<Mutex<MatchingEngine>>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("shutdown requested, no longer accepting connections");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, peer, engine).await {
                        error!(%peer, %err, "session ended with error");
                    }
                });
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    engine: Arc<Mutex<MatchingEngine>>,
) -> Result<(), SessionError> {
    info!(%peer, "session opened");
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let response = match serde_json::from_str::<RawCommand>(&line) {
            Ok(raw) => match raw.validate() {
                Ok(command) => dispatch(&engine, command),
                Err(err) => {
                    warn!(%peer, %err, "bad input");
                    Response::not_found()
                }
            },
            Err(err) => {
                warn!(%peer, %err, "malformed envelope");
                Response::not_found()
            }
        };
        let mut encoded = serde_json::to_string(&response).expect("Response always serializes");
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
    }
    info!(%peer, "session closed");
    Ok(())
}

fn dispatch(engine: &Arc<Mutex<MatchingEngine>>, command: Command) -> Response {
    let mut engine = engine.lock().expect("engine mutex poisoned");
    match command {
        Command::Submit { trader_id, ticker, side, ordertype, price, quantity } => {
            let outcome = engine.submit(NewOrder { trader_id, ticker, side, ordertype, price, quantity });
            match outcome {
                EngineSubmit::Accepted { order, success, .. } => Response::ok(order, success),
                EngineSubmit::RejectedDuplicateTrader { order } => Response::ok(order, false),
            }
        }
        Command::Amend { order_id, quantity } => match engine.amend(order_id, quantity) {
            EngineAck::Ok => Response::ack(true),
            EngineAck::Failed => Response::ack(false),
        },
        Command::Cancel { order_id } => match engine.cancel(order_id) {
            EngineAck::Ok => Response::ack(true),
            EngineAck::Failed => Response::ack(false),
        },
        Command::Get { order_id } => match engine.get(&order_id) {
            Some(order) => Response::ok(order.clone(), true),
            None => Response::not_found(),
        },
    }
}
