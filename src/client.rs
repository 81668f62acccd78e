//! A thin, one-shot-per-command wire client: connect, send one line, read
//! one line, close. Grounded in `ExchangeClient.py`'s `__transmit` pattern.
//! Shared by the CLI and the simulator.

use crate::command::Response;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection error: {0}")]
    Connect(#[from] std::io::Error),
    #[error("server closed the connection without a response")]
    NoResponse,
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Sends `envelope` as a single JSON line to `addr` and returns the decoded
/// [`Response`]. Opens a fresh connection per call (§10: "one-shot-per-
/// command TCP sessions").
pub async fn send_command<T: Serialize>(addr: &str, envelope: &T) -> Result<Response, ClientError> {
    let stream = TcpStream::connect(addr).await?;
    let (reader, mut writer) = stream.into_split();

    let mut line = serde_json::to_string(envelope).expect("command envelopes always serialize");
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.shutdown().await?;

    let mut reader = BufReader::new(reader);
    let mut response_line = String::new();
    let bytes_read = reader.read_line(&mut response_line).await?;
    if bytes_read == 0 {
        return Err(ClientError::NoResponse);
    }
    let response = serde_json::from_str(response_line.trim_end())?;
    Ok(response)
}
