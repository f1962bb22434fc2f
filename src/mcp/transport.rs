//! MCP transport layer.
//!
//! Messages are line-delimited JSON. [`StdioTransport`] runs it over the
//! process's stdin and stdout; tests run it over in-memory pipes.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

use crate::error::{Error, Result};
use crate::mcp::protocol::{
    JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId,
};

const CHANNEL_CAPACITY: usize = 100;

/// A message that can be sent or received.
#[derive(Debug, Clone)]
pub enum Message {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
    Notification(JsonRpcNotification),
}

impl Message {
    /// Parse one line: a request if it has an id, otherwise a notification.
    pub fn parse(line: &str) -> Option<Self> {
        if let Ok(req) = serde_json::from_str::<JsonRpcRequest>(line) {
            Some(Message::Request(req))
        } else if let Ok(notif) = serde_json::from_str::<JsonRpcNotification>(line) {
            Some(Message::Notification(notif))
        } else {
            None
        }
    }

    /// Error response for a line that [`Message::parse`] rejected.
    pub fn parse_failure(line: &str) -> Self {
        let detail = match serde_json::from_str::<serde_json::Value>(line) {
            Err(e) => e.to_string(),
            Ok(_) => "Not a JSON-RPC request or notification".to_string(),
        };
        Message::Response(JsonRpcResponse::failure(
            RequestId::Null,
            JsonRpcError::from(&Error::Parse(detail)),
        ))
    }

    fn to_json(&self) -> serde_json::Result<String> {
        match self {
            Message::Request(req) => serde_json::to_string(req),
            Message::Response(res) => serde_json::to_string(res),
            Message::Notification(notif) => serde_json::to_string(notif),
        }
    }
}

/// Transport trait for MCP communication.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Start the transport, returning channels for messages.
    async fn start(&mut self) -> Result<(mpsc::Receiver<Message>, mpsc::Sender<Message>)>;

    /// Stop the transport once every outgoing sender has been dropped.
    async fn stop(&mut self) -> Result<()>;
}

/// Line-delimited JSON transport over a reader and a writer.
pub struct LineTransport<R, W> {
    reader: Option<R>,
    writer: Option<W>,
    writer_task: Option<JoinHandle<()>>,
}

/// Transport over the process's stdin and stdout.
pub type StdioTransport = LineTransport<Stdin, Stdout>;

impl<R, W> LineTransport<R, W> {
    /// Create a transport reading from `reader` and writing to `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(writer),
            writer_task: None,
        }
    }
}

impl StdioTransport {
    /// Create a stdio transport.
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

/// Forwards parsed lines to `tx`. Unreadable lines are answered on `replies`.
async fn read_loop<R: AsyncRead + Unpin>(
    reader: R,
    tx: mpsc::Sender<Message>,
    replies: mpsc::Sender<Message>,
) {
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                debug!("EOF on input, stopping transport");
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                trace!("Received: {}", trimmed);
                match Message::parse(trimmed) {
                    Some(msg) => {
                        if tx.send(msg).await.is_err() {
                            break;
                        }
                    }
                    None => {
                        error!("Failed to parse message: {}", trimmed);
                        if replies.send(Message::parse_failure(trimmed)).await.is_err() {
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                error!("Error reading input: {}", e);
                break;
            }
        }
    }
}

async fn write_loop<W: AsyncWrite + Unpin>(mut writer: W, mut rx: mpsc::Receiver<Message>) {
    while let Some(msg) = rx.recv().await {
        let json = match msg.to_json() {
            Ok(s) => s,
            Err(e) => {
                error!("Error serializing message: {}", e);
                continue;
            }
        };

        trace!("Sending: {}", json);
        let written = async {
            writer.write_all(json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await
        }
        .await;
        if let Err(e) = written {
            error!("Error writing output: {}", e);
            break;
        }
    }
}

#[async_trait]
impl<R, W> Transport for LineTransport<R, W>
where
    R: AsyncRead + Unpin + Send + Sync + 'static,
    W: AsyncWrite + Unpin + Send + Sync + 'static,
{
    async fn start(&mut self) -> Result<(mpsc::Receiver<Message>, mpsc::Sender<Message>)> {
        let reader = self
            .reader
            .take()
            .ok_or_else(|| Error::Internal("Transport already started".to_string()))?;
        let writer = self
            .writer
            .take()
            .ok_or_else(|| Error::Internal("Transport already started".to_string()))?;

        let (incoming_tx, incoming_rx) = mpsc::channel::<Message>(CHANNEL_CAPACITY);
        let (outgoing_tx, outgoing_rx) = mpsc::channel::<Message>(CHANNEL_CAPACITY);

        tokio::spawn(read_loop(reader, incoming_tx, outgoing_tx.clone()));
        self.writer_task = Some(tokio::spawn(write_loop(writer, outgoing_rx)));

        Ok((incoming_rx, outgoing_tx))
    }

    async fn stop(&mut self) -> Result<()> {
        // Drains queued responses before returning. The reader holds a
        // sender until it hits EOF.
        if let Some(task) = self.writer_task.take() {
            task.await
                .map_err(|e| Error::Internal(format!("Transport writer failed: {}", e)))?;
        }
        Ok(())
    }
}
