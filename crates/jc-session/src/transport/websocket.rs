//! WebSocket transport over tokio-tungstenite

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

use jc_core::error::{ConnectionError, StreamError};
use jc_core::traits::{Connection, Dialer, Inbound, Outbound, Received};
use jc_protocol::describe_close;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Close code reported when the stream ends without a close frame
const CLOSE_ABNORMAL: u16 = 1006;

/// Close code reported for a close frame that carries no status
const CLOSE_NO_STATUS: u16 = 1005;

/// Dials `ws://` and `wss://` session endpoints
#[derive(Debug, Clone, Default)]
pub struct WsDialer;

impl WsDialer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Dialer for WsDialer {
    async fn dial(&self, endpoint: &str) -> Result<Connection, ConnectionError> {
        let (stream, response) = connect_async(endpoint).await.map_err(|e| match e {
            e @ (WsError::Url(_) | WsError::HttpFormat(_)) => {
                ConnectionError::InvalidEndpoint(format!("{}: {}", endpoint, e))
            }
            e => ConnectionError::Dial {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            },
        })?;
        debug!(%endpoint, status = %response.status(), "WebSocket handshake complete");

        let (sink, stream) = stream.split();
        Ok(Connection::new(
            Box::new(WsInbound { stream }),
            Box::new(WsOutbound { sink: Some(sink) }),
        ))
    }
}

/// Receiving half of a WebSocket session
pub struct WsInbound {
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl Inbound for WsInbound {
    async fn receive(&mut self) -> Received {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Received::Message(Bytes::from(text)),
                Some(Ok(Message::Binary(data))) => return Received::Message(data),
                Some(Ok(Message::Close(Some(frame)))) => {
                    return Received::Closed(describe_close(
                        u16::from(frame.code),
                        frame.reason.as_str(),
                    ));
                }
                Some(Ok(Message::Close(None))) => {
                    return Received::Closed(describe_close(CLOSE_NO_STATUS, ""));
                }
                Some(Ok(other)) => {
                    trace!(kind = ?other, "Skipping control message");
                }
                Some(Err(e)) => return Received::Failed(StreamError::Read(e.to_string())),
                None => {
                    return Received::Closed(describe_close(CLOSE_ABNORMAL, "unexpected EOF"));
                }
            }
        }
    }
}

/// Sending half of a WebSocket session
pub struct WsOutbound {
    sink: Option<SplitSink<WsStream, Message>>,
}

#[async_trait]
impl Outbound for WsOutbound {
    async fn send_close(&mut self, reason: &str) -> Result<(), StreamError> {
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| StreamError::Send("connection already released".to_string()))?;

        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: reason.to_string().into(),
        };
        sink.send(Message::Close(Some(frame)))
            .await
            .map_err(|e| StreamError::Send(e.to_string()))
    }

    async fn close(&mut self) {
        // The socket shuts once both halves are gone; the receive loop owns the other
        if self.sink.take().is_some() {
            debug!("WebSocket sink released");
        }
    }
}
