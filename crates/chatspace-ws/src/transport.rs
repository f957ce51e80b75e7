//! Socket transport abstraction and the tokio-tungstenite implementation.
//!
//! The session logic is written against the [`Transport`]/[`SessionLink`]
//! traits so tests can inject a scripted transport in place of a real
//! WebSocket.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::Result;

/// One observation from an open link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// A raw inbound frame (JSON text).
    Frame(String),
    /// The link closed; `normal` is true only for close code 1000.
    Closed {
        /// Whether the closure used the normal close code.
        normal: bool,
    },
}

/// An open socket session.
#[allow(async_fn_in_trait)] // single-runtime crate; no Send bound needed
pub trait SessionLink {
    /// Transmits one outbound frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying socket write fails.
    async fn send(&mut self, text: String) -> Result<()>;

    /// Waits for the next inbound frame or closure.
    async fn next(&mut self) -> LinkEvent;

    /// Closes the session with the normal close code. Best-effort.
    async fn close(&mut self);
}

/// Opens socket sessions.
#[allow(async_fn_in_trait)] // single-runtime crate; no Send bound needed
pub trait Transport {
    /// The link type produced by a successful connect.
    type Link: SessionLink;

    /// Opens a session to the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or handshake fails.
    async fn connect(&mut self, url: &str) -> Result<Self::Link>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport backed by tokio-tungstenite.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsTransport;

/// An open WebSocket session.
pub struct WsLink {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl Transport for WsTransport {
    type Link = WsLink;

    async fn connect(&mut self, url: &str) -> Result<WsLink> {
        let (stream, _response) = connect_async(url).await?;
        let (sink, stream) = stream.split();
        Ok(WsLink { sink, stream })
    }
}

impl SessionLink for WsLink {
    async fn send(&mut self, text: String) -> Result<()> {
        self.sink.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next(&mut self) -> LinkEvent {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return LinkEvent::Frame(text),
                Some(Ok(Message::Close(frame))) => {
                    let normal = frame.as_ref().is_some_and(|f| f.code == CloseCode::Normal);
                    tracing::debug!(normal, "websocket closed by peer");
                    return LinkEvent::Closed { normal };
                }
                // Ping/pong are handled by tungstenite; binary frames are
                // not part of this protocol.
                Some(Ok(other)) => {
                    tracing::trace!(?other, "ignoring non-text frame");
                }
                Some(Err(err)) => {
                    tracing::warn!(?err, "websocket stream error");
                    return LinkEvent::Closed { normal: false };
                }
                None => return LinkEvent::Closed { normal: false },
            }
        }
    }

    async fn close(&mut self) {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "client disconnect".into(),
        };
        if let Err(err) = self.sink.send(Message::Close(Some(frame))).await {
            tracing::debug!(?err, "close frame not delivered");
        }
        let _ = self.sink.close().await;
    }
}

impl std::fmt::Debug for WsLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsLink").finish_non_exhaustive()
    }
}
