//! Persistent socket connection to the game server.
//!
//! The server speaks socket.io. No game messages are exchanged over it;
//! the client only performs the engine.io handshake, answers pings so the
//! server keeps the connection open, and logs connect/disconnect.

use futures_util::{SinkExt, StreamExt};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

/// socket.io websocket transport path (engine.io protocol v4)
const SOCKET_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

/// engine.io packet types carried as the first character of a frame
const PACKET_OPEN: char = '0';
const PACKET_PING: &str = "2";
const PACKET_PONG: &str = "3";
/// socket.io CONNECT for the default namespace
const NAMESPACE_CONNECT: &str = "40";

pub struct SocketClient {
    url: String,
}

/// A live connection. Dropping it leaves the connection running; call
/// [`SocketHandle::close`] to end it.
pub struct SocketHandle {
    task: JoinHandle<()>,
}

impl SocketHandle {
    pub fn close(self) {
        // A finished task already logged its own disconnect
        if !self.task.is_finished() {
            self.task.abort();
            info!("Disconnected from server");
        }
    }
}

impl SocketClient {
    /// Create a socket client for an exact websocket URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Create a socket client for the server behind an HTTP base URL
    pub fn for_api(base_url: &str) -> Self {
        let ws_url = base_url
            .trim_end_matches('/')
            .replacen("http://", "ws://", 1)
            .replacen("https://", "wss://", 1);
        Self::new(format!("{ws_url}{SOCKET_PATH}"))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Open the connection and keep it alive in a background task
    ///
    /// # Errors
    ///
    /// Fails if the websocket handshake fails.
    pub async fn connect(self) -> Result<SocketHandle, tokio_tungstenite::tungstenite::Error> {
        let (ws_stream, _) = connect_async(&self.url).await?;
        info!(url = %self.url, "Connected to server");

        let (mut write, mut read) = ws_stream.split();

        let task = tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                let reply = match msg {
                    Ok(Message::Text(text)) => {
                        debug!(frame = %text.as_str(), "Socket frame");
                        reply_to(text.as_str())
                    }
                    Ok(Message::Close(_)) => break,
                    Err(e) => {
                        warn!("Socket error: {e}");
                        break;
                    }
                    _ => None,
                };

                if let Some(reply) = reply
                    && let Err(e) = write.send(Message::Text(reply.into())).await
                {
                    warn!("Socket write failed: {e}");
                    break;
                }
            }
            info!("Disconnected from server");
        });

        Ok(SocketHandle { task })
    }
}

/// The frame to send back for an incoming engine.io frame, if any.
fn reply_to(frame: &str) -> Option<&'static str> {
    if frame == PACKET_PING {
        Some(PACKET_PONG)
    } else if frame.starts_with(PACKET_OPEN) && !frame.starts_with(NAMESPACE_CONNECT) {
        Some(NAMESPACE_CONNECT)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_from_http_base() {
        let client = SocketClient::for_api("http://localhost:8080/");
        assert_eq!(
            client.url(),
            "ws://localhost:8080/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn test_url_from_https_base() {
        let client = SocketClient::for_api("https://kittens.example.com");
        assert!(client.url().starts_with("wss://kittens.example.com/socket.io/"));
    }

    #[test]
    fn test_replies() {
        assert_eq!(reply_to("2"), Some("3"));
        assert_eq!(reply_to(r#"0{"sid":"abc","pingInterval":25000}"#), Some("40"));
        assert_eq!(reply_to(r#"40{"sid":"xyz"}"#), None);
        assert_eq!(reply_to("42[\"event\"]"), None);
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let client = SocketClient::new("ws://127.0.0.1:19998/socket.io/");
        assert!(client.connect().await.is_err());
    }
}
