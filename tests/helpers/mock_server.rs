use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

/// Scripted behavior for one accepted query connection.
#[derive(Debug, Clone)]
pub enum ServerAction {
    /// Send one text message.
    Send(String),
    /// Send one binary message.
    SendBinary(Vec<u8>),
    /// Send a ping control frame.
    Ping(Vec<u8>),
    /// Go quiet for the given duration.
    Stall(Duration),
    /// Close the connection from the server side.
    Close,
}

/// What the server observed during the exchange.
#[derive(Debug, Default)]
pub struct ServerReport {
    /// Query text received as the first message.
    pub query: Option<String>,
    /// Close frame received from the client, as (status code, reason).
    pub client_close: Option<(u16, String)>,
}

/// One-shot WebSocket server: accepts a single connection, reads the query,
/// plays its script, then drains the socket recording the close handshake.
pub struct MockQueryServer {
    addr: SocketAddr,
    handle: JoinHandle<ServerReport>,
}

impl MockQueryServer {
    pub async fn start(script: Vec<ServerAction>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock query server");
        let addr = listener.local_addr().expect("Mock server has no address");

        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("Failed to accept");
            let ws = accept_async(stream)
                .await
                .expect("WebSocket handshake failed");
            serve(ws, script).await
        });

        Self { addr, handle }
    }

    /// Host string suitable for the client's environment config.
    pub fn fqdn(&self) -> String {
        self.addr.to_string()
    }

    /// Waits for the connection to wind down and returns what the server
    /// saw. Skip this for scripts that stall past the test's interest.
    pub async fn finish(self) -> ServerReport {
        self.handle.await.expect("Mock server task panicked")
    }
}

async fn serve(mut ws: WebSocketStream<TcpStream>, script: Vec<ServerAction>) -> ServerReport {
    let mut report = ServerReport::default();

    match ws.next().await {
        Some(Ok(Message::Text(text))) => report.query = Some(text),
        other => panic!("Expected a query message first, got {other:?}"),
    }

    for action in script {
        match action {
            ServerAction::Send(text) => {
                if ws.send(Message::Text(text)).await.is_err() {
                    return report;
                }
            }
            ServerAction::SendBinary(bytes) => {
                if ws.send(Message::Binary(bytes)).await.is_err() {
                    return report;
                }
            }
            ServerAction::Ping(payload) => {
                if ws.send(Message::Ping(payload)).await.is_err() {
                    return report;
                }
            }
            ServerAction::Stall(duration) => sleep(duration).await,
            ServerAction::Close => {
                let _ = ws.close(None).await;
            }
        }
    }

    // Drain until the client goes away so the close handshake is observed.
    while let Some(message) = ws.next().await {
        match message {
            Ok(Message::Close(Some(frame))) => {
                report.client_close = Some((frame.code.into(), frame.reason.into_owned()));
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }

    report
}
