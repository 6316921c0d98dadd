use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{Duration, Instant, timeout, timeout_at};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::client::endpoint::Endpoint;
use crate::client::errors::QueryError;
use crate::client::interpreter::{Progress, interpret};
use crate::client::reassembly::{Fragment, FragmentSource, receive_complete_message};
use crate::shared::config::CONFIG;
use crate::shared::config::model::Settings;

/// Reason sent with the normal-closure frame once the client is done.
const CLOSE_REASON: &str = "CompletedByClient";

/// Budget for the close handshake on its own, so a call that already hit
/// its deadline still gets to say goodbye.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Streaming query client: one connection, one outbound query, a sequence
/// of progress messages back until the server reports 100%.
pub struct WebSocketQueryClient {
    settings: Arc<Settings>,
}

impl WebSocketQueryClient {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    pub fn from_config() -> Self {
        Self::new(Arc::clone(&CONFIG))
    }

    /// Issues one query over a fresh WebSocket connection and collects the
    /// raw progress messages until the server reports completion.
    ///
    /// The returned sequence holds the verbatim message texts in receipt
    /// order; the last one reports a completion percentage of ~100. On any
    /// failure the messages received so far are dropped and the call fails
    /// as a whole. Win or lose, the connection is closed before returning.
    pub async fn query_web_socket(
        &self,
        query: &str,
        resource_path: &str,
    ) -> Result<Vec<String>, QueryError> {
        let deadline = self
            .settings
            .client
            .query_timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        let endpoint = Endpoint::build(
            &self.settings.environment,
            resource_path,
            &self.settings.client.api_version,
        );
        info!(target: "stroom::ws", url = endpoint.as_str(), "Opening query connection");

        let mut stream = match at_deadline(deadline, connect_async(endpoint.as_str())).await {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => {
                let error = QueryError::Connection(e);
                error.log_error();
                return Err(error);
            }
            Err(deadline_error) => {
                deadline_error.log_error();
                return Err(deadline_error);
            }
        };

        let outcome = run_query(&mut stream, query, deadline).await;

        // The outcome is already decided; the close handshake runs on every
        // exit path and its failures never override it.
        close_gracefully(&mut stream).await;

        if let Err(error) = &outcome {
            error.log_error();
        }
        outcome
    }

    /// Queries the raw events resource.
    pub async fn query_events(&self, query: &str) -> Result<Vec<String>, QueryError> {
        self.query_web_socket(query, "events").await
    }

    /// Queries the aggregates resource.
    pub async fn query_aggregates(&self, query: &str) -> Result<Vec<String>, QueryError> {
        self.query_web_socket(query, "aggregates").await
    }
}

async fn run_query(
    stream: &mut WsStream,
    query: &str,
    deadline: Option<Instant>,
) -> Result<Vec<String>, QueryError> {
    at_deadline(deadline, stream.send(Message::Text(query.to_string()))).await??;
    debug!(target: "stroom::ws", bytes = query.len(), "Query sent");

    let mut results: Vec<String> = Vec::new();
    let mut source = WsFragmentSource { stream };

    loop {
        let message = at_deadline(deadline, receive_complete_message(&mut source)).await??;

        match interpret(&message)? {
            Progress::Continue => results.push(message),
            Progress::Complete => {
                results.push(message);
                info!(
                    target: "stroom::ws",
                    messages = results.len(),
                    "Query completed"
                );
                return Ok(results);
            }
        }
    }
}

/// Adapts the WebSocket stream to the fragment contract.
///
/// The transport layer performs RFC 6455 defragmentation below this point,
/// so every delivered text or binary message arrives as one final fragment;
/// control frames are absorbed here.
struct WsFragmentSource<'a> {
    stream: &'a mut WsStream,
}

#[async_trait]
impl FragmentSource for WsFragmentSource<'_> {
    async fn next_fragment(&mut self) -> Result<Fragment, QueryError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Fragment::full(text.into_bytes())),
                Some(Ok(Message::Binary(bytes))) => return Ok(Fragment::full(bytes)),
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(Message::Close(frame))) => {
                    warn!(
                        target: "stroom::ws",
                        close_frame = ?frame,
                        "Server closed the connection before the query completed"
                    );
                    return Err(QueryError::Connection(tungstenite::Error::ConnectionClosed));
                }
                // Raw frames never surface from a client stream in its
                // default configuration.
                Some(Ok(Message::Frame(_))) => continue,
                Some(Err(e)) => return Err(QueryError::Connection(e)),
                None => return Err(QueryError::Connection(tungstenite::Error::AlreadyClosed)),
            }
        }
    }
}

/// Best-effort close handshake with a normal-closure status.
///
/// An already-closed socket is a no-op; any other failure is logged and
/// dropped.
async fn close_gracefully(stream: &mut WsStream) {
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: CLOSE_REASON.into(),
    };

    match timeout(CLOSE_GRACE, stream.close(Some(frame))).await {
        Ok(Ok(())) => debug!(target: "stroom::ws", "Close handshake sent"),
        Ok(Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed)) => {}
        Ok(Err(e)) => warn!(target: "stroom::ws", error = %e, "Close handshake failed"),
        Err(_) => warn!(target: "stroom::ws", "Close handshake timed out"),
    }
}

/// Applies the optional per-query deadline to one suspension point.
async fn at_deadline<F>(deadline: Option<Instant>, future: F) -> Result<F::Output, QueryError>
where
    F: Future,
{
    match deadline {
        Some(at) => timeout_at(at, future).await.map_err(|_| QueryError::Deadline),
        None => Ok(future.await),
    }
}
