use thiserror::Error;
use tokio_tungstenite::tungstenite;
use tracing::{debug, error};

/// Failure kinds a streaming query call can surface.
///
/// `ExpiredAccessToken` is the one condition callers are expected to act on
/// (refresh credentials, retry the whole call); everything else is terminal
/// for the query. The client itself never retries.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("WebSocket transport error: {0}")]
    Connection(#[from] tungstenite::Error),

    #[error("Malformed progress envelope: {0}")]
    EnvelopeParse(#[from] serde_json::Error),

    #[error("Access token expired: {0}")]
    ExpiredAccessToken(String),

    #[error("{0}")]
    UnexpectedServer(String),

    #[error("Query deadline elapsed")]
    Deadline,
}

impl QueryError {
    pub fn log_error(&self) {
        match self {
            QueryError::Connection(e) => {
                error!("WebSocket transport error: {}", e);
                debug!("Transport error details: {:?}", e);
            }
            QueryError::EnvelopeParse(e) => {
                error!("Malformed progress envelope: {}", e);
                debug!("Envelope parse error details: {:?}", e);
            }
            QueryError::ExpiredAccessToken(m) => {
                error!("Access token expired: {}", m);
            }
            QueryError::UnexpectedServer(m) => {
                error!("Server reported an error: {}", m);
            }
            QueryError::Deadline => {
                error!("Query deadline elapsed");
            }
        }
    }
}
