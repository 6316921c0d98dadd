use tracing::debug;

use crate::client::envelope::{ErrorDescriptor, QueryEnvelope};
use crate::client::errors::QueryError;

/// Loop decision for one fully reassembled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Continue,
    Complete,
}

/// Completion arrives as a float; anything within this band of 100 counts
/// as done.
const COMPLETION_TOLERANCE: f64 = 0.01;

const AUTHENTICATION_FAILED: &str = "AuthenticationFailed";
const TOKEN_EXPIRED: &str = "TokenExpired";

/// Decides whether the receive loop keeps reading, stops, or fails.
///
/// A message carrying an error descriptor never counts as a result, no
/// matter what completion percentage it reports.
pub fn interpret(message: &str) -> Result<Progress, QueryError> {
    let envelope: QueryEnvelope = serde_json::from_str(message)?;

    if let Some(error) = envelope.error {
        return Err(classify_server_error(error));
    }

    if (envelope.percent_completed - 100.0).abs() < COMPLETION_TOLERANCE {
        Ok(Progress::Complete)
    } else {
        debug!(
            target: "stroom::ws",
            percent = envelope.percent_completed,
            "Query still in progress"
        );
        Ok(Progress::Continue)
    }
}

fn classify_server_error(error: ErrorDescriptor) -> QueryError {
    if error.code == AUTHENTICATION_FAILED {
        if let Some(inner) = &error.inner {
            if inner.code == TOKEN_EXPIRED {
                return QueryError::ExpiredAccessToken(inner.message.clone());
            }
        }
    }

    let mut text = format!(
        "Error Code: {}, Error Message: {}",
        error.code, error.message
    );
    if let Some(inner) = &error.inner {
        text.push_str(&format!(
            ", Inner Error Code: {}, Inner Error Message: {}",
            inner.code, inner.message
        ));
    }
    QueryError::UnexpectedServer(text)
}
