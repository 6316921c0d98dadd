use async_trait::async_trait;
use tokio_tungstenite::tungstenite;

use crate::client::errors::QueryError;

/// One transport-level chunk of a logical message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub bytes: Vec<u8>,
    pub is_final: bool,
}

impl Fragment {
    pub fn full(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            is_final: true,
        }
    }

    pub fn partial(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            is_final: false,
        }
    }
}

/// Source of fragments for one connection.
///
/// The production implementation wraps the WebSocket stream; tests feed
/// scripted splits through the same seam.
#[async_trait]
pub trait FragmentSource {
    async fn next_fragment(&mut self) -> Result<Fragment, QueryError>;
}

/// Initial capacity of the accumulation buffer. A tuning constant only;
/// larger messages grow the buffer as needed.
pub const ACCUMULATOR_CAPACITY: usize = 16 * 1024;

/// Reads fragments until one is flagged final, then decodes the accumulated
/// bytes as UTF-8 text.
///
/// Each call owns a fresh buffer, so bytes from two logical messages can
/// never mix. A source fault (including the connection ending before the
/// final fragment) propagates as-is.
pub async fn receive_complete_message<S: FragmentSource>(
    source: &mut S,
) -> Result<String, QueryError> {
    let mut accumulated: Vec<u8> = Vec::with_capacity(ACCUMULATOR_CAPACITY);

    loop {
        let fragment = source.next_fragment().await?;
        accumulated.extend_from_slice(&fragment.bytes);
        if fragment.is_final {
            break;
        }
    }

    String::from_utf8(accumulated).map_err(|_| QueryError::Connection(tungstenite::Error::Utf8))
}
