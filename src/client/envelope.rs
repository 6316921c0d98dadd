use serde::Deserialize;

/// Wire shape of one inbound query message.
///
/// The service sends more fields than these (`content`, `warnings`, ...);
/// this client only inspects the error and progress metadata, so everything
/// else is left untouched in the raw message text handed back to the caller.
#[derive(Debug, Deserialize)]
pub struct QueryEnvelope {
    pub error: Option<ErrorDescriptor>,
    /// Absent on messages where the server has not reported progress yet.
    /// Defaults to 0, which keeps the receive loop reading.
    #[serde(rename = "percentCompleted", default)]
    pub percent_completed: f64,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDescriptor {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "innererror")]
    pub inner: Option<InnerError>,
}

/// Nested error detail, one level deep.
#[derive(Debug, Deserialize)]
pub struct InnerError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
