//! Error types for the API client.

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or unreadable body).
    #[error("Request failed")]
    RequestFailed,
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The chart endpoint reported a failure in its `error` field.
    /// Displays exactly as the server's description.
    #[error("{description}")]
    Chart { code: String, description: String },
    /// The response was valid JSON but did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}
