/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// HTTP verb outside the supported GET/POST/PUT set.
    ///
    /// This is a programming error and is never retried.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
    /// Network or request execution error from `reqwest`.
    ///
    /// Transient: the gateway retries these up to its attempt budget.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    ///
    /// Definitive: the upstream service rejected the request, so the gateway
    /// surfaces it without further attempts.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// Failure reported by the text-generation backend.
    #[error("generation error: {0}")]
    Generation(String),
    /// Response decoding or shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
}
