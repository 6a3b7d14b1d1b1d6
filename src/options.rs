/// Configures HTTP timeout and retry behavior for the gateway.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GatewayOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Total attempt budget, including the initial attempt.
    pub max_attempts: usize,
    /// Base retry backoff in milliseconds (exponential strategy).
    pub retry_backoff_ms: u64,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_attempts: 3,
            retry_backoff_ms: 1_000,
        }
    }
}
