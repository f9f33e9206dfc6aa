use std::time::Instant;

/// Per-request context created by the router for every inbound request,
/// matched or not. Carried through the handler chain for logging and timing.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request number from the monotonic counter. The first request a server
    /// handles is number 1; numbers are dense and never reused.
    pub id: u64,
    /// Arrival instant, read again once the response is produced to log the
    /// request duration.
    pub received_at: Instant,
}

impl RequestContext {
    /// Context for request number `id`, timestamped now.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            received_at: Instant::now(),
        }
    }
}
