//! Abstract "send a GET, eventually get a status and a body" capability.

use async_trait::async_trait;

/// Outcome of one GET as seen by the lookup workflow.
///
/// Transport-level failures (no response at all) are reported as status `0`
/// with an empty body, the same way a browser reports a failed XHR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: String,
}

impl RelayResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// The no-response sentinel.
    pub fn failed() -> Self {
        Self { status: 0, body: String::new() }
    }

    pub fn is_failure(&self) -> bool {
        self.status == 0
    }
}

/// Trait for issuing relay-wrapped GETs - enables mocking for tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches `url`. Never fails: errors are folded into [`RelayResponse::failed`].
    async fn get(&self, url: &str) -> RelayResponse;
}
