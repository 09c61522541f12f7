use std::time::Duration;

use log::warn;
use reqwest::{RequestBuilder, Response};

use crate::clients::errors::Result;

/// Upper bound on extra attempts, whatever the configuration asks for.
pub const MAX_RETRIES: u32 = 3;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline and retry budget applied to every outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPolicy {
    /// Covers connect, headers and the full body.
    pub timeout: Duration,
    /// Extra attempts after the first one.
    pub retries: u32,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        RequestPolicy {
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
        }
    }
}

impl RequestPolicy {
    pub fn new(timeout: Duration, retries: u32) -> Self {
        RequestPolicy {
            timeout,
            retries: retries.min(MAX_RETRIES),
        }
    }

    /// Sends the request built by `make`, rebuilding it for each retry.
    ///
    /// Retries happen only on connect errors, timeouts and 5xx responses. Any other
    /// response is handed back as-is, so callers still decide what a 4xx means.
    pub async fn send<F>(&self, mut make: F) -> Result<Response>
    where
        F: FnMut() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let outcome = make().timeout(self.timeout).send().await;
            let retryable = match &outcome {
                Ok(resp) => resp.status().is_server_error(),
                Err(e) => e.is_timeout() || e.is_connect(),
            };
            if !retryable || attempt >= self.retries {
                return Ok(outcome?);
            }
            attempt += 1;
            match &outcome {
                Ok(resp) => warn!(
                    "Upstream {} answered {}, retrying ({attempt}/{})",
                    resp.url(),
                    resp.status(),
                    self.retries
                ),
                Err(e) => warn!("Upstream call failed: {e}, retrying ({attempt}/{})", self.retries),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_are_capped() {
        let policy = RequestPolicy::new(Duration::from_secs(1), 10);
        assert_eq!(policy.retries, MAX_RETRIES);
    }

    #[test]
    fn default_policy_does_not_retry() {
        let policy = RequestPolicy::default();
        assert_eq!(policy.retries, 0);
        assert_eq!(policy.timeout, Duration::from_secs(10));
    }
}
