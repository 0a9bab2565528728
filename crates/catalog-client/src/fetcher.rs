//! Bounded-retry JSON fetcher.
//!
//! Outcome classification per attempt:
//! - 200: parse the body as JSON and return it
//! - 429 or a network timeout: wait `base_delay * multiplier^attempt` and
//!   try again while attempts remain, then give up with `ExhaustedRetries`
//! - anything else: fail at once with `NonRetryable`
//!
//! The wait is a `tokio::time::sleep`, so other tasks on the runtime keep
//! running while a request backs off.

use std::time::Duration;

use domain::SharedReporter;
use serde_json::Value;
use tracing::debug;

use crate::error::{FetchError, Result};
use crate::retry::RetryPolicy;
use crate::transport::{HttpTransport, ReqwestTransport, TransportError};

const RATE_LIMIT_STATUS: u16 = 429;

/// Wraps a transport with the retry policy.
pub struct ResilientFetcher<T = ReqwestTransport> {
    transport: T,
    policy: RetryPolicy,
    reporter: SharedReporter,
}

impl<T: HttpTransport> ResilientFetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy, reporter: SharedReporter) -> Self {
        Self {
            transport,
            policy,
            reporter,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `url` with `params`, retrying rate limits and timeouts.
    ///
    /// Never issues more than `policy.max_attempts` requests (at least one).
    pub async fn fetch(
        &self,
        url: &str,
        params: &[(String, String)],
        timeout: Duration,
    ) -> Result<Value> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            debug!(url, attempt = attempt + 1, max_attempts, "Issuing catalog request");

            let cause = match self.transport.get(url, params, timeout).await {
                Ok(response) if response.status == 200 => {
                    return serde_json::from_str(&response.body).map_err(|e| {
                        self.reporter
                            .failure(&format!("Unreadable response from {url}: {e}"));
                        FetchError::MalformedBody(e.to_string())
                    });
                }
                Ok(response) if response.status == RATE_LIMIT_STATUS => FetchError::RateLimited,
                Ok(response) => {
                    self.reporter.failure(&format!(
                        "Request to {url} failed with status code {}",
                        response.status
                    ));
                    return Err(FetchError::NonRetryable {
                        status: Some(response.status),
                        message: format!("status code {}", response.status),
                    });
                }
                Err(TransportError::Timeout(reason)) => FetchError::Timeout(reason),
                Err(TransportError::Other(reason)) => {
                    self.reporter
                        .failure(&format!("Request to {url} failed: {reason}"));
                    return Err(FetchError::NonRetryable {
                        status: None,
                        message: reason,
                    });
                }
            };

            if attempt + 1 >= max_attempts {
                self.reporter.failure(&format!(
                    "{cause} on {url}, giving up after {max_attempts} attempts"
                ));
                return Err(FetchError::ExhaustedRetries {
                    attempts: max_attempts,
                    last: Box::new(cause),
                });
            }

            let delay = self.policy.delay_for(attempt);
            self.reporter.warning(&format!(
                "{cause}. Waiting {}s before retry (attempt {}/{})",
                delay.as_secs_f64(),
                attempt + 1,
                max_attempts
            ));
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use crate::transport::TransportResponse;
    use domain::{MemoryReporter, ReportLevel};
    use std::sync::Arc;

    const URL: &str = "http://catalog.test/titles/tt1";

    fn fetcher_with(
        transport: ScriptedTransport,
        policy: RetryPolicy,
    ) -> (ResilientFetcher<ScriptedTransport>, Arc<MemoryReporter>) {
        let reporter = Arc::new(MemoryReporter::new());
        (ResilientFetcher::new(transport, policy, reporter.clone()), reporter)
    }

    fn rate_limited() -> std::result::Result<TransportResponse, TransportError> {
        Ok(TransportResponse::new(429, ""))
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let transport = ScriptedTransport::new().route(URL, Ok(TransportResponse::ok(r#"{"id":"tt1"}"#)));
        let (fetcher, reporter) = fetcher_with(transport, RetryPolicy::default());

        let value = fetcher.fetch(URL, &[], Duration::from_secs(10)).await.unwrap();

        assert_eq!(value["id"], "tt1");
        assert_eq!(fetcher.transport().calls().len(), 1);
        assert!(reporter.lines().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_then_success_waits_base_delay() {
        let transport = ScriptedTransport::new()
            .route(URL, rate_limited())
            .route(URL, Ok(TransportResponse::ok("[]")));
        let (fetcher, reporter) = fetcher_with(transport, RetryPolicy::default());

        let value = fetcher.fetch(URL, &[], Duration::from_secs(10)).await.unwrap();

        assert_eq!(value, serde_json::json!([]));
        let gaps = fetcher.transport().gaps();
        assert_eq!(gaps, vec![Duration::from_secs(60)]);
        assert_eq!(reporter.lines_at(ReportLevel::Warning).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_after_max_attempts_with_growing_delays() {
        let transport = ScriptedTransport::new()
            .route(URL, rate_limited())
            .route(URL, Err(TransportError::Timeout("10s elapsed".into())))
            .route(URL, rate_limited())
            .route(URL, Ok(TransportResponse::ok("{}")));
        let (fetcher, reporter) = fetcher_with(transport, RetryPolicy::default());

        let error = fetcher.fetch(URL, &[], Duration::from_secs(10)).await.unwrap_err();

        assert_eq!(
            error,
            FetchError::ExhaustedRetries {
                attempts: 3,
                last: Box::new(FetchError::RateLimited)
            }
        );
        // Only three calls were made; the fourth scripted response is unused.
        assert_eq!(fetcher.transport().calls().len(), 3);
        assert_eq!(
            fetcher.transport().gaps(),
            vec![Duration::from_secs(60), Duration::from_secs(120)]
        );
        assert_eq!(reporter.lines_at(ReportLevel::Failure).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policy_delay_sequence() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), 3);
        let mut transport = ScriptedTransport::new();
        for _ in 0..5 {
            transport = transport.route(URL, rate_limited());
        }
        let (fetcher, _) = fetcher_with(transport, policy);

        let error = fetcher.fetch(URL, &[], Duration::from_secs(1)).await.unwrap_err();

        assert!(matches!(error, FetchError::ExhaustedRetries { attempts: 5, .. }));
        assert_eq!(fetcher.transport().gaps(), policy.delays());
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_status_is_not_retried() {
        let transport = ScriptedTransport::new()
            .route(URL, Ok(TransportResponse::new(503, "down")))
            .route(URL, Ok(TransportResponse::ok("{}")));
        let (fetcher, _) = fetcher_with(transport, RetryPolicy::default());

        let error = fetcher.fetch(URL, &[], Duration::from_secs(10)).await.unwrap_err();

        assert_eq!(error.status(), Some(503));
        assert!(!error.is_retryable());
        assert_eq!(fetcher.transport().calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_not_retried() {
        let transport = ScriptedTransport::new()
            .route(URL, Err(TransportError::Other("connection refused".into())));
        let (fetcher, _) = fetcher_with(transport, RetryPolicy::default());

        let error = fetcher.fetch(URL, &[], Duration::from_secs(10)).await.unwrap_err();

        assert_eq!(
            error,
            FetchError::NonRetryable {
                status: None,
                message: "connection refused".into()
            }
        );
        assert_eq!(fetcher.transport().calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_json_body_is_malformed() {
        let transport = ScriptedTransport::new().route(URL, Ok(TransportResponse::ok("<html>")));
        let (fetcher, _) = fetcher_with(transport, RetryPolicy::default());

        let error = fetcher.fetch(URL, &[], Duration::from_secs(10)).await.unwrap_err();
        assert!(matches!(error, FetchError::MalformedBody(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempt_policy_still_tries_once() {
        let transport = ScriptedTransport::new().route(URL, rate_limited());
        let (fetcher, _) = fetcher_with(transport, RetryPolicy::new(0, Duration::from_secs(1), 2));

        let error = fetcher.fetch(URL, &[], Duration::from_secs(10)).await.unwrap_err();
        assert!(matches!(error, FetchError::ExhaustedRetries { attempts: 1, .. }));
        assert_eq!(fetcher.transport().calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_does_not_block_other_tasks() {
        let transport = ScriptedTransport::new()
            .route(URL, rate_limited())
            .route(URL, Ok(TransportResponse::ok("{}")));
        let (fetcher, _) = fetcher_with(transport, RetryPolicy::default());

        let ticker = tokio::spawn(async {
            let mut ticks = 0u32;
            for _ in 0..30 {
                tokio::time::sleep(Duration::from_secs(1)).await;
                ticks += 1;
            }
            ticks
        });

        fetcher.fetch(URL, &[], Duration::from_secs(10)).await.unwrap();
        assert_eq!(ticker.await.unwrap(), 30);
    }
}
