//! Cascade orchestrator — tries unsubscribe strategies in priority
//! order and returns one terminal result.
//!
//! **Core invariant: first success wins; later strategies never run.**
//!
//! Order:
//! 1. RFC 8058 one-click POST (first header URL, only when advertised)
//! 2. Standard POST/GET over every header URL
//! 3. Standard POST/GET on the body-scraped URL
//! 4. Mailto via the caller's send capability
//!
//! Strictly sequential — the endpoints are untrusted and possibly
//! rate-limited, so parallel attempts are never issued. Single pass:
//! no retry, no backoff, no state kept between invocations.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::http::{HttpExec, HttpUnsubscriber};
use crate::mailto;
use crate::sender::EmailSender;
use crate::types::{ExecutionResult, Method, UnsubscribeCandidates};

/// The unsubscribe engine.
///
/// Holds only the HTTP strategy (a shared client); everything else is
/// passed in per call. Construct once, share freely — invocations are
/// independent and the engine keeps no state across them.
pub struct UnsubscribeEngine {
    http: Arc<dyn HttpExec>,
}

impl UnsubscribeEngine {
    /// Create an engine with the production HTTP strategy.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            http: Arc::new(HttpUnsubscriber::new(config)?),
        })
    }

    /// Create an engine over a custom HTTP strategy (for tests).
    pub fn with_http(http: Arc<dyn HttpExec>) -> Self {
        Self { http }
    }

    /// Run the cascade for one message's candidate set.
    ///
    /// Every strategy step attempted lands in the attempt log, success
    /// or not. Dropping the returned future aborts any in-flight
    /// request.
    pub async fn execute(
        &self,
        candidates: &UnsubscribeCandidates,
        sender: Option<&dyn EmailSender>,
    ) -> ExecutionResult {
        let mut attempted = Vec::new();
        let mut last_error = None;

        // Step 1: RFC 8058 one-click POST on the first header URL.
        if candidates.has_one_click_post
            && let Some(first_url) = candidates.http_urls.first()
        {
            attempted.push(Method::Rfc8058);
            let outcome = self.http.perform(first_url, true).await;
            if outcome.success {
                return self.finish(ExecutionResult::succeeded(Method::Rfc8058, attempted));
            }
            debug!(error = ?outcome.error, "one-click attempt failed, continuing cascade");
            last_error = outcome.error.or(last_error);
        }

        // Step 2: standard cascade over the header URLs, header order.
        if !candidates.http_urls.is_empty() {
            attempted.push(Method::HttpHeader);
            for url in &candidates.http_urls {
                let outcome = self.http.perform(url, false).await;
                if outcome.success {
                    return self.finish(ExecutionResult::succeeded(
                        Method::HttpHeader,
                        attempted,
                    ));
                }
                last_error = outcome.error.or(last_error);
            }
            debug!("every header URL failed, continuing cascade");
        }

        // Step 3: standard cascade on the body-scraped URL.
        if let Some(body_url) = &candidates.body_url {
            attempted.push(Method::HttpBody);
            let outcome = self.http.perform(body_url, false).await;
            if outcome.success {
                return self.finish(ExecutionResult::succeeded(Method::HttpBody, attempted));
            }
            last_error = outcome.error.or(last_error);
        }

        // Step 4: mailto through the caller's send capability.
        if let Some(mailto_url) = &candidates.mailto_url {
            attempted.push(Method::Mailto);
            let outcome = mailto::perform_mailto(mailto_url, sender).await;
            if outcome.success {
                return self.finish(ExecutionResult::succeeded(Method::Mailto, attempted));
            }
            last_error = outcome.error.or(last_error);
        }

        if attempted.is_empty() {
            self.finish(ExecutionResult::unavailable())
        } else {
            self.finish(ExecutionResult::exhausted(attempted, last_error))
        }
    }

    /// Log the terminal state and hand the result back.
    fn finish(&self, result: ExecutionResult) -> ExecutionResult {
        info!(
            success = result.success,
            method = result.method.map(|m| m.label()).unwrap_or("none"),
            attempts = result.attempted.len(),
            "unsubscribe cascade finished"
        );
        result
    }
}
