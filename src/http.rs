//! HTTP execution strategy — issues the actual unsubscribe requests.
//!
//! Every call re-validates its URL before touching the network, even
//! though the cascade already validated it: the strategy never trusts
//! that validation happened upstream. On top of the lexical guard it
//! resolves the hostname and checks the resolved addresses, so a public
//! name pointing at a private address is refused before a connection is
//! opened. Redirect hops are validated the same way.
//!
//! Requests carry no cookies, no stored credentials, and no ambient
//! session state — the destination is an untrusted third party. Logs
//! name the target hostname only; query strings routinely carry
//! per-recipient tokens and must stay out of the logs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect;
use tracing::{debug, warn};
use url::Url;

use crate::config::EngineConfig;
use crate::error::{EngineError, HttpError};
use crate::validate;

/// Fixed body of an RFC 8058 one-click POST.
pub const ONE_CLICK_BODY: &str = "List-Unsubscribe=One-Click";

/// Outcome of one HTTP strategy invocation.
#[derive(Debug, Clone, Default)]
pub struct HttpOutcome {
    pub success: bool,
    pub status: Option<u16>,
    pub error: Option<String>,
}

impl HttpOutcome {
    fn success(status: u16) -> Self {
        Self {
            success: true,
            status: Some(status),
            error: None,
        }
    }

    fn failure(status: Option<u16>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            error: Some(error.into()),
        }
    }
}

/// Seam for the cascade: real requests in production, fakes in tests.
#[async_trait]
pub trait HttpExec: Send + Sync {
    /// Run the unsubscribe request(s) for one URL.
    ///
    /// `one_click` selects the RFC 8058 single-POST mode; otherwise the
    /// standard POST-then-GET cascade runs.
    async fn perform(&self, url: &str, one_click: bool) -> HttpOutcome;
}

/// Production strategy backed by a shared `reqwest::Client`.
///
/// The client reuses connections across invocations; that is fine
/// because validation runs per request, not per client.
pub struct HttpUnsubscriber {
    client: reqwest::Client,
    timeout: Duration,
    allow_private_hosts: bool,
}

impl HttpUnsubscriber {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let redirect_policy = if config.allow_private_hosts {
            redirect::Policy::limited(config.max_redirects)
        } else {
            // Redirects are followed, but never into the ranges the
            // validator refuses — a redirect is just another
            // attacker-controlled URL.
            let max_redirects = config.max_redirects;
            redirect::Policy::custom(move |attempt| {
                if attempt.previous().len() >= max_redirects {
                    return attempt.error("too many redirects");
                }
                let verdict = validate::validate(attempt.url().as_str());
                if !verdict.valid {
                    return attempt.error("redirect target rejected by URL validator");
                }
                attempt.follow()
            })
        };

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(redirect_policy)
            .build()?;

        Ok(Self {
            client,
            timeout: config.http_timeout,
            allow_private_hosts: config.allow_private_hosts,
        })
    }

    /// Resolve the host and refuse blocked addresses.
    ///
    /// The lexical validator cannot see what a public hostname resolves
    /// to; this check closes the DNS half of that gap. The connection
    /// itself re-resolves, so a rebind between check and connect is
    /// still possible — accepted and documented as residual risk.
    async fn check_resolved(&self, url: &Url) -> Result<(), String> {
        let Some(host) = url.host_str() else {
            return Err("URL has no host".to_string());
        };
        let port = url.port_or_known_default().unwrap_or(443);

        let addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| format!("DNS lookup failed: {e}"))?;

        for addr in addrs {
            if validate::is_blocked_ip(addr.ip()) {
                return Err(format!("{host} resolves to a blocked address"));
            }
        }
        Ok(())
    }

    /// Issue one request and classify the outcome.
    async fn send_once(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<u16, HttpError> {
        match request.timeout(self.timeout).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    Ok(status.as_u16())
                } else {
                    Err(HttpError::Status(status.as_u16()))
                }
            }
            Err(e) if e.is_timeout() => Err(HttpError::Timeout {
                timeout: self.timeout,
            }),
            Err(e) => Err(HttpError::Network(e.to_string())),
        }
    }
}

#[async_trait]
impl HttpExec for HttpUnsubscriber {
    async fn perform(&self, url: &str, one_click: bool) -> HttpOutcome {
        // Defense in depth: validate here regardless of what the caller
        // already checked.
        if !self.allow_private_hosts {
            let verdict = validate::validate(url);
            if !verdict.valid {
                let reason = verdict.reason.unwrap_or_else(|| "invalid URL".to_string());
                debug!(reason = %reason, "unsubscribe URL rejected, skipping request");
                return HttpOutcome::failure(None, format!("URL rejected: {reason}"));
            }
        }

        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                return HttpOutcome::failure(None, format!("URL rejected: malformed URL: {e}"));
            }
        };
        let host = parsed.host_str().unwrap_or("<unknown>").to_string();

        if !self.allow_private_hosts
            && let Err(reason) = self.check_resolved(&parsed).await
        {
            warn!(host = %host, reason = %reason, "unsubscribe host failed resolution check");
            return HttpOutcome::failure(None, format!("URL rejected: {reason}"));
        }

        if one_click {
            debug!(host = %host, "attempting one-click unsubscribe POST");
            let request = self
                .client
                .post(parsed)
                .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(ONE_CLICK_BODY);
            return match self.send_once(request).await {
                Ok(status) => {
                    debug!(host = %host, status, "one-click unsubscribe succeeded");
                    HttpOutcome::success(status)
                }
                Err(e) => {
                    warn!(host = %host, error = %e, "one-click unsubscribe failed");
                    HttpOutcome::failure(status_of(&e), e.to_string())
                }
            };
        }

        // Standard mode: bodyless POST first, GET fallback under a fresh
        // timeout budget.
        debug!(host = %host, "attempting standard unsubscribe POST");
        let post_error = match self.send_once(self.client.post(parsed.clone())).await {
            Ok(status) => {
                debug!(host = %host, status, "unsubscribe POST succeeded");
                return HttpOutcome::success(status);
            }
            Err(e) => e,
        };

        debug!(host = %host, error = %post_error, "POST failed, falling back to GET");
        match self.send_once(self.client.get(parsed)).await {
            Ok(status) => {
                debug!(host = %host, status, "unsubscribe GET succeeded");
                HttpOutcome::success(status)
            }
            Err(get_error) => {
                warn!(
                    host = %host,
                    post_error = %post_error,
                    get_error = %get_error,
                    "standard unsubscribe failed"
                );
                HttpOutcome::failure(status_of(&get_error), get_error.to_string())
            }
        }
    }
}

/// Status code carried by an error, if it was a status failure.
fn status_of(error: &HttpError) -> Option<u16> {
    match error {
        HttpError::Status(status) => Some(*status),
        _ => None,
    }
}
