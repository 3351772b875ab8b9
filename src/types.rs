//! Shared types for the unsubscribe cascade.

use serde::{Deserialize, Serialize};

// ── Candidate set ───────────────────────────────────────────────────

/// Structured unsubscribe candidates extracted from one message.
///
/// Built by the extractor, consumed by the cascade, dropped after the
/// invocation. Invariant: `body_url` is populated only when the headers
/// yielded nothing — header-declared candidates always win over
/// body-scraped ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsubscribeCandidates {
    /// HTTP(S) URLs from `List-Unsubscribe`, in header order, deduplicated
    /// by exact string. No normalization is applied here — sanitation is
    /// the validator's job.
    pub http_urls: Vec<String>,
    /// First `mailto:` URI from `List-Unsubscribe`, if any.
    pub mailto_url: Option<String>,
    /// Unsubscribe link scraped from the HTML body. Only set when
    /// `http_urls` is empty and `mailto_url` is absent.
    pub body_url: Option<String>,
    /// Whether the message advertises RFC 8058 one-click POST.
    pub has_one_click_post: bool,
}

impl UnsubscribeCandidates {
    /// True when no strategy has any input to work with.
    pub fn is_empty(&self) -> bool {
        self.http_urls.is_empty() && self.mailto_url.is_none() && self.body_url.is_none()
    }
}

// ── Validation ──────────────────────────────────────────────────────

/// Outcome of URL validation. Pure value, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub reason: Option<String>,
}

impl ValidationResult {
    /// The URL passed every check.
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    /// The URL failed a check; `reason` names the first failure.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

// ── Cascade methods ─────────────────────────────────────────────────

/// One unsubscribe strategy in the cascade, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// RFC 8058 one-click POST on the first header URL.
    Rfc8058,
    /// Standard POST/GET cascade over the header URLs.
    HttpHeader,
    /// Standard POST/GET cascade on the body-scraped URL.
    HttpBody,
    /// Minimal email to the `mailto:` recipient.
    Mailto,
}

impl Method {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rfc8058 => "rfc8058",
            Self::HttpHeader => "http-header",
            Self::HttpBody => "http-body",
            Self::Mailto => "mailto",
        }
    }
}

// ── Execution result ────────────────────────────────────────────────

/// Terminal result of one cascade invocation.
///
/// Created fresh per call and returned to the caller, which decides what
/// to persist and what to show the user. The engine never stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether any strategy succeeded.
    pub success: bool,
    /// The strategy that succeeded, if any.
    pub method: Option<Method>,
    /// Every strategy attempted, in cascade order. Append-only.
    pub attempted: Vec<Method>,
    /// Diagnostic for the caller on failure.
    pub error: Option<String>,
}

impl ExecutionResult {
    /// First success — later strategies never ran.
    pub fn succeeded(method: Method, attempted: Vec<Method>) -> Self {
        Self {
            success: true,
            method: Some(method),
            attempted,
            error: None,
        }
    }

    /// Nothing to try: no candidates and no eligible strategy.
    pub fn unavailable() -> Self {
        Self {
            success: false,
            method: None,
            attempted: Vec::new(),
            error: Some("No unsubscribe methods available".to_string()),
        }
    }

    /// Every available strategy was attempted and failed.
    pub fn exhausted(attempted: Vec<Method>, last_error: Option<String>) -> Self {
        Self {
            success: false,
            method: None,
            attempted,
            error: Some(
                last_error.unwrap_or_else(|| "every unsubscribe attempt failed".to_string()),
            ),
        }
    }
}

// ── Mailto fields ───────────────────────────────────────────────────

/// Fields parsed out of a `mailto:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailtoFields {
    /// Recipient address (the portion before `?`).
    pub to: String,
    /// Percent-decoded `subject` parameter, default "Unsubscribe".
    pub subject: String,
    /// Percent-decoded `body` parameter, default empty.
    pub body: String,
}
