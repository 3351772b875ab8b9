//! Mailto execution strategy — composes and dispatches a minimal email
//! when no HTTP path worked.
//!
//! Requires an explicit send capability from the caller. Without one the
//! strategy fails immediately and no network is touched; the engine
//! never manages OAuth scopes, tokens, or credentials itself.

use tracing::{debug, warn};

use crate::error::SendError;
use crate::sender::EmailSender;
use crate::types::MailtoFields;

/// Outcome of one mailto strategy invocation.
#[derive(Debug, Clone, Default)]
pub struct MailtoOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl MailtoFields {
    /// Parse a `mailto:` URI into recipient, subject, and body.
    ///
    /// The recipient is the portion before `?`. `subject` and `body`
    /// query parameters are percent-decoded; everything else in the
    /// query is ignored. A URI without a recipient is an error — there
    /// is nowhere to send.
    pub fn parse(uri: &str) -> Result<Self, SendError> {
        let rest = strip_mailto_scheme(uri)
            .ok_or_else(|| SendError::InvalidMailto(format!("not a mailto URI: {uri}")))?;

        let (to, query) = match rest.split_once('?') {
            Some((to, query)) => (to, Some(query)),
            None => (rest, None),
        };

        let to = to.trim();
        if to.is_empty() {
            return Err(SendError::MissingRecipient);
        }

        let mut subject = None;
        let mut body = None;
        if let Some(query) = query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                match &*key {
                    "subject" => subject = Some(value.into_owned()),
                    "body" => body = Some(value.into_owned()),
                    _ => {}
                }
            }
        }

        Ok(Self {
            to: to.to_string(),
            subject: subject.unwrap_or_else(|| "Unsubscribe".to_string()),
            body: body.unwrap_or_default(),
        })
    }
}

/// Case-insensitive `mailto:` prefix strip.
fn strip_mailto_scheme(uri: &str) -> Option<&str> {
    let prefix_len = "mailto:".len();
    if uri.len() >= prefix_len && uri[..prefix_len].eq_ignore_ascii_case("mailto:") {
        Some(&uri[prefix_len..])
    } else {
        None
    }
}

/// Attempt an unsubscribe via email.
///
/// Fails without touching the network when the capability is absent or
/// the URI has no usable recipient.
pub async fn perform_mailto(uri: &str, sender: Option<&dyn EmailSender>) -> MailtoOutcome {
    let Some(sender) = sender.filter(|s| s.can_send()) else {
        debug!("mailto unsubscribe skipped: send capability not available");
        return MailtoOutcome {
            success: false,
            error: Some(SendError::CapabilityUnavailable.to_string()),
        };
    };

    let fields = match MailtoFields::parse(uri) {
        Ok(fields) => fields,
        Err(e) => {
            debug!(error = %e, "mailto unsubscribe skipped: unparseable URI");
            return MailtoOutcome {
                success: false,
                error: Some(e.to_string()),
            };
        }
    };

    match sender
        .send(&fields.to, &fields.subject, &fields.body)
        .await
    {
        Ok(()) => {
            debug!(to = %fields.to, "mailto unsubscribe sent");
            MailtoOutcome {
                success: true,
                error: None,
            }
        }
        Err(e) => {
            warn!(to = %fields.to, error = %e, "mailto unsubscribe failed");
            MailtoOutcome {
                success: false,
                error: Some(e.to_string()),
            }
        }
    }
}
