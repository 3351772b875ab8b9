//! Best-effort mailing-list unsubscribe engine.
//!
//! Turns the `List-Unsubscribe` / `List-Unsubscribe-Post` headers of a
//! message (with an HTML-body fallback) into a structured candidate set,
//! then walks a fixed cascade of unsubscribe strategies — RFC 8058
//! one-click POST, header URLs, body-scraped URL, mailto — until one
//! succeeds or all are exhausted. Every candidate URL names an untrusted
//! third party, so every outbound request is gated by an SSRF guard.
//!
//! The engine is stateless: each invocation builds, consumes, and drops
//! its own values, and failures come back as ordinary result values.

pub mod cascade;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod mailto;
pub mod sender;
pub mod types;
pub mod validate;

pub use cascade::UnsubscribeEngine;
pub use config::EngineConfig;
pub use sender::EmailSender;
pub use types::{ExecutionResult, Method, UnsubscribeCandidates};
