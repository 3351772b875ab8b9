//! Header/body extractor — turns raw unsubscribe headers and the MIME
//! tree into a structured candidate set.
//!
//! Pure string work: no I/O, no URL sanitation. Anything extracted here
//! still has to pass the validator before a request goes out.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::UnsubscribeCandidates;

/// RFC 8058 requires `List-Unsubscribe-Post` to carry exactly this value.
///
/// Senders that put anything else there do not get the one-click POST —
/// a malformed companion header is treated as "not one-click" rather
/// than triggering a POST with an unexpected body.
pub const ONE_CLICK_LITERAL: &str = "List-Unsubscribe=One-Click";

/// First `<a href="...">` in an HTML body.
static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#).unwrap()
});

/// Extract unsubscribe candidates from the raw header values and the
/// decoded HTML body, if any.
///
/// The body is consulted only when the headers yielded nothing — a
/// header-declared candidate always wins over a body-scraped one.
/// Extraction is idempotent: identical input yields an identical set.
pub fn extract_candidates(
    list_unsubscribe: Option<&str>,
    list_unsubscribe_post: Option<&str>,
    html_body: Option<&str>,
) -> UnsubscribeCandidates {
    let (http_urls, mailto_url) = list_unsubscribe
        .map(parse_list_unsubscribe)
        .unwrap_or_default();

    let has_one_click_post = list_unsubscribe_post
        .is_some_and(|value| value.trim().eq_ignore_ascii_case(ONE_CLICK_LITERAL));

    let body_url = if http_urls.is_empty() && mailto_url.is_none() {
        html_body.and_then(find_unsubscribe_anchor)
    } else {
        None
    };

    UnsubscribeCandidates {
        http_urls,
        mailto_url,
        body_url,
        has_one_click_post,
    }
}

/// Extract candidates straight from a parsed message.
///
/// Pulls `List-Unsubscribe`, `List-Unsubscribe-Post`, and the first HTML
/// body part (mail-parser walks nested multiparts and undoes the
/// transfer encoding), then delegates to [`extract_candidates`].
pub fn candidates_from_message(message: &mail_parser::Message<'_>) -> UnsubscribeCandidates {
    let list_unsubscribe = message.header_raw("List-Unsubscribe");
    let list_unsubscribe_post = message.header_raw("List-Unsubscribe-Post");
    let html_body = message.body_html(0);

    extract_candidates(
        list_unsubscribe,
        list_unsubscribe_post,
        html_body.as_deref(),
    )
}

/// Parse a raw `List-Unsubscribe` value into (http_urls, mailto_url).
///
/// The header is a comma-separated list of `<uri>` tokens. Tokens
/// without angle brackets are malformed and discarded — there is no
/// bracketless fallback. HTTP(S) URIs keep header order with
/// exact-string dedup; only the first mailto URI is kept.
pub fn parse_list_unsubscribe(raw: &str) -> (Vec<String>, Option<String>) {
    let mut http_urls: Vec<String> = Vec::new();
    let mut mailto_url = None;

    for token in raw.split(',') {
        let token = token.trim();
        let Some(uri) = token
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::trim)
        else {
            continue;
        };

        match scheme_of(uri) {
            Some(scheme) if scheme.eq_ignore_ascii_case("http")
                || scheme.eq_ignore_ascii_case("https") =>
            {
                if !http_urls.iter().any(|u| u == uri) {
                    http_urls.push(uri.to_string());
                }
            }
            Some(scheme) if scheme.eq_ignore_ascii_case("mailto") => {
                if mailto_url.is_none() {
                    mailto_url = Some(uri.to_string());
                }
            }
            _ => {}
        }
    }

    (http_urls, mailto_url)
}

/// The scheme part of a URI, if it has one.
fn scheme_of(uri: &str) -> Option<&str> {
    uri.split_once(':').map(|(scheme, _)| scheme)
}

/// First anchor href that mentions "unsubscribe", case-insensitively.
fn find_unsubscribe_anchor(html: &str) -> Option<String> {
    ANCHOR_HREF
        .captures_iter(html)
        .map(|c| c[1].to_string())
        .find(|href| href.to_ascii_lowercase().contains("unsubscribe"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── List-Unsubscribe parsing ────────────────────────────────────

    #[test]
    fn parses_http_and_mailto_pair() {
        let candidates = extract_candidates(
            Some("<https://a.com/x>, <mailto:u@b.com>"),
            None,
            None,
        );
        assert_eq!(candidates.http_urls, vec!["https://a.com/x"]);
        assert_eq!(candidates.mailto_url.as_deref(), Some("mailto:u@b.com"));
        assert_eq!(candidates.body_url, None);
        assert!(!candidates.has_one_click_post);
    }

    #[test]
    fn preserves_header_order() {
        let (urls, _) = parse_list_unsubscribe(
            "<https://b.com/2>, <https://a.com/1>, <http://c.com/3>",
        );
        assert_eq!(urls, vec!["https://b.com/2", "https://a.com/1", "http://c.com/3"]);
    }

    #[test]
    fn dedups_exact_urls_keeping_first() {
        let (urls, _) = parse_list_unsubscribe(
            "<https://a.com/x>, <https://b.com/y>, <https://a.com/x>",
        );
        assert_eq!(urls, vec!["https://a.com/x", "https://b.com/y"]);
    }

    #[test]
    fn discards_bracketless_tokens() {
        let (urls, mailto) =
            parse_list_unsubscribe("https://a.com/x, <https://b.com/y>, mailto:u@c.com");
        assert_eq!(urls, vec!["https://b.com/y"]);
        assert_eq!(mailto, None);
    }

    #[test]
    fn keeps_only_first_mailto() {
        let (_, mailto) =
            parse_list_unsubscribe("<mailto:first@a.com>, <mailto:second@b.com>");
        assert_eq!(mailto.as_deref(), Some("mailto:first@a.com"));
    }

    #[test]
    fn ignores_unknown_schemes() {
        let (urls, mailto) =
            parse_list_unsubscribe("<ftp://a.com/x>, <tel:+123>, <https://b.com/y>");
        assert_eq!(urls, vec!["https://b.com/y"]);
        assert_eq!(mailto, None);
    }

    #[test]
    fn scheme_match_is_case_insensitive() {
        let (urls, mailto) =
            parse_list_unsubscribe("<HTTPS://a.com/x>, <MailTo:u@b.com>");
        assert_eq!(urls, vec!["HTTPS://a.com/x"]);
        assert_eq!(mailto.as_deref(), Some("MailTo:u@b.com"));
    }

    #[test]
    fn trims_whitespace_around_tokens() {
        let (urls, mailto) =
            parse_list_unsubscribe("  <https://a.com/x>  ,\r\n <mailto:u@b.com> ");
        assert_eq!(urls, vec!["https://a.com/x"]);
        assert_eq!(mailto.as_deref(), Some("mailto:u@b.com"));
    }

    #[test]
    fn empty_and_garbage_headers_yield_nothing() {
        assert_eq!(parse_list_unsubscribe(""), (vec![], None));
        assert_eq!(parse_list_unsubscribe(",,,"), (vec![], None));
        assert_eq!(parse_list_unsubscribe("<>"), (vec![], None));
    }

    #[test]
    fn extraction_is_idempotent() {
        let header = Some("<https://a.com/x>, <mailto:u@b.com>");
        let post = Some("List-Unsubscribe=One-Click");
        let first = extract_candidates(header, post, None);
        let second = extract_candidates(header, post, None);
        assert_eq!(first, second);
    }

    // ── One-click detection ─────────────────────────────────────────

    #[test]
    fn one_click_requires_exact_literal() {
        let header = Some("<https://a.com/x>");
        assert!(
            extract_candidates(header, Some("List-Unsubscribe=One-Click"), None)
                .has_one_click_post
        );
        assert!(
            extract_candidates(header, Some("  list-unsubscribe=one-click  "), None)
                .has_one_click_post
        );
        assert!(
            !extract_candidates(header, Some("yes"), None).has_one_click_post
        );
        assert!(!extract_candidates(header, Some(""), None).has_one_click_post);
        assert!(!extract_candidates(header, None, None).has_one_click_post);
    }

    // ── Body fallback ───────────────────────────────────────────────

    #[test]
    fn body_fallback_finds_unsubscribe_anchor() {
        let html = r#"<html><body>
            <a href="https://x.com/view">View online</a>
            <a href="https://x.com/Unsubscribe?u=42">stop emailing me</a>
        </body></html>"#;
        let candidates = extract_candidates(None, None, Some(html));
        assert_eq!(
            candidates.body_url.as_deref(),
            Some("https://x.com/Unsubscribe?u=42")
        );
    }

    #[test]
    fn body_fallback_takes_first_match() {
        let html = r#"<a href='https://x.com/unsubscribe/1'>one</a>
                      <a href='https://x.com/unsubscribe/2'>two</a>"#;
        let candidates = extract_candidates(None, None, Some(html));
        assert_eq!(
            candidates.body_url.as_deref(),
            Some("https://x.com/unsubscribe/1")
        );
    }

    #[test]
    fn body_fallback_suppressed_by_header_urls() {
        let html = r#"<a href="https://x.com/unsubscribe">bye</a>"#;
        let candidates =
            extract_candidates(Some("<https://a.com/u>"), None, Some(html));
        assert_eq!(candidates.body_url, None);
    }

    #[test]
    fn body_fallback_suppressed_by_mailto() {
        let html = r#"<a href="https://x.com/unsubscribe">bye</a>"#;
        let candidates =
            extract_candidates(Some("<mailto:u@a.com>"), None, Some(html));
        assert_eq!(candidates.body_url, None);
    }

    #[test]
    fn body_without_unsubscribe_anchor_yields_nothing() {
        let html = r#"<a href="https://x.com/shop">Shop now</a>"#;
        let candidates = extract_candidates(None, None, Some(html));
        assert_eq!(candidates.body_url, None);
        assert!(candidates.is_empty());
    }

    // ── Whole-message extraction ────────────────────────────────────

    #[test]
    fn extracts_from_parsed_message() {
        let raw = concat!(
            "From: news@sender.example\r\n",
            "To: user@example.com\r\n",
            "Subject: Weekly digest\r\n",
            "List-Unsubscribe: <https://sender.example/u?t=1>, <mailto:unsub@sender.example>\r\n",
            "List-Unsubscribe-Post: List-Unsubscribe=One-Click\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "hello\r\n",
        );
        let message = mail_parser::MessageParser::default()
            .parse(raw.as_bytes())
            .unwrap();
        let candidates = candidates_from_message(&message);
        assert_eq!(candidates.http_urls, vec!["https://sender.example/u?t=1"]);
        assert_eq!(
            candidates.mailto_url.as_deref(),
            Some("mailto:unsub@sender.example")
        );
        assert!(candidates.has_one_click_post);
        assert_eq!(candidates.body_url, None);
    }

    #[test]
    fn falls_back_to_html_part_when_headers_absent() {
        let raw = concat!(
            "From: news@sender.example\r\n",
            "To: user@example.com\r\n",
            "Subject: Promo\r\n",
            "Content-Type: text/html; charset=utf-8\r\n",
            "\r\n",
            "<html><body><a href=\"https://sender.example/unsubscribe?u=9\">unsubscribe</a></body></html>\r\n",
        );
        let message = mail_parser::MessageParser::default()
            .parse(raw.as_bytes())
            .unwrap();
        let candidates = candidates_from_message(&message);
        assert!(candidates.http_urls.is_empty());
        assert_eq!(
            candidates.body_url.as_deref(),
            Some("https://sender.example/unsubscribe?u=9")
        );
    }
}
