//! Content sanitization for user-supplied post fields.
//!
//! Two policies cover the two field shapes: plain fields (title, summary)
//! are entity-escaped so they render as inert text, and the rich body is
//! filtered against a fixed tag allowlist. Both passes are deterministic
//! and idempotent, so sanitizing already-sanitized content leaves it
//! unchanged. Every author's content goes through the same passes.

use std::collections::HashSet;
use std::sync::LazyLock;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("Content contains NUL bytes")]
    InvalidInput,
}

/// Which sanitization policy applies to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Rendered as text: all markup is escaped.
    Plain,

    /// Rendered as HTML: markup outside the allowlist is removed.
    Rich,
}

static RICH_POLICY: LazyLock<ammonia::Builder<'static>> = LazyLock::new(|| {
    let mut builder = ammonia::Builder::default();
    builder
        .tags(HashSet::from([
            "a",
            "b",
            "blockquote",
            "br",
            "code",
            "em",
            "h1",
            "h2",
            "h3",
            "h4",
            "h5",
            "h6",
            "i",
            "img",
            "li",
            "ol",
            "p",
            "pre",
            "s",
            "strong",
            "u",
            "ul",
        ]))
        .url_schemes(HashSet::from(["http", "https", "mailto"]))
        .link_rel(Some("noopener noreferrer"));
    builder
});

/// Sanitize one field of user-supplied content.
///
/// # Errors
///
/// Returns [`SanitizeError::InvalidInput`] for content that cannot be
/// stored safely; this is a validation failure, not a server fault.
pub fn sanitize(kind: FieldKind, raw: &str) -> Result<String, SanitizeError> {
    if raw.contains('\0') {
        return Err(SanitizeError::InvalidInput);
    }

    Ok(match kind {
        FieldKind::Plain => sanitize_plain(raw),
        FieldKind::Rich => RICH_POLICY.clean(raw).to_string(),
    })
}

/// Escape markup so the value renders as literal text.
///
/// Entities are decoded before encoding; otherwise a second pass would
/// turn an already escaped `&lt;` into `&amp;lt;`.
fn sanitize_plain(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    html_escape::encode_text(&decoded).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_escapes_markup() {
        let out = sanitize(FieldKind::Plain, "<script>alert(1)</script>Hi & bye").unwrap();
        assert_eq!(out, "&lt;script&gt;alert(1)&lt;/script&gt;Hi &amp; bye");
    }

    #[test]
    fn test_plain_is_idempotent() {
        for input in [
            "<b>title</b>",
            "AT&T & friends",
            "already &lt;escaped&gt; &amp; fine",
            "plain text",
        ] {
            let once = sanitize(FieldKind::Plain, input).unwrap();
            let twice = sanitize(FieldKind::Plain, &once).unwrap();
            assert_eq!(once, twice, "double pass changed {input:?}");
        }
    }

    #[test]
    fn test_rich_keeps_allowlisted_markup() {
        let out = sanitize(FieldKind::Rich, "<p>Hello <strong>world</strong></p>").unwrap();
        assert_eq!(out, "<p>Hello <strong>world</strong></p>");
    }

    #[test]
    fn test_rich_strips_scripts_and_handlers() {
        let out = sanitize(
            FieldKind::Rich,
            r#"<p>ok</p><script>evil()</script><img src="x" onerror="alert(1)">"#,
        )
        .unwrap();

        assert!(out.contains("<p>ok</p>"));
        assert!(!out.contains("script"));
        assert!(!out.contains("evil"));
        assert!(!out.contains("onerror"));
    }

    #[test]
    fn test_rich_strips_javascript_urls() {
        let out = sanitize(FieldKind::Rich, r#"<a href="javascript:alert(1)">x</a>"#).unwrap();
        assert!(!out.contains("javascript:"));
    }

    #[test]
    fn test_rich_is_idempotent() {
        for input in [
            "<p>Hello <em>there</em></p>",
            r#"<div class="x"><p>nested</p></div>"#,
            r#"<a href="https://example.com">link</a>"#,
            "text with <unknown>tags</unknown> & entities",
        ] {
            let once = sanitize(FieldKind::Rich, input).unwrap();
            let twice = sanitize(FieldKind::Rich, &once).unwrap();
            assert_eq!(once, twice, "double pass changed {input:?}");
        }
    }

    #[test]
    fn test_nul_bytes_rejected() {
        assert_eq!(
            sanitize(FieldKind::Plain, "a\0b"),
            Err(SanitizeError::InvalidInput)
        );
        assert_eq!(
            sanitize(FieldKind::Rich, "a\0b"),
            Err(SanitizeError::InvalidInput)
        );
    }
}
