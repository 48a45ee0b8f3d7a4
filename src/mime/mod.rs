//! MIME reassembly of fetched message transcripts.
//!
//! A fetched message arrives as one opaque byte transcript (headers plus an
//! arbitrarily nested MIME body). [`parse_message`] is a pure, synchronous
//! call over the fully received bytes; the byte-accumulation boundary lives
//! in the mailbox provider, so no mutable parse state leaks across
//! concurrent message handlers.

use mail_parser::{MessageParser, PartType};

/// Structured result of reassembling one message.
///
/// Consumed immediately by link extraction; the subject is kept only for
/// diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ParsedMessage {
    /// Message subject, if present.
    pub subject: Option<String>,
    /// Decoded plain-text body, if the message carries one.
    pub body_text: Option<String>,
    /// Decoded HTML body, if the message carries one.
    ///
    /// `None` is a legitimate outcome, not an error: the message is simply
    /// skipped downstream.
    pub body_html: Option<String>,
}

impl ParsedMessage {
    /// Returns true if the message has an HTML part to scan.
    pub fn has_html(&self) -> bool {
        self.body_html.is_some()
    }
}

/// The transcript could not be parsed as a MIME message.
///
/// Recoverable: the orchestrator logs it and moves on to the next message.
#[derive(Debug, thiserror::Error)]
#[error("failed to parse MIME message")]
pub struct MessageParseError;

/// Parses a complete MIME transcript into a [`ParsedMessage`].
pub fn parse_message(raw: &[u8]) -> Result<ParsedMessage, MessageParseError> {
    let message = MessageParser::default().parse(raw).ok_or(MessageParseError)?;

    // body_html(0) would transparently convert a plain-text part to HTML;
    // a message without a real HTML part must surface as None here.
    let body_html = message
        .html_body
        .first()
        .and_then(|&id| message.parts.get(id))
        .and_then(|part| match &part.body {
            PartType::Html(html) => Some(html.as_ref().to_string()),
            _ => None,
        });

    Ok(ParsedMessage {
        subject: message.subject().map(|s| s.to_string()),
        body_text: message.body_text(0).map(|s| s.to_string()),
        body_html,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_html_part_from_multipart_message() {
        let raw = concat!(
            "From: news@example.com\r\n",
            "To: user@example.com\r\n",
            "Subject: Weekly digest\r\n",
            "MIME-Version: 1.0\r\n",
            "Content-Type: multipart/alternative; boundary=\"sep\"\r\n",
            "\r\n",
            "--sep\r\n",
            "Content-Type: text/plain; charset=utf-8\r\n",
            "\r\n",
            "plain body\r\n",
            "--sep\r\n",
            "Content-Type: text/html; charset=utf-8\r\n",
            "\r\n",
            "<html><body><a href=\"http://x/unsub\">Unsubscribe</a></body></html>\r\n",
            "--sep--\r\n",
        );

        let parsed = parse_message(raw.as_bytes()).unwrap();
        assert_eq!(parsed.subject.as_deref(), Some("Weekly digest"));
        assert!(parsed.has_html());
        assert!(parsed.body_html.unwrap().contains("http://x/unsub"));
        assert!(parsed.body_text.unwrap().starts_with("plain body"));
    }

    #[test]
    fn plain_text_only_message_has_no_html() {
        let raw = concat!(
            "From: a@example.com\r\n",
            "Subject: hello\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "just text\r\n",
        );

        let parsed = parse_message(raw.as_bytes()).unwrap();
        assert!(!parsed.has_html());
        assert!(parsed.body_text.is_some());
    }

    #[test]
    fn quoted_printable_html_is_decoded() {
        let raw = concat!(
            "From: a@example.com\r\n",
            "Content-Type: text/html; charset=utf-8\r\n",
            "Content-Transfer-Encoding: quoted-printable\r\n",
            "\r\n",
            "<a href=3D\"http://x/unsub\">Unsubscribe</a>\r\n",
        );

        let parsed = parse_message(raw.as_bytes()).unwrap();
        let html = parsed.body_html.unwrap();
        assert!(html.contains("href=\"http://x/unsub\""));
    }

    #[test]
    fn empty_transcript_is_an_error() {
        assert!(parse_message(b"").is_err());
    }
}
