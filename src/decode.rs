//! Message decoding: raw email bytes to plain-text and HTML bodies

use crate::error::{DecodeError, Result};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

/// Text content pulled out of one email
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedMessage {
    /// Subject header, empty when absent
    pub subject: String,

    /// All `text/plain` parts, decoded and concatenated
    pub plain_text: String,

    /// All `text/html` parts, decoded and concatenated
    pub html_text: String,
}

impl DecodedMessage {
    /// Text the extractor should scan: plain text, else text recovered
    /// from the HTML body, else nothing.
    #[must_use]
    pub fn best_text(&self) -> String {
        if !self.plain_text.trim().is_empty() {
            self.plain_text.clone()
        } else if !self.html_text.trim().is_empty() {
            strip_html(&self.html_text)
        } else {
            String::new()
        }
    }
}

static QP_ESCAPE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:=[0-9A-F]{2})+").expect("valid escape pattern"));

static HTML_HIDDEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>")
        .expect("valid hidden-block pattern")
});

static HTML_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|tr|h[1-6])\s*>").expect("valid break pattern")
});

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Decode raw email bytes into subject and body text
pub fn decode(raw: &[u8]) -> Result<DecodedMessage> {
    let parsed = mailparse::parse_mail(raw).map_err(|e| DecodeError::Structure(e.to_string()))?;

    let subject = parsed
        .headers
        .iter()
        .find(|h| h.get_key().eq_ignore_ascii_case("subject"))
        .map(mailparse::MailHeader::get_value)
        .unwrap_or_default();

    let mut plain_text = String::new();
    let mut html_text = String::new();
    collect_text_parts(&parsed, &mut plain_text, &mut html_text);

    debug!(
        "Decoded message: {} plain chars, {} html chars",
        plain_text.len(),
        html_text.len()
    );

    Ok(DecodedMessage {
        subject,
        plain_text: normalize_plain_text(&plain_text),
        html_text: normalize_line_endings(&html_text),
    })
}

fn collect_text_parts(part: &mailparse::ParsedMail, text: &mut String, html: &mut String) {
    if !part.subparts.is_empty() {
        for sub in &part.subparts {
            collect_text_parts(sub, text, html);
        }
        return;
    }

    let content_type = part.ctype.mimetype.to_lowercase();
    if content_type == "text/plain" {
        text.push_str(&part_body(part));
    } else if content_type == "text/html" {
        html.push_str(&part_body(part));
    }
}

/// Decoded body of a leaf part. Charset problems degrade to replacement
/// characters instead of failing the whole message.
fn part_body(part: &mailparse::ParsedMail) -> String {
    match part.get_body() {
        Ok(body) => body,
        Err(e) => {
            debug!("Falling back to lossy body decode: {e}");
            part.get_body_raw()
                .map(|raw| String::from_utf8_lossy(&raw).into_owned())
                .unwrap_or_default()
        }
    }
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Remove quoted-printable leftovers: soft line breaks and `=XX` escapes
/// that survived because the part was not declared quoted-printable.
#[must_use]
pub fn normalize_plain_text(text: &str) -> String {
    let text = normalize_line_endings(text).replace("=\n", "");

    QP_ESCAPE_RUN
        .replace_all(&text, |caps: &Captures<'_>| {
            let bytes: Vec<u8> = caps[0]
                .split('=')
                .filter(|hex| !hex.is_empty())
                .filter_map(|hex| u8::from_str_radix(hex, 16).ok())
                .collect();
            String::from_utf8_lossy(&bytes).into_owned()
        })
        .into_owned()
}

/// Reduce an HTML body to readable text: scripts and styles dropped, block
/// ends turned into line breaks, remaining tags removed
#[must_use]
pub fn strip_html(html: &str) -> String {
    let text = HTML_HIDDEN.replace_all(html, "");
    let text = HTML_BREAK.replace_all(&text, "\n");
    let text = HTML_TAG.replace_all(&text, "");
    tidy_text(&text)
}

fn tidy_text(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
