//! EAD inline markup to HTML.
//!
//! Only `<emph>`, `<title>` and `<titleproper>` are rewritten, and only when
//! their `render` attribute is one of the keys below:
//!
//! | `render`                                                              | HTML       |
//! |-----------------------------------------------------------------------|------------|
//! | altrender, doublequote, italic, italics, nonproport, singlequote, smcaps, underline | `em` |
//! | bold, bolddoublequote, bolditalic, boldsinglequote, boldsmcaps, boldunderline       | `strong` |
//! | sub                                                                   | `sub`      |
//! | super                                                                 | `sup`      |
//!
//! Everything else passes through as written.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::HtmlError;
use crate::text::sanitize;
use crate::xml::dom::local_name;
use crate::xml::strip_tags;

const REWRITTEN_ELEMENTS: [&str; 3] = ["emph", "title", "titleproper"];

/// `render` value to HTML element name.
pub const RENDER_MAP: &[(&str, &str)] = &[
    ("altrender", "em"),
    ("doublequote", "em"),
    ("italic", "em"),
    ("italics", "em"),
    ("nonproport", "em"),
    ("singlequote", "em"),
    ("smcaps", "em"),
    ("underline", "em"),
    ("bold", "strong"),
    ("bolddoublequote", "strong"),
    ("bolditalic", "strong"),
    ("boldsinglequote", "strong"),
    ("boldsmcaps", "strong"),
    ("boldunderline", "strong"),
    ("sub", "sub"),
    ("super", "sup"),
];

/// Tags kept by [`title_html`]: the range of [`RENDER_MAP`], in order.
pub fn allowed_title_tags() -> Vec<&'static str> {
    let mut tags = Vec::new();
    for (_, tag) in RENDER_MAP {
        if !tags.contains(tag) {
            tags.push(*tag);
        }
    }
    tags
}

fn html_name(render: &str) -> Option<&'static str> {
    RENDER_MAP
        .iter()
        .find(|(key, _)| *key == render)
        .map(|(_, tag)| *tag)
}

/// Opening-tag content for `e`: the mapped HTML name without `render`, or
/// the tag exactly as written.
fn rewrite_tag(e: &BytesStart<'_>) -> Result<(String, String), String> {
    let raw = String::from_utf8_lossy(e).into_owned();
    let qualified = String::from_utf8_lossy(e.name().as_ref()).into_owned();

    if !REWRITTEN_ELEMENTS.contains(&local_name(&qualified)) {
        return Ok((raw, qualified));
    }

    let mut mapped = None;
    let mut kept = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        if local_name(&key) == "render" {
            mapped = html_name(&value);
            if mapped.is_some() {
                continue;
            }
        }
        kept.push(format!("{}=\"{}\"", key, value));
    }

    match mapped {
        Some(tag) => {
            let mut content = tag.to_string();
            for attr in kept {
                content.push(' ');
                content.push_str(&attr);
            }
            Ok((content, tag.to_string()))
        }
        None => Ok((raw, qualified)),
    }
}

/// Rewrite rendered EAD inline elements to HTML, then sanitize.
///
/// On malformed input the error carries the untouched input.
pub fn ead_to_html(xml: &str) -> Result<String, HtmlError> {
    let malformed = |message: String| HtmlError::Malformed {
        original: xml.to_string(),
        message,
    };

    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut out = String::with_capacity(xml.len());
    let mut open: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let (content, name) = rewrite_tag(&e).map_err(&malformed)?;
                out.push('<');
                out.push_str(&content);
                out.push('>');
                open.push(name);
            }
            Ok(Event::Empty(e)) => {
                let (content, _) = rewrite_tag(&e).map_err(&malformed)?;
                out.push('<');
                out.push_str(&content);
                out.push_str("/>");
            }
            Ok(Event::End(_)) => {
                let name = open
                    .pop()
                    .ok_or_else(|| malformed("unexpected closing tag".to_string()))?;
                out.push_str("</");
                out.push_str(&name);
                out.push('>');
            }
            Ok(Event::Text(t)) => out.push_str(&String::from_utf8_lossy(&t)),
            Ok(Event::CData(c)) => {
                out.push_str("<![CDATA[");
                out.push_str(&String::from_utf8_lossy(&c));
                out.push_str("]]>");
            }
            Ok(Event::Comment(c)) => {
                out.push_str("<!--");
                out.push_str(&String::from_utf8_lossy(&c));
                out.push_str("-->");
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(e.to_string())),
        }
        buf.clear();
    }

    if let Some(name) = open.last() {
        return Err(malformed(format!("<{}> is never closed", name)));
    }
    Ok(sanitize(&out))
}

/// Title HTML: [`ead_to_html`] followed by [`strip_tags`] with
/// [`allowed_title_tags`].
///
/// Falls back to the last good intermediate form when a step fails.
pub fn title_html(xml: &str) -> String {
    let html = match ead_to_html(xml) {
        Ok(html) => html,
        Err(e) => {
            debug!(error = %e, "inline markup left unconverted");
            e.original().to_string()
        }
    };
    match strip_tags(&html, &allowed_title_tags()) {
        Ok(stripped) => stripped,
        Err(e) => {
            debug!(error = %e, "inline markup left unstripped");
            html
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_title_tags_is_mapping_range() {
        assert_eq!(allowed_title_tags(), vec!["em", "strong", "sub", "sup"]);
    }

    #[test]
    fn test_render_rewrites_known_elements() {
        let out = ead_to_html(
            r#"A <emph render="italic">b</emph> <title render="bold" type="x">c</title> <titleproper render="super">d</titleproper>"#,
        )
        .unwrap();
        assert_eq!(
            out,
            r#"A <em>b</em> <strong type="x">c</strong> <sup>d</sup>"#
        );
    }

    #[test]
    fn test_other_elements_pass_through() {
        let input = r#"<persname render="bold">X</persname> <emph>plain</emph> <emph render="unknown">u</emph> <lb/>"#;
        assert_eq!(ead_to_html(input).unwrap(), input);
    }

    #[test]
    fn test_malformed_returns_original() {
        let err = ead_to_html("<emph render=\"bold\">broken").unwrap_err();
        assert_eq!(err.original(), "<emph render=\"bold\">broken");
    }

    #[test]
    fn test_sanitizes_output() {
        assert_eq!(ead_to_html("a\u{0007}b").unwrap(), "ab");
    }

    #[test]
    fn test_title_html() {
        assert_eq!(
            title_html(r#"Papers of <persname>Jo</persname> <emph render="italic">Smith</emph><lb/>"#),
            "Papers of Jo <em>Smith</em>"
        );
        assert_eq!(title_html("unbalanced <emph>"), "unbalanced <emph>");
    }
}
