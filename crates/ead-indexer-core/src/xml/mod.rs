//! XML helpers used by the extractors.
//!
//! | Helper                 | Purpose                                              |
//! |------------------------|------------------------------------------------------|
//! | [`query_values`]       | string values + serialized XML of an XPath result    |
//! | [`first_match`]        | first node of an XPath result                        |
//! | [`strip_outermost_tags`] | drop the wrapper tag of a serialized element       |
//! | [`strip_tags`]         | keep only an allow-list of tags, keep all text       |
//! | [`escape_field_body`]  | escape a value for a Solr update message             |
//!
//! Tree manipulation lives on [`dom::Document`]
//! (`remove_named_children`, `copy_subtree`).

pub mod dom;
pub mod xpath;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{HtmlError, XPathError};
use dom::{local_name, Document, NodeRef};
use xpath::{Value, XPath};

pub use dom::NodeId;

fn opening_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<[A-Za-z_][^<>]*>").expect("opening tag pattern is valid"))
}

fn closing_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</[A-Za-z_][^<>]*>$").expect("closing tag pattern is valid"))
}

/// Evaluate `xpath` at `context` and return parallel lists of string values
/// and serialized XML, in document order.
///
/// A scalar result (string, number, boolean) yields a single entry whose XML
/// form equals its value.
pub fn query_values(
    xpath: &XPath,
    doc: &Document,
    context: NodeRef,
) -> Result<(Vec<String>, Vec<String>), XPathError> {
    match xpath.evaluate(doc, context)? {
        Value::Nodes(nodes) => Ok(nodes
            .into_iter()
            .map(|n| (doc.string_value(n), doc.outer_xml(n)))
            .unzip()),
        scalar => {
            let value = scalar.to_string_value(doc);
            Ok((vec![value.clone()], vec![value]))
        }
    }
}

/// First node selected by `xpath`, if any.
pub fn first_match(xpath: &XPath, doc: &Document, context: NodeRef) -> Result<Option<NodeRef>, XPathError> {
    Ok(xpath.select(doc, context)?.into_iter().next())
}

/// Remove the opening tag at the start and the closing tag at the end.
///
/// Either tag is removed on its own when the other is missing.
pub fn strip_outermost_tags(xml: &str) -> String {
    let without_open = opening_tag().replace(xml, "");
    closing_tag().replace(&without_open, "").into_owned()
}

/// Keep the tags whose local name is in `allowed`, drop every other tag but
/// keep its text.
///
/// Kept tags are re-emitted with their local name and their attributes in
/// source order. Self-closing tags are always dropped. Text is copied as
/// written, so entity references stay escaped.
pub fn strip_tags(xml: &str, allowed: &[&str]) -> Result<String, HtmlError> {
    let malformed = |message: String| HtmlError::Malformed {
        original: xml.to_string(),
        message,
    };

    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut out = String::with_capacity(xml.len());
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let name = local_name(&name);
                if allowed.contains(&name) {
                    out.push('<');
                    out.push_str(name);
                    for attr in e.attributes() {
                        let attr = attr.map_err(|err| malformed(err.to_string()))?;
                        out.push(' ');
                        out.push_str(&String::from_utf8_lossy(attr.key.as_ref()));
                        out.push_str("=\"");
                        out.push_str(&String::from_utf8_lossy(&attr.value));
                        out.push('"');
                    }
                    out.push('>');
                }
            }
            Ok(Event::End(e)) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("unexpected closing tag".to_string()))?;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let name = local_name(&name);
                if allowed.contains(&name) {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
            Ok(Event::Text(t)) => out.push_str(&String::from_utf8_lossy(&t)),
            Ok(Event::CData(c)) => {
                let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                out.push_str(&quick_xml::escape::partial_escape(text.as_str()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(e.to_string())),
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(malformed("unclosed tag at end of input".to_string()));
    }
    Ok(out)
}

/// Escape a value for the body of an update-message field.
///
/// Legacy shim: quotes are escaped and then restored, matching the documents
/// the predecessor indexer produced.
pub fn escape_field_body(value: &str) -> String {
    quick_xml::escape::escape(value)
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}
