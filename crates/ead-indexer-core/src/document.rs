//! Solr XML update messages.
//!
//! | Request  | Body                                                        |
//! |----------|-------------------------------------------------------------|
//! | add      | `<add><doc><field name="id">…</field>…</doc></add>`          |
//! | delete   | `<delete><query>id:EADID*</query></delete>`                  |
//! | commit   | `<commit/>`                                                  |
//! | rollback | `<rollback/>`                                                |
//!
//! Field values go through [`escape_field_body`]. Fields are written in
//! declaration order of their enumeration; empty values are skipped.

use crate::collection::CollectionDocument;
use crate::component::Component;
use crate::fields::{FieldMap, FieldName};
use crate::xml::escape_field_body;

pub const COMMIT_MESSAGE: &str = "<commit/>";
pub const ROLLBACK_MESSAGE: &str = "<rollback/>";

/// One prepared add request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPayload {
    pub id: String,
    pub body: String,
}

fn write_field(out: &mut String, name: &str, value: &str) {
    out.push_str("<field name=\"");
    out.push_str(name);
    out.push_str("\">");
    out.push_str(&escape_field_body(value));
    out.push_str("</field>");
}

/// Build the add message of one document.
pub fn add_message<F: FieldName>(id: &str, fields: &FieldMap<F>) -> String {
    let mut out = String::from("<add><doc>");
    write_field(&mut out, "id", id);
    for (field, values) in fields.iter() {
        let Some(name) = field.solr_name() else {
            continue;
        };
        for value in values.values.iter().filter(|v| !v.is_empty()) {
            write_field(&mut out, name, value);
        }
    }
    out.push_str("</doc></add>");
    out
}

pub fn collection_payload(collection: &CollectionDocument) -> AddPayload {
    AddPayload {
        id: collection.ead_id.clone(),
        body: add_message(&collection.ead_id, &collection.fields),
    }
}

pub fn component_payload(component: &Component) -> AddPayload {
    AddPayload {
        id: component.id.clone(),
        body: add_message(&component.id, &component.fields),
    }
}

/// Payloads of a finding aid: the collection first, then its components.
pub fn payloads(collection: &CollectionDocument, components: &[Component]) -> Vec<AddPayload> {
    std::iter::once(collection_payload(collection))
        .chain(components.iter().map(component_payload))
        .collect()
}

/// Backslash-escape Solr query syntax characters and whitespace.
pub fn escape_query_term(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if c.is_whitespace() || "+-&|!(){}[]^\"~*?:\\/".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Delete every document whose id is `ead_id` or starts with it.
pub fn delete_message(ead_id: &str) -> String {
    let query = format!("id:{}*", escape_query_term(ead_id));
    format!(
        "<delete><query>{}</query></delete>",
        quick_xml::escape::escape(query.as_str())
    )
}
