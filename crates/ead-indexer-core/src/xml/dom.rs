//! Owned XML tree built from `quick-xml` events.
//!
//! Nodes live in an arena indexed by [`NodeId`]. Ids are assigned in
//! document order at parse time, so sorting by id sorts by document order.
//! Element and attribute names are matched by local name; the qualified name
//! is kept for serialization.

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::cmp::Ordering;

use crate::error::XmlError;

/// Index of a node in a [`Document`] arena.
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// A selectable node: a tree node, or one attribute of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Node(NodeId),
    Attribute(NodeId, usize),
}

impl NodeRef {
    fn order_key(self) -> (NodeId, usize) {
        match self {
            NodeRef::Node(id) => (id, 0),
            NodeRef::Attribute(id, idx) => (id, idx + 1),
        }
    }

    /// The tree node this reference belongs to (the owner element for attributes).
    pub fn node_id(self) -> NodeId {
        match self {
            NodeRef::Node(id) | NodeRef::Attribute(id, _) => id,
        }
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Namespace declarations are kept for serialization but are not
    /// selectable attributes.
    pub fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Element {
        name: String,
        attributes: Vec<Attribute>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed XML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

/// The part of a qualified name after the prefix.
pub fn local_name(qualified: &str) -> &str {
    match qualified.rfind(':') {
        Some(pos) => &qualified[pos + 1..],
        None => qualified,
    }
}

fn malformed(reader: &Reader<&[u8]>, message: impl ToString) -> XmlError {
    XmlError::Malformed {
        position: reader.buffer_position() as u64,
        message: message.to_string(),
    }
}

impl Document {
    fn empty() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse a complete XML document.
    ///
    /// The XML declaration, DOCTYPE, and processing instructions are
    /// dropped. Adjacent text and CDATA sections merge into one text node.
    /// Text outside the document element is ignored.
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_reader(xml.as_bytes());
        reader.config_mut().trim_text(false);

        let mut doc = Document::empty();
        let mut stack: Vec<NodeId> = vec![ROOT];
        let mut buf = Vec::new();

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| malformed(&reader, e))?;
            let parent = *stack.last().unwrap_or(&ROOT);
            match event {
                Event::Start(e) => {
                    let (name, attributes) = element_parts(&e).map_err(|m| malformed(&reader, m))?;
                    let id = doc.push(parent, NodeKind::Element { name, attributes });
                    stack.push(id);
                }
                Event::Empty(e) => {
                    let (name, attributes) = element_parts(&e).map_err(|m| malformed(&reader, m))?;
                    doc.push(parent, NodeKind::Element { name, attributes });
                }
                Event::End(_) => {
                    if stack.len() <= 1 {
                        return Err(malformed(&reader, "unexpected closing tag"));
                    }
                    stack.pop();
                }
                Event::Text(t) => {
                    if parent != ROOT {
                        let raw = String::from_utf8_lossy(&t);
                        doc.push_text(parent, unescape_lenient(&raw));
                    }
                }
                Event::CData(c) => {
                    if parent != ROOT {
                        let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                        doc.push_text(parent, text);
                    }
                }
                Event::Comment(c) => {
                    let text = String::from_utf8_lossy(&c).into_owned();
                    doc.push(parent, NodeKind::Comment(text));
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if stack.len() > 1 {
            let open = stack.last().copied().unwrap_or(ROOT);
            return Err(XmlError::Unclosed(doc.name(open).unwrap_or_default().to_string()));
        }
        if doc.document_element().is_none() {
            return Err(XmlError::NoRoot);
        }
        Ok(doc)
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn push_text(&mut self, parent: NodeId, text: String) {
        if let Some(&last) = self.nodes[parent].children.last() {
            if let NodeKind::Text(existing) = &mut self.nodes[last].kind {
                existing.push_str(&text);
                return;
            }
        }
        self.push(parent, NodeKind::Text(text));
    }

    /// The document node (parent of the document element).
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// The single top-level element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.nodes[ROOT]
            .children
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].kind, NodeKind::Element { .. })
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Element children only.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
    }

    /// All descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next].children.iter().rev().copied());
        }
        out
    }

    /// Qualified name of an element.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Local name of an element or attribute.
    pub fn local_name(&self, node: NodeRef) -> Option<&str> {
        match node {
            NodeRef::Node(id) => self.name(id).map(local_name),
            NodeRef::Attribute(id, idx) => self.attributes(id).get(idx).map(Attribute::local_name),
        }
    }

    /// Qualified name of an element or attribute.
    pub fn qualified_name(&self, node: NodeRef) -> Option<&str> {
        match node {
            NodeRef::Node(id) => self.name(id),
            NodeRef::Attribute(id, idx) => self.attributes(id).get(idx).map(|a| a.name.as_str()),
        }
    }

    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        match &self.nodes[id].kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Value of the first attribute whose local name matches.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| !a.is_namespace_declaration() && a.local_name() == name)
            .map(|a| a.value.as_str())
    }

    /// XPath string-value of a node.
    pub fn string_value(&self, node: NodeRef) -> String {
        match node {
            NodeRef::Attribute(id, idx) => self
                .attributes(id)
                .get(idx)
                .map(|a| a.value.clone())
                .unwrap_or_default(),
            NodeRef::Node(id) => match &self.nodes[id].kind {
                NodeKind::Text(t) | NodeKind::Comment(t) => t.clone(),
                NodeKind::Root | NodeKind::Element { .. } => {
                    let mut out = String::new();
                    for d in self.descendants(id) {
                        if let NodeKind::Text(t) = &self.nodes[d].kind {
                            out.push_str(t);
                        }
                    }
                    out
                }
            },
        }
    }

    /// Serialize a node back to XML.
    pub fn outer_xml(&self, node: NodeRef) -> String {
        let mut out = String::new();
        match node {
            NodeRef::Attribute(id, idx) => {
                if let Some(attr) = self.attributes(id).get(idx) {
                    write_attribute(&mut out, attr);
                    // Attributes serialize without the leading separator.
                    out.remove(0);
                }
            }
            NodeRef::Node(id) => self.write_node(id, &mut out),
        }
        out
    }

    /// Serialize the children of a node.
    pub fn inner_xml(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in &self.nodes[id].children {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].kind {
            NodeKind::Root => {
                for &child in &self.nodes[id].children {
                    self.write_node(child, out);
                }
            }
            NodeKind::Text(t) => out.push_str(&partial_escape(t.as_str())),
            NodeKind::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
            NodeKind::Element { name, attributes } => {
                out.push('<');
                out.push_str(name);
                for attr in attributes {
                    write_attribute(out, attr);
                }
                let children = &self.nodes[id].children;
                if children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for &child in children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }

    /// Remove direct children of `node` whose local name is `name`.
    ///
    /// Not recursive. Returns the number of removed elements.
    pub fn remove_named_children(&mut self, node: Option<NodeId>, name: &str) -> Result<usize, XmlError> {
        let id = node.ok_or(XmlError::NodeAbsent)?;
        if id >= self.nodes.len() {
            return Err(XmlError::NodeAbsent);
        }
        let children = std::mem::take(&mut self.nodes[id].children);
        let (removed, kept): (Vec<NodeId>, Vec<NodeId>) = children.into_iter().partition(|&c| {
            self.name(c).map(local_name) == Some(name)
        });
        for &r in &removed {
            self.nodes[r].parent = None;
        }
        self.nodes[id].children = kept;
        Ok(removed.len())
    }

    /// Deep-copy an element and its subtree into a new document.
    pub fn copy_subtree(&self, id: NodeId) -> Document {
        let mut copy = Document::empty();
        self.copy_into(&mut copy, id, ROOT);
        copy
    }

    fn copy_into(&self, target: &mut Document, id: NodeId, parent: NodeId) {
        let new_id = target.push(parent, self.nodes[id].kind.clone());
        for &child in &self.nodes[id].children {
            self.copy_into(target, child, new_id);
        }
    }
}

fn element_parts(e: &BytesStart<'_>) -> Result<(String, Vec<Attribute>), String> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = unescape_lenient(&String::from_utf8_lossy(&attr.value));
        attributes.push(Attribute { name: key, value });
    }
    Ok((name, attributes))
}

/// Resolve predefined entities and character references one at a time.
///
/// Entities declared in an external DTD (`&nbsp;` and friends) stay as
/// written; every other reference in the same text is still resolved.
fn unescape_lenient(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let name = &tail[1..end];
        if name.contains(|c: char| c == '&' || c.is_whitespace()) {
            out.push('&');
            rest = &tail[1..];
            continue;
        }
        match resolve_reference(name) {
            Some(c) => out.push_str(&c),
            None => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }
    out.push_str(rest);
    out
}

fn resolve_reference(name: &str) -> Option<String> {
    let predefined = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse().ok()?
            } else {
                return None;
            };
            return char::from_u32(code).map(String::from);
        }
    };
    Some(predefined.to_string())
}

fn write_attribute(out: &mut String, attr: &Attribute) {
    out.push(' ');
    out.push_str(&attr.name);
    out.push_str("=\"");
    out.push_str(&escape(attr.value.as_str()));
    out.push('"');
}
