//! Containers of a component and the location paths built from them.
//!
//! A container either starts a path (no `parent`) or continues the path of
//! the container its `parent` names. Two algorithms turn the list into
//! location strings:
//!
//! - [`location_by_occurrence`]: walk in document order, start a new path at
//!   every root container and append everything else to the current path.
//!   This is what the indexer emits.
//! - [`location_by_parent`]: follow the `parent` links from every root.
//!   Rejects two containers that share a parent.
//!
//! Both give the same strings for linear chains written in document order.

use std::collections::HashMap;

use crate::error::ContainerError;
use crate::text::capitalize;
use crate::xml::dom::{Document, NodeRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub id: Option<String>,
    pub parent: Option<String>,
    pub kind: String,
    pub value: String,
    pub xml: String,
}

impl Container {
    /// `"Box: 3"` style location segment.
    pub fn segment(&self) -> String {
        format!("{}: {}", capitalize(&self.kind), self.value)
    }
}

/// Build containers from `<container>` nodes, in the order given.
pub fn collect_containers(doc: &Document, nodes: &[NodeRef]) -> Result<Vec<Container>, ContainerError> {
    let mut containers = Vec::with_capacity(nodes.len());
    for (idx, &node) in nodes.iter().enumerate() {
        let id = node.node_id();
        let kind = doc
            .attribute(id, "type")
            .ok_or(ContainerError::MissingType { position: idx + 1 })?;
        containers.push(Container {
            id: doc.attribute(id, "id").map(str::to_string),
            parent: doc.attribute(id, "parent").map(str::to_string),
            kind: kind.to_string(),
            value: doc.string_value(node),
            xml: doc.outer_xml(node),
        });
    }
    Ok(containers)
}

/// Location strings in occurrence order.
pub fn location_by_occurrence(containers: &[Container]) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for container in containers {
        match (&container.parent, paths.last_mut()) {
            (Some(_), Some(current)) => {
                current.push_str(", ");
                current.push_str(&container.segment());
            }
            _ => paths.push(container.segment()),
        }
    }
    paths
}

/// Location strings following `parent` links, one per root container.
pub fn location_by_parent(containers: &[Container]) -> Result<Vec<String>, ContainerError> {
    let by_id: HashMap<&str, &Container> = containers
        .iter()
        .filter_map(|c| c.id.as_deref().map(|id| (id, c)))
        .collect();

    let mut child_of: HashMap<&str, &Container> = HashMap::new();
    for container in containers {
        let Some(parent) = container.parent.as_deref() else {
            continue;
        };
        if !by_id.contains_key(parent) {
            return Err(ContainerError::UnknownParent {
                id: container.id.clone().unwrap_or_default(),
                parent: parent.to_string(),
            });
        }
        if let Some(first) = child_of.insert(parent, container) {
            return Err(ContainerError::SiblingContainers {
                parent: parent.to_string(),
                first: first.id.clone().unwrap_or_default(),
                second: container.id.clone().unwrap_or_default(),
            });
        }
    }

    let mut paths = Vec::new();
    for root in containers.iter().filter(|c| c.parent.is_none()) {
        let mut path = root.segment();
        let mut current = root;
        // A chain can be no longer than the container list.
        for _ in 0..containers.len() {
            let Some(next) = current.id.as_deref().and_then(|id| child_of.get(id).copied()) else {
                break;
            };
            path.push_str(", ");
            path.push_str(&next.segment());
            current = next;
        }
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::xpath::XPath;

    fn containers_of(doc: &Document) -> Result<Vec<Container>, ContainerError> {
        let c = NodeRef::Node(doc.document_element().unwrap());
        let nodes = XPath::compile(".//container").unwrap().select(doc, c).unwrap();
        collect_containers(doc, &nodes)
    }

    fn container(id: &str, parent: Option<&str>, kind: &str, value: &str) -> Container {
        Container {
            id: Some(id.to_string()),
            parent: parent.map(str::to_string),
            kind: kind.to_string(),
            value: value.to_string(),
            xml: String::new(),
        }
    }

    #[test]
    fn test_collect_containers() {
        let doc = Document::parse(
            r#"<c id="c1"><did>
                 <container id="a" type="Box">1</container>
                 <container id="b" parent="a" type="folder">2</container>
               </did></c>"#,
        )
        .unwrap();
        let containers = containers_of(&doc).unwrap();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[1].parent.as_deref(), Some("a"));
        assert_eq!(containers[1].segment(), "Folder: 2");
        assert_eq!(
            containers[0].xml,
            r#"<container id="a" type="Box">1</container>"#
        );
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let doc = Document::parse(r#"<c><container type="Box">1</container><container>2</container></c>"#)
            .unwrap();
        assert_eq!(
            containers_of(&doc),
            Err(ContainerError::MissingType { position: 2 })
        );
    }

    #[test]
    fn test_occurrence_order_paths() {
        let containers = vec![
            container("a", None, "box", "1"),
            container("b", Some("a"), "folder", "2"),
            container("c", None, "box", "3"),
            container("d", Some("c"), "folder", "4"),
            container("e", Some("d"), "item", "5"),
        ];
        assert_eq!(
            location_by_occurrence(&containers),
            vec!["Box: 1, Folder: 2", "Box: 3, Folder: 4, Item: 5"]
        );
    }

    #[test]
    fn test_parent_linked_agrees_on_linear_chains() {
        let containers = vec![
            container("a", None, "box", "1"),
            container("b", Some("a"), "folder", "2"),
            container("c", None, "box", "3"),
            container("d", Some("c"), "folder", "4"),
            container("e", Some("d"), "item", "5"),
        ];
        assert_eq!(
            location_by_parent(&containers).unwrap(),
            location_by_occurrence(&containers)
        );
    }

    #[test]
    fn test_parent_linked_follows_links_not_order() {
        let containers = vec![
            container("a", None, "box", "1"),
            container("c", None, "box", "2"),
            container("b", Some("a"), "folder", "3"),
        ];
        assert_eq!(
            location_by_parent(&containers).unwrap(),
            vec!["Box: 1, Folder: 3", "Box: 2"]
        );
        assert_eq!(
            location_by_occurrence(&containers),
            vec!["Box: 1", "Box: 2, Folder: 3"]
        );
    }

    #[test]
    fn test_parent_linked_rejects_siblings() {
        let containers = vec![
            container("a", None, "box", "1"),
            container("b", Some("a"), "folder", "2"),
            container("c", Some("a"), "folder", "3"),
        ];
        assert_eq!(
            location_by_parent(&containers),
            Err(ContainerError::SiblingContainers {
                parent: "a".into(),
                first: "b".into(),
                second: "c".into(),
            })
        );
    }

    #[test]
    fn test_parent_linked_rejects_unknown_parent() {
        let containers = vec![container("b", Some("zz"), "folder", "2")];
        assert!(matches!(
            location_by_parent(&containers),
            Err(ContainerError::UnknownParent { .. })
        ));
    }
}
