//! Component extraction and the hierarchy walk.
//!
//! Components are the `<c>` elements under `<dsc>`, visited top-down in
//! document order. The walk threads the list of ancestor components so each
//! component sees its parent ids and ancestor titles without re-walking the
//! tree.
//!
//! Relative field queries run against a copy of the component with its
//! nested `<c>` children removed, so a component never picks up the
//! description of its children.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::container::{collect_containers, location_by_occurrence, location_by_parent, Container};
use crate::error::{ExtractError, XmlError};
use crate::fields::{ComponentField, FieldMap, FieldName, FieldValues};
use crate::html::title_html;
use crate::text::{compact_facets, date_ranges, sanitize, unit_date_bounds, unit_date_display};
use crate::xml::dom::{local_name, Document, NodeId, NodeRef};
use crate::xml::xpath::XPath;
use crate::xml::{first_match, query_values, strip_outermost_tags};

pub const SERIES_FORMAT: &str = "Archival Series";
pub const OBJECT_FORMAT: &str = "Archival Object";
/// Ancestor title used when a component has neither a unittitle nor a unitdate.
pub const NO_TITLE: &str = "[No title available]";
/// Separator of ancestor titles in the series sort key.
pub const SERIES_SEPARATOR: &str = " >> ";

fn series_level() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Legacy: kept byte-for-byte, slashes included. It cannot match a plain
    // level value, so every component is classified as an archival object.
    RE.get_or_init(|| Regex::new(r"/\Aseries|subseries/").expect("series level pattern is valid"))
}

/// Format classification of a component `@level`.
pub fn format_for_level(level: &str) -> &'static str {
    if series_level().is_match(level) {
        SERIES_FORMAT
    } else {
        OBJECT_FORMAT
    }
}

/// Position of a component in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    /// `@id` of the parent component; empty under `<dsc>`.
    pub parent_for_sort: String,
    /// `@id` of every ancestor component, outermost first.
    pub parent_for_display: Vec<String>,
    /// 1 for components directly under `<dsc>`.
    pub depth: usize,
    pub has_children: bool,
    /// One entry per ancestor component, outermost first.
    pub ancestor_unit_titles: Vec<String>,
    pub series_for_sort: String,
}

#[derive(Debug, Clone)]
pub struct Component {
    /// EADID followed by the component `@id`.
    pub id: String,
    /// The component `@id`.
    pub ref_id: String,
    pub fields: FieldMap<ComponentField>,
    pub containers: Vec<Container>,
    pub location: Vec<String>,
    pub format: &'static str,
    pub hierarchy: Hierarchy,
}

struct Ancestor {
    ref_id: String,
    title: String,
}

struct Queries {
    /// Relative queries, run per component.
    scoped: Vec<(ComponentField, &'static str, XPath)>,
    /// Absolute queries, run once per finding aid.
    absolute: Vec<(ComponentField, FieldValues)>,
    containers: XPath,
    unittitle: XPath,
    unitdate: XPath,
}

impl Queries {
    fn compile(doc: &Document) -> Result<Self, ExtractError> {
        let mut scoped = Vec::new();
        let mut absolute = Vec::new();
        for &field in ComponentField::ALL {
            let Some(source) = field.xpath() else {
                continue;
            };
            let xpath = XPath::compile(source)?;
            if source.starts_with('/') {
                let (values, xml) = query_values(&xpath, doc, NodeRef::Node(doc.root()))?;
                absolute.push((field, FieldValues::queried(source, values, xml)));
            } else {
                scoped.push((field, source, xpath));
            }
        }
        Ok(Self {
            scoped,
            absolute,
            containers: XPath::compile(".//container")?,
            unittitle: XPath::compile("./did/unittitle")?,
            unitdate: XPath::compile("./did/unitdate")?,
        })
    }
}

struct Walker<'a> {
    doc: &'a Document,
    queries: Queries,
    repository_code: &'a str,
    ead_id: &'a str,
    components: Vec<Component>,
}

fn child_components(doc: &Document, id: NodeId) -> Vec<NodeId> {
    doc.child_elements(id)
        .filter(|&c| doc.name(c).map(local_name) == Some("c"))
        .collect()
}

/// Extract every component of a finding aid, in document order.
pub fn extract_components(
    repository_code: &str,
    ead_id: &str,
    doc: &Document,
) -> Result<Vec<Component>, ExtractError> {
    let mut walker = Walker {
        doc,
        queries: Queries::compile(doc)?,
        repository_code,
        ead_id,
        components: Vec::new(),
    };

    let dscs = XPath::compile("//dsc")?.select(doc, NodeRef::Node(doc.root()))?;
    let mut ancestors = Vec::new();
    for dsc in dscs {
        for c in child_components(doc, dsc.node_id()) {
            walker.visit(c, &mut ancestors)?;
        }
    }

    debug!(ead_id, count = walker.components.len(), "extracted components");
    Ok(walker.components)
}

impl Walker<'_> {
    fn visit(&mut self, node: NodeId, ancestors: &mut Vec<Ancestor>) -> Result<(), ExtractError> {
        let doc = self.doc;
        let position = self.components.len() + 1;
        let ref_id = doc
            .attribute(node, "id")
            .filter(|id| !id.is_empty())
            .ok_or(ExtractError::MissingComponentId { position })?
            .to_string();
        let id = format!("{}{}", self.ead_id, ref_id);

        let mut scoped = doc.copy_subtree(node);
        let scoped_root = scoped.document_element().ok_or(XmlError::NodeAbsent)?;
        scoped.remove_named_children(Some(scoped_root), "c")?;
        let context = NodeRef::Node(scoped_root);

        let mut fields = FieldMap::new();
        for (field, values) in &self.queries.absolute {
            fields.insert(*field, values.clone());
        }
        for (field, source, xpath) in &self.queries.scoped {
            let (values, xml) = query_values(xpath, &scoped, context)?;
            fields.insert(*field, FieldValues::queried(*source, values, xml));
        }

        let nodes = self.queries.containers.select(&scoped, context)?;
        let containers = collect_containers(&scoped, &nodes).map_err(|source| ExtractError::Container {
            id: id.clone(),
            source,
        })?;
        let location = location_by_occurrence(&containers);
        if let Err(e) = location_by_parent(&containers) {
            debug!(component = %id, error = %e, "container links are not a set of chains");
        }

        let format = format_for_level(
            fields
                .values(ComponentField::Level)
                .first()
                .map(String::as_str)
                .unwrap_or_default(),
        );

        let children = child_components(doc, node);
        let titles: Vec<String> = ancestors.iter().map(|a| a.title.clone()).collect();
        let hierarchy = Hierarchy {
            parent_for_sort: ancestors.last().map(|a| a.ref_id.clone()).unwrap_or_default(),
            parent_for_display: ancestors.iter().map(|a| a.ref_id.clone()).collect(),
            depth: ancestors.len() + 1,
            has_children: !children.is_empty(),
            series_for_sort: titles
                .iter()
                .map(|t| title_html(t))
                .collect::<Vec<_>>()
                .join(SERIES_SEPARATOR),
            ancestor_unit_titles: titles,
        };

        self.set_hierarchy_fields(&mut fields, &hierarchy, &containers, &location, format);
        derive_fields(&mut fields);

        let title = self.title_entry(node)?;
        self.components.push(Component {
            id,
            ref_id: ref_id.clone(),
            fields,
            containers,
            location,
            format,
            hierarchy,
        });

        ancestors.push(Ancestor { ref_id, title });
        for child in children {
            self.visit(child, ancestors)?;
        }
        ancestors.pop();
        Ok(())
    }

    fn set_hierarchy_fields(
        &self,
        fields: &mut FieldMap<ComponentField>,
        hierarchy: &Hierarchy,
        containers: &[Container],
        location: &[String],
        format: &'static str,
    ) {
        use ComponentField as F;

        let non_empty = |s: &str| -> Vec<String> {
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s.to_string()]
            }
        };

        fields.set(F::Ead, vec![self.ead_id.to_string()]);
        fields.set(F::RepositoryCode, vec![self.repository_code.to_string()]);
        fields.set(F::ParentForSort, non_empty(&hierarchy.parent_for_sort));
        fields.set(F::ParentForDisplay, hierarchy.parent_for_display.clone());
        fields.set(F::ComponentLevel, vec![hierarchy.depth.to_string()]);
        fields.set(F::HasChildren, vec![hierarchy.has_children.to_string()]);
        fields.set(F::ParentUnitTitles, hierarchy.ancestor_unit_titles.clone());
        fields.set(F::SeriesForSort, non_empty(&hierarchy.series_for_sort));
        fields.set(F::Containers, containers.iter().map(Container::segment).collect());
        fields.set(F::Location, location.to_vec());
        fields.set(F::Format, vec![format.to_string()]);
    }

    /// The title this component contributes to its descendants.
    fn title_entry(&self, node: NodeId) -> Result<String, ExtractError> {
        let context = NodeRef::Node(node);
        for query in [&self.queries.unittitle, &self.queries.unitdate] {
            if let Some(found) = first_match(query, self.doc, context)? {
                if !self.doc.string_value(found).trim().is_empty() {
                    // Legacy: surrounding whitespace is kept, which pads the
                    // entry the way the predecessor indexer did.
                    return Ok(sanitize(&self.doc.inner_xml(found.node_id())));
                }
            }
        }
        Ok(NO_TITLE.to_string())
    }
}

fn derive_fields(fields: &mut FieldMap<ComponentField>) {
    use ComponentField as F;

    let creator = fields.concat(&[F::CreatorCorpName, F::CreatorFamName, F::CreatorPersName]);
    fields.set(F::Creator, creator);

    let ranges = date_ranges(fields.values(F::UnitDateNormal));
    fields.set(F::DateRange, ranges);

    let material = compact_facets(fields.values(F::GenreForm));
    fields.set(F::MaterialType, material);

    let names = compact_facets(&fields.concat(&[F::CorpName, F::FamName, F::PersName]));
    fields.set(F::Name, names);

    let online = if fields.values(F::Dao).is_empty() {
        Vec::new()
    } else {
        vec![crate::collection::ONLINE_ACCESS.to_string()]
    };
    fields.set(F::OnlineAccess, online);

    let places = compact_facets(fields.values(F::GeogName));
    fields.set(F::Place, places);

    let subjects = compact_facets(fields.values(F::SubjectUnion));
    fields.set(F::SubjectFacet, subjects);

    let (start, end) = unit_date_bounds(fields.values(F::UnitDateNormal));
    fields.set(F::UnitDateStart, start);
    fields.set(F::UnitDateEnd, end);

    let display = unit_date_display(
        fields.values(F::UnitDateNoType),
        fields.values(F::UnitDateInclusive),
        fields.values(F::UnitDateBulk),
    );
    fields.set(F::UnitDateDisplay, display.into_iter().collect());

    let titles = fields
        .xml(F::DidUnitTitle)
        .unwrap_or_default()
        .iter()
        .map(|xml| title_html(&strip_outermost_tags(xml)))
        .collect();
    fields.set(F::UnitTitleHtml, titles);
}
