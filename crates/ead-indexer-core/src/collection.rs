//! Collection-document extraction.
//!
//! Runs every simple [`CollectionField`] query against the finding aid, then
//! derives the facet, date, language, and title fields from those values.
//! Language lookups are the only derivation that can fail; their errors are
//! collected on the document and do not stop extraction.

use tracing::debug;

use crate::error::{ExtractError, LanguageError};
use crate::fields::{CollectionField, FieldMap, FieldName, FieldValues};
use crate::html::title_html;
use crate::language;
use crate::text::{compact_facets, date_ranges, unit_date_bounds, unit_date_display};
use crate::xml::dom::{Document, NodeRef};
use crate::xml::xpath::XPath;
use crate::xml::{query_values, strip_outermost_tags};

/// Display value of the format field for collections.
pub const COLLECTION_FORMAT: &str = "Archival Collection";
/// Sort key of the format field for collections.
pub const COLLECTION_FORMAT_SORT: &str = "0";
/// Value of the online-access facet when the finding aid has digital objects.
pub const ONLINE_ACCESS: &str = "Online Access";

#[derive(Debug, Clone)]
pub struct CollectionDocument {
    pub ead_id: String,
    pub repository_code: String,
    pub fields: FieldMap<CollectionField>,
    /// Per-item derivation errors. The document is still usable.
    pub errors: Vec<LanguageError>,
}

/// The trimmed `<eadid>` of a finding aid. Exactly one must exist.
pub fn ead_id(doc: &Document) -> Result<String, ExtractError> {
    let query = XPath::compile("//eadid")?;
    let nodes = query.select(doc, NodeRef::Node(doc.root()))?;
    match nodes.as_slice() {
        [] => Err(ExtractError::MissingEadId),
        [node] => {
            let id = doc.string_value(*node).trim().to_string();
            if id.is_empty() {
                Err(ExtractError::EmptyEadId)
            } else {
                Ok(id)
            }
        }
        many => Err(ExtractError::MultipleEadIds(many.len())),
    }
}

/// Extract the collection document of a finding aid.
pub fn extract_collection(repository_code: &str, doc: &Document) -> Result<CollectionDocument, ExtractError> {
    let ead_id = ead_id(doc)?;
    let root = NodeRef::Node(doc.root());

    let mut fields = FieldMap::new();
    for &field in CollectionField::ALL {
        let Some(xpath) = field.xpath() else {
            continue;
        };
        let (values, xml) = query_values(&XPath::compile(xpath)?, doc, root)?;
        fields.insert(field, FieldValues::queried(xpath, values, xml));
    }

    let errors = derive_fields(&mut fields);

    fields.set(CollectionField::Ead, vec![ead_id.clone()]);
    fields.set(CollectionField::RepositoryCode, vec![repository_code.to_string()]);
    fields.set(CollectionField::Format, vec![COLLECTION_FORMAT.to_string()]);
    fields.set(CollectionField::FormatSort, vec![COLLECTION_FORMAT_SORT.to_string()]);

    debug!(ead_id = %ead_id, errors = errors.len(), "extracted collection");
    Ok(CollectionDocument {
        ead_id,
        repository_code: repository_code.to_string(),
        fields,
        errors,
    })
}

fn derive_fields(fields: &mut FieldMap<CollectionField>) -> Vec<LanguageError> {
    use CollectionField as F;

    let creator = fields.concat(&[F::CreatorCorpName, F::CreatorFamName, F::CreatorPersName]);
    fields.set(F::Creator, creator);

    let ranges = date_ranges(fields.values(F::UnitDateNormal));
    fields.set(F::DateRange, ranges);

    let (languages, errors) = language::lookup_all(fields.values(F::LangCode));
    fields.set(F::Language, languages);

    let material = compact_facets(fields.values(F::GenreForm));
    fields.set(F::MaterialType, material);

    let names = compact_facets(&fields.concat(&[F::CorpNameNotInRepository, F::FamName, F::PersName]));
    fields.set(F::Name, names);

    let online = if fields.values(F::Dao).is_empty() {
        Vec::new()
    } else {
        vec![ONLINE_ACCESS.to_string()]
    };
    fields.set(F::OnlineAccess, online);

    let places = compact_facets(fields.values(F::GeogName));
    fields.set(F::Place, places);

    let subjects = compact_facets(fields.values(F::Subject));
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
        .xml(F::UnitTitle)
        .unwrap_or_default()
        .iter()
        .map(|xml| title_html(&strip_outermost_tags(xml)))
        .collect();
    fields.set(F::UnitTitleHtml, titles);

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    const EAD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ead xmlns="urn:isbn:1-931666-22-9">
  <eadheader>
    <eadid> mos_2021 </eadid>
    <filedesc><titlestmt><author>Finding aid by Staff</author></titlestmt></filedesc>
  </eadheader>
  <archdesc level="collection">
    <did>
      <repository><corpname>Tamiment Library</corpname></repository>
      <unittitle>Guide to the <emph render="italic">Mostly</emph> Papers</unittitle>
      <unitid>MOS.2021</unitid>
      <origination label="Creator"><persname>Doe, Jane</persname></origination>
      <origination label="CREATOR"><corpname>Acme |z Union</corpname></origination>
      <origination label="source"><famname>Roe family</famname></origination>
      <langmaterial><language langcode="eng"/><language langcode="xxx"/><language langcode="fre"/></langmaterial>
      <unitdate type="inclusive" normal="1900/1950">1900-1950</unitdate>
      <unitdate type="bulk" normal="1920/1930">1920-1930</unitdate>
      <abstract>Papers.</abstract>
    </did>
    <controlaccess>
      <subject>Labor unions |z New York</subject>
      <subject>Labor unions -- New York</subject>
      <geogname>Ohio</geogname>
      <genreform>Photographs</genreform>
      <occupation>Organizer</occupation>
    </controlaccess>
    <dsc>
      <c id="c1"><did><unittitle>Series 1</unittitle><dao href="x"/></did>
        <controlaccess><subject>Deep subject</subject></controlaccess>
      </c>
    </dsc>
  </archdesc>
</ead>"#;

    fn extract(xml: &str) -> CollectionDocument {
        let doc = Document::parse(xml).unwrap();
        extract_collection("tamwag", &doc).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identity_and_hardcoded_fields() {
        let c = extract(EAD);
        assert_eq!(c.ead_id, "mos_2021");
        assert_eq!(c.fields.values(CollectionField::Ead), strings(&["mos_2021"]));
        assert_eq!(c.fields.values(CollectionField::RepositoryCode), strings(&["tamwag"]));
        assert_eq!(c.fields.values(CollectionField::Format), strings(&["Archival Collection"]));
        assert_eq!(c.fields.values(CollectionField::FormatSort), strings(&["0"]));
    }

    #[test]
    fn test_simple_fields_follow_queries() {
        let c = extract(EAD);
        let unittitle = c.fields.get(CollectionField::UnitTitle).unwrap();
        assert_eq!(unittitle.values, strings(&["Guide to the Mostly Papers"]));
        assert_eq!(unittitle.source, CollectionField::UnitTitle.xpath());
        assert_eq!(c.fields.get(CollectionField::Collection).unwrap().values, unittitle.values);
        assert_eq!(c.fields.get(CollectionField::Heading).unwrap().xml, unittitle.xml);
        assert_eq!(
            c.fields.values(CollectionField::SubjectNotInDsc),
            strings(&["Labor unions |z New York", "Labor unions -- New York"])
        );
        assert_eq!(c.fields.values(CollectionField::Author), strings(&["Finding aid by Staff"]));
    }

    #[test]
    fn test_creator_rollup_is_case_insensitive() {
        let c = extract(EAD);
        assert_eq!(
            c.fields.values(CollectionField::Creator),
            strings(&["Acme |z Union", "Doe, Jane"])
        );
    }

    #[test]
    fn test_facets() {
        let c = extract(EAD);
        assert_eq!(
            c.fields.values(CollectionField::SubjectFacet),
            strings(&["Labor unions -- New York", "Organizer", "Deep subject"])
        );
        assert_eq!(c.fields.values(CollectionField::Place), strings(&["Ohio"]));
        assert_eq!(c.fields.values(CollectionField::MaterialType), strings(&["Photographs"]));
        // The repository's own corpname is excluded from the name facet.
        assert_eq!(
            c.fields.values(CollectionField::Name),
            strings(&["Acme -- Union", "Roe family", "Doe, Jane"])
        );
        assert_eq!(c.fields.values(CollectionField::OnlineAccess), strings(&[ONLINE_ACCESS]));
    }

    #[test]
    fn test_online_access_empty_without_dao() {
        let c = extract(&EAD.replace(r#"<dao href="x"/>"#, ""));
        assert!(c.fields.values(CollectionField::OnlineAccess).is_empty());
    }

    #[test]
    fn test_dates() {
        let c = extract(EAD);
        assert_eq!(
            c.fields.values(CollectionField::DateRange),
            strings(&["1801-1900", "1901-2000"])
        );
        assert_eq!(c.fields.values(CollectionField::UnitDateStart), strings(&["1900", "1920"]));
        assert_eq!(c.fields.values(CollectionField::UnitDateEnd), strings(&["1950", "1930"]));
        assert_eq!(
            c.fields.values(CollectionField::UnitDateDisplay),
            strings(&["Inclusive, 1900-1950 ; 1920-1930"])
        );
    }

    #[test]
    fn test_language_errors_are_collected() {
        let c = extract(EAD);
        assert_eq!(c.fields.values(CollectionField::Language), strings(&["English", "French"]));
        assert_eq!(c.errors, vec![LanguageError::NotFound("xxx".to_string())]);
    }

    #[test]
    fn test_unittitle_html() {
        let c = extract(EAD);
        assert_eq!(
            c.fields.values(CollectionField::UnitTitleHtml),
            strings(&["Guide to the <em>Mostly</em> Papers"])
        );
    }

    #[test]
    fn test_eadid_must_be_unique_and_present() {
        let doc = Document::parse("<ead><archdesc level=\"collection\"/></ead>").unwrap();
        assert!(matches!(
            extract_collection("x", &doc),
            Err(ExtractError::MissingEadId)
        ));
        let doc = Document::parse("<ead><eadid>a</eadid><eadid>b</eadid></ead>").unwrap();
        assert!(matches!(
            extract_collection("x", &doc),
            Err(ExtractError::MultipleEadIds(2))
        ));
        let doc = Document::parse("<ead><eadid>  </eadid></ead>").unwrap();
        assert!(matches!(ead_id(&doc), Err(ExtractError::EmptyEadId)));
    }
}
