//! Closed field enumerations and the field map.
//!
//! Every field a document can carry is a variant of [`CollectionField`] or
//! [`ComponentField`]. A variant knows its XPath (simple fields only) and its
//! Solr field name (`None` for fields that only feed derivations). The
//! declaration order of the variants is the serialization order.

use std::collections::BTreeMap;

/// Case-insensitive `@label='creator'` test, XPath 1.0 style.
macro_rules! creator_origination {
    ($prefix:literal, $name:literal) => {
        concat!(
            $prefix,
            "origination[translate(@label,'ABCDEFGHIJKLMNOPQRSTUVWXYZ','abcdefghijklmnopqrstuvwxyz')='creator']/",
            $name
        )
    };
}

/// Prefix a path with the collection-level `<archdesc>`.
macro_rules! archdesc {
    ($rest:literal) => {
        concat!("//archdesc[@level='collection']", $rest)
    };
}

macro_rules! field_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($xpath:expr, $solr:expr) ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];
        }

        impl FieldName for $name {
            fn xpath(self) -> Option<&'static str> {
                match self {
                    $( $name::$variant => $xpath ),*
                }
            }

            fn solr_name(self) -> Option<&'static str> {
                match self {
                    $( $name::$variant => $solr ),*
                }
            }
        }
    };
}

/// A closed set of document fields.
pub trait FieldName: Copy + Ord + std::fmt::Debug {
    /// XPath of a simple field; `None` for hardcoded and derived fields.
    fn xpath(self) -> Option<&'static str>;
    /// Solr field name; `None` for fields that are never serialized.
    fn solr_name(self) -> Option<&'static str>;
}

field_enum! {
    /// Fields of a collection document.
    pub enum CollectionField {
        Abstract => (Some(archdesc!("/did/abstract")), Some("abstract_ssm")),
        AccessRestrict => (Some(archdesc!("/accessrestrict/p")), Some("accessrestrict_ssm")),
        AcqInfo => (Some(archdesc!("/acqinfo/p")), Some("acqinfo_ssim")),
        Appraisal => (Some(archdesc!("/appraisal/p")), Some("appraisal_ssm")),
        Arrangement => (Some(archdesc!("/arrangement/p")), Some("arrangement_ssm")),
        Author => (Some("//filedesc/titlestmt/author"), Some("author_ssm")),
        BiogHist => (Some(archdesc!("/bioghist/p")), Some("bioghist_ssm")),
        ChronList => (
            Some(archdesc!("//chronlist/chronitem//text()[not(ancestor::dsc)]")),
            Some("chronlist_ssm")
        ),
        Collection => (Some(archdesc!("/did/unittitle")), Some("collection_ssm")),
        CorpNameNotInDsc => (Some(archdesc!("//corpname[not(ancestor::dsc)]")), Some("corpname_ssm")),
        CorpNameNotInRepository => (Some("//corpname[not(ancestor::repository)]"), None),
        CreatorCorpName => (
            Some(creator_origination!("//archdesc[@level='collection']/did/", "corpname")),
            Some("creator_corpname_ssim")
        ),
        CreatorFamName => (
            Some(creator_origination!("//archdesc[@level='collection']/did/", "famname")),
            Some("creator_famname_ssim")
        ),
        CreatorPersName => (
            Some(creator_origination!("//archdesc[@level='collection']/did/", "persname")),
            Some("creator_persname_ssim")
        ),
        CustodHist => (Some(archdesc!("/custodhist/p")), Some("custodhist_ssm")),
        Dao => (Some("//dao"), None),
        EadId => (Some("//eadid"), None),
        FamName => (Some("//famname"), None),
        FamNameNotInDsc => (Some(archdesc!("//famname[not(ancestor::dsc)]")), Some("famname_ssm")),
        FunctionNotInDsc => (Some(archdesc!("//function[not(ancestor::dsc)]")), Some("function_ssm")),
        GenreForm => (Some("//genreform"), None),
        GenreFormNotInDsc => (Some(archdesc!("//genreform[not(ancestor::dsc)]")), Some("genreform_ssm")),
        GeogName => (Some("//geogname"), None),
        GeogNameNotInDsc => (Some(archdesc!("//geogname[not(ancestor::dsc)]")), Some("geogname_ssm")),
        Heading => (Some(archdesc!("/did/unittitle")), Some("heading_ssm")),
        LangCode => (Some(archdesc!("/did/langmaterial/language/@langcode")), None),
        NameNotInDsc => (Some(archdesc!("//name[not(ancestor::dsc)]")), Some("name_ssm")),
        OccupationNotInDsc => (Some(archdesc!("//occupation[not(ancestor::dsc)]")), Some("occupation_ssm")),
        Odd => (Some(archdesc!("/odd/p")), Some("odd_ssm")),
        OtherFindAid => (Some(archdesc!("/otherfindaid/p")), Some("otherfindaid_ssm")),
        PersName => (Some("//persname"), None),
        PersNameNotInDsc => (Some(archdesc!("//persname[not(ancestor::dsc)]")), Some("persname_ssm")),
        PhysLoc => (Some(archdesc!("/did/physloc")), Some("physloc_ssm")),
        PhysTech => (Some(archdesc!("/phystech/p")), Some("phystech_ssm")),
        PreferCite => (Some(archdesc!("/prefercite/p")), Some("prefercite_ssm")),
        ProcessInfo => (Some(archdesc!("/processinfo/p")), Some("processinfo_ssm")),
        RelatedMaterial => (Some(archdesc!("/relatedmaterial/p")), Some("relatedmaterial_ssm")),
        ScopeContent => (Some(archdesc!("/scopecontent/p")), Some("scopecontent_ssm")),
        SeparatedMaterial => (Some(archdesc!("/separatedmaterial/p")), Some("separatedmaterial_ssm")),
        Subject => (Some("//subject|//function|//occupation"), None),
        SubjectNotInDsc => (Some(archdesc!("//subject[not(ancestor::dsc)]")), Some("subject_ssm")),
        TitleNotInDsc => (Some(archdesc!("//title[not(ancestor::dsc)]")), Some("title_ssm")),
        UnitDateBulk => (Some(archdesc!("/did/unitdate[@type='bulk']")), Some("unitdate_bulk_ssim")),
        UnitDateInclusive => (
            Some(archdesc!("/did/unitdate[@type='inclusive']")),
            Some("unitdate_inclusive_ssm")
        ),
        UnitDateNormal => (Some(archdesc!("/did/unitdate/@normal")), Some("unitdate_normal_ssm")),
        UnitDateNoType => (Some(archdesc!("/did/unitdate[not(@type)]")), Some("unitdate_other_ssim")),
        UnitId => (Some(archdesc!("/did/unitid")), Some("unitid_ssm")),
        UnitTitle => (Some(archdesc!("/did/unittitle")), Some("unittitle_ssm")),
        UserRestrict => (Some(archdesc!("/userestrict/p")), Some("userestrict_ssm")),

        // Hardcoded and derived.
        Ead => (None, Some("ead_ssi")),
        RepositoryCode => (None, Some("repository_ssi")),
        Format => (None, Some("format_ssm")),
        FormatSort => (None, Some("format_ii")),
        Creator => (None, Some("creator_ssim")),
        DateRange => (None, Some("date_range_sim")),
        Language => (None, Some("language_ssim")),
        MaterialType => (None, Some("material_type_sim")),
        Name => (None, Some("name_sim")),
        OnlineAccess => (None, Some("online_access_sim")),
        Place => (None, Some("place_sim")),
        SubjectFacet => (None, Some("subject_sim")),
        UnitDateStart => (None, Some("unitdate_start_sim")),
        UnitDateEnd => (None, Some("unitdate_end_sim")),
        UnitDateDisplay => (None, Some("unitdate_ssm")),
        UnitTitleHtml => (None, Some("unittitle_html_ssm")),
    }
}

field_enum! {
    /// Fields of a component document.
    ///
    /// Relative XPaths are evaluated against the component with its nested
    /// components removed; absolute ones against the whole finding aid.
    pub enum ComponentField {
        Address => (Some(".//address/p"), Some("address_ssm")),
        Appraisal => (Some(".//appraisal/p"), Some("appraisal_ssm")),
        BiogHist => (Some(".//bioghist/p"), Some("bioghist_ssm")),
        ChronList => (Some(".//chronlist/chronitem//text()"), Some("chronlist_ssm")),
        CollectionUnitTitle => (Some(archdesc!("/did/unittitle")), Some("collection_ssm")),
        CollectionUnitId => (Some(archdesc!("/did/unitid")), Some("collection_unitid_ssm")),
        CorpName => (Some(".//corpname"), Some("corpname_ssm")),
        CreatorCorpName => (Some(creator_origination!(".//", "corpname")), Some("creator_corpname_ssim")),
        CreatorFamName => (Some(creator_origination!(".//", "famname")), Some("creator_famname_ssim")),
        CreatorPersName => (Some(creator_origination!(".//", "persname")), Some("creator_persname_ssim")),
        Dao => (Some(".//dao"), None),
        DaoDesc => (Some(".//dao/daodesc/p"), Some("daodesc_ssm")),
        DidUnitId => (Some("./did/unitid"), Some("unitid_ssm")),
        DidUnitTitle => (Some("./did/unittitle"), Some("unittitle_ssm")),
        EadId => (Some("//eadid"), None),
        FamName => (Some(".//famname"), Some("famname_ssm")),
        Function => (Some(".//function"), Some("function_ssm")),
        GenreForm => (Some(".//genreform"), Some("genreform_ssm")),
        GeogName => (Some(".//geogname"), Some("geogname_ssm")),
        Level => (Some("./@level"), Some("level_ssm")),
        Ref => (Some("./@id"), Some("ref_ssi")),
        NameElement => (Some(".//name"), Some("name_ssm")),
        Note => (Some(".//note"), Some("note_ssm")),
        Occupation => (Some(".//occupation"), Some("occupation_ssm")),
        PersName => (Some(".//persname"), Some("persname_ssm")),
        PhysTech => (Some(".//phystech/p"), Some("phystech_ssm")),
        ScopeContent => (Some(".//scopecontent/p"), Some("scopecontent_ssm")),
        Subject => (Some(".//subject"), Some("subject_ssm")),
        SubjectUnion => (Some(".//subject|.//function|.//occupation"), None),
        Title => (Some(".//title"), Some("title_ssm")),
        UnitDateBulk => (Some("./did/unitdate[@type='bulk']"), Some("unitdate_bulk_ssim")),
        UnitDateInclusive => (Some("./did/unitdate[@type='inclusive']"), Some("unitdate_inclusive_ssm")),
        UnitDateNormal => (Some("./did/unitdate/@normal"), Some("unitdate_normal_ssm")),
        UnitDateNoType => (Some("./did/unitdate[not(@type)]"), Some("unitdate_other_ssim")),

        // Hierarchy.
        Ead => (None, Some("ead_ssi")),
        RepositoryCode => (None, Some("repository_ssi")),
        ParentForSort => (None, Some("parent_ssi")),
        ParentForDisplay => (None, Some("parent_ssm")),
        ComponentLevel => (None, Some("component_level_isim")),
        HasChildren => (None, Some("component_children_bsi")),
        ParentUnitTitles => (None, Some("parent_unittitles_ssm")),
        SeriesForSort => (None, Some("series_si")),
        Containers => (None, Some("containers_ssim")),
        Location => (None, Some("location_ssm")),
        Format => (None, Some("format_ssm")),

        // Derived.
        Creator => (None, Some("creator_ssim")),
        DateRange => (None, Some("date_range_sim")),
        MaterialType => (None, Some("material_type_sim")),
        Name => (None, Some("name_sim")),
        OnlineAccess => (None, Some("online_access_sim")),
        Place => (None, Some("place_sim")),
        SubjectFacet => (None, Some("subject_sim")),
        UnitDateStart => (None, Some("unitdate_start_sim")),
        UnitDateEnd => (None, Some("unitdate_end_sim")),
        UnitDateDisplay => (None, Some("unitdate_ssm")),
        UnitTitleHtml => (None, Some("unittitle_html_ssm")),
    }
}

/// Values of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    /// The XPath the values came from, for simple fields.
    pub source: Option<&'static str>,
    pub values: Vec<String>,
    /// Serialized XML of each value, for fields that need markup later.
    pub xml: Option<Vec<String>>,
}

impl FieldValues {
    pub fn queried(source: &'static str, values: Vec<String>, xml: Vec<String>) -> Self {
        Self {
            source: Some(source),
            values,
            xml: Some(xml),
        }
    }

    pub fn derived(values: Vec<String>) -> Self {
        Self {
            source: None,
            values,
            xml: None,
        }
    }
}

/// Field values keyed by a closed field enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap<F: FieldName> {
    entries: BTreeMap<F, FieldValues>,
}

impl<F: FieldName> Default for FieldMap<F> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<F: FieldName> FieldMap<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: F, values: FieldValues) {
        self.entries.insert(field, values);
    }

    /// Shorthand for a derived or hardcoded field.
    pub fn set(&mut self, field: F, values: Vec<String>) {
        self.insert(field, FieldValues::derived(values));
    }

    pub fn get(&self, field: F) -> Option<&FieldValues> {
        self.entries.get(&field)
    }

    /// Values of `field`, empty when absent.
    pub fn values(&self, field: F) -> &[String] {
        self.entries
            .get(&field)
            .map(|f| f.values.as_slice())
            .unwrap_or(&[])
    }

    /// Serialized XML of `field`, when recorded.
    pub fn xml(&self, field: F) -> Option<&[String]> {
        self.entries.get(&field).and_then(|f| f.xml.as_deref())
    }

    /// Values of several fields, concatenated in the given order.
    pub fn concat(&self, fields: &[F]) -> Vec<String> {
        fields
            .iter()
            .flat_map(|&f| self.values(f).iter().cloned())
            .collect()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (F, &FieldValues)> {
        self.entries.iter().map(|(&f, v)| (f, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::xpath::XPath;
    use std::collections::HashSet;

    #[test]
    fn test_every_xpath_compiles() {
        for field in CollectionField::ALL {
            if let Some(xpath) = field.xpath() {
                XPath::compile(xpath).unwrap_or_else(|e| panic!("{:?}: {}", field, e));
            }
        }
        for field in ComponentField::ALL {
            if let Some(xpath) = field.xpath() {
                XPath::compile(xpath).unwrap_or_else(|e| panic!("{:?}: {}", field, e));
            }
        }
    }

    #[test]
    fn test_solr_names_unique() {
        let names: Vec<&str> = CollectionField::ALL.iter().filter_map(|f| f.solr_name()).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());

        let names: Vec<&str> = ComponentField::ALL.iter().filter_map(|f| f.solr_name()).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn test_aliases_share_unittitle_query() {
        assert_eq!(
            CollectionField::Collection.xpath(),
            CollectionField::UnitTitle.xpath()
        );
        assert_eq!(CollectionField::Heading.xpath(), CollectionField::UnitTitle.xpath());
    }

    #[test]
    fn test_field_map_iterates_in_declaration_order() {
        let mut map = FieldMap::new();
        map.set(CollectionField::UnitTitleHtml, vec!["t".into()]);
        map.set(CollectionField::Abstract, vec!["a".into()]);
        let order: Vec<CollectionField> = map.iter().map(|(f, _)| f).collect();
        assert_eq!(order, vec![CollectionField::Abstract, CollectionField::UnitTitleHtml]);
        assert_eq!(map.values(CollectionField::Author), &[] as &[String]);
        assert_eq!(map.xml(CollectionField::Abstract), None);
    }
}
