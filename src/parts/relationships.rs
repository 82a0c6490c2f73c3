//! Relationship parts (`*.rels`)

use crate::writer::part::{Fragment, FragmentSource};
use crate::writer::sheet::WorksheetLinks;
use crate::writer::XML_DECLARATION;

pub(crate) const ROOT_PATH: &str = "_rels/.rels";
pub(crate) const WORKBOOK_PATH: &str = "xl/_rels/workbook.xml.rels";

const OFFICE: &str = super::RELATIONSHIPS_NS;
const PACKAGE: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Relationship type, relative to its namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RelationshipKind {
    OfficeDocument,
    CoreProperties,
    ExtendedProperties,
    Worksheet,
    Styles,
    SharedStrings,
    Drawing,
    VmlDrawing,
    Comments,
    Table,
    Image,
}

impl RelationshipKind {
    fn uri(&self) -> String {
        let (namespace, name) = match self {
            RelationshipKind::OfficeDocument => (OFFICE, "officeDocument"),
            RelationshipKind::CoreProperties => (PACKAGE, "metadata/core-properties"),
            RelationshipKind::ExtendedProperties => (OFFICE, "extended-properties"),
            RelationshipKind::Worksheet => (OFFICE, "worksheet"),
            RelationshipKind::Styles => (OFFICE, "styles"),
            RelationshipKind::SharedStrings => (OFFICE, "sharedStrings"),
            RelationshipKind::Drawing => (OFFICE, "drawing"),
            RelationshipKind::VmlDrawing => (OFFICE, "vmlDrawing"),
            RelationshipKind::Comments => (OFFICE, "comments"),
            RelationshipKind::Table => (OFFICE, "table"),
            RelationshipKind::Image => (OFFICE, "image"),
        };
        format!("{namespace}/{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub kind: RelationshipKind,
    pub target: String,
}

impl Relationship {
    pub(crate) fn new(kind: RelationshipKind, target: impl Into<String>) -> Self {
        Relationship {
            kind,
            target: target.into(),
        }
    }
}

/// Path of the relationships part belonging to `part`
pub(crate) fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((directory, file)) => format!("{directory}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Package relationships: the workbook, then the document properties
pub(crate) fn root(document_properties: bool) -> Vec<Relationship> {
    let mut relationships = vec![Relationship::new(
        RelationshipKind::OfficeDocument,
        "xl/workbook.xml",
    )];
    if document_properties {
        relationships.push(Relationship::new(
            RelationshipKind::CoreProperties,
            "docProps/core.xml",
        ));
        relationships.push(Relationship::new(
            RelationshipKind::ExtendedProperties,
            "docProps/app.xml",
        ));
    }
    relationships
}

/// Workbook relationships: worksheets `rId1..rIdN`, then styles and shared strings
pub(crate) fn workbook(
    worksheet_count: usize,
    styles: bool,
    shared_strings: bool,
) -> Vec<Relationship> {
    let mut relationships: Vec<Relationship> = (1..=worksheet_count)
        .map(|n| Relationship::new(RelationshipKind::Worksheet, format!("worksheets/sheet{n}.xml")))
        .collect();
    if styles {
        relationships.push(Relationship::new(RelationshipKind::Styles, "styles.xml"));
    }
    if shared_strings {
        relationships.push(Relationship::new(
            RelationshipKind::SharedStrings,
            "sharedStrings.xml",
        ));
    }
    relationships
}

/// Worksheet relationships and the ids the worksheet footer refers to.
///
/// The drawing comes first, then the VML drawing and comments of the notes,
/// then the tables.
pub(crate) fn worksheet(
    drawing: Option<u32>,
    notes: Option<u32>,
    tables: &[u32],
) -> (Vec<Relationship>, WorksheetLinks) {
    let mut relationships = Vec::new();
    let mut links = WorksheetLinks::default();

    if let Some(number) = drawing {
        relationships.push(Relationship::new(
            RelationshipKind::Drawing,
            format!("../drawings/drawing{number}.xml"),
        ));
        links.drawing = Some(relationships.len() as u32);
    }
    if let Some(number) = notes {
        relationships.push(Relationship::new(
            RelationshipKind::VmlDrawing,
            format!("../drawings/vmlDrawing{number}.vml"),
        ));
        links.legacy_drawing = Some(relationships.len() as u32);
        relationships.push(Relationship::new(
            RelationshipKind::Comments,
            format!("../comments{number}.xml"),
        ));
    }
    for id in tables {
        relationships.push(Relationship::new(
            RelationshipKind::Table,
            format!("../tables/table{id}.xml"),
        ));
        links.tables.push(relationships.len() as u32);
    }
    (relationships, links)
}

/// A `<Relationships>` part; relationship `i` gets id `rId{i + 1}`
pub(crate) struct RelationshipsXml {
    relationships: Vec<Relationship>,
    index: usize,
}

impl RelationshipsXml {
    pub(crate) fn new(relationships: Vec<Relationship>) -> Self {
        RelationshipsXml {
            relationships,
            index: 0,
        }
    }
}

impl FragmentSource for RelationshipsXml {
    fn next_fragment(&mut self) -> Option<Fragment> {
        let index = self.index;
        self.index += 1;
        let count = self.relationships.len();
        match index {
            0 => Some(
                Fragment::raw(XML_DECLARATION).push(
                    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
                ),
            ),
            i if i <= count => {
                let relationship = &self.relationships[i - 1];
                Some(Fragment::raw(format!(
                    "<Relationship Id=\"rId{i}\" Type=\"{}\" Target=\"{}\"/>",
                    relationship.kind.uri(),
                    relationship.target
                )))
            }
            i if i == count + 1 => Some(Fragment::raw("</Relationships>")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::part::Fragments;
    use crate::writer::tests::render;

    #[test]
    fn test_root_relationships() {
        let xml = render(&mut Fragments::new(RelationshipsXml::new(root(true))));
        assert!(xml.contains(
            "<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"xl/workbook.xml\"/>"
        ));
        assert!(xml.contains("Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\""));
        assert!(xml.contains("Id=\"rId3\""));
        assert!(xml.ends_with("</Relationships>"));

        let xml = render(&mut Fragments::new(RelationshipsXml::new(root(false))));
        assert!(!xml.contains("rId2"));
    }

    #[test]
    fn test_workbook_relationship_order() {
        let relationships = workbook(2, true, true);
        let kinds: Vec<_> = relationships.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            [
                RelationshipKind::Worksheet,
                RelationshipKind::Worksheet,
                RelationshipKind::Styles,
                RelationshipKind::SharedStrings
            ]
        );
        assert_eq!(relationships[1].target, "worksheets/sheet2.xml");
    }

    #[test]
    fn test_worksheet_links() {
        let (relationships, links) = worksheet(Some(1), Some(2), &[3, 4]);
        assert_eq!(relationships.len(), 5);
        assert_eq!(links.drawing, Some(1));
        assert_eq!(links.legacy_drawing, Some(2));
        assert_eq!(relationships[2].target, "../comments2.xml");
        assert_eq!(links.tables, [4, 5]);

        let (relationships, links) = worksheet(None, None, &[7]);
        assert_eq!(relationships[0].target, "../tables/table7.xml");
        assert_eq!(links.tables, [1]);
    }

    #[test]
    fn test_rels_path() {
        assert_eq!(rels_path("xl/worksheets/sheet3.xml"), "xl/worksheets/_rels/sheet3.xml.rels");
        assert_eq!(rels_path("xl/drawings/drawing1.xml"), "xl/drawings/_rels/drawing1.xml.rels");
    }
}
