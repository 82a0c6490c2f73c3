//! `[Content_Types].xml`

use crate::counter::ResourceCounter;
use crate::worksheet::WorksheetMetadata;
use crate::writer::part::{Fragment, FragmentSource};
use crate::writer::XML_DECLARATION;

pub(crate) const PATH: &str = "[Content_Types].xml";

const TYPES_START: &str = "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>";
const VML: &str =
    "<Default Extension=\"vml\" ContentType=\"application/vnd.openxmlformats-officedocument.vmlDrawing\"/>";
const STYLES: &str = "<Override PartName=\"/xl/styles.xml\" \
ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml\"/>";
const SHARED_STRINGS: &str = "<Override PartName=\"/xl/sharedStrings.xml\" \
ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml\"/>";
const DOC_PROPS: &str = "<Override PartName=\"/docProps/core.xml\" \
ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>\
<Override PartName=\"/docProps/app.xml\" \
ContentType=\"application/vnd.openxmlformats-officedocument.extended-properties+xml\"/>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    ImageTypes,
    Vml,
    Styles,
    SharedStrings,
    Drawings,
    Tables,
    Worksheets,
    Comments,
    DocProps,
    Footer,
    Done,
}

impl Section {
    fn next(self) -> Section {
        match self {
            Section::Header => Section::ImageTypes,
            Section::ImageTypes => Section::Vml,
            Section::Vml => Section::Styles,
            Section::Styles => Section::SharedStrings,
            Section::SharedStrings => Section::Drawings,
            Section::Drawings => Section::Tables,
            Section::Tables => Section::Worksheets,
            Section::Worksheets => Section::Comments,
            Section::Comments => Section::DocProps,
            Section::DocProps => Section::Footer,
            Section::Footer | Section::Done => Section::Done,
        }
    }
}

/// Which optional workbook-level parts exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PackageFlags {
    pub has_styles: bool,
    pub has_shared_strings: bool,
    pub has_document_properties: bool,
}

pub(crate) struct ContentTypesXml<'a> {
    worksheets: &'a [WorksheetMetadata],
    counter: &'a ResourceCounter,
    flags: PackageFlags,
    next: Section,
    index: u32,
}

impl<'a> ContentTypesXml<'a> {
    pub(crate) fn new(
        worksheets: &'a [WorksheetMetadata],
        counter: &'a ResourceCounter,
        flags: PackageFlags,
    ) -> Self {
        ContentTypesXml {
            worksheets,
            counter,
            flags,
            next: Section::Header,
            index: 0,
        }
    }

    /// One numbered override per call until `count` is reached
    fn numbered(&mut self, count: u32, part: impl Fn(u32) -> String) -> Option<Fragment> {
        if self.index < count {
            self.index += 1;
            return Some(Fragment::raw(part(self.index)));
        }
        self.index = 0;
        None
    }

    fn fragment(&mut self, section: Section) -> Option<Fragment> {
        let flag = |enabled: bool, markup: &'static str| enabled.then(|| Fragment::raw(markup));
        match section {
            Section::Header => Some(Fragment::raw(XML_DECLARATION).push(TYPES_START)),
            Section::ImageTypes => {
                let mut defaults = String::new();
                for image_type in self.counter.embedded_image_types() {
                    defaults.push_str(&format!(
                        "<Default Extension=\"{}\" ContentType=\"{}\"/>",
                        image_type.extension(),
                        image_type.content_type()
                    ));
                }
                (!defaults.is_empty()).then(|| Fragment::raw(defaults))
            }
            Section::Vml => flag(self.counter.worksheets_with_notes() > 0, VML),
            Section::Styles => flag(self.flags.has_styles, STYLES),
            Section::SharedStrings => flag(self.flags.has_shared_strings, SHARED_STRINGS),
            Section::Drawings => self.numbered(self.counter.worksheets_with_images(), |n| {
                format!(
                    "<Override PartName=\"/xl/drawings/drawing{n}.xml\" \
                     ContentType=\"application/vnd.openxmlformats-officedocument.drawing+xml\"/>"
                )
            }),
            Section::Tables => self.numbered(self.counter.total_tables(), |n| {
                format!(
                    "<Override PartName=\"/xl/tables/table{n}.xml\" \
                     ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.table+xml\"/>"
                )
            }),
            Section::Worksheets => {
                let worksheets = self.worksheets;
                self.numbered(worksheets.len() as u32, |n| {
                    format!(
                        "<Override PartName=\"/{}\" \
                         ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
                        worksheets[n as usize - 1].path
                    )
                })
            }
            Section::Comments => self.numbered(self.counter.worksheets_with_notes(), |n| {
                format!(
                    "<Override PartName=\"/xl/comments{n}.xml\" \
                     ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.comments+xml\"/>"
                )
            }),
            Section::DocProps => flag(self.flags.has_document_properties, DOC_PROPS),
            Section::Footer => Some(Fragment::raw("</Types>")),
            Section::Done => None,
        }
    }
}

impl FragmentSource for ContentTypesXml<'_> {
    fn next_fragment(&mut self) -> Option<Fragment> {
        while self.next != Section::Done {
            let section = self.next;
            let fragment = self.fragment(section);
            // Repeated sections stay current until they run out
            let repeated = matches!(
                section,
                Section::Drawings | Section::Tables | Section::Worksheets | Section::Comments
            );
            if !repeated || fragment.is_none() {
                self.next = section.next();
            }
            if fragment.is_some() {
                return fragment;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageType;
    use crate::worksheet::Visibility;
    use crate::writer::part::Fragments;
    use crate::writer::tests::render;

    fn worksheets(count: usize) -> Vec<WorksheetMetadata> {
        (1..=count)
            .map(|i| WorksheetMetadata::new(format!("Sheet{i}"), i, Visibility::Visible))
            .collect()
    }

    #[test]
    fn test_minimal_package() {
        let sheets = worksheets(1);
        let counter = ResourceCounter::new();
        let xml = render(&mut Fragments::new(ContentTypesXml::new(
            &sheets,
            &counter,
            PackageFlags::default(),
        )));
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("<Override PartName=\"/xl/worksheets/sheet1.xml\""));
        assert!(!xml.contains("styles.xml"));
        assert!(!xml.contains("docProps"));
        assert!(!xml.contains("vml"));
        assert!(xml.ends_with("</Types>"));
    }

    #[test]
    fn test_section_order() {
        let sheets = worksheets(2);
        let mut counter = ResourceCounter::new();
        counter.add_embedded_image(ImageType::Jpeg);
        counter.add_embedded_image(ImageType::Png);
        counter.add_worksheet_with_images();
        counter.add_worksheet_with_notes();
        counter.add_table();
        counter.add_table();
        let flags = PackageFlags {
            has_styles: true,
            has_shared_strings: true,
            has_document_properties: true,
        };
        let xml = render(&mut Fragments::new(ContentTypesXml::new(&sheets, &counter, flags)));

        let order = [
            "Extension=\"png\"",
            "Extension=\"jpeg\"",
            "Extension=\"vml\"",
            "/xl/styles.xml",
            "/xl/sharedStrings.xml",
            "/xl/drawings/drawing1.xml",
            "/xl/tables/table1.xml",
            "/xl/tables/table2.xml",
            "/xl/worksheets/sheet1.xml",
            "/xl/worksheets/sheet2.xml",
            "/xl/comments1.xml",
            "/docProps/core.xml",
            "/docProps/app.xml",
            "</Types>",
        ];
        let positions: Vec<usize> = order.iter().map(|p| xml.find(p).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{xml}");
        assert!(!xml.contains("drawing2.xml"));
    }
}
