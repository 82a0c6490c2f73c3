//! `docProps/core.xml` and `docProps/app.xml`

use crate::options::DocumentProperties;
use crate::writer::part::{Fragment, FragmentSource};
use crate::writer::XML_DECLARATION;
use chrono::{DateTime, Utc};

pub(crate) const CORE_PATH: &str = "docProps/core.xml";
pub(crate) const APP_PATH: &str = "docProps/app.xml";

const CORE_START: &str = "<cp:coreProperties \
xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
xmlns:dc=\"http://purl.org/dc/elements/1.1/\" \
xmlns:dcterms=\"http://purl.org/dc/terms/\" \
xmlns:dcmitype=\"http://purl.org/dc/dcmitype/\" \
xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">";

/// Core properties; absent fields are left out
pub(crate) struct CorePropertiesXml<'a> {
    properties: &'a DocumentProperties,
    created: DateTime<Utc>,
    index: usize,
}

impl<'a> CorePropertiesXml<'a> {
    /// `created` is used when the properties carry no timestamp of their own
    pub(crate) fn new(properties: &'a DocumentProperties, created: DateTime<Utc>) -> Self {
        CorePropertiesXml {
            properties,
            created: properties.created.unwrap_or(created),
            index: 0,
        }
    }

    fn element(tag: &'static str, value: &Option<String>) -> Option<Fragment> {
        let value = value.as_deref()?;
        Some(
            Fragment::raw(format!("<{tag}>"))
                .text(value)
                .push(format!("</{tag}>")),
        )
    }
}

impl FragmentSource for CorePropertiesXml<'_> {
    fn next_fragment(&mut self) -> Option<Fragment> {
        let properties = self.properties;
        loop {
            let index = self.index;
            self.index += 1;
            let fragment = match index {
                0 => Some(Fragment::raw(XML_DECLARATION).push(CORE_START)),
                1 => Self::element("dc:title", &properties.title),
                2 => Self::element("dc:subject", &properties.subject),
                3 => Self::element("dc:creator", &properties.author),
                4 => Self::element("cp:keywords", &properties.keywords),
                5 => Self::element("dc:description", &properties.description),
                6 => Some(Fragment::raw(format!(
                    "<dcterms:created xsi:type=\"dcterms:W3CDTF\">{}</dcterms:created>",
                    self.created.format("%Y-%m-%dT%H:%M:%SZ")
                ))),
                7 => Some(Fragment::raw("</cp:coreProperties>")),
                _ => return None,
            };
            if fragment.is_some() {
                return fragment;
            }
        }
    }
}

/// Extended properties: the producing application
pub(crate) struct AppPropertiesXml<'a> {
    properties: &'a DocumentProperties,
    done: bool,
}

impl<'a> AppPropertiesXml<'a> {
    pub(crate) fn new(properties: &'a DocumentProperties) -> Self {
        AppPropertiesXml {
            properties,
            done: false,
        }
    }
}

impl FragmentSource for AppPropertiesXml<'_> {
    fn next_fragment(&mut self) -> Option<Fragment> {
        if self.done {
            return None;
        }
        self.done = true;
        Some(
            Fragment::raw(XML_DECLARATION)
                .push(
                    "<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\" \
                     xmlns:vt=\"http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes\"><Application>",
                )
                .text(self.properties.application.clone())
                .push("</Application></Properties>"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::part::Fragments;
    use crate::writer::tests::render;
    use chrono::TimeZone;

    #[test]
    fn test_core_properties() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let properties = DocumentProperties::default()
            .with_title("Q1 <draft>")
            .with_author("Ola Nordmann");
        let xml = render(&mut Fragments::new(CorePropertiesXml::new(&properties, created)));
        assert!(xml.contains("<dc:title>Q1 &lt;draft&gt;</dc:title><dc:creator>Ola Nordmann</dc:creator>"));
        assert!(!xml.contains("dc:subject"));
        assert!(xml.contains(
            "<dcterms:created xsi:type=\"dcterms:W3CDTF\">2024-03-01T12:30:05Z</dcterms:created></cp:coreProperties>"
        ));
    }

    #[test]
    fn test_explicit_created_wins() {
        let session = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let fixed = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        let properties = DocumentProperties::default().with_created(fixed);
        let xml = render(&mut Fragments::new(CorePropertiesXml::new(&properties, session)));
        assert!(xml.contains("2020-01-02T03:04:05Z"));
    }

    #[test]
    fn test_app_properties() {
        let properties = DocumentProperties::default();
        let xml = render(&mut Fragments::new(AppPropertiesXml::new(&properties)));
        assert!(xml.ends_with("<Application>sheetstream</Application></Properties>"));
    }
}
