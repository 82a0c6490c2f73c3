//! Shared strings table for string deduplication

use super::SPREADSHEET_NS;
use crate::writer::part::{Fragment, FragmentSource};
use crate::writer::value::needs_space_preserve;
use crate::writer::XML_DECLARATION;
use indexmap::IndexSet;

pub(crate) const PATH: &str = "xl/sharedStrings.xml";

/// Shared strings table that deduplicates strings across the workbook
#[derive(Debug, Default)]
pub struct SharedStrings {
    strings: IndexSet<String>,
    references: u64,
}

impl SharedStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string and get its index
    pub fn add_string(&mut self, s: &str) -> u32 {
        self.references += 1;
        if let Some(index) = self.strings.get_index_of(s) {
            return index as u32;
        }
        let (index, _) = self.strings.insert_full(s.to_string());
        index as u32
    }

    /// Get number of unique strings
    pub fn count(&self) -> usize {
        self.strings.len()
    }

    /// Number of cells referring to the table
    pub fn references(&self) -> u64 {
        self.references
    }
}

pub(crate) struct SharedStringsXml<'a> {
    strings: &'a SharedStrings,
    index: usize,
}

impl<'a> SharedStringsXml<'a> {
    pub(crate) fn new(strings: &'a SharedStrings) -> Self {
        SharedStringsXml { strings, index: 0 }
    }
}

impl FragmentSource for SharedStringsXml<'_> {
    fn next_fragment(&mut self) -> Option<Fragment> {
        let index = self.index;
        self.index += 1;
        let count = self.strings.count();
        match index {
            0 => Some(Fragment::raw(XML_DECLARATION).push(format!(
                "<sst xmlns=\"{SPREADSHEET_NS}\" count=\"{}\" uniqueCount=\"{count}\">",
                self.strings.references()
            ))),
            i if i <= count => {
                let text = self.strings.strings.get_index(i - 1)?;
                let open = if needs_space_preserve(text) {
                    "<si><t xml:space=\"preserve\">"
                } else {
                    "<si><t>"
                };
                Some(Fragment::raw(open).text(text.clone()).push("</t></si>"))
            }
            i if i == count + 1 => Some(Fragment::raw("</sst>")),
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
    fn test_shared_strings() {
        let mut ss = SharedStrings::new();

        let idx1 = ss.add_string("Hello");
        let idx2 = ss.add_string("World");
        let idx3 = ss.add_string("Hello");

        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(idx3, 0);
        assert_eq!(ss.count(), 2);
        assert_eq!(ss.references(), 3);
    }

    #[test]
    fn test_shared_strings_xml() {
        let mut ss = SharedStrings::new();
        ss.add_string("Fish & Chips");
        ss.add_string(" indented");
        ss.add_string("Fish & Chips");
        let xml = render(&mut Fragments::new(SharedStringsXml::new(&ss)));
        assert!(xml.contains("count=\"3\" uniqueCount=\"2\">"));
        assert!(xml.ends_with(
            "<si><t>Fish &amp; Chips</t></si><si><t xml:space=\"preserve\"> indented</t></si></sst>"
        ));
    }
}
