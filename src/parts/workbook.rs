//! `xl/workbook.xml`

use super::{RELATIONSHIPS_NS, SPREADSHEET_NS};
use crate::worksheet::{Visibility, WorksheetMetadata};
use crate::writer::part::{Fragment, FragmentSource};
use crate::writer::XML_DECLARATION;

pub(crate) const PATH: &str = "xl/workbook.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    BookViews,
    SheetsStart,
    Sheets,
    Footer,
    Done,
}

/// Lists the worksheets; sheet `i` is relationship `rId{i}`
pub(crate) struct WorkbookXml<'a> {
    worksheets: &'a [WorksheetMetadata],
    next: Section,
    index: usize,
}

impl<'a> WorkbookXml<'a> {
    pub(crate) fn new(worksheets: &'a [WorksheetMetadata]) -> Self {
        WorkbookXml {
            worksheets,
            next: Section::Header,
            index: 0,
        }
    }

    /// The tab shown on open must be visible; only written when it is not the first.
    fn active_tab(&self) -> Option<usize> {
        let first_visible = self
            .worksheets
            .iter()
            .position(|w| w.visibility == Visibility::Visible)?;
        (first_visible > 0).then_some(first_visible)
    }
}

impl FragmentSource for WorkbookXml<'_> {
    fn next_fragment(&mut self) -> Option<Fragment> {
        loop {
            match self.next {
                Section::Header => {
                    self.next = Section::BookViews;
                    return Some(Fragment::raw(XML_DECLARATION).push(format!(
                        "<workbook xmlns=\"{SPREADSHEET_NS}\" xmlns:r=\"{RELATIONSHIPS_NS}\">"
                    )));
                }
                Section::BookViews => {
                    self.next = Section::SheetsStart;
                    if let Some(tab) = self.active_tab() {
                        return Some(Fragment::raw(format!(
                            "<bookViews><workbookView activeTab=\"{tab}\"/></bookViews>"
                        )));
                    }
                }
                Section::SheetsStart => {
                    self.next = Section::Sheets;
                    return Some(Fragment::raw("<sheets>"));
                }
                Section::Sheets => {
                    let Some(worksheet) = self.worksheets.get(self.index) else {
                        self.next = Section::Footer;
                        continue;
                    };
                    self.index += 1;
                    let id = self.index;
                    let mut tail = format!("\" sheetId=\"{id}\"");
                    if let Some(state) = worksheet.visibility.state() {
                        tail.push_str(&format!(" state=\"{state}\""));
                    }
                    tail.push_str(&format!(" r:id=\"rId{id}\"/>"));
                    return Some(
                        Fragment::raw("<sheet name=\"")
                            .text(worksheet.name.clone())
                            .push(tail),
                    );
                }
                Section::Footer => {
                    self.next = Section::Done;
                    return Some(Fragment::raw("</sheets></workbook>"));
                }
                Section::Done => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::part::Fragments;
    use crate::writer::tests::render;

    #[test]
    fn test_sheets_are_listed_in_order() {
        let worksheets = vec![
            WorksheetMetadata::new("Data".into(), 1, Visibility::Visible),
            WorksheetMetadata::new("R&D \"x\"".into(), 2, Visibility::Hidden),
        ];
        let xml = render(&mut Fragments::new(WorkbookXml::new(&worksheets)));
        assert!(xml.contains(
            "<sheets><sheet name=\"Data\" sheetId=\"1\" r:id=\"rId1\"/>\
             <sheet name=\"R&amp;D &quot;x&quot;\" sheetId=\"2\" state=\"hidden\" r:id=\"rId2\"/></sheets>"
        ));
        assert!(!xml.contains("bookViews"));
    }

    #[test]
    fn test_active_tab_skips_hidden_sheets() {
        let worksheets = vec![
            WorksheetMetadata::new("Lookup".into(), 1, Visibility::VeryHidden),
            WorksheetMetadata::new("Report".into(), 2, Visibility::Visible),
        ];
        let xml = render(&mut Fragments::new(WorkbookXml::new(&worksheets)));
        assert!(xml.contains("<bookViews><workbookView activeTab=\"1\"/></bookViews><sheets>"));
        assert!(xml.contains("state=\"veryHidden\""));
    }
}
