//! Worksheet part: everything before and after the streamed rows

use super::part::{Fragment, FragmentSource};
use super::value::format_number;
use super::XML_DECLARATION;
use crate::types::{column_name, CellRange};
use crate::worksheet::WorksheetOptions;

const WORKSHEET_START: &str = "<worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartSection {
    Header,
    SheetViews,
    ColsStart,
    Cols,
    ColsEnd,
    SheetDataStart,
    Done,
}

/// Everything up to and including `<sheetData>`
pub(crate) struct WorksheetStartXml<'a> {
    options: &'a WorksheetOptions,
    next: StartSection,
    index: usize,
}

impl<'a> WorksheetStartXml<'a> {
    pub(crate) fn new(options: &'a WorksheetOptions) -> Self {
        WorksheetStartXml {
            options,
            next: StartSection::Header,
            index: 0,
        }
    }

    fn has_columns(&self) -> bool {
        self.options.columns.iter().any(|c| !c.is_default())
    }

    fn sheet_views(&self) -> Option<Fragment> {
        let (columns, rows) = (self.options.frozen_columns, self.options.frozen_rows);
        if columns == 0 && rows == 0 {
            return None;
        }

        let mut pane = String::from("<sheetViews><sheetView workbookViewId=\"0\"><pane");
        if columns > 0 {
            pane.push_str(&format!(" xSplit=\"{columns}\""));
        }
        if rows > 0 {
            pane.push_str(&format!(" ySplit=\"{rows}\""));
        }
        let active = match (columns > 0, rows > 0) {
            (true, true) => "bottomRight",
            (false, true) => "bottomLeft",
            _ => "topRight",
        };
        pane.push_str(&format!(
            " topLeftCell=\"{}{}\" activePane=\"{active}\" state=\"frozen\"/>\
             <selection pane=\"{active}\"/></sheetView></sheetViews>",
            column_name(columns + 1),
            rows + 1,
        ));
        Some(Fragment::raw(pane))
    }

    fn column(&self, index: usize) -> Fragment {
        let options = &self.options.columns[index];
        let number = index + 1;
        let mut col = format!("<col min=\"{number}\" max=\"{number}\"");
        if let Some(width) = options.width {
            let mut numbers = ryu::Buffer::new();
            col.push_str(" width=\"");
            col.push_str(format_number(width, &mut numbers));
            col.push_str("\" customWidth=\"1\"");
        }
        if options.hidden {
            col.push_str(" hidden=\"1\"");
        }
        col.push_str("/>");
        Fragment::raw(col)
    }
}

impl FragmentSource for WorksheetStartXml<'_> {
    fn next_fragment(&mut self) -> Option<Fragment> {
        loop {
            match self.next {
                StartSection::Header => {
                    self.next = StartSection::SheetViews;
                    return Some(Fragment::raw(XML_DECLARATION).push(WORKSHEET_START));
                }
                StartSection::SheetViews => {
                    self.next = StartSection::ColsStart;
                    if let Some(fragment) = self.sheet_views() {
                        return Some(fragment);
                    }
                }
                StartSection::ColsStart => {
                    if !self.has_columns() {
                        self.next = StartSection::SheetDataStart;
                        continue;
                    }
                    self.next = StartSection::Cols;
                    return Some(Fragment::raw("<cols>"));
                }
                StartSection::Cols => {
                    let columns = &self.options.columns;
                    while self.index < columns.len() && columns[self.index].is_default() {
                        self.index += 1;
                    }
                    if self.index == columns.len() {
                        self.index = 0;
                        self.next = StartSection::ColsEnd;
                        continue;
                    }
                    let fragment = self.column(self.index);
                    self.index += 1;
                    return Some(fragment);
                }
                StartSection::ColsEnd => {
                    self.next = StartSection::SheetDataStart;
                    return Some(Fragment::raw("</cols>"));
                }
                StartSection::SheetDataStart => {
                    self.next = StartSection::Done;
                    return Some(Fragment::raw("<sheetData>"));
                }
                StartSection::Done => return None,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndSection {
    SheetDataEnd,
    MergeCells,
    Drawing,
    LegacyDrawing,
    TableParts,
    Footer,
    Done,
}

/// Relationship ids referenced from the worksheet footer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct WorksheetLinks {
    pub drawing: Option<u32>,
    pub legacy_drawing: Option<u32>,
    pub tables: Vec<u32>,
}

/// `</sheetData>` and the elements that must follow it
pub(crate) struct WorksheetEndXml<'a> {
    merges: &'a [CellRange],
    links: &'a WorksheetLinks,
    next: EndSection,
    index: usize,
}

impl<'a> WorksheetEndXml<'a> {
    pub(crate) fn new(merges: &'a [CellRange], links: &'a WorksheetLinks) -> Self {
        WorksheetEndXml {
            merges,
            links,
            next: EndSection::SheetDataEnd,
            index: 0,
        }
    }

    /// Emit `open`, one fragment per item, then `close`; `None` when finished.
    fn repeated<T>(
        &mut self,
        items: &[T],
        open: impl FnOnce() -> String,
        item: impl FnOnce(&T) -> String,
        close: &'static str,
    ) -> Option<Fragment> {
        match self.index {
            _ if items.is_empty() => None,
            0 => {
                self.index = 1;
                Some(Fragment::raw(open()))
            }
            i if i <= items.len() => {
                self.index += 1;
                Some(Fragment::raw(item(&items[i - 1])))
            }
            _ => {
                self.index = 0;
                Some(Fragment::raw(close))
            }
        }
    }
}

impl FragmentSource for WorksheetEndXml<'_> {
    fn next_fragment(&mut self) -> Option<Fragment> {
        loop {
            let fragment = match self.next {
                EndSection::SheetDataEnd => {
                    self.next = EndSection::MergeCells;
                    Some(Fragment::raw("</sheetData>"))
                }
                EndSection::MergeCells => {
                    let merges = self.merges;
                    let count = merges.len();
                    let fragment = self.repeated(
                        merges,
                        || format!("<mergeCells count=\"{count}\">"),
                        |range| format!("<mergeCell ref=\"{range}\"/>"),
                        "</mergeCells>",
                    );
                    if self.index == 0 {
                        self.next = EndSection::Drawing;
                    }
                    fragment
                }
                EndSection::Drawing => {
                    self.next = EndSection::LegacyDrawing;
                    self.links
                        .drawing
                        .map(|id| Fragment::raw(format!("<drawing r:id=\"rId{id}\"/>")))
                }
                EndSection::LegacyDrawing => {
                    self.next = EndSection::TableParts;
                    self.links
                        .legacy_drawing
                        .map(|id| Fragment::raw(format!("<legacyDrawing r:id=\"rId{id}\"/>")))
                }
                EndSection::TableParts => {
                    let links = self.links;
                    let tables = links.tables.as_slice();
                    let count = tables.len();
                    let fragment = self.repeated(
                        tables,
                        || format!("<tableParts count=\"{count}\">"),
                        |id| format!("<tablePart r:id=\"rId{id}\"/>"),
                        "</tableParts>",
                    );
                    if self.index == 0 {
                        self.next = EndSection::Footer;
                    }
                    fragment
                }
                EndSection::Footer => {
                    self.next = EndSection::Done;
                    Some(Fragment::raw("</worksheet>"))
                }
                EndSection::Done => return None,
            };
            if fragment.is_some() {
                return fragment;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worksheet::ColumnOptions;
    use crate::writer::part::Fragments;
    use crate::writer::tests::render;

    #[test]
    fn test_plain_start() {
        let options = WorksheetOptions::default();
        let xml = render(&mut Fragments::new(WorksheetStartXml::new(&options)));
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.ends_with("relationships\"><sheetData>"));
        assert!(!xml.contains("<cols>"));
        assert!(!xml.contains("<sheetViews>"));
    }

    #[test]
    fn test_start_with_columns_and_panes() {
        let options = WorksheetOptions::new()
            .with_column(2, ColumnOptions::width(12.5))
            .with_column(4, ColumnOptions::hidden())
            .with_frozen_rows(1);
        let xml = render(&mut Fragments::new(WorksheetStartXml::new(&options)));
        assert!(xml.contains(
            "<pane ySplit=\"1\" topLeftCell=\"A2\" activePane=\"bottomLeft\" state=\"frozen\"/>"
        ));
        assert!(xml.contains(
            "<cols><col min=\"2\" max=\"2\" width=\"12.5\" customWidth=\"1\"/>\
             <col min=\"4\" max=\"4\" hidden=\"1\"/></cols><sheetData>"
        ));
    }

    #[test]
    fn test_end_sections() {
        let merges = [CellRange::parse("A1:B2").unwrap()];
        let links = WorksheetLinks {
            drawing: Some(1),
            legacy_drawing: Some(2),
            tables: vec![4, 5],
        };
        let xml = render(&mut Fragments::new(WorksheetEndXml::new(&merges, &links)));
        assert_eq!(
            xml,
            "</sheetData><mergeCells count=\"1\"><mergeCell ref=\"A1:B2\"/></mergeCells>\
             <drawing r:id=\"rId1\"/><legacyDrawing r:id=\"rId2\"/>\
             <tableParts count=\"2\"><tablePart r:id=\"rId4\"/><tablePart r:id=\"rId5\"/></tableParts>\
             </worksheet>"
        );
    }

    #[test]
    fn test_end_without_extras() {
        let links = WorksheetLinks::default();
        let xml = render(&mut Fragments::new(WorksheetEndXml::new(&[], &links)));
        assert_eq!(xml, "</sheetData></worksheet>");
    }
}
