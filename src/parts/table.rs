//! `xl/tables/table{id}.xml`

use super::SPREADSHEET_NS;
use crate::types::CellRange;
use crate::worksheet::TableStyle;
use crate::writer::part::{Fragment, FragmentSource};
use crate::writer::XML_DECLARATION;

pub(crate) fn path(id: u32) -> String {
    format!("xl/tables/table{id}.xml")
}

/// A finished table, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TableDefinition {
    pub id: u32,
    pub name: String,
    pub style: TableStyle,
    pub show_row_stripes: bool,
    /// Header row included
    pub range: CellRange,
    /// Unique, non-empty header names; one per column of `range`
    pub columns: Vec<String>,
}

pub(crate) struct TableXml<'a> {
    table: &'a TableDefinition,
    index: usize,
}

impl<'a> TableXml<'a> {
    pub(crate) fn new(table: &'a TableDefinition) -> Self {
        TableXml { table, index: 0 }
    }
}

impl FragmentSource for TableXml<'_> {
    fn next_fragment(&mut self) -> Option<Fragment> {
        let table = self.table;
        let count = table.columns.len();
        let index = self.index;
        self.index += 1;
        match index {
            0 => Some(
                Fragment::raw(XML_DECLARATION)
                    .push(format!(
                        "<table xmlns=\"{SPREADSHEET_NS}\" id=\"{}\" name=\"",
                        table.id
                    ))
                    .text(table.name.clone())
                    .push("\" displayName=\"")
                    .text(table.name.clone())
                    .push(format!(
                        "\" ref=\"{range}\" totalsRowShown=\"0\"><autoFilter ref=\"{range}\"/>\
                         <tableColumns count=\"{count}\">",
                        range = table.range
                    )),
            ),
            i if i <= count => Some(
                Fragment::raw(format!("<tableColumn id=\"{i}\" name=\""))
                    .text(table.columns[i - 1].clone())
                    .push("\"/>"),
            ),
            i if i == count + 1 => {
                let mut info = String::from("</tableColumns><tableStyleInfo");
                if let Some(name) = table.style.name() {
                    info.push_str(&format!(" name=\"{name}\""));
                }
                info.push_str(&format!(
                    " showFirstColumn=\"0\" showLastColumn=\"0\" showRowStripes=\"{}\" \
                     showColumnStripes=\"0\"/></table>",
                    u8::from(table.show_row_stripes)
                ));
                Some(Fragment::raw(info))
            }
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
    fn test_table_xml() {
        let table = TableDefinition {
            id: 3,
            name: "Students".to_string(),
            style: TableStyle::Light(9),
            show_row_stripes: true,
            range: CellRange::parse("B2:D5").unwrap(),
            columns: vec!["Name".into(), "R&D".into(), "Column3".into()],
        };
        let xml = render(&mut Fragments::new(TableXml::new(&table)));
        assert!(xml.contains(
            "id=\"3\" name=\"Students\" displayName=\"Students\" ref=\"B2:D5\" totalsRowShown=\"0\">\
             <autoFilter ref=\"B2:D5\"/><tableColumns count=\"3\">"
        ));
        assert!(xml.contains("<tableColumn id=\"2\" name=\"R&amp;D\"/>"));
        assert!(xml.ends_with(
            "</tableColumns><tableStyleInfo name=\"TableStyleLight9\" showFirstColumn=\"0\" \
             showLastColumn=\"0\" showRowStripes=\"1\" showColumnStripes=\"0\"/></table>"
        ));
    }

    #[test]
    fn test_table_without_style() {
        let table = TableDefinition {
            id: 1,
            name: "Table1".to_string(),
            style: TableStyle::None,
            show_row_stripes: false,
            range: CellRange::parse("A1:A2").unwrap(),
            columns: vec!["Column1".into()],
        };
        let xml = render(&mut Fragments::new(TableXml::new(&table)));
        assert!(xml.contains("<tableStyleInfo showFirstColumn=\"0\""));
        assert!(xml.contains("showRowStripes=\"0\""));
    }
}
