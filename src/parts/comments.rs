//! Notes: `xl/comments{n}.xml` and the VML drawing that shows them

use super::SPREADSHEET_NS;
use crate::types::CellReference;
use crate::writer::part::{Fragment, FragmentSource};
use crate::writer::XML_DECLARATION;

/// Each worksheet owns one block of 1024 note shape ids
pub(crate) const MAX_NOTES_PER_WORKSHEET: usize = 1023;

pub(crate) fn comments_path(number: u32) -> String {
    format!("xl/comments{number}.xml")
}

pub(crate) fn vml_path(number: u32) -> String {
    format!("xl/drawings/vmlDrawing{number}.vml")
}

/// A note attached to a cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Note {
    pub cell: CellReference,
    pub text: String,
}

pub(crate) struct CommentsXml<'a> {
    notes: &'a [Note],
    index: usize,
}

impl<'a> CommentsXml<'a> {
    pub(crate) fn new(notes: &'a [Note]) -> Self {
        CommentsXml { notes, index: 0 }
    }
}

impl FragmentSource for CommentsXml<'_> {
    fn next_fragment(&mut self) -> Option<Fragment> {
        let count = self.notes.len();
        let index = self.index;
        self.index += 1;
        match index {
            0 => Some(Fragment::raw(XML_DECLARATION).push(format!(
                "<comments xmlns=\"{SPREADSHEET_NS}\"><authors><author></author></authors><commentList>"
            ))),
            i if i <= count => {
                let note = &self.notes[i - 1];
                Some(
                    Fragment::raw(format!(
                        "<comment ref=\"{}\" authorId=\"0\"><text><r><t xml:space=\"preserve\">",
                        note.cell
                    ))
                    .text(note.text.clone())
                    .push("</t></r></text></comment>"),
                )
            }
            i if i == count + 1 => Some(Fragment::raw("</commentList></comments>")),
            _ => None,
        }
    }
}

const VML_START: &str = "<xml xmlns:v=\"urn:schemas-microsoft-com:vml\" \
xmlns:o=\"urn:schemas-microsoft-com:office:office\" \
xmlns:x=\"urn:schemas-microsoft-com:office:excel\">";

const VML_SHAPE_TYPE: &str = "<v:shapetype id=\"_x0000_t202\" coordsize=\"21600,21600\" o:spt=\"202\" \
path=\"m,l,21600r21600,l21600,xe\"><v:stroke joinstyle=\"miter\"/>\
<v:path gradientshapeok=\"t\" o:connecttype=\"rect\"/></v:shapetype>";

/// Legacy drawing with one hidden note box per note
pub(crate) struct VmlDrawingXml<'a> {
    notes: &'a [Note],
    number: u32,
    index: usize,
}

impl<'a> VmlDrawingXml<'a> {
    /// `number` is the worksheet's comments number, used to keep shape ids unique
    pub(crate) fn new(notes: &'a [Note], number: u32) -> Self {
        VmlDrawingXml {
            notes,
            number,
            index: 0,
        }
    }

    /// Split into pieces that each fit the smallest buffer
    fn shape(&self, position: usize, note: &Note) -> Fragment {
        let shape_id = self.number as usize * 1024 + position + 1;
        let column = note.cell.column - 1;
        let row = note.cell.row - 1;
        let anchor = format!(
            "{}, 15, {}, 10, {}, 15, {}, 4",
            column + 1,
            row.saturating_sub(1),
            column + 3,
            row + 3
        );
        Fragment::raw(format!(
            "<v:shape id=\"_x0000_s{shape_id}\" type=\"#_x0000_t202\" \
             style=\"position:absolute;margin-left:59.25pt;margin-top:1.5pt;width:108pt;height:59.25pt;\
             z-index:{};visibility:hidden\" fillcolor=\"#ffffe1\" o:insetmode=\"auto\">",
            position + 1
        ))
        .push(
            "<v:fill color2=\"#ffffe1\"/><v:shadow on=\"t\" color=\"black\" obscured=\"t\"/>\
             <v:path o:connecttype=\"none\"/><v:textbox style=\"mso-direction-alt:auto\">\
             <div style=\"text-align:left\"></div></v:textbox>",
        )
        .push(format!(
            "<x:ClientData ObjectType=\"Note\"><x:MoveWithCells/><x:SizeWithCells/>\
             <x:Anchor>{anchor}</x:Anchor><x:AutoFill>False</x:AutoFill>\
             <x:Row>{row}</x:Row><x:Column>{column}</x:Column></x:ClientData></v:shape>"
        ))
    }
}

impl FragmentSource for VmlDrawingXml<'_> {
    fn next_fragment(&mut self) -> Option<Fragment> {
        let count = self.notes.len();
        let index = self.index;
        self.index += 1;
        match index {
            0 => Some(Fragment::raw(VML_START).push(format!(
                "<o:shapelayout v:ext=\"edit\"><o:idmap v:ext=\"edit\" data=\"{}\"/></o:shapelayout>{VML_SHAPE_TYPE}",
                self.number
            ))),
            i if i <= count => Some(self.shape(i - 1, &self.notes[i - 1])),
            i if i == count + 1 => Some(Fragment::raw("</xml>")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::part::Fragments;
    use crate::writer::tests::render;

    fn notes() -> Vec<Note> {
        vec![
            Note {
                cell: CellReference::parse("B3").unwrap(),
                text: "Check <this>".to_string(),
            },
            Note {
                cell: CellReference::parse("A1").unwrap(),
                text: "Second".to_string(),
            },
        ]
    }

    #[test]
    fn test_comments_xml() {
        let notes = notes();
        let xml = render(&mut Fragments::new(CommentsXml::new(&notes)));
        assert!(xml.contains(
            "<comment ref=\"B3\" authorId=\"0\"><text><r><t xml:space=\"preserve\">Check &lt;this&gt;</t></r></text></comment>"
        ));
        assert!(xml.ends_with("</commentList></comments>"));
    }

    #[test]
    fn test_vml_drawing() {
        let notes = notes();
        let xml = render(&mut Fragments::new(VmlDrawingXml::new(&notes, 2)));
        assert!(xml.contains("<o:idmap v:ext=\"edit\" data=\"2\"/>"));
        assert!(xml.contains("id=\"_x0000_s2049\""));
        assert!(xml.contains("id=\"_x0000_s2050\""));
        assert!(xml.contains("<x:Anchor>2, 15, 1, 10, 4, 15, 5, 4</x:Anchor>"));
        assert!(xml.contains("<x:Row>2</x:Row><x:Column>1</x:Column>"));
        assert_eq!(xml.matches("<v:shape ").count(), 2);
        assert!(xml.ends_with("</xml>"));
    }
}
