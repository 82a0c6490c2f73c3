//! Resumable writer for one `<row>` element

use super::buffer::SpreadsheetBuffer;
use super::part::{PartWriter, Step};
use super::value::{format_number, needs_space_preserve, try_write_escaped, Chunk};
use crate::style::StyleId;
use crate::types::FormulaResult;

/// Cell content after truncation, style resolution and date conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum CellContent<'a> {
    Empty,
    InlineText(&'a str),
    SharedText(u32),
    Integer(i64),
    Number(f64),
    Bool(bool),
    Formula {
        expression: &'a str,
        cached: Option<&'a FormulaResult>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RowCell<'a> {
    pub column: u32,
    pub style: Option<StyleId>,
    pub content: CellContent<'a>,
}

/// Next thing a cell has to emit
enum Emit<'a> {
    /// Markup placed in the chunk
    Markup,
    Text(&'a str),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    Cells,
    Close,
    Done,
}

/// Writes `<row r="N" ...>` followed by each cell and `</row>`.
///
/// Each cell is split into at most five pieces (start tag, text, separator,
/// cached text, end tag) and the writer keeps the cell index, the piece
/// index and the offset inside a text piece between calls.
pub(crate) struct RowXml<'r, 'a> {
    number: u32,
    height: Option<f64>,
    style: Option<StyleId>,
    cells: &'r [RowCell<'a>],
    phase: Phase,
    cell: usize,
    piece: u8,
    text_offset: usize,
    chunk: Chunk,
    numbers: ryu::Buffer,
}

impl<'r, 'a> RowXml<'r, 'a> {
    pub(crate) fn new(
        number: u32,
        height: Option<f64>,
        style: Option<StyleId>,
        cells: &'r [RowCell<'a>],
    ) -> Self {
        RowXml {
            number,
            height,
            style,
            cells,
            phase: Phase::Open,
            cell: 0,
            piece: 0,
            text_offset: 0,
            chunk: Chunk::new(),
            numbers: ryu::Buffer::new(),
        }
    }

    fn open_tag(&mut self) {
        let chunk = &mut self.chunk;
        chunk.clear();
        chunk.push(b"<row r=\"").push_u32(self.number).push(b"\"");
        if let Some(style) = self.style.filter(|s| !s.is_default()) {
            chunk
                .push(b" s=\"")
                .push_u32(style.0)
                .push(b"\" customFormat=\"1\"");
        }
        if let Some(height) = self.height {
            chunk
                .push(b" ht=\"")
                .push(format_number(height, &mut self.numbers).as_bytes())
                .push(b"\" customHeight=\"1\"");
        }
        chunk.push(b">");
    }

    /// `<c r="B3" s="2"` plus an optional type attribute, without the closing `>`
    fn cell_start(chunk: &mut Chunk, row: u32, cell: &RowCell<'_>, kind: Option<&str>) {
        chunk.clear();
        chunk
            .push(b"<c r=\"")
            .push_cell_ref(cell.column, row)
            .push(b"\"");
        if let Some(style) = cell.style.filter(|s| !s.is_default()) {
            chunk.push(b" s=\"").push_u32(style.0).push(b"\"");
        }
        if let Some(kind) = kind {
            chunk.push(b" t=\"").push(kind.as_bytes()).push(b"\"");
        }
    }

    /// Piece `piece` of the current cell
    fn cell_piece(&mut self, piece: u8) -> Emit<'a> {
        let cell = self.cells[self.cell];
        let row = self.number;
        let chunk = &mut self.chunk;
        let start = |chunk: &mut Chunk, kind: Option<&str>| Self::cell_start(chunk, row, &cell, kind);

        match (cell.content, piece) {
            (CellContent::Empty, 0) => {
                start(chunk, None);
                chunk.push(b"/>");
                Emit::Markup
            }
            (CellContent::Integer(value), 0) => {
                start(chunk, None);
                let mut digits = itoa::Buffer::new();
                chunk
                    .push(b"><v>")
                    .push(digits.format(value).as_bytes())
                    .push(b"</v></c>");
                Emit::Markup
            }
            (CellContent::Number(value), 0) if value.is_finite() => {
                start(chunk, None);
                chunk
                    .push(b"><v>")
                    .push(format_number(value, &mut self.numbers).as_bytes())
                    .push(b"</v></c>");
                Emit::Markup
            }
            (CellContent::Number(_), 0) => {
                start(chunk, Some("e"));
                chunk.push(b"><v>#NUM!</v></c>");
                Emit::Markup
            }
            (CellContent::Bool(value), 0) => {
                start(chunk, Some("b"));
                chunk.push(if value { b"><v>1</v></c>" } else { b"><v>0</v></c>" });
                Emit::Markup
            }
            (CellContent::SharedText(index), 0) => {
                start(chunk, Some("s"));
                chunk.push(b"><v>").push_u32(index).push(b"</v></c>");
                Emit::Markup
            }
            (CellContent::InlineText(text), 0) => {
                start(chunk, Some("inlineStr"));
                if needs_space_preserve(text) {
                    chunk.push(b"><is><t xml:space=\"preserve\">");
                } else {
                    chunk.push(b"><is><t>");
                }
                Emit::Markup
            }
            (CellContent::InlineText(text), 1) => Emit::Text(text),
            (CellContent::InlineText(_), 2) => {
                chunk.clear();
                chunk.push(b"</t></is></c>");
                Emit::Markup
            }
            (CellContent::Formula { cached, .. }, 0) => {
                let kind = match cached {
                    Some(FormulaResult::Text(_)) => Some("str"),
                    Some(FormulaResult::Bool(_)) => Some("b"),
                    Some(FormulaResult::Number(n)) if !n.is_finite() => Some("e"),
                    _ => None,
                };
                start(chunk, kind);
                chunk.push(b"><f>");
                Emit::Markup
            }
            (CellContent::Formula { expression, .. }, 1) => Emit::Text(expression),
            (CellContent::Formula { cached, .. }, 2) => {
                chunk.clear();
                match cached {
                    None => {
                        chunk.push(b"</f></c>");
                    }
                    Some(FormulaResult::Text(_)) => {
                        chunk.push(b"</f><v>");
                    }
                    Some(FormulaResult::Integer(value)) => {
                        let mut digits = itoa::Buffer::new();
                        chunk
                            .push(b"</f><v>")
                            .push(digits.format(*value).as_bytes())
                            .push(b"</v></c>");
                    }
                    Some(FormulaResult::Number(value)) if value.is_finite() => {
                        chunk
                            .push(b"</f><v>")
                            .push(format_number(*value, &mut self.numbers).as_bytes())
                            .push(b"</v></c>");
                    }
                    Some(FormulaResult::Number(_)) => {
                        chunk.push(b"</f><v>#NUM!</v></c>");
                    }
                    Some(FormulaResult::Bool(value)) => {
                        chunk.push(if *value { b"</f><v>1</v></c>" } else { b"</f><v>0</v></c>" });
                    }
                }
                Emit::Markup
            }
            (
                CellContent::Formula {
                    cached: Some(FormulaResult::Text(text)),
                    ..
                },
                3,
            ) => Emit::Text(text),
            (
                CellContent::Formula {
                    cached: Some(FormulaResult::Text(_)),
                    ..
                },
                4,
            ) => {
                chunk.clear();
                chunk.push(b"</v></c>");
                Emit::Markup
            }
            _ => Emit::End,
        }
    }
}

impl PartWriter for RowXml<'_, '_> {
    fn advance(&mut self, buffer: &mut SpreadsheetBuffer) -> Step {
        match self.phase {
            Phase::Open => {
                self.open_tag();
                if !buffer.try_write(self.chunk.as_bytes()) {
                    return Step::Blocked;
                }
                self.phase = Phase::Cells;
                Step::Wrote
            }
            Phase::Cells => {
                if self.cell >= self.cells.len() {
                    self.phase = Phase::Close;
                    return Step::Wrote;
                }
                let written = match self.cell_piece(self.piece) {
                    Emit::Markup => buffer.try_write(self.chunk.as_bytes()),
                    Emit::Text(text) => try_write_escaped(buffer, text, &mut self.text_offset),
                    Emit::End => {
                        self.cell += 1;
                        self.piece = 0;
                        return Step::Wrote;
                    }
                };
                if !written {
                    return Step::Blocked;
                }
                self.piece += 1;
                self.text_offset = 0;
                Step::Wrote
            }
            Phase::Close => {
                if !buffer.try_write(b"</row>") {
                    return Step::Blocked;
                }
                self.phase = Phase::Done;
                Step::Wrote
            }
            Phase::Done => Step::Done,
        }
    }
}
