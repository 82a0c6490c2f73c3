//! Helpers for reading produced workbooks back

#![allow(dead_code)]

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

/// One `<c>` element: its reference and the text of its `<t>`/`<v>` children
#[derive(Debug, Clone, PartialEq)]
pub struct SheetCell {
    pub reference: String,
    pub value: String,
}

/// Read one entry of a zip archive as text
pub fn read_entry(archive: &[u8], name: &str) -> String {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).expect("valid zip archive");
    let mut entry = zip.by_name(name).unwrap_or_else(|_| panic!("missing entry {name}"));
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}

/// Names of every entry in a zip archive, in archive order
pub fn entry_names(archive: &[u8]) -> Vec<String> {
    let zip = zip::ZipArchive::new(Cursor::new(archive)).expect("valid zip archive");
    zip.file_names().map(str::to_string).collect::<Vec<_>>()
}

/// Rows of a worksheet part, one vector of cells per `<row>`
pub fn worksheet_rows(xml: &str) -> Vec<Vec<SheetCell>> {
    let mut reader = Reader::from_str(xml);
    let mut rows: Vec<Vec<SheetCell>> = Vec::new();
    let mut in_value = false;

    loop {
        match reader.read_event().expect("well-formed worksheet XML") {
            Event::Start(e) if e.name().as_ref() == b"row" => rows.push(Vec::new()),
            Event::Empty(e) if e.name().as_ref() == b"row" => rows.push(Vec::new()),
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"c" => {
                let reference = e
                    .try_get_attribute("r")
                    .unwrap()
                    .expect("cell reference")
                    .unescape_value()
                    .unwrap()
                    .into_owned();
                if let Some(row) = rows.last_mut() {
                    row.push(SheetCell {
                        reference,
                        value: String::new(),
                    });
                }
            }
            Event::Start(e) if matches!(e.name().as_ref(), b"t" | b"v") => in_value = true,
            Event::End(e) if matches!(e.name().as_ref(), b"t" | b"v") => in_value = false,
            Event::Text(text) if in_value => {
                let text = text.unescape().unwrap();
                if let Some(cell) = rows.last_mut().and_then(|row| row.last_mut()) {
                    cell.value.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    rows
}

/// Values of a row, in column order
pub fn values(row: &[SheetCell]) -> Vec<&str> {
    row.iter().map(|cell| cell.value.as_str()).collect()
}

/// Parse a whole part, failing on malformed XML
pub fn assert_well_formed(xml: &str) {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => panic!("malformed XML at {}: {err}", reader.buffer_position()),
        }
    }
}
