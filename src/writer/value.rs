//! Locale-independent value formatting and XML escaping

use super::buffer::SpreadsheetBuffer;
use crate::types::write_column_letters;
use chrono::{NaiveDate, NaiveDateTime};

#[inline]
fn needs_escape(byte: u8) -> bool {
    matches!(byte, b'&' | b'<' | b'>' | b'"') || (byte < 0x20 && !matches!(byte, b'\t' | b'\n' | b'\r'))
}

/// Write `text[*offset..]` XML-escaped, resuming from `offset`.
///
/// Escapes and multi-byte characters are appended whole. When the buffer
/// fills up, `offset` is left at the first byte not yet written and `false`
/// is returned; calling again after a flush continues from there.
pub(crate) fn try_write_escaped(
    buffer: &mut SpreadsheetBuffer,
    text: &str,
    offset: &mut usize,
) -> bool {
    let bytes = text.as_bytes();
    while *offset < bytes.len() {
        let rest = &bytes[*offset..];
        let run = rest
            .iter()
            .position(|&b| needs_escape(b))
            .unwrap_or(rest.len());

        if run > 0 {
            let mut take = run.min(buffer.remaining());
            while !text.is_char_boundary(*offset + take) {
                take -= 1;
            }
            if take == 0 {
                return false;
            }
            buffer.try_write(&rest[..take]);
            *offset += take;
            continue;
        }

        let written = match rest[0] {
            b'&' => buffer.try_write(b"&amp;"),
            b'<' => buffer.try_write(b"&lt;"),
            b'>' => buffer.try_write(b"&gt;"),
            b'"' => buffer.try_write(b"&quot;"),
            control => {
                let mut digits = itoa::Buffer::new();
                buffer.try_write_all(&[b"&#", digits.format(control).as_bytes(), b";"])
            }
        };
        if !written {
            return false;
        }
        *offset += 1;
    }
    true
}

/// Clip `text` to at most `limit` UTF-16 code units.
///
/// A surrogate pair straddling the limit is dropped whole.
pub fn clip_utf16(text: &str, limit: usize) -> &str {
    // Every UTF-16 unit needs at least one UTF-8 byte.
    if text.len() <= limit {
        return text;
    }
    let mut units = 0;
    for (index, c) in text.char_indices() {
        units += c.len_utf16();
        if units > limit {
            return &text[..index];
        }
    }
    text
}

/// Whether text needs `xml:space="preserve"` to keep its outer whitespace
pub(crate) fn needs_space_preserve(text: &str) -> bool {
    let first = text.chars().next();
    let last = text.chars().next_back();
    [first, last]
        .into_iter()
        .flatten()
        .any(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

/// Shortest round-trip decimal text for a finite float, without a trailing `.0`
pub(crate) fn format_number(value: f64, buffer: &mut ryu::Buffer) -> &str {
    if value == 0.0 {
        return "0";
    }
    let text = buffer.format_finite(value);
    text.strip_suffix(".0").unwrap_or(text)
}

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Serial day number for a date-time, counted from 1899-12-30.
///
/// Day 60 is the fictional 1900-02-29, so serials from 1900-03-01 on match
/// what spreadsheet applications expect.
pub fn serial_date(value: NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_time(chrono::NaiveTime::MIN);
    let millis = (value - epoch).num_milliseconds();
    millis as f64 / MILLIS_PER_DAY
}

/// Small fixed-size scratch space for one atomic chunk of XML
pub(crate) struct Chunk {
    bytes: [u8; 192],
    len: usize,
}

impl Chunk {
    pub(crate) fn new() -> Self {
        Chunk {
            bytes: [0u8; 192],
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, data: &[u8]) -> &mut Self {
        let end = self.len + data.len();
        self.bytes[self.len..end].copy_from_slice(data);
        self.len = end;
        self
    }

    #[inline]
    pub(crate) fn push_u32(&mut self, value: u32) -> &mut Self {
        let mut digits = itoa::Buffer::new();
        self.push(digits.format(value).as_bytes())
    }

    /// Push an A1 reference such as `AB12`
    pub(crate) fn push_cell_ref(&mut self, column: u32, row: u32) -> &mut Self {
        let mut letters = [0u8; 3];
        let n = write_column_letters(column, &mut letters);
        self.push(&letters[..n]).push_u32(row)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub(crate) fn clear(&mut self) {
        self.len = 0;
    }
}
