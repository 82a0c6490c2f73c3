//! Type definitions for cell data

use crate::error::{Result, SpreadsheetError};
use crate::style::StyleId;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// Highest column number a worksheet can hold (XFD)
pub const MAX_COLUMNS: u32 = 16_384;

/// Highest row number a worksheet can hold
pub const MAX_ROWS: u32 = 1_048_576;

/// Represents a single cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell
    #[default]
    Empty,
    /// Text value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Date and time, written as a serial date
    DateTime(NaiveDateTime),
    /// Formula with an optional cached result
    Formula(Formula),
}

impl CellValue {
    /// Check if cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text content, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A formula such as `SUM(A1:A10)`.
///
/// A single leading `=` is accepted and dropped when written.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    pub text: String,
    pub cached: Option<FormulaResult>,
}

impl Formula {
    pub fn new(text: impl Into<String>) -> Self {
        Formula {
            text: text.into(),
            cached: None,
        }
    }

    /// Attach the value the formula evaluates to, shown before recalculation.
    pub fn with_cached(mut self, result: FormulaResult) -> Self {
        self.cached = Some(result);
        self
    }

    pub(crate) fn expression(&self) -> &str {
        self.text.strip_prefix('=').unwrap_or(&self.text)
    }
}

/// Cached result of a formula
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaResult {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
}

/// A cell value together with an optional style
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub value: CellValue,
    pub style: Option<StyleId>,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Cell {
            value: value.into(),
            style: None,
        }
    }

    pub fn styled(value: impl Into<CellValue>, style: StyleId) -> Self {
        Cell {
            value: value.into(),
            style: Some(style),
        }
    }
}

impl From<CellValue> for Cell {
    fn from(value: CellValue) -> Self {
        Cell { value, style: None }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => |$v:ident| $conv:expr;)*) => {
        $(
            impl From<$ty> for CellValue {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }

            impl From<$ty> for Cell {
                fn from(value: $ty) -> Self {
                    Cell::new(CellValue::from(value))
                }
            }
        )*
    };
}

impl_value_from! {
    &str => |s| CellValue::Text(s.to_string());
    String => |s| CellValue::Text(s);
    &String => |s| CellValue::Text(s.clone());
    i64 => |i| CellValue::Integer(i);
    i32 => |i| CellValue::Integer(i64::from(i));
    u32 => |i| CellValue::Integer(i64::from(i));
    f64 => |f| CellValue::Number(f);
    f32 => |f| CellValue::Number(f64::from(f));
    bool => |b| CellValue::Bool(b);
    NaiveDateTime => |dt| CellValue::DateTime(dt);
    NaiveDate => |d| CellValue::DateTime(d.and_time(chrono::NaiveTime::MIN));
    Formula => |f| CellValue::Formula(f);
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// Options applied to a single row
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowOptions {
    /// Row height in points
    pub height: Option<f64>,
    /// Style for the row; cells without their own style use it
    pub style: Option<StyleId>,
}

impl RowOptions {
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_style(mut self, style: StyleId) -> Self {
        self.style = Some(style);
        self
    }
}

/// A 1-based cell position such as `B3` (column 2, row 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellReference {
    pub column: u32,
    pub row: u32,
}

impl CellReference {
    pub fn new(column: u32, row: u32) -> Result<Self> {
        if column == 0 || column > MAX_COLUMNS || row == 0 || row > MAX_ROWS {
            return Err(SpreadsheetError::InvalidCell(format!(
                "column {column}, row {row}"
            )));
        }
        Ok(CellReference { column, row })
    }

    /// Parse an A1-style reference. `$` markers are accepted and ignored.
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = || SpreadsheetError::InvalidCell(reference.to_string());
        let trimmed: String = reference.chars().filter(|&c| c != '$').collect();
        let split = trimmed
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = trimmed.split_at(split);
        if letters.is_empty() || letters.len() > 3 {
            return Err(invalid());
        }

        let mut column: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(invalid());
            }
            column = column * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        }
        if digits.starts_with('0') || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        CellReference::new(column, row).map_err(|_| invalid())
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.column), self.row)
    }
}

/// A rectangular range such as `A1:C4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellReference,
    pub end: CellReference,
}

impl CellRange {
    pub fn parse(range: &str) -> Result<Self> {
        let (first, last) = range
            .split_once(':')
            .ok_or_else(|| SpreadsheetError::InvalidCell(range.to_string()))?;
        let start = CellReference::parse(first)?;
        let end = CellReference::parse(last)?;
        if end.column < start.column || end.row < start.row {
            return Err(SpreadsheetError::InvalidCell(range.to_string()));
        }
        Ok(CellRange { start, end })
    }

    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.start.column <= other.end.column
            && other.start.column <= self.end.column
            && self.start.row <= other.end.row
            && other.start.row <= self.end.row
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Convert a 1-based column number to letters (1 -> A, 27 -> AA)
pub fn column_name(column: u32) -> String {
    let mut letters = [0u8; 3];
    let len = write_column_letters(column, &mut letters);
    String::from_utf8_lossy(&letters[..len]).into_owned()
}

/// Write the column letters for `column` into `out`, returning the length.
pub(crate) fn write_column_letters(mut column: u32, out: &mut [u8; 3]) -> usize {
    let mut tmp = [0u8; 3];
    let mut len = 0;
    while column > 0 && len < tmp.len() {
        let rem = (column - 1) % 26;
        tmp[len] = b'A' + rem as u8;
        len += 1;
        column = (column - 1) / 26;
    }
    for i in 0..len {
        out[i] = tmp[len - 1 - i];
    }
    len
}
