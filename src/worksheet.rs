//! Worksheet configuration, metadata and tables

use crate::error::{Result, SpreadsheetError};
use crate::shape::RowShape;
use crate::types::MAX_COLUMNS;

/// Longest worksheet name accepted by spreadsheet applications
pub const MAX_WORKSHEET_NAME_LENGTH: usize = 31;

/// Worksheet tab visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    /// Hidden and not listed in the unhide dialog
    VeryHidden,
}

impl Visibility {
    pub(crate) fn state(&self) -> Option<&'static str> {
        match self {
            Visibility::Visible => None,
            Visibility::Hidden => Some("hidden"),
            Visibility::VeryHidden => Some("veryHidden"),
        }
    }
}

/// Width and visibility for one column
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColumnOptions {
    /// Width in characters
    pub width: Option<f64>,
    pub hidden: bool,
}

impl ColumnOptions {
    pub fn width(width: f64) -> Self {
        ColumnOptions {
            width: Some(width),
            hidden: false,
        }
    }

    pub fn hidden() -> Self {
        ColumnOptions {
            width: None,
            hidden: true,
        }
    }

    pub(crate) fn is_default(&self) -> bool {
        self.width.is_none() && !self.hidden
    }
}

/// Options for a worksheet, fixed when it is started
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorksheetOptions {
    /// Column options, index 0 is column A
    pub columns: Vec<ColumnOptions>,
    pub frozen_columns: u32,
    pub frozen_rows: u32,
    pub visibility: Visibility,
}

impl WorksheetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take column widths from a row shape
    pub fn from_shape<T: ?Sized, S: RowShape<T> + ?Sized>(shape: &S) -> Self {
        let mut options = Self::default();
        for (index, column) in shape.columns().iter().enumerate() {
            if let Some(width) = column.width {
                options = options.with_column(index as u32 + 1, ColumnOptions::width(width));
            }
        }
        options
    }

    /// Set options for a 1-based column
    pub fn with_column(mut self, column: u32, options: ColumnOptions) -> Self {
        let index = column.saturating_sub(1) as usize;
        if self.columns.len() <= index {
            self.columns.resize(index + 1, ColumnOptions::default());
        }
        self.columns[index] = options;
        self
    }

    pub fn with_frozen_columns(mut self, columns: u32) -> Self {
        self.frozen_columns = columns;
        self
    }

    pub fn with_frozen_rows(mut self, rows: u32) -> Self {
        self.frozen_rows = rows;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.columns.len() > MAX_COLUMNS as usize {
            return Err(SpreadsheetError::invalid_argument(
                "columns",
                format!("at most {MAX_COLUMNS} columns can be configured"),
            ));
        }
        for column in &self.columns {
            if let Some(width) = column.width {
                if !(0.0..=255.0).contains(&width) {
                    return Err(SpreadsheetError::invalid_argument(
                        "width",
                        format!("column width {width} is outside 0-255"),
                    ));
                }
            }
        }
        if self.frozen_columns >= MAX_COLUMNS {
            return Err(SpreadsheetError::invalid_argument(
                "frozen_columns",
                "must leave at least one unfrozen column",
            ));
        }
        if self.frozen_rows >= crate::types::MAX_ROWS {
            return Err(SpreadsheetError::invalid_argument(
                "frozen_rows",
                "must leave at least one unfrozen row",
            ));
        }
        Ok(())
    }
}

/// Check a worksheet name against the rules spreadsheet applications enforce
pub(crate) fn validate_worksheet_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Err(SpreadsheetError::invalid_argument("name", reason));
    let length = name.chars().count();
    if length == 0 {
        return invalid("worksheet name must not be empty");
    }
    if length > MAX_WORKSHEET_NAME_LENGTH {
        return invalid("worksheet name must be at most 31 characters");
    }
    if name.contains(['[', ']', ':', '*', '?', '/', '\\']) {
        return invalid("worksheet name must not contain [ ] : * ? / \\");
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return invalid("worksheet name must not start or end with an apostrophe");
    }
    if name.chars().any(char::is_control) {
        return invalid("worksheet name must not contain control characters");
    }
    Ok(())
}

/// What the session remembers about a worksheet after it is closed
#[derive(Debug, Clone, PartialEq)]
pub struct WorksheetMetadata {
    pub name: String,
    /// Archive path, e.g. `xl/worksheets/sheet1.xml`
    pub path: String,
    pub visibility: Visibility,
    pub has_notes: bool,
    pub has_images: bool,
    pub table_count: usize,
}

impl WorksheetMetadata {
    pub(crate) fn new(name: String, index: usize, visibility: Visibility) -> Self {
        WorksheetMetadata {
            name,
            path: format!("xl/worksheets/sheet{}.xml", index),
            visibility,
            has_notes: false,
            has_images: false,
            table_count: 0,
        }
    }
}

/// Built-in table style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    None,
    Light(u8),
    Medium(u8),
    Dark(u8),
}

impl Default for TableStyle {
    fn default() -> Self {
        TableStyle::Medium(2)
    }
}

impl TableStyle {
    pub(crate) fn name(&self) -> Option<String> {
        match self {
            TableStyle::None => None,
            TableStyle::Light(n) => Some(format!("TableStyleLight{n}")),
            TableStyle::Medium(n) => Some(format!("TableStyleMedium{n}")),
            TableStyle::Dark(n) => Some(format!("TableStyleDark{n}")),
        }
    }

    fn validate(&self) -> Result<()> {
        let (max, n) = match *self {
            TableStyle::None => return Ok(()),
            TableStyle::Light(n) => (21, n),
            TableStyle::Medium(n) => (28, n),
            TableStyle::Dark(n) => (11, n),
        };
        if n == 0 || n > max {
            return Err(SpreadsheetError::invalid_argument(
                "style",
                format!("table style number {n} is outside 1-{max}"),
            ));
        }
        Ok(())
    }
}

/// A table started at the next written row
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Workbook-unique name; generated as `Table{id}` when absent
    pub name: Option<String>,
    pub style: TableStyle,
    /// 1-based first column
    pub first_column: u32,
    /// Column count; defaults to the width of the header row
    pub number_of_columns: Option<u32>,
    pub show_row_stripes: bool,
}

impl Default for Table {
    fn default() -> Self {
        Table::new(TableStyle::default())
    }
}

impl Table {
    pub fn new(style: TableStyle) -> Self {
        Table {
            name: None,
            style,
            first_column: 1,
            number_of_columns: None,
            show_row_stripes: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_first_column(mut self, column: u32) -> Self {
        self.first_column = column;
        self
    }

    pub fn with_number_of_columns(mut self, columns: u32) -> Self {
        self.number_of_columns = Some(columns);
        self
    }

    pub fn with_row_stripes(mut self, show: bool) -> Self {
        self.show_row_stripes = show;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.style.validate()?;
        if self.first_column == 0 || self.first_column > MAX_COLUMNS {
            return Err(SpreadsheetError::invalid_argument(
                "first_column",
                format!("must be between 1 and {MAX_COLUMNS}"),
            ));
        }
        if let Some(count) = self.number_of_columns {
            if count == 0 || self.first_column + count - 1 > MAX_COLUMNS {
                return Err(SpreadsheetError::invalid_argument(
                    "number_of_columns",
                    "table must fit inside the worksheet",
                ));
            }
        }
        if let Some(name) = &self.name {
            validate_table_name(name)?;
        }
        Ok(())
    }
}

/// Table names start with a letter, `_` or `\`, contain no spaces and must not
/// look like a cell reference.
fn validate_table_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Err(SpreadsheetError::invalid_argument("name", reason));
    let mut chars = name.chars();
    match chars.next() {
        None => return invalid("table name must not be empty"),
        Some(c) if !(c.is_alphabetic() || c == '_' || c == '\\') => {
            return invalid("table name must start with a letter, underscore or backslash")
        }
        _ => {}
    }
    if name.chars().count() > 255 {
        return invalid("table name must be at most 255 characters");
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '\\') {
        return invalid("table name may only contain letters, digits, '_', '.' and '\\'");
    }
    if matches!(name, "C" | "c" | "R" | "r") || crate::types::CellReference::parse(name).is_ok() {
        return invalid("table name must not be a cell reference");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worksheet_names() {
        assert!(validate_worksheet_name("Sheet 1").is_ok());
        assert!(validate_worksheet_name("").is_err());
        assert!(validate_worksheet_name(&"x".repeat(32)).is_err());
        assert!(validate_worksheet_name(&"ø".repeat(31)).is_ok());
        assert!(validate_worksheet_name("a/b").is_err());
        assert!(validate_worksheet_name("'quoted").is_err());
        assert!(validate_worksheet_name("it's").is_ok());
    }

    #[test]
    fn test_column_options() {
        let options = WorksheetOptions::new()
            .with_column(3, ColumnOptions::width(20.0))
            .with_column(1, ColumnOptions::hidden());
        assert_eq!(options.columns.len(), 3);
        assert!(options.columns[0].hidden);
        assert!(options.columns[1].is_default());
        assert_eq!(options.columns[2].width, Some(20.0));
        assert!(options.validate().is_ok());

        let too_wide = WorksheetOptions::new().with_column(1, ColumnOptions::width(300.0));
        assert!(too_wide.validate().is_err());
    }

    #[test]
    fn test_table_validation() {
        assert!(Table::new(TableStyle::Medium(2)).with_name("Sales_2024").validate().is_ok());
        assert!(Table::new(TableStyle::Medium(2)).with_name("A1").validate().is_err());
        assert!(Table::new(TableStyle::Medium(2)).with_name("has space").validate().is_err());
        assert!(Table::new(TableStyle::Light(30)).validate().is_err());
        assert!(Table::new(TableStyle::None).with_first_column(0).validate().is_err());
        assert_eq!(TableStyle::default().name().as_deref(), Some("TableStyleMedium2"));
    }
}
