//! # sheetstream
//!
//! A forward-only streaming XLSX writer.
//!
//! ## Features
//!
//! - **Constant Memory**: All XML passes through one fixed-size staging buffer;
//!   rows are written to the archive as soon as they are added
//! - **Any Sink**: Write to a file, to any `std::io::Write`, or to memory
//! - **Typed Cells**: Text, numbers, booleans, dates and formulas
//! - **Styles**: Fonts, fills, borders, alignment and number formats, deduplicated
//! - **Row Shapes**: Map your own types to rows with ordered, truncated columns
//! - **Extras**: Tables, notes, merged cells, embedded PNG/JPEG images and
//!   hidden worksheets
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sheetstream::{Spreadsheet, SpreadsheetOptions, Style};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut spreadsheet = Spreadsheet::create("output.xlsx", SpreadsheetOptions::default())?;
//! let header = spreadsheet.add_style(&Style::new().bold())?;
//!
//! spreadsheet.start_worksheet("People")?;
//! spreadsheet.add_row_with(["Name", "Age", "City"], sheetstream::RowOptions::default().with_style(header))?;
//! spreadsheet.add_row(("Alice", 30, "Oslo"))?;
//! spreadsheet.add_row(("Bob", 25, "Bergen"))?;
//! spreadsheet.finish()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Writing typed values with a row shape
//!
//! ```rust
//! use sheetstream::{ColumnMap, MemoryArchive, Spreadsheet, SpreadsheetOptions};
//!
//! struct Student {
//!     name: String,
//!     gpa: f64,
//! }
//!
//! # fn main() -> Result<(), sheetstream::SpreadsheetError> {
//! let shape = ColumnMap::new()
//!     .column("Name", |s: &Student| s.name.clone())
//!     .truncate(15)
//!     .column("Gpa", |s: &Student| s.gpa);
//! let students = vec![Student { name: "Ola".into(), gpa: 3.2 }];
//!
//! let mut spreadsheet = Spreadsheet::new(MemoryArchive::new(), SpreadsheetOptions::default());
//! spreadsheet.start_worksheet("Students")?;
//! spreadsheet.add_header_row(&shape, None)?;
//! spreadsheet.add_range_as_rows(&students, &shape)?;
//! spreadsheet.finish()?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod counter;
pub mod error;
pub mod image;
pub mod options;
pub(crate) mod parts;
pub mod shape;
pub mod spreadsheet;
pub mod style;
pub mod types;
pub mod worksheet;
pub mod writer;

pub use archive::{ArchiveSink, FileArchive, MemoryArchive, ZipArchiveWriter};
pub use counter::ResourceCounter;
pub use error::{Result, SpreadsheetError};
pub use image::{EmbeddedImage, ImageCanvas, ImageType};
pub use options::{
    BufferProfile, CancellationToken, DocumentProperties, SpreadsheetOptions, MIN_BUFFER_SIZE,
};
pub use parts::shared_strings::SharedStrings;
pub use shape::{ColumnMap, ColumnSpec, HeaderResolver, HeaderText, RowShape, ShapedCell};
pub use spreadsheet::{IntoCells, SessionState, Spreadsheet};
pub use style::{
    Alignment, Border, BorderEdge, BorderLineStyle, Color, Fill, Font, HorizontalAlignment,
    NumberFormat, Style, StyleId, VerticalAlignment,
};
pub use types::{
    column_name, Cell, CellRange, CellReference, CellValue, Formula, FormulaResult, RowOptions,
};
pub use worksheet::{
    ColumnOptions, Table, TableStyle, Visibility, WorksheetMetadata, WorksheetOptions,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_imports() {
        // Test that all public types are accessible
        let _ = std::marker::PhantomData::<SpreadsheetError>;
        let _ = std::marker::PhantomData::<Spreadsheet<MemoryArchive>>;
        let _ = std::marker::PhantomData::<ZipArchiveWriter<Vec<u8>>>;
        let _ = std::marker::PhantomData::<ColumnMap<str>>;
    }
}
