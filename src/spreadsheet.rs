//! The spreadsheet session
//!
//! A [`Spreadsheet`] owns the staging buffer, the style registry and the
//! archive sink. Worksheets are written one at a time: rows go straight to the
//! sink as they are added, and the parts that describe the whole package are
//! written by [`Spreadsheet::finish`].

use crate::archive::{ArchiveSink, FileArchive, ZipArchiveWriter};
use crate::counter::ResourceCounter;
use crate::error::{Result, SpreadsheetError};
use crate::image::{read_image_header, EmbeddedImage, ImageCanvas, PlacedImage};
use crate::options::{DocumentProperties, SpreadsheetOptions};
use crate::parts::comments::{self, CommentsXml, Note, VmlDrawingXml};
use crate::parts::content_types::{self, ContentTypesXml, PackageFlags};
use crate::parts::doc_props::{self, AppPropertiesXml, CorePropertiesXml};
use crate::parts::drawing::{self, DrawingXml};
use crate::parts::relationships::{self, rels_path, RelationshipsXml};
use crate::parts::shared_strings::{self, SharedStrings, SharedStringsXml};
use crate::parts::styles::{self, StylesXml};
use crate::parts::table::{self, TableDefinition, TableXml};
use crate::parts::workbook::{self, WorkbookXml};
use crate::shape::{HeaderResolver, HeaderText, RowShape, ShapedCell};
use crate::style::{NumberFormat, Style, StyleId, StyleRegistry};
use crate::types::{Cell, CellRange, CellReference, CellValue, RowOptions, MAX_COLUMNS, MAX_ROWS};
use crate::worksheet::{
    validate_worksheet_name, Table, Visibility, WorksheetMetadata, WorksheetOptions,
};
use crate::writer::part::{Fragments, PartOutput};
use crate::writer::row::{CellContent, RowCell, RowXml};
use crate::writer::sheet::{WorksheetEndXml, WorksheetStartXml};
use crate::writer::value::{clip_utf16, serial_date};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::io::Write;
use std::path::Path;

/// Largest row height accepted, in points
const MAX_ROW_HEIGHT: f64 = 409.0;

/// Lifecycle state of a [`Spreadsheet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No worksheet is open
    Ready,
    InWorksheet,
    /// [`Spreadsheet::finish`] completed
    Closed,
    /// A sink failure or cancellation made the session unusable
    Faulted,
}

/// A table whose rows are still being written
struct ActiveTable {
    table: Table,
    first_row: u32,
    /// Captured from the first row written after the table started
    columns: Option<Vec<String>>,
}

/// State of the worksheet being written
struct ActiveWorksheet {
    index: usize,
    next_row: u32,
    notes: Vec<Note>,
    merges: Vec<CellRange>,
    images: Vec<PlacedImage>,
    tables: Vec<TableDefinition>,
    active_table: Option<ActiveTable>,
    /// Last row claimed by a finished table
    table_rows_end: u32,
}

impl ActiveWorksheet {
    fn new(index: usize) -> Self {
        ActiveWorksheet {
            index,
            next_row: 1,
            notes: Vec::new(),
            merges: Vec::new(),
            images: Vec::new(),
            tables: Vec::new(),
            active_table: None,
            table_rows_end: 0,
        }
    }
}

/// Streaming spreadsheet writer.
///
/// # Examples
///
/// ```
/// use sheetstream::{MemoryArchive, Spreadsheet, SpreadsheetOptions};
///
/// let mut spreadsheet = Spreadsheet::new(MemoryArchive::new(), SpreadsheetOptions::default());
/// spreadsheet.start_worksheet("People")?;
/// spreadsheet.add_row(["Name", "City"])?;
/// spreadsheet.add_row(["Ola", "Oslo"])?;
/// spreadsheet.finish()?;
///
/// let archive = spreadsheet.into_sink();
/// assert!(archive.entry("xl/worksheets/sheet1.xml").is_some());
/// # Ok::<(), sheetstream::SpreadsheetError>(())
/// ```
pub struct Spreadsheet<S: ArchiveSink> {
    output: PartOutput<S>,
    styles: StyleRegistry,
    counter: ResourceCounter,
    worksheets: Vec<WorksheetMetadata>,
    worksheet: Option<ActiveWorksheet>,
    shared_strings: Option<SharedStrings>,
    document_properties: Option<DocumentProperties>,
    default_datetime_format: Option<NumberFormat>,
    default_datetime_style: Option<StyleId>,
    /// Lowercased names of every table in the workbook
    table_names: Vec<String>,
    created: DateTime<Utc>,
    state: SessionState,
    scratch: Vec<ShapedCell>,
}

impl<W: Write> Spreadsheet<ZipArchiveWriter<W>> {
    /// Write a zip archive to any writer; no seeking is required
    pub fn from_writer(writer: W, options: SpreadsheetOptions) -> Self {
        let sink = ZipArchiveWriter::new(writer, options.compression_level);
        Spreadsheet::new(sink, options)
    }
}

impl Spreadsheet<FileArchive> {
    /// Create a `.xlsx` file at `path`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sheetstream::{Spreadsheet, SpreadsheetOptions};
    ///
    /// let mut spreadsheet = Spreadsheet::create("report.xlsx", SpreadsheetOptions::default())?;
    /// spreadsheet.start_worksheet("Report")?;
    /// spreadsheet.add_row(["Quarter", "Revenue"])?;
    /// spreadsheet.add_row(("Q1", 1250.5))?;
    /// spreadsheet.finish()?;
    /// # Ok::<(), sheetstream::SpreadsheetError>(())
    /// ```
    pub fn create<P: AsRef<Path>>(path: P, options: SpreadsheetOptions) -> Result<Self> {
        let sink = FileArchive::create(path, options.compression_level)?;
        Ok(Spreadsheet::new(sink, options))
    }
}

impl<S: ArchiveSink> Spreadsheet<S> {
    pub fn new(sink: S, options: SpreadsheetOptions) -> Self {
        debug!(
            "Creating spreadsheet (buffer {} bytes, shared strings {})",
            options.buffer_size, options.shared_strings
        );
        Spreadsheet {
            output: PartOutput::new(sink, options.buffer_size, options.cancellation),
            styles: StyleRegistry::new(),
            counter: ResourceCounter::new(),
            worksheets: Vec::new(),
            worksheet: None,
            shared_strings: options.shared_strings.then(SharedStrings::new),
            document_properties: options.document_properties,
            default_datetime_format: options.default_datetime_format,
            default_datetime_style: None,
            table_names: Vec::new(),
            created: Utc::now(),
            state: SessionState::Ready,
            scratch: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Worksheets started so far, in creation order
    pub fn worksheets(&self) -> &[WorksheetMetadata] {
        &self.worksheets
    }

    pub fn resource_counter(&self) -> &ResourceCounter {
        &self.counter
    }

    /// Give back the sink. Unless [`finish`](Self::finish) succeeded, the
    /// archive is incomplete.
    pub fn into_sink(self) -> S {
        self.output.sink
    }

    fn check_usable(&self) -> Result<()> {
        match self.state {
            SessionState::Closed => Err(SpreadsheetError::Finished),
            SessionState::Faulted => Err(SpreadsheetError::Faulted),
            SessionState::Ready | SessionState::InWorksheet => Ok(()),
        }
    }

    fn active(&mut self) -> Result<&mut ActiveWorksheet> {
        self.check_usable()?;
        self.worksheet
            .as_mut()
            .ok_or(SpreadsheetError::NoActiveWorksheet)
    }

    /// Sink failures leave the archive in an unknown state
    fn checked<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            if !err.is_usage_error() {
                warn!("Spreadsheet faulted: {}", err);
                self.state = SessionState::Faulted;
            }
        }
        result
    }

    // ---- Styles ----

    /// Register a style. Equal styles share one id.
    pub fn add_style(&mut self, style: &Style) -> Result<StyleId> {
        self.check_usable()?;
        Ok(self.styles.register(style))
    }

    /// Register a style that can be looked up by name later
    pub fn add_named_style(&mut self, name: &str, style: &Style) -> Result<StyleId> {
        self.check_usable()?;
        self.styles.register_named(name, style)
    }

    pub fn named_style(&self, name: &str) -> Option<StyleId> {
        self.styles.named(name)
    }

    fn datetime_style(&mut self) -> Option<StyleId> {
        if self.default_datetime_style.is_none() {
            let format = self.default_datetime_format.clone()?;
            let style = Style::new().with_number_format(format);
            self.default_datetime_style = Some(self.styles.register(&style));
        }
        self.default_datetime_style
    }

    // ---- Worksheets ----

    pub fn start_worksheet(&mut self, name: &str) -> Result<()> {
        self.start_worksheet_with(name, WorksheetOptions::default())
    }

    pub fn start_worksheet_with(&mut self, name: &str, options: WorksheetOptions) -> Result<()> {
        self.check_usable()?;
        if let Some(active) = &self.worksheet {
            let current = &self.worksheets[active.index].name;
            return Err(SpreadsheetError::WorksheetAlreadyOpen(current.clone()));
        }
        validate_worksheet_name(name)?;
        let lowercase = name.to_lowercase();
        if self
            .worksheets
            .iter()
            .any(|w| w.name.to_lowercase() == lowercase)
        {
            return Err(SpreadsheetError::DuplicateWorksheetName(name.to_string()));
        }
        options.validate()?;

        let index = self.worksheets.len();
        let metadata = WorksheetMetadata::new(name.to_string(), index + 1, options.visibility);
        debug!("Starting worksheet '{}' at {}", name, metadata.path);

        let result = self.output.sink.begin_entry(&metadata.path).and_then(|_| {
            self.output
                .drive(&mut Fragments::new(WorksheetStartXml::new(&options)))
        });
        self.worksheets.push(metadata);
        self.checked(result)?;

        self.worksheet = Some(ActiveWorksheet::new(index));
        self.state = SessionState::InWorksheet;
        Ok(())
    }

    /// Number the next added row will get
    pub fn next_row_number(&self) -> Result<u32> {
        self.check_usable()?;
        self.worksheet
            .as_ref()
            .map(|w| w.next_row)
            .ok_or(SpreadsheetError::NoActiveWorksheet)
    }

    /// Close the open worksheet and write the parts that belong to it
    pub fn finish_worksheet(&mut self) -> Result<()> {
        let active = self.active()?;
        if active.active_table.is_some() {
            self.finish_table()?;
        }
        let Some(active) = self.worksheet.take() else {
            return Err(SpreadsheetError::NoActiveWorksheet);
        };
        self.state = SessionState::Ready;
        let result = self.write_worksheet_parts(&active);
        self.checked(result)
    }

    fn write_worksheet_parts(&mut self, active: &ActiveWorksheet) -> Result<()> {
        let drawing_number =
            (!active.images.is_empty()).then(|| self.counter.add_worksheet_with_images());
        let notes_number =
            (!active.notes.is_empty()).then(|| self.counter.add_worksheet_with_notes());
        let table_ids: Vec<u32> = active.tables.iter().map(|t| t.id).collect();
        let (worksheet_relationships, links) =
            relationships::worksheet(drawing_number, notes_number, &table_ids);

        let metadata = &mut self.worksheets[active.index];
        metadata.has_images = drawing_number.is_some();
        metadata.has_notes = notes_number.is_some();
        metadata.table_count = active.tables.len();
        let path = metadata.path.clone();

        let output = &mut self.output;
        output.drive(&mut Fragments::new(WorksheetEndXml::new(&active.merges, &links)))?;
        output.flush()?;
        output.sink.end_entry()?;

        if !worksheet_relationships.is_empty() {
            output.write_part(
                &rels_path(&path),
                &mut Fragments::new(RelationshipsXml::new(worksheet_relationships)),
            )?;
        }
        if let Some(number) = drawing_number {
            let drawing_path = drawing::path(number);
            output.write_part(&drawing_path, &mut Fragments::new(DrawingXml::new(&active.images)))?;
            output.write_part(
                &rels_path(&drawing_path),
                &mut Fragments::new(RelationshipsXml::new(drawing::relationships(&active.images))),
            )?;
        }
        if let Some(number) = notes_number {
            output.write_part(
                &comments::comments_path(number),
                &mut Fragments::new(CommentsXml::new(&active.notes)),
            )?;
            output.write_part(
                &comments::vml_path(number),
                &mut Fragments::new(VmlDrawingXml::new(&active.notes, number)),
            )?;
        }
        for definition in &active.tables {
            output.write_part(&table::path(definition.id), &mut Fragments::new(TableXml::new(definition)))?;
        }

        debug!(
            "Finished worksheet {} ({} rows, {} tables, {} notes, {} images)",
            path,
            active.next_row - 1,
            active.tables.len(),
            active.notes.len(),
            active.images.len()
        );
        Ok(())
    }

    // ---- Rows ----

    /// Add a row starting at column A
    ///
    /// Anything convertible to [`Cell`] can be used: strings, numbers, bools,
    /// dates, [`Formula`](crate::Formula)s, or a tuple of them.
    pub fn add_row<R: IntoCells>(&mut self, cells: R) -> Result<()> {
        self.add_row_with(cells, RowOptions::default())
    }

    pub fn add_row_with<R: IntoCells>(&mut self, cells: R, options: RowOptions) -> Result<()> {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        cells.into_cells(&mut scratch);
        let result = self.write_row(&scratch, options);
        self.scratch = scratch;
        result
    }

    /// Add a row of cells at explicit 1-based columns; gaps stay empty
    pub fn add_sparse_row<I, C>(&mut self, cells: I, options: RowOptions) -> Result<()>
    where
        I: IntoIterator<Item = (u32, C)>,
        C: Into<Cell>,
    {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        scratch.extend(cells.into_iter().map(|(column, cell)| ShapedCell {
            column,
            cell: cell.into(),
            truncate: None,
        }));
        let result = self.write_row(&scratch, options);
        self.scratch = scratch;
        result
    }

    /// Add several rows, each starting at column A
    pub fn add_rows<I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: IntoCells,
    {
        for row in rows {
            self.add_row(row)?;
        }
        Ok(())
    }

    /// Add one row for `value` using `shape`. `None` adds an empty row.
    pub fn add_as_row<T, R>(&mut self, value: Option<&T>, shape: &R) -> Result<()>
    where
        T: ?Sized,
        R: RowShape<T> + ?Sized,
    {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        if let Some(value) = value {
            shape.write_cells(value, &mut scratch);
        }
        let result = self.write_row(&scratch, RowOptions::default());
        self.scratch = scratch;
        result
    }

    /// Add one row per value; `None` values add empty rows
    pub fn add_range_as_rows<'v, T, R, I>(&mut self, values: I, shape: &R) -> Result<()>
    where
        T: ?Sized + 'v,
        R: RowShape<T> + ?Sized,
        I: IntoIterator,
        I::Item: Into<Option<&'v T>>,
    {
        for value in values {
            self.add_as_row(value.into(), shape)?;
        }
        Ok(())
    }

    /// Add a row with the header text of every column of `shape`
    pub fn add_header_row<T, R>(&mut self, shape: &R, style: Option<StyleId>) -> Result<()>
    where
        T: ?Sized,
        R: RowShape<T> + ?Sized,
    {
        self.header_row(shape.columns().iter().map(|c| c.header.plain().map(str::to_string)), style)
    }

    /// Like [`add_header_row`](Self::add_header_row), resolving localized
    /// headers for `locale`
    pub fn add_localized_header_row<T, R>(
        &mut self,
        shape: &R,
        resolver: &dyn HeaderResolver,
        locale: &str,
        style: Option<StyleId>,
    ) -> Result<()>
    where
        T: ?Sized,
        R: RowShape<T> + ?Sized,
    {
        self.header_row(
            shape
                .columns()
                .iter()
                .map(|c| HeaderText::resolve(&c.header, resolver, locale)),
            style,
        )
    }

    fn header_row(
        &mut self,
        headers: impl Iterator<Item = Option<String>>,
        style: Option<StyleId>,
    ) -> Result<()> {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        scratch.extend(headers.enumerate().map(|(index, header)| ShapedCell {
            column: index as u32 + 1,
            cell: Cell {
                value: header.map(CellValue::Text).unwrap_or_default(),
                style,
            },
            truncate: None,
        }));
        let result = self.write_row(&scratch, RowOptions::default());
        self.scratch = scratch;
        result
    }

    fn validate_row(&self, cells: &[ShapedCell], options: &RowOptions) -> Result<()> {
        let mut previous = 0;
        for shaped in cells {
            if shaped.column <= previous || shaped.column > MAX_COLUMNS {
                return Err(SpreadsheetError::invalid_argument(
                    "cells",
                    format!(
                        "column {} must be strictly increasing and between 1 and {MAX_COLUMNS}",
                        shaped.column
                    ),
                ));
            }
            previous = shaped.column;
            if let Some(style) = shaped.cell.style {
                self.validate_style(style)?;
            }
        }
        if let Some(style) = options.style {
            self.validate_style(style)?;
        }
        if let Some(height) = options.height {
            if !(0.0..=MAX_ROW_HEIGHT).contains(&height) {
                return Err(SpreadsheetError::invalid_argument(
                    "height",
                    format!("row height must be between 0 and {MAX_ROW_HEIGHT}"),
                ));
            }
        }
        Ok(())
    }

    fn validate_style(&self, style: StyleId) -> Result<()> {
        if !self.styles.contains(style) {
            return Err(SpreadsheetError::invalid_argument(
                "style",
                format!("style {} was not registered with this spreadsheet", style.0),
            ));
        }
        Ok(())
    }

    fn write_row(&mut self, cells: &[ShapedCell], options: RowOptions) -> Result<()> {
        let number = self.active()?.next_row;
        if number > MAX_ROWS {
            return Err(SpreadsheetError::RowLimitExceeded(number));
        }
        self.validate_row(cells, &options)?;
        self.capture_table_header(cells);

        let needs_datetime_style = cells.iter().any(|c| {
            matches!(c.cell.value, CellValue::DateTime(_)) && c.cell.style.or(options.style).is_none()
        });
        let datetime_style = if needs_datetime_style {
            self.datetime_style()
        } else {
            None
        };

        let mut row = Vec::with_capacity(cells.len());
        for shaped in cells {
            let style = shaped.cell.style.or(options.style);
            let (content, style) = match &shaped.cell.value {
                CellValue::Empty => match shaped.cell.style.filter(|s| !s.is_default()) {
                    Some(style) => (CellContent::Empty, Some(style)),
                    None => continue,
                },
                CellValue::Text(text) => {
                    let text = match shaped.truncate {
                        Some(limit) => clip_utf16(text, limit),
                        None => text.as_str(),
                    };
                    match self.shared_strings.as_mut() {
                        Some(strings) => (CellContent::SharedText(strings.add_string(text)), style),
                        None => (CellContent::InlineText(text), style),
                    }
                }
                CellValue::Integer(value) => (CellContent::Integer(*value), style),
                CellValue::Number(value) => (CellContent::Number(*value), style),
                CellValue::Bool(value) => (CellContent::Bool(*value), style),
                CellValue::DateTime(value) => (
                    CellContent::Number(serial_date(*value)),
                    style.or(datetime_style),
                ),
                CellValue::Formula(formula) => (
                    CellContent::Formula {
                        expression: formula.expression(),
                        cached: formula.cached.as_ref(),
                    },
                    style,
                ),
            };
            row.push(RowCell {
                column: shaped.column,
                style,
                content,
            });
        }

        let mut writer = RowXml::new(number, options.height, options.style, &row);
        let result = self.output.drive(&mut writer);
        self.checked(result)?;
        self.active()?.next_row += 1;
        Ok(())
    }

    // ---- Tables ----

    /// Start a table at the next row; that row becomes its header row
    pub fn start_table(&mut self, table: Table) -> Result<()> {
        let active = self.active()?;
        if active.active_table.is_some() {
            return Err(SpreadsheetError::InvalidOperation(
                "a table is already active on this worksheet".to_string(),
            ));
        }
        if active.next_row <= active.table_rows_end {
            return Err(SpreadsheetError::InvalidOperation(
                "the previous table extends into the next row".to_string(),
            ));
        }
        let first_row = active.next_row;
        table.validate()?;
        if let Some(name) = &table.name {
            let lowercase = name.to_lowercase();
            if self.table_names.contains(&lowercase) {
                return Err(SpreadsheetError::DuplicateTableName(name.clone()));
            }
            self.table_names.push(lowercase);
        }
        debug!("Starting table at row {}", first_row);
        self.active()?.active_table = Some(ActiveTable {
            table,
            first_row,
            columns: None,
        });
        Ok(())
    }

    fn capture_table_header(&mut self, cells: &[ShapedCell]) {
        let Some(worksheet) = self.worksheet.as_mut() else {
            return;
        };
        let Some(active) = worksheet.active_table.as_mut() else {
            return;
        };
        if active.columns.is_some() {
            return;
        }

        let first = active.table.first_column;
        let count = active.table.number_of_columns.unwrap_or_else(|| {
            cells
                .iter()
                .map(|c| c.column)
                .filter(|&column| column >= first)
                .max()
                .map_or(1, |last| last - first + 1)
        });

        let mut names: Vec<String> = Vec::with_capacity(count as usize);
        for offset in 0..count {
            let text = cells
                .iter()
                .find(|c| c.column == first + offset)
                .and_then(|c| {
                    let text = c.cell.value.as_text()?;
                    Some(match c.truncate {
                        Some(limit) => clip_utf16(text, limit),
                        None => text,
                    })
                })
                .map(str::trim)
                .filter(|text| !text.is_empty());
            let base = match text {
                Some(text) => text.to_string(),
                None => {
                    warn!("Table header in column {} is not text; naming it Column{}", first + offset, offset + 1);
                    format!("Column{}", offset + 1)
                }
            };
            let mut name = base.clone();
            let mut suffix = 2;
            while names.iter().any(|n| n.to_lowercase() == name.to_lowercase()) {
                name = format!("{base}{suffix}");
                suffix += 1;
            }
            if name != base {
                warn!("Duplicate table header '{}' renamed to '{}'", base, name);
            }
            names.push(name);
        }
        active.columns = Some(names);
    }

    /// End the active table at the last written row
    pub fn finish_table(&mut self) -> Result<()> {
        let active = self.active()?;
        let Some(table) = active.active_table.as_ref() else {
            return Err(SpreadsheetError::InvalidOperation(
                "no table is active on this worksheet".to_string(),
            ));
        };
        let last_row = active.next_row - 1;
        if last_row < table.first_row {
            return Err(SpreadsheetError::InvalidOperation(
                "a table must contain at least a header row".to_string(),
            ));
        }
        if last_row == table.first_row && last_row >= MAX_ROWS {
            return Err(SpreadsheetError::InvalidOperation(format!(
                "the header-only table at row {last_row} has no room for a data row"
            )));
        }
        let Some(table) = active.active_table.take() else {
            return Err(SpreadsheetError::InvalidOperation(
                "no table is active on this worksheet".to_string(),
            ));
        };
        let columns = table.columns.unwrap_or_else(|| vec!["Column1".to_string()]);

        // A table needs at least one data row
        let last_row = if last_row == table.first_row {
            warn!("Table at row {} has no data rows; including the row below it", table.first_row);
            last_row + 1
        } else {
            last_row
        };
        active.table_rows_end = last_row;

        let first_column = table.table.first_column;
        let range = CellRange {
            start: CellReference {
                column: first_column,
                row: table.first_row,
            },
            end: CellReference {
                column: first_column + columns.len() as u32 - 1,
                row: last_row,
            },
        };

        let id = self.counter.add_table();
        let name = match table.table.name {
            Some(name) => name,
            None => {
                let mut name = format!("Table{id}");
                let mut suffix = 1;
                while self.table_names.contains(&name.to_lowercase()) {
                    name = format!("Table{id}_{suffix}");
                    suffix += 1;
                }
                self.table_names.push(name.to_lowercase());
                name
            }
        };
        debug!("Finished table '{}' ({})", name, range);

        self.active()?.tables.push(TableDefinition {
            id,
            name,
            style: table.table.style,
            show_row_stripes: table.table.show_row_stripes,
            range,
            columns,
        });
        Ok(())
    }

    // ---- Notes, merges and images ----

    /// Attach a note to a cell of the open worksheet
    pub fn add_note(&mut self, reference: &str, text: impl Into<String>) -> Result<()> {
        let active = self.active()?;
        let cell = CellReference::parse(reference)?;
        if active.notes.len() >= comments::MAX_NOTES_PER_WORKSHEET {
            return Err(SpreadsheetError::InvalidOperation(format!(
                "a worksheet can hold at most {} notes",
                comments::MAX_NOTES_PER_WORKSHEET
            )));
        }
        if active.notes.iter().any(|note| note.cell == cell) {
            return Err(SpreadsheetError::InvalidOperation(format!(
                "cell {cell} already has a note"
            )));
        }
        active.notes.push(Note {
            cell,
            text: text.into(),
        });
        Ok(())
    }

    /// Merge a range such as `A1:C1`
    pub fn merge_cells(&mut self, range: &str) -> Result<()> {
        let active = self.active()?;
        let range = CellRange::parse(range)?;
        if range.start == range.end {
            return Err(SpreadsheetError::invalid_argument(
                "range",
                "a merged range must span more than one cell",
            ));
        }
        if active.merges.iter().any(|merged| merged.overlaps(&range)) {
            return Err(SpreadsheetError::InvalidOperation(format!(
                "{range} overlaps an existing merged range"
            )));
        }
        active.merges.push(range);
        Ok(())
    }

    /// Store a PNG or JPEG image in the archive. Only allowed while no
    /// worksheet is open.
    pub fn embed_image(&mut self, bytes: &[u8]) -> Result<EmbeddedImage> {
        self.check_usable()?;
        if self.worksheet.is_some() {
            return Err(SpreadsheetError::InvalidOperation(
                "images must be embedded while no worksheet is open".to_string(),
            ));
        }
        let (image_type, width, height) = read_image_header(bytes)?;
        let image = EmbeddedImage {
            id: self.counter.add_embedded_image(image_type),
            session: self.counter.session(),
            image_type,
            width,
            height,
        };
        debug!("Embedding {}x{} image as {}", width, height, image.path());
        let result = self.output.write_bytes(&image.path(), bytes);
        self.checked(result)?;
        Ok(image)
    }

    /// Place an embedded image on the open worksheet
    pub fn add_image(&mut self, image: &EmbeddedImage, canvas: ImageCanvas) -> Result<()> {
        let total_images = self.counter.total_images();
        let session = self.counter.session();
        let active = self.active()?;
        if image.session != session || image.id == 0 || image.id > total_images {
            return Err(SpreadsheetError::invalid_argument(
                "image",
                "image was not embedded in this spreadsheet",
            ));
        }
        if matches!(canvas.size, Some((width, height)) if width == 0 || height == 0) {
            return Err(SpreadsheetError::invalid_argument(
                "canvas",
                "image size must be positive",
            ));
        }
        active.images.push(PlacedImage {
            image: *image,
            canvas,
        });
        Ok(())
    }

    // ---- Finish ----

    /// Close the open worksheet, write the package parts and finalize the sink
    pub fn finish(&mut self) -> Result<()> {
        self.check_usable()?;
        if self.worksheet.is_some() {
            self.finish_worksheet()?;
        }
        if self.worksheets.is_empty() {
            return Err(SpreadsheetError::InvalidOperation(
                "a spreadsheet must contain at least one worksheet".to_string(),
            ));
        }
        if !self
            .worksheets
            .iter()
            .any(|w| w.visibility == Visibility::Visible)
        {
            return Err(SpreadsheetError::InvalidOperation(
                "at least one worksheet must be visible".to_string(),
            ));
        }

        let result = self.write_package_parts();
        self.checked(result)?;
        self.state = SessionState::Closed;
        debug!("Finished spreadsheet with {} worksheets", self.worksheets.len());
        Ok(())
    }

    fn write_package_parts(&mut self) -> Result<()> {
        let flags = PackageFlags {
            has_styles: !self.styles.is_empty(),
            has_shared_strings: self.shared_strings.is_some(),
            has_document_properties: self.document_properties.is_some(),
        };
        let output = &mut self.output;

        if flags.has_styles {
            let resolved = self.styles.resolve();
            output.write_part(styles::PATH, &mut Fragments::new(StylesXml::new(&resolved)))?;
        }
        if let Some(strings) = &self.shared_strings {
            output.write_part(
                shared_strings::PATH,
                &mut Fragments::new(SharedStringsXml::new(strings)),
            )?;
        }
        output.write_part(
            content_types::PATH,
            &mut Fragments::new(ContentTypesXml::new(&self.worksheets, &self.counter, flags)),
        )?;
        output.write_part(
            relationships::ROOT_PATH,
            &mut Fragments::new(RelationshipsXml::new(relationships::root(
                flags.has_document_properties,
            ))),
        )?;
        output.write_part(
            relationships::WORKBOOK_PATH,
            &mut Fragments::new(RelationshipsXml::new(relationships::workbook(
                self.worksheets.len(),
                flags.has_styles,
                flags.has_shared_strings,
            ))),
        )?;
        output.write_part(
            workbook::PATH,
            &mut Fragments::new(WorkbookXml::new(&self.worksheets)),
        )?;
        if let Some(properties) = &self.document_properties {
            output.write_part(
                doc_props::APP_PATH,
                &mut Fragments::new(AppPropertiesXml::new(properties)),
            )?;
            output.write_part(
                doc_props::CORE_PATH,
                &mut Fragments::new(CorePropertiesXml::new(properties, self.created)),
            )?;
        }
        output.sink.finalize()
    }
}

/// Values that can be written as a row starting at column A
pub trait IntoCells {
    fn into_cells(self, cells: &mut Vec<ShapedCell>);
}

fn push_cell(cells: &mut Vec<ShapedCell>, cell: Cell) {
    cells.push(ShapedCell {
        column: cells.len() as u32 + 1,
        cell,
        truncate: None,
    });
}

impl<C: Into<Cell>> IntoCells for Vec<C> {
    fn into_cells(self, cells: &mut Vec<ShapedCell>) {
        for cell in self {
            push_cell(cells, cell.into());
        }
    }
}

impl<C: Into<Cell>, const N: usize> IntoCells for [C; N] {
    fn into_cells(self, cells: &mut Vec<ShapedCell>) {
        for cell in self {
            push_cell(cells, cell.into());
        }
    }
}

impl<C: Into<Cell> + Clone> IntoCells for &[C] {
    fn into_cells(self, cells: &mut Vec<ShapedCell>) {
        for cell in self {
            push_cell(cells, cell.clone().into());
        }
    }
}

macro_rules! impl_into_cells_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Cell>),+> IntoCells for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_cells(self, cells: &mut Vec<ShapedCell>) {
                let ($($name,)+) = self;
                $(push_cell(cells, $name.into());)+
            }
        }
    };
}

impl_into_cells_for_tuple!(A);
impl_into_cells_for_tuple!(A, B);
impl_into_cells_for_tuple!(A, B, C);
impl_into_cells_for_tuple!(A, B, C, D);
impl_into_cells_for_tuple!(A, B, C, D, E);
impl_into_cells_for_tuple!(A, B, C, D, E, F);
impl_into_cells_for_tuple!(A, B, C, D, E, F, G);
impl_into_cells_for_tuple!(A, B, C, D, E, F, G, H);
