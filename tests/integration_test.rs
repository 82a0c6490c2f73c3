//! Integration tests for sheetstream

mod common;

use chrono::{TimeZone, Utc};
use common::{assert_well_formed, entry_names, read_entry, values, worksheet_rows};
use sheetstream::{
    Cell, CellReference, ColumnMap, DocumentProperties, Formula, FormulaResult, ImageCanvas,
    MemoryArchive, RowOptions, Spreadsheet, SpreadsheetError, SpreadsheetOptions, Style, Table,
    TableStyle, Visibility, WorksheetOptions, ZipArchiveWriter,
};
use std::io::Cursor;
use tempfile::TempDir;

struct Person {
    first_name: String,
    last_name: String,
    age: i32,
    gpa: f64,
}

fn person(first_name: &str, last_name: &str, age: i32) -> Person {
    Person {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        age,
        gpa: 3.5,
    }
}

fn fixed_options() -> SpreadsheetOptions {
    let created = Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap();
    SpreadsheetOptions::default()
        .with_document_properties(DocumentProperties::default().with_created(created))
}

/// Build a workbook in memory and return the zip bytes
fn build(
    options: SpreadsheetOptions,
    fill: impl FnOnce(&mut Spreadsheet<ZipArchiveWriter<Vec<u8>>>),
) -> Vec<u8> {
    let mut spreadsheet = Spreadsheet::from_writer(Vec::new(), options);
    fill(&mut spreadsheet);
    spreadsheet.finish().unwrap();
    spreadsheet.into_sink().into_inner().unwrap()
}

#[test]
fn test_batched_rows() {
    let bytes = build(fixed_options(), |s| {
        s.start_worksheet("People").unwrap();
        s.add_rows([
            ("Ola", "Nordmann", 30),
            ("Ingrid", "Hansen", 28),
            ("Oskar", "Berg", 29),
        ])
        .unwrap();
    });

    let rows = worksheet_rows(&read_entry(&bytes, "xl/worksheets/sheet1.xml"));
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.len() == 3));
    assert_eq!(values(&rows[0]), ["Ola", "Nordmann", "30"]);
    assert_eq!(values(&rows[1]), ["Ingrid", "Hansen", "28"]);
    assert_eq!(values(&rows[2]), ["Oskar", "Berg", "29"]);
    let references: Vec<_> = rows[2].iter().map(|c| c.reference.as_str()).collect();
    assert_eq!(references, ["A3", "B3", "C3"]);
}

#[test]
fn test_ordered_header_row() {
    let shape = ColumnMap::new()
        .column("FirstName", |p: &Person| p.first_name.clone())
        .order(2)
        .column("LastName", |p: &Person| p.last_name.clone())
        .order(1)
        .column("Age", |p: &Person| p.age)
        .order(3)
        .column("Gpa", |p: &Person| p.gpa)
        .order(4);

    let bytes = build(fixed_options(), |s| {
        s.start_worksheet("Students").unwrap();
        s.add_header_row(&shape, None).unwrap();
        s.add_as_row(Some(&person("Ola", "Nordmann", 30)), &shape).unwrap();
    });

    let rows = worksheet_rows(&read_entry(&bytes, "xl/worksheets/sheet1.xml"));
    assert_eq!(values(&rows[0]), ["LastName", "FirstName", "Age", "Gpa"]);
    assert_eq!(values(&rows[1]), ["Nordmann", "Ola", "30", "3.5"]);
}

#[test]
fn test_truncation_boundaries() {
    let shape = ColumnMap::new()
        .column("Text", |s: &str| s.to_string())
        .truncate(15);
    let inputs = [
        "abcdefghijklmn",
        "abcdefghijklmno",
        "abcdefghijklmnop",
        "A couple 👨‍👩‍👧‍👦 with kids",
        "fourteen chars😀",
        "<&>\"<&>\"<&>\"<&>\"",
    ];

    let bytes = build(fixed_options(), |s| {
        s.start_worksheet("Clipped").unwrap();
        for input in inputs {
            s.add_as_row(Some(input), &shape).unwrap();
        }
    });

    let rows = worksheet_rows(&read_entry(&bytes, "xl/worksheets/sheet1.xml"));
    let clipped: Vec<_> = rows.iter().map(|row| row[0].value.as_str()).collect();
    assert_eq!(
        clipped,
        [
            "abcdefghijklmn",
            "abcdefghijklmno",
            "abcdefghijklmno",
            "A couple 👨\u{200d}👩\u{200d}",
            // The pair that straddles the limit is dropped whole
            "fourteen chars",
            "<&>\"<&>\"<&>\"<&>",
        ]
    );
}

#[test]
fn test_empty_shape_keeps_row_count() {
    let shape: ColumnMap<Person> = ColumnMap::new();
    let people = [person("Ola", "Nordmann", 30), person("Ingrid", "Hansen", 28)];

    let bytes = build(fixed_options(), |s| {
        s.start_worksheet("Empty").unwrap();
        s.add_range_as_rows(&people, &shape).unwrap();
        s.add_range_as_rows(Vec::<&Person>::new(), &shape).unwrap();
    });

    let rows = worksheet_rows(&read_entry(&bytes, "xl/worksheets/sheet1.xml"));
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(Vec::is_empty));
}

#[test]
fn test_none_values_write_empty_rows() {
    let shape = ColumnMap::new().column("Name", |p: &Person| p.first_name.clone());
    let ola = person("Ola", "Nordmann", 30);

    let bytes = build(fixed_options(), |s| {
        s.start_worksheet("Gaps").unwrap();
        s.add_as_row(None, &shape).unwrap();
        s.add_range_as_rows([None, Some(&ola), None], &shape).unwrap();
    });

    let rows = worksheet_rows(&read_entry(&bytes, "xl/worksheets/sheet1.xml"));
    assert_eq!(rows.len(), 4);
    assert_eq!(rows.iter().map(Vec::len).collect::<Vec<_>>(), [0, 0, 1, 0]);
    assert_eq!(rows[2][0].reference, "A3");
}

#[test]
fn test_operations_after_finish_fail() {
    let mut spreadsheet = Spreadsheet::new(MemoryArchive::new(), SpreadsheetOptions::default());
    assert!(matches!(
        spreadsheet.add_row(["too early"]),
        Err(SpreadsheetError::NoActiveWorksheet)
    ));
    spreadsheet.start_worksheet("Only").unwrap();
    assert!(matches!(
        spreadsheet.start_worksheet("Second"),
        Err(SpreadsheetError::WorksheetAlreadyOpen(_))
    ));
    spreadsheet.finish().unwrap();

    assert!(matches!(spreadsheet.add_row(["late"]), Err(SpreadsheetError::Finished)));
    assert!(matches!(
        spreadsheet.add_style(&Style::new().bold()),
        Err(SpreadsheetError::Finished)
    ));
    assert!(matches!(spreadsheet.finish(), Err(SpreadsheetError::Finished)));
    assert!(spreadsheet.into_sink().is_finalized());
}

/// A workbook touching every part, with long text that forces flushes
/// in the middle of rows
fn write_everything<S: sheetstream::ArchiveSink>(spreadsheet: &mut Spreadsheet<S>) {
    let long = "Grüße & <tags> ".repeat(300);
    let header = spreadsheet.add_style(&Style::new().bold()).unwrap();
    let image = spreadsheet.embed_image(&tiny_png()).unwrap();

    spreadsheet
        .start_worksheet_with("Data", WorksheetOptions::default().with_frozen_rows(1))
        .unwrap();
    spreadsheet.start_table(Table::new(TableStyle::Medium(2))).unwrap();
    spreadsheet
        .add_row_with(["Name", "Notes", "Score"], RowOptions::default().with_style(header))
        .unwrap();
    for i in 0..20 {
        spreadsheet
            .add_row((format!("row {i}"), long.as_str(), f64::from(i) / 3.0))
            .unwrap();
    }
    spreadsheet.finish_table().unwrap();
    spreadsheet
        .add_row((
            "Total",
            Formula::new("=SUM(C2:C21)").with_cached(FormulaResult::Number(63.33)),
        ))
        .unwrap();
    spreadsheet.add_note("A22", long.as_str()).unwrap();
    spreadsheet.merge_cells("A23:C23").unwrap();
    spreadsheet
        .add_image(&image, ImageCanvas::original_size(CellReference::parse("E2").unwrap()))
        .unwrap();
    spreadsheet.finish_worksheet().unwrap();

    spreadsheet
        .start_worksheet_with(
            "Hidden",
            WorksheetOptions::default().with_visibility(Visibility::Hidden),
        )
        .unwrap();
    spreadsheet.add_row([true, false]).unwrap();
}

/// 1x1 PNG header; only the signature and IHDR are inspected
fn tiny_png() -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&1u32.to_be_bytes());
    bytes.extend_from_slice(&1u32.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0, 0x1f, 0x15, 0xc4, 0x89]);
    bytes
}

#[test]
fn test_small_buffer_output_is_identical() {
    let render = |buffer_size: usize| {
        let options = fixed_options().with_buffer_size(buffer_size);
        let mut spreadsheet = Spreadsheet::new(MemoryArchive::new(), options);
        write_everything(&mut spreadsheet);
        spreadsheet.finish().unwrap();
        spreadsheet.into_sink().into_entries()
    };

    let small = render(sheetstream::MIN_BUFFER_SIZE);
    let large = render(1 << 20);
    assert_eq!(small.len(), large.len());
    for ((small_name, small_bytes), (large_name, large_bytes)) in small.iter().zip(&large) {
        assert_eq!(small_name, large_name);
        assert!(small_bytes == large_bytes, "{small_name} differs between buffer sizes");
    }
}

#[test]
fn test_full_workbook_is_well_formed() {
    let bytes = build(fixed_options(), |s| write_everything(s));

    let names = entry_names(&bytes);
    for name in &names {
        if name.ends_with(".xml") || name.ends_with(".rels") || name.ends_with(".vml") {
            assert_well_formed(&read_entry(&bytes, name));
        }
    }
    for expected in [
        "xl/media/image1.png",
        "xl/worksheets/sheet1.xml",
        "xl/worksheets/sheet2.xml",
        "xl/tables/table1.xml",
        "xl/comments1.xml",
        "xl/drawings/vmlDrawing1.vml",
        "xl/drawings/drawing1.xml",
        "xl/styles.xml",
        "xl/workbook.xml",
        "[Content_Types].xml",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }

    let rows = worksheet_rows(&read_entry(&bytes, "xl/worksheets/sheet1.xml"));
    assert_eq!(rows.len(), 22);
    assert_eq!(values(&rows[21]), ["Total", "63.33"]);
    let table = read_entry(&bytes, "xl/tables/table1.xml");
    assert!(table.contains(r#"ref="A1:C21""#));
    assert!(table.contains("TableStyleMedium2"));
    assert!(read_entry(&bytes, "xl/workbook.xml").contains(r#"state="hidden""#));
}

#[test]
fn test_zip_output_is_deterministic() {
    let first = build(fixed_options(), |s| write_everything(s));
    let second = build(fixed_options(), |s| write_everything(s));
    assert_eq!(first, second);
}

#[test]
fn test_unfinished_session_is_not_a_valid_archive() {
    let mut bytes = Vec::new();
    {
        let mut spreadsheet = Spreadsheet::from_writer(&mut bytes, SpreadsheetOptions::default());
        spreadsheet.start_worksheet("Abandoned").unwrap();
        spreadsheet.add_row(["never finished"]).unwrap();
    }
    assert!(zip::ZipArchive::new(Cursor::new(&bytes)).is_err());
}

#[test]
fn test_document_properties() {
    let created = Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap();
    let properties = DocumentProperties::default()
        .with_title("Quarterly <report>")
        .with_author("Ola Nordmann")
        .with_application("Reporting")
        .with_created(created);
    let bytes = build(
        SpreadsheetOptions::default().with_document_properties(properties),
        |s| s.start_worksheet("Sheet1").unwrap(),
    );

    let core = read_entry(&bytes, "docProps/core.xml");
    assert!(core.contains("<dc:title>Quarterly &lt;report&gt;</dc:title>"));
    assert!(core.contains("<dc:creator>Ola Nordmann</dc:creator>"));
    assert!(core.contains("2024-05-17T08:30:00Z"));
    assert!(read_entry(&bytes, "docProps/app.xml").contains("<Application>Reporting</Application>"));
    assert!(read_entry(&bytes, "_rels/.rels").contains("docProps/core.xml"));
}

#[test]
fn test_without_document_properties() {
    let bytes = build(
        SpreadsheetOptions::default().without_document_properties(),
        |s| s.start_worksheet("Sheet1").unwrap(),
    );
    let names = entry_names(&bytes);
    assert!(!names.iter().any(|n| n.starts_with("docProps/")));
    assert!(!read_entry(&bytes, "[Content_Types].xml").contains("docProps"));
}

#[test]
fn test_create_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("people.xlsx");

    let mut spreadsheet = Spreadsheet::create(&path, fixed_options()).unwrap();
    spreadsheet.start_worksheet("People").unwrap();
    spreadsheet.add_row(["Name", "Age"]).unwrap();
    spreadsheet.add_row(("Ola", 30)).unwrap();
    spreadsheet.add_row_with([Cell::from("tall")], RowOptions::default().with_height(30.0)).unwrap();
    spreadsheet.finish().unwrap();
    drop(spreadsheet);

    let bytes = std::fs::read(&path).unwrap();
    let rows = worksheet_rows(&read_entry(&bytes, "xl/worksheets/sheet1.xml"));
    assert_eq!(values(&rows[1]), ["Ola", "30"]);
    assert!(read_entry(&bytes, "xl/worksheets/sheet1.xml").contains(r#"ht="30" customHeight="1""#));
}
