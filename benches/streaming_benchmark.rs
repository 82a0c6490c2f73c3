use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sheetstream::{ColumnMap, MemoryArchive, Spreadsheet, SpreadsheetOptions};
use tempfile::NamedTempFile;

fn benchmark_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    group.sample_size(10); // Reduce samples for large benchmarks

    for size in [100, 1000, 5000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let temp = NamedTempFile::new().unwrap();
                let mut spreadsheet =
                    Spreadsheet::create(temp.path(), SpreadsheetOptions::default()).unwrap();

                spreadsheet.start_worksheet("Data").unwrap();
                spreadsheet.add_row(["ID", "Name", "Value"]).unwrap();
                for i in 0..size {
                    spreadsheet
                        .add_row((i, format!("Name_{}", i), i * 100))
                        .unwrap();
                }

                spreadsheet.finish().unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_typed_write(c: &mut Criterion) {
    c.bench_function("typed_write_1000_rows", |b| {
        b.iter(|| {
            let mut spreadsheet =
                Spreadsheet::from_writer(Vec::new(), SpreadsheetOptions::default());
            spreadsheet.start_worksheet("Typed").unwrap();

            for i in 0..1000 {
                spreadsheet
                    .add_row((i, format!("Name_{}", i), i as f64 * 1.5, i % 2 == 0))
                    .unwrap();
            }

            spreadsheet.finish().unwrap();
            black_box(spreadsheet.into_sink().bytes_written());
        });
    });
}

struct Record {
    id: i64,
    name: String,
    amount: f64,
}

fn benchmark_shaped_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("shaped_write");
    group.sample_size(10);

    let shape = ColumnMap::new()
        .column("Id", |r: &Record| r.id)
        .column("Name", |r: &Record| r.name.clone())
        .truncate(32)
        .column("Amount", |r: &Record| r.amount);

    for size in [1000, 10000].iter() {
        let records: Vec<Record> = (0..*size)
            .map(|i| Record {
                id: i,
                name: format!("Customer with a rather long name {}", i),
                amount: i as f64 / 7.0,
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let mut spreadsheet =
                    Spreadsheet::new(MemoryArchive::new(), SpreadsheetOptions::default());
                spreadsheet.start_worksheet("Records").unwrap();
                spreadsheet.add_header_row(&shape, None).unwrap();
                spreadsheet.add_range_as_rows(records, &shape).unwrap();
                spreadsheet.finish().unwrap();
                black_box(spreadsheet.into_sink().len());
            });
        });
    }

    group.finish();
}

fn benchmark_buffer_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_size");
    group.sample_size(10);

    for buffer_size in [512, 4 * 1024, 64 * 1024].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_size),
            buffer_size,
            |b, &buffer_size| {
                b.iter(|| {
                    let options = SpreadsheetOptions::default().with_buffer_size(buffer_size);
                    let mut spreadsheet = Spreadsheet::from_writer(Vec::new(), options);
                    spreadsheet.start_worksheet("Data").unwrap();
                    for i in 0..5000 {
                        spreadsheet
                            .add_row((i, "a moderately long text value", i as f64 / 3.0))
                            .unwrap();
                    }
                    spreadsheet.finish().unwrap();
                    black_box(spreadsheet.into_sink().bytes_written());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_write,
    benchmark_typed_write,
    benchmark_shaped_write,
    benchmark_buffer_sizes
);
criterion_main!(benches);
