//! Streaming ZIP writer that compresses entries on the fly
//!
//! Entries are deflated straight into the output and their sizes and CRC are
//! written in a data descriptor after the data, so the output never needs to
//! seek. Offsets are tracked by counting written bytes.

use super::ArchiveSink;
use crate::error::{Result, SpreadsheetError};
use crc32fast::Hasher as Crc32;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use log::debug;
use std::io::Write;

const LOCAL_HEADER_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];
const DATA_DESCRIPTOR_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x07, 0x08];
const CENTRAL_HEADER_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x01, 0x02];
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];

const VERSION: u16 = 20;
/// Data descriptor follows the data (bit 3), names are UTF-8 (bit 11)
const FLAGS: u16 = 0x0808;
const METHOD_DEFLATE: u16 = 8;
/// 1980-01-01 00:00, so output does not depend on the clock
const DOS_TIME: u16 = 0;
const DOS_DATE: u16 = 0x0021;

/// Entry already written, kept for the central directory
struct ZipEntry {
    name: String,
    local_header_offset: u32,
    crc32: u32,
    compressed_size: u32,
    uncompressed_size: u32,
}

struct CurrentEntry<W: Write> {
    name: String,
    local_header_offset: u32,
    crc: Crc32,
    uncompressed_size: u64,
    encoder: DeflateEncoder<CountingWriter<W>>,
}

/// Writer that counts the bytes passing through it
struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// [`ArchiveSink`] producing a ZIP archive on any [`Write`].
///
/// Zip64 is not supported: entries and the archive are limited to 4 GiB and
/// 65 535 entries, and exceeding either is an error.
pub struct ZipArchiveWriter<W: Write> {
    // `None` while an entry's encoder owns the output
    output: Option<CountingWriter<W>>,
    current: Option<CurrentEntry<W>>,
    entries: Vec<ZipEntry>,
    compression_level: u32,
    finished: bool,
}

fn to_u32(value: u64, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| SpreadsheetError::archive(format!("{what} exceeds 4 GiB; zip64 is not supported")))
}

fn put_u16(header: &mut Vec<u8>, value: u16) {
    header.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(header: &mut Vec<u8>, value: u32) {
    header.extend_from_slice(&value.to_le_bytes());
}

impl<W: Write> ZipArchiveWriter<W> {
    pub fn new(output: W, compression_level: u32) -> Self {
        ZipArchiveWriter {
            output: Some(CountingWriter {
                inner: output,
                count: 0,
            }),
            current: None,
            entries: Vec::new(),
            compression_level: compression_level.min(9),
            finished: false,
        }
    }

    /// Number of bytes written to the output so far
    pub fn bytes_written(&self) -> u64 {
        match (&self.output, &self.current) {
            (Some(output), _) => output.count,
            (None, Some(entry)) => entry.encoder.get_ref().count,
            (None, None) => 0,
        }
    }

    /// Return the underlying writer
    pub fn into_inner(self) -> Result<W> {
        if self.current.is_some() {
            return Err(SpreadsheetError::archive("an entry is still open"));
        }
        self.output
            .map(|output| output.inner)
            .ok_or_else(|| SpreadsheetError::archive("archive output was lost after a failure"))
    }

    fn output(&mut self) -> Result<&mut CountingWriter<W>> {
        self.output
            .as_mut()
            .ok_or_else(|| SpreadsheetError::archive("archive output was lost after a failure"))
    }

    fn check_open(&self) -> Result<()> {
        if self.finished {
            return Err(SpreadsheetError::archive("archive is already finalized"));
        }
        Ok(())
    }
}

impl<W: Write> ArchiveSink for ZipArchiveWriter<W> {
    fn begin_entry(&mut self, name: &str) -> Result<()> {
        self.check_open()?;
        if self.current.is_some() {
            return Err(SpreadsheetError::archive("previous entry was not ended"));
        }
        if self.entries.len() >= usize::from(u16::MAX) {
            return Err(SpreadsheetError::archive("too many entries; zip64 is not supported"));
        }
        let name_length = u16::try_from(name.len())
            .map_err(|_| SpreadsheetError::archive(format!("entry name too long: {name}")))?;

        let output = self.output()?;
        let local_header_offset = to_u32(output.count, "archive size")?;

        let mut header = Vec::with_capacity(30 + name.len());
        header.extend_from_slice(&LOCAL_HEADER_SIGNATURE);
        put_u16(&mut header, VERSION);
        put_u16(&mut header, FLAGS);
        put_u16(&mut header, METHOD_DEFLATE);
        put_u16(&mut header, DOS_TIME);
        put_u16(&mut header, DOS_DATE);
        // CRC and sizes go in the data descriptor
        put_u32(&mut header, 0);
        put_u32(&mut header, 0);
        put_u32(&mut header, 0);
        put_u16(&mut header, name_length);
        put_u16(&mut header, 0);
        header.extend_from_slice(name.as_bytes());
        output.write_all(&header)?;

        let Some(output) = self.output.take() else {
            return Err(SpreadsheetError::archive("archive output was lost after a failure"));
        };
        self.current = Some(CurrentEntry {
            name: name.to_string(),
            local_header_offset,
            crc: Crc32::new(),
            uncompressed_size: 0,
            encoder: DeflateEncoder::new(output, Compression::new(self.compression_level)),
        });
        Ok(())
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let Some(entry) = self.current.as_mut() else {
            return Err(SpreadsheetError::archive("no entry started"));
        };
        entry.crc.update(bytes);
        entry.uncompressed_size += bytes.len() as u64;
        entry.encoder.write_all(bytes)?;
        Ok(())
    }

    fn end_entry(&mut self) -> Result<()> {
        let Some(entry) = self.current.take() else {
            return Err(SpreadsheetError::archive("no entry started"));
        };
        let mut output = entry.encoder.finish()?;

        let crc32 = entry.crc.finalize();
        let data_end = output.count;
        let compressed_size = to_u32(
            data_end - u64::from(entry.local_header_offset) - 30 - entry.name.len() as u64,
            "compressed entry",
        )?;
        let uncompressed_size = to_u32(entry.uncompressed_size, "entry")?;

        let mut descriptor = Vec::with_capacity(16);
        descriptor.extend_from_slice(&DATA_DESCRIPTOR_SIGNATURE);
        put_u32(&mut descriptor, crc32);
        put_u32(&mut descriptor, compressed_size);
        put_u32(&mut descriptor, uncompressed_size);
        output.write_all(&descriptor)?;
        self.output = Some(output);

        self.entries.push(ZipEntry {
            name: entry.name,
            local_header_offset: entry.local_header_offset,
            crc32,
            compressed_size,
            uncompressed_size,
        });
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.check_open()?;
        if self.current.is_some() {
            return Err(SpreadsheetError::archive("last entry was not ended"));
        }

        let mut directory = Vec::new();
        for entry in &self.entries {
            directory.extend_from_slice(&CENTRAL_HEADER_SIGNATURE);
            put_u16(&mut directory, VERSION);
            put_u16(&mut directory, VERSION);
            put_u16(&mut directory, FLAGS);
            put_u16(&mut directory, METHOD_DEFLATE);
            put_u16(&mut directory, DOS_TIME);
            put_u16(&mut directory, DOS_DATE);
            put_u32(&mut directory, entry.crc32);
            put_u32(&mut directory, entry.compressed_size);
            put_u32(&mut directory, entry.uncompressed_size);
            put_u16(&mut directory, entry.name.len() as u16);
            put_u16(&mut directory, 0); // extra length
            put_u16(&mut directory, 0); // comment length
            put_u16(&mut directory, 0); // disk number
            put_u16(&mut directory, 0); // internal attributes
            put_u32(&mut directory, 0); // external attributes
            put_u32(&mut directory, entry.local_header_offset);
            directory.extend_from_slice(entry.name.as_bytes());
        }

        let entry_count = self.entries.len() as u16;
        let output = self.output()?;
        let directory_offset = to_u32(output.count, "archive size")?;
        let directory_size = to_u32(directory.len() as u64, "central directory")?;

        directory.extend_from_slice(&END_OF_CENTRAL_DIRECTORY_SIGNATURE);
        put_u16(&mut directory, 0); // this disk
        put_u16(&mut directory, 0); // disk with the directory
        put_u16(&mut directory, entry_count);
        put_u16(&mut directory, entry_count);
        put_u32(&mut directory, directory_size);
        put_u32(&mut directory, directory_offset);
        put_u16(&mut directory, 0); // comment length

        output.write_all(&directory)?;
        output.flush()?;
        self.finished = true;
        debug!("Wrote zip archive with {} entries", entry_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    fn archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipArchiveWriter::new(Vec::new(), 6);
        for (name, data) in entries {
            writer.begin_entry(name).unwrap();
            for chunk in data.chunks(7) {
                writer.append(chunk).unwrap();
            }
            writer.end_entry().unwrap();
        }
        writer.finalize().unwrap();
        writer.into_inner().unwrap()
    }

    #[test]
    fn test_readable_by_zip_crate() {
        let long = "<row/>".repeat(5000);
        let bytes = archive(&[
            ("[Content_Types].xml", b"<Types/>"),
            ("xl/worksheets/sheet1.xml", long.as_bytes()),
            ("empty.txt", b""),
        ]);

        let mut zip = ::zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 3);

        let mut content = String::new();
        zip.by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, long);

        let mut content = String::new();
        zip.by_name("[Content_Types].xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<Types/>");
        assert_eq!(zip.by_name("empty.txt").unwrap().size(), 0);
    }

    #[test]
    fn test_output_is_deterministic() {
        let entries: &[(&str, &[u8])] = &[("a.xml", b"<a>hello</a>"), ("b.xml", b"<b/>")];
        assert_eq!(archive(entries), archive(entries));
    }

    #[test]
    fn test_protocol_violations() {
        let mut writer = ZipArchiveWriter::new(Vec::new(), 6);
        assert!(writer.append(b"x").is_err());
        assert!(writer.end_entry().is_err());
        writer.begin_entry("a.xml").unwrap();
        assert!(writer.begin_entry("b.xml").is_err());
        assert!(writer.finalize().is_err());
        writer.end_entry().unwrap();
        writer.finalize().unwrap();
        assert!(writer.begin_entry("c.xml").is_err());
    }

    #[test]
    fn test_bytes_written_grows() {
        let mut writer = ZipArchiveWriter::new(Vec::new(), 0);
        writer.begin_entry("a.xml").unwrap();
        assert_eq!(writer.bytes_written(), 30 + 5);
        writer.end_entry().unwrap();
        assert!(writer.bytes_written() > 35);
    }
}
