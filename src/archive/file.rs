//! File sink backed by s-zip

use super::ArchiveSink;
use crate::error::{Result, SpreadsheetError};
use log::debug;
use s_zip::StreamingZipWriter;
use std::fs::File;
use std::path::Path;

/// Streams entries into a `.xlsx` file on disk.
///
/// The file is only a valid archive after [`ArchiveSink::finalize`].
pub struct FileArchive {
    writer: Option<StreamingZipWriter<File>>,
}

impl FileArchive {
    /// Create (or truncate) the file at `path`
    pub fn create<P: AsRef<Path>>(path: P, compression_level: u32) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_str().ok_or_else(|| {
            SpreadsheetError::invalid_argument("path", format!("{} is not valid UTF-8", path.display()))
        })?;
        let writer = StreamingZipWriter::with_compression(path_str, compression_level.min(9))
            .map_err(SpreadsheetError::archive)?;
        debug!("Creating spreadsheet archive at {}", path.display());
        Ok(FileArchive {
            writer: Some(writer),
        })
    }

    fn writer(&mut self) -> Result<&mut StreamingZipWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| SpreadsheetError::archive("archive is already finalized"))
    }
}

impl ArchiveSink for FileArchive {
    fn begin_entry(&mut self, name: &str) -> Result<()> {
        self.writer()?
            .start_entry(name)
            .map_err(SpreadsheetError::archive)
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer()?
            .write_data(bytes)
            .map_err(SpreadsheetError::archive)
    }

    fn end_entry(&mut self) -> Result<()> {
        // s-zip closes an entry when the next one starts or the archive finishes
        self.writer().map(|_| ())
    }

    fn finalize(&mut self) -> Result<()> {
        let Some(writer) = self.writer.take() else {
            return Err(SpreadsheetError::archive("archive is already finalized"));
        };
        writer.finish().map(|_| ()).map_err(SpreadsheetError::archive)
    }
}
