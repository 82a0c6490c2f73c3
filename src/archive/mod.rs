//! Archive sinks
//!
//! The engine never sees the container format directly: it opens an entry,
//! appends the bytes of that entry in order and closes it. Entries are never
//! revisited, so a sink can compress and write them as they arrive.

pub mod file;
pub mod memory;
pub mod zip;

pub use file::FileArchive;
pub use memory::MemoryArchive;
pub use zip::ZipArchiveWriter;

use crate::error::Result;

/// A forward-only destination for archive entries.
///
/// Calls always come in the order `begin_entry`, any number of `append`,
/// `end_entry`, repeated per entry, followed by a single `finalize`.
pub trait ArchiveSink {
    fn begin_entry(&mut self, name: &str) -> Result<()>;

    fn append(&mut self, bytes: &[u8]) -> Result<()>;

    fn end_entry(&mut self) -> Result<()>;

    /// Complete the archive. Nothing may be written afterwards.
    fn finalize(&mut self) -> Result<()>;
}

impl<S: ArchiveSink + ?Sized> ArchiveSink for &mut S {
    fn begin_entry(&mut self, name: &str) -> Result<()> {
        (**self).begin_entry(name)
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).append(bytes)
    }

    fn end_entry(&mut self) -> Result<()> {
        (**self).end_entry()
    }

    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }
}

impl<S: ArchiveSink + ?Sized> ArchiveSink for Box<S> {
    fn begin_entry(&mut self, name: &str) -> Result<()> {
        (**self).begin_entry(name)
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).append(bytes)
    }

    fn end_entry(&mut self) -> Result<()> {
        (**self).end_entry()
    }

    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }
}
