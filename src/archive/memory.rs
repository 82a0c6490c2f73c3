//! In-memory sink that keeps every entry uncompressed

use super::ArchiveSink;
use crate::error::{Result, SpreadsheetError};

/// Records entries as plain bytes, in write order.
///
/// Useful for inspecting generated parts without a zip round trip.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    entries: Vec<(String, Vec<u8>)>,
    open: bool,
    finalized: bool,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents of the entry called `name`
    pub fn entry(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Entry names in the order they were written
    pub fn entry_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn into_entries(self) -> Vec<(String, Vec<u8>)> {
        self.entries
    }

    fn check_writable(&self) -> Result<()> {
        if self.finalized {
            return Err(SpreadsheetError::archive("archive is already finalized"));
        }
        Ok(())
    }
}

impl ArchiveSink for MemoryArchive {
    fn begin_entry(&mut self, name: &str) -> Result<()> {
        self.check_writable()?;
        if self.open {
            return Err(SpreadsheetError::archive("previous entry was not ended"));
        }
        if self.entry(name).is_some() {
            return Err(SpreadsheetError::archive(format!("duplicate entry '{name}'")));
        }
        self.entries.push((name.to_string(), Vec::new()));
        self.open = true;
        Ok(())
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.check_writable()?;
        match self.entries.last_mut() {
            Some((_, data)) if self.open => {
                data.extend_from_slice(bytes);
                Ok(())
            }
            _ => Err(SpreadsheetError::archive("no entry started")),
        }
    }

    fn end_entry(&mut self) -> Result<()> {
        self.check_writable()?;
        if !self.open {
            return Err(SpreadsheetError::archive("no entry started"));
        }
        self.open = false;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.check_writable()?;
        if self.open {
            return Err(SpreadsheetError::archive("last entry was not ended"));
        }
        self.finalized = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_entries_in_order() {
        let mut archive = MemoryArchive::new();
        archive.begin_entry("a.xml").unwrap();
        archive.append(b"<a>").unwrap();
        archive.append(b"</a>").unwrap();
        archive.end_entry().unwrap();
        archive.begin_entry("b.xml").unwrap();
        archive.end_entry().unwrap();
        archive.finalize().unwrap();

        assert_eq!(archive.entry("a.xml"), Some(b"<a></a>".as_slice()));
        assert_eq!(archive.entry("b.xml"), Some(b"".as_slice()));
        assert_eq!(archive.entry_names().collect::<Vec<_>>(), ["a.xml", "b.xml"]);
        assert!(archive.is_finalized());
    }

    #[test]
    fn test_protocol_violations() {
        let mut archive = MemoryArchive::new();
        assert!(archive.append(b"x").is_err());
        archive.begin_entry("a.xml").unwrap();
        assert!(archive.begin_entry("b.xml").is_err());
        archive.end_entry().unwrap();
        assert!(archive.begin_entry("a.xml").is_err());
        archive.finalize().unwrap();
        assert!(archive.begin_entry("c.xml").is_err());
    }
}
