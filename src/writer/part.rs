//! Resumable part writers and the loop that drives them into an archive sink

use super::buffer::SpreadsheetBuffer;
use super::value::try_write_escaped;
use crate::archive::ArchiveSink;
use crate::error::{Result, SpreadsheetError};
use crate::options::CancellationToken;
use log::trace;
use std::borrow::Cow;

/// Outcome of one [`PartWriter::advance`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A chunk was written; more may follow
    Wrote,
    /// The next chunk did not fit. Flush and call again; the same chunk is retried.
    Blocked,
    /// Nothing left to write
    Done,
}

/// An incremental XML generator writing through a [`SpreadsheetBuffer`].
pub trait PartWriter {
    fn advance(&mut self, buffer: &mut SpreadsheetBuffer) -> Step;
}

/// One piece of a [`Fragment`]
pub(crate) enum Piece {
    /// Fixed markup, appended atomically
    Raw(Cow<'static, str>),
    /// User text, escaped and resumable at character granularity
    Text(String),
}

/// A short run of pieces forming one logical element of a part.
///
/// Raw pieces are small enough to fit an empty buffer; text pieces may be
/// arbitrarily long.
#[derive(Default)]
pub(crate) struct Fragment {
    pieces: Vec<Piece>,
    index: usize,
    offset: usize,
}

impl Fragment {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn raw(markup: impl Into<Cow<'static, str>>) -> Self {
        Fragment::new().push(markup)
    }

    pub(crate) fn push(mut self, markup: impl Into<Cow<'static, str>>) -> Self {
        self.pieces.push(Piece::Raw(markup.into()));
        self
    }

    pub(crate) fn text(mut self, text: impl Into<String>) -> Self {
        self.pieces.push(Piece::Text(text.into()));
        self
    }

    /// Write the remaining pieces; `false` means blocked.
    pub(crate) fn write(&mut self, buffer: &mut SpreadsheetBuffer) -> bool {
        while let Some(piece) = self.pieces.get(self.index) {
            let written = match piece {
                Piece::Raw(markup) => buffer.try_write(markup.as_bytes()),
                Piece::Text(text) => try_write_escaped(buffer, text, &mut self.offset),
            };
            if !written {
                return false;
            }
            self.index += 1;
            self.offset = 0;
        }
        true
    }
}

/// A part described as a sequence of fragments produced by a section cursor.
///
/// `next_fragment` advances the cursor and returns the fragment for the new
/// position, or `None` once the footer has been produced.
pub(crate) trait FragmentSource {
    fn next_fragment(&mut self) -> Option<Fragment>;
}

/// Adapts a [`FragmentSource`] to the [`PartWriter`] protocol.
pub(crate) struct Fragments<S> {
    source: S,
    pending: Option<Fragment>,
}

impl<S: FragmentSource> Fragments<S> {
    pub(crate) fn new(source: S) -> Self {
        Fragments {
            source,
            pending: None,
        }
    }
}

impl<S: FragmentSource> PartWriter for Fragments<S> {
    fn advance(&mut self, buffer: &mut SpreadsheetBuffer) -> Step {
        if self.pending.is_none() {
            self.pending = self.source.next_fragment();
        }
        let Some(fragment) = self.pending.as_mut() else {
            return Step::Done;
        };
        if !fragment.write(buffer) {
            return Step::Blocked;
        }
        self.pending = None;
        Step::Wrote
    }
}

/// The staging buffer together with the sink it drains into.
pub(crate) struct PartOutput<S> {
    pub(crate) sink: S,
    pub(crate) buffer: SpreadsheetBuffer,
    cancellation: Option<CancellationToken>,
}

impl<S: ArchiveSink> PartOutput<S> {
    pub(crate) fn new(sink: S, buffer_size: usize, cancellation: Option<CancellationToken>) -> Self {
        PartOutput {
            sink,
            buffer: SpreadsheetBuffer::new(buffer_size),
            cancellation,
        }
    }

    /// Hand the buffered bytes to the sink and reset the buffer.
    pub(crate) fn flush(&mut self) -> Result<()> {
        if self
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(SpreadsheetError::Cancelled);
        }
        if self.buffer.is_empty() {
            return Ok(());
        }
        trace!("Flushing {} bytes to archive", self.buffer.len());
        self.sink.append(self.buffer.pending())?;
        self.buffer.clear();
        Ok(())
    }

    /// Run `writer` to completion, flushing whenever it blocks.
    ///
    /// # Panics
    ///
    /// Panics if a writer blocks on an empty buffer, which means it produced
    /// a chunk larger than the whole buffer.
    pub(crate) fn drive<W: PartWriter + ?Sized>(&mut self, writer: &mut W) -> Result<()> {
        loop {
            match writer.advance(&mut self.buffer) {
                Step::Wrote => {}
                Step::Done => return Ok(()),
                Step::Blocked => {
                    assert!(
                        !self.buffer.is_empty(),
                        "part writer blocked on an empty {}-byte buffer",
                        self.buffer.capacity()
                    );
                    self.flush()?;
                }
            }
        }
    }

    /// Write a complete archive entry.
    pub(crate) fn write_part<W: PartWriter + ?Sized>(&mut self, name: &str, writer: &mut W) -> Result<()> {
        self.sink.begin_entry(name)?;
        self.drive(writer)?;
        self.flush()?;
        self.sink.end_entry()
    }

    /// Write a complete archive entry from bytes that need no staging.
    pub(crate) fn write_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.flush()?;
        self.sink.begin_entry(name)?;
        self.sink.append(bytes)?;
        self.sink.end_entry()
    }
}
