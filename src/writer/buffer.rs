//! Fixed-capacity staging buffer

use crate::options::MIN_BUFFER_SIZE;

/// Bounded byte buffer that every part is written through before it reaches
/// the archive sink.
///
/// Writes are all-or-nothing: [`try_write`](Self::try_write) either appends
/// every byte or leaves the buffer untouched, so a writer that gets `false`
/// can flush and retry the identical write.
pub struct SpreadsheetBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl SpreadsheetBuffer {
    /// Allocate a buffer; capacities below [`MIN_BUFFER_SIZE`] are raised to it.
    pub fn new(capacity: usize) -> Self {
        SpreadsheetBuffer {
            data: vec![0u8; capacity.max(MIN_BUFFER_SIZE)].into_boxed_slice(),
            len: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes written since the last flush
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.len
    }

    /// Append `bytes` if all of them fit.
    #[inline]
    pub fn try_write(&mut self, bytes: &[u8]) -> bool {
        let Some(span) = self.free_space().get_mut(..bytes.len()) else {
            return false;
        };
        span.copy_from_slice(bytes);
        self.advance(bytes.len());
        true
    }

    /// Append several pieces as one atomic write.
    pub fn try_write_all(&mut self, pieces: &[&[u8]]) -> bool {
        let total: usize = pieces.iter().map(|p| p.len()).sum();
        if total > self.remaining() {
            return false;
        }
        for piece in pieces {
            self.free_space()[..piece.len()].copy_from_slice(piece);
            self.advance(piece.len());
        }
        true
    }

    /// Writable remainder of the buffer. Pair with [`advance`](Self::advance).
    #[inline]
    pub fn free_space(&mut self) -> &mut [u8] {
        &mut self.data[self.len..]
    }

    /// Commit `n` bytes placed into [`free_space`](Self::free_space).
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the remaining capacity.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        assert!(
            n <= self.remaining(),
            "advanced {n} bytes with only {} available",
            self.remaining()
        );
        self.len += n;
    }

    /// Bytes waiting to be flushed
    #[inline]
    pub fn pending(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Reset the cursor after the pending bytes were handed to the sink
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_clamped() {
        let buffer = SpreadsheetBuffer::new(3);
        assert_eq!(buffer.capacity(), MIN_BUFFER_SIZE);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_try_write_is_atomic() {
        let mut buffer = SpreadsheetBuffer::new(MIN_BUFFER_SIZE);
        let big = vec![b'x'; MIN_BUFFER_SIZE - 2];
        assert!(buffer.try_write(&big));
        assert!(!buffer.try_write(b"abc"));
        assert_eq!(buffer.len(), MIN_BUFFER_SIZE - 2);
        assert!(buffer.try_write(b"ab"));
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_try_write_all() {
        let mut buffer = SpreadsheetBuffer::new(MIN_BUFFER_SIZE);
        assert!(buffer.try_write_all(&[b"<a", b">", b"</a>"]));
        assert_eq!(buffer.pending(), b"<a></a>");

        let fill = vec![b' '; buffer.remaining() - 3];
        assert!(buffer.try_write(&fill));
        assert!(!buffer.try_write_all(&[b"ab", b"cd"]));
        assert_eq!(buffer.remaining(), 3);
    }

    #[test]
    fn test_free_space_and_advance() {
        let mut buffer = SpreadsheetBuffer::new(MIN_BUFFER_SIZE);
        let n = {
            let span = buffer.free_space();
            span[..3].copy_from_slice(b"123");
            3
        };
        buffer.advance(n);
        assert_eq!(buffer.pending(), b"123");
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    #[should_panic(expected = "advanced")]
    fn test_advance_past_capacity_panics() {
        let mut buffer = SpreadsheetBuffer::new(MIN_BUFFER_SIZE);
        buffer.advance(MIN_BUFFER_SIZE + 1);
    }
}
