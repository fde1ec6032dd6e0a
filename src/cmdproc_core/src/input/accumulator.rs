use cmdproc_config::{IGNORE_CHARS, LINE_TERMINATOR};

/// A fixed-size, heapless byte buffer collecting one command line.
///
/// Bytes arrive one at a time from the transport. Ignorable whitespace is
/// filtered out, the line terminator freezes the buffer and marks it ready,
/// and nothing further is accepted until the line has been consumed.
///
/// # Type Parameters
/// - `N`: buffer size. At most `N - 1` bytes of text are stored, the last
///   slot holds the terminating NUL.
pub struct LineAccumulator<const N: usize> {
    buffer: [u8; N],
    length: usize,
    ready: bool,
    overflowed: bool,
}

impl<const N: usize> LineAccumulator<N> {
    /// Creates a new, empty accumulator.
    pub const fn new() -> Self {
        Self {
            buffer: [0; N],
            length: 0,
            ready: false,
            overflowed: false,
        }
    }

    /// Feeds one byte from the transport.
    ///
    /// - NUL and bytes from `IGNORE_CHARS` are skipped.
    /// - While a line is ready every byte is discarded.
    /// - The terminator marks the line ready.
    /// - When the buffer is full the byte is dropped and the line is flagged
    ///   as overflowed.
    pub fn submit(&mut self, byte: u8) {
        if byte == 0 || IGNORE_CHARS.contains(&byte) || self.ready {
            return;
        }
        if byte == LINE_TERMINATOR {
            if self.length < N {
                self.buffer[self.length] = 0;
            }
            self.ready = true;
            trace!("line ready, {} bytes", self.length);
        } else if self.length + 1 >= N {
            if !self.overflowed {
                warn!("input buffer full, dropping bytes until terminator");
            }
            self.overflowed = true;
        } else {
            self.buffer[self.length] = byte;
            self.length += 1;
        }
    }

    /// Returns `true` once a terminated line is waiting to be consumed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Returns `true` if bytes were dropped from the current line.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// The accumulated text, without terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.length]
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Discards the current line and re-arms the accumulator.
    pub fn clear(&mut self) {
        self.length = 0;
        self.ready = false;
        self.overflowed = false;
    }
}

impl<const N: usize> Default for LineAccumulator<N> {
    fn default() -> Self {
        Self::new()
    }
}
