//! Byte frequency counting
use std::io::{self, Read};

/// Occurrence count of every byte value in an input, plus the total length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
    total: u64,
}

impl Default for FrequencyTable {
    fn default() -> Self {
        FrequencyTable {
            counts: [0; 256],
            total: 0,
        }
    }
}

impl FrequencyTable {
    /// Creates a table with every count at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the bytes of an in-memory buffer.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut table = FrequencyTable::new();
        table.add(bytes);
        table
    }

    /// Counts every byte of `source` until it is exhausted.
    ///
    /// # Arguments
    ///
    /// * `source` - Read in 8 KiB chunks, so it needs no extra buffering.
    ///
    /// # Errors
    ///
    /// Returns any error raised while reading from `source`.
    pub fn from_reader(mut source: impl Read) -> io::Result<Self> {
        let mut table = FrequencyTable::new();
        let mut buf = [0u8; 8192];

        loop {
            match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => table.add(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(table)
    }

    /// Adds the bytes of `chunk` to the running counts.
    pub fn add(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            self.counts[byte as usize] += 1;
        }
        self.total += chunk.len() as u64;
    }

    /// Number of times `byte` was seen.
    pub fn count(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct byte values seen.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Iterates `(byte, count)` pairs for bytes that occur, in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(byte, &count)| (byte as u8, count))
    }
}
