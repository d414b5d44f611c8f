//! Bit granular reading and writing over byte streams.
//!
//! Both sides work most-significant-bit first: the first bit written lands in
//! bit 7 of the first byte.
use std::io::{self, Bytes, Read, Write};

use bit_vec::BitVec;

/// Packs individual bits into bytes and writes them to a sink.
pub struct BitWriter<W: Write> {
    sink: W,
    acc: u8,
    filled: u8, // 0-7
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Creates a writer with an empty accumulator over `sink`.
    ///
    /// # Arguments
    ///
    /// * `sink` - Receives every completed byte. Wrap it in a `BufWriter` when
    /// writes are expensive, the writer emits one byte at a time.
    pub fn new(sink: W) -> Self {
        BitWriter {
            sink,
            acc: 0,
            filled: 0,
            bits_written: 0,
        }
    }

    /// Appends a single bit, emitting a byte once eight have accumulated.
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.acc = (self.acc << 1) | bit as u8;
        self.filled += 1;
        self.bits_written += 1;

        if self.filled == 8 {
            self.sink.write_all(&[self.acc])?;
            self.acc = 0;
            self.filled = 0;
        }

        Ok(())
    }

    /// Appends the eight bits of `byte`, most significant first.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the sink when a byte is completed.
    pub fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        for i in (0..8).rev() {
            self.write_bit(byte & (1 << i) != 0)?;
        }
        Ok(())
    }

    /// Appends the 32 bits of `value`, most significant first, regardless of
    /// host byte order.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the sink when a byte is completed.
    pub fn write_u32(&mut self, value: u32) -> io::Result<()> {
        for i in (0..32).rev() {
            self.write_bit(value & (1 << i) != 0)?;
        }
        Ok(())
    }

    /// Appends every bit of `bits` in order.
    pub fn write_bits(&mut self, bits: &BitVec) -> io::Result<()> {
        for bit in bits.iter() {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Pads a partial trailing byte with zero bits and emits it, then flushes
    /// the sink. Does not emit anything when the accumulator is empty.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.filled > 0 {
            let byte = self.acc << (8 - self.filled);
            self.sink.write_all(&[byte])?;
            self.acc = 0;
            self.filled = 0;
        }
        self.sink.flush()
    }

    /// Number of bits written so far, not counting padding.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Returns the sink. Call `flush` first or pending bits are lost.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Pulls bytes from a source on demand and hands them out one bit at a time.
pub struct BitReader<R: Read> {
    bytes: Bytes<R>,
    current: u8,
    remaining: u8, // bits of `current` not yet handed out
}

impl<R: Read> BitReader<R> {
    /// Creates a reader over `source`. Nothing is read until the first bit is
    /// requested.
    pub fn new(source: R) -> Self {
        BitReader {
            bytes: source.bytes(),
            current: 0,
            remaining: 0,
        }
    }

    /// Makes sure at least one bit is buffered. Returns false at end of stream.
    fn fill(&mut self) -> io::Result<bool> {
        if self.remaining > 0 {
            return Ok(true);
        }

        match self.bytes.next() {
            Some(byte) => {
                self.current = byte?;
                self.remaining = 8;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns the next bit without consuming it, or `None` at end of stream.
    pub fn peek_bit(&mut self) -> io::Result<Option<bool>> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(Some(self.current & (1 << (self.remaining - 1)) != 0))
    }

    /// Consumes the next bit, or returns `None` at end of stream.
    pub fn read_bit(&mut self) -> io::Result<Option<bool>> {
        let bit = self.peek_bit()?;
        if bit.is_some() {
            self.remaining -= 1;
        }
        Ok(bit)
    }

    fn read_exact_bit(&mut self) -> io::Result<bool> {
        self.read_bit()?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "stream ended in the middle of a field")
        })
    }

    /// Reads eight bits as a byte, most significant first.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if the stream ends before all eight bits are
    /// read, or any error raised by the source.
    pub fn read_byte(&mut self) -> io::Result<u8> {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | self.read_exact_bit()? as u8;
        }
        Ok(byte)
    }

    /// Reads 32 bits as an unsigned integer, most significant first.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if the stream ends before all 32 bits are
    /// read, or any error raised by the source.
    pub fn read_u32(&mut self) -> io::Result<u32> {
        let mut value = 0u32;
        for _ in 0..32 {
            value = (value << 1) | self.read_exact_bit()? as u32;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_msb_first() {
        let mut writer = BitWriter::new(Vec::new());
        for bit in [true, false, true, true, false, false, false, true] {
            writer.write_bit(bit).unwrap();
        }
        writer.flush().unwrap();
        assert_eq!(writer.into_inner(), vec![0b1011_0001]);
    }

    #[test]
    fn flush_pads_with_zeros() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bit(true).unwrap();
        writer.write_bit(true).unwrap();
        writer.write_bit(false).unwrap();
        writer.write_bit(true).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.bits_written(), 4);
        assert_eq!(writer.into_inner(), vec![0b1101_0000]);
    }

    #[test]
    fn flush_on_byte_boundary_adds_nothing() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_byte(0xA5).unwrap();
        writer.flush().unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.into_inner(), vec![0xA5]);
    }

    #[test]
    fn u32_is_big_endian_by_bit() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_u32(0x0102_0304).unwrap();
        writer.flush().unwrap();
        assert_eq!(writer.into_inner(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn unaligned_fields_survive() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bit(true).unwrap();
        writer.write_byte(0x7F).unwrap();
        writer.write_u32(0xDEAD_BEEF).unwrap();
        writer.write_bits(&BitVec::from_fn(3, |i| i != 1)).unwrap();
        writer.flush().unwrap();
        let bytes = writer.into_inner();
        assert_eq!(bytes.len(), 6);

        let mut reader = BitReader::new(bytes.as_slice());
        assert_eq!(reader.read_bit().unwrap(), Some(true));
        assert_eq!(reader.read_byte().unwrap(), 0x7F);
        assert_eq!(reader.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.read_bit().unwrap(), Some(true));
        assert_eq!(reader.read_bit().unwrap(), Some(false));
        assert_eq!(reader.read_bit().unwrap(), Some(true));
    }

    #[test]
    fn end_of_stream_is_distinct_from_zero() {
        let mut reader = BitReader::new(&[0x00][..]);
        for _ in 0..8 {
            assert_eq!(reader.read_bit().unwrap(), Some(false));
        }
        assert_eq!(reader.peek_bit().unwrap(), None);
        assert_eq!(reader.read_bit().unwrap(), None);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut reader = BitReader::new(&[0x80][..]);
        assert_eq!(reader.peek_bit().unwrap(), Some(true));
        assert_eq!(reader.peek_bit().unwrap(), Some(true));
        assert_eq!(reader.read_bit().unwrap(), Some(true));
        assert_eq!(reader.read_bit().unwrap(), Some(false));
    }

    #[test]
    fn truncated_field_fails() {
        let mut reader = BitReader::new(&[0xFF, 0xFF][..]);
        let err = reader.read_u32().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let mut reader = BitReader::new(&[][..]);
        assert_eq!(reader.read_byte().unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }
}
