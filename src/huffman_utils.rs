//! A module that provides functions for compressing and decompressing files using the Huffman coding algorithm.
//!
//! Compressed stream layout, every field most significant bit first:
//!
//! ```text
//! [u32 original length N]
//! [tree, preorder: leaf = 1 <8 bit byte>, node = 0 <left> <right>]
//! [payload: the code of each of the N input bytes]
//! [0-7 zero bits of padding]
//! ```
//!
//! An empty input is stored as the length field alone.
use std::{
    fs::File,
    io::{BufReader, BufWriter, Cursor, Read, Seek, Write},
    path::Path,
};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::bit_io::{BitReader, BitWriter};
use crate::code_table::CodeTable;
use crate::error::{HuffError, Phase, Result};
use crate::frequency::FrequencyTable;
use crate::tree::HuffNode;

/// Summary of a single compression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeStats {
    /// Length of the original input in bytes
    pub input_len: u64,
    /// Length of the compressed stream in bytes
    pub output_len: u64,
    /// Number of distinct byte values in the input
    pub distinct_symbols: usize,
}

impl EncodeStats {
    /// Compressed size as a fraction of the original size, 0 for empty input.
    pub fn ratio(&self) -> f64 {
        if self.input_len == 0 {
            0.0
        } else {
            self.output_len as f64 / self.input_len as f64
        }
    }
}

/// Compresses a file using the Huffman coding algorithm.
///
/// The compressed stream is written to a temporary file next to
/// `output_path` and moved into place once encoding succeeds, so the input
/// and output may be the same file. Inputs that cannot be rewound, such as
/// pipes, are read into memory first.
///
/// # Arguments
///
/// * `input_path` - The file to be compressed.
///
/// * `output_path` - Where the compressed stream is written. Replaced if it exists.
///
/// # Returns
///
/// Sizes of the input and the compressed stream.
///
/// # Errors
///
/// Returns an error if the input cannot be read or the output cannot be
/// written. Nothing is left at `output_path` on failure.
pub fn huff(input_path: impl AsRef<Path>, output_path: impl AsRef<Path>) -> Result<EncodeStats> {
    let (input_path, output_path) = (input_path.as_ref(), output_path.as_ref());

    let mut input = File::open(input_path).map_err(|e| HuffError::io(Phase::OpenInput, e))?;
    let mut output = temp_file_beside(output_path)?;
    let sink = BufWriter::new(output.as_file_mut());

    let stats = if input.rewind().is_ok() {
        encode(BufReader::new(input), sink)?
    } else {
        debug!("{} is not seekable, buffering it", input_path.display());
        let mut data = Vec::new();
        input
            .read_to_end(&mut data)
            .map_err(|e| HuffError::io(Phase::ReadInput, e))?;
        encode(Cursor::new(data), sink)?
    };

    persist(output, output_path)?;

    info!(
        "compressed {} ({} bytes) into {} ({} bytes, {:.1}%)",
        input_path.display(),
        stats.input_len,
        output_path.display(),
        stats.output_len,
        stats.ratio() * 100.0
    );

    Ok(stats)
}

/// Decompresses a file that was compressed using [`huff`].
///
/// The original bytes are streamed into a temporary file next to
/// `output_path`, which only replaces `output_path` after the whole stream
/// decoded cleanly. A corrupt input leaves no output behind.
///
/// # Arguments
///
/// * `input_path` - The compressed file.
///
/// * `output_path` - Where the original bytes are written.
///
/// # Returns
///
/// The number of bytes written to `output_path`.
///
/// # Errors
///
/// Returns an error if the input cannot be read, is not a valid compressed
/// stream, or the output cannot be written.
pub fn puff(input_path: impl AsRef<Path>, output_path: impl AsRef<Path>) -> Result<u64> {
    let (input_path, output_path) = (input_path.as_ref(), output_path.as_ref());

    let input = File::open(input_path).map_err(|e| HuffError::io(Phase::OpenInput, e))?;
    let mut output = temp_file_beside(output_path)?;
    let written = decode(BufReader::new(input), output.as_file_mut())?;

    persist(output, output_path)?;

    info!(
        "decompressed {} into {} ({} bytes)",
        input_path.display(),
        output_path.display(),
        written
    );

    Ok(written)
}

/// Creates a temporary file in the directory that will hold `path`.
///
/// The file is deleted when dropped unless it is persisted.
fn temp_file_beside(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir).map_err(|e| HuffError::io(Phase::CreateOutput, e))
}

fn persist(file: NamedTempFile, path: &Path) -> Result<()> {
    file.persist(path)
        .map(|_| ())
        .map_err(|e| HuffError::io(Phase::WriteOutput, e.error))
}

/// Encodes everything in `source` into `sink`.
///
/// The source is read twice: once to count byte frequencies and, after
/// rewinding, once more to emit the codes. It is read as is, so wrap slow
/// sources in a `BufReader`.
///
/// # Returns
///
/// Sizes of the input and the compressed stream.
///
/// # Errors
///
/// Returns an error if reading, rewinding or writing fails, or if the source
/// holds more than `u32::MAX` bytes.
pub fn encode<R: Read + Seek, W: Write>(mut source: R, sink: W) -> Result<EncodeStats> {
    let frequencies =
        FrequencyTable::from_reader(&mut source).map_err(|e| HuffError::io(Phase::ReadInput, e))?;
    let len = u32::try_from(frequencies.total())
        .map_err(|_| HuffError::InputTooLarge(frequencies.total()))?;

    let mut writer = BitWriter::new(sink);
    let write_err = |e| HuffError::io(Phase::WriteOutput, e);

    writer.write_u32(len).map_err(write_err)?;

    if let Some(root) = HuffNode::build(&frequencies) {
        let codes = CodeTable::from_tree(&root);
        debug!(
            "{} distinct bytes, tree depth {}, {} payload bits",
            codes.len(),
            root.depth(),
            codes.encoded_bits(&frequencies)
        );

        root.write_to(&mut writer).map_err(write_err)?;
        drop(root);

        source.rewind().map_err(|e| HuffError::io(Phase::ReadInput, e))?;
        write_payload(source, &codes, &mut writer)?;
    } else {
        debug!("empty input, writing length only");
    }

    writer.flush().map_err(write_err)?;

    Ok(EncodeStats {
        input_len: frequencies.total(),
        output_len: writer.bits_written().div_ceil(8),
        distinct_symbols: frequencies.distinct(),
    })
}

fn write_payload<R: Read, W: Write>(
    source: R,
    codes: &CodeTable,
    writer: &mut BitWriter<W>,
) -> Result<()> {
    for byte in source.bytes() {
        let byte = byte.map_err(|e| HuffError::io(Phase::ReadInput, e))?;
        // the source changed between the two passes
        let code = codes.get(byte).ok_or_else(|| HuffError::Io {
            phase: Phase::ReadInput,
            source: std::io::Error::other(format!("byte {byte:#04x} was not counted")),
        })?;
        writer
            .write_bits(code)
            .map_err(|e| HuffError::io(Phase::WriteOutput, e))?;
    }

    Ok(())
}

/// Decodes a compressed stream from `source`, writing the original bytes to `sink`.
///
/// Bytes following a complete payload are ignored.
///
/// # Returns
///
/// The number of bytes written to `sink`.
///
/// # Errors
///
/// Returns `CorruptStream` if the stream ends before the length, the tree or
/// all of the payload has been read, and `Io` if reading or writing fails.
pub fn decode<R: Read, W: Write>(source: R, sink: W) -> Result<u64> {
    let mut reader = BitReader::new(source);
    let mut sink = BufWriter::new(sink);
    let write_err = |e| HuffError::io(Phase::WriteOutput, e);

    let len = reader
        .read_u32()
        .map_err(|e| HuffError::io(Phase::Length, e))?;

    if len == 0 {
        debug!("empty stream");
        return Ok(0);
    }

    let root = HuffNode::read_from(&mut reader).map_err(|e| HuffError::io(Phase::Tree, e))?;
    debug!("{len} bytes to decode, {} leaves", root.leaf_count());

    if let HuffNode::Leaf { byte, .. } = root {
        // a lone leaf has an empty code, the payload holds no bits
        let chunk = [byte; 4096];
        let mut remaining = len as usize;
        while remaining > 0 {
            let n = remaining.min(chunk.len());
            sink.write_all(&chunk[..n]).map_err(write_err)?;
            remaining -= n;
        }
    } else {
        for emitted in 0..len {
            let byte = root
                .decode_symbol(&mut reader)
                .map_err(|e| HuffError::io(Phase::Payload, e))?
                .ok_or_else(|| {
                    HuffError::corrupt(
                        Phase::Payload,
                        format!("stream ended after {emitted} of {len} bytes"),
                    )
                })?;
            sink.write_all(&[byte]).map_err(write_err)?;
        }
    }

    sink.flush().map_err(write_err)?;
    Ok(len as u64)
}

/// Compresses an in-memory buffer.
pub fn encode_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode(Cursor::new(data), &mut out)?;
    Ok(out)
}

/// Decompresses an in-memory buffer.
pub fn decode_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    decode(data, &mut out)?;
    Ok(out)
}
