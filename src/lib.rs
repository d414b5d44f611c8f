//! # Huffman
//!
//! `huffman` Library module, a simple implementation of the Huffman coding algorithm in Rust.
//!
//! ## Usage
//!
//! ```no_run
//! huffman::huff("path/to/file", "path/to/file.huff")?;
//!
//! huffman::puff("path/to/file.huff", "path/to/file.out")?;
//! # Ok::<(), huffman::HuffError>(())
//! ```
//!
//! In-memory buffers work the same way:
//!
//! ```
//! let packed = huffman::encode_bytes(b"aaab")?;
//! assert_eq!(huffman::decode_bytes(&packed)?, b"aaab");
//! # Ok::<(), huffman::HuffError>(())
//! ```

/// Bit granular reader and writer
pub mod bit_io;

/// Byte to code mapping
pub mod code_table;

/// Configuration module for the huffman cli tool
mod config;

/// Error types
mod error;

/// Byte frequency counting
pub mod frequency;

/// Huffman coding implementation
mod huffman_utils;

/// Huffman tree construction and serialization
pub mod tree;

use log::debug;

pub use config::{Config, Mode};
pub use error::{HuffError, Phase, Result};
pub use huffman_utils::{decode, decode_bytes, encode, encode_bytes, huff, puff, EncodeStats};

/// Runs the huffman cli tool with the provided configuration
///
/// # Arguments
///
/// * `config` - The configuration for the huffman cli tool
///
/// # Returns
///
/// A Result containing nothing if successful, or an error if not
pub fn run(config: Config) -> Result<()> {
    debug!("running {:?}", config);

    match config.mode {
        Mode::Compress => huff(&config.input_path, &config.output_path).map(|_| ()),
        Mode::Decompress => puff(&config.input_path, &config.output_path).map(|_| ()),
    }
}
