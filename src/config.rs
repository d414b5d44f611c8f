//! Configuration module for the huffman cli tool
use std::{path::PathBuf, str::FromStr};

use crate::error::HuffError;

/// The operation selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Decompress,
}

impl FromStr for Mode {
    type Err = HuffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "huff" | "compress" | "c" => Ok(Mode::Compress),
            "puff" | "decompress" | "d" => Ok(Mode::Decompress),
            _ => Err(HuffError::UnsupportedMode(s.to_owned())),
        }
    }
}

/// Configuration struct for the huffman cli tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl Config {
    /// Builds a new Config struct from the provided arguments
    ///
    /// # Arguments
    ///
    /// * `args` - An iterator of arguments passed into the cli tool, program name first,
    /// followed by `<mode> <input-path> <output-path>`
    ///
    /// # Returns
    ///
    /// A Result containing the Config struct if successful, or an error if not
    ///
    /// # Errors
    ///
    /// * `InvalidArguments` if the number of arguments is incorrect
    ///
    /// * `UnsupportedMode` if the mode is not recognized
    pub fn build(
        mut args: impl Iterator<Item = String> + ExactSizeIterator,
    ) -> Result<Config, HuffError> {
        if args.len() < 4 {
            return Err(HuffError::InvalidArguments("Not enough arguments"));
        } else if args.len() > 4 {
            return Err(HuffError::InvalidArguments("Too many arguments"));
        }

        args.next();

        let mode = match args.next() {
            Some(arg) => arg.parse()?,
            None => return Err(HuffError::InvalidArguments("No mode provided")),
        };

        let input_path = match args.next() {
            Some(arg) => PathBuf::from(arg),
            None => return Err(HuffError::InvalidArguments("No input path provided")),
        };

        let output_path = match args.next() {
            Some(arg) => PathBuf::from(arg),
            None => return Err(HuffError::InvalidArguments("No output path provided")),
        };

        Ok(Config {
            mode,
            input_path,
            output_path,
        })
    }
}
