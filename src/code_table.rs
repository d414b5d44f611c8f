//! Byte to code mapping derived from a Huffman tree
use std::collections::{btree_map, BTreeMap};

use bit_vec::BitVec;
use log::trace;

use crate::frequency::FrequencyTable;
use crate::tree::HuffNode;

/// The Huffman code of every byte value present in a tree.
///
/// A path to the left contributes a `0` bit, a path to the right a `1` bit.
/// A tree made of a single leaf gives that byte the empty code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, BitVec>,
}

impl CodeTable {
    /// Derives the code table by walking every root to leaf path of `root`.
    pub fn from_tree(root: &HuffNode) -> CodeTable {
        let mut table = CodeTable::default();
        table.gather(root, &mut BitVec::new());
        table
    }

    fn gather(&mut self, node: &HuffNode, path: &mut BitVec) {
        match node {
            HuffNode::Leaf { byte, .. } => {
                trace!("code for {byte:#04x}: {path:?}");
                self.codes.insert(*byte, path.clone());
            }
            HuffNode::Internal { left, right, .. } => {
                path.push(false);
                self.gather(left, path);
                path.pop();

                path.push(true);
                self.gather(right, path);
                path.pop();
            }
        }
    }

    /// Returns the code of `byte`, or `None` if it does not occur in the tree.
    pub fn get(&self, byte: u8) -> Option<&BitVec> {
        self.codes.get(&byte)
    }

    /// Number of bytes with a code
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterates `(byte, code)` pairs in ascending byte order.
    pub fn iter(&self) -> btree_map::Iter<'_, u8, BitVec> {
        self.codes.iter()
    }

    /// Number of payload bits needed to encode an input with the given
    /// frequencies. Bytes missing from the table contribute nothing.
    pub fn encoded_bits(&self, frequencies: &FrequencyTable) -> u64 {
        frequencies
            .iter()
            .filter_map(|(byte, count)| self.get(byte).map(|code| code.len() as u64 * count))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    use super::*;

    fn table_for(data: &[u8]) -> CodeTable {
        let tree = HuffNode::build(&FrequencyTable::from_bytes(data)).unwrap();
        CodeTable::from_tree(&tree)
    }

    fn is_prefix(a: &BitVec, b: &BitVec) -> bool {
        a.len() <= b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
    }

    #[test]
    fn aaab_codes() {
        let table = table_for(b"aaab");
        let a = table.get(b'a').unwrap();
        let b = table.get(b'b').unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert!(a.len() <= b.len());
        assert_ne!(a, b);
    }

    #[test]
    fn single_byte_has_empty_code() {
        let table = table_for(&[7; 1000]);
        assert_eq!(table.len(), 1);
        assert!(table.get(7).unwrap().is_empty());
    }

    #[quickcheck]
    fn codes_are_prefix_free(data: Vec<u8>) -> TestResult {
        if data.is_empty() {
            return TestResult::discard();
        }
        let table = table_for(&data);
        if table.len() != FrequencyTable::from_bytes(&data).distinct() {
            return TestResult::failed();
        }

        for (x, code_x) in table.iter() {
            for (y, code_y) in table.iter() {
                if x != y && is_prefix(code_x, code_y) {
                    return TestResult::error(format!("{x} is a prefix of {y}"));
                }
            }
        }
        TestResult::passed()
    }

    #[test]
    fn frequent_bytes_get_shorter_codes() {
        let mut data = vec![b'e'; 500];
        data.extend_from_slice(&[b'q'; 5]);
        data.extend_from_slice(b"zxjkvw");
        let table = table_for(&data);
        let e = table.get(b'e').unwrap().len();
        for (_, code) in table.iter() {
            assert!(e <= code.len());
        }
    }

    #[test]
    fn encoded_bits_sums_code_lengths() {
        let data = b"abracadabra";
        let table = table_for(data);
        let expected: u64 = data.iter().map(|&b| table.get(b).unwrap().len() as u64).sum();
        assert_eq!(table.encoded_bits(&FrequencyTable::from_bytes(data)), expected);
    }
}
