//! Huffman tree construction and its bit level serialization.
use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    io::{self, Read, Write},
};

use crate::bit_io::{BitReader, BitWriter};
use crate::frequency::FrequencyTable;

/// A node in a Huffman tree
///
/// Leaves carry a byte value, internal nodes own exactly two children. The
/// weight is the summed frequency of every leaf below the node. Trees read
/// back from a stream carry no frequencies and have weight 0 throughout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        byte: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

/// Heap entry ordering nodes by weight, then by creation order.
struct Pending {
    weight: u64,
    order: usize,
    node: HuffNode,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| self.order.cmp(&other.order))
    }
}

impl HuffNode {
    pub fn leaf(byte: u8, weight: u64) -> HuffNode {
        HuffNode::Leaf { byte, weight }
    }

    /// Combines two nodes into a new internal node whose weight is their sum.
    pub fn merge(left: HuffNode, right: HuffNode) -> HuffNode {
        HuffNode::Internal {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Builds a Huffman tree from a frequency table.
    ///
    /// Leaves are seeded in ascending byte order. The two lightest nodes are
    /// repeatedly merged, the first extracted becoming the left child, until
    /// a single root remains. Among equal weights the node created first is
    /// extracted first, so the same table always yields the same tree.
    ///
    /// # Arguments
    ///
    /// * `frequencies` - The byte frequencies of the input.
    ///
    /// # Returns
    ///
    /// The root of the tree, or `None` when the table is empty. A table with a
    /// single distinct byte yields a lone leaf.
    pub fn build(frequencies: &FrequencyTable) -> Option<HuffNode> {
        let mut heap = BinaryHeap::new();
        let mut order = 0;

        for (byte, count) in frequencies.iter() {
            heap.push(Reverse(Pending {
                weight: count,
                order,
                node: HuffNode::leaf(byte, count),
            }));
            order += 1;
        }

        while heap.len() > 1 {
            let Reverse(left) = heap.pop()?;
            let Reverse(right) = heap.pop()?;
            let node = HuffNode::merge(left.node, right.node);

            heap.push(Reverse(Pending {
                weight: node.weight(),
                order,
                node,
            }));
            order += 1;
        }

        heap.pop().map(|Reverse(pending)| pending.node)
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } | HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 1,
            HuffNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Length of the longest root to leaf path.
    pub fn depth(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 0,
            HuffNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Writes the tree in preorder: `1` plus eight value bits for a leaf, `0`
    /// followed by the left and right subtrees for an internal node.
    pub fn write_to<W: Write>(&self, writer: &mut BitWriter<W>) -> io::Result<()> {
        match self {
            HuffNode::Leaf { byte, .. } => {
                writer.write_bit(true)?;
                writer.write_byte(*byte)
            }
            HuffNode::Internal { left, right, .. } => {
                writer.write_bit(false)?;
                left.write_to(writer)?;
                right.write_to(writer)
            }
        }
    }

    /// Rebuilds a tree written by [`HuffNode::write_to`].
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if the stream ends while a node is still
    /// expected, or if nesting exceeds what 256 leaves could produce.
    pub fn read_from<R: Read>(reader: &mut BitReader<R>) -> io::Result<HuffNode> {
        Self::read_node(reader, 0)
    }

    fn read_node<R: Read>(reader: &mut BitReader<R>, depth: usize) -> io::Result<HuffNode> {
        // a full tree over at most 256 leaves is never deeper than 255
        if depth > 255 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "tree is deeper than any tree over 256 byte values",
            ));
        }

        match reader.read_bit()? {
            Some(true) => Ok(HuffNode::leaf(reader.read_byte()?, 0)),
            Some(false) => {
                let left = Self::read_node(reader, depth + 1)?;
                let right = Self::read_node(reader, depth + 1)?;
                Ok(HuffNode::merge(left, right))
            }
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended while a tree node was expected",
            )),
        }
    }

    /// Walks from this node towards a leaf, consuming one bit per branch.
    ///
    /// Returns `None` if the stream ends before a leaf is reached. A lone leaf
    /// consumes no bits.
    pub fn decode_symbol<R: Read>(&self, reader: &mut BitReader<R>) -> io::Result<Option<u8>> {
        let mut node = self;

        loop {
            match node {
                HuffNode::Leaf { byte, .. } => return Ok(Some(*byte)),
                HuffNode::Internal { left, right, .. } => {
                    node = match reader.read_bit()? {
                        Some(false) => left,
                        Some(true) => right,
                        None => return Ok(None),
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(tree: &HuffNode) -> Vec<u8> {
        let mut writer = BitWriter::new(Vec::new());
        tree.write_to(&mut writer).unwrap();
        writer.flush().unwrap();
        writer.into_inner()
    }

    /// Same shape and leaf values, ignoring weights.
    fn same_shape(a: &HuffNode, b: &HuffNode) -> bool {
        match (a, b) {
            (HuffNode::Leaf { byte: x, .. }, HuffNode::Leaf { byte: y, .. }) => x == y,
            (
                HuffNode::Internal { left: l1, right: r1, .. },
                HuffNode::Internal { left: l2, right: r2, .. },
            ) => same_shape(l1, l2) && same_shape(r1, r2),
            _ => false,
        }
    }

    #[test]
    fn empty_table_has_no_tree() {
        assert_eq!(HuffNode::build(&FrequencyTable::new()), None);
    }

    #[test]
    fn single_byte_is_a_lone_leaf() {
        let tree = HuffNode::build(&FrequencyTable::from_bytes(&[b'x'; 1000])).unwrap();
        assert_eq!(tree, HuffNode::leaf(b'x', 1000));
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn aaab_merges_once() {
        let tree = HuffNode::build(&FrequencyTable::from_bytes(b"aaab")).unwrap();
        assert_eq!(
            tree,
            HuffNode::merge(HuffNode::leaf(b'b', 1), HuffNode::leaf(b'a', 3))
        );
        assert_eq!(tree.weight(), 4);
    }

    #[test]
    fn tree_is_full_and_weighted() {
        let data = b"this is an example of a huffman tree";
        let table = FrequencyTable::from_bytes(data);
        let tree = HuffNode::build(&table).unwrap();
        assert_eq!(tree.weight(), data.len() as u64);
        assert_eq!(tree.leaf_count(), table.distinct());
    }

    #[test]
    fn equal_weights_break_ties_by_creation_order() {
        let tree = HuffNode::build(&FrequencyTable::from_bytes(b"abcd")).unwrap();
        let expected = HuffNode::merge(
            HuffNode::merge(HuffNode::leaf(b'a', 1), HuffNode::leaf(b'b', 1)),
            HuffNode::merge(HuffNode::leaf(b'c', 1), HuffNode::leaf(b'd', 1)),
        );
        assert_eq!(tree, expected);
    }

    #[test]
    fn serializes_in_preorder() {
        let tree = HuffNode::merge(HuffNode::leaf(b'b', 1), HuffNode::leaf(b'a', 3));
        // 0 1 01100010 1 01100001 + padding
        assert_eq!(serialize(&tree), vec![0b0101_1000, 0b1010_1100, 0b0010_0000]);
    }

    #[test]
    fn reads_back_what_it_wrote() {
        let all: Vec<u8> = (0..=255u8).chain(0..100).collect();
        let tree = HuffNode::build(&FrequencyTable::from_bytes(&all)).unwrap();
        let bytes = serialize(&tree);
        let read = HuffNode::read_from(&mut BitReader::new(bytes.as_slice())).unwrap();
        assert!(same_shape(&tree, &read));
        assert_eq!(read.leaf_count(), 256);
    }

    #[test]
    fn truncated_tree_fails() {
        let tree = HuffNode::build(&FrequencyTable::from_bytes(b"abcabcaad")).unwrap();
        let bytes = serialize(&tree);
        for len in 0..bytes.len() {
            let err = HuffNode::read_from(&mut BitReader::new(&bytes[..len])).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof, "length {len}");
        }
    }

    #[test]
    fn decode_symbol_walks_to_a_leaf() {
        let tree = HuffNode::merge(
            HuffNode::leaf(b'x', 0),
            HuffNode::merge(HuffNode::leaf(b'y', 0), HuffNode::leaf(b'z', 0)),
        );
        // 11 0 10 then end of stream inside a code
        let mut reader = BitReader::new(&[0b1101_0111][..]);
        assert_eq!(tree.decode_symbol(&mut reader).unwrap(), Some(b'z'));
        assert_eq!(tree.decode_symbol(&mut reader).unwrap(), Some(b'x'));
        assert_eq!(tree.decode_symbol(&mut reader).unwrap(), Some(b'y'));
        assert_eq!(tree.decode_symbol(&mut reader).unwrap(), Some(b'z'));
        assert_eq!(tree.decode_symbol(&mut reader).unwrap(), None);
    }
}
