//! Building blocks for the Huffman pipeline.
pub mod min_heap;
pub mod huff_tree;
pub mod bit_stream;
