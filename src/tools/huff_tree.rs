//! Static Huffman tree built from a table of symbol frequencies.
//! This is used by the `huffman` module.
//!
//! Nodes live in an arena and refer to each other by index, the heap holds
//! the same indices while the tree is being merged.  The compressor and the
//! decompressor both call `HuffTree::build` with the same frequency table,
//! which is what lets the decoder recover the exact tree without storing it.

use bit_vec::BitVec;
use super::min_heap::MinHeap;

pub const NUM_SYMBOLS: usize = 256;

/// A leaf carries a symbol, a branch carries sons.
/// Son 0 is reached with a 0 bit, son 1 with a 1 bit.
struct Node {
    weight: u64,
    symbol: Option<u8>,
    son: [Option<usize>;2]
}

pub struct HuffTree {
    nodes: Vec<Node>,
    root: usize
}

impl HuffTree {
    /// Build the tree from frequencies indexed by symbol, zeros are skipped.
    /// Returns `None` if no symbol has a nonzero frequency.
    pub fn build(freq: &[u32;NUM_SYMBOLS]) -> Option<Self> {
        let mut nodes: Vec<Node> = Vec::with_capacity(2*NUM_SYMBOLS);
        let mut heap: MinHeap<u64> = MinHeap::create(NUM_SYMBOLS);
        for (symbol,f) in freq.iter().enumerate() {
            if *f > 0 {
                heap.insert(*f as u64,nodes.len());
                nodes.push(Node {
                    weight: *f as u64,
                    symbol: Some(symbol as u8),
                    son: [None,None]
                });
            }
        }
        log::debug!("building tree over {} symbols",nodes.len());
        if heap.len() == 1 {
            // synthetic root so that the lone symbol still has a 1 bit code
            let (weight,leaf) = heap.extract_min()?;
            nodes.push(Node {
                weight,
                symbol: None,
                son: [Some(leaf),None]
            });
            return Some(Self { root: nodes.len() - 1, nodes });
        }
        while heap.len() > 1 {
            let (w0,left) = heap.extract_min()?;
            let (w1,right) = heap.extract_min()?;
            heap.insert(w0 + w1,nodes.len());
            nodes.push(Node {
                weight: w0 + w1,
                symbol: None,
                son: [Some(left),Some(right)]
            });
        }
        let (_weight,root) = heap.extract_min()?;
        Some(Self { nodes, root })
    }
    pub fn root(&self) -> usize {
        self.root
    }
    /// total weight, equals the number of symbols in the data that built the tree
    pub fn weight(&self) -> u64 {
        self.nodes[self.root].weight
    }
    /// symbol stored at `node`, or `None` for a branch
    pub fn symbol(&self,node: usize) -> Option<u8> {
        self.nodes[node].symbol
    }
    /// move from `node` to one of its sons, `None` if that son does not exist
    pub fn down(&self,node: usize,bit: bool) -> Option<usize> {
        self.nodes[node].son[bit as usize]
    }
    /// Depth first walk producing the code of every leaf, indexed by symbol.
    /// Symbols that are not in the tree get `None`.
    pub fn codes(&self) -> Vec<Option<BitVec>> {
        let mut ans = vec![None;NUM_SYMBOLS];
        let mut path = BitVec::new();
        self.gather_codes(self.root,&mut path,&mut ans);
        ans
    }
    fn gather_codes(&self,node: usize,path: &mut BitVec,codes: &mut Vec<Option<BitVec>>) {
        if let Some(symbol) = self.nodes[node].symbol {
            codes[symbol as usize] = Some(path.clone());
            return;
        }
        for (bit,son) in self.nodes[node].son.iter().enumerate() {
            if let Some(son) = son {
                path.push(bit==1);
                self.gather_codes(*son,path,codes);
                path.pop();
            }
        }
    }
}

// *************** TESTS *****************

#[cfg(test)]
fn freq_of(data: &[u8]) -> [u32;NUM_SYMBOLS] {
    let mut freq = [0;NUM_SYMBOLS];
    for c in data {
        freq[*c as usize] += 1;
    }
    freq
}

#[test]
fn empty_table_has_no_tree() {
    assert!(HuffTree::build(&[0;NUM_SYMBOLS]).is_none());
}

#[test]
fn single_symbol_gets_one_bit() {
    let tree = HuffTree::build(&freq_of(&[b'z';1000])).expect("no tree");
    let codes = tree.codes();
    assert_eq!(codes[b'z' as usize],Some(BitVec::from_elem(1,false)));
    assert_eq!(codes.iter().filter(|c| c.is_some()).count(),1);
    assert_eq!(tree.weight(),1000);
    assert!(tree.down(tree.root(),true).is_none());
}

#[test]
fn small_tree_shape() {
    // b is extracted first and lands on the left
    let tree = HuffTree::build(&freq_of("aab".as_bytes())).expect("no tree");
    let codes = tree.codes();
    assert_eq!(codes[b'b' as usize],Some(BitVec::from_elem(1,false)));
    assert_eq!(codes[b'a' as usize],Some(BitVec::from_elem(1,true)));
    let leaf = tree.down(tree.root(),true).expect("missing son");
    assert_eq!(tree.symbol(leaf),Some(b'a'));
}

#[test]
fn codes_are_prefix_free() {
    let tree = HuffTree::build(&freq_of("I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes())).expect("no tree");
    let codes: Vec<BitVec> = tree.codes().into_iter().flatten().collect();
    for (i,a) in codes.iter().enumerate() {
        assert!(a.len() > 0);
        for (j,b) in codes.iter().enumerate() {
            if i!=j && a.len() <= b.len() {
                let is_prefix = (0..a.len()).all(|k| a.get(k)==b.get(k));
                assert!(!is_prefix,"code {} is a prefix of code {}",i,j);
            }
        }
    }
}

#[test]
fn frequent_symbols_get_shorter_codes() {
    let mut data = vec![b'e';500];
    data.extend_from_slice("the quick brown fox jumps over a lazy dog".as_bytes());
    let tree = HuffTree::build(&freq_of(&data)).expect("no tree");
    let codes = tree.codes();
    let e_len = codes[b'e' as usize].as_ref().map(|c| c.len()).unwrap_or(0);
    let z_len = codes[b'z' as usize].as_ref().map(|c| c.len()).unwrap_or(0);
    assert_eq!(e_len,1);
    assert!(z_len > e_len);
}

#[test]
fn full_alphabet() {
    let tree = HuffTree::build(&[1;NUM_SYMBOLS]).expect("no tree");
    let codes = tree.codes();
    assert!(codes.iter().all(|c| c.as_ref().map(|b| b.len())==Some(8)));
    assert_eq!(tree.weight(),256);
}
