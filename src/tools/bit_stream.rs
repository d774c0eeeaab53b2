//! Bit level packing of Huffman codes.
//!
//! Codes are packed MSB first into whole bytes.  The last byte is padded
//! with zeros on the right.  There is no bit count in the stream, the unpacker
//! stops when it has produced the expected number of symbols, so the padding
//! is never interpreted.

use bit_vec::BitVec;
use std::io::Write;
use super::huff_tree::HuffTree;
use crate::Error;

pub struct BitPacker {
    accum: u8,
    bit_count: u8,
    /// bytes written so far
    pub count: u64
}

impl BitPacker {
    pub fn new() -> Self {
        Self {
            accum: 0,
            bit_count: 0,
            count: 0
        }
    }
    pub fn put_bit<W: Write>(&mut self,bit: bool,writer: &mut W) -> Result<(),std::io::Error> {
        self.accum = (self.accum << 1) | bit as u8;
        self.bit_count += 1;
        if self.bit_count == 8 {
            writer.write_all(&[self.accum])?;
            self.count += 1;
            self.accum = 0;
            self.bit_count = 0;
        }
        Ok(())
    }
    pub fn put_code<W: Write>(&mut self,code: &BitVec,writer: &mut W) -> Result<(),std::io::Error> {
        for bit in code.iter() {
            self.put_bit(bit,writer)?;
        }
        Ok(())
    }
    /// Byte-align and flush any pending bits, returns total bytes written.
    pub fn finish<W: Write>(&mut self,writer: &mut W) -> Result<u64,std::io::Error> {
        if self.bit_count > 0 {
            self.accum <<= 8 - self.bit_count;
            writer.write_all(&[self.accum])?;
            self.count += 1;
            self.accum = 0;
            self.bit_count = 0;
        }
        Ok(self.count)
    }
}

/// Walks the tree one bit at a time, emitting a symbol at each leaf.
pub struct BitUnpacker<'a> {
    tree: &'a HuffTree,
    curs: usize,
    target: u64,
    /// symbols written so far
    pub count: u64
}

impl <'a> BitUnpacker<'a> {
    /// `target` is the number of symbols to produce
    pub fn new(tree: &'a HuffTree,target: u64) -> Self {
        Self {
            tree,
            curs: tree.root(),
            target,
            count: 0
        }
    }
    pub fn is_done(&self) -> bool {
        self.count >= self.target
    }
    /// Consume the bits of `by` MSB first, stopping early once the target is reached.
    pub fn unpack_byte<W: Write>(&mut self,by: u8,writer: &mut W) -> Result<(),Error> {
        for i in (0..8).rev() {
            if self.is_done() {
                return Ok(());
            }
            let bit = (by >> i) & 1 == 1;
            self.curs = match self.tree.down(self.curs,bit) {
                Some(son) => son,
                None => {
                    log::error!("bit path has no symbol after {} symbols",self.count);
                    return Err(Error::InvalidCode);
                }
            };
            if let Some(symbol) = self.tree.symbol(self.curs) {
                log::trace!("symbol {}",symbol);
                writer.write_all(&[symbol])?;
                self.count += 1;
                self.curs = self.tree.root();
            }
        }
        Ok(())
    }
}

#[test]
fn packing_pads_last_byte() {
    let mut packer = BitPacker::new();
    let mut ans: Vec<u8> = Vec::new();
    let mut code = BitVec::new();
    for bit in [true,false,true,true,true] {
        code.push(bit);
    }
    packer.put_code(&code,&mut ans).expect("write failed");
    assert!(ans.is_empty());
    packer.put_code(&code,&mut ans).expect("write failed");
    assert_eq!(ans,vec![0b10111101]);
    assert_eq!(packer.finish(&mut ans).expect("write failed"),2);
    assert_eq!(ans,vec![0b10111101,0b11000000]);
}

#[test]
fn aligned_stream_has_no_padding() {
    let mut packer = BitPacker::new();
    let mut ans: Vec<u8> = Vec::new();
    packer.put_code(&BitVec::from_bytes(&[0xa5,0x0f]),&mut ans).expect("write failed");
    assert_eq!(packer.finish(&mut ans).expect("write failed"),2);
    assert_eq!(ans,vec![0xa5,0x0f]);
}

#[test]
fn unpacker_ignores_padding() {
    // a=1, b=0
    let mut freq = [0;super::huff_tree::NUM_SYMBOLS];
    freq[b'a' as usize] = 2;
    freq[b'b' as usize] = 1;
    let tree = HuffTree::build(&freq).expect("no tree");
    let mut unpacker = BitUnpacker::new(&tree,3);
    let mut ans: Vec<u8> = Vec::new();
    unpacker.unpack_byte(0b11000000,&mut ans).expect("unpack failed");
    assert!(unpacker.is_done());
    assert_eq!(ans,"aab".as_bytes().to_vec());
    // further input is ignored once done
    unpacker.unpack_byte(0xff,&mut ans).expect("unpack failed");
    assert_eq!(unpacker.count,3);
}

#[test]
fn missing_son_is_an_error() {
    let mut freq = [0;super::huff_tree::NUM_SYMBOLS];
    freq[7] = 10;
    let tree = HuffTree::build(&freq).expect("no tree");
    let mut unpacker = BitUnpacker::new(&tree,10);
    let mut ans: Vec<u8> = Vec::new();
    assert!(matches!(unpacker.unpack_byte(0x80,&mut ans),Err(Error::InvalidCode)));
    assert!(ans.is_empty());
}
