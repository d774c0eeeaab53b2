//! Static Huffman Compression
//!
//! Two passes are made over the input.  The first counts symbols, the second
//! writes the codes.  The tree itself is never stored, instead the frequency
//! table is stored and the decoder rebuilds the same tree from it.
//!
//! File layout, all integers little endian:
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0 | 4 | magic `HUFF` |
//! | 4 | 1 | number of distinct symbols, 256 is stored as 0 |
//! | 5 | 8 | size of the expanded data |
//! | 13 | 5 each | (symbol,frequency) in ascending symbol order, frequency is 4 bytes |
//! | 13+5n | * | codes packed MSB first, last byte zero padded |
//!
//! If the expanded data is empty the file is only the 13 byte header.
//!
//! There is no checksum.  Damage to the bitstream that still produces the
//! declared number of symbols will go unnoticed.

use std::io::{Cursor,Read,Write,Seek,SeekFrom,BufReader,BufWriter,ErrorKind};
use crate::tools::huff_tree::{HuffTree,NUM_SYMBOLS};
use crate::tools::bit_stream::{BitPacker,BitUnpacker};
use crate::Error;

pub const MAGIC: [u8;4] = *b"HUFF";
pub const HEADER_LEN: u64 = 13;
const ENTRY_LEN: u64 = 5;

/// Fixed size header at the start of every Huffman file
#[derive(Debug,PartialEq)]
pub struct Header {
    /// distinct symbols in the expanded data, 0..=256
    pub num_symbols: usize,
    /// length of the expanded data
    pub original_size: u64
}

impl Header {
    fn write<W: Write>(&self,writer: &mut W) -> Result<(),std::io::Error> {
        writer.write_all(&MAGIC)?;
        // 256 wraps to 0, which is unambiguous as long as original_size > 0
        writer.write_all(&[self.num_symbols as u8])?;
        writer.write_all(&u64::to_le_bytes(self.original_size))
    }
    /// read and validate the header, the reader is left at the frequency table
    pub fn read<R: Read>(reader: &mut R) -> Result<Self,Error> {
        let mut buf: [u8;HEADER_LEN as usize] = [0;HEADER_LEN as usize];
        read_or(reader,&mut buf,Error::CorruptHeader)?;
        if buf[0..4] != MAGIC {
            log::error!("bad magic {}",hex::encode(&buf[0..4]));
            return Err(Error::CorruptHeader);
        }
        let mut size_bytes: [u8;8] = [0;8];
        size_bytes.copy_from_slice(&buf[5..13]);
        let original_size = u64::from_le_bytes(size_bytes);
        let num_symbols = match (buf[4],original_size) {
            (0,0) => 0,
            (0,_) => NUM_SYMBOLS,
            (n,_) => n as usize
        };
        Ok(Self {
            num_symbols,
            original_size
        })
    }
}

/// `read_exact` but running out of data is reported as `err`
fn read_or<R: Read>(reader: &mut R,buf: &mut [u8],err: Error) -> Result<(),Error> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind()==ErrorKind::UnexpectedEof => Err(err),
        Err(e) => Err(Error::Io(e))
    }
}

/// First pass, returns (frequencies,total)
fn count_symbols<R: Read>(reader: &mut R) -> Result<([u32;NUM_SYMBOLS],u64),Error> {
    let mut freq: [u32;NUM_SYMBOLS] = [0;NUM_SYMBOLS];
    let mut total: u64 = 0;
    for by in reader.bytes() {
        let c = by? as usize;
        freq[c] = match freq[c].checked_add(1) {
            Some(f) => f,
            None => return Err(Error::FileTooLarge)
        };
        total += 1;
    }
    Ok((freq,total))
}

fn write_table<W: Write>(freq: &[u32;NUM_SYMBOLS],writer: &mut W) -> Result<u64,std::io::Error> {
    let mut count = 0;
    for (symbol,f) in freq.iter().enumerate() {
        if *f > 0 {
            writer.write_all(&[symbol as u8])?;
            writer.write_all(&u32::to_le_bytes(*f))?;
            count += 1;
        }
    }
    Ok(count * ENTRY_LEN)
}

/// Read `header.num_symbols` entries and check them against the header.
fn read_table<R: Read>(header: &Header,reader: &mut R) -> Result<[u32;NUM_SYMBOLS],Error> {
    let mut freq: [u32;NUM_SYMBOLS] = [0;NUM_SYMBOLS];
    let mut total: u64 = 0;
    for i in 0..header.num_symbols {
        let mut entry: [u8;ENTRY_LEN as usize] = [0;ENTRY_LEN as usize];
        if let Err(e) = read_or(reader,&mut entry,Error::CorruptFrequencyTable) {
            log::error!("frequency table ends after {} of {} entries",i,header.num_symbols);
            return Err(e);
        }
        let symbol = entry[0] as usize;
        let f = u32::from_le_bytes([entry[1],entry[2],entry[3],entry[4]]);
        if f == 0 || freq[symbol] != 0 {
            log::error!("bad frequency entry for symbol {}",symbol);
            return Err(Error::CorruptFrequencyTable);
        }
        freq[symbol] = f;
        total += f as u64;
    }
    if total != header.original_size {
        log::error!("frequencies sum to {}, header says {}",total,header.original_size);
        return Err(Error::CorruptFrequencyTable);
    }
    Ok(freq)
}

/// Main compression function.
/// `expanded_in` is read twice, starting from its position at the time of the call.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W) -> Result<(u64,u64),Error>
where R: Read + Seek, W: Write {
    let start = expanded_in.stream_position()?;
    let mut reader = BufReader::new(expanded_in);
    let mut writer = BufWriter::new(compressed_out);

    log::debug!("counting symbols");
    let (freq,original_size) = count_symbols(&mut reader)?;
    let header = Header {
        num_symbols: freq.iter().filter(|f| **f > 0).count(),
        original_size
    };
    let tree = match HuffTree::build(&freq) {
        Some(tree) => tree,
        None => {
            log::debug!("empty input, header only");
            header.write(&mut writer)?;
            writer.flush()?;
            return Ok((0,HEADER_LEN));
        }
    };
    let codes = tree.codes();

    log::debug!("writing header and frequency table with {} symbols, weight {}",header.num_symbols,tree.weight());
    header.write(&mut writer)?;
    let table_len = write_table(&freq,&mut writer)?;

    log::debug!("writing codes");
    reader.seek(SeekFrom::Start(start))?;
    let mut packer = BitPacker::new();
    let mut packed: u64 = 0;
    for by in reader.take(original_size).bytes() {
        let c = by?;
        match &codes[c as usize] {
            Some(code) => packer.put_code(code,&mut writer)?,
            None => {
                log::error!("symbol {} was not seen in the first pass",c);
                return Err(Error::InputChanged);
            }
        }
        packed += 1;
    }
    if packed != original_size {
        log::error!("second pass found {} of {} symbols",packed,original_size);
        return Err(Error::InputChanged);
    }
    let body_len = packer.finish(&mut writer)?;
    writer.flush()?;
    Ok((original_size,HEADER_LEN + table_len + body_len))
}

/// Main decompression function.
/// Returns (in_size,out_size) or error.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W) -> Result<(u64,u64),Error>
where R: Read, W: Write {
    let mut reader = BufReader::new(compressed_in);
    let mut writer = BufWriter::new(expanded_out);

    let header = Header::read(&mut reader)?;
    log::debug!("header: {} symbols, expanded size {}",header.num_symbols,header.original_size);
    if header.original_size == 0 {
        return Ok((HEADER_LEN,0));
    }
    let freq = read_table(&header,&mut reader)?;
    let tree = match HuffTree::build(&freq) {
        Some(tree) => tree,
        None => return Err(Error::CorruptFrequencyTable)
    };

    log::debug!("decoding {} symbols",header.original_size);
    let mut unpacker = BitUnpacker::new(&tree,header.original_size);
    let mut in_size = HEADER_LEN + header.num_symbols as u64 * ENTRY_LEN;
    for by in reader.bytes() {
        if unpacker.is_done() {
            break;
        }
        unpacker.unpack_byte(by?,&mut writer)?;
        in_size += 1;
    }
    writer.flush()?;
    if !unpacker.is_done() {
        log::error!("data ended after {} of {} symbols",unpacker.count,header.original_size);
        return Err(Error::TruncatedBody);
    }
    Ok((in_size,unpacker.count))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8]) -> Result<Vec<u8>,Error> {
    let mut src = Cursor::new(slice);
    let mut ans: Vec<u8> = Vec::new();
    compress(&mut src,&mut ans)?;
    Ok(ans)
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8]) -> Result<Vec<u8>,Error> {
    let mut src = Cursor::new(slice);
    let mut ans: Vec<u8> = Vec::new();
    expand(&mut src,&mut ans)?;
    Ok(ans)
}

// *************** TESTS *****************

#[cfg(test)]
const SAM: &str = "I am Sam. Sam I am. I do not like this Sam I am.\n";

#[test]
fn compression_works() {
    // b is extracted first so b=0 and a=1, bits 110 padded
    let test_data = "aab".as_bytes();
    let huff_str = "48 55 46 46 02 03 00 00 00 00 00 00 00 61 02 00 00 00 62 01 00 00 00 C0";
    let compressed = compress_slice(test_data).expect("compression failed");
    assert_eq!(compressed,hex::decode(huff_str.replace(" ","")).unwrap());
}

#[test]
fn empty_input() {
    let compressed = compress_slice(&[]).expect("compression failed");
    assert_eq!(compressed,hex::decode("48554646000000000000000000").unwrap());
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert!(expanded.is_empty());
}

#[test]
fn single_symbol() {
    let test_data = [b'q';1000];
    let compressed = compress_slice(&test_data).expect("compression failed");
    // header, one entry, 1000 one-bit codes
    assert_eq!(compressed.len(),13 + 5 + 125);
    assert!(compressed[18..].iter().all(|by| *by==0));
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn invertibility() {
    let test_data = SAM.as_bytes();
    let compressed = compress_slice(test_data).expect("compression failed");
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);

    let test_data = "1234567".as_bytes();
    let compressed = compress_slice(test_data).expect("compression failed");
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);
}

#[test]
fn full_alphabet() {
    let test_data: Vec<u8> = (0..3000).map(|i| ((i * 7) % 256) as u8).collect();
    let compressed = compress_slice(&test_data).expect("compression failed");
    assert_eq!(compressed[4],0);
    let header = Header::read(&mut Cursor::new(&compressed)).expect("bad header");
    assert_eq!(header,Header { num_symbols: 256, original_size: 3000 });
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn frequencies_sum_to_size() {
    let compressed = compress_slice(SAM.as_bytes()).expect("compression failed");
    let mut src = Cursor::new(&compressed);
    let header = Header::read(&mut src).expect("bad header");
    let freq = read_table(&header,&mut src).expect("bad table");
    assert_eq!(freq.iter().map(|f| *f as u64).sum::<u64>(),SAM.len() as u64);
    assert_eq!(header.original_size,SAM.len() as u64);
    // entries are in ascending symbol order
    let symbols: Vec<u8> = (0..header.num_symbols).map(|i| compressed[13 + 5*i]).collect();
    assert!(symbols.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn second_pass_starts_at_stream_position() {
    let mut src = Cursor::new("xxxxaab".as_bytes());
    src.seek(SeekFrom::Start(4)).expect("seek failed");
    let mut ans: Vec<u8> = Vec::new();
    assert_eq!(compress(&mut src,&mut ans).expect("compression failed"),(3,24));
    assert_eq!(expand_slice(&ans).expect("expansion failed"),"aab".as_bytes().to_vec());
}

/// Seekable source whose contents are replaced by `after_seek` on the first rewind
#[cfg(test)]
struct ChangingSource {
    data: Cursor<Vec<u8>>,
    after_seek: Option<Vec<u8>>
}

#[cfg(test)]
impl Read for ChangingSource {
    fn read(&mut self,buf: &mut [u8]) -> std::io::Result<usize> {
        self.data.read(buf)
    }
}

#[cfg(test)]
impl Seek for ChangingSource {
    fn seek(&mut self,pos: SeekFrom) -> std::io::Result<u64> {
        if let SeekFrom::Start(_) = pos {
            if let Some(replacement) = self.after_seek.take() {
                self.data = Cursor::new(replacement);
            }
        }
        self.data.seek(pos)
    }
}

#[test]
fn input_shrinks_between_passes() {
    let mut src = ChangingSource {
        data: Cursor::new(SAM.as_bytes().to_vec()),
        after_seek: Some(SAM.as_bytes()[0..SAM.len()-2].to_vec())
    };
    let mut ans: Vec<u8> = Vec::new();
    assert!(matches!(compress(&mut src,&mut ans),Err(Error::InputChanged)));
}

#[test]
fn input_gains_new_symbol_between_passes() {
    let mut changed = SAM.as_bytes().to_vec();
    changed[0] = b'Z';
    let mut src = ChangingSource {
        data: Cursor::new(SAM.as_bytes().to_vec()),
        after_seek: Some(changed)
    };
    let mut ans: Vec<u8> = Vec::new();
    assert!(matches!(compress(&mut src,&mut ans),Err(Error::InputChanged)));
}

#[test]
fn bad_magic() {
    let mut compressed = compress_slice(SAM.as_bytes()).expect("compression failed");
    compressed[0] = b'X';
    assert!(matches!(expand_slice(&compressed),Err(Error::CorruptHeader)));
    assert!(matches!(expand_slice(&compressed[0..3]),Err(Error::CorruptHeader)));
    assert!(matches!(expand_slice(&MAGIC),Err(Error::CorruptHeader)));
}

#[test]
fn truncated_table() {
    let compressed = compress_slice(SAM.as_bytes()).expect("compression failed");
    assert!(matches!(expand_slice(&compressed[0..20]),Err(Error::CorruptFrequencyTable)));
}

#[test]
fn inconsistent_table() {
    let mut compressed = compress_slice("aab".as_bytes()).expect("compression failed");
    // claim a appears 3 times
    compressed[14] = 3;
    assert!(matches!(expand_slice(&compressed),Err(Error::CorruptFrequencyTable)));
    let mut compressed = compress_slice("aab".as_bytes()).expect("compression failed");
    // repeat symbol a
    compressed[18] = b'a';
    assert!(matches!(expand_slice(&compressed),Err(Error::CorruptFrequencyTable)));
}

#[test]
fn truncated_body() {
    let compressed = compress_slice(SAM.as_bytes()).expect("compression failed");
    let cut = compressed.len() - 2;
    assert!(matches!(expand_slice(&compressed[0..cut]),Err(Error::TruncatedBody)));
    let header_and_table = 13 + 5 * compressed[4] as usize;
    assert!(matches!(expand_slice(&compressed[0..header_and_table]),Err(Error::TruncatedBody)));
}
