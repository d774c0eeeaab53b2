//! # Run Length and Huffman Compression
//!
//! Two codecs working on already opened streams:
//! * `rle` - pairs of (count,value) bytes, no header
//! * `huffman` - static two-pass Huffman coding with a persisted frequency table
//!
//! Callers choose the codec with an `Algorithm`, which can be parsed from a name,
//! a numeric selector, or a file extension.  An unknown selector is rejected
//! while parsing, before either stream is touched.
//!
//! Nothing is rolled back on failure.  Bytes already written to the output stream
//! stay there, so callers wanting all-or-nothing should write to a temporary file
//! and move it into place on success (the command line program does this).

use std::io::{Cursor,Read,Write,Seek};
use std::path::Path;
use std::str::FromStr;
use num_traits::FromPrimitive;

mod tools;
pub mod rle;
pub mod huffman;

/// Compression Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("unknown compression algorithm")]
    InvalidAlgorithm,
    #[error("header is missing or corrupt")]
    CorruptHeader,
    #[error("frequency table is missing or corrupt")]
    CorruptFrequencyTable,
    #[error("data ended before all symbols were decoded")]
    TruncatedBody,
    #[error("run length pair is corrupt")]
    CorruptRun,
    #[error("bitstream contains a code with no symbol")]
    InvalidCode,
    #[error("symbol count exceeds the frequency table limit")]
    FileTooLarge,
    #[error("input changed between passes")]
    InputChanged,
    #[error(transparent)]
    Io(#[from] std::io::Error)
}

/// Compression algorithm selector
#[derive(num_derive::FromPrimitive,Clone,Copy,Debug,PartialEq,Eq)]
pub enum Algorithm {
    Rle = 0,
    Huffman = 1
}

impl Algorithm {
    /// canonical name, also used as the file extension
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rle => "rle",
            Self::Huffman => "huff"
        }
    }
    /// Detect the algorithm from a file extension, e.g. `notes.txt.huff`
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Result<Self,Error> {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("rle") => Ok(Self::Rle),
            Some("huff") | Some("huffman") => Ok(Self::Huffman),
            _ => Err(Error::InvalidAlgorithm)
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self,f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,"{}",self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        match s {
            "rle" => Ok(Self::Rle),
            "huff" | "huffman" => Ok(Self::Huffman),
            _ => Err(Error::InvalidAlgorithm)
        }
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = Error;
    fn try_from(sel: u8) -> Result<Self,Self::Error> {
        Self::from_u8(sel).ok_or(Error::InvalidAlgorithm)
    }
}

/// Compress `expanded_in` into `compressed_out` using `algorithm`.
/// The input must be seekable because Huffman coding reads it twice.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, algorithm: Algorithm) -> Result<(u64,u64),Error>
where R: Read + Seek, W: Write {
    log::debug!("compress with {}",algorithm);
    match algorithm {
        Algorithm::Rle => rle::compress(expanded_in,compressed_out),
        Algorithm::Huffman => huffman::compress(expanded_in,compressed_out)
    }
}

/// Decompress `compressed_in` into `expanded_out` using `algorithm`.
/// Returns (in_size,out_size) or error.
pub fn decompress<R,W>(compressed_in: &mut R, expanded_out: &mut W, algorithm: Algorithm) -> Result<(u64,u64),Error>
where R: Read, W: Write {
    log::debug!("decompress with {}",algorithm);
    match algorithm {
        Algorithm::Rle => rle::expand(compressed_in,expanded_out),
        Algorithm::Huffman => huffman::expand(compressed_in,expanded_out)
    }
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],algorithm: Algorithm) -> Result<Vec<u8>,Error> {
    let mut src = Cursor::new(slice);
    let mut ans: Vec<u8> = Vec::new();
    compress(&mut src,&mut ans,algorithm)?;
    Ok(ans)
}

/// Convenience function, calls `decompress` with a slice returning a Vec
pub fn decompress_slice(slice: &[u8],algorithm: Algorithm) -> Result<Vec<u8>,Error> {
    let mut src = Cursor::new(slice);
    let mut ans: Vec<u8> = Vec::new();
    decompress(&mut src,&mut ans,algorithm)?;
    Ok(ans)
}

// *************** TESTS *****************

#[test]
fn selectors() {
    assert_eq!(Algorithm::try_from(0).unwrap(),Algorithm::Rle);
    assert_eq!(Algorithm::try_from(1).unwrap(),Algorithm::Huffman);
    assert!(matches!(Algorithm::try_from(2),Err(Error::InvalidAlgorithm)));
    assert_eq!("huffman".parse::<Algorithm>().unwrap(),Algorithm::Huffman);
    assert_eq!("huff".parse::<Algorithm>().unwrap(),Algorithm::Huffman);
    assert_eq!("rle".parse::<Algorithm>().unwrap(),Algorithm::Rle);
    assert!(matches!("lz77".parse::<Algorithm>(),Err(Error::InvalidAlgorithm)));
    assert_eq!(Algorithm::Huffman.to_string(),"huff");
}

#[test]
fn extensions() {
    assert_eq!(Algorithm::from_extension("hamlet.txt.rle").unwrap(),Algorithm::Rle);
    assert_eq!(Algorithm::from_extension("dir/hamlet.huff").unwrap(),Algorithm::Huffman);
    assert_eq!(Algorithm::from_extension("hamlet.huffman").unwrap(),Algorithm::Huffman);
    assert!(matches!(Algorithm::from_extension("hamlet.txt"),Err(Error::InvalidAlgorithm)));
    assert!(matches!(Algorithm::from_extension(".rle"),Err(Error::InvalidAlgorithm)));
    assert!(matches!(Algorithm::from_extension("hamlet"),Err(Error::InvalidAlgorithm)));
}

#[test]
fn invertibility() {
    let samples: Vec<Vec<u8>> = vec![
        Vec::new(),
        "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes().to_vec(),
        vec![b'!';1000],
        (0..5000).map(|i| ((i * i) % 251) as u8).collect(),
        (0..=255).collect()
    ];
    for algorithm in [Algorithm::Rle,Algorithm::Huffman] {
        for test_data in &samples {
            let compressed = compress_slice(test_data,algorithm).expect("compression failed");
            let expanded = decompress_slice(&compressed,algorithm).expect("expansion failed");
            assert_eq!(*test_data,expanded);
        }
    }
}

#[test]
fn empty_outputs() {
    assert!(compress_slice(&[],Algorithm::Rle).unwrap().is_empty());
    assert_eq!(compress_slice(&[],Algorithm::Huffman).unwrap().len(),huffman::HEADER_LEN as usize);
}

#[test]
fn wrong_algorithm_is_detected() {
    let compressed = compress_slice("aaaabbbccd".as_bytes(),Algorithm::Rle).unwrap();
    assert!(matches!(decompress_slice(&compressed,Algorithm::Huffman),Err(Error::CorruptHeader)));
}
