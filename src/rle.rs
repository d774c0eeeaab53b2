//! Run Length Encoding
//!
//! The compressed stream is a flat sequence of (count,value) byte pairs with
//! count in 1..=255.  Longer runs are split.  There is no header and no end
//! marker, so empty input gives empty output.  A zero count expands to nothing.

use std::io::{Cursor,Read,Write,BufReader,BufWriter};
use crate::Error;

const MAX_RUN: u8 = 255;

/// Main compression function.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W) -> Result<(u64,u64),Error>
where R: Read, W: Write {
    let reader = BufReader::new(expanded_in);
    let mut writer = BufWriter::new(compressed_out);
    let mut in_size: u64 = 0;
    let mut out_size: u64 = 0;
    let mut run: Option<(u8,u8)> = None;
    for by in reader.bytes() {
        let c = by?;
        in_size += 1;
        run = match run {
            Some((count,value)) if value==c && count < MAX_RUN => Some((count+1,value)),
            Some((count,value)) => {
                writer.write_all(&[count,value])?;
                out_size += 2;
                Some((1,c))
            },
            None => Some((1,c))
        };
    }
    if let Some((count,value)) = run {
        writer.write_all(&[count,value])?;
        out_size += 2;
    }
    writer.flush()?;
    log::debug!("{} bytes in {} runs",in_size,out_size/2);
    Ok((in_size,out_size))
}

/// Main decompression function.
/// Returns (in_size,out_size) or error.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W) -> Result<(u64,u64),Error>
where R: Read, W: Write {
    let mut bytes = BufReader::new(compressed_in).bytes();
    let mut writer = BufWriter::new(expanded_out);
    let mut in_size: u64 = 0;
    let mut out_size: u64 = 0;
    while let Some(by) = bytes.next() {
        let count = by?;
        let value = match bytes.next() {
            Some(by) => by?,
            None => {
                log::error!("count at offset {} has no value",in_size);
                return Err(Error::CorruptRun);
            }
        };
        in_size += 2;
        writer.write_all(&vec![value;count as usize])?;
        out_size += count as u64;
    }
    writer.flush()?;
    Ok((in_size,out_size))
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

#[test]
fn compression_works() {
    let test_data = "aaaabbbccd".as_bytes();
    let rle_str = "04 61 03 62 02 63 01 64";
    let compressed = compress_slice(test_data).expect("compression failed");
    assert_eq!(compressed,hex::decode(rle_str.replace(" ","")).unwrap());
}

#[test]
fn long_runs_are_split() {
    let test_data = [b'x';300];
    let compressed = compress_slice(&test_data).expect("compression failed");
    assert_eq!(compressed,vec![255,b'x',45,b'x']);
    let test_data = [0u8;255];
    let compressed = compress_slice(&test_data).expect("compression failed");
    assert_eq!(compressed,vec![255,0]);
}

#[test]
fn empty_input() {
    assert!(compress_slice(&[]).expect("compression failed").is_empty());
    assert!(expand_slice(&[]).expect("expansion failed").is_empty());
}

#[test]
fn sizes_are_reported() {
    let mut src = Cursor::new("aaaabbbccd".as_bytes());
    let mut ans: Vec<u8> = Vec::new();
    assert_eq!(compress(&mut src,&mut ans).expect("compression failed"),(10,8));
    let mut src = Cursor::new(ans);
    let mut expanded: Vec<u8> = Vec::new();
    assert_eq!(expand(&mut src,&mut expanded).expect("expansion failed"),(8,10));
}

#[test]
fn invertibility() {
    let test_data = "aaaabbbccd".as_bytes();
    let compressed = compress_slice(test_data).expect("compression failed");
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);

    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data).expect("compression failed");
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);

    let test_data: Vec<u8> = (0..2000).map(|i| (i / 7 % 256) as u8).collect();
    let compressed = compress_slice(&test_data).expect("compression failed");
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn dangling_count() {
    assert!(matches!(expand_slice(&[4,b'a',3]),Err(Error::CorruptRun)));
}

#[test]
fn zero_count_is_an_empty_run() {
    assert!(expand_slice(&[0,b'a']).expect("expansion failed").is_empty());
    let mut src = Cursor::new(vec![2,b'a',0,b'b',1,b'c']);
    let mut ans: Vec<u8> = Vec::new();
    assert_eq!(expand(&mut src,&mut ans).expect("expansion failed"),(6,3));
    assert_eq!(ans,"aac".as_bytes().to_vec());
}
