use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::Path;
use std::process::Command; // Run programs
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const SAM: &str = "I am Sam. Sam I am. I do not like this Sam I am.\nThat Sam-I-am! That Sam-I-am!\nI do not like that Sam-I-am!\n";

// Compress `txt` with the given method, then decompress letting the binary
// detect the method from the extension, and compare with the original.
fn round_trip_test(txt: &[u8],method: &str,ext: &str) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("sam.txt");
    let cmp_path = temp_dir.path().join(["sam.txt.",ext].concat());
    let out_path = temp_dir.path().join("sam_expanded.txt");
    std::fs::write(&in_path,txt)?;
    Command::cargo_bin("rlehuff")?
        .arg("compress")
        .arg("-m").arg(method)
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&cmp_path)
        .assert()
        .success()
        .stderr(predicate::str::contains(["compressed ",&txt.len().to_string()].concat()));
    Command::cargo_bin("rlehuff")?
        .arg("decompress")
        .arg("-i").arg(&cmp_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    assert_eq!(std::fs::read(out_path)?,txt.to_vec());
    Ok(())
}

#[test]
fn huffman_round_trip() -> STDRESULT {
    round_trip_test(SAM.as_bytes(),"huff","huff")?;
    round_trip_test(SAM.as_bytes(),"huffman","huffman")?;
    round_trip_test(&[],"huff","huff")
}

#[test]
fn rle_round_trip() -> STDRESULT {
    round_trip_test(SAM.as_bytes(),"rle","rle")?;
    round_trip_test(&[b'z';700],"rle","rle")
}

#[test]
fn rle_output_format() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("runs.txt");
    let out_path = temp_dir.path().join("runs.rle");
    std::fs::write(&in_path,"aaaabbbccd")?;
    Command::cargo_bin("rlehuff")?
        .arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success();
    assert_eq!(std::fs::read(out_path)?,hex::decode("0461036202630164")?);
    Ok(())
}

#[test]
fn unknown_extension_is_rejected() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("sam.zip");
    let out_path = temp_dir.path().join("sam.txt");
    std::fs::write(&in_path,SAM)?;
    Command::cargo_bin("rlehuff")?
        .arg("decompress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot detect method"));
    assert!(!Path::new(&out_path).exists());
    Ok(())
}

#[test]
fn corrupt_file_leaves_no_output() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = temp_dir.path().join("bad.huff");
    let out_path = temp_dir.path().join("bad.txt");
    std::fs::write(&in_path,"HUFX not really")?;
    Command::cargo_bin("rlehuff")?
        .arg("decompress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CorruptHeader"));
    assert!(!Path::new(&out_path).exists());
    Ok(())
}
