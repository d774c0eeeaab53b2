use clap::{arg,crate_version,Command};
use rlehuff::Algorithm;
use std::path::Path;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";

fn ok_to_overwrite(path_out: &str) -> Result<bool,std::io::Error> {
    if Path::new(path_out).exists() {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out);
        std::io::stdin().read_line(&mut ans)?;
        return Ok(ans.trim_end()=="y" || ans.trim_end()=="Y");
    }
    Ok(true)
}

/// Temporary file in the same directory as `path_out`, so it can be renamed into place.
fn temp_beside(path_out: &str) -> Result<tempfile::NamedTempFile,std::io::Error> {
    let dir = match Path::new(path_out).parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new(".")
    };
    tempfile::NamedTempFile::new_in(dir)
}

fn main() -> STDRESULT
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let long_help =
"Examples:
---------
Compress:      `rlehuff compress -m huff -i notes.txt -o notes.txt.huff`
Decompress:    `rlehuff decompress -i notes.txt.huff -o notes.txt`

When decompressing without `-m` the method is taken from the input extension (rle, huff, huffman).";

    let methods = ["rle","huff","huffman"];

    let mut main_cmd = Command::new("rlehuff")
        .about("Compress and decompress with run length or Huffman coding")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-m --method <METHOD> "compression algorithm").value_parser(methods)
            .default_value("rle"))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("decompress")
        .arg(arg!(-m --method <METHOD> "compression algorithm, default is from input extension").value_parser(methods))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("decompress a file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let algorithm: Algorithm = cmd.get_one::<String>("method").expect(RCH).parse()?;
        if !ok_to_overwrite(path_out)? {
            eprintln!("abort operation");
            return Ok(());
        }
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = temp_beside(path_out)?;
        let (in_size,out_size) = rlehuff::compress(&mut in_file,out_file.as_file_mut(),algorithm)?;
        out_file.persist(path_out)?;
        eprintln!("compressed {} into {} ({})",in_size,out_size,algorithm);
    }

    if let Some(cmd) = matches.subcommand_matches("decompress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let algorithm = match cmd.get_one::<String>("method") {
            Some(method) => method.parse::<Algorithm>()?,
            None => match Algorithm::from_extension(path_in) {
                Ok(algorithm) => algorithm,
                Err(e) => {
                    eprintln!("cannot detect method from {}, use -m",path_in);
                    return Err(Box::new(e));
                }
            }
        };
        log::info!("decompress {} with {}",path_in,algorithm);
        if !ok_to_overwrite(path_out)? {
            eprintln!("abort operation");
            return Ok(());
        }
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = temp_beside(path_out)?;
        let (in_size,out_size) = rlehuff::decompress(&mut in_file,out_file.as_file_mut(),algorithm)?;
        out_file.persist(path_out)?;
        eprintln!("decompressed {} into {} ({})",in_size,out_size,algorithm);
    }

    Ok(())
}
