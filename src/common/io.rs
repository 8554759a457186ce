//! Common, IO-related code.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use flate2::{bufread::MultiGzDecoder, write::GzEncoder, Compression};

/// Whether the path carries a `.gz` suffix.
fn is_gz<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().extension().map(|s| s.to_str()) == Some(Some("gz"))
}

/// Transparently open a file with gzip decoder.
pub fn open_read_maybe_gz<P>(path: P) -> Result<Box<dyn BufRead>, std::io::Error>
where
    P: AsRef<Path>,
{
    if is_gz(&path) {
        tracing::trace!("Opening {:?} as gzip for reading", path.as_ref());
        let file = File::open(path)?;
        let bufreader = BufReader::new(file);
        let decoder = MultiGzDecoder::new(bufreader);
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        tracing::trace!("Opening {:?} as plain text for reading", path.as_ref());
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Transparently open a file with gzip encoder.
pub fn open_write_maybe_gz<P>(path: P) -> Result<Box<dyn Write>, std::io::Error>
where
    P: AsRef<Path>,
{
    if is_gz(&path) {
        tracing::trace!("Opening {:?} as gzip for writing", path.as_ref());
        let file = File::create(path)?;
        let bufwriter = BufWriter::new(file);
        let encoder = GzEncoder::new(bufwriter, Compression::default());
        Ok(Box::new(encoder))
    } else {
        tracing::trace!("Opening {:?} as plain text for writing", path.as_ref());
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// Open output file or fall back to stdout if `path` is `None` or `-`.
pub fn open_output<P>(path: Option<P>) -> Result<Box<dyn Write>, std::io::Error>
where
    P: AsRef<Path>,
{
    match path {
        Some(path) if path.as_ref() != Path::new("-") => open_write_maybe_gz(path),
        _ => Ok(Box::new(BufWriter::new(std::io::stdout()))),
    }
}

/// Column delimiter to use for a table, tab for `.tsv`/`.txt`, comma otherwise.
pub fn delimiter_for<P: AsRef<Path>>(path: P) -> u8 {
    let path = path.as_ref();
    let stem = if is_gz(path) {
        path.file_stem().map(Path::new).unwrap_or(path)
    } else {
        path
    };
    match stem.extension().and_then(|s| s.to_str()) {
        Some("tsv") | Some("txt") | Some("tab") => b'\t',
        _ => b',',
    }
}

/// Construct a CSV reader for the table at `path` with the delimiter guessed from its name.
pub fn open_table<P>(path: P) -> Result<csv::Reader<Box<dyn BufRead>>, std::io::Error>
where
    P: AsRef<Path>,
{
    let delimiter = delimiter_for(&path);
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(open_read_maybe_gz(path)?))
}

#[cfg(test)]
mod test {
    use std::io::{Read, Write};

    use pretty_assertions::assert_eq;

    #[rstest::rstest]
    #[case("mapping.csv", b',')]
    #[case("mapping.csv.gz", b',')]
    #[case("mapping.tsv", b'\t')]
    #[case("mapping.tsv.gz", b'\t')]
    #[case("export.txt", b'\t')]
    #[case("noext", b',')]
    fn delimiter_for(#[case] path: &str, #[case] expected: u8) {
        assert_eq!(super::delimiter_for(path), expected);
    }

    #[rstest::rstest]
    #[case("test.txt")]
    #[case("test.txt.gz")]
    fn write_then_read_maybe_gz(#[case] filename: &str) -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();

        {
            let mut f = super::open_write_maybe_gz(tmp_dir.join(filename))?;
            f.write_all(b">x|y|T1\nACGT\n")?;
            f.flush()?;
        }

        let mut buf = String::new();
        super::open_read_maybe_gz(tmp_dir.join(filename))?.read_to_string(&mut buf)?;
        assert_eq!(buf, ">x|y|T1\nACGT\n");

        Ok(())
    }

    #[test]
    fn open_read_missing_file() {
        let err = super::open_read_maybe_gz("tests/does/not/exist.fa").err();
        assert!(matches!(err, Some(e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
