//! Implementation of `motifs streme` subcommand.
//!
//! Collects the significant motifs from a directory of STREME runs, one
//! sub-directory per run, each with its `streme.txt`.

use std::{
    io::BufRead,
    path::{Path, PathBuf},
};

use clap::Parser;
use thousands::Separable;

use crate::{
    common::{open_output, open_read_maybe_gz},
    err::Error,
};

/// Name of the text output file within each STREME run directory.
pub const STREME_TXT: &str = "streme.txt";

/// A motif reported by STREME.
#[derive(Debug, Clone, PartialEq)]
pub struct Motif {
    /// Consensus sequence of the motif.
    pub consensus: String,
    /// P-value reported for the motif.
    pub p_value: f64,
}

/// Extract consensus from a `MOTIF 1-ACGUAC STREME-1` line.
fn parse_motif_line(lineno: usize, line: &str) -> Result<String, Error> {
    line.split_whitespace()
        .nth(1)
        .and_then(|name| name.split('-').nth(1))
        .filter(|consensus| !consensus.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::parse(lineno, format!("invalid MOTIF line: {:?}", line)))
}

/// Extract the value following `P=`.
fn parse_p_value(lineno: usize, line: &str) -> Result<f64, Error> {
    let value = line
        .split_once("P=")
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .ok_or_else(|| Error::parse(lineno, format!("no P= value in line: {:?}", line)))?;
    value
        .parse::<f64>()
        .map_err(|e| Error::parse(lineno, format!("invalid p-value {:?}: {}", value, e)))
}

/// Read all motifs from STREME text output with p-value of at most `max_p_value`.
pub fn read_motifs<R: BufRead>(reader: R, max_p_value: f64) -> Result<Vec<Motif>, Error> {
    let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;

    let mut result = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !line.starts_with("MOTIF") {
            continue;
        }
        let consensus = parse_motif_line(i + 1, line.trim())?;
        let next = lines
            .get(i + 1)
            .ok_or_else(|| Error::parse(i + 2, "unexpected end of file after MOTIF line"))?;
        let p_value = parse_p_value(i + 2, next)?;
        if p_value <= max_p_value {
            result.push(Motif { consensus, p_value });
        }
    }
    Ok(result)
}

/// Read motifs of all runs below `path`, sorted by run name.
///
/// Directories without `streme.txt` are skipped.
pub fn read_runs(path: &Path, max_p_value: f64) -> Result<Vec<(String, Vec<Motif>)>, Error> {
    let mut run_dirs = std::fs::read_dir(path)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    run_dirs.retain(|path| path.is_dir());
    run_dirs.sort();

    let mut result = Vec::new();
    for run_dir in run_dirs {
        let path_txt = run_dir.join(STREME_TXT);
        if !path_txt.exists() {
            tracing::warn!("skipping {:?} without {}", &run_dir, STREME_TXT);
            continue;
        }
        let name = run_dir
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let motifs = read_motifs(open_read_maybe_gz(&path_txt)?, max_p_value)?;
        tracing::debug!("{}: {} motifs", &name, motifs.len());
        result.push((name, motifs));
    }
    Ok(result)
}

/// Module with code supporting the output.
mod output {
    use serde::Serialize;

    /// Record as written to the TSV output.
    #[derive(Debug, Serialize)]
    pub struct Record<'a> {
        pub run: &'a str,
        pub motif: &'a str,
        pub p_value: f64,
    }
}

/// Command line arguments for `motifs streme` subcommand.
#[derive(Parser, Debug)]
#[command(about = "Collect significant motifs from STREME runs", long_about = None)]
pub struct Args {
    /// Directory with one sub-directory per STREME run.
    #[arg(long)]
    pub path_in: PathBuf,
    /// Largest p-value to report.
    #[arg(long, default_value_t = 0.05)]
    pub max_p_value: f64,
    /// Only report runs whose name contains all of these terms.
    #[arg(long, value_delimiter = ',')]
    pub run_contains: Vec<String>,
    /// Path to output TSV file, stdout if omitted.
    #[arg(long)]
    pub path_output: Option<PathBuf>,
}

/// Main entry point for `motifs streme` sub command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `motifs streme`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let runs = read_runs(&args.path_in, args.max_p_value)
        .map_err(|e| anyhow::anyhow!("could not read runs from {:?}: {}", &args.path_in, e))?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_writer(open_output(args.path_output.as_ref())?);
    let mut count = 0usize;
    for (run, motifs) in runs
        .iter()
        .filter(|(run, _)| args.run_contains.iter().all(|term| run.contains(term)))
    {
        for motif in motifs {
            writer.serialize(output::Record {
                run,
                motif: &motif.consensus,
                p_value: motif.p_value,
            })?;
            count += 1;
        }
    }
    writer.flush()?;
    tracing::info!("wrote {} motifs", count.separate_with_commas());

    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Args, Motif};
    use crate::{common, err::Error};

    const STREME_TXT: &str = "\
MEME version 5.2.0

ALPHABET= ACGU

MOTIF 1-GCGCGC STREME-1
letter-probability matrix: alength= 4 w= 6 nsites= 25 P= 1.2e-003
 0.000000 0.000000 1.000000 0.000000
MOTIF 2-AUUUA STREME-2
letter-probability matrix: alength= 4 w= 5 nsites= 12 P= 3.4e-001
MOTIF 3-UGUAHAUA STREME-3
letter-probability matrix: alength= 4 w= 8 nsites= 40 P= 5.0e-002
";

    #[test]
    fn read_motifs() -> Result<(), Error> {
        let motifs = super::read_motifs(STREME_TXT.as_bytes(), 0.05)?;

        assert_eq!(
            motifs,
            vec![
                Motif {
                    consensus: String::from("GCGCGC"),
                    p_value: 1.2e-3
                },
                Motif {
                    consensus: String::from("UGUAHAUA"),
                    p_value: 5.0e-2
                },
            ]
        );

        Ok(())
    }

    #[rstest::rstest]
    #[case("MOTIF 1-ACGU STREME-1\n")]
    #[case("MOTIF 1-ACGU STREME-1\nletter-probability matrix: alength= 4\n")]
    #[case("MOTIF 1-ACGU STREME-1\nletter-probability matrix: P= abc\n")]
    #[case("MOTIF ACGU\nletter-probability matrix: P= 0.01\n")]
    fn read_motifs_malformed(#[case] text: &str) {
        let result = super::read_motifs(text.as_bytes(), 0.05);

        assert!(matches!(result, Err(Error::Parse { .. })), "{:?}", result);
    }

    #[test]
    fn run_smoke() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        for name in ["down_wt_all", "down_mia40_all", "up_wt_control"] {
            std::fs::create_dir_all(tmp_dir.join("streme").join(name))?;
            std::fs::write(
                tmp_dir.join("streme").join(name).join("streme.txt"),
                STREME_TXT,
            )?;
        }
        std::fs::create_dir_all(tmp_dir.join("streme").join("empty_all"))?;

        let args = Args {
            path_in: tmp_dir.join("streme"),
            max_p_value: 0.01,
            run_contains: vec![String::from("down"), String::from("all")],
            path_output: Some(tmp_dir.join("motifs.tsv")),
        };
        super::run(&common::Args::default(), &args)?;

        assert_eq!(
            std::fs::read_to_string(tmp_dir.join("motifs.tsv"))?,
            "run\tmotif\tp_value\n\
             down_mia40_all\tGCGCGC\t0.0012\n\
             down_wt_all\tGCGCGC\t0.0012\n"
        );

        Ok(())
    }
}
