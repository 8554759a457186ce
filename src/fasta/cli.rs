//! Implementation of `fasta prepare` subcommand.

use std::{io::Write, path::PathBuf};

use clap::Parser;
use thousands::Separable;

use crate::{
    common::open_output,
    conf::ConfArgs,
    degs::{self, cli::FilterArgs},
    utr::{
        dump::{SequenceStore, UtrKind},
        transcripts::TranscriptTable,
    },
};

use super::{write_records, GeneSequences, DEFAULT_MIN_LENGTH};

/// Command line arguments for `fasta prepare` subcommand.
#[derive(Parser, Debug)]
#[command(about = "Write gene-keyed UTR FASTA for motif discovery", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub conf: ConfArgs,
    /// UTR side to use, 5 or 3.
    #[arg(long, default_value = "3")]
    pub utr: UtrKind,
    /// Restrict to significant genes from this differential expression table;
    /// all genes are written if omitted.
    #[arg(long)]
    pub path_de: Option<PathBuf>,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Shortest sequence to write.
    #[arg(long, default_value_t = DEFAULT_MIN_LENGTH)]
    pub min_length: usize,
    /// Path to output FASTA file, defaults to `{utr}utr.fasta`.
    #[arg(long)]
    pub path_output: Option<PathBuf>,
}

/// Main entry point for `fasta prepare` sub command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `fasta prepare`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let conf = args.conf.resolve()?;
    let genes = match &args.path_de {
        Some(path_de) => {
            let filter = args.filter.to_filter(&conf)?;
            let genes = degs::load_gene_ids(path_de, &filter)
                .map_err(|e| anyhow::anyhow!("could not load {:?}: {}", path_de, e))?;
            tracing::info!("restricting to {} genes", genes.len().separate_with_commas());
            Some(genes)
        }
        None => None,
    };

    tracing::info!("Loading transcript mapping and {}' UTR sequences...", args.utr);
    let table = TranscriptTable::from_path(&conf.paths.mapping)?;
    let store = SequenceStore::load(args.utr, &conf.paths)?;
    let gene_of = table.gene_of();

    let gene_sequences = GeneSequences::build(&store, &gene_of, genes.as_ref());
    if gene_sequences.unmapped > 0 {
        tracing::warn!(
            "{} transcripts in the sequence dump have no gene mapping",
            gene_sequences.unmapped.separate_with_commas()
        );
    }

    let path_output = args
        .path_output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}utr.fasta", args.utr)));
    let mut writer = open_output(Some(&path_output))?;
    let count = write_records(&mut writer, gene_sequences.with_min_length(args.min_length))?;
    writer.flush()?;
    tracing::info!(
        "wrote {} sequences to {:?}",
        count.separate_with_commas(),
        &path_output
    );

    Ok(())
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::Args;
    use crate::{
        common,
        conf::ConfArgs,
        degs::cli::FilterArgs,
        utr::dump::UtrKind,
    };

    fn args(path_de: Option<&str>, path_output: PathBuf) -> Args {
        Args {
            conf: ConfArgs {
                path_conf: Some(PathBuf::from("tests/data/conf.toml")),
                ..Default::default()
            },
            utr: UtrKind::Three,
            path_de: path_de.map(PathBuf::from),
            filter: FilterArgs {
                direction: None,
                log2fc_interval: None,
            },
            min_length: 6,
            path_output: Some(path_output),
        }
    }

    #[test]
    fn run_all_genes() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();

        super::run(&common::Args::default(), &args(None, tmp_dir.join("out.fa")))?;

        assert_eq!(
            std::fs::read_to_string(tmp_dir.join("out.fa"))?,
            ">ENSDARG00000000001\nGGGCCCAAATGGGCCC\n\
             >ENSDARG00000000002\nTTTTAA\n\
             >ENSDARG00000000005\nCCCCCCC\n"
        );

        Ok(())
    }

    #[test]
    fn run_significant_genes() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();

        super::run(
            &common::Args::default(),
            &args(Some("tests/data/example.csv"), tmp_dir.join("out.fa.gz")),
        )?;

        let mut contents = String::new();
        std::io::Read::read_to_string(
            &mut crate::common::open_read_maybe_gz(tmp_dir.join("out.fa.gz"))?,
            &mut contents,
        )?;
        assert_eq!(
            contents,
            ">ENSDARG00000000001\nGGGCCCAAATGGGCCC\n>ENSDARG00000000002\nTTTTAA\n"
        );

        Ok(())
    }
}
