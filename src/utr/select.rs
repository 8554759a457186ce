//! Implementation of `utr select` subcommand.

use std::{io::Write, path::PathBuf};

use clap::Parser;
use thousands::Separable;

use crate::{
    common::open_output,
    conf::ConfArgs,
    degs::{self, cli::FilterArgs},
    fasta::write_records,
    utr::{
        dump::{SequenceStore, UtrKind},
        transcripts::{GeneSequence, TranscriptTable},
    },
};

/// Output file format.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, strum::Display, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated table with header.
    #[default]
    Tsv,
    /// FASTA with the gene name as record name.
    Fasta,
}

/// Module with code supporting the output.
mod output {
    use serde::Serialize;

    /// Record as written to the TSV output.
    #[derive(Debug, Serialize)]
    pub struct Record<'a> {
        pub gene_name: &'a str,
        pub gene_id: &'a str,
        pub transcript_id: &'a str,
        pub utr_length: usize,
        pub sequence: &'a str,
    }
}

/// Write the selection to `writer` in the given format.
pub fn write_selection<W: Write>(
    writer: W,
    selection: &[GeneSequence],
    format: OutputFormat,
) -> Result<(), anyhow::Error> {
    match format {
        OutputFormat::Tsv => {
            let mut csv_writer = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .has_headers(true)
                .from_writer(writer);
            for item in selection {
                csv_writer.serialize(output::Record {
                    gene_name: &item.gene_name,
                    gene_id: &item.gene_id,
                    transcript_id: &item.transcript_id,
                    utr_length: item.sequence.len(),
                    sequence: &item.sequence,
                })?;
            }
            csv_writer.flush()?;
        }
        OutputFormat::Fasta => {
            let mut writer = writer;
            write_records(
                &mut writer,
                selection
                    .iter()
                    .map(|item| (item.gene_name.as_str(), item.sequence.as_str())),
            )?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Command line arguments for `utr select` subcommand.
#[derive(Parser, Debug)]
#[command(
    about = "Select the longest-transcript UTR of differentially expressed genes",
    long_about = None
)]
pub struct Args {
    #[command(flatten)]
    pub conf: ConfArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// UTR side to use, 5 or 3.
    #[arg(long, default_value = "3")]
    pub utr: UtrKind,
    /// Differential expression table, defaults to `paths.diff` from the configuration.
    #[arg(long)]
    pub path_de: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
    pub output_format: OutputFormat,
    /// Path to output file, stdout if omitted.
    #[arg(long)]
    pub path_output: Option<PathBuf>,
}

/// Main entry point for `utr select` sub command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `utr select`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let conf = args.conf.resolve()?;
    let filter = args.filter.to_filter(&conf)?;
    let path_de = args.path_de.clone().unwrap_or(conf.paths.diff.clone());

    tracing::info!("Selecting genes from {:?}...", &path_de);
    let genes = degs::load_gene_ids(&path_de, &filter)
        .map_err(|e| anyhow::anyhow!("could not load {:?}: {}", &path_de, e))?;

    tracing::info!("Loading transcript mapping and {}' UTR sequences...", args.utr);
    let table = TranscriptTable::from_path(&conf.paths.mapping)?;
    let store = SequenceStore::load(args.utr, &conf.paths)?;

    let selection = table.select_longest(&genes, &store);
    tracing::info!(
        "... {} of {} genes have an annotated {}' UTR",
        selection.len().separate_with_commas(),
        genes.len().separate_with_commas(),
        args.utr
    );

    write_selection(
        open_output(args.path_output.as_ref())?,
        &selection,
        args.output_format,
    )?;

    Ok(())
}
