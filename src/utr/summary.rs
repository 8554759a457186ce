//! Implementation of `utr summary` subcommand.
//!
//! Puts the length distribution of all UTRs of a dump next to the UTRs chosen
//! for the differentially expressed genes.

use std::path::PathBuf;

use clap::Parser;
use thousands::Separable;

use crate::{
    common::{mean_and_median, open_output},
    conf::ConfArgs,
    degs::{self, cli::FilterArgs},
    utr::{
        dump::{SequenceStore, UtrKind},
        transcripts::TranscriptTable,
    },
};

/// Module with code supporting the output.
mod output {
    use serde::Serialize;

    /// One line of the report.
    #[derive(Debug, Serialize, PartialEq)]
    pub struct Record {
        /// UTR side, `5` or `3`.
        pub utr: String,
        /// Either `global` or `degs`.
        pub group: &'static str,
        /// Number of sequences.
        pub sequences: usize,
        /// Mean sequence length, empty if there are no sequences.
        pub mean_length: Option<f64>,
        /// Median sequence length, empty if there are no sequences.
        pub median_length: Option<f64>,
    }

    impl Record {
        pub fn new(utr: String, group: &'static str, lengths: &[usize]) -> Self {
            let stats = crate::common::mean_and_median(lengths);
            Self {
                utr,
                group,
                sequences: lengths.len(),
                mean_length: stats.map(|(mean, _)| mean),
                median_length: stats.map(|(_, median)| median),
            }
        }
    }
}

/// Command line arguments for `utr summary` subcommand.
#[derive(Parser, Debug)]
#[command(
    about = "Compare lengths of all UTRs with those of differentially expressed genes",
    long_about = None
)]
pub struct Args {
    #[command(flatten)]
    pub conf: ConfArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// UTR sides to report, comma-separated.
    #[arg(long, value_delimiter = ',', default_values = ["5", "3"])]
    pub utr: Vec<UtrKind>,
    /// Differential expression table, defaults to `paths.diff` from the configuration.
    #[arg(long)]
    pub path_de: Option<PathBuf>,
    /// Path to output TSV file, stdout if omitted.
    #[arg(long)]
    pub path_output: Option<PathBuf>,
}

/// Main entry point for `utr summary` sub command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `utr summary`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let conf = args.conf.resolve()?;
    let filter = args.filter.to_filter(&conf)?;
    let path_de = args.path_de.clone().unwrap_or(conf.paths.diff.clone());

    let genes = degs::load_gene_ids(&path_de, &filter)
        .map_err(|e| anyhow::anyhow!("could not load {:?}: {}", &path_de, e))?;
    let table = TranscriptTable::from_path(&conf.paths.mapping)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_writer(open_output(args.path_output.as_ref())?);
    for &utr in &args.utr {
        let store = SequenceStore::load(utr, &conf.paths)?;
        let global = store
            .iter()
            .map(|(_, sequence)| sequence.len())
            .collect::<Vec<_>>();
        let selected = table
            .select_longest(&genes, &store)
            .iter()
            .map(|item| item.sequence.len())
            .collect::<Vec<_>>();
        tracing::info!(
            "{}' UTR: {} sequences in total (mean length {:?}), {} for {} DE genes (mean length {:?})",
            utr,
            global.len().separate_with_commas(),
            mean_and_median(&global).map(|(mean, _)| mean),
            selected.len().separate_with_commas(),
            genes.len().separate_with_commas(),
            mean_and_median(&selected).map(|(mean, _)| mean),
        );

        writer.serialize(output::Record::new(utr.to_string(), "global", &global))?;
        writer.serialize(output::Record::new(utr.to_string(), "degs", &selected))?;
    }
    writer.flush()?;

    Ok(())
}
