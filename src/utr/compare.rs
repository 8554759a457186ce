//! Implementation of `utr compare` subcommand.
//!
//! Compares UTR lengths between the significant genes of two differential
//! expression tables and the common and exclusive parts of both gene sets.

use std::path::PathBuf;

use clap::Parser;
use indexmap::IndexSet;

use crate::{
    common::{mean_and_median, open_output},
    conf::ConfArgs,
    degs::{self, cli::FilterArgs},
    utr::{
        dump::{SequenceStore, UtrKind},
        transcripts::TranscriptTable,
    },
};

/// Partition of two gene sets.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Partition {
    /// Genes in both sets, in order of the first set.
    pub common: IndexSet<String>,
    /// Genes only in the first set.
    pub only_a: IndexSet<String>,
    /// Genes only in the second set.
    pub only_b: IndexSet<String>,
}

impl Partition {
    pub fn new(a: &IndexSet<String>, b: &IndexSet<String>) -> Self {
        Self {
            common: a.intersection(b).cloned().collect(),
            only_a: a.difference(b).cloned().collect(),
            only_b: b.difference(a).cloned().collect(),
        }
    }
}

/// Module with code supporting the output.
mod output {
    use serde::Serialize;

    /// One line of the report.
    #[derive(Debug, Serialize, PartialEq)]
    pub struct Record {
        /// Name of the gene group.
        pub group: String,
        /// Number of genes in the group.
        pub genes: usize,
        /// Number of genes with an annotated UTR.
        pub with_utr: usize,
        /// Mean UTR length, empty if no gene has a UTR.
        pub mean_length: Option<f64>,
        /// Median UTR length, empty if no gene has a UTR.
        pub median_length: Option<f64>,
    }
}

/// Summarize UTR lengths of the genes in `genes`.
fn summarize(
    group: String,
    genes: &IndexSet<String>,
    table: &TranscriptTable,
    store: &SequenceStore,
) -> output::Record {
    let lengths = table
        .select_longest(genes, store)
        .iter()
        .map(|item| item.sequence.len())
        .collect::<Vec<_>>();
    let stats = mean_and_median(&lengths);
    tracing::info!(
        "{}: {} genes, {} with UTR, mean length {:?}",
        &group,
        genes.len(),
        lengths.len(),
        stats.map(|(mean, _)| mean)
    );
    output::Record {
        group,
        genes: genes.len(),
        with_utr: lengths.len(),
        mean_length: stats.map(|(mean, _)| mean),
        median_length: stats.map(|(_, median)| median),
    }
}

/// Command line arguments for `utr compare` subcommand.
#[derive(Parser, Debug)]
#[command(about = "Compare UTR lengths between two sets of DE genes", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub conf: ConfArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// UTR side to use, 5 or 3.
    #[arg(long, default_value = "3")]
    pub utr: UtrKind,
    /// First differential expression table.
    #[arg(long)]
    pub path_de_a: PathBuf,
    /// Second differential expression table.
    #[arg(long)]
    pub path_de_b: PathBuf,
    /// Label of the first table.
    #[arg(long, default_value = "a")]
    pub label_a: String,
    /// Label of the second table.
    #[arg(long, default_value = "b")]
    pub label_b: String,
    /// Path to output TSV file, stdout if omitted.
    #[arg(long)]
    pub path_output: Option<PathBuf>,
}

/// Main entry point for `utr compare` sub command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `utr compare`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let conf = args.conf.resolve()?;
    let filter = args.filter.to_filter(&conf)?;

    let genes_a = degs::load_gene_ids(&args.path_de_a, &filter)
        .map_err(|e| anyhow::anyhow!("could not load {:?}: {}", &args.path_de_a, e))?;
    let genes_b = degs::load_gene_ids(&args.path_de_b, &filter)
        .map_err(|e| anyhow::anyhow!("could not load {:?}: {}", &args.path_de_b, e))?;
    let partition = Partition::new(&genes_a, &genes_b);

    let table = TranscriptTable::from_path(&conf.paths.mapping)?;
    let store = SequenceStore::load(args.utr, &conf.paths)?;

    let groups = [
        (args.label_a.clone(), &genes_a),
        (args.label_b.clone(), &genes_b),
        (String::from("common"), &partition.common),
        (format!("only_{}", &args.label_a), &partition.only_a),
        (format!("only_{}", &args.label_b), &partition.only_b),
    ];

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_writer(open_output(args.path_output.as_ref())?);
    for (group, genes) in groups {
        writer.serialize(summarize(group, genes, &table, &store))?;
    }
    writer.flush()?;

    Ok(())
}
