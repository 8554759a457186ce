//! Implementation of `degs genes` subcommand.

use std::{io::Write, path::PathBuf};

use clap::Parser;
use thousands::Separable;

use crate::{
    common::open_output,
    conf::{ConfArgs, Config},
};

use super::{Direction, FoldChangeMode, SignificanceFilter};

/// Command line arguments selecting differentially expressed genes.
///
/// Shared by all subcommands that start from a differential expression table.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Direction of regulation to keep, overrides `cutoffs.direction`.
    #[arg(long, value_enum)]
    pub direction: Option<Direction>,
    /// Keep genes with log2 fold change in the closed interval `LOWER,UPPER`
    /// instead of applying the absolute fold change cutoff, overrides
    /// `cutoffs.log2fc_interval`.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub log2fc_interval: Option<Vec<f64>>,
}

impl FilterArgs {
    /// Construct the filter from the cutoffs in `conf` and the overrides given here.
    pub fn to_filter(&self, conf: &Config) -> Result<SignificanceFilter, anyhow::Error> {
        let interval = self.log2fc_interval.clone().or_else(|| {
            conf.cutoffs
                .log2fc_interval
                .map(|(lower, upper)| vec![lower, upper])
        });
        let fold_change = match interval.as_deref() {
            None => FoldChangeMode::Threshold {
                min_abs: conf.cutoffs.log2fc_min,
            },
            Some(&[lower, upper]) => {
                if lower > upper {
                    anyhow::bail!("invalid log2 fold change interval [{}, {}]", lower, upper);
                }
                FoldChangeMode::Interval { lower, upper }
            }
            Some(values) => anyhow::bail!(
                "log2 fold change interval needs two values, got {:?}",
                values
            ),
        };
        Ok(SignificanceFilter {
            padj_max: conf.cutoffs.padj_max,
            direction: self.direction.unwrap_or(conf.cutoffs.direction),
            fold_change,
        })
    }
}

/// Command line arguments for `degs genes` subcommand.
#[derive(Parser, Debug)]
#[command(about = "Write IDs of differentially expressed genes", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub conf: ConfArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Differential expression table, defaults to `paths.diff` from the configuration.
    #[arg(long)]
    pub path_de: Option<PathBuf>,
    /// Rank genes by fold change (strongest first) instead of table order.
    #[arg(long, default_value_t = false)]
    pub ranked: bool,
    /// Path to output file, stdout if omitted.
    #[arg(long)]
    pub path_output: Option<PathBuf>,
}

/// Main entry point for `degs genes` sub command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `degs genes`");
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let conf = args.conf.resolve()?;
    let filter = args.filter.to_filter(&conf)?;
    let path_de = args.path_de.clone().unwrap_or(conf.paths.diff.clone());

    let records = super::load_records(&path_de)
        .map_err(|e| anyhow::anyhow!("could not load {:?}: {}", &path_de, e))?;
    let genes = if args.ranked {
        filter.ranked_gene_ids(&records)
    } else {
        filter.gene_ids(&records)
    };
    tracing::info!(
        "{} genes pass the {} filter",
        genes.len().separate_with_commas(),
        filter.direction
    );

    let mut writer = open_output(args.path_output.as_ref())?;
    for gene_id in &genes {
        writeln!(writer, "{}", gene_id)?;
    }
    writer.flush()?;

    Ok(())
}
