//! Differential expression tables and selection of significant genes.

use std::{path::Path, time::Instant};

use indexmap::IndexSet;
use serde::Deserialize;
use thousands::Separable;

use crate::{common::open_table, conf::Cutoffs, err::Error};

pub mod cli;

/// One row of a DESeq2-style result table.
///
/// Values that cannot be parsed as numbers (DESeq2 writes `NA`) are read as
/// `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DifferentialExpressionRecord {
    /// Gene stable ID.
    pub gene_id: String,
    /// Signed log2 fold change.
    #[serde(
        rename = "log2FoldChange",
        alias = "log2FC",
        alias = "log2_fold_change",
        deserialize_with = "csv::invalid_option"
    )]
    pub log2_fold_change: Option<f64>,
    /// Adjusted p-value.
    #[serde(rename = "padj", alias = "FDR", deserialize_with = "csv::invalid_option")]
    pub padj: Option<f64>,
}

/// Load all records of the table at `path`.
#[tracing::instrument]
pub fn load_records(path: &Path) -> Result<Vec<DifferentialExpressionRecord>, Error> {
    tracing::debug!("loading differential expression table from {:?}...", path);
    let before_loading = Instant::now();

    let mut reader = open_table(path)?;
    let records = reader
        .deserialize::<DifferentialExpressionRecord>()
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        "... done loading {} records in {:?}",
        records.len().separate_with_commas(),
        before_loading.elapsed()
    );
    Ok(records)
}

/// Direction of regulation to keep.
#[derive(
    clap::ValueEnum,
    Clone,
    Copy,
    Debug,
    Default,
    strum::Display,
    PartialEq,
    Eq,
    Hash,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Up- and down-regulated genes.
    #[default]
    Both,
    /// Only genes with positive fold change.
    Up,
    /// Only genes with negative fold change.
    Down,
}

impl Direction {
    fn passes(&self, log2_fold_change: f64) -> bool {
        match self {
            Direction::Both => true,
            Direction::Up => log2_fold_change > 0.0,
            Direction::Down => log2_fold_change < 0.0,
        }
    }
}

/// How the fold change is tested.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FoldChangeMode {
    /// Keep `|fc| >= min_abs`, i.e., `fc <= -min_abs` or `fc >= min_abs`.
    Threshold { min_abs: f64 },
    /// Keep `lower <= fc <= upper`.
    Interval { lower: f64, upper: f64 },
}

impl FoldChangeMode {
    fn passes(&self, log2_fold_change: f64) -> bool {
        match *self {
            FoldChangeMode::Threshold { min_abs } => {
                log2_fold_change <= -min_abs || log2_fold_change >= min_abs
            }
            FoldChangeMode::Interval { lower, upper } => {
                lower <= log2_fold_change && log2_fold_change <= upper
            }
        }
    }
}

/// Filter for significantly differentially expressed genes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignificanceFilter {
    /// Maximal adjusted p-value (inclusive).
    pub padj_max: f64,
    /// Direction of regulation.
    pub direction: Direction,
    /// Fold change test.
    pub fold_change: FoldChangeMode,
}

impl SignificanceFilter {
    /// Threshold mode filter with the cutoffs from the configuration.
    pub fn from_cutoffs(cutoffs: &Cutoffs, direction: Direction) -> Self {
        Self {
            padj_max: cutoffs.padj_max,
            direction,
            fold_change: FoldChangeMode::Threshold {
                min_abs: cutoffs.log2fc_min,
            },
        }
    }

    /// Whether `record` passes the filter, rows with missing values never pass.
    pub fn passes(&self, record: &DifferentialExpressionRecord) -> bool {
        match (record.padj, record.log2_fold_change) {
            (Some(padj), Some(fc)) => {
                padj <= self.padj_max && self.fold_change.passes(fc) && self.direction.passes(fc)
            }
            _ => false,
        }
    }

    /// IDs of the genes passing the filter, in table order without duplicates.
    pub fn gene_ids(&self, records: &[DifferentialExpressionRecord]) -> IndexSet<String> {
        let result = records
            .iter()
            .filter(|record| self.passes(record))
            .map(|record| record.gene_id.clone())
            .collect::<IndexSet<_>>();
        tracing::debug!(
            "{} of {} records pass {:?}",
            result.len().separate_with_commas(),
            records.len().separate_with_commas(),
            self
        );
        result
    }

    /// Like `gene_ids()` but ranked by strength of regulation.
    ///
    /// Up-regulated genes come by descending fold change, down-regulated by
    /// ascending fold change, and with `Direction::Both` by descending
    /// absolute fold change.  The sort is stable.
    pub fn ranked_gene_ids(&self, records: &[DifferentialExpressionRecord]) -> IndexSet<String> {
        let mut passing = records
            .iter()
            .filter(|record| self.passes(record))
            .filter_map(|record| record.log2_fold_change.map(|fc| (record, fc)))
            .collect::<Vec<_>>();
        let key = |fc: f64| match self.direction {
            Direction::Up => -fc,
            Direction::Down => fc,
            Direction::Both => -fc.abs(),
        };
        passing.sort_by(|(_, a), (_, b)| key(*a).total_cmp(&key(*b)));
        passing
            .into_iter()
            .map(|(record, _)| record.gene_id.clone())
            .collect()
    }
}

/// Load the table at `path` and return the gene IDs passing `filter`.
pub fn load_gene_ids(path: &Path, filter: &SignificanceFilter) -> Result<IndexSet<String>, Error> {
    Ok(filter.gene_ids(&load_records(path)?))
}

#[cfg(test)]
mod test {
    use indexmap::IndexSet;
    use pretty_assertions::assert_eq;

    use super::{DifferentialExpressionRecord, Direction, FoldChangeMode, SignificanceFilter};
    use crate::{conf::Cutoffs, err::Error};

    fn record(gene_id: &str, fc: Option<f64>, padj: Option<f64>) -> DifferentialExpressionRecord {
        DifferentialExpressionRecord {
            gene_id: gene_id.to_string(),
            log2_fold_change: fc,
            padj,
        }
    }

    fn ids(set: &IndexSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[rstest::rstest]
    #[case(Direction::Both, 1.0, 0.05, true)]
    #[case(Direction::Both, -1.0, 0.05, true)]
    #[case(Direction::Both, 0.99, 0.01, false)]
    #[case(Direction::Both, -0.5, 0.01, false)]
    #[case(Direction::Both, 3.0, 0.050001, false)]
    #[case(Direction::Up, 2.0, 0.01, true)]
    #[case(Direction::Up, -2.0, 0.01, false)]
    #[case(Direction::Down, -2.0, 0.01, true)]
    #[case(Direction::Down, 2.0, 0.01, false)]
    fn threshold_mode(
        #[case] direction: Direction,
        #[case] fc: f64,
        #[case] padj: f64,
        #[case] expected: bool,
    ) {
        let filter = SignificanceFilter::from_cutoffs(&Cutoffs::default(), direction);

        assert_eq!(filter.passes(&record("G", Some(fc), Some(padj))), expected);
    }

    #[rstest::rstest]
    #[case(Direction::Both, -0.5, true)]
    #[case(Direction::Both, 0.5, true)]
    #[case(Direction::Both, -0.50001, false)]
    #[case(Direction::Both, 2.0, true)]
    #[case(Direction::Both, 2.1, false)]
    #[case(Direction::Up, 0.0, false)]
    #[case(Direction::Up, 0.3, true)]
    #[case(Direction::Down, -0.3, true)]
    fn interval_mode(#[case] direction: Direction, #[case] fc: f64, #[case] expected: bool) {
        let filter = SignificanceFilter {
            padj_max: 0.05,
            direction,
            fold_change: FoldChangeMode::Interval {
                lower: -0.5,
                upper: 2.0,
            },
        };

        assert_eq!(filter.passes(&record("G", Some(fc), Some(0.01))), expected);
    }

    #[test]
    fn missing_values_never_pass() {
        let filter = SignificanceFilter::from_cutoffs(&Cutoffs::default(), Direction::Both);

        assert!(!filter.passes(&record("G", None, Some(0.01))));
        assert!(!filter.passes(&record("G", Some(5.0), None)));
    }

    #[test]
    fn ranked_gene_ids() {
        let records = vec![
            record("A", Some(1.5), Some(0.01)),
            record("B", Some(-4.0), Some(0.01)),
            record("C", Some(3.0), Some(0.01)),
            record("D", Some(-2.0), Some(0.01)),
        ];
        let up = SignificanceFilter::from_cutoffs(&Cutoffs::default(), Direction::Up);
        let down = SignificanceFilter::from_cutoffs(&Cutoffs::default(), Direction::Down);
        let both = SignificanceFilter::from_cutoffs(&Cutoffs::default(), Direction::Both);

        assert_eq!(ids(&up.ranked_gene_ids(&records)), vec!["C", "A"]);
        assert_eq!(ids(&down.ranked_gene_ids(&records)), vec!["B", "D"]);
        assert_eq!(ids(&both.ranked_gene_ids(&records)), vec!["B", "C", "D", "A"]);
        assert_eq!(ids(&both.gene_ids(&records)), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn load_deseq2_fixture() -> Result<(), Error> {
        let records = super::load_records("tests/data/example.csv".as_ref())?;

        assert_eq!(records.len(), 7);
        assert_eq!(records[4].padj, None);
        assert_eq!(records[4].log2_fold_change, Some(-2.0));

        let filter = SignificanceFilter::from_cutoffs(&Cutoffs::default(), Direction::Both);
        assert_eq!(
            ids(&filter.gene_ids(&records)),
            vec!["ENSDARG00000000001", "ENSDARG00000000002", "ENSDARG00000000003"]
        );

        Ok(())
    }

    #[test]
    fn load_tsv_with_aliases() -> Result<(), Error> {
        let filter = SignificanceFilter {
            padj_max: 0.05,
            direction: Direction::Up,
            fold_change: FoldChangeMode::Threshold { min_abs: 0.0 },
        };
        let genes = super::load_gene_ids("tests/data/example_b.tsv".as_ref(), &filter)?;

        assert_eq!(ids(&genes), vec!["ENSDARG00000000001", "ENSDARG00000000004"]);

        Ok(())
    }
}
