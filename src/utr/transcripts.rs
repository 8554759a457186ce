//! Transcript to gene mapping and selection of the longest transcript per gene.

use std::{path::Path, time::Instant};

use indexmap::IndexSet;
use itertools::Itertools;
use serde::Deserialize;
use thousands::Separable;

use crate::{common::open_table, err::Error, utr::dump::SequenceStore};

/// Module with code supporting the parsing.
mod input {
    use serde::Deserialize;

    /// Record from the BioMart transcript export.
    #[derive(Debug, Deserialize)]
    pub struct Record {
        /// ENSEMBL transcript ID
        #[serde(rename = "Transcript stable ID", alias = "transcript_id")]
        pub transcript_id: String,
        /// ENSEMBL gene ID
        #[serde(rename = "Gene stable ID", alias = "gene_id")]
        pub gene_id: String,
        /// Gene symbol, empty for unnamed genes
        #[serde(rename = "Gene name", alias = "gene_name", default)]
        pub gene_name: Option<String>,
        /// Length including UTRs and CDS
        #[serde(
            rename = "Transcript length (including UTRs and CDS)",
            alias = "transcript_length"
        )]
        pub transcript_length: u64,
    }
}

/// Information on one transcript from the mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "input::Record")]
pub struct TranscriptMetadata {
    /// Transcript stable ID.
    pub transcript_id: String,
    /// Stable ID of the owning gene.
    pub gene_id: String,
    /// Display name of the gene, the gene ID for unnamed genes.
    pub gene_name: String,
    /// Total transcript length.
    pub transcript_length: u64,
}

impl From<input::Record> for TranscriptMetadata {
    fn from(record: input::Record) -> Self {
        let gene_name = match record.gene_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => record.gene_id.clone(),
        };
        Self {
            transcript_id: record.transcript_id,
            gene_id: record.gene_id,
            gene_name,
            transcript_length: record.transcript_length,
        }
    }
}

/// One selected `(gene name, sequence)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneSequence {
    /// Gene stable ID, used for de-duplication.
    pub gene_id: String,
    /// Display name of the gene.
    pub gene_name: String,
    /// Transcript the sequence was taken from.
    pub transcript_id: String,
    /// The UTR sequence.
    pub sequence: String,
}

/// The transcript mapping table.
#[derive(Debug, Default, Clone)]
pub struct TranscriptTable {
    /// Rows in file order.
    pub records: Vec<TranscriptMetadata>,
}

impl TranscriptTable {
    /// Load the table from `path`, delimiter is derived from the file name.
    #[tracing::instrument]
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        tracing::debug!("loading transcript mapping from {:?}...", path);
        let before_loading = Instant::now();

        let mut reader = open_table(path)?;
        let records = reader
            .deserialize::<TranscriptMetadata>()
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "... done loading {} transcripts in {:?}",
            records.len().separate_with_commas(),
            before_loading.elapsed()
        );
        Ok(Self { records })
    }

    /// Mapping from transcript ID to gene ID.
    pub fn gene_of(&self) -> std::collections::HashMap<&str, &str> {
        self.records
            .iter()
            .map(|record| (record.transcript_id.as_str(), record.gene_id.as_str()))
            .collect()
    }

    /// Select the longest transcript with available sequence for each gene in `genes`.
    ///
    /// Rows are stable-sorted by transcript length, descending, so ties keep
    /// file order.  Genes without any sequence are silently left out.  The
    /// result is ordered by descending transcript length.
    pub fn select_longest(
        &self,
        genes: &IndexSet<String>,
        sequences: &SequenceStore,
    ) -> Vec<GeneSequence> {
        let result = self
            .records
            .iter()
            .sorted_by(|a, b| b.transcript_length.cmp(&a.transcript_length))
            .filter(|record| genes.contains(&record.gene_id))
            .filter_map(|record| {
                sequences
                    .get(&record.transcript_id)
                    .map(|sequence| (record, sequence))
            })
            .unique_by(|(record, _)| record.gene_id.clone())
            .map(|(record, sequence)| GeneSequence {
                gene_id: record.gene_id.clone(),
                gene_name: record.gene_name.clone(),
                transcript_id: record.transcript_id.clone(),
                sequence: sequence.to_string(),
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "selected sequences for {} of {} genes",
            result.len().separate_with_commas(),
            genes.len().separate_with_commas()
        );
        result
    }
}
