//! FASTA output for the external motif discovery tools.

use std::{collections::HashMap, io::Write};

use indexmap::{IndexMap, IndexSet};

use crate::utr::dump::SequenceStore;

pub mod cli;

/// Shortest sequence written by default, the smallest motif width searched for.
pub const DEFAULT_MIN_LENGTH: usize = 6;

/// Write `(name, sequence)` pairs as FASTA records, one line per sequence.
pub fn write_records<'a, W, I>(writer: &mut W, records: I) -> Result<usize, std::io::Error>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut count = 0;
    for (name, sequence) in records {
        writeln!(writer, ">{}", name)?;
        writeln!(writer, "{}", sequence)?;
        count += 1;
    }
    Ok(count)
}

/// Result of keying UTR sequences by gene.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GeneSequences {
    /// Sequence per gene ID, ordered by first appearance of the gene.
    pub sequences: IndexMap<String, String>,
    /// Number of transcripts without entry in the mapping.
    pub unmapped: usize,
}

impl GeneSequences {
    /// Key the transcript sequences in `store` by their gene.
    ///
    /// With `genes`, only the listed genes are kept.  When a gene has several
    /// transcripts, the later transcript in the dump replaces the sequence of
    /// the earlier one while the gene keeps its position.
    pub fn build(
        store: &SequenceStore,
        gene_of: &HashMap<&str, &str>,
        genes: Option<&IndexSet<String>>,
    ) -> Self {
        let mut result = Self::default();
        for (transcript_id, sequence) in store.iter() {
            let Some(gene_id) = gene_of.get(transcript_id) else {
                tracing::trace!("transcript {} not in mapping", transcript_id);
                result.unmapped += 1;
                continue;
            };
            if genes.map_or(true, |genes| genes.contains(*gene_id)) {
                result
                    .sequences
                    .insert(gene_id.to_string(), sequence.to_string());
            }
        }
        result
    }

    /// Iterate over the genes with sequences of at least `min_length`.
    pub fn with_min_length(&self, min_length: usize) -> impl Iterator<Item = (&str, &str)> {
        self.sequences
            .iter()
            .filter(move |(_, sequence)| sequence.len() >= min_length)
            .map(|(gene_id, sequence)| (gene_id.as_str(), sequence.as_str()))
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use indexmap::IndexSet;
    use pretty_assertions::assert_eq;

    use super::GeneSequences;
    use crate::utr::dump::SequenceStore;

    #[test]
    fn write_records() -> Result<(), anyhow::Error> {
        let mut buf = Vec::new();

        let count = super::write_records(&mut buf, vec![("abc1", "ACGT"), ("def2", "GG")])?;

        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(buf)?, ">abc1\nACGT\n>def2\nGG\n");

        Ok(())
    }

    #[test]
    fn build_gene_sequences() -> Result<(), anyhow::Error> {
        let store = SequenceStore::from_reader(
            ">|x|T1\nAAAAAAA\n>|x|T2\nCC\n>|x|T3\nGGGGGGGG\n>|x|T4\nTTTTTTTT\n".as_bytes(),
        )?;
        let gene_of = HashMap::from([("T1", "GA"), ("T2", "GB"), ("T3", "GA")]);

        let all = GeneSequences::build(&store, &gene_of, None);

        assert_eq!(all.unmapped, 1);
        assert_eq!(
            all.sequences.iter().collect::<Vec<_>>(),
            vec![
                (&String::from("GA"), &String::from("GGGGGGGG")),
                (&String::from("GB"), &String::from("CC"))
            ]
        );
        assert_eq!(
            all.with_min_length(6).collect::<Vec<_>>(),
            vec![("GA", "GGGGGGGG")]
        );

        let genes = IndexSet::from([String::from("GB")]);
        let some = GeneSequences::build(&store, &gene_of, Some(&genes));
        assert_eq!(
            some.with_min_length(0).collect::<Vec<_>>(),
            vec![("GB", "CC")]
        );

        Ok(())
    }
}
