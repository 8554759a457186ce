//! Parsing of BioMart UTR sequence dumps.
//!
//! The dumps are FASTA-like: header lines start with `>` and carry
//! `|`-separated fields, the third of which is the transcript stable ID.
//! Transcripts without an annotated UTR are exported with the single sequence
//! line `Sequence unavailable`.

use std::{io::BufRead, path::Path, time::Instant};

use indexmap::IndexMap;
use thousands::Separable;

use crate::{common::open_read_maybe_gz, conf::Paths, err::Error};

/// Sequence line marking a transcript without annotated UTR.
pub const SEQUENCE_UNAVAILABLE: &str = "Sequence unavailable";

/// Index of the transcript ID in the `|`-separated header fields.
const HEADER_TRANSCRIPT_FIELD: usize = 2;

/// Selection of the UTR side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
pub enum UtrKind {
    /// 5' UTR
    #[strum(serialize = "5")]
    Five,
    /// 3' UTR
    #[strum(serialize = "3")]
    Three,
}

impl UtrKind {
    /// Path of the dump for this UTR side.
    pub fn dump_path<'a>(&self, paths: &'a Paths) -> &'a Path {
        match self {
            UtrKind::Five => &paths.utr5,
            UtrKind::Three => &paths.utr3,
        }
    }
}

fn invalid_kind<D: std::fmt::Display>(value: D) -> Error {
    Error::InvalidArgument(format!(
        "UTR selector must be 5 or 3, got {:?}",
        value.to_string()
    ))
}

impl TryFrom<i64> for UtrKind {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(UtrKind::Five),
            3 => Ok(UtrKind::Three),
            _ => Err(invalid_kind(value)),
        }
    }
}

impl std::str::FromStr for UtrKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5" => Ok(UtrKind::Five),
            "3" => Ok(UtrKind::Three),
            _ => Err(invalid_kind(s)),
        }
    }
}

/// Mapping from transcript stable ID to its UTR sequence.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SequenceStore {
    sequences: IndexMap<String, String>,
}

impl SequenceStore {
    /// Load the dump for `kind` from the configured paths.
    pub fn load(kind: UtrKind, paths: &Paths) -> Result<Self, Error> {
        Self::from_path(kind.dump_path(paths))
    }

    /// Load the dump from `path`, gzip-compressed input is supported.
    #[tracing::instrument]
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        tracing::debug!("loading UTR sequences from {:?}...", path);
        let before_loading = Instant::now();
        let result = Self::from_reader(open_read_maybe_gz(path)?)?;
        tracing::debug!(
            "... done loading {} sequences in {:?}",
            result.len().separate_with_commas(),
            before_loading.elapsed()
        );
        Ok(result)
    }

    /// Parse the dump from `reader`.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut parser = DumpParser::default();
        for (lineno, line) in reader.lines().enumerate() {
            parser.push_line(lineno + 1, &line?)?;
        }
        Ok(parser.finish())
    }

    /// Sequence of the transcript with the given ID.
    pub fn get(&self, transcript_id: &str) -> Option<&str> {
        self.sequences.get(transcript_id).map(String::as_str)
    }

    pub fn contains(&self, transcript_id: &str) -> bool {
        self.sequences.contains_key(transcript_id)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Iterate `(transcript_id, sequence)` in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sequences
            .iter()
            .map(|(id, seq)| (id.as_str(), seq.as_str()))
    }
}

/// Sequence fragments collected for one transcript.
#[derive(Debug, Default)]
struct Buffer {
    /// First line after the header, decides availability.
    first_line: Option<String>,
    /// Concatenation of all fragments.
    sequence: String,
}

/// Parser state.
#[derive(Debug, Default)]
enum State {
    /// No header seen yet.
    #[default]
    AwaitingHeader,
    /// Collecting sequence lines for the transcript with the given ID.
    AccumulatingSequence(String),
}

/// Line-driven state machine turning dump lines into transcript buffers.
#[derive(Debug, Default)]
struct DumpParser {
    state: State,
    buffers: IndexMap<String, Buffer>,
}

impl DumpParser {
    fn push_line(&mut self, lineno: usize, line: &str) -> Result<(), Error> {
        let line = line.trim();
        if line.starts_with('>') {
            let transcript_id = line
                .split('|')
                .nth(HEADER_TRANSCRIPT_FIELD)
                .ok_or_else(|| {
                    Error::parse(
                        lineno,
                        format!("header needs at least 3 '|'-separated fields: {:?}", line),
                    )
                })?
                .to_string();
            self.state = State::AccumulatingSequence(transcript_id);
            return Ok(());
        }

        match &self.state {
            State::AwaitingHeader => {
                if !line.is_empty() {
                    tracing::debug!("ignoring line {} before first header", lineno);
                }
            }
            State::AccumulatingSequence(transcript_id) => {
                let buffer = self.buffers.entry(transcript_id.clone()).or_default();
                if buffer.first_line.is_none() {
                    buffer.first_line = Some(line.to_string());
                }
                buffer.sequence.push_str(line);
            }
        }
        Ok(())
    }

    fn finish(self) -> SequenceStore {
        let sequences = self
            .buffers
            .into_iter()
            .filter(|(_, buffer)| buffer.first_line.as_deref() != Some(SEQUENCE_UNAVAILABLE))
            .map(|(transcript_id, buffer)| (transcript_id, buffer.sequence))
            .collect();
        SequenceStore { sequences }
    }
}
