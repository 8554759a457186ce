//! UTR sequences of differentially expressed genes.

pub mod compare;
pub mod dump;
pub mod select;
pub mod summary;
pub mod transcripts;
