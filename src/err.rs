//! Error types shared by the loaders.

/// Errors raised while reading and interpreting input files.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An argument value outside of the supported set.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Malformed line in a text input.
    #[error("parse error in line {line}: {message}")]
    Parse { line: usize, message: String },
    /// The underlying file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed tabular input.
    #[error("problem reading table: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Shortcut for building a `Parse` error.
    pub fn parse<S: Into<String>>(line: usize, message: S) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
