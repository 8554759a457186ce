//! UTR worker main executable

pub mod common;
pub mod conf;
pub mod degs;
pub mod err;
pub mod fasta;
pub mod motifs;
pub mod utr;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "UTR analysis of differentially expressed genes",
    long_about = "This tool selects UTR sequences of differentially expressed genes and \
                  prepares them for downstream analysis"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Differential expression related commands.
    Degs(Degs),
    /// UTR related commands.
    Utr(Utr),
    /// FASTA related commands.
    Fasta(Fasta),
    /// Motif related commands.
    Motifs(Motifs),
}

/// Parsing of "degs *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Degs {
    /// The sub command to run
    #[command(subcommand)]
    command: DegsCommands,
}

/// Enum supporting the parsing of "degs *" sub commands.
#[derive(Debug, Subcommand)]
enum DegsCommands {
    Genes(degs::cli::Args),
}

/// Parsing of "utr *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Utr {
    /// The sub command to run
    #[command(subcommand)]
    command: UtrCommands,
}

/// Enum supporting the parsing of "utr *" sub commands.
#[derive(Debug, Subcommand)]
enum UtrCommands {
    Select(utr::select::Args),
    Compare(utr::compare::Args),
    Summary(utr::summary::Args),
}

/// Parsing of "fasta *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Fasta {
    /// The sub command to run
    #[command(subcommand)]
    command: FastaCommands,
}

/// Enum supporting the parsing of "fasta *" sub commands.
#[derive(Debug, Subcommand)]
enum FastaCommands {
    Prepare(fasta::cli::Args),
}

/// Parsing of "motifs *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Motifs {
    /// The sub command to run
    #[command(subcommand)]
    command: MotifsCommands,
}

/// Enum supporting the parsing of "motifs *" sub commands.
#[derive(Debug, Subcommand)]
enum MotifsCommands {
    Streme(motifs::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        tracing::debug!("utr-worker v{}", common::VERSION);
        match &cli.command {
            Commands::Degs(degs) => match &degs.command {
                DegsCommands::Genes(args) => {
                    degs::cli::run(&cli.common, args)?;
                }
            },
            Commands::Utr(utr) => match &utr.command {
                UtrCommands::Select(args) => {
                    utr::select::run(&cli.common, args)?;
                }
                UtrCommands::Compare(args) => {
                    utr::compare::run(&cli.common, args)?;
                }
                UtrCommands::Summary(args) => {
                    utr::summary::run(&cli.common, args)?;
                }
            },
            Commands::Fasta(fasta) => match &fasta.command {
                FastaCommands::Prepare(args) => {
                    fasta::cli::run(&cli.common, args)?;
                }
            },
            Commands::Motifs(motifs) => match &motifs.command {
                MotifsCommands::Streme(args) => {
                    motifs::run(&cli.common, args)?;
                }
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}

#[cfg(test)]
mod test {
    use clap::Parser;

    use super::{Cli, Commands, UtrCommands};
    use crate::{degs::Direction, utr::dump::UtrKind};

    #[test]
    fn parse_utr_select() -> Result<(), anyhow::Error> {
        let cli = Cli::try_parse_from([
            "utr-worker",
            "-v",
            "utr",
            "select",
            "--utr",
            "5",
            "--direction",
            "down",
            "--log2fc-interval=-2,-0.5",
            "--path-de",
            "de.csv",
        ])?;

        let Commands::Utr(utr) = cli.command else {
            panic!("expected utr command");
        };
        let UtrCommands::Select(args) = utr.command else {
            panic!("expected utr select command");
        };
        assert_eq!(args.utr, UtrKind::Five);
        assert_eq!(args.filter.direction, Some(Direction::Down));
        assert_eq!(args.filter.log2fc_interval, Some(vec![-2.0, -0.5]));

        Ok(())
    }

    #[test]
    fn parse_invalid_utr() {
        let result = Cli::try_parse_from(["utr-worker", "utr", "select", "--utr", "4"]);

        assert!(result.is_err());
    }
}
