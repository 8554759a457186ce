//! Code for supporting the analysis configuration file.
//!
//! All input paths and cutoffs are collected in [`Config`] which is read from
//! a TOML file and then handed to the loaders and filters explicitly.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::degs::Direction;

/// Paths to the input files of an analysis.
#[derive(Deserialize, PartialEq, Debug, Clone)]
#[serde(default)]
pub struct Paths {
    /// BioMart 5' UTR sequence dump.
    pub utr5: PathBuf,
    /// BioMart 3' UTR sequence dump.
    pub utr3: PathBuf,
    /// Differential expression result table.
    pub diff: PathBuf,
    /// Transcript to gene mapping table.
    pub mapping: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            utr5: PathBuf::from("data/utr5.fasta"),
            utr3: PathBuf::from("data/utr3.fasta"),
            diff: PathBuf::from("data/example.csv"),
            mapping: PathBuf::from("data/trans_to_gene.csv"),
        }
    }
}

/// Cutoffs used for selecting differentially expressed genes.
#[derive(Deserialize, PartialEq, Debug, Clone)]
#[serde(default)]
pub struct Cutoffs {
    /// Maximal adjusted p-value (inclusive).
    pub padj_max: f64,
    /// Minimal absolute log2 fold change (inclusive).
    pub log2fc_min: f64,
    /// Direction of regulation to keep.
    pub direction: Direction,
    /// Closed log2 fold change interval `[lower, upper]`, replaces
    /// `log2fc_min` when set.
    pub log2fc_interval: Option<(f64, f64)>,
}

impl Default for Cutoffs {
    fn default() -> Self {
        Self {
            padj_max: 0.05,
            log2fc_min: 1.0,
            direction: Direction::Both,
            log2fc_interval: None,
        }
    }
}

/// Top-level configuration.
#[derive(Deserialize, PartialEq, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub cutoffs: Cutoffs,
}

impl Config {
    /// Load configuration from TOML file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let toml_str = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("could not read config file {:?}: {}", path.as_ref(), e)
        })?;
        toml::from_str(&toml_str)
            .map_err(|e| anyhow::anyhow!("could not parse config {:?}: {}", path.as_ref(), e))
    }

    /// Load from `path` if given, otherwise use the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        match path {
            Some(path) => {
                tracing::debug!("loading configuration from {:?}", path);
                Self::from_path(path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Command line arguments shared by all commands that read a configuration.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConfArgs {
    /// Path to TOML configuration file; built-in defaults are used if omitted.
    #[arg(long)]
    pub path_conf: Option<PathBuf>,
    /// Override path to the 5' UTR sequence dump.
    #[arg(long)]
    pub path_utr5: Option<PathBuf>,
    /// Override path to the 3' UTR sequence dump.
    #[arg(long)]
    pub path_utr3: Option<PathBuf>,
    /// Override path to the transcript to gene mapping table.
    #[arg(long)]
    pub path_mapping: Option<PathBuf>,
    /// Override maximal adjusted p-value.
    #[arg(long)]
    pub padj_max: Option<f64>,
    /// Override minimal absolute log2 fold change.
    #[arg(long)]
    pub log2fc_min: Option<f64>,
}

impl ConfArgs {
    /// Load the configuration and apply the overrides from the command line.
    pub fn resolve(&self) -> Result<Config, anyhow::Error> {
        let mut conf = Config::load(self.path_conf.as_deref())?;
        if let Some(path) = &self.path_utr5 {
            conf.paths.utr5 = path.clone();
        }
        if let Some(path) = &self.path_utr3 {
            conf.paths.utr3 = path.clone();
        }
        if let Some(path) = &self.path_mapping {
            conf.paths.mapping = path.clone();
        }
        if let Some(padj_max) = self.padj_max {
            conf.cutoffs.padj_max = padj_max;
        }
        if let Some(log2fc_min) = self.log2fc_min {
            conf.cutoffs.log2fc_min = log2fc_min;
        }
        Ok(conf)
    }
}
