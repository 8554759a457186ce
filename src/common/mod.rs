//! Common functionality.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

pub use io::{open_output, open_read_maybe_gz, open_table, open_write_maybe_gz};

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Mean and median of a list of lengths, `None` for empty input.
pub fn mean_and_median(values: &[usize]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<usize>() as f64 / values.len() as f64;

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    };

    Some((mean, median))
}

/// The version of `utr-worker` package.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod test {
    use float_cmp::approx_eq;

    #[test]
    fn mean_and_median_empty() {
        assert!(super::mean_and_median(&[]).is_none());
    }

    #[rstest::rstest]
    #[case(vec![4], 4.0, 4.0)]
    #[case(vec![1, 2, 3, 10], 4.0, 2.5)]
    #[case(vec![10, 1, 3], 14.0 / 3.0, 3.0)]
    fn mean_and_median(#[case] values: Vec<usize>, #[case] mean: f64, #[case] median: f64) {
        let (m, md) = super::mean_and_median(&values).expect("non-empty input");
        assert!(approx_eq!(f64, m, mean, ulps = 2), "mean {} != {}", m, mean);
        assert!(approx_eq!(f64, md, median, ulps = 2), "median {} != {}", md, median);
    }
}
