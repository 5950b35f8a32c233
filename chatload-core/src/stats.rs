use crate::{P95, P99};
use std::fmt;

/// Summary of every latency recorded during a run, in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Outcome of report generation. An empty sample set is a valid outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Empty,
    Summary(SummaryStatistics),
}

impl Report {
    pub fn generate(samples: &[f64]) -> Self {
        SummaryStatistics::from_samples(samples).map_or(Report::Empty, Report::Summary)
    }

    pub fn summary(&self) -> Option<&SummaryStatistics> {
        match self {
            Report::Empty => None,
            Report::Summary(stats) => Some(stats),
        }
    }
}

impl SummaryStatistics {
    /// Returns `None` when there is nothing to summarize.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            count: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: statistical::mean(&sorted),
            p95: nearest_rank(&sorted, P95),
            p99: nearest_rank(&sorted, P99),
        })
    }
}

/// Nearest-rank percentile over ascending `sorted` samples.
///
/// The rank is `floor(quantile * len) - 1`, clamped into the slice. No
/// interpolation happens: the result is always one of the samples. For a
/// single sample the rank is -1, which clamps to that sample.
///
/// # Panics
/// If `sorted` is empty.
pub fn nearest_rank(sorted: &[f64], quantile: f64) -> f64 {
    let last = sorted.len() as i64 - 1;
    let rank = (quantile * sorted.len() as f64).floor() as i64 - 1;
    sorted[rank.clamp(0, last) as usize]
}

impl fmt::Display for SummaryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total requests: {}", self.count)?;
        writeln!(f, "Min: {:.2} ms", self.min)?;
        writeln!(f, "Max: {:.2} ms", self.max)?;
        writeln!(f, "Promedio: {:.2} ms", self.mean)?;
        writeln!(f, "P95: {:.2} ms", self.p95)?;
        write!(f, "P99: {:.2} ms", self.p99)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Empty => write!(f, "No latencies recorded."),
            Report::Summary(stats) => write!(f, "{stats}"),
        }
    }
}
