use chatload_core::{LatencyRecorder, TransactionLabels};
use std::future::Future;
use std::time::Instant;

/// Times `func` and records its latency, whatever its outcome.
///
/// The result is handed back untouched. The sample is taken by a drop guard,
/// so a future that panics or is dropped part-way still leaves a sample
/// (counted as an error). A future that never completes never records.
pub async fn measure<F, R, E>(
    recorder: &LatencyRecorder,
    labels: TransactionLabels,
    func: F,
) -> Result<R, E>
where
    F: Future<Output = Result<R, E>>,
{
    let mut timing = Timing::start(recorder, labels);
    let res = func.await;
    timing.success = res.is_ok();
    res
}

struct Timing<'a> {
    recorder: &'a LatencyRecorder,
    #[cfg_attr(not(feature = "metrics"), allow(unused))]
    labels: TransactionLabels,
    start: Instant,
    #[cfg_attr(not(feature = "metrics"), allow(unused))]
    success: bool,
}

impl<'a> Timing<'a> {
    fn start(recorder: &'a LatencyRecorder, labels: TransactionLabels) -> Self {
        Self {
            recorder,
            labels,
            start: Instant::now(),
            success: false,
        }
    }
}

impl Drop for Timing<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        self.recorder.record_duration(elapsed);

        #[cfg(feature = "metrics")]
        {
            metrics::histogram!(self.labels.latency).record(elapsed.as_secs_f64() * 1000.);
            if self.success {
                metrics::counter!(self.labels.success).increment(1);
            } else {
                metrics::counter!(self.labels.error).increment(1);
            }
        }
    }
}
