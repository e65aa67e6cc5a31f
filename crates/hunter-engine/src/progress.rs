//! Progress reporting for long-running design jobs.

use async_trait::async_trait;

/// Fire-and-forget sink for `(current, total)` progress pairs.
///
/// Implementations must not stall the pipeline: a slow consumer should
/// drop reports rather than block stdout draining.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, current: u64, total: u64);
}

/// Sink that discards every report. The engine still drains stdout.
pub struct NullSink;

#[async_trait]
impl ProgressSink for NullSink {
    async fn report(&self, _current: u64, _total: u64) {}
}

/// Wraps an optional sink and enforces the reporting invariant for one
/// job: values are clamped to `total` and never decrease.
pub(crate) struct ProgressMeter<'a> {
    sink: Option<&'a dyn ProgressSink>,
    total: u64,
    last: u64,
}

impl<'a> ProgressMeter<'a> {
    pub(crate) fn new(sink: Option<&'a dyn ProgressSink>, total: u64) -> Self {
        Self {
            sink,
            total,
            last: 0,
        }
    }

    pub(crate) async fn report(&mut self, current: u64) {
        let clamped = current.min(self.total);
        if clamped < self.last {
            return;
        }
        self.last = clamped;
        if let Some(sink) = self.sink {
            sink.report(clamped, self.total).await;
        }
    }

    /// Definitive completion report, sent after process exit no matter
    /// how many markers were observed.
    pub(crate) async fn finish(&mut self) {
        self.last = self.total;
        if let Some(sink) = self.sink {
            sink.report(self.total, self.total).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    struct Recorder {
        reports: Mutex<Vec<(u64, u64)>>,
    }

    #[async_trait]
    impl ProgressSink for Recorder {
        async fn report(&self, current: u64, total: u64) {
            self.reports.lock().await.push((current, total));
        }
    }

    #[tokio::test]
    async fn test_meter_clamps_and_never_decreases() {
        let recorder = Recorder {
            reports: Mutex::new(Vec::new()),
        };
        let mut meter = ProgressMeter::new(Some(&recorder), 10);
        meter.report(0).await;
        meter.report(4).await;
        meter.report(2).await; // stale marker, dropped
        meter.report(25).await; // beyond total, clamped
        meter.finish().await;

        let reports = recorder.reports.lock().await;
        assert_eq!(*reports, vec![(0, 10), (4, 10), (10, 10), (10, 10)]);
    }

    #[tokio::test]
    async fn test_finish_reports_total_even_without_markers() {
        let recorder = Recorder {
            reports: Mutex::new(Vec::new()),
        };
        let mut meter = ProgressMeter::new(Some(&recorder), 6);
        meter.finish().await;
        assert_eq!(*recorder.reports.lock().await, vec![(6, 6)]);
    }

    #[tokio::test]
    async fn test_meter_without_sink_is_inert() {
        let mut meter = ProgressMeter::new(None, 3);
        meter.report(1).await;
        meter.finish().await;
    }
}
