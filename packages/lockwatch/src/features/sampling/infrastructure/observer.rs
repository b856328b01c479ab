//! SamplingOrderObserver - non-intrusive lock-order sampling
//!
//! A dedicated worker thread periodically asks the host which monitors every
//! live thread holds and folds the answers into a `SampleSet`. No call site
//! needs instrumenting; the price is precision (names at sample time only, no
//! witness stack, and orders held for less than a tick are easily missed).
//!
//! The worker owns its `SampleSet` exclusively and hands it back through
//! `JoinHandle::join`, so reading the results needs no synchronization.
//!
//! Any error or panic inside a tick stops the worker only; whatever it
//! gathered up to that point is kept.

use crate::config::SamplerConfig;
use crate::features::sampling::application::report::SamplingReport;
use crate::features::sampling::domain::{NamespaceFilter, SampleSet};
use crate::features::sampling::infrastructure::error::IntrospectionError;
use crate::features::sampling::ports::ThreadIntrospector;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

const WORKER_NAME: &str = "lockwatch-sampler";

/// Starts sampling workers
#[derive(Debug, Clone, Default)]
pub struct SamplingOrderObserver {
    config: SamplerConfig,
}

impl SamplingOrderObserver {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Spawn the worker
    ///
    /// # Errors
    /// `IntrospectionError::Spawn` if the OS refuses a new thread.
    pub fn start_collecting(
        &self,
        introspector: Arc<dyn ThreadIntrospector>,
    ) -> Result<SamplingHandle, IntrospectionError> {
        let running = Arc::new(AtomicBool::new(true));
        let filter = NamespaceFilter::from_option(self.config.namespace.as_deref());
        let interval = self.config.interval();

        let worker = {
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name(WORKER_NAME.to_string())
                .spawn(move || Self::run(introspector, filter, interval, running))?
        };

        debug!(
            "sampling worker started (interval {:?}, namespace {:?})",
            interval, self.config.namespace
        );

        Ok(SamplingHandle {
            running,
            worker: Some(worker),
            samples: SampleSet::default(),
        })
    }

    fn run(
        introspector: Arc<dyn ThreadIntrospector>,
        filter: NamespaceFilter,
        interval: Duration,
        running: Arc<AtomicBool>,
    ) -> SampleSet {
        let mut samples = SampleSet::default();

        while running.load(Ordering::Acquire) {
            match panic::catch_unwind(AssertUnwindSafe(|| introspector.snapshot())) {
                Ok(Ok(snapshots)) => samples.record_all(&snapshots, &filter),
                Ok(Err(e)) => {
                    debug!("sampling worker stopped: {}", e);
                    break;
                }
                Err(_) => {
                    debug!("sampling worker stopped: snapshot panicked");
                    break;
                }
            }
            // Woken early by `stop_collecting`
            thread::park_timeout(interval);
        }

        debug!("sampling worker exiting after {} ticks", samples.ticks());
        samples
    }
}

/// A running (or stopped) sampling session
pub struct SamplingHandle {
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<SampleSet>>,
    samples: SampleSet,
}

impl SamplingHandle {
    /// Whether the worker is still ticking
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|w| !w.is_finished())
            .unwrap_or(false)
    }

    /// Stop the worker and wait for it, without a timeout
    ///
    /// Idempotent: later calls return immediately.
    pub fn stop_collecting(&mut self) {
        self.running.store(false, Ordering::Release);
        let Some(worker) = self.worker.take() else {
            return;
        };
        worker.thread().unpark();
        match worker.join() {
            Ok(samples) => self.samples = samples,
            // The worker catches panics from the introspector; anything else
            // is lost along with the samples.
            Err(_) => debug!("sampling worker terminated abnormally"),
        }
    }

    /// Stop, then return what was collected
    pub fn samples(&mut self) -> &SampleSet {
        self.stop_collecting();
        &self.samples
    }

    /// Stop, then build the structured report
    pub fn report_data(&mut self) -> SamplingReport {
        SamplingReport::from_samples(self.samples())
    }

    /// Stop, then render the text report
    pub fn report(&mut self) -> String {
        self.report_data().render()
    }

    /// Stop and take ownership of the collected samples
    pub fn into_samples(mut self) -> SampleSet {
        self.stop_collecting();
        std::mem::take(&mut self.samples)
    }
}

impl Drop for SamplingHandle {
    fn drop(&mut self) {
        self.stop_collecting();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::ThreadSnapshot;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    fn wait_for_ticks(calls: &AtomicUsize, n: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while calls.load(Ordering::SeqCst) < n && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_worker_collects_until_stopped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let introspector = {
            let calls = Arc::clone(&calls);
            move || -> Result<Vec<ThreadSnapshot>, IntrospectionError> {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![ThreadSnapshot::new("t", ["inner", "outer"])])
            }
        };

        let observer = SamplingOrderObserver::new(SamplerConfig::default().interval_ms(1));
        let mut handle = observer.start_collecting(Arc::new(introspector)).unwrap();
        wait_for_ticks(&calls, 3);
        assert!(handle.is_running());

        handle.stop_collecting();
        handle.stop_collecting();
        assert!(!handle.is_running());
        assert!(handle.samples().ticks() >= 3);
        assert_eq!(handle.samples().orderings().len(), 1);
    }

    #[test]
    fn test_error_stops_only_the_worker() {
        let introspector = || -> Result<Vec<ThreadSnapshot>, IntrospectionError> {
            Err(IntrospectionError::Unavailable("no runtime".to_string()))
        };

        let observer = SamplingOrderObserver::default();
        let mut handle = observer.start_collecting(Arc::new(introspector)).unwrap();
        let samples = handle.samples();
        assert_eq!(samples.ticks(), 0);
        assert!(samples.is_empty());
    }

    #[test]
    fn test_panic_keeps_gathered_samples() {
        let calls = Arc::new(AtomicUsize::new(0));
        let introspector = {
            let calls = Arc::clone(&calls);
            move || -> Result<Vec<ThreadSnapshot>, IntrospectionError> {
                if calls.fetch_add(1, Ordering::SeqCst) >= 2 {
                    panic!("introspection broke");
                }
                Ok(vec![ThreadSnapshot::new("t", ["x", "y"])])
            }
        };

        let observer = SamplingOrderObserver::new(SamplerConfig::default().interval_ms(1));
        let handle = observer.start_collecting(Arc::new(introspector)).unwrap();
        wait_for_ticks(&calls, 3);
        let samples = handle.into_samples();
        assert_eq!(samples.ticks(), 2);
        assert_eq!(samples.orderings().len(), 1);
    }

    #[test]
    fn test_long_interval_stops_promptly() {
        let introspector = || -> Result<Vec<ThreadSnapshot>, IntrospectionError> { Ok(Vec::new()) };
        let observer = SamplingOrderObserver::new(SamplerConfig::default().interval_ms(60_000));
        let mut handle = observer.start_collecting(Arc::new(introspector)).unwrap();

        let started = Instant::now();
        handle.stop_collecting();
        assert!(started.elapsed() < Duration::from_secs(30));
    }
}
