//! Lockwatch - one entry point for all three detectors
//!
//! Wires a validated configuration, a shared `MonitorRuntime`, the lock-order
//! recorder, the concurrency guard and the sampling observer. The recorder
//! probes the runtime and the sampler snapshots it, so monitors entered
//! through `Lockwatch::enter` are seen by both.

use crate::config::{LockwatchConfig, Preset, ValidatedConfig};
use crate::errors::Result;
use crate::features::concurrency_guard::ConcurrencyGuard;
use crate::features::lock_order::LockOrderRecorder;
use crate::features::sampling::{SamplingHandle, SamplingOrderObserver};
use crate::shared::models::LockClassifier;
use crate::shared::monitor::{MonitorGuard, MonitorRuntime};
use std::sync::Arc;

pub struct Lockwatch {
    config: ValidatedConfig,
    runtime: Arc<MonitorRuntime>,
    recorder: LockOrderRecorder,
    guard: ConcurrencyGuard,
    observer: SamplingOrderObserver,
}

impl Lockwatch {
    pub fn new(config: ValidatedConfig) -> Self {
        let runtime = Arc::new(MonitorRuntime::new());
        let recorder =
            LockOrderRecorder::new(config.recorder()).with_probe(Arc::clone(&runtime) as _);
        Self {
            recorder,
            guard: ConcurrencyGuard::new(config.guard()),
            observer: SamplingOrderObserver::new(config.sampler()),
            runtime,
            config,
        }
    }

    pub fn from_preset(preset: Preset) -> Result<Self> {
        Ok(Self::new(LockwatchConfig::preset(preset).build()?))
    }

    /// Default configuration plus `LOCKWATCH_*` environment overrides
    pub fn from_env() -> Result<Self> {
        let config = LockwatchConfig::default().with_env_overrides()?.build()?;
        Ok(Self::new(config))
    }

    /// Record the acquisition, then enter the classifier's monitor
    #[track_caller]
    pub fn enter<'a>(&'a self, classifier: &'a LockClassifier) -> MonitorGuard<'a> {
        self.recorder.begin(classifier);
        self.runtime.enter(classifier)
    }

    /// Start sampling this instance's runtime
    pub fn start_collecting(&self) -> Result<SamplingHandle> {
        let handle = self
            .observer
            .start_collecting(Arc::clone(&self.runtime) as _)?;
        Ok(handle)
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn runtime(&self) -> &Arc<MonitorRuntime> {
        &self.runtime
    }

    pub fn recorder(&self) -> &LockOrderRecorder {
        &self.recorder
    }

    pub fn guard(&self) -> &ConcurrencyGuard {
        &self.guard
    }

    pub fn observer(&self) -> &SamplingOrderObserver {
        &self.observer
    }
}

impl Default for Lockwatch {
    fn default() -> Self {
        Self::new(ValidatedConfig::default())
    }
}
