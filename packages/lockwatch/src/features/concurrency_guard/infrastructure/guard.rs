//! ConcurrencyGuard - detect overlapping access to externally serialized values
//!
//! For a type with detection enabled, every `check(&value)` marks the value's
//! address in flight, holds the mark for a short widening window, then clears
//! it. A second `check` on the same value inside that window finds the mark and
//! fails; the first then finds its mark already gone and fails too.
//!
//! Per value: `absent -> in-flight -> absent`. Any `in-flight -> in-flight`
//! transition is the violation.

use crate::config::GuardConfig;
use crate::features::concurrency_guard::infrastructure::error::GuardError;
use dashmap::DashMap;
use std::any::{type_name, TypeId};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

struct DetectState {
    enabled: AtomicBool,
    /// Set by the first `check` after detection was (re-)enabled
    exercised: AtomicBool,
}

/// Per-type opt-in concurrent access verifier
pub struct ConcurrencyGuard {
    types: DashMap<TypeId, Arc<DetectState>>,
    in_flight: DashMap<(TypeId, usize), ()>,
    /// Types with detection on; `check` is one atomic load while zero
    enabled_types: AtomicUsize,
    config: GuardConfig,
}

impl ConcurrencyGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            types: DashMap::new(),
            in_flight: DashMap::new(),
            enabled_types: AtomicUsize::new(0),
            config,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Enable or disable detection for `T`
    ///
    /// # Panics
    /// On the errors `try_set_detect` returns.
    #[track_caller]
    pub fn set_detect<T: ?Sized + 'static>(&self, enabled: bool) {
        if let Err(e) = self.try_set_detect::<T>(enabled) {
            panic!("{}", e);
        }
    }

    /// Enable or disable detection for `T`
    ///
    /// Enabling resets the exercised flag. Disabling always takes effect, but
    /// fails with `DetectionNotExercised` unless a `T` was checked while
    /// detection was on. A type that was never enabled was never exercised.
    pub fn try_set_detect<T: ?Sized + 'static>(&self, enabled: bool) -> Result<(), GuardError> {
        let key = TypeId::of::<T>();

        if enabled {
            let state = Arc::clone(
                self.types
                    .entry(key)
                    .or_insert_with(|| {
                        Arc::new(DetectState {
                            enabled: AtomicBool::new(false),
                            exercised: AtomicBool::new(false),
                        })
                    })
                    .value(),
            );
            state.exercised.store(false, Ordering::Release);
            if !state.enabled.swap(true, Ordering::AcqRel) {
                self.enabled_types.fetch_add(1, Ordering::AcqRel);
            }
            return Ok(());
        }

        let state = self.types.get(&key).map(|e| Arc::clone(e.value()));
        let was_enabled = state
            .as_ref()
            .map(|s| s.enabled.swap(false, Ordering::AcqRel))
            .unwrap_or(false);
        if was_enabled {
            self.enabled_types.fetch_sub(1, Ordering::AcqRel);
        }

        let exercised = was_enabled
            && state.map_or(false, |s| s.exercised.load(Ordering::Acquire));
        if exercised {
            Ok(())
        } else {
            Err(GuardError::DetectionNotExercised {
                type_name: type_name::<T>(),
            })
        }
    }

    /// Checkpoint where access to `value` is believed to be exclusive
    ///
    /// # Panics
    /// On detected concurrent access.
    #[track_caller]
    pub fn check<T: ?Sized + 'static>(&self, value: &T) {
        if let Err(e) = self.try_check(value) {
            panic!("{}", e);
        }
    }

    /// Non-panicking `check`
    pub fn try_check<T: ?Sized + 'static>(&self, value: &T) -> Result<(), GuardError> {
        if self.enabled_types.load(Ordering::Acquire) == 0 {
            return Ok(());
        }

        let type_id = TypeId::of::<T>();
        let Some(state) = self.types.get(&type_id).map(|e| Arc::clone(e.value())) else {
            return Ok(());
        };
        if !state.enabled.load(Ordering::Acquire) {
            return Ok(());
        }
        state.exercised.store(true, Ordering::Release);

        let address = (value as *const T).cast::<()>() as usize;
        let key = (type_id, address);
        let conflict = || GuardError::ConcurrentAccess {
            type_name: type_name::<T>(),
            address,
        };

        if self.in_flight.insert(key, ()).is_some() {
            // Clear the other caller's mark so it fails as well
            self.in_flight.remove(&key);
            return Err(conflict());
        }

        thread::sleep(self.config.widen_window());

        if self.in_flight.remove(&key).is_none() {
            return Err(conflict());
        }
        Ok(())
    }

    pub fn is_enabled<T: ?Sized + 'static>(&self) -> bool {
        self.types
            .get(&TypeId::of::<T>())
            .map(|s| s.enabled.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Whether a `T` was checked since detection was last enabled
    pub fn was_exercised<T: ?Sized + 'static>(&self) -> bool {
        self.types
            .get(&TypeId::of::<T>())
            .map(|s| s.exercised.load(Ordering::Acquire))
            .unwrap_or(false)
    }
}

impl Default for ConcurrencyGuard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}
