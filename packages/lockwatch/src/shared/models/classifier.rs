//! Lock classifiers
//!
//! A classifier is the identity a lock is grouped under for ordering purposes.
//! The default classifier of a value is its runtime type (`LockClassifier::of::<T>()`),
//! which is coarser than per-instance identity but keeps the order graph bounded.
//!
//! Every classifier is a generation-tagged handle: it carries a process-unique id
//! that is never reused, so a stale id left in a registry can never alias a newer
//! classifier. Each classifier also owns a reentrant monitor, which is the lock
//! callers actually synchronize on after `LockOrderRecorder::begin`.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use serde::{Deserialize, Serialize};
use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_CLASSIFIER_ID: AtomicU64 = AtomicU64::new(1);

/// Type classifiers are interned: Rust types are never unloaded, so these
/// entries live for the whole process.
static TYPE_CLASSIFIERS: Lazy<DashMap<TypeId, LockClassifier>> = Lazy::new(DashMap::new);

pub(crate) struct ClassifierKey {
    id: u64,
    name: Arc<str>,
    type_id: Option<TypeId>,
    monitor: ReentrantMutex<()>,
}

/// Canonical lock identity (cheap to clone, compared by id)
#[derive(Clone)]
pub struct LockClassifier(Arc<ClassifierKey>);

impl LockClassifier {
    /// Classifier for the runtime type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        let type_id = TypeId::of::<T>();
        if let Some(existing) = TYPE_CLASSIFIERS.get(&type_id) {
            return existing.value().clone();
        }
        TYPE_CLASSIFIERS
            .entry(type_id)
            .or_insert_with(|| Self::build(Arc::from(type_name::<T>()), Some(type_id)))
            .value()
            .clone()
    }

    /// Classifier for the runtime type of `value`
    pub fn of_val<T: ?Sized + 'static>(_value: &T) -> Self {
        Self::of::<T>()
    }

    /// A fresh classifier that is not tied to a type.
    ///
    /// Two calls with the same name produce two distinct classifiers. Once every
    /// clone is dropped, registries holding it only weakly forget it.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self::build(name.into(), None)
    }

    fn build(name: Arc<str>, type_id: Option<TypeId>) -> Self {
        Self(Arc::new(ClassifierKey {
            id: NEXT_CLASSIFIER_ID.fetch_add(1, Ordering::Relaxed),
            name,
            type_id,
            monitor: ReentrantMutex::new(()),
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The classified type, if this is a type classifier
    pub fn type_id(&self) -> Option<TypeId> {
        self.0.type_id
    }

    /// Lock the classifier's monitor without any bookkeeping
    pub fn lock(&self) -> ReentrantMutexGuard<'_, ()> {
        self.0.monitor.lock()
    }

    /// Whether the calling thread currently owns this classifier's monitor
    pub fn is_held_by_current_thread(&self) -> bool {
        self.0.monitor.is_owned_by_current_thread()
    }

    pub fn downgrade(&self) -> WeakClassifier {
        WeakClassifier {
            id: self.0.id,
            inner: Arc::downgrade(&self.0),
        }
    }

    /// Serializable id + name pair, holding no reference to the classifier
    pub fn to_ref(&self) -> ClassifierRef {
        ClassifierRef {
            id: self.0.id,
            name: self.0.name.to_string(),
        }
    }
}

impl PartialEq for LockClassifier {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for LockClassifier {}

impl Hash for LockClassifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for LockClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LockClassifier({}#{})", self.0.name, self.0.id)
    }
}

impl fmt::Display for LockClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// Weak handle to a classifier; does not keep it alive
#[derive(Clone)]
pub struct WeakClassifier {
    id: u64,
    inner: Weak<ClassifierKey>,
}

impl WeakClassifier {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn upgrade(&self) -> Option<LockClassifier> {
        self.inner.upgrade().map(LockClassifier)
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for WeakClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakClassifier(#{}, alive={})", self.id, self.is_alive())
    }
}

/// Plain-data reference to a classifier, used in witnesses and reports
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassifierRef {
    pub id: u64,
    pub name: String,
}

impl fmt::Display for ClassifierRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
