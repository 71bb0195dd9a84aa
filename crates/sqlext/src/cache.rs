//! Memoized metadata resolution.

use crate::meta::{Entity, TypeDescriptor, resolve};
use crate::schema::SchemaProvider;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Metadata cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

impl CacheStats {
    /// Cache hit ratio (0.0 - 1.0). Returns 0.0 if no lookups have occurred.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Get-or-compute cache of [`TypeDescriptor`]s keyed by entity type.
///
/// Entries are computed at most once per type in the common case. Two threads
/// racing on the first lookup of the same type may both resolve it; the first
/// insert wins and both get the same `Arc`.
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached descriptor for `T`, resolving it on first use.
    pub fn get_or_resolve<T: Entity>(
        &self,
        provider: Option<&dyn SchemaProvider>,
    ) -> Arc<TypeDescriptor> {
        let key = TypeId::of::<T>();

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = entries.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Arc::clone(found);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(target: "sqlext.meta", entity = T::TYPE_NAME, "metadata cache miss");

        // Resolve outside the lock; resolution is pure so a racing duplicate is harmless.
        let resolved = Arc::new(resolve::<T>(provider));

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key).or_insert(resolved))
    }

    /// Check whether `T` has been resolved already.
    pub fn contains<T: Entity>(&self) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.len(),
        }
    }
}

/// Metadata registry shared by statement builders.
///
/// Holds the optional [`SchemaProvider`] and the [`MetadataCache`] built on
/// top of it. Build one at startup and hand clones of the `Arc` to builders.
///
/// ```
/// use std::sync::Arc;
/// use sqlext::{ModelSchema, Registry, SchemaRegistry};
///
/// let mut schema = SchemaRegistry::new();
/// schema.register(ModelSchema::new("Person", "people"));
/// let registry = Arc::new(Registry::with_provider(schema));
/// assert!(registry.cache().is_empty());
/// ```
#[derive(Default)]
pub struct Registry {
    provider: Option<Arc<dyn SchemaProvider>>,
    cache: MetadataCache,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("has_provider", &self.provider.is_some())
            .field("cache", &self.cache)
            .finish()
    }
}

impl Registry {
    /// Registry without a schema provider; metadata comes from entity declarations only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry without a schema provider.
    ///
    /// Used by [`StatementBuilder::new`](crate::StatementBuilder::new) and
    /// [`EntityExt`](crate::EntityExt).
    pub fn shared() -> Arc<Registry> {
        static SHARED: OnceLock<Arc<Registry>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Registry::new())))
    }

    /// Registry backed by a schema provider.
    pub fn with_provider(provider: impl SchemaProvider + 'static) -> Self {
        Self {
            provider: Some(Arc::new(provider)),
            cache: MetadataCache::new(),
        }
    }

    pub fn provider(&self) -> Option<&dyn SchemaProvider> {
        self.provider.as_deref()
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Cached descriptor for `T`.
    pub fn describe<T: Entity>(&self) -> Arc<TypeDescriptor> {
        self.cache.get_or_resolve::<T>(self.provider())
    }
}
