use crate::error::Result;
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

pub trait ModelOptions {
    fn cache_key(&self) -> String;
}

// Cache stores WEAK references - weights are freed when all pipelines using them drop.
type CacheStorage = HashMap<(TypeId, String), Box<dyn Any + Send + Sync>>;

pub struct ModelCache {
    entries: Mutex<CacheStorage>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, CacheStorage> {
        // Entries are only inserted or removed whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup<M: Send + Sync + 'static>(&self, cache_key: &(TypeId, String)) -> Option<Arc<M>> {
        let mut entries = self.entries();
        let live = entries
            .get(cache_key)
            .and_then(|boxed| boxed.downcast_ref::<Weak<M>>())
            .and_then(Weak::upgrade);

        if live.is_none() {
            entries.remove(cache_key);
        }
        live
    }

    /// Returns the live model stored under `key`, or runs `loader` and remembers the result.
    pub fn get_or_create<M, F>(&self, key: &str, loader: F) -> Result<Arc<M>>
    where
        M: Send + Sync + 'static,
        F: FnOnce() -> Result<M>,
    {
        let cache_key = (TypeId::of::<M>(), key.to_string());

        if let Some(model) = self.lookup::<M>(&cache_key) {
            tracing::debug!(key, "model cache hit");
            return Ok(model);
        }

        tracing::debug!(key, "model cache miss, loading");
        let model = Arc::new(loader()?);

        self.entries()
            .insert(cache_key, Box::new(Arc::downgrade(&model)));

        Ok(model)
    }

    #[cfg(test)]
    pub fn clear(&self) {
        self.entries().clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_MODEL_CACHE: Lazy<ModelCache> = Lazy::new(ModelCache::new);

pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    struct TestModel {
        id: String,
    }

    #[test]
    fn test_cache_returns_same_instance() {
        let cache = ModelCache::new();
        let model1 = cache
            .get_or_create::<TestModel, _>("sst2", || {
                Ok(TestModel {
                    id: "original".into(),
                })
            })
            .unwrap();
        let model2 = cache
            .get_or_create::<TestModel, _>("sst2", || Ok(TestModel { id: "new".into() }))
            .unwrap();
        assert_eq!(model2.id, "original");
        assert!(Arc::ptr_eq(&model1, &model2));
    }

    #[test]
    fn test_reloads_after_last_handle_drops() {
        let cache = ModelCache::new();
        let first = cache
            .get_or_create::<TestModel, _>("emotion", || Ok(TestModel { id: "a".into() }))
            .unwrap();
        drop(first);

        let second = cache
            .get_or_create::<TestModel, _>("emotion", || Ok(TestModel { id: "b".into() }))
            .unwrap();
        assert_eq!(second.id, "b");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache = ModelCache::new();
        let err = cache
            .get_or_create::<TestModel, _>("broken", || {
                Err(PipelineError::Download("offline".into()))
            })
            .err();
        assert!(matches!(err, Some(PipelineError::Download(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_same_key_different_types_independent() {
        struct Other;
        let cache = ModelCache::new();
        let _a = cache
            .get_or_create::<TestModel, _>("k", || Ok(TestModel { id: "x".into() }))
            .unwrap();
        let _b = cache.get_or_create::<Other, _>("k", || Ok(Other)).unwrap();
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
