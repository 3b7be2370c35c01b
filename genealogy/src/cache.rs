//! Injected key-value cache for repository responses
//!
//! The builder never caches. Callers that want memoized fetches wrap their
//! repository in [`CachedRepository`] with any [`KeyValueCache`] (session
//! storage, disk, or the in-process [`MemoryCache`]).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;
use crate::person::ExternalPerson;
use crate::repository::PersonRepository;

pub trait KeyValueCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: String);
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }
}

/// Memoizes both repository operations as JSON under
/// `ancestors:<key>` and `relatives:<key,key,...>`.
pub struct CachedRepository<R, C> {
    inner: R,
    cache: C,
}

impl<R, C> CachedRepository<R, C>
where
    R: PersonRepository,
    C: KeyValueCache,
{
    pub fn new(inner: R, cache: C) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn cached(&self, key: &str) -> Option<Vec<ExternalPerson>> {
        let raw = self.cache.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(people) => {
                debug!(key, "Cache hit");
                Some(people)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable cache entry");
                None
            }
        }
    }

    fn store(&self, key: &str, people: &[ExternalPerson]) {
        match serde_json::to_string(people) {
            Ok(raw) => self.cache.put(key, raw),
            Err(e) => warn!(key, error = %e, "Could not serialize response for cache"),
        }
    }
}

#[async_trait]
impl<R, C> PersonRepository for CachedRepository<R, C>
where
    R: PersonRepository,
    C: KeyValueCache,
{
    async fn get_ancestors(&self, key: &str) -> Result<Vec<ExternalPerson>> {
        let cache_key = format!("ancestors:{key}");
        if let Some(people) = self.cached(&cache_key) {
            return Ok(people);
        }
        let people = self.inner.get_ancestors(key).await?;
        self.store(&cache_key, &people);
        Ok(people)
    }

    async fn get_relatives(&self, keys: &[String]) -> Result<Vec<ExternalPerson>> {
        let cache_key = format!("relatives:{}", keys.join(","));
        if let Some(people) = self.cached(&cache_key) {
            return Ok(people);
        }
        let people = self.inner.get_relatives(keys).await?;
        self.store(&cache_key, &people);
        Ok(people)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingRepository {
        calls: AtomicU32,
    }

    #[async_trait]
    impl PersonRepository for CountingRepository {
        async fn get_ancestors(&self, key: &str) -> Result<Vec<ExternalPerson>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(vec![ExternalPerson {
                id: 1,
                name: key.to_string(),
                ..Default::default()
            }])
        }

        async fn get_relatives(&self, keys: &[String]) -> Result<Vec<ExternalPerson>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(keys.iter().map(|_| ExternalPerson::default()).collect())
        }
    }

    #[tokio::test]
    async fn test_responses_are_memoized() {
        let repo = CachedRepository::new(
            CountingRepository {
                calls: AtomicU32::new(0),
            },
            MemoryCache::new(),
        );

        let first = repo.get_ancestors("A-1").await.unwrap();
        let second = repo.get_ancestors("A-1").await.unwrap();
        assert_eq!(first, second);
        repo.get_relatives(&["A-1".to_string()]).await.unwrap();
        repo.get_relatives(&["A-1".to_string()]).await.unwrap();

        assert_eq!(repo.inner.calls.load(Ordering::Relaxed), 2);
        assert_eq!(repo.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_refetched() {
        let cache = MemoryCache::new();
        cache.put("ancestors:A-1", "{broken".to_string());
        let repo = CachedRepository::new(
            CountingRepository {
                calls: AtomicU32::new(0),
            },
            cache,
        );
        let people = repo.get_ancestors("A-1").await.unwrap();
        assert_eq!(people[0].name, "A-1");
        assert_eq!(repo.inner.calls.load(Ordering::Relaxed), 1);
    }
}
