//! 有界 LRU 缓存：按 key 持有构造出的值，淘汰时调用 disposer

use indexmap::IndexMap;

type Disposer<T> = Box<dyn FnMut(String, T) + Send>;

/// Bounded map with insertion-order eviction.
///
/// Entries are ordered from least to most recently used. A hit through [`get`]
/// or [`touch`] moves the entry to the MRU end; [`peek`] does not. Every value
/// that leaves the cache other than through [`take`] is handed to the disposer
/// exactly once.
///
/// [`get`]: ScopedCache::get
/// [`touch`]: ScopedCache::touch
/// [`peek`]: ScopedCache::peek
/// [`take`]: ScopedCache::take
pub struct ScopedCache<T> {
    entries: IndexMap<String, T>,
    max_entries: usize,
    dispose: Option<Disposer<T>>,
}

impl<T> ScopedCache<T> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            max_entries: max_entries.max(1),
            dispose: None,
        }
    }

    pub fn with_disposer<F>(max_entries: usize, dispose: F) -> Self
    where
        F: FnMut(String, T) + Send + 'static,
    {
        Self {
            entries: IndexMap::new(),
            max_entries: max_entries.max(1),
            dispose: Some(Box::new(dispose)),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn peek(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn peek_mut(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)
    }

    pub fn touch(&mut self, key: &str) -> bool {
        self.promote(key).is_some()
    }

    fn promote(&mut self, key: &str) -> Option<usize> {
        let index = self.entries.get_index_of(key)?;
        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        Some(last)
    }

    pub fn get(&mut self, key: &str) -> Option<&mut T> {
        let index = self.promote(key)?;
        Some(&mut self.entries[index])
    }

    pub fn get_or_insert_with<F>(&mut self, key: &str, factory: F) -> &mut T
    where
        F: FnOnce(&str) -> T,
    {
        match self.try_get_or_insert_with(key, |key| {
            Ok::<T, std::convert::Infallible>(factory(key))
        }) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Returns the cached value for `key`, constructing it on a miss.
    ///
    /// A factory error is returned before anything is inserted or evicted.
    pub fn try_get_or_insert_with<F, E>(&mut self, key: &str, factory: F) -> Result<&mut T, E>
    where
        F: FnOnce(&str) -> Result<T, E>,
    {
        if let Some(index) = self.promote(key) {
            return Ok(&mut self.entries[index]);
        }

        let value = factory(key)?;
        self.entries.insert(key.to_string(), value);
        tracing::trace!(key, size = self.entries.len(), "scoped cache insert");
        // 新条目在 MRU 端，淘汰从最旧的开始
        while self.entries.len() > self.max_entries {
            if !self.evict_oldest() {
                break;
            }
        }
        let last = self.entries.len() - 1;
        Ok(&mut self.entries[last])
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let Some(value) = self.entries.shift_remove(key) else {
            return false;
        };
        self.run_dispose(key.to_string(), value);
        true
    }

    /// Removes an entry without disposing it.
    pub fn take(&mut self, key: &str) -> Option<T> {
        self.entries.shift_remove(key)
    }

    pub fn clear(&mut self) {
        while self.evict_oldest() {}
    }

    fn evict_oldest(&mut self) -> bool {
        let Some((key, value)) = self.entries.shift_remove_index(0) else {
            return false;
        };
        tracing::debug!(key = %key, "scoped cache evict");
        self.run_dispose(key, value);
        true
    }

    fn run_dispose(&mut self, key: String, value: T) {
        if let Some(dispose) = self.dispose.as_mut() {
            dispose(key, value);
        }
    }
}

impl<T> Drop for ScopedCache<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> std::fmt::Debug for ScopedCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedCache")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/scoped_cache.rs"]
mod tests;
