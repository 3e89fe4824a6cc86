//! 文件内容的字节预算 LRU
//!
//! 只记录路径和估算大小，内容本身由调用方持有；淘汰时通过回调通知调用方清空内容。

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

pub const DEFAULT_MAX_CONTENT_ENTRIES: usize = 40;
pub const DEFAULT_MAX_CONTENT_BYTES: usize = 20 * 1024 * 1024;

/// Size estimate for a cached payload.
pub fn approx_bytes(content: &str) -> usize {
    content.len()
}

#[derive(Debug, Clone)]
pub struct ContentLru {
    sizes: IndexMap<String, usize>,
    total_bytes: usize,
    max_entries: usize,
    max_bytes: usize,
}

impl Default for ContentLru {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTENT_ENTRIES, DEFAULT_MAX_CONTENT_BYTES)
    }
}

impl ContentLru {
    pub fn new(max_entries: usize, max_bytes: usize) -> Self {
        Self {
            sizes: IndexMap::new(),
            total_bytes: 0,
            max_entries: max_entries.max(1),
            max_bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    pub fn contains(&self, path: &str) -> bool {
        self.sizes.contains_key(path)
    }

    pub fn size_of(&self, path: &str) -> Option<usize> {
        self.sizes.get(path).copied()
    }

    /// Paths from least to most recently touched.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.sizes.keys().map(String::as_str)
    }

    /// Marks `path` most recently used, recording `bytes` when given.
    ///
    /// Without a size an untracked path stays untracked.
    pub fn touch(&mut self, path: &str, bytes: Option<usize>) {
        let bytes = match (bytes, self.sizes.shift_remove(path)) {
            (Some(bytes), Some(prev)) => {
                self.total_bytes = self.total_bytes.saturating_sub(prev);
                self.total_bytes += bytes;
                bytes
            }
            (Some(bytes), None) => {
                self.total_bytes += bytes;
                bytes
            }
            (None, Some(prev)) => prev,
            (None, None) => return,
        };
        self.sizes.insert(path.to_string(), bytes);
    }

    pub fn remove(&mut self, path: &str) -> bool {
        let Some(prev) = self.sizes.shift_remove(path) else {
            return false;
        };
        self.total_bytes = self.total_bytes.saturating_sub(prev);
        true
    }

    pub fn reset(&mut self) {
        self.sizes.clear();
        self.total_bytes = 0;
    }

    fn over_budget(&self) -> bool {
        self.sizes.len() > self.max_entries || self.total_bytes > self.max_bytes
    }

    /// Evicts least recently touched paths until both budgets hold.
    ///
    /// Paths in `keep` are rotated to the MRU end instead of being evicted; once
    /// only protected paths remain the pass stops, even over budget.
    pub fn evict<F>(&mut self, keep: &FxHashSet<String>, mut on_evict: F) -> Vec<String>
    where
        F: FnMut(&str),
    {
        let mut evicted = Vec::new();
        while self.over_budget() {
            let protected = self
                .sizes
                .keys()
                .filter(|path| keep.contains(path.as_str()))
                .count();
            if self.sizes.len() <= protected {
                break;
            }

            let Some((path, bytes)) = self.sizes.shift_remove_index(0) else {
                break;
            };
            if keep.contains(&path) {
                self.sizes.insert(path, bytes);
                continue;
            }

            self.total_bytes = self.total_bytes.saturating_sub(bytes);
            tracing::debug!(path = %path, bytes, total = self.total_bytes, "content evicted");
            on_evict(&path);
            evicted.push(path);
        }
        evicted
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/content_lru.rs"]
mod tests;
