//! Compiled-query cache.
//!
//! Thread-safe via `parking_lot::RwLock`. Lookups take the read lock only;
//! compilation runs outside any lock, so two threads missing on the same
//! expression may both compile it and the later insert wins. When the cache
//! is full the least recently used entry is evicted.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::Query;
use crate::node::NodeRef;
use crate::{CacheOptions, Result};

struct CacheEntry {
    query: Arc<Query>,
    last_used: AtomicU64,
}

pub struct QueryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    max_entries: usize,
    disabled: AtomicBool,
    /// Logical clock for recency.
    tick: AtomicU64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_options(&CacheOptions::default())
    }

    pub fn with_options(options: &CacheOptions) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: options.max_entries,
            disabled: AtomicBool::new(options.disabled),
            tick: AtomicU64::new(0),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Turns the bypass on or off. Entries already cached are kept and used
    /// again once the cache is re-enabled.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Returns the compiled query for `expr`, compiling it on a miss.
    ///
    /// While the cache is disabled every call compiles afresh and nothing is
    /// stored. Compilation errors are never cached.
    pub fn compile(&self, expr: &str) -> Result<Arc<Query>> {
        if self.is_disabled() {
            return Query::compile(expr).map(Arc::new);
        }

        {
            let entries = self.entries.read();
            if let Some(entry) = entries.get(expr) {
                entry.last_used.store(self.next_tick(), Ordering::Relaxed);
                tracing::trace!(query = expr, "query cache hit");
                return Ok(Arc::clone(&entry.query));
            }
        }

        tracing::trace!(query = expr, "query cache miss");
        let query = Arc::new(Query::compile(expr)?);

        let mut entries = self.entries.write();
        if self.max_entries > 0 && entries.len() >= self.max_entries && !entries.contains_key(expr) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                tracing::debug!(query = %oldest, "evicted cached query");
            }
        }
        entries.insert(
            expr.to_string(),
            CacheEntry {
                query: Arc::clone(&query),
                last_used: AtomicU64::new(self.next_tick()),
            },
        );
        Ok(query)
    }

    /// All matches of `expr` below `root` in document order.
    pub fn find<'a>(&self, root: NodeRef<'a>, expr: &str) -> Result<Vec<NodeRef<'a>>> {
        Ok(self.compile(expr)?.find(root))
    }

    /// The first match of `expr` below `root` in document order.
    pub fn find_one<'a>(&self, root: NodeRef<'a>, expr: &str) -> Result<Option<NodeRef<'a>>> {
        Ok(self.compile(expr)?.find_one(root))
    }

    fn next_tick(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("len", &self.len())
            .field("max_entries", &self.max_entries)
            .field("disabled", &self.is_disabled())
            .finish()
    }
}
