use crate::constants::{DEFAULT_CACHE_ENTRIES, MAX_DEPTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub max_depth: usize,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Upper bound on cached queries; `0` disables eviction.
    pub max_entries: usize,
    pub disabled: bool,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_ENTRIES,
            disabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupOptions {
    pub declaration: bool,
}

impl MarkupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self { declaration: true }
    }
}
