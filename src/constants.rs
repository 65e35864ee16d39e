pub const MAX_DEPTH: usize = 256;

/// Deepest nesting of parentheses, predicates and call arguments a query
/// may use.
pub const MAX_QUERY_DEPTH: usize = 64;

pub const DEFAULT_CACHE_ENTRIES: usize = 50;

pub const MARKUP_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

pub const MARKUP_ROOT_TAG: &str = "root";

/// Tag written for array entries, whose label is empty.
pub const ANONYMOUS_TAG: &str = "element";

#[inline]
pub fn is_markup_reserved(byte: u8) -> bool {
    matches!(byte, b'<' | b'>' | b'&')
}
