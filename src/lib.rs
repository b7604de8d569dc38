//! fcache
//!
//! A small on-disk cache for byte strings that must survive process restarts,
//! such as rendered pages or API responses.

pub mod cache;

pub use cache::{is_fresh, CacheConfig, CacheError, EntryInfo, FileCache, DEFAULT_PERMISSIONS};
