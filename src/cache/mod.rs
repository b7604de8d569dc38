//! File-backed cache with modification-time expiry
//!
//! This module provides a cache that stores each entry as a plain file in a
//! single directory. Entries expire a fixed duration after their last write,
//! and expiry is only checked when an entry is looked up: there is no index
//! and no background sweeper.

mod config;
mod error;
mod manager;

pub use config::{CacheConfig, DEFAULT_PERMISSIONS};
pub use error::CacheError;
pub use manager::{is_fresh, EntryInfo, FileCache};
