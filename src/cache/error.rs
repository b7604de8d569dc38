//! Errors returned by [`FileCache`](super::FileCache) operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while operating on a file cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// The entry is absent or has expired.
    ///
    /// This is an expected outcome rather than a fault, and it deliberately
    /// does not say which of the two happened.
    #[error("miss")]
    Miss,

    /// The cache directory could not be created or inspected
    #[error("failed to initialize cache directory {}: {source}", path.display())]
    Init {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing an entry failed
    #[error("failed to write cache entry {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A fresh entry exists but its contents could not be read
    #[error("failed to read cache entry {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Removing an entry or the cache directory failed
    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    /// Returns true if this is a cache miss rather than a filesystem fault
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Miss)
    }

    /// Returns the underlying I/O error, if there is one
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            CacheError::Miss => None,
            CacheError::Init { source, .. }
            | CacheError::Write { source, .. }
            | CacheError::Read { source, .. }
            | CacheError::Remove { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_has_fixed_message() {
        let err = CacheError::Miss;
        assert_eq!(err.to_string(), "miss");
        assert!(err.is_miss());
        assert!(err.io_error().is_none());
    }

    #[test]
    fn test_io_variants_keep_source() {
        let err = CacheError::Write {
            path: PathBuf::from("/cache/page"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(!err.is_miss());
        assert_eq!(
            err.io_error().map(io::Error::kind),
            Some(io::ErrorKind::PermissionDenied)
        );
        let message = err.to_string();
        assert!(message.contains("/cache/page"), "got: {}", message);
        assert!(message.contains("denied"), "got: {}", message);
    }
}
