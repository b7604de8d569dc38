//! Construction parameters for a [`FileCache`](super::FileCache).

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Mode applied to created files and directories when none is configured.
pub const DEFAULT_PERMISSIONS: u32 = 0o644;

/// Everything needed to open a cache
///
/// The crate never reads this from disk or the environment itself; it is
/// serializable so that applications can embed it in their own settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one file per entry
    pub directory: PathBuf,
    /// How long an entry stays fresh after its last write
    pub expiration: Duration,
    /// Unix mode bits for the directory and new entry files
    #[serde(default = "default_permissions")]
    pub permissions: u32,
}

fn default_permissions() -> u32 {
    DEFAULT_PERMISSIONS
}

impl CacheConfig {
    /// Creates a config with [`DEFAULT_PERMISSIONS`]
    pub fn new(directory: impl Into<PathBuf>, expiration: Duration) -> Self {
        Self {
            directory: directory.into(),
            expiration,
            permissions: DEFAULT_PERMISSIONS,
        }
    }

    /// Replaces the permission bits
    pub fn with_permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }
}
