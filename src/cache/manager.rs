//! File cache manager
//!
//! Provides a `FileCache` that stores raw bytes as one file per entry and uses
//! each file's modification time as the only record of when it was cached.

use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::config::CacheConfig;
use super::error::CacheError;

/// Metadata about a single entry, as reported by [`FileCache::entry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Where the entry lives on disk
    pub path: PathBuf,
    /// Last modification time of the entry file
    pub modified: DateTime<Utc>,
    /// Size of the contents in bytes
    pub len: u64,
    /// Time since the last write, zero if the timestamp lies in the future
    pub age: Duration,
    /// Whether a `get` would currently treat the entry as stale
    pub is_expired: bool,
}

/// Returns true if an entry last modified at `modified` is still fresh at `now`.
///
/// Freshness is strict: an entry whose age equals `expiration` is stale. A
/// modification time after `now` counts as fresh.
pub fn is_fresh(expiration: Duration, modified: SystemTime, now: SystemTime) -> bool {
    match now.duration_since(modified) {
        Ok(elapsed) => expiration > elapsed,
        Err(_) => true,
    }
}

/// A cache that keeps every entry as a file inside one directory
///
/// The directory is the only state: nothing about entries is held in memory,
/// and every operation goes back to the filesystem. Expiration is lazy, so a
/// stale entry stays on disk until [`get`](Self::get) or one of the flush
/// methods touches it.
///
/// # Concurrency
///
/// No locking is done. Two `set` calls on the same name leave whichever write
/// finished last. A `get` racing a `set` or `flush` on the same name may see
/// the old contents, the new contents, a partially written file, or a miss.
/// Callers sharing a directory across threads or processes must coordinate
/// themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCache {
    directory: PathBuf,
    expiration: Duration,
    permissions: u32,
}

impl FileCache {
    /// Opens a cache rooted at `directory`, creating it and any missing parents.
    ///
    /// # Arguments
    /// * `directory` - Where entry files are stored
    /// * `expiration` - How long an entry stays fresh after being written
    /// * `permissions` - Unix mode for new entry files; created directories also get search bits
    ///
    /// # Returns
    /// * `Err(CacheError::Init)` if the directory cannot be inspected or created
    pub fn new(
        directory: impl Into<PathBuf>,
        expiration: Duration,
        permissions: u32,
    ) -> Result<Self, CacheError> {
        let cache = Self {
            directory: directory.into(),
            expiration,
            permissions,
        };

        match fs::metadata(&cache.directory) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => cache.create_dir()?,
            Err(source) => {
                return Err(CacheError::Init {
                    path: cache.directory,
                    source,
                })
            }
        }

        Ok(cache)
    }

    /// Opens a cache from a [`CacheConfig`]
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        Self::new(
            config.directory.clone(),
            config.expiration,
            config.permissions,
        )
    }

    /// Directory holding the entry files
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// How long an entry stays fresh after its last write
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Mode bits used for new entry files
    pub fn permissions(&self) -> u32 {
        self.permissions
    }

    /// Returns the path of the entry called `name`, whether or not it exists.
    ///
    /// The name is joined as-is: it is not escaped or hashed, so callers must
    /// pass names that are safe as a single file name.
    pub fn path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    /// Writes `contents` to the entry called `name`
    ///
    /// Creates the file with the cache permissions if it is absent, otherwise
    /// truncates and overwrites it. Either way its modification time is reset.
    pub fn set(&self, name: &str, contents: impl AsRef<[u8]>) -> Result<(), CacheError> {
        let path = self.path(name);

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.permissions);
        }

        match options
            .open(&path)
            .and_then(|mut file| file.write_all(contents.as_ref()))
        {
            Ok(()) => Ok(()),
            Err(source) => Err(CacheError::Write { path, source }),
        }
    }

    /// Reads the entry called `name` if it is still fresh
    ///
    /// A stale entry is deleted before reporting the miss. That deletion is
    /// best-effort: if it fails the result is still [`CacheError::Miss`].
    ///
    /// # Returns
    /// * `Ok(contents)` for a fresh entry
    /// * `Err(CacheError::Miss)` if the entry is absent, cannot be inspected, or has expired
    /// * `Err(CacheError::Read)` if a fresh entry exists but reading it fails
    pub fn get(&self, name: &str) -> Result<Vec<u8>, CacheError> {
        let path = self.path(name);

        let Some(modified) = modified_time(&path) else {
            trace!(path = %path.display(), "cache miss");
            return Err(CacheError::Miss);
        };

        if !is_fresh(self.expiration, modified, SystemTime::now()) {
            self.evict(&path);
            return Err(CacheError::Miss);
        }

        match read_entry(&path) {
            Ok(contents) => {
                trace!(path = %path.display(), len = contents.len(), "cache hit");
                Ok(contents)
            }
            // Removed between the stat and the read.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(CacheError::Miss),
            Err(source) => Err(CacheError::Read { path, source }),
        }
    }

    /// Returns true if `get(name)` would currently be a hit.
    ///
    /// Unlike `get`, this never deletes anything, stale or not. Anything other
    /// than a regular file under `name` is never valid.
    pub fn is_valid(&self, name: &str) -> bool {
        modified_time(&self.path(name))
            .is_some_and(|modified| is_fresh(self.expiration, modified, SystemTime::now()))
    }

    /// Describes the entry called `name` without reading or evicting it
    ///
    /// Returns `None` if the entry does not exist or its metadata is unavailable.
    pub fn entry(&self, name: &str) -> Option<EntryInfo> {
        let path = self.path(name);
        let metadata = fs::metadata(&path).ok().filter(|m| m.is_file())?;
        let modified = metadata.modified().ok()?;
        let now = SystemTime::now();

        Some(EntryInfo {
            modified: DateTime::<Utc>::from(modified),
            len: metadata.len(),
            age: now.duration_since(modified).unwrap_or_default(),
            is_expired: !is_fresh(self.expiration, modified, now),
            path,
        })
    }

    /// Deletes the entry called `name`
    ///
    /// Fails with [`CacheError::Remove`] if the file cannot be removed, which
    /// includes the case where it does not exist.
    pub fn flush(&self, name: &str) -> Result<(), CacheError> {
        let path = self.path(name);
        fs::remove_file(&path).map_err(|source| CacheError::Remove {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "flushed cache entry");
        Ok(())
    }

    /// Deletes every entry by removing the whole directory, then recreates it empty
    ///
    /// If removal succeeds but recreation fails the error is returned and the
    /// cache is left without a directory; later `set` calls will fail until
    /// the directory is restored.
    pub fn flush_all(&self) -> Result<(), CacheError> {
        match fs::remove_dir_all(&self.directory) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(CacheError::Remove {
                    path: self.directory.clone(),
                    source,
                })
            }
        }
        debug!(directory = %self.directory.display(), "flushed all cache entries");

        self.create_dir()
    }

    /// Creates the cache directory and any missing parents
    ///
    /// Uses the cache permissions plus a search bit wherever a read bit is set,
    /// so that a file mode such as `0o644` still yields a traversable directory.
    fn create_dir(&self) -> Result<(), CacheError> {
        let mut builder = DirBuilder::new();
        builder.recursive(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(directory_mode(self.permissions));
        }

        builder
            .create(&self.directory)
            .map_err(|source| CacheError::Init {
                path: self.directory.clone(),
                source,
            })?;
        debug!(directory = %self.directory.display(), "created cache directory");
        Ok(())
    }

    /// Best-effort removal of a stale entry
    fn evict(&self, path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "evicted stale cache entry"),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "could not evict stale cache entry")
            }
        }
    }
}

/// Modification time of the regular file at `path`, if there is one
fn modified_time(path: &Path) -> Option<SystemTime> {
    let metadata = fs::metadata(path).ok().filter(|m| m.is_file())?;
    metadata.modified().ok()
}

/// Directory mode for the given entry permissions: every read bit gains its search bit
fn directory_mode(permissions: u32) -> u32 {
    permissions | ((permissions & 0o444) >> 2)
}

fn read_entry(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let capacity = file
        .metadata()
        .ok()
        .and_then(|m| usize::try_from(m.len()).ok())
        .unwrap_or(0);
    let mut contents = Vec::with_capacity(capacity);
    file.read_to_end(&mut contents)?;
    Ok(contents)
}
