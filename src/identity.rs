//! Asset identities and the per-directory identity cache.
//!
//! An asset identity is the second path segment of a thumbnail URL
//! (`https://media.example.com/id/{identity}/photo/name.jpg`). It doubles as
//! the on-disk filename stem, so the set of `*.jpg` files in a destination
//! directory is the set of identities already downloaded.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, instrument};
use url::Url;

/// Extension of every stored asset.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Derives the asset identity from a thumbnail URL.
///
/// Returns `None` when the URL does not parse or its path has no non-empty
/// second segment.
///
/// # Example
///
/// ```
/// use istock_miner::identity::asset_identity;
///
/// let url = "https://media.istockphoto.com/id/1280951754/photo/horse.jpg?s=612x612";
/// assert_eq!(asset_identity(url).as_deref(), Some("1280951754"));
/// assert_eq!(asset_identity("https://media.istockphoto.com/logo.svg"), None);
/// ```
#[must_use]
pub fn asset_identity(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let identity = parsed.path_segments()?.nth(1)?;
    if identity.is_empty() {
        return None;
    }
    Some(identity.to_string())
}

/// Destination file for `identity` inside `dir`.
#[must_use]
pub fn asset_path(dir: &Path, identity: &str) -> PathBuf {
    dir.join(format!("{identity}.{IMAGE_EXTENSION}"))
}

/// Identities known to exist (or to be claimed) for one destination directory.
///
/// Advisory only: the directory listing is the source of truth and nothing is
/// written back. Safe to share between tasks; updates go through a mutex.
#[derive(Debug, Default)]
pub struct IdentityCache {
    known: Mutex<HashSet<String>>,
}

impl IdentityCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `dir` non-recursively for `*.jpg` files and records their stems.
    ///
    /// A missing directory yields an empty cache.
    ///
    /// # Errors
    ///
    /// Returns the IO error if the directory exists but cannot be read.
    #[instrument(level = "debug", fields(dir = %dir.display()))]
    pub fn load(dir: &Path) -> std::io::Result<Self> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e),
        };

        let mut known = HashSet::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let has_image_ext = path
                .extension()
                .is_some_and(|ext| ext == IMAGE_EXTENSION);
            if let (true, Some(stem)) = (has_image_ext, path.file_stem()) {
                known.insert(stem.to_string_lossy().into_owned());
            }
        }

        debug!(count = known.len(), "identity cache loaded");
        Ok(Self {
            known: Mutex::new(known),
        })
    }

    /// Returns true if `identity` is already present.
    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.guard().contains(identity)
    }

    /// Records `identity`, returning true if it was not present before.
    ///
    /// Producers call this before enqueueing so one identity is enqueued at
    /// most once per run.
    pub fn claim(&self, identity: &str) -> bool {
        self.guard().insert(identity.to_string())
    }

    /// Number of known identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Returns true if no identity is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked mid-insert.
        self.known.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_asset_identity_takes_second_segment() {
        assert_eq!(
            asset_identity("https://media.istockphoto.com/id/123/photo/dog.jpg").as_deref(),
            Some("123")
        );
        assert_eq!(
            asset_identity("http://127.0.0.1:4000/id/abc/vector/x.jpg?s=1").as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_asset_identity_rejects_short_paths() {
        assert_eq!(asset_identity("https://media.istockphoto.com/"), None);
        assert_eq!(asset_identity("https://media.istockphoto.com/id/"), None);
        assert_eq!(asset_identity("https://media.istockphoto.com/id//x.jpg"), None);
        assert_eq!(asset_identity("/id/123/photo.jpg"), None);
    }

    #[test]
    fn test_asset_path_uses_image_extension() {
        let path = asset_path(Path::new("/data/dog"), "789");
        assert_eq!(path, PathBuf::from("/data/dog/789.jpg"));
    }

    #[test]
    fn test_load_collects_jpg_stems_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("123.jpg"), b"a").unwrap();
        std::fs::write(dir.path().join("456.jpg"), b"b").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"c").unwrap();
        std::fs::write(dir.path().join("789.png"), b"d").unwrap();
        std::fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let cache = IdentityCache::load(dir.path()).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("123"));
        assert!(cache.contains("456"));
        assert!(!cache.contains("789"));
        assert!(!cache.contains("nested"));
    }

    #[test]
    fn test_load_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = IdentityCache::load(&dir.path().join("absent")).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_claim_is_exclusive() {
        let cache = IdentityCache::new();
        assert!(cache.claim("a"));
        assert!(!cache.claim("a"));
        assert!(cache.contains("a"));
    }

    #[test]
    fn test_claim_concurrently_succeeds_once() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::thread;

        let cache = Arc::new(IdentityCache::new());
        let winners = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let winners = Arc::clone(&winners);
                thread::spawn(move || {
                    if cache.claim("shared") {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
