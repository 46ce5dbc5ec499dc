//! Temporary artifact ledger.
//!
//! Every multi-step pipeline reserves its intermediates through a
//! [`TempArtifacts`] and releases them on every exit path. Names carry a random
//! component so concurrent pipelines sharing a media root never collide.

use reel_models::{MediaRef, MediaRoot};
use std::path::PathBuf;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::fs_utils::remove_file_best_effort;

/// Intermediate files owned by one pipeline invocation.
#[derive(Debug)]
pub struct TempArtifacts {
    root: MediaRoot,
    tracked: Vec<PathBuf>,
}

impl TempArtifacts {
    pub fn new(root: &MediaRoot) -> Self {
        Self {
            root: root.clone(),
            tracked: Vec::new(),
        }
    }

    /// Reserve `<prefix>_<random>_<file name>` next to `near`.
    ///
    /// Nothing is created on disk; the path is only recorded for cleanup.
    pub fn reserve(&mut self, near: &MediaRef, prefix: &str) -> MediaRef {
        let reference = unique_sibling(near, prefix);
        self.track(reference)
    }

    /// Like [`reserve`](Self::reserve) with the extension replaced.
    pub fn reserve_with_extension(
        &mut self,
        near: &MediaRef,
        prefix: &str,
        extension: &str,
    ) -> MediaRef {
        let reference = unique_sibling(near, prefix).with_extension(extension);
        self.track(reference)
    }

    fn track(&mut self, reference: MediaRef) -> MediaRef {
        self.tracked.push(self.root.resolve(&reference));
        reference
    }

    /// Number of artifacts still awaiting cleanup.
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Delete one artifact now and stop tracking it.
    pub async fn release(&mut self, reference: &MediaRef) {
        let path = self.root.resolve(reference);
        self.tracked.retain(|p| p != &path);
        remove_file_best_effort(&path).await;
    }

    /// Delete every remaining artifact. Failures are logged, never returned.
    pub async fn cleanup(&mut self) {
        for path in self.tracked.drain(..) {
            remove_file_best_effort(&path).await;
        }
    }
}

fn unique_sibling(near: &MediaRef, prefix: &str) -> MediaRef {
    let name = format!("{}_{}_{}", prefix, Uuid::new_v4().simple(), near.file_name());
    near.sibling(&name)
}

impl Drop for TempArtifacts {
    // Reached with entries left only when the owning future was dropped
    // before `cleanup` ran.
    fn drop(&mut self) {
        for path in self.tracked.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Removed abandoned temporary file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove temporary file {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reserve_is_unique_and_tracked() {
        let dir = TempDir::new().unwrap();
        let root = MediaRoot::new(dir.path());
        let dest = MediaRef::parse("media/out/final.wav").unwrap();

        let mut temps = TempArtifacts::new(&root);
        let a = temps.reserve(&dest, "raw");
        let b = temps.reserve(&dest, "raw");

        assert_ne!(a, b);
        assert!(a.as_relative().starts_with("out/raw_"));
        assert!(a.as_relative().ends_with("_final.wav"));
        assert_eq!(temps.len(), 2);
    }

    #[tokio::test]
    async fn test_reserve_with_extension() {
        let dir = TempDir::new().unwrap();
        let root = MediaRoot::new(dir.path());
        let dest = MediaRef::parse("clip.mp4").unwrap();

        let mut temps = TempArtifacts::new(&root);
        let audio = temps.reserve_with_extension(&dest, "tmp", "wav");
        assert_eq!(audio.extension(), Some("wav"));
        assert_eq!(temps.len(), 1);

        std::fs::write(root.resolve(&audio), b"x").unwrap();
        temps.cleanup().await;
        assert!(!root.resolve(&audio).exists());
    }

    #[tokio::test]
    async fn test_cleanup_removes_files_and_tolerates_missing() {
        let dir = TempDir::new().unwrap();
        let root = MediaRoot::new(dir.path());
        let dest = MediaRef::parse("a.wav").unwrap();

        let mut temps = TempArtifacts::new(&root);
        let written = temps.reserve(&dest, "tmp");
        let _never_written = temps.reserve(&dest, "tmp");
        std::fs::write(root.resolve(&written), b"x").unwrap();

        temps.cleanup().await;
        assert!(temps.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_release_single() {
        let dir = TempDir::new().unwrap();
        let root = MediaRoot::new(dir.path());
        let dest = MediaRef::parse("a.wav").unwrap();

        let mut temps = TempArtifacts::new(&root);
        let first = temps.reserve(&dest, "tmp");
        let second = temps.reserve(&dest, "tmp");
        std::fs::write(root.resolve(&first), b"x").unwrap();
        std::fs::write(root.resolve(&second), b"x").unwrap();

        temps.release(&first).await;
        assert!(!root.resolve(&first).exists());
        assert!(root.resolve(&second).exists());
        assert_eq!(temps.len(), 1);
    }

    #[test]
    fn test_drop_removes_leftovers() {
        let dir = TempDir::new().unwrap();
        let root = MediaRoot::new(dir.path());
        let dest = MediaRef::parse("a.wav").unwrap();

        let path = {
            let mut temps = TempArtifacts::new(&root);
            let reference = temps.reserve(&dest, "raw");
            let path = root.resolve(&reference);
            std::fs::write(&path, b"x").unwrap();
            path
        };
        assert!(!path.exists());
    }
}
