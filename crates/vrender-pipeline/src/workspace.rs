//! Per-request scratch workspace.
//!
//! Each render gets its own directory keyed by the request ID, so two
//! concurrent renders can never collide on a scratch path. Every locally
//! materialized file lives inside it and is deleted with it.

use std::path::{Path, PathBuf};
use tracing::warn;

use vrender_models::RequestId;

use crate::error::PipelineResult;

/// An isolated scratch arena owned by one in-flight request.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    request_id: RequestId,
    cleaned: bool,
}

impl Workspace {
    /// Allocate the workspace directory for a request.
    pub async fn create(work_root: impl AsRef<Path>, request_id: &RequestId) -> PipelineResult<Self> {
        let root = work_root.as_ref().join(request_id.as_str());
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            request_id: request_id.clone(),
            cleaned: false,
        })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// The owning request.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Scratch path indexed by stage name and sequence number.
    pub fn indexed_path(&self, stage: &str, seq: usize, ext: &str) -> PathBuf {
        self.root.join(format!("{}_{}.{}", stage, seq, ext))
    }

    /// Scratch path for a single named file.
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Best-effort recursive deletion. Called exactly once, on every exit
    /// path of the controller.
    pub async fn cleanup(mut self) {
        self.cleaned = true;
        if let Err(e) = tokio::fs::remove_dir_all(&self.root).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    request_id = %self.request_id,
                    "Failed to remove workspace {}: {}",
                    self.root.display(),
                    e
                );
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.cleaned {
            // Dropped without cleanup() - can happen on panic. Fall back to
            // a synchronous removal so scratch state never outlives the
            // request.
            warn!(
                request_id = %self.request_id,
                "Workspace dropped without cleanup, removing {}",
                self.root.display()
            );
            let _ = std::fs::remove_dir_all(&self.root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_and_cleanup() {
        let work_root = TempDir::new().unwrap();
        let id = RequestId::new();

        let ws = Workspace::create(work_root.path(), &id).await.unwrap();
        let dir = ws.path().to_path_buf();
        assert!(dir.exists());

        tokio::fs::write(ws.file("scratch.bin"), b"x").await.unwrap();

        ws.cleanup().await;
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_concurrent_requests_never_share_paths() {
        let work_root = TempDir::new().unwrap();

        let a = Workspace::create(work_root.path(), &RequestId::new())
            .await
            .unwrap();
        let b = Workspace::create(work_root.path(), &RequestId::new())
            .await
            .unwrap();

        assert_ne!(a.path(), b.path());
        assert_ne!(
            a.indexed_path("fetch", 0, "mp4"),
            b.indexed_path("fetch", 0, "mp4")
        );

        // Writing the same logical file in both workspaces must not clash.
        tokio::fs::write(a.indexed_path("fetch", 0, "mp4"), b"a")
            .await
            .unwrap();
        tokio::fs::write(b.indexed_path("fetch", 0, "mp4"), b"b")
            .await
            .unwrap();
        assert_eq!(
            tokio::fs::read(a.indexed_path("fetch", 0, "mp4")).await.unwrap(),
            b"a"
        );

        a.cleanup().await;
        b.cleanup().await;
    }

    #[tokio::test]
    async fn test_indexed_paths_are_stage_and_sequence_keyed() {
        let work_root = TempDir::new().unwrap();
        let ws = Workspace::create(work_root.path(), &RequestId::new())
            .await
            .unwrap();

        let p = ws.indexed_path("clip", 3, "mp4");
        assert!(p.ends_with("clip_3.mp4"));

        ws.cleanup().await;
    }

    #[tokio::test]
    async fn test_drop_removes_directory() {
        let work_root = TempDir::new().unwrap();
        let dir;
        {
            let ws = Workspace::create(work_root.path(), &RequestId::new())
                .await
                .unwrap();
            dir = ws.path().to_path_buf();
            assert!(dir.exists());
            // Dropped without cleanup() here.
        }
        assert!(!dir.exists());
    }
}
