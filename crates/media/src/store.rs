//! Content-addressed media store.
//!
//! Files live at `<root>/<md5>`. Every write goes to `<root>/.tmp/<uuid>` first
//! and is renamed into place while holding a per-hash lock, so a reader never
//! observes a partially written entry and concurrent writers of the same
//! content are serialized.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    dashmap::DashMap,
    serde::Serialize,
    tokio::sync::Mutex,
    tracing::{debug, trace},
};

use crate::{
    error::{Context, Result},
    files::{file_len, file_md5, md5_hex},
};

const SCRATCH_DIR: &str = ".tmp";

/// A file held by the store, addressed by its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaResource {
    /// Lowercase hex MD5.
    pub md5: String,
    pub path: PathBuf,
    pub size: u64,
}

impl MediaResource {
    /// File name of the stored entry (the hash itself).
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.md5.clone())
    }
}

pub struct ContentStore {
    root: PathBuf,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ContentStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = crate::files::absolute(&root.into())?;
        std::fs::create_dir_all(root.join(SCRATCH_DIR))
            .with_context(|| format!("create store at {}", root.display()))?;
        debug!(root = %root.display(), "content store opened");
        Ok(Self {
            root,
            locks: DashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, md5: &str) -> PathBuf {
        self.root.join(md5)
    }

    /// A fresh path in the scratch area, for tools that write their output
    /// before it is [`ingest`](Self::ingest)ed.
    #[must_use]
    pub fn scratch_path(&self, ext: Option<&str>) -> PathBuf {
        let name = match ext {
            Some(ext) => format!("{}.{ext}", uuid::Uuid::new_v4()),
            None => uuid::Uuid::new_v4().to_string(),
        };
        self.root.join(SCRATCH_DIR).join(name)
    }

    /// Look up a complete entry by hash.
    pub async fn get(&self, md5: &str) -> Option<MediaResource> {
        let path = self.path_for(md5);
        let size = file_len(&path).await?;
        Some(MediaResource {
            md5: md5.to_string(),
            path,
            size,
        })
    }

    pub async fn put_bytes(&self, bytes: &[u8]) -> Result<MediaResource> {
        let md5 = md5_hex(bytes);
        if let Some(existing) = self.get(&md5).await {
            return Ok(existing);
        }
        let scratch = self.scratch_path(None);
        tokio::fs::write(&scratch, bytes)
            .await
            .with_context(|| format!("write {}", scratch.display()))?;
        self.commit(scratch, md5).await
    }

    /// Copy an external file into the store. The source is left untouched.
    pub async fn put_file(&self, path: &Path) -> Result<MediaResource> {
        let md5 = file_md5(path).await?;
        if let Some(existing) = self.get(&md5).await {
            return Ok(existing);
        }
        let scratch = self.scratch_path(None);
        tokio::fs::copy(path, &scratch)
            .await
            .with_context(|| format!("copy {} into store", path.display()))?;
        self.commit(scratch, md5).await
    }

    /// Move a file (normally one from [`scratch_path`](Self::scratch_path))
    /// into the store.
    pub async fn ingest(&self, path: &Path) -> Result<MediaResource> {
        let md5 = file_md5(path).await?;
        self.commit(path.to_path_buf(), md5).await
    }

    async fn commit(&self, scratch: PathBuf, md5: String) -> Result<MediaResource> {
        let lock = self
            .locks
            .entry(md5.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().await;
            self.commit_locked(&scratch, &md5).await
        };

        drop(lock);
        self.locks.remove_if(&md5, |_, l| Arc::strong_count(l) == 1);
        result
    }

    async fn commit_locked(&self, scratch: &Path, md5: &str) -> Result<MediaResource> {
        let target = self.path_for(md5);
        if let Some(existing) = self.get(md5).await {
            trace!(md5, "entry already present, discarding scratch copy");
            let _ = tokio::fs::remove_file(scratch).await;
            return Ok(existing);
        }

        if tokio::fs::rename(scratch, &target).await.is_err() {
            // Cross-device source: copy then rename inside the store.
            let local = self.scratch_path(None);
            let copied = match tokio::fs::copy(scratch, &local).await {
                Ok(_) => tokio::fs::rename(&local, &target)
                    .await
                    .with_context(|| format!("commit {}", target.display())),
                Err(e) => Err::<(), _>(e)
                    .with_context(|| format!("copy {} into store", scratch.display())),
            };
            if copied.is_err() {
                let _ = tokio::fs::remove_file(&local).await;
            }
            copied?;
            let _ = tokio::fs::remove_file(scratch).await;
        }

        let size = file_len(&target).await.unwrap_or_default();
        debug!(md5, size, "stored media entry");
        Ok(MediaResource {
            md5: md5.to_string(),
            path: target,
            size,
        })
    }
}
