//! Filesystem-backed store
//!
//! A container is a folder under the store root; object paths are `/`
//! separated and relative to that folder. `"."` names the root itself.

use async_trait::async_trait;
use docket_domain::{DocumentStore, FileRef, StoreError};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Store over a local directory tree
#[derive(Debug, Clone)]
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, container: &str) -> Result<PathBuf, StoreError> {
        if container.is_empty() || container == "." {
            return Ok(self.root.clone());
        }
        Ok(self.root.join(checked(container)?))
    }

    fn object_path(&self, container: &str, path: &str) -> Result<PathBuf, StoreError> {
        Ok(self.container_dir(container)?.join(checked(path)?))
    }
}

/// Reject paths that could leave the container
fn checked(path: &str) -> Result<&Path, StoreError> {
    let p = Path::new(path);
    let escapes = p
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(StoreError::Forbidden(format!("path escapes container: {}", path)));
    }
    Ok(p)
}

fn map_io(e: std::io::Error, what: &str) -> StoreError {
    match e.kind() {
        ErrorKind::NotFound => StoreError::NotFound(what.to_string()),
        ErrorKind::PermissionDenied => StoreError::Forbidden(what.to_string()),
        _ => StoreError::Io(e),
    }
}

#[async_trait]
impl DocumentStore for LocalDirStore {
    async fn list_files(&self, container: &str) -> Result<Vec<FileRef>, StoreError> {
        let base = self.container_dir(container)?;
        let mut files = Vec::new();
        let mut pending = vec![(base.clone(), String::new())];

        while let Some((dir, prefix)) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| map_io(e, &dir.display().to_string()))?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                let relative = if prefix.is_empty() {
                    name
                } else {
                    format!("{}/{}", prefix, name)
                };
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push((entry.path(), relative));
                } else if file_type.is_file() {
                    let size = entry.metadata().await?.len();
                    files.push(FileRef::new(container, relative, size));
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Listed {} files under {}", files.len(), base.display());
        Ok(files)
    }

    async fn download(&self, file: &FileRef) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(&file.container, &file.path)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| map_io(e, &file.path))
    }

    async fn upload(
        &self,
        container: &str,
        path: &str,
        bytes: Vec<u8>,
    ) -> Result<FileRef, StoreError> {
        let target = self.object_path(container, path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let size = bytes.len() as u64;
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| map_io(e, path))?;
        Ok(FileRef::new(container, path, size))
    }

    async fn delete(&self, file: &FileRef) -> Result<(), StoreError> {
        let path = self.object_path(&file.container, &file.path)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| map_io(e, &file.path))
    }
}
