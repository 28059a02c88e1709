// Upload Storage Service
// Flat-file persistence of submitted files

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("invalid file name: {0:?}")]
    InvalidName(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("file not found: {0}")]
    NotFound(String),
}

/// Reduce a client-supplied file name to a bare, storable name.
///
/// Only the last path component is kept (either separator), `/` becomes `_`
/// and `..` sequences are removed. Returns `None` if nothing usable remains.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned = base.replace('/', "_").replace("..", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." {
        return None;
    }
    Some(cleaned.to_string())
}

/// Join a request path onto a base directory, refusing anything that could
/// leave it (parent/absolute components, backslashes, empty paths).
pub fn safe_join(base: &Path, relative: &str) -> Option<PathBuf> {
    if relative.is_empty() || relative.contains('\\') {
        return None;
    }
    let rel = Path::new(relative);
    if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(base.join(rel))
}

#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// A file being written chunk by chunk.
pub struct PendingUpload {
    name: String,
    path: PathBuf,
    file: fs::File,
    size: u64,
}

impl PendingUpload {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        self.file.write_all(chunk).await?;
        self.size += chunk.len() as u64;
        Ok(())
    }

    pub async fn finish(mut self) -> Result<StoredUpload, UploadError> {
        self.file.flush().await?;
        info!(file = %self.name, bytes = self.size, "upload.saved");
        Ok(StoredUpload {
            name: self.name,
            path: self.path,
            size: self.size,
        })
    }

    /// Drop the partially written file.
    pub async fn abort(self) {
        drop(self.file);
        let _ = fs::remove_file(&self.path).await;
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Start storing an upload under its sanitized name, replacing any
    /// previous file with the same name.
    pub async fn begin(&self, raw_name: &str) -> Result<PendingUpload, UploadError> {
        let name = sanitize_filename(raw_name).ok_or_else(|| UploadError::InvalidName(raw_name.to_string()))?;
        let path = self.dir.join(&name);
        let file = fs::File::create(&path).await?;
        Ok(PendingUpload {
            name,
            path,
            file,
            size: 0,
        })
    }

    /// Read a stored upload by its (relative) name
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, UploadError> {
        let path = safe_join(&self.dir, name).ok_or_else(|| UploadError::NotFound(name.to_string()))?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(fs::read(&path).await?),
            _ => Err(UploadError::NotFound(name.to_string())),
        }
    }
}
