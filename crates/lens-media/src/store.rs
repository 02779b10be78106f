use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("library refused {name}: {reason}")]
    HandOff { name: String, reason: String },
}

/// Durable destination for downloaded media.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Returns where the bytes ended up.
    async fn save(&self, data: &[u8], suggested_name: &str) -> Result<PathBuf, PersistError>;
}

/// Writes each file to a scratch directory, then hands it to the library directory.
/// The scratch copy is removed whether or not the hand-off worked.
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    temp_dir: PathBuf,
    library_dir: PathBuf,
}

impl FsMediaStore {
    pub fn new(temp_dir: impl Into<PathBuf>, library_dir: impl Into<PathBuf>) -> Self {
        Self { temp_dir: temp_dir.into(), library_dir: library_dir.into() }
    }

    async fn write_temp(&self, path: &Path, data: &[u8]) -> Result<(), PersistError> {
        let io = |source| PersistError::Io { path: path.to_path_buf(), source };
        fs::create_dir_all(&self.temp_dir).await.map_err(io)?;
        let mut f = fs::File::create(path).await.map_err(io)?;
        f.write_all(data).await.map_err(io)?;
        f.sync_all().await.map_err(io)?;
        Ok(())
    }

    async fn hand_off(&self, temp: &Path, name: &str) -> Result<PathBuf, PersistError> {
        let refused = |e: std::io::Error| PersistError::HandOff { name: name.to_string(), reason: e.to_string() };
        fs::create_dir_all(&self.library_dir).await.map_err(refused)?;
        let dest = self.library_dir.join(name);
        fs::copy(temp, &dest).await.map_err(refused)?;
        Ok(dest)
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn save(&self, data: &[u8], suggested_name: &str) -> Result<PathBuf, PersistError> {
        if suggested_name.is_empty() || suggested_name.contains(['/', '\\']) || suggested_name == ".." {
            return Err(PersistError::HandOff {
                name: suggested_name.to_string(),
                reason: "not a plain file name".into(),
            });
        }

        let temp = self.temp_dir.join(suggested_name);
        let res = match self.write_temp(&temp, data).await {
            Ok(()) => self.hand_off(&temp, suggested_name).await,
            Err(e) => Err(e),
        };

        if let Err(e) = fs::remove_file(&temp).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("media: could not remove temp file {}: {}", temp.display(), e);
            }
        }

        if let Ok(dest) = &res {
            debug!("media: saved {} ({} bytes)", dest.display(), data.len());
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_lands_in_library_and_cleans_temp() {
        let tmp = tempfile::tempdir().unwrap();
        let lib = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(tmp.path().join("scratch"), lib.path());

        let dest = store.save(b"jpeg-bytes", "image_1.jpg").await.unwrap();
        assert_eq!(dest, lib.path().join("image_1.jpg"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"jpeg-bytes");
        assert!(!tmp.path().join("scratch").join("image_1.jpg").exists());
    }

    #[tokio::test]
    async fn failed_hand_off_still_removes_temp() {
        let tmp = tempfile::tempdir().unwrap();
        let lib = tempfile::tempdir().unwrap();
        // library path is a regular file, so the hand-off cannot create it
        let blocked = lib.path().join("library");
        std::fs::write(&blocked, b"").unwrap();
        let store = FsMediaStore::new(tmp.path(), &blocked);

        let err = store.save(b"x", "image_2.jpg").await.unwrap_err();
        assert!(matches!(err, PersistError::HandOff { .. }));
        assert!(!tmp.path().join("image_2.jpg").exists());
    }

    #[tokio::test]
    async fn path_like_names_are_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsMediaStore::new(tmp.path(), tmp.path());
        assert!(store.save(b"x", "../escape.jpg").await.is_err());
    }
}
