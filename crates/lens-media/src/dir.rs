//! Media link replaying a local directory as the aircraft's SD card.

use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use lens_proto::media::{MediaFile, MediaType};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info};

use crate::link::{Chunk, MediaLink, MediaLinkError};

pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

pub struct DirMediaLink {
    root: PathBuf,
    chunk_size: usize,
    download_mode: AtomicBool,
}

impl DirMediaLink {
    pub fn new(root: impl Into<PathBuf>, chunk_size: Option<usize>) -> Self {
        Self {
            root: root.into(),
            chunk_size: chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE).max(1),
            download_mode: AtomicBool::new(false),
        }
    }

    pub fn in_download_mode(&self) -> bool {
        self.download_mode.load(Ordering::SeqCst)
    }

    fn resolve(&self, file: &MediaFile) -> Result<PathBuf, MediaLinkError> {
        // flat card, no nested paths
        if file.name.contains(['/', '\\']) || file.name == ".." {
            return Err(MediaLinkError::NotFound(file.name.clone()));
        }
        Ok(self.root.join(&file.name))
    }
}

#[async_trait]
impl MediaLink for DirMediaLink {
    async fn enter_download_mode(&self) -> Result<(), MediaLinkError> {
        self.download_mode.store(true, Ordering::SeqCst);
        info!("media: camera in download mode");
        Ok(())
    }

    async fn exit_download_mode(&self) -> Result<(), MediaLinkError> {
        self.download_mode.store(false, Ordering::SeqCst);
        info!("media: camera back in shoot-photo mode");
        Ok(())
    }

    async fn list_files(&self) -> Result<Vec<MediaFile>, MediaLinkError> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(ent) = entries.next_entry().await? {
            let meta = ent.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let name = ent.file_name().to_string_lossy().into_owned();
            let media_type = name
                .rsplit_once('.')
                .map(|(_, ext)| MediaType::from_extension(ext))
                .unwrap_or(MediaType::Other);
            files.push(MediaFile { name, media_type, size_bytes: meta.len() });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("media: {} files on card", files.len());
        Ok(files)
    }

    async fn fetch_chunk(&self, file: &MediaFile, offset: u64) -> Result<Chunk, MediaLinkError> {
        if !self.in_download_mode() {
            return Err(MediaLinkError::NotInDownloadMode);
        }
        let path = self.resolve(file)?;
        let mut f = match fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediaLinkError::NotFound(file.name.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        let len = f.metadata().await?.len();

        f.seek(SeekFrom::Start(offset)).await?;
        let mut buf = Vec::with_capacity(self.chunk_size);
        (&mut f).take(self.chunk_size as u64).read_to_end(&mut buf).await?;

        let is_last = offset + buf.len() as u64 >= len;
        Ok(Chunk { data: Bytes::from(buf), is_last })
    }
}
