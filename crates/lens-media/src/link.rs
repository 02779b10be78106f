use async_trait::async_trait;
use bytes::Bytes;
use lens_proto::media::MediaFile;

#[derive(Debug, thiserror::Error)]
pub enum MediaLinkError {
    #[error("camera not in download mode")]
    NotInDownloadMode,
    #[error("no such file on aircraft: {0}")]
    NotFound(String),
    #[error("media link unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One piece of a remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub data: Bytes,
    /// The aircraft has no more bytes for this file.
    pub is_last: bool,
}

/// Aircraft storage as seen from the ground station.
#[async_trait]
pub trait MediaLink: Send + Sync {
    async fn enter_download_mode(&self) -> Result<(), MediaLinkError>;
    async fn exit_download_mode(&self) -> Result<(), MediaLinkError>;

    /// Snapshot of the aircraft's storage, oldest first.
    async fn list_files(&self) -> Result<Vec<MediaFile>, MediaLinkError>;

    async fn fetch_chunk(&self, file: &MediaFile, offset: u64) -> Result<Chunk, MediaLinkError>;
}
