//! Post-flight media download.
//!
//! Files are pulled strictly one after another, one chunk in flight at a time.
//! A finished file is handed to the [`MediaStore`] under a sequence-numbered
//! name. Chunk errors stop the run but keep the [`TransferSession`] where it
//! was, so the next [`TransferPipeline::run`] continues from the failed offset.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::BytesMut;
use lens_fc::CancelToken;
use lens_proto::media::{MediaFile, MediaType};
use tracing::{debug, info, warn};

use crate::link::{MediaLink, MediaLinkError};
use crate::store::MediaStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Eligible files found; emitted once per session.
    Ready { total: usize },
    /// 1-based.
    Downloading { seq: usize, total: usize },
    Saved { seq: usize, path: PathBuf },
    PersistFailed { seq: usize, reason: String },
    Complete { saved: usize, failed: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("chunk at {offset} of {file} failed: {source}")]
    ChunkFailed {
        file: String,
        offset: u64,
        #[source]
        source: MediaLinkError,
    },
    #[error("{file}: expected {expected} bytes, got {got}")]
    SizeMismatch { file: String, expected: u64, got: u64 },
    #[error("transfer cancelled")]
    Cancelled,
    #[error(transparent)]
    Link(#[from] MediaLinkError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferReport {
    pub saved: usize,
    pub failed: usize,
}

/// Position of a download. Owned by the caller so a failed run can be resumed.
#[derive(Debug)]
pub struct TransferSession {
    files: Vec<MediaFile>,
    index: usize,
    offset: u64,
    buffer: BytesMut,
    report: TransferReport,
    ready_reported: bool,
    started: bool,
    finished: bool,
}

impl TransferSession {
    /// Takes the listing snapshot and the ledger's start index; only photos and
    /// videos from `start_index` on are downloaded.
    pub fn new(snapshot: Vec<MediaFile>, start_index: usize) -> Self {
        let files: Vec<MediaFile> = snapshot
            .into_iter()
            .skip(start_index)
            .filter(|f| {
                let keep = f.media_type.is_transferable();
                if !keep {
                    debug!("media: skipping {}", f.name);
                }
                keep
            })
            .collect();
        Self {
            files,
            index: 0,
            offset: 0,
            buffer: BytesMut::new(),
            report: TransferReport::default(),
            ready_reported: false,
            started: false,
            finished: false,
        }
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// 1-based sequence of the file in progress.
    pub fn seq(&self) -> usize {
        self.index + 1
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn report(&self) -> TransferReport {
        self.report
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn current(&self) -> Option<&MediaFile> {
        self.files.get(self.index)
    }

    fn restart_file(&mut self) {
        self.offset = 0;
        self.buffer.clear();
    }

    fn next_file(&mut self) {
        self.index += 1;
        self.restart_file();
    }
}

/// Suggested library name: `image_{seq}.{ext}` / `video_{seq}.{ext}`.
pub fn suggested_name(file: &MediaFile, seq: usize) -> String {
    let (prefix, fallback) = match file.media_type {
        MediaType::Video => ("video", "mp4"),
        _ => ("image", "jpg"),
    };
    let ext = file.extension().map(str::to_ascii_lowercase);
    format!("{}_{}.{}", prefix, seq, ext.as_deref().unwrap_or(fallback))
}

pub struct TransferPipeline {
    link: Arc<dyn MediaLink>,
    store: Arc<dyn MediaStore>,
}

impl TransferPipeline {
    pub fn new(link: Arc<dyn MediaLink>, store: Arc<dyn MediaStore>) -> Self {
        Self { link, store }
    }

    /// Downloads everything left in `session`. Safe to call again after an error.
    pub async fn run(
        &self,
        session: &mut TransferSession,
        cancel: &CancelToken,
        mut progress: impl FnMut(Progress),
    ) -> Result<TransferReport, TransferError> {
        if session.finished {
            return Ok(session.report);
        }

        let total = session.total();
        if !session.ready_reported {
            session.ready_reported = true;
            progress(Progress::Ready { total });
            if total == 0 {
                info!("media: there are no pictures to download");
                session.finished = true;
                progress(Progress::Complete { saved: 0, failed: 0 });
                return Ok(session.report);
            }
        }
        if !session.started {
            self.link.enter_download_mode().await?;
            session.started = true;
        }

        while let Some(file) = session.current().cloned() {
            let seq = session.seq();
            if session.offset == 0 {
                info!("media: file {} of {}: {}", seq, total, file.name);
                progress(Progress::Downloading { seq, total });
            } else {
                info!("media: resuming {} at {}", file.name, session.offset);
            }

            self.fetch_file(session, &file, cancel).await?;

            let name = suggested_name(&file, seq);
            match self.store.save(&session.buffer, &name).await {
                Ok(path) => {
                    session.report.saved += 1;
                    progress(Progress::Saved { seq, path });
                }
                Err(e) => {
                    warn!("media: could not save {}: {}", name, e);
                    session.report.failed += 1;
                    progress(Progress::PersistFailed { seq, reason: e.to_string() });
                }
            }
            session.next_file();
        }

        self.link.exit_download_mode().await?;
        session.finished = true;
        let TransferReport { saved, failed } = session.report;
        info!("media: done, {} saved, {} failed", saved, failed);
        progress(Progress::Complete { saved, failed });
        Ok(session.report)
    }

    /// Pulls chunks into the session buffer until the file is complete.
    async fn fetch_file(
        &self,
        session: &mut TransferSession,
        file: &MediaFile,
        cancel: &CancelToken,
    ) -> Result<(), TransferError> {
        loop {
            if cancel.is_cancelled() {
                return Err(TransferError::Cancelled);
            }

            let offset = session.offset;
            let chunk = self.link.fetch_chunk(file, offset).await.map_err(|source| {
                warn!("media: chunk at {} of {} failed: {}", offset, file.name, source);
                TransferError::ChunkFailed { file: file.name.clone(), offset, source }
            })?;

            let got = offset + chunk.data.len() as u64;
            let stalled = chunk.data.is_empty() && !chunk.is_last;
            if got > file.size_bytes || (chunk.is_last && got != file.size_bytes) || stalled {
                // retry starts this file over
                session.restart_file();
                return Err(TransferError::SizeMismatch {
                    file: file.name.clone(),
                    expected: file.size_bytes,
                    got,
                });
            }

            session.buffer.extend_from_slice(&chunk.data);
            session.offset = got;

            if chunk.is_last {
                return Ok(());
            }
        }
    }
}
