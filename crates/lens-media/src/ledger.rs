use std::path::Path;

use anyhow::{Context, Result};
use lens_proto::media::MediaFile;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::link::{MediaLink, MediaLinkError};

/// How many files were on the card before the flight. The post-flight
/// download starts at this index of the listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureLedger {
    pre_flight_count: usize,
}

impl CaptureLedger {
    pub fn new(pre_flight_count: usize) -> Self {
        Self { pre_flight_count }
    }

    pub async fn capture(link: &dyn MediaLink) -> Result<Self, MediaLinkError> {
        let n = link.list_files().await?.len();
        info!("media: {} files on card before flight", n);
        Ok(Self { pre_flight_count: n })
    }

    pub fn pre_flight_count(&self) -> usize {
        self.pre_flight_count
    }

    /// Files added since the ledger was captured.
    pub fn new_since<'a>(&self, listing: &'a [MediaFile]) -> &'a [MediaFile] {
        listing.get(self.pre_flight_count..).unwrap_or(&[])
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let s = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read ledger {}", path.display()))?;
        serde_json::from_str(&s).context("parse ledger json")
    }

    pub async fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_vec(self)?)
            .await
            .with_context(|| format!("write ledger {}", path.display()))
    }
}
