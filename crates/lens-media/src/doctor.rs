use anyhow::Result;
use std::path::Path;

pub fn check_source(source_dir: &Path) -> Result<()> {
    anyhow::ensure!(source_dir.is_dir(), "media.source_dir is not a dir: {}", source_dir.display());
    Ok(())
}

pub fn check_library(temp_dir: &Path, library_dir: &Path) -> Result<()> {
    for (key, p) in [("media.temp_dir", temp_dir), ("media.library_dir", library_dir)] {
        if p.exists() {
            anyhow::ensure!(p.is_dir(), "{} is not a dir: {}", key, p.display());
        }
    }
    anyhow::ensure!(temp_dir != library_dir, "media.temp_dir and media.library_dir must differ");
    Ok(())
}

pub fn check_chunk_size(chunk_size: usize) -> Result<()> {
    anyhow::ensure!(chunk_size >= 512, "media.chunk_size too small; set >= 512 bytes");
    Ok(())
}
