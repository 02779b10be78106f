use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Photo,
    Video,
    Other,
}

impl MediaType {
    /// Guess from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "tif" | "tiff" | "dng" => MediaType::Photo,
            "mp4" | "mov" => MediaType::Video,
            _ => MediaType::Other,
        }
    }

    pub fn is_transferable(&self) -> bool {
        matches!(self, MediaType::Photo | MediaType::Video)
    }
}

/// Remote file as listed by the aircraft's storage snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    pub name: String,
    pub media_type: MediaType,
    pub size_bytes: u64,
}

impl MediaFile {
    pub fn extension(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(_, ext)| ext).filter(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_drives_media_type() {
        assert_eq!(MediaType::from_extension("JPG"), MediaType::Photo);
        assert_eq!(MediaType::from_extension("mov"), MediaType::Video);
        assert_eq!(MediaType::from_extension("srt"), MediaType::Other);
        assert!(!MediaType::Other.is_transferable());
    }

    #[test]
    fn extension_is_taken_from_the_last_dot() {
        let f = MediaFile { name: "DJI_0001.final.JPG".into(), media_type: MediaType::Photo, size_bytes: 1 };
        assert_eq!(f.extension(), Some("JPG"));
        let g = MediaFile { name: "noext".into(), media_type: MediaType::Other, size_bytes: 1 };
        assert_eq!(g.extension(), None);
    }
}
