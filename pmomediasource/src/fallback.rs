//! On-device fallback playlist
//!
//! When the remote listing is unreachable or empty, the provider falls back
//! to a local YAML file with the same entry shape as the endpoint:
//!
//! ```yaml
//! - url: "https://cdn.example.com/welcome.jpg"
//!   type: image
//!   durationInSeconds: 5
//! - url: "https://cdn.example.com/spot.mp4"
//!   type: video
//! ```

use crate::error::Result;
use crate::models::{MediaDescriptor, MediaItemEntry};
use std::path::Path;

/// Load the fallback playlist from a YAML file
///
/// A missing file yields an empty playlist rather than an error: the
/// fallback is best-effort, and an empty result is the caller's problem.
pub fn load_fallback(path: &Path) -> Result<Vec<MediaDescriptor>> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Fallback playlist file not found");
        return Ok(Vec::new());
    }

    let data = std::fs::read_to_string(path)?;
    let entries: Vec<MediaItemEntry> = serde_yaml::from_str(&data)?;
    tracing::info!(path = %path.display(), count = entries.len(), "Loaded fallback playlist");

    Ok(entries
        .into_iter()
        .map(MediaItemEntry::into_descriptor)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_load_fallback_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            "- url: \"https://example.com/a.jpg\"\n  type: image\n  durationInSeconds: 7\n- url: \"https://example.com/b.mp4\"\n  type: video"
        )
        .unwrap();

        let playlist = load_fallback(file.path()).unwrap();
        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist[0].duration(), Duration::from_secs(7));
        assert_eq!(playlist[1].kind(), MediaKind::Video);
    }

    #[test]
    fn test_missing_file_yields_empty_playlist() {
        let playlist = load_fallback(Path::new("/nonexistent/playlist.yaml")).unwrap();
        assert!(playlist.is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "url: not-a-list").unwrap();
        assert!(load_fallback(file.path()).is_err());
    }
}
