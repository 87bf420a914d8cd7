//! Destination path resolution for media items.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::constants::TEMP_SUFFIX;
use super::error::DownloadError;
use crate::media::MediaItem;

/// Computes `<directory>/<id>.<ext>` for a media item.
///
/// Both the id and the extension come from the manifest and are sanitized,
/// so the result is always a direct child of `item.directory`.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidMimeType`] when the MIME type has no
/// usable subtype.
pub fn destination_for(item: &MediaItem) -> Result<PathBuf, DownloadError> {
    let extension = sanitize_path_segment(file_extension(&item.mime_type)?);
    let stem = sanitize_path_segment(&item.id);
    Ok(item.directory.join(format!("{stem}.{extension}")))
}

/// Extracts the file extension from a MIME type (`image/png` → `png`).
///
/// Parameters after `;` are ignored.
///
/// # Errors
///
/// Fails unless the type splits into exactly two non-empty `/` parts.
pub fn file_extension(mime_type: &str) -> Result<&str, DownloadError> {
    let essence = mime_type.split(';').next().unwrap_or("").trim();
    let mut parts = essence.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(kind), Some(subtype), None) if !kind.is_empty() && !subtype.is_empty() => {
            Ok(subtype)
        }
        _ => Err(DownloadError::invalid_mime_type(mime_type)),
    }
}

/// Sibling temp path used while the transfer is in progress.
#[must_use]
pub fn temp_path_for(destination: &Path) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Makes a string safe to use as a single directory or file name.
///
/// Path separators, characters reserved on common filesystems, and control
/// characters become `_`. Leading/trailing whitespace and dots are trimmed.
#[must_use]
pub fn sanitize_path_segment(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim().trim_matches('.').trim();
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, mime: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            url: format!("https://example.com/{id}"),
            mime_type: mime.to_string(),
            directory: PathBuf::from("/downloads"),
        }
    }

    #[test]
    fn test_destination_for_uses_subtype_as_extension() {
        let dest = destination_for(&item("42", "image/jpeg")).unwrap();
        assert_eq!(dest, PathBuf::from("/downloads/42.jpeg"));
    }

    #[test]
    fn test_destination_for_invalid_mime() {
        let result = destination_for(&item("42", "jpeg"));
        assert!(matches!(
            result,
            Err(DownloadError::InvalidMimeType { ref mime_type }) if mime_type == "jpeg"
        ));
    }

    #[test]
    fn test_destination_for_stays_inside_directory() {
        use std::path::Component;

        let mut media = item("../../etc/evil", "image/png");
        media.directory = PathBuf::from("/downloads/creator");

        for id in ["../../etc/evil", "..", "a\\..\\b", "/abs/path"] {
            media.id = id.to_string();
            let dest = destination_for(&media).unwrap();
            assert_eq!(dest.parent(), Some(Path::new("/downloads/creator")), "id {id:?}");
            assert!(
                !dest.components().any(|c| c == Component::ParentDir),
                "id {id:?} escaped: {}",
                dest.display()
            );
        }

        media.id = "../../etc/evil".to_string();
        assert_eq!(
            destination_for(&media).unwrap(),
            PathBuf::from("/downloads/creator/_.._etc_evil.png")
        );
    }

    #[test]
    fn test_file_extension_rejects_malformed() {
        assert!(file_extension("").is_err());
        assert!(file_extension("image/").is_err());
        assert!(file_extension("/png").is_err());
        assert!(file_extension("a/b/c").is_err());
    }

    #[test]
    fn test_file_extension_ignores_parameters() {
        assert_eq!(file_extension("video/mp4; codecs=avc1").unwrap(), "mp4");
        assert_eq!(file_extension("image/png").unwrap(), "png");
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let temp = temp_path_for(Path::new("/downloads/42.png"));
        assert_eq!(temp, PathBuf::from("/downloads/42.png.tmp"));
    }

    #[test]
    fn test_sanitize_path_segment() {
        assert_eq!(sanitize_path_segment("Part 1/2: Sketches"), "Part 1_2_ Sketches");
        assert_eq!(sanitize_path_segment("  ..  "), "_");
        assert_eq!(sanitize_path_segment("tab\there"), "tab_here");
        assert_eq!(sanitize_path_segment("Plain"), "Plain");
    }
}
