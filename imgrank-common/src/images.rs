//! Image folder enumeration
//!
//! The image folder is the only index: eligible images are whatever files
//! are present when asked, filtered by extension and hidden-file naming.

use crate::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Extensions (lowercase) accepted as rankable images
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

/// Whether a file name denotes an eligible image
///
/// Hidden files (leading `.`, which covers macOS `._` resource forks) are
/// never eligible.
pub fn is_eligible_image(name: &str) -> bool {
    if name.starts_with('.') {
        return false;
    }

    match Path::new(name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// List eligible image file names in `dir`, sorted by name
///
/// A missing folder is treated like an empty one.
pub fn list_eligible_images(dir: &Path) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Image folder not found: {}", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry?;
        // Follows symlinks, so linked images count as files
        if !entry.path().is_file() {
            continue;
        }
        // Non-UTF-8 names cannot round-trip through JSON, skip them
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if is_eligible_image(&name) {
            images.push(name);
        }
    }

    images.sort();
    Ok(images)
}

/// Resolve a requested file name to a file inside `dir`
///
/// Returns `None` for names that could escape the folder or that do not
/// name an existing regular file.
pub fn resolve_image_path(dir: &Path, filename: &str) -> Option<PathBuf> {
    if filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0')
    {
        return None;
    }

    let path = dir.join(filename);
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}
