use std::path::Path;

use walkdir::WalkDir;

use crate::media::Media;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Recursively collect all PNG/JPG files under the source root.
///
/// Unreadable entries are reported and skipped; only the root itself
/// being unreadable aborts the scan.
pub fn scan_tree(source_dir: &Path) -> anyhow::Result<Vec<Media>> {
    let mut media = Vec::new();

    for entry in WalkDir::new(source_dir) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                if e.path() == Some(source_dir) || e.path().is_none() {
                    return Err(e.into());
                }
                eprintln!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_image_file(entry.path()) {
            continue;
        }

        let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
            eprintln!("Skipping non-UTF-8 filename: {}", entry.path().display());
            continue;
        };

        let rel_path = entry
            .path()
            .strip_prefix(source_dir)
            .unwrap_or(entry.path())
            .to_path_buf();

        media.push(Media::new(entry.path().to_path_buf(), rel_path, filename));
    }

    Ok(media)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_filter() {
        assert!(is_image_file(Path::new("a/b/photo.jpg")));
        assert!(is_image_file(Path::new("photo.JPEG")));
        assert!(is_image_file(Path::new("photo.Png")));
        assert!(!is_image_file(Path::new("photo.gif")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }
}
