use std::path::PathBuf;

use crate::date::ExtractedDate;

#[derive(Debug, Clone)]
pub struct Media {
    /// Full path to the source file
    pub source: PathBuf,
    /// Path relative to the source root, mirrored under the destination root
    pub rel_path: PathBuf,
    /// Just the filename
    pub filename: String,
    /// Date extracted from the filename
    pub date: Option<ExtractedDate>,
}

impl Media {
    pub fn new(source: PathBuf, rel_path: PathBuf, filename: String) -> Self {
        Self {
            source,
            rel_path,
            filename,
            date: None,
        }
    }
}
