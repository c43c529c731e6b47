//! Folder listing

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, ScaledError};
use crate::processing::formats::has_supported_extension;

/// One supported image found in the input folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageEntry {
    pub file_name: String,
    pub source_path: PathBuf,
}

impl ImageEntry {
    pub fn new<P: Into<PathBuf>>(file_name: impl Into<String>, source_path: P) -> Self {
        Self {
            file_name: file_name.into(),
            source_path: source_path.into(),
        }
    }
}

/// List the supported images directly inside `directory`.
///
/// Entries come back in directory-listing order. Subdirectories are
/// neither descended into nor returned, even when their name matches.
pub fn list_images<P: AsRef<Path>>(directory: P) -> Result<Vec<ImageEntry>> {
    let directory = directory.as_ref();

    if !directory.is_dir() {
        return Err(ScaledError::directory_not_found(directory));
    }

    let mut entries = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", directory, e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            debug!("Skipping non UTF-8 file name: {:?}", entry.file_name());
            continue;
        };

        if has_supported_extension(file_name) {
            entries.push(ImageEntry::new(file_name, entry.path()));
        }
    }

    debug!("Found {} images in {:?}", entries.len(), directory);
    Ok(entries)
}
