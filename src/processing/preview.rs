//! Folder preview: what a batch would pick up and what it would write

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::config::NamingConfig;
use crate::error::Result;
use crate::processing::discovery::list_images;
use crate::processing::resize::calculate_dimensions;

/// Bounding box for preview thumbnails
pub const THUMBNAIL_SIZE: u32 = 100;

/// One listed image with its header dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    pub file_name: String,
    /// Source size, when the header could be read
    pub dimensions: Option<(u32, u32)>,
    /// Size of a thumbnail fitted inside `THUMBNAIL_SIZE`
    pub thumbnail: Option<(u32, u32)>,
    /// Output name and size for the requested width
    pub output: Option<PlannedOutput>,
    /// Why the header could not be read, or why the width cannot be applied
    pub error: Option<String>,
}

/// What a batch would write for one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedOutput {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// Fit `width x height` inside a square box, keeping the aspect ratio
pub fn thumbnail_dimensions(width: u32, height: u32, size: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let original_aspect = width as f64 / height as f64;
    if width >= height {
        let new_height = (size as f64 / original_aspect).round() as u32;
        (size, new_height.max(1))
    } else {
        let new_width = (size as f64 * original_aspect).round() as u32;
        (new_width.max(1), size)
    }
}

/// List the images in `directory` with their sizes.
///
/// Unreadable files are kept in the listing with `error` set.
pub fn preview<P: AsRef<Path>>(
    directory: P,
    target_width: Option<u32>,
    naming: &NamingConfig,
) -> Result<Vec<PreviewEntry>> {
    let entries = list_images(directory)?;

    let previews = entries
        .into_iter()
        .map(|entry| match image::image_dimensions(&entry.source_path) {
            Ok((width, height)) => {
                let planned = target_width.map(|target| calculate_dimensions(width, height, target));
                let (output, error) = match planned {
                    Some(Ok((out_width, out_height))) => (
                        Some(PlannedOutput {
                            file_name: naming.output_file_name(&entry.file_name),
                            width: out_width,
                            height: out_height,
                        }),
                        None,
                    ),
                    Some(Err(e)) => (None, Some(e.user_message())),
                    None => (None, None),
                };

                PreviewEntry {
                    thumbnail: Some(thumbnail_dimensions(width, height, THUMBNAIL_SIZE)),
                    dimensions: Some((width, height)),
                    file_name: entry.file_name,
                    output,
                    error,
                }
            }
            Err(e) => {
                debug!("Cannot read header of {:?}: {}", entry.source_path, e);
                PreviewEntry {
                    file_name: entry.file_name,
                    dimensions: None,
                    thumbnail: None,
                    output: None,
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    Ok(previews)
}
