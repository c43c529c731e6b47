//! Checks that run before a batch touches any image

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ResizeRequest;
use crate::error::{Result, ScaledError};

/// Largest output width or height, in pixels
pub const MAX_DIMENSION: u32 = 32_768;

/// Largest output image, in pixels
pub const MAX_IMAGE_PIXELS: u64 = 500_000_000;

/// Parse a typed width field into a positive pixel count.
///
/// Surrounding whitespace is ignored. Anything that is not a whole
/// number in `1..=MAX_DIMENSION` is an `InvalidWidth`.
pub fn parse_width(text: &str) -> Result<u32> {
    match text.trim().parse::<u32>() {
        Ok(width) if is_valid_width(width) => Ok(width),
        _ => Err(ScaledError::invalid_width(text)),
    }
}

/// Width a request may ask for
pub fn is_valid_width(width: u32) -> bool {
    (1..=MAX_DIMENSION).contains(&width)
}

/// Check a computed output size before any buffer is allocated for it
pub fn validate_output_dimensions(width: u32, height: u64) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ScaledError::unsupported_dimensions(
            width,
            height,
            "the image is too flat to keep its aspect ratio at this width",
        ));
    }

    if width > MAX_DIMENSION || height > u64::from(MAX_DIMENSION) {
        return Err(ScaledError::unsupported_dimensions(
            width,
            height,
            format!("each side is limited to {} pixels", MAX_DIMENSION),
        ));
    }

    if u64::from(width) * height > MAX_IMAGE_PIXELS {
        return Err(ScaledError::unsupported_dimensions(
            width,
            height,
            format!("images are limited to {} pixels", MAX_IMAGE_PIXELS),
        ));
    }

    Ok(())
}

/// Ensure `path` names an existing directory
pub fn require_directory<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        Ok(())
    } else {
        Err(ScaledError::directory_not_found(path))
    }
}

/// Batch-level validation of a request
pub fn validate_request(request: &ResizeRequest) -> Result<()> {
    debug!("Validating request: {:?}", request);

    if !is_valid_width(request.target_width) {
        return Err(ScaledError::invalid_width(request.target_width.to_string()));
    }

    require_directory(&request.input_directory)?;
    require_directory(&request.output_directory)?;

    // Outputs must never land in the input folder, however the paths are spelled
    let input = canonical(&request.input_directory)?;
    let output = canonical(&request.output_directory)?;
    if input == output {
        return Err(ScaledError::same_directory(input));
    }

    Ok(())
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .map_err(|_| ScaledError::directory_not_found(path))
}
