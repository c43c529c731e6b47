//! Width-driven resizing

use std::fmt;
use std::str::FromStr;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScaledError};
use crate::processing::validation::validate_output_dimensions;

/// Available resize filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    /// Nearest neighbor (fastest, lowest quality)
    Nearest,
    /// Triangle (linear interpolation)
    Triangle,
    /// Catmull-Rom cubic spline
    CatmullRom,
    /// Gaussian blur
    Gaussian,
    /// Lanczos with radius 3
    Lanczos3,
}

impl Default for FilterType {
    fn default() -> Self {
        Self::CatmullRom
    }
}

impl From<FilterType> for image::imageops::FilterType {
    fn from(filter: FilterType) -> Self {
        match filter {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Triangle => image::imageops::FilterType::Triangle,
            FilterType::CatmullRom => image::imageops::FilterType::CatmullRom,
            FilterType::Gaussian => image::imageops::FilterType::Gaussian,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

impl FilterType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Triangle => "triangle",
            Self::CatmullRom => "catmull-rom",
            Self::Gaussian => "gaussian",
            Self::Lanczos3 => "lanczos3",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterType {
    type Err = ScaledError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "triangle" | "linear" => Ok(Self::Triangle),
            "catmull-rom" | "catmullrom" | "bicubic" => Ok(Self::CatmullRom),
            "gaussian" => Ok(Self::Gaussian),
            "lanczos3" | "lanczos" => Ok(Self::Lanczos3),
            other => Err(ScaledError::config(format!("Unknown filter: {}", other))),
        }
    }
}

/// Height that keeps the aspect ratio at `target_width`.
///
/// Truncates toward zero, so very flat images can come out as 0.
pub fn calculate_height(original_width: u32, original_height: u32, target_width: u32) -> u64 {
    u64::from(original_height) * u64::from(target_width) / u64::from(original_width.max(1))
}

/// Calculate output dimensions for a width-driven resize
pub fn calculate_dimensions(
    original_width: u32,
    original_height: u32,
    target_width: u32,
) -> Result<(u32, u32)> {
    if target_width == 0 {
        return Err(ScaledError::invalid_width(target_width.to_string()));
    }
    if original_width == 0 {
        return Err(ScaledError::unsupported_dimensions(
            target_width,
            0,
            "the source image has zero width",
        ));
    }

    let height = calculate_height(original_width, original_height, target_width);
    validate_output_dimensions(target_width, height)?;

    // Bounded by MAX_DIMENSION once validated
    Ok((target_width, height as u32))
}

/// Image resizer that scales to a fixed width
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResizer {
    filter: FilterType,
}

impl ImageResizer {
    /// Create a new resizer with the default filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resizer with a custom filter
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    /// Resize `image` to `target_width`, deriving the height from its aspect ratio.
    ///
    /// The input is left untouched; the result is always a new buffer.
    pub fn resize(&self, image: &DynamicImage, target_width: u32) -> Result<DynamicImage> {
        let (width, height) = calculate_dimensions(image.width(), image.height(), target_width)?;

        debug!(
            "Resizing {}x{} -> {}x{} using {}",
            image.width(),
            image.height(),
            width,
            height,
            self.filter
        );

        Ok(image.resize_exact(width, height, self.filter.into()))
    }
}

/// Resize with the default filter
pub fn resize(image: &DynamicImage, target_width: u32) -> Result<DynamicImage> {
    ImageResizer::new().resize(image, target_width)
}
