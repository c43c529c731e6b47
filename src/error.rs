//! Error types and handling for Scaled

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for Scaled operations
pub type Result<T> = std::result::Result<T, ScaledError>;

/// Main error type for Scaled operations
#[derive(Debug, Error)]
pub enum ScaledError {
    /// Input or output directory is missing or not a directory
    #[error("Directory not found: {path:?}")]
    DirectoryNotFound { path: PathBuf },

    /// Target width is non-numeric or not positive
    #[error("Invalid width: {input:?} (expected a positive integer)")]
    InvalidWidth { input: String },

    /// Source image could not be opened or decoded
    #[error("Failed to decode {file:?}: {source}")]
    DecodeError {
        file: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Resized image could not be written
    #[error("Failed to write {file:?}: {source}")]
    WriteError {
        file: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Output folder resolves to the input folder
    #[error("Output folder is the input folder: {path:?}")]
    SameDirectory { path: PathBuf },

    /// Computed output size cannot be produced
    #[error("Cannot resize to {width}x{height}: {reason}")]
    UnsupportedDimensions { width: u32, height: u64, reason: String },

    /// Option values that cannot be used
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Platform handler could not open a folder
    #[error("Could not open {path:?}: {message}")]
    RevealError { path: PathBuf, message: String },
}

impl ScaledError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new directory-not-found error
    pub fn directory_not_found<P: AsRef<Path>>(path: P) -> Self {
        Self::DirectoryNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a new invalid width error from the raw user input
    pub fn invalid_width<S: Into<String>>(input: S) -> Self {
        Self::InvalidWidth {
            input: input.into(),
        }
    }

    /// Create a new same-directory error
    pub fn same_directory<P: AsRef<Path>>(path: P) -> Self {
        Self::SameDirectory {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a new unsupported output size error
    pub fn unsupported_dimensions<S: Into<String>>(width: u32, height: u64, reason: S) -> Self {
        Self::UnsupportedDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Create a new decode error
    pub fn decode<P: AsRef<Path>>(file: P, source: image::ImageError) -> Self {
        Self::DecodeError {
            file: file.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a new write error
    pub fn write<P: AsRef<Path>>(file: P, source: image::ImageError) -> Self {
        Self::WriteError {
            file: file.as_ref().to_path_buf(),
            source,
        }
    }

    /// Check if this error aborts the whole batch before any image is touched
    pub fn is_batch_level(&self) -> bool {
        match self {
            Self::DirectoryNotFound { .. }
            | Self::SameDirectory { .. }
            | Self::InvalidWidth { .. } => true,

            // Recorded against a single image, the batch moves on
            Self::DecodeError { .. }
            | Self::WriteError { .. }
            | Self::UnsupportedDimensions { .. } => false,

            Self::ConfigError { .. }
            | Self::RevealError { .. } => true,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::DirectoryNotFound { path }
            | Self::SameDirectory { path }
            | Self::RevealError { path, .. } => Some(path.as_path()),
            Self::DecodeError { file, .. }
            | Self::WriteError { file, .. } => Some(file.as_path()),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::DirectoryNotFound { path } => {
                format!("Folder does not exist: {}", path.display())
            }
            Self::InvalidWidth { input } => {
                format!("'{}' is not a valid width. Enter a whole number of pixels greater than 0.", input)
            }
            Self::SameDirectory { path } => {
                format!("Choose an output folder other than the input folder: {}", path.display())
            }
            Self::UnsupportedDimensions { width, height, reason } => {
                format!("Cannot resize to {}x{} pixels: {}", width, height, reason)
            }
            Self::DecodeError { source, .. } => {
                format!("Could not read image: {}", source)
            }
            Self::WriteError { source, .. } => {
                format!("Could not save resized image: {}", source)
            }
            other => other.to_string(),
        }
    }
}

/// Error context extension for attaching the file an image operation touched
pub trait ErrorContext<T> {
    /// Map an image error to a decode failure for `file`
    fn decode_context<P: AsRef<Path>>(self, file: P) -> Result<T>;

    /// Map an image error to a write failure for `file`
    fn write_context<P: AsRef<Path>>(self, file: P) -> Result<T>;
}

impl<T> ErrorContext<T> for std::result::Result<T, image::ImageError> {
    fn decode_context<P: AsRef<Path>>(self, file: P) -> Result<T> {
        self.map_err(|e| ScaledError::decode(file, e))
    }

    fn write_context<P: AsRef<Path>>(self, file: P) -> Result<T> {
        self.map_err(|e| ScaledError::write(file, e))
    }
}
