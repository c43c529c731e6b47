//! Request and option types for a resize batch

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScaledError};
use crate::processing::FilterType;

pub mod naming;
pub use naming::*;

/// One batch worth of user input: where to read, where to write, how wide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeRequest {
    /// Folder the images are read from (never written)
    pub input_directory: PathBuf,

    /// Folder the `Scaled-*` copies are written into
    pub output_directory: PathBuf,

    /// Output width in pixels
    pub target_width: u32,
}

impl ResizeRequest {
    /// Create a request with an already-parsed width
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        input_directory: P,
        output_directory: Q,
        target_width: u32,
    ) -> Result<Self> {
        if !crate::processing::is_valid_width(target_width) {
            return Err(ScaledError::invalid_width(target_width.to_string()));
        }

        Ok(Self {
            input_directory: input_directory.into(),
            output_directory: output_directory.into(),
            target_width,
        })
    }

    /// Create a request from a typed width field
    pub fn from_user_input<P: Into<PathBuf>, Q: Into<PathBuf>>(
        input_directory: P,
        output_directory: Q,
        width_text: &str,
    ) -> Result<Self> {
        let target_width = crate::processing::parse_width(width_text)?;
        Self::new(input_directory, output_directory, target_width)
    }

    /// Destination path for an input file name
    pub fn output_path_for(&self, file_name: &str, naming: &NamingConfig) -> PathBuf {
        self.output_directory.join(naming.output_file_name(file_name))
    }

    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }
}

/// How each image is resampled and named
#[derive(Debug, Clone, Default)]
pub struct ResizeOptions {
    /// Resampling filter
    pub filter: FilterType,

    /// Output file naming
    pub naming: NamingConfig,
}

impl ResizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resampling filter
    pub fn filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Set the naming configuration
    pub fn naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        self.naming.validate()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Pick a level from the CLI verbosity switches
    pub fn from_verbosity(verbose: bool, quiet: bool) -> Self {
        let level = if quiet {
            "error"
        } else if verbose {
            "debug"
        } else {
            "warn"
        };

        Self {
            level: level.to_string(),
            ..Default::default()
        }
    }
}
