//! Output file naming

use serde::{Deserialize, Serialize};
use crate::error::{Result, ScaledError};

/// Prefix prepended to every resized copy
pub const DEFAULT_PREFIX: &str = "Scaled-";

/// File naming configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Prefix added in front of the original file name
    pub prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl NamingConfig {
    /// Generate the output file name for a given input name.
    ///
    /// The original name, extension included, is kept verbatim.
    pub fn output_file_name(&self, input_name: &str) -> String {
        let mut new_name = String::with_capacity(self.prefix.len() + input_name.len());
        new_name.push_str(&self.prefix);
        new_name.push_str(input_name);
        new_name
    }

    /// Validate naming configuration
    pub fn validate(&self) -> Result<()> {
        if self.prefix.contains(['/', '\\', ':', '*', '?', '"', '<', '>', '|']) {
            return Err(ScaledError::config(
                format!("Prefix {:?} contains invalid filename characters", self.prefix)
            ));
        }

        Ok(())
    }
}
