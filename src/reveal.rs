//! Open a folder in the platform file manager

use std::path::Path;
use tracing::info;

use crate::error::{Result, ScaledError};
use crate::processing::require_directory;

/// Name of the program the platform uses to open folders
pub fn platform_opener() -> &'static str {
    if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

/// Show `directory` in the platform file manager.
///
/// Returns once the handler has been launched; the window itself is
/// not waited for.
pub fn reveal_folder<P: AsRef<Path>>(directory: P) -> Result<()> {
    let directory = directory.as_ref();
    require_directory(directory)?;

    info!("Opening {:?} with {}", directory, platform_opener());

    open::that_detached(directory).map_err(|e| ScaledError::RevealError {
        path: directory.to_path_buf(),
        message: e.to_string(),
    })
}
