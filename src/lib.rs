//! Scaled - Batch Image Resizer
//!
//! Scales every image in a folder to a target width, keeping the aspect
//! ratio, and writes `Scaled-<name>` copies into an output folder.
//!
//! The pipeline is synchronous: one image is decoded, resized and written
//! before the next is opened. Progress and cancellation are reported at
//! image boundaries through callbacks or a [`progress::BatchObserver`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use scaled::{BatchResizer, ResizeRequest};
//!
//! let request = ResizeRequest::from_user_input("photos", "photos-small", "800")?;
//! let outcome = BatchResizer::new().run_batch(
//!     &request,
//!     |done, total| println!("{done}/{total}"),
//!     || false,
//! )?;
//!
//! println!("{}", outcome.summary_message());
//! # Ok::<(), scaled::ScaledError>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod processing;
pub mod progress;
pub mod reveal;

// Re-export commonly used types
pub use config::{LoggingConfig, NamingConfig, ResizeOptions, ResizeRequest};
pub use error::{Result, ScaledError};
pub use processing::{BatchResizer, FilterType, ImageEntry, ItemFailure, ResizeOutcome};
pub use progress::{BatchObserver, BatchState, CancelFlag, ProgressTracker};

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with default settings.
///
/// `RUST_LOG` takes precedence when set. Safe to call more than once;
/// only the first call installs a subscriber.
pub fn init() {
    init_logging(&LoggingConfig::default());
}

/// Initialize logging from a [`LoggingConfig`]
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.json_format {
        tracing::subscriber::set_global_default(builder.json().finish()).is_ok()
    } else {
        tracing::subscriber::set_global_default(builder.finish()).is_ok()
    };

    if installed {
        info!("Scaled v{} initialized", VERSION);
        info!(
            "Image support: PNG {}, JPEG {}, BMP {}, GIF {}",
            image::ImageFormat::Png.can_read(),
            image::ImageFormat::Jpeg.can_read(),
            image::ImageFormat::Bmp.can_read(),
            image::ImageFormat::Gif.can_read(),
        );
    }
}
