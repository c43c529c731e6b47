//! Core batch resize pipeline: list, resize, write

use std::path::{Path, PathBuf};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ResizeOptions, ResizeRequest};
use crate::error::{ErrorContext, Result};
use crate::progress::{BatchObserver, BatchState, FnObserver};

pub mod discovery;
pub mod formats;
pub mod preview;
pub mod resize;
pub mod validation;

pub use discovery::*;
pub use formats::*;
pub use preview::*;
pub use resize::*;
pub use validation::*;

/// One image that could not be resized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub file_name: String,
    pub message: String,
}

impl ItemFailure {
    pub fn new(file_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            message: message.into(),
        }
    }
}

/// Result of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResizeOutcome {
    /// Images found in the input folder
    pub total: usize,

    /// Images written successfully
    pub processed: usize,

    /// Stopped early by the cancellation predicate
    pub cancelled: bool,

    /// Per-image failures, in processing order
    pub failures: Vec<ItemFailure>,
}

impl ResizeOutcome {
    /// Images attempted, successful or not
    pub fn attempted(&self) -> usize {
        self.processed + self.failures.len()
    }

    /// Finished every image without a failure
    pub fn is_clean(&self) -> bool {
        !self.cancelled && self.failures.is_empty()
    }

    /// Text a front end shows when the run ends
    pub fn summary_message(&self) -> String {
        if self.cancelled {
            format!(
                "Resizing was cancelled after {} of {} images.",
                self.attempted(),
                self.total
            )
        } else if self.failures.is_empty() {
            "Images were resized successfully.".to_string()
        } else {
            format!(
                "Resized {} of {} images; {} failed.",
                self.processed,
                self.total,
                self.failures.len()
            )
        }
    }
}

/// Runs the list, resize, write pipeline on the calling thread
#[derive(Debug, Clone, Default)]
pub struct BatchResizer {
    options: ResizeOptions,
    resizer: ImageResizer,
}

impl BatchResizer {
    /// Create a batch resizer with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a batch resizer with the given options
    pub fn with_options(options: ResizeOptions) -> Self {
        Self {
            resizer: ImageResizer::with_filter(options.filter),
            options,
        }
    }

    pub fn options(&self) -> &ResizeOptions {
        &self.options
    }

    /// List supported images in `directory`
    pub fn list_images<P: AsRef<Path>>(&self, directory: P) -> Result<Vec<ImageEntry>> {
        list_images(directory)
    }

    /// Resize a decoded image to `target_width`
    pub fn resize(&self, image: &image::DynamicImage, target_width: u32) -> Result<image::DynamicImage> {
        self.resizer.resize(image, target_width)
    }

    /// Run a batch, reporting through plain callbacks.
    ///
    /// `on_progress(attempted, total)` runs after every image;
    /// `is_cancelled()` is polled before every image.
    pub fn run_batch<P, C>(
        &self,
        request: &ResizeRequest,
        on_progress: P,
        is_cancelled: C,
    ) -> Result<ResizeOutcome>
    where
        P: FnMut(usize, usize),
        C: FnMut() -> bool,
    {
        let mut observer = FnObserver::new(on_progress, is_cancelled);
        self.run_with_observer(request, &mut observer)
    }

    /// Run a batch, reporting to `observer`.
    ///
    /// Batch-level problems (bad width, missing folder) are returned as
    /// errors before any image is opened. Per-image problems are collected
    /// in the outcome and the batch moves on.
    pub fn run_with_observer<O>(&self, request: &ResizeRequest, observer: &mut O) -> Result<ResizeOutcome>
    where
        O: BatchObserver + ?Sized,
    {
        validate_request(request)?;
        self.options.validate()?;

        observer.on_state(BatchState::Enumerating);
        let entries = self.list_images(&request.input_directory)?;
        let total = entries.len();

        info!(
            "Resizing {} images from {:?} into {:?} at width {}",
            total, request.input_directory, request.output_directory, request.target_width
        );

        let mut outcome = ResizeOutcome {
            total,
            ..Default::default()
        };
        observer.on_state(BatchState::Processing { completed: 0, total });

        for (index, entry) in entries.iter().enumerate() {
            if observer.is_cancelled() {
                info!("Cancelled before {} ({}/{})", entry.file_name, index, total);
                outcome.cancelled = true;
                break;
            }

            observer.on_item_started(entry);

            match self.process_entry(entry, request) {
                Ok(output_path) => {
                    debug!("Wrote {:?}", output_path);
                    outcome.processed += 1;
                    observer.on_item_finished(entry, None);
                }
                Err(e) => {
                    warn!("Failed to resize {}: {}", entry.file_name, e);
                    let failure = ItemFailure::new(&entry.file_name, e.user_message());
                    observer.on_item_finished(entry, Some(&failure));
                    outcome.failures.push(failure);
                }
            }

            let completed = index + 1;
            observer.on_state(BatchState::Processing { completed, total });
            observer.on_progress(completed, total);
        }

        observer.on_state(if outcome.cancelled {
            BatchState::Cancelled
        } else {
            BatchState::Completed
        });

        Ok(outcome)
    }

    /// Open, resize and write one image, returning the written path
    fn process_entry(&self, entry: &ImageEntry, request: &ResizeRequest) -> Result<PathBuf> {
        let image = load_image(&entry.source_path)?;
        let resized = self.resize(&image, request.target_width)?;
        // The decoded source is released before encoding starts
        drop(image);

        let output_path = request.output_path_for(&entry.file_name, &self.options.naming);
        save_image(&resized, &output_path)?;
        Ok(output_path)
    }
}

/// Open and decode an image file
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<image::DynamicImage> {
    let path = path.as_ref();
    debug!("Loading image: {:?}", path);

    let image = image::io::Reader::open(path)
        .map_err(image::ImageError::IoError)
        .and_then(|reader| reader.with_guessed_format().map_err(image::ImageError::IoError))
        .and_then(|reader| reader.decode())
        .decode_context(path)?;

    debug!("Loaded image: {}x{}", image.width(), image.height());
    Ok(image)
}

/// Encode `image` to `output_path`, replacing any existing file
pub fn save_image<P: AsRef<Path>>(image: &image::DynamicImage, output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    debug!("Saving image: {:?}", output_path);

    let format = output_path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(format_for_name);

    let saved = match format {
        Some(format) => image.save_with_format(output_path, format),
        None => image.save(output_path),
    };
    saved.write_context(output_path)
}
