use std::cell::Cell;
use std::fs;
use std::path::Path;

use image::{DynamicImage, ImageBuffer, Rgb};
use tempfile::TempDir;

use scaled::processing::MAX_DIMENSION;
use scaled::progress::BatchObserver;
use scaled::{
    BatchResizer, BatchState, CancelFlag, FilterType, ImageEntry, ItemFailure, ProgressTracker,
    ResizeOptions, ResizeRequest, ScaledError,
};

fn write_image(dir: &Path, name: &str, width: u32, height: u32) {
    let img = ImageBuffer::from_fn(width, height, |x, y| Rgb([(x * 7) as u8, (y * 3) as u8, 200]));
    DynamicImage::ImageRgb8(img).save(dir.join(name)).unwrap();
}

fn write_corrupt(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"\x89PNG but then garbage").unwrap();
}

fn scaled_outputs(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|n| n.starts_with("Scaled-"))
        .collect();
    names.sort();
    names
}

struct Dirs {
    input: TempDir,
    output: TempDir,
}

impl Dirs {
    fn new() -> Self {
        Self {
            input: TempDir::new().unwrap(),
            output: TempDir::new().unwrap(),
        }
    }

    fn request(&self, width: u32) -> ResizeRequest {
        ResizeRequest::new(self.input.path(), self.output.path(), width).unwrap()
    }
}

#[test]
fn empty_input_directory() {
    let dirs = Dirs::new();
    let mut progress_calls = 0;

    let outcome = BatchResizer::new()
        .run_batch(&dirs.request(100), |_, _| progress_calls += 1, || false)
        .unwrap();

    assert_eq!(outcome.processed, 0);
    assert!(!outcome.cancelled);
    assert!(outcome.failures.is_empty());
    assert_eq!(progress_calls, 0);
}

#[test]
fn cancelled_before_first_item() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "a.png", 10, 10);
    write_image(dirs.input.path(), "b.png", 10, 10);

    let outcome = BatchResizer::new()
        .run_batch(&dirs.request(5), |_, _| {}, || true)
        .unwrap();

    assert_eq!(outcome.processed, 0);
    assert!(outcome.cancelled);
    assert!(scaled_outputs(dirs.output.path()).is_empty());
}

#[test]
fn cancelled_after_third_progress_call() {
    let dirs = Dirs::new();
    for i in 0..5 {
        write_image(dirs.input.path(), &format!("img{}.png", i), 20, 10);
    }

    let calls = Cell::new(0usize);
    let outcome = BatchResizer::new()
        .run_batch(
            &dirs.request(8),
            |_, _| calls.set(calls.get() + 1),
            || calls.get() >= 3,
        )
        .unwrap();

    assert_eq!(outcome.processed, 3);
    assert!(outcome.cancelled);
    assert_eq!(calls.get(), 3);
    assert_eq!(scaled_outputs(dirs.output.path()).len(), 3);
}

#[test]
fn cancel_flag_between_items() {
    let dirs = Dirs::new();
    for i in 0..4 {
        write_image(dirs.input.path(), &format!("{}.png", i), 6, 6);
    }

    let flag = CancelFlag::new();
    let outcome = BatchResizer::new()
        .run_batch(
            &dirs.request(3),
            |done, _| {
                if done == 2 {
                    flag.cancel();
                }
            },
            || flag.is_cancelled(),
        )
        .unwrap();

    assert_eq!(outcome.processed, 2);
    assert!(outcome.cancelled);
}

#[test]
fn corrupt_image_does_not_abort_batch() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "first.png", 30, 20);
    write_corrupt(dirs.input.path(), "second.png");
    write_image(dirs.input.path(), "third.png", 30, 20);

    let outcome = BatchResizer::new()
        .run_batch(&dirs.request(15), |_, _| {}, || false)
        .unwrap();

    assert_eq!(outcome.processed, 2);
    assert!(!outcome.cancelled);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].file_name, "second.png");
    assert_eq!(
        scaled_outputs(dirs.output.path()),
        vec!["Scaled-first.png", "Scaled-third.png"]
    );
}

#[test]
fn progress_is_strictly_increasing_to_total() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "a.png", 10, 10);
    write_corrupt(dirs.input.path(), "b.jpg");
    write_image(dirs.input.path(), "c.bmp", 10, 10);

    let mut seen = Vec::new();
    BatchResizer::new()
        .run_batch(&dirs.request(4), |done, total| seen.push((done, total)), || false)
        .unwrap();

    assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn outputs_keep_aspect_ratio_with_truncation() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "tall.png", 100, 299);
    write_image(dirs.input.path(), "wide.jpg", 300, 100);
    write_image(dirs.input.path(), "square.bmp", 64, 64);

    let outcome = BatchResizer::new()
        .run_batch(&dirs.request(50), |_, _| {}, || false)
        .unwrap();
    assert_eq!(outcome.processed, 3);

    let out = dirs.output.path();
    assert_eq!(image::image_dimensions(out.join("Scaled-tall.png")).unwrap(), (50, 149));
    assert_eq!(image::image_dimensions(out.join("Scaled-wide.jpg")).unwrap(), (50, 16));
    assert_eq!(image::image_dimensions(out.join("Scaled-square.bmp")).unwrap(), (50, 50));
}

#[test]
fn rerun_overwrites_outputs() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "a.png", 40, 40);
    let resizer = BatchResizer::new();

    let first = resizer.run_batch(&dirs.request(20), |_, _| {}, || false).unwrap();
    assert_eq!(first.processed, 1);

    let second = resizer.run_batch(&dirs.request(10), |_, _| {}, || false).unwrap();
    assert!(second.is_clean());

    assert_eq!(scaled_outputs(dirs.output.path()), vec!["Scaled-a.png"]);
    assert_eq!(
        image::image_dimensions(dirs.output.path().join("Scaled-a.png")).unwrap(),
        (10, 10)
    );
}

#[test]
fn input_directory_is_left_untouched() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "a.png", 12, 12);
    fs::write(dirs.input.path().join("b.gif.txt"), b"notes").unwrap();
    let before = fs::read(dirs.input.path().join("a.png")).unwrap();

    BatchResizer::new()
        .run_batch(&dirs.request(6), |_, _| {}, || false)
        .unwrap();

    let mut names: Vec<_> = fs::read_dir(dirs.input.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.png", "b.gif.txt"]);
    assert_eq!(fs::read(dirs.input.path().join("a.png")).unwrap(), before);
}

#[test]
fn missing_directories_are_batch_errors() {
    let dirs = Dirs::new();
    let resizer = BatchResizer::new();

    let request = ResizeRequest::new(dirs.input.path().join("nope"), dirs.output.path(), 10).unwrap();
    let err = resizer.run_batch(&request, |_, _| {}, || false).unwrap_err();
    assert!(matches!(err, ScaledError::DirectoryNotFound { .. }));

    let request = ResizeRequest::new(dirs.input.path(), dirs.output.path().join("nope"), 10).unwrap();
    let err = resizer.run_batch(&request, |_, _| {}, || false).unwrap_err();
    assert!(matches!(err, ScaledError::DirectoryNotFound { .. }));
}

#[test]
fn same_input_and_output_folder_is_rejected() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "a.png", 8, 8);
    let resizer = BatchResizer::new();

    let request = ResizeRequest::new(dirs.input.path(), dirs.input.path(), 4).unwrap();
    for _ in 0..2 {
        let err = resizer.run_batch(&request, |_, _| {}, || false).unwrap_err();
        assert!(matches!(err, ScaledError::SameDirectory { .. }));
        assert!(err.is_batch_level());
    }

    let names: Vec<_> = fs::read_dir(dirs.input.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["a.png"]);
}

#[test]
fn oversized_outputs_fail_per_item() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "square.png", 2, 2);
    write_image(dirs.input.path(), "strip.png", MAX_DIMENSION, 1);
    write_image(dirs.input.path(), "tall.png", 1, 2);

    let outcome = BatchResizer::new()
        .run_batch(&dirs.request(MAX_DIMENSION), |_, _| {}, || false)
        .unwrap();

    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.processed, 1);
    assert!(!outcome.cancelled);

    let mut failed: Vec<_> = outcome.failures.iter().map(|f| f.file_name.as_str()).collect();
    failed.sort();
    assert_eq!(failed, vec!["square.png", "tall.png"]);
    assert!(outcome.failures.iter().all(|f| f.message.contains("limited to")));
    assert_eq!(scaled_outputs(dirs.output.path()), vec!["Scaled-strip.png"]);
}

#[test]
fn huge_typed_width_is_rejected_up_front() {
    let dirs = Dirs::new();
    let err = ResizeRequest::from_user_input(dirs.input.path(), dirs.output.path(), "100000").unwrap_err();
    assert!(matches!(err, ScaledError::InvalidWidth { .. }));
}

#[test]
fn too_flat_image_fails_without_stopping_batch() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "banner.png", 1000, 1);
    write_image(dirs.input.path(), "photo.png", 40, 20);

    let outcome = BatchResizer::new()
        .run_batch(&dirs.request(10), |_, _| {}, || false)
        .unwrap();

    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].file_name, "banner.png");
    assert!(outcome.failures[0].message.contains("too flat"));
    assert_eq!(
        image::image_dimensions(dirs.output.path().join("Scaled-photo.png")).unwrap(),
        (10, 5)
    );
}

#[test]
fn unwritable_output_is_recorded_per_item() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "a.png", 8, 8);
    write_image(dirs.input.path(), "b.png", 8, 8);
    // A directory squatting on the output name makes that one write fail
    fs::create_dir(dirs.output.path().join("Scaled-a.png")).unwrap();

    let outcome = BatchResizer::new()
        .run_batch(&dirs.request(4), |_, _| {}, || false)
        .unwrap();

    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].file_name, "a.png");
    assert!(outcome.failures[0].message.contains("save"));
}

#[test]
fn custom_filter_and_prefix() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "a.png", 9, 3);

    let options = ResizeOptions::new()
        .filter(FilterType::Lanczos3)
        .naming(scaled::NamingConfig { prefix: "Small-".to_string() });
    let outcome = BatchResizer::with_options(options)
        .run_batch(&dirs.request(6), |_, _| {}, || false)
        .unwrap();

    assert_eq!(outcome.processed, 1);
    assert_eq!(
        image::image_dimensions(dirs.output.path().join("Small-a.png")).unwrap(),
        (6, 2)
    );
}

/// Records every hook so the state machine can be checked
#[derive(Default)]
struct Recorder {
    states: Vec<BatchState>,
    started: Vec<String>,
    finished: Vec<(String, bool)>,
}

impl BatchObserver for Recorder {
    fn on_state(&mut self, state: BatchState) {
        self.states.push(state);
    }

    fn on_item_started(&mut self, entry: &ImageEntry) {
        self.started.push(entry.file_name.clone());
    }

    fn on_item_finished(&mut self, entry: &ImageEntry, failure: Option<&ItemFailure>) {
        self.finished.push((entry.file_name.clone(), failure.is_none()));
    }

    fn on_progress(&mut self, _completed: usize, _total: usize) {}
}

#[test]
fn observer_sees_state_machine() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "only.png", 4, 2);

    let mut recorder = Recorder::default();
    let outcome = BatchResizer::new()
        .run_with_observer(&dirs.request(2), &mut recorder)
        .unwrap();

    assert_eq!(outcome.processed, 1);
    assert_eq!(
        recorder.states,
        vec![
            BatchState::Enumerating,
            BatchState::Processing { completed: 0, total: 1 },
            BatchState::Processing { completed: 1, total: 1 },
            BatchState::Completed,
        ]
    );
    assert_eq!(recorder.started, vec!["only.png"]);
    assert_eq!(recorder.finished, vec![("only.png".to_string(), true)]);
}

#[test]
fn tracker_follows_a_real_batch() {
    let dirs = Dirs::new();
    write_image(dirs.input.path(), "a.png", 4, 4);
    write_corrupt(dirs.input.path(), "b.png");

    let mut tracker = ProgressTracker::new();
    let outcome = BatchResizer::new()
        .run_with_observer(&dirs.request(2), &mut tracker)
        .unwrap();
    tracker.finish(&outcome);

    let state = tracker.state();
    assert_eq!(state.state, BatchState::Completed);
    assert_eq!(state.total_files, 2);
    assert_eq!(state.completed_files, 1);
    assert_eq!(state.failed_files, 1);
    assert_eq!(state.status_text(), "Completed");
}
