//! Scaled CLI - Batch Image Resizer
//!
//! Resizes every image in a folder to a target width and writes
//! `Scaled-<name>` copies into an output folder.

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, warn};

use scaled::processing::{self, PreviewEntry, SUPPORTED_EXTENSIONS};
use scaled::progress::BatchObserver;
use scaled::reveal::{platform_opener, reveal_folder};
use scaled::{
    init_logging, BatchResizer, BatchState, CancelFlag, FilterType, ImageEntry, ItemFailure,
    LoggingConfig, NamingConfig, ProgressTracker, ResizeOptions, ResizeOutcome, ResizeRequest,
    ScaledError,
};

/// Exit code when at least one image failed
const EXIT_ITEM_FAILURES: i32 = 2;

/// Scaled - Batch Image Resizer
#[derive(Parser)]
#[command(
    name = "scaled",
    version,
    about = "Resize every image in a folder to a target width",
    long_about = "Scaled resizes every PNG, JPEG, BMP and GIF image in a folder to a target \
                  width, keeping the aspect ratio, and writes the results as Scaled-<name> \
                  into an output folder. Press Ctrl-C to stop after the current image."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Folder containing the images to resize
    #[arg(short, long, value_name = "DIR", env = "SCALED_INPUT")]
    input: Option<PathBuf>,

    /// Folder the resized copies are written to
    #[arg(short, long, value_name = "DIR", env = "SCALED_OUTPUT")]
    output: Option<PathBuf>,

    /// New width in pixels
    #[arg(short, long, value_name = "PIXELS", env = "SCALED_WIDTH")]
    width: Option<String>,

    /// Resampling filter
    #[arg(short, long, value_enum, default_value_t = CliFilter::CatmullRom, env = "SCALED_FILTER")]
    filter: CliFilter,

    /// Open the output folder when done
    #[arg(long)]
    reveal: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'Q', long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// List the images a batch would resize, with their sizes
    Preview {
        /// Folder to list
        #[arg(value_name = "DIR")]
        directory: PathBuf,

        /// Show planned output sizes for this width
        #[arg(short, long, value_name = "PIXELS")]
        width: Option<String>,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show supported formats and filters
    Info,
}

/// CLI-compatible filter enum
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<CliFilter> for FilterType {
    fn from(filter: CliFilter) -> Self {
        match filter {
            CliFilter::Nearest => FilterType::Nearest,
            CliFilter::Triangle => FilterType::Triangle,
            CliFilter::CatmullRom => FilterType::CatmullRom,
            CliFilter::Gaussian => FilterType::Gaussian,
            CliFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_verbosity(cli.verbose, cli.quiet);
    logging.json_format = matches!(cli.log_format, LogFormat::Json);
    init_logging(&logging);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", style("Error").red().bold(), error_message(&e));
            1
        }
    };

    process::exit(code);
}

/// Prefer the friendly text for library errors
fn error_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ScaledError>() {
        Some(e) => e.user_message(),
        None => format!("{:#}", error),
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    if let Some(command) = cli.command {
        handle_subcommand(command)?;
        return Ok(0);
    }

    let (input, output, width) = match (cli.input, cli.output, cli.width) {
        (Some(input), Some(output), Some(width)) => (input, output, width),
        _ => bail!("--input, --output and --width are required (run with --help for usage)"),
    };

    let request = ResizeRequest::from_user_input(input, output, &width)?;
    let options = ResizeOptions::new().filter(cli.filter.into());
    processing::validate_request(&request)?;

    let cancel = CancelFlag::new();
    spawn_interrupt_listener(cancel.clone());

    let progress = (!cli.json && !cli.quiet).then(create_progress_bar);
    let reporter = ConsoleReporter::new(progress, cancel);

    let outcome = run_batch_processing(request.clone(), options, reporter).await?;

    if cli.json {
        print_json(&request, &outcome)?;
    } else {
        print_summary(&outcome.outcome, outcome.elapsed);
    }

    if cli.reveal {
        if let Err(e) = reveal_folder(&request.output_directory) {
            warn!("{}", e);
            eprintln!("{}: {}", style("Warning").yellow().bold(), e.user_message());
        }
    }

    Ok(if outcome.outcome.failures.is_empty() { 0 } else { EXIT_ITEM_FAILURES })
}

/// Handle subcommands
fn handle_subcommand(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Preview { directory, width, json } => {
            let width = width.as_deref().map(processing::parse_width).transpose()?;
            show_preview(&directory, width, json)?;
        }
        Commands::Info => show_info(),
    }
    Ok(())
}

/// Stop the batch at the next image boundary on Ctrl-C
fn spawn_interrupt_listener(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current image");
            cancel.cancel();
        }
    });
}

fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let template = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}");
    match template {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => debug!("Falling back to default progress style: {}", e),
    }
    pb
}

/// Drives the progress bar and tracker from the batch loop
struct ConsoleReporter {
    tracker: ProgressTracker,
    progress: Option<ProgressBar>,
    cancel: CancelFlag,
}

impl ConsoleReporter {
    fn new(progress: Option<ProgressBar>, cancel: CancelFlag) -> Self {
        Self {
            tracker: ProgressTracker::new(),
            progress,
            cancel,
        }
    }
}

impl BatchObserver for ConsoleReporter {
    fn on_state(&mut self, state: BatchState) {
        self.tracker.on_state(state);

        if let Some(pb) = &self.progress {
            match state {
                BatchState::Processing { completed: 0, total } => pb.set_length(total as u64),
                BatchState::Completed => pb.finish_with_message("done"),
                BatchState::Cancelled => pb.abandon_with_message("cancelled"),
                _ => {}
            }
        }
    }

    fn on_item_started(&mut self, entry: &ImageEntry) {
        self.tracker.on_item_started(entry);
        if let Some(pb) = &self.progress {
            pb.set_message(entry.file_name.clone());
        }
    }

    fn on_item_finished(&mut self, entry: &ImageEntry, failure: Option<&ItemFailure>) {
        self.tracker.on_item_finished(entry, failure);
        if let (Some(pb), Some(failure)) = (&self.progress, failure) {
            pb.println(format!(
                "{} {}: {}",
                style("✗").red(),
                failure.file_name,
                failure.message
            ));
        }
    }

    fn on_progress(&mut self, completed: usize, total: usize) {
        self.tracker.on_progress(completed, total);
        if let Some(pb) = &self.progress {
            pb.set_position(completed as u64);
        }
    }

    fn is_cancelled(&mut self) -> bool {
        self.cancel.is_cancelled()
    }
}

struct TimedOutcome {
    outcome: ResizeOutcome,
    elapsed: Duration,
}

/// Run the batch on a blocking worker so Ctrl-C stays responsive
async fn run_batch_processing(
    request: ResizeRequest,
    options: ResizeOptions,
    mut reporter: ConsoleReporter,
) -> anyhow::Result<TimedOutcome> {
    let resizer = BatchResizer::with_options(options);

    let (result, reporter) = tokio::task::spawn_blocking(move || {
        let result = resizer.run_with_observer(&request, &mut reporter);
        (result, reporter)
    })
    .await
    .context("resize worker stopped unexpectedly")?;

    let outcome = result?;
    let mut tracker = reporter.tracker;
    tracker.finish(&outcome);

    Ok(TimedOutcome {
        outcome,
        elapsed: tracker.state().elapsed_time,
    })
}

#[derive(Serialize)]
struct JsonReport<'a> {
    output_directory: &'a Path,
    target_width: u32,
    #[serde(flatten)]
    outcome: &'a ResizeOutcome,
}

fn print_json(request: &ResizeRequest, outcome: &TimedOutcome) -> anyhow::Result<()> {
    let report = JsonReport {
        output_directory: &request.output_directory,
        target_width: request.target_width,
        outcome: &outcome.outcome,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Print processing summary
fn print_summary(outcome: &ResizeOutcome, duration: Duration) {
    println!();
    if outcome.is_clean() {
        println!("{}: {}", style("Success").green().bold(), outcome.summary_message());
    } else if outcome.cancelled {
        println!("{}: {}", style("Cancelled").yellow().bold(), outcome.summary_message());
    } else {
        println!("{}: {}", style("Finished").yellow().bold(), outcome.summary_message());
    }

    println!("  {}: {}", style("Resized").green(), outcome.processed);
    if !outcome.failures.is_empty() {
        println!("  {}: {}", style("Failed").red(), outcome.failures.len());
        for failure in &outcome.failures {
            println!("    {} {}", style(&failure.file_name).bold(), failure.message);
        }
    }
    println!("  {}: {:.2}s", style("Duration").blue(), duration.as_secs_f64());
}

fn show_preview(directory: &Path, width: Option<u32>, json: bool) -> anyhow::Result<()> {
    let entries = processing::preview(directory, width, &NamingConfig::default())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No images found in {}", directory.display());
        return Ok(());
    }

    println!("{} images in {}", style(entries.len()).bold(), directory.display());
    for entry in &entries {
        println!("  {}", preview_line(entry));
    }
    Ok(())
}

fn preview_line(entry: &PreviewEntry) -> String {
    match (entry.dimensions, &entry.output, &entry.error) {
        (Some((w, h)), Some(out), _) => format!(
            "{} {}x{} -> {} {}x{}",
            style(&entry.file_name).cyan(),
            w,
            h,
            out.file_name,
            out.width,
            out.height
        ),
        (Some((w, h)), None, Some(error)) => format!(
            "{} {}x{} -> {}",
            style(&entry.file_name).cyan(),
            w,
            h,
            style(error).red()
        ),
        (Some((w, h)), None, None) => format!("{} {}x{}", style(&entry.file_name).cyan(), w, h),
        (None, _, Some(error)) => format!("{} {}", style(&entry.file_name).red(), error),
        (None, _, None) => entry.file_name.clone(),
    }
}

/// Show supported formats and filters
fn show_info() {
    println!("{}", style("Scaled").bold());
    println!("{}: {}", style("Version").bold(), scaled::VERSION);
    println!();

    println!("{}", style("Picked up (case-sensitive):").bold());
    println!("  {}", SUPPORTED_EXTENSIONS.join(" "));
    println!();

    println!("{}", style("Filters:").bold());
    for filter in CliFilter::value_variants() {
        let filter = FilterType::from(*filter);
        let marker = if filter == FilterType::default() { " (default)" } else { "" };
        println!("  {}{}", filter, marker);
    }
    println!();

    println!("{}: {}", style("Folder opener").bold(), platform_opener());
}
