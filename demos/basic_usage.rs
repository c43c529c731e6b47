//! Basic usage of the Scaled library
//!
//! Run with `cargo run --example basic_usage -- <input dir> <output dir> <width>`.

use scaled::{init, BatchResizer, CancelFlag, ResizeRequest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (input, output, width) = match args.as_slice() {
        [input, output, width] => (input, output, width),
        _ => {
            eprintln!("usage: basic_usage <input dir> <output dir> <width>");
            std::process::exit(1);
        }
    };

    // Typed width is parsed the same way the CLI parses it
    let request = ResizeRequest::from_user_input(input, output, width)?;
    let cancel = CancelFlag::new();

    let outcome = BatchResizer::new().run_batch(
        &request,
        |done, total| println!("  {}/{}", done, total),
        || cancel.is_cancelled(),
    )?;

    println!("{}", outcome.summary_message());
    for failure in &outcome.failures {
        println!("  {}: {}", failure.file_name, failure.message);
    }

    Ok(())
}
