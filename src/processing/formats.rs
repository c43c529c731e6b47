//! Recognised image file names

/// Suffixes picked up when listing a folder, matched case-sensitively
pub const SUPPORTED_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".bmp", ".gif"];

/// Get supported input extensions
pub fn supported_input_formats() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Check if a file name ends with one of the supported extensions.
///
/// `photo.JPG` does not match.
pub fn has_supported_extension(file_name: &str) -> bool {
    supported_input_formats()
        .iter()
        .any(|ext| file_name.ends_with(ext))
}

/// Get the image crate format for a file name, used when saving
pub fn format_for_name(file_name: &str) -> Option<image::ImageFormat> {
    let (_, ext) = file_name.rsplit_once('.')?;
    image::ImageFormat::from_extension(ext)
}
