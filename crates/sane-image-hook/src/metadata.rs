//! Rewriting the file record after a successful re-encode.

use sane_image_core::models::{FilePayload, OutputFormat};

/// Point the record at the re-encoded file and set the idempotency marker.
pub fn rewrite_payload(
    payload: &mut FilePayload,
    format: OutputFormat,
    width: u32,
    height: u32,
    size: u64,
) {
    payload.width = Some(width);
    payload.height = Some(height);
    payload.filesize = size;
    payload.media_type = Some(format.media_type().to_string());
    if let Some(name) = payload.filename_download.as_deref() {
        payload.filename_download = Some(replace_extension(name, format.extension()));
    }
    payload.optimized = true;
}

/// Replace the last extension of `filename` with `extension`, or append it when there
/// is none. Dots in directory components do not count.
pub fn replace_extension(filename: &str, extension: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(idx) if !filename[idx + 1..].contains('/') => &filename[..idx],
        _ => filename,
    };
    format!("{}.{}", stem, extension)
}
