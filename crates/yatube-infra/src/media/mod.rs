//! Media storage for uploaded post images.
//!
//! Files are stored as `posts/<uuid>.<ext>`; the extension comes from the
//! client file name when it has a usable one.

mod local;
mod memory;

pub use local::LocalMediaStorage;
pub use memory::InMemoryMediaStorage;

use yatube_core::forms::UploadedFile;
use yatube_core::ports::MediaError;

const UPLOAD_DIR: &str = "posts";

/// Fresh media-relative path for an upload.
fn new_media_path(file: &UploadedFile) -> String {
    let id = uuid::Uuid::new_v4().simple();
    match file.extension() {
        Some(ext) => format!("{UPLOAD_DIR}/{id}.{ext}"),
        None => format!("{UPLOAD_DIR}/{id}"),
    }
}

/// Reject absolute paths and anything that could climb out of the media root.
fn check_media_path(path: &str) -> Result<(), MediaError> {
    let unsafe_path = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");
    if unsafe_path {
        return Err(MediaError::InvalidPath(path.to_string()));
    }
    Ok(())
}
