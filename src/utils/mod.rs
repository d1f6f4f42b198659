pub mod command;
pub mod error;
pub mod json_file;

pub use error::{AppError, AppResult};

/// Returns true if the path exists, without following a trailing symlink.
pub fn path_present(path: &std::path::Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}
