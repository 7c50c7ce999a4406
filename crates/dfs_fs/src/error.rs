use std::path::PathBuf;

use thiserror::Error;

/// Error type for file operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("Target already exists: {}", .0.display())]
    TargetExists(PathBuf),

    #[error("Path has no file name: {}", .0.display())]
    MissingFileName(PathBuf),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
