//! # LocalFS
//!
//! A file system abstraction layer over the gateway host's own disk that
//! standardizes error handling for file operations.
//!
//! LocalFS wraps tokio's filesystem operations with consistent error context
//! using anyhow::Context. Each method provides standardized error messages in
//! the format "Failed to [operation] [path]", ensuring uniform error reporting
//! throughout the application while preserving the original error cause.
//!
//! Content is moved in fixed-size chunks (see [`LocalFS::read_chunks`]) and
//! written through [`AtomicFile`], so a reader never observes a half-written
//! target.

mod atomic;
mod chunks;
mod error;
mod meta;
mod write;

pub use atomic::AtomicFile;
pub use error::Error;
pub use meta::LocalEntry;

pub struct LocalFS;
