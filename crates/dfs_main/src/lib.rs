mod cli;
mod log;

pub use cli::*;
pub use log::*;
