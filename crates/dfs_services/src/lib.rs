mod classify;
mod error;
mod facade;
mod infra;
mod mapper;
mod memory;
#[cfg(test)]
mod mock;
mod path_validation;
mod stream;

pub use classify::*;
pub use error::*;
pub use facade::*;
pub use infra::*;
pub use mapper::*;
pub use memory::*;
pub use path_validation::*;
pub use stream::*;
