mod block;
mod entry;
mod environment;
mod error;
mod path;
mod policy;
mod stream;

pub use block::*;
pub use entry::*;
pub use environment::*;
pub use error::*;
pub use path::*;
pub use policy::*;
pub use stream::*;
