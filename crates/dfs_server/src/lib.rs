mod error;
mod routes;
mod server;

pub use error::*;
pub use routes::router;
pub use server::*;
