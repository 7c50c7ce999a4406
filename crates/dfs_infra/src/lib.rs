mod dfs_infra;
mod env;
mod local_cluster;
mod local_fs;
mod session;
mod webhdfs;

pub use dfs_infra::*;
pub use env::*;
pub use local_cluster::*;
pub use local_fs::*;
pub use session::*;
pub use webhdfs::*;
