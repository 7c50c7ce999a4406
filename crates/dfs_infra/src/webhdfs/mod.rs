mod client;
mod endpoint;
mod response;
mod sink;

pub use client::WebHdfsCluster;
pub use endpoint::rest_base;
