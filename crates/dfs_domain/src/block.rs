use serde::Serialize;

/// Physical placement of one contiguous byte range of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLocation {
    pub offset: u64,
    pub length: u64,
    /// Hosts holding a replica, in the order the cluster reported them.
    pub hosts: Vec<String>,
    /// `host:port` transfer addresses, parallel to `hosts`.
    pub names: Vec<String>,
    pub topology_paths: Vec<String>,
    pub corrupt: bool,
}

impl BlockLocation {
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}
