use dfs_services::{ClusterError, FileStatus, FileType, NativeBlockLocation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileStatusResponse {
    pub file_status: WireFileStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListStatusResponse {
    pub file_statuses: WireFileStatuses,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireFileStatuses {
    #[serde(default)]
    pub file_status: Vec<WireFileStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFileStatus {
    #[serde(default)]
    pub path_suffix: String,
    #[serde(rename = "type")]
    pub file_type: WireFileType,
    #[serde(default)]
    pub length: u64,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub modification_time: i64,
    #[serde(default)]
    pub replication: u16,
    #[serde(default)]
    pub block_size: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WireFileType {
    File,
    Directory,
    Symlink,
}

impl From<WireFileStatus> for FileStatus {
    fn from(status: WireFileStatus) -> Self {
        Self {
            path_suffix: status.path_suffix,
            file_type: match status.file_type {
                WireFileType::File => FileType::File,
                WireFileType::Directory => FileType::Directory,
                WireFileType::Symlink => FileType::Symlink,
            },
            length: status.length,
            owner: status.owner,
            group: status.group,
            modification_time: status.modification_time,
            replication: status.replication,
            block_size: status.block_size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BooleanResponse {
    pub boolean: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockLocationsResponse {
    pub block_locations: WireBlockLocations,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireBlockLocations {
    #[serde(default)]
    pub block_location: Vec<WireBlockLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBlockLocation {
    pub offset: u64,
    pub length: u64,
    #[serde(default)]
    pub hosts: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub topology_paths: Vec<String>,
    #[serde(default)]
    pub corrupt: bool,
}

impl From<WireBlockLocation> for NativeBlockLocation {
    fn from(block: WireBlockLocation) -> Self {
        Self {
            offset: block.offset,
            length: block.length,
            hosts: block.hosts,
            names: block.names,
            topology_paths: block.topology_paths,
            corrupt: block.corrupt,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteExceptionResponse {
    pub remote_exception: RemoteException,
}

/// The error body the NameNode sends with every non-2xx response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteException {
    pub exception: String,
    #[serde(default)]
    pub java_class_name: String,
    #[serde(default)]
    pub message: String,
}

impl RemoteException {
    /// The typed failure for exceptions the gateway knows how to classify.
    pub fn cluster_error(&self) -> Option<ClusterError> {
        let message = self.message.clone();
        let error = match self.exception.as_str() {
            // HDFS reports OPEN and GETFILEBLOCKLOCATIONS on a directory as
            // a missing file.
            "FileNotFoundException" if message.contains("is not a file") => {
                ClusterError::NotAFile(message)
            }
            "FileNotFoundException" => ClusterError::NotFound(message),
            "FileAlreadyExistsException" => ClusterError::AlreadyExists(message),
            "ParentNotDirectoryException" => ClusterError::NotADirectory(message),
            "AccessControlException" | "SecurityException" => {
                ClusterError::PermissionDenied(message)
            }
            "PathIsNotEmptyDirectoryException" => ClusterError::NotEmpty(message),
            "StandbyException" => ClusterError::Unavailable(message),
            _ => return None,
        };
        Some(error)
    }
}
