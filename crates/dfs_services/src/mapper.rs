use chrono::{DateTime, Utc};
use dfs_domain::{BlockLocation, ClusterPath, DirectoryEntry, EntryKind, ListItem};

use crate::{FileStatus, FileType, NativeBlockLocation};

/// Converts cluster-native records into the gateway's value objects. Pure;
/// malformed records are programming errors caught by debug assertions.
pub struct MetadataMapper;

impl MetadataMapper {
    /// `base` is the listed directory for a child record, or the path itself
    /// for a record with an empty `path_suffix`.
    pub fn entry(base: &ClusterPath, status: &FileStatus) -> DirectoryEntry {
        let path = base.join(&status.path_suffix);
        let kind = Self::kind(status.file_type);
        debug_assert!(
            kind == EntryKind::File || status.length == 0,
            "directory {path} reported a length of {}",
            status.length
        );

        DirectoryEntry {
            name: path.name().to_string(),
            size: (kind == EntryKind::File).then_some(status.length),
            owner: status.owner.clone(),
            modified: Self::timestamp(status.modification_time),
            kind,
            path,
        }
    }

    pub fn entries(base: &ClusterPath, statuses: &[FileStatus]) -> Vec<DirectoryEntry> {
        statuses
            .iter()
            .map(|status| Self::entry(base, status))
            .collect()
    }

    pub fn list_item(base: &ClusterPath, status: &FileStatus) -> ListItem {
        ListItem::from(&Self::entry(base, status))
    }

    pub fn block(block: &NativeBlockLocation) -> BlockLocation {
        debug_assert!(block.length > 0, "block at offset {} has zero length", block.offset);

        BlockLocation {
            offset: block.offset,
            length: block.length,
            hosts: block.hosts.clone(),
            names: block.names.clone(),
            topology_paths: block.topology_paths.clone(),
            corrupt: block.corrupt,
        }
    }

    pub fn blocks(blocks: &[NativeBlockLocation]) -> Vec<BlockLocation> {
        blocks.iter().map(Self::block).collect()
    }

    fn kind(file_type: FileType) -> EntryKind {
        match file_type {
            FileType::Directory => EntryKind::Directory,
            FileType::File | FileType::Symlink => EntryKind::File,
        }
    }

    fn timestamp(millis: i64) -> DateTime<Utc> {
        let timestamp = DateTime::from_timestamp_millis(millis);
        debug_assert!(timestamp.is_some(), "modification time {millis} out of range");
        timestamp.unwrap_or(DateTime::UNIX_EPOCH)
    }
}
