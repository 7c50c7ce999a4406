use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ClusterPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One child of a listed directory, or the status of a single path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub path: ClusterPath,
    pub kind: EntryKind,
    /// Present for files only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub owner: String,
    pub modified: DateTime<Utc>,
}

impl DirectoryEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// The lightweight `{name, kind}` pair returned by directory listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub name: String,
    pub path: ClusterPath,
    pub kind: EntryKind,
}

impl From<&DirectoryEntry> for ListItem {
    fn from(entry: &DirectoryEntry) -> Self {
        Self { name: entry.name.clone(), path: entry.path.clone(), kind: entry.kind }
    }
}
