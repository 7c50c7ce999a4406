use derive_more::Display;
use serde::Serialize;

use crate::Error;

/// A normalized, cluster-absolute path.
///
/// Always starts with `/`, never ends with `/` (except the root itself),
/// never contains empty segments or control characters.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClusterPath(String);

impl ClusterPath {
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Trims and normalizes a raw request parameter. Relative input is
    /// anchored at the root; repeated and trailing separators are collapsed.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_argument("Path must not be empty"));
        }

        if let Some(c) = trimmed.chars().find(|c| c.is_control()) {
            return Err(Error::invalid_argument(format!(
                "Path contains control character {:?}: {:?}",
                c, trimmed
            )));
        }

        let segments = trimmed
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>();

        Ok(Self(format!("/{}", segments.join("/"))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The last segment; empty for the root.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    pub fn parent(&self) -> Option<ClusterPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) | None => Some(Self::root()),
            Some(index) => Some(Self(self.0[..index].to_string())),
        }
    }

    /// Appends one child name. `name` comes from a cluster listing and is a
    /// single segment, so the result stays normalized.
    pub fn join(&self, name: &str) -> ClusterPath {
        let name = name.trim_matches('/');
        if name.is_empty() {
            return self.clone();
        }
        if self.is_root() {
            Self(format!("/{name}"))
        } else {
            Self(format!("{}/{name}", self.0))
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }

    /// True if `self` equals `other` or lies beneath it.
    pub fn is_within(&self, other: &ClusterPath) -> bool {
        other.is_root()
            || self.0 == other.0
            || (self.0.starts_with(&other.0) && self.0.as_bytes().get(other.0.len()) == Some(&b'/'))
    }

    /// Path relative to the root, without the leading separator.
    pub fn relative(&self) -> &str {
        self.0.trim_start_matches('/')
    }
}

impl AsRef<str> for ClusterPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_parse_normalizes_separators() {
        let fixture = ClusterPath::parse("  //data///logs/ ").unwrap();
        assert_eq!(fixture.as_str(), "/data/logs");
    }

    #[test]
    fn test_parse_anchors_relative_paths() {
        let fixture = ClusterPath::parse("user/hdfs").unwrap();
        assert_eq!(fixture.as_str(), "/user/hdfs");
    }

    #[test]
    fn test_parse_root() {
        assert!(ClusterPath::parse("/").unwrap().is_root());
        assert!(ClusterPath::parse("///").unwrap().is_root());
    }

    #[test]
    fn test_parse_rejects_blank() {
        for raw in ["", " ", "\t\n "] {
            let actual = ClusterPath::parse(raw).unwrap_err();
            assert_eq!(actual.kind, ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_parse_rejects_control_characters() {
        let actual = ClusterPath::parse("/a/b\u{7}c").unwrap_err();
        assert_eq!(actual.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_parent_and_name() {
        let fixture = ClusterPath::parse("/a/b/c.txt").unwrap();
        assert_eq!(fixture.name(), "c.txt");
        assert_eq!(fixture.parent().unwrap().as_str(), "/a/b");
        assert_eq!(
            ClusterPath::parse("/a").unwrap().parent(),
            Some(ClusterPath::root())
        );
        assert_eq!(ClusterPath::root().parent(), None);
        assert_eq!(ClusterPath::root().name(), "");
    }

    #[test]
    fn test_join() {
        assert_eq!(ClusterPath::root().join("a").as_str(), "/a");
        assert_eq!(
            ClusterPath::parse("/a").unwrap().join("b.txt").as_str(),
            "/a/b.txt"
        );
        assert_eq!(ClusterPath::parse("/a").unwrap().join("").as_str(), "/a");
    }

    #[test]
    fn test_is_within() {
        let dir = ClusterPath::parse("/a/b").unwrap();
        assert!(ClusterPath::parse("/a/b").unwrap().is_within(&dir));
        assert!(ClusterPath::parse("/a/b/c").unwrap().is_within(&dir));
        assert!(!ClusterPath::parse("/a/bc").unwrap().is_within(&dir));
        assert!(dir.is_within(&ClusterPath::root()));
    }
}
