use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PathError;

/// A `/`-separated path relative to a workspace root: the durable identity
/// of a storage entry. The empty path denotes the root itself.
/// 相對於工作區根目錄、以 `/` 分隔的路徑；空路徑代表根目錄本身。
///
/// Two open documents refer to the same entry iff their paths are equal;
/// handle equality cannot survive a reload and is never used for identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EntryPath {
    segments: Vec<String>,
}

impl EntryPath {
    /// The workspace root.
    /// 工作區根目錄。
    pub fn root() -> Self {
        Self::default()
    }

    /// A single-segment path directly under the root.
    /// 根目錄下單一名稱的路徑。
    pub fn from_name(name: impl Into<String>) -> Result<Self, PathError> {
        let name = name.into();
        validate_segment(&name)?;
        Ok(Self {
            segments: vec![name],
        })
    }

    /// Parses a `/`-separated relative path. Leading and trailing
    /// separators are tolerated; `.`/`..` segments are not.
    /// 解析以 `/` 分隔的相對路徑；允許首尾分隔符，拒絕 `.` 與 `..`。
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let trimmed = text.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            validate_segment(segment)?;
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment, absent for the root.
    /// 最後一段名稱；根目錄為 `None`。
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The containing directory, absent for the root.
    /// 上層目錄路徑；根目錄為 `None`。
    pub fn parent(&self) -> Option<EntryPath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Appends a validated child segment.
    /// 附加一段已驗證的子名稱。
    pub fn join(&self, name: &str) -> Result<EntryPath, PathError> {
        validate_segment(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// Whether `self` equals `prefix` or lies beneath it. Used as the
    /// own-descendant guard for move/copy targets.
    /// 判斷 `self` 是否等於或位於 `prefix` 之下，作為搬移時的自我包含檢查。
    pub fn starts_with(&self, prefix: &EntryPath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }
}

/// Validates a single path segment.
/// 驗證單一路徑名稱是否合法。
pub fn validate_segment(segment: &str) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment);
    }
    if segment == "." || segment == ".." {
        return Err(PathError::ReservedSegment(segment.to_string()));
    }
    if segment.contains('/') {
        return Err(PathError::EmbeddedSeparator(segment.to_string()));
    }
    Ok(())
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl Serialize for EntryPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntryPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        EntryPath::parse(&text).map_err(DeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let path = EntryPath::parse("notes/ideas/a.md").unwrap();
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.to_string(), "notes/ideas/a.md");
        assert_eq!(path.name(), Some("a.md"));
        assert_eq!(path.parent().unwrap().to_string(), "notes/ideas");
    }

    #[test]
    fn empty_and_slashed_input_is_the_root() {
        assert!(EntryPath::parse("").unwrap().is_root());
        assert!(EntryPath::parse("/").unwrap().is_root());
        assert_eq!(EntryPath::parse("/a.md").unwrap().to_string(), "a.md");
    }

    #[test]
    fn rejects_reserved_segments() {
        assert_eq!(
            EntryPath::parse("a//b"),
            Err(PathError::EmptySegment)
        );
        assert!(matches!(
            EntryPath::parse("a/../b"),
            Err(PathError::ReservedSegment(_))
        ));
        assert!(matches!(
            EntryPath::root().join("a/b"),
            Err(PathError::EmbeddedSeparator(_))
        ));
    }

    #[test]
    fn starts_with_detects_descendants() {
        let dir = EntryPath::parse("a/b").unwrap();
        let inner = EntryPath::parse("a/b/c").unwrap();
        let sibling = EntryPath::parse("a/bc").unwrap();
        assert!(inner.starts_with(&dir));
        assert!(dir.starts_with(&dir));
        assert!(!sibling.starts_with(&dir));
        assert!(inner.starts_with(&EntryPath::root()));
    }

    #[test]
    fn serde_uses_the_display_form() {
        let path = EntryPath::parse("notes/a.md").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"notes/a.md\"");
        let back: EntryPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
