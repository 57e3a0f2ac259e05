//! PrimPath parsing and formatting.
//!
//! Grammar (absolute paths only):
//!   /segment/segment/.../segment
//! - '/' alone is the pseudo-root and has no segments
//! - every segment is an identifier: `[A-Za-z_][A-Za-z0-9_]*`
//!   Examples:
//!   "/World/Shelf" -> segments=["World","Shelf"]
//!   "/World/Shelf/Items_Lower/Snacks/A" -> five segments, name "A"
//!
//! Catalog data flows straight into path segments (shelf, category, product id),
//! so segment validation is the only guard against malformed scene paths.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::StageError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimPath {
    segments: Vec<String>,
}

impl PrimPath {
    /// The pseudo-root `/`.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse an absolute path string according to the grammar described above.
    pub fn parse(s: &str) -> Result<Self, StageError> {
        if s.is_empty() {
            return Err(invalid(s, "empty path"));
        }
        let Some(rest) = s.strip_prefix('/') else {
            return Err(invalid(s, "path must be absolute"));
        };
        if rest.is_empty() {
            return Ok(Self::root());
        }
        if rest.ends_with('/') {
            return Err(invalid(s, "path ends with '/'"));
        }
        let mut segments = Vec::new();
        for seg in rest.split('/') {
            if seg.is_empty() {
                return Err(invalid(s, "empty segment"));
            }
            check_identifier(s, seg)?;
            segments.push(seg.to_string());
        }
        Ok(Self { segments })
    }

    /// Append a single child segment.
    pub fn child(&self, name: &str) -> Result<Self, StageError> {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        let candidate = Self { segments };
        check_identifier(&candidate.to_string(), name)?;
        Ok(candidate)
    }

    /// Append several child segments in order.
    pub fn join<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<Self, StageError> {
        names
            .into_iter()
            .try_fold(self.clone(), |path, name| path.child(name))
    }

    /// Parent path; `None` for the pseudo-root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// Last segment, or `None` for the pseudo-root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.as_str())
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if `self` is `other` or lies beneath it.
    pub fn has_prefix(&self, other: &PrimPath) -> bool {
        self.segments.len() >= other.segments.len()
            && self.segments[..other.segments.len()] == other.segments[..]
    }

    /// Proper ancestors from the first segment downwards, excluding the pseudo-root
    /// and `self`. `/a/b/c` yields `/a`, `/a/b`.
    pub fn ancestors(&self) -> impl Iterator<Item = PrimPath> + '_ {
        (1..self.segments.len()).map(move |n| PrimPath {
            segments: self.segments[..n].to_vec(),
        })
    }
}

fn invalid(path: &str, reason: &str) -> StageError {
    StageError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn check_identifier(path: &str, seg: &str) -> Result<(), StageError> {
    let mut chars = seg.chars();
    match chars.next() {
        None => return Err(invalid(path, "empty segment")),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return Err(invalid(
                path,
                &format!("segment '{seg}' must start with a letter or '_'"),
            ))
        }
        _ => {}
    }
    if chars.any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
        return Err(invalid(
            path,
            &format!("segment '{seg}' contains characters outside [A-Za-z0-9_]"),
        ));
    }
    Ok(())
}

impl fmt::Display for PrimPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for seg in &self.segments {
            f.write_str("/")?;
            f.write_str(seg)?;
        }
        Ok(())
    }
}

impl FromStr for PrimPath {
    type Err = StageError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimPath::parse(s)
    }
}

// Serde support: serialize as string, deserialize from string
impl Serialize for PrimPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PrimPath {
    fn deserialize<D>(deserializer: D) -> Result<PrimPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PrimPath::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let p = PrimPath::parse("/World/Shelf/Items_Lower").unwrap();
        assert_eq!(
            p.segments().collect::<Vec<_>>(),
            vec!["World", "Shelf", "Items_Lower"]
        );
        assert_eq!(p.name(), Some("Items_Lower"));
        assert_eq!(p.to_string(), "/World/Shelf/Items_Lower");
    }

    #[test]
    fn parse_root() {
        let p = PrimPath::parse("/").unwrap();
        assert!(p.is_root());
        assert_eq!(p.to_string(), "/");
        assert_eq!(p.parent(), None);
        assert_eq!(p.name(), None);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(PrimPath::parse("").is_err());
        assert!(PrimPath::parse("World/Shelf").is_err());
        assert!(PrimPath::parse("/World/").is_err());
        assert!(PrimPath::parse("/World//Shelf").is_err());
        assert!(PrimPath::parse("/World/Shelf A").is_err());
        assert!(PrimPath::parse("/World/1Shelf").is_err());
        assert!(PrimPath::parse("/World/chips-1").is_err());
    }

    #[test]
    fn child_validates_segment() {
        let anchor = PrimPath::parse("/World/Shelf").unwrap();
        let child = anchor.child("Snacks").unwrap();
        assert_eq!(child.to_string(), "/World/Shelf/Snacks");
        assert_eq!(child.parent(), Some(anchor.clone()));
        assert!(anchor.child("bad/name").is_err());
        assert!(anchor.child("").is_err());
    }

    #[test]
    fn join_and_ancestors() {
        let anchor = PrimPath::parse("/World/Shelf").unwrap();
        let p = anchor.join(["Items_Lower", "Snacks", "A"]).unwrap();
        assert_eq!(p.to_string(), "/World/Shelf/Items_Lower/Snacks/A");
        assert!(p.has_prefix(&anchor));
        assert!(!anchor.has_prefix(&p));
        let ancestors: Vec<String> = p.ancestors().map(|a| a.to_string()).collect();
        assert_eq!(
            ancestors,
            vec![
                "/World",
                "/World/Shelf",
                "/World/Shelf/Items_Lower",
                "/World/Shelf/Items_Lower/Snacks"
            ]
        );
    }

    #[test]
    fn serde_as_string() {
        let p = PrimPath::parse("/World/Shelf").unwrap();
        let s = serde_json::to_string(&p).unwrap();
        assert_eq!(s, "\"/World/Shelf\"");
        let back: PrimPath = serde_json::from_str(&s).unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<PrimPath>("\"relative\"").is_err());
    }
}
