//! Path grammar for addressing fields inside an object.
//!
//! Object keys are joined with `.`, array positions are written `[n]`, and
//! the first segment is always bare: `name`, `addr.city`, `tags[1]`,
//! `tags[1].label`. Stores parse these strings positionally, so the rendering
//! must not vary.
//!
//! The grammar has no escapes. A key that contains `.`, `[` or `]`, or that
//! is empty, renders to a string that parses back differently.

use std::fmt;

use odb_types::parse_index;

use crate::error::PathError;

/// One step of a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    /// Classify a container key: all-digit keys are positions, anything else
    /// is a property name.
    pub fn from_key(key: &str) -> Self {
        match parse_index(key) {
            Some(index) => Segment::Index(index),
            None => Segment::Key(key.to_string()),
        }
    }

    /// The key text used to look this segment up in an object.
    pub fn key(&self) -> String {
        match self {
            Segment::Key(k) => k.clone(),
            Segment::Index(i) => i.to_string(),
        }
    }

    /// The position this segment addresses in an array, if any. Bare numeric
    /// keys count, since the first segment of a path is never bracketed.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Key(k) => parse_index(k),
            Segment::Index(i) => Some(*i),
        }
    }
}

/// Returns `true` if `key` cannot round-trip through the path grammar.
pub fn is_ambiguous_key(key: &str) -> bool {
    key.is_empty() || key.contains(|c: char| matches!(c, '.' | '[' | ']'))
}

/// A parsed path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The empty path, addressing the whole value.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Extend the path by a container key.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::from_key(key));
        Self { segments }
    }

    /// Parse a path string.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        let mut rest = input;

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('[') {
                let end = after
                    .find(']')
                    .ok_or_else(|| PathError::UnterminatedIndex(input.to_string()))?;
                let digits = &after[..end];
                let index = parse_index(digits).ok_or_else(|| PathError::InvalidIndex {
                    path: input.to_string(),
                    index: digits.to_string(),
                })?;
                segments.push(Segment::Index(index));
                rest = &after[end + 1..];
                continue;
            }

            let body = if segments.is_empty() {
                rest
            } else {
                rest.strip_prefix('.')
                    .ok_or_else(|| PathError::EmptySegment(input.to_string()))?
            };
            let end = body.find(|c: char| c == '.' || c == '[').unwrap_or(body.len());
            let key = &body[..end];
            if key.is_empty() {
                return Err(PathError::EmptySegment(input.to_string()));
            }
            segments.push(Segment::Key(key.to_string()));
            rest = &body[end..];
        }

        Ok(Self { segments })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(k) if i == 0 => write!(f, "{k}")?,
                Segment::Key(k) => write!(f, ".{k}")?,
                Segment::Index(n) if i == 0 => write!(f, "{n}")?,
                Segment::Index(n) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(keys: &[&str]) -> String {
        keys.iter()
            .fold(FieldPath::root(), |path, key| path.child(key))
            .to_string()
    }

    #[test]
    fn root_key_is_bare() {
        assert_eq!(build(&["name"]), "name");
    }

    #[test]
    fn nested_keys_are_dotted() {
        assert_eq!(build(&["addr", "city"]), "addr.city");
    }

    #[test]
    fn numeric_keys_are_bracketed() {
        assert_eq!(build(&["tags", "1"]), "tags[1]");
        assert_eq!(build(&["tags", "3", "label"]), "tags[3].label");
        assert_eq!(build(&["grid", "0", "2"]), "grid[0][2]");
    }

    #[test]
    fn numeric_root_key_is_bare() {
        assert_eq!(build(&["0"]), "0");
        assert_eq!(build(&["0", "name"]), "0.name");
    }

    #[test]
    fn signed_and_decimal_keys_are_properties() {
        assert_eq!(build(&["a", "-1"]), "a.-1");
        assert_eq!(build(&["a", "1.5"]), "a.1.5");
    }

    #[test]
    fn root_renders_empty() {
        assert_eq!(FieldPath::root().to_string(), "");
        assert!(FieldPath::parse("").unwrap().is_root());
    }

    #[test]
    fn parse_mixed_path() {
        let path = FieldPath::parse("tags[3].label").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("tags".into()),
                Segment::Index(3),
                Segment::Key("label".into()),
            ]
        );
        assert_eq!(path.to_string(), "tags[3].label");
    }

    #[test]
    fn parse_consecutive_indexes() {
        let path: FieldPath = "grid[0][2]".parse().unwrap();
        assert_eq!(path.segments().len(), 3);
        assert_eq!(path.segments()[2], Segment::Index(2));
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert_eq!(
            FieldPath::parse("a..b"),
            Err(PathError::EmptySegment("a..b".into()))
        );
        assert!(matches!(FieldPath::parse(".a"), Err(PathError::EmptySegment(_))));
        assert!(matches!(FieldPath::parse("a."), Err(PathError::EmptySegment(_))));
    }

    #[test]
    fn parse_rejects_bad_indexes() {
        assert!(matches!(
            FieldPath::parse("a[1"),
            Err(PathError::UnterminatedIndex(_))
        ));
        assert!(matches!(
            FieldPath::parse("a[x]"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            FieldPath::parse("a[]"),
            Err(PathError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn bare_numeric_root_segment_addresses_arrays() {
        let path = FieldPath::parse("2").unwrap();
        assert_eq!(path.segments()[0].as_index(), Some(2));
    }

    #[test]
    fn ambiguous_keys_detected() {
        assert!(is_ambiguous_key("a.b"));
        assert!(is_ambiguous_key("x[0]"));
        assert!(is_ambiguous_key(""));
        assert!(!is_ambiguous_key("plain_key"));
    }

    #[test]
    fn paths_order_by_numeric_index() {
        let a = FieldPath::parse("tags[2]").unwrap();
        let b = FieldPath::parse("tags[10]").unwrap();
        assert!(a < b);
    }
}
