//! Structured field paths, question ids and field-error maps.
//!
//! Paths are lists of segments rather than dotted strings so that prefix
//! checks compare whole segments: `phones` is a prefix of `phones.mobile`
//! but not of `phonesVerified`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// FIELD PATH
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Address of a node inside a fields document.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path. Purely numeric segments become array indices.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::root();
        }
        Self(
            dotted
                .split('.')
                .map(|seg| match seg.parse::<usize>() {
                    Ok(i) => PathSegment::Index(i),
                    Err(_) => PathSegment::Key(seg.to_string()),
                })
                .collect(),
        )
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// New path with a key segment appended.
    pub fn key(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Key(key.to_string()));
        next
    }

    /// New path with an index segment appended.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Index(index));
        next
    }

    /// New path with every segment of `other` appended.
    pub fn join(&self, other: &FieldPath) -> Self {
        let mut next = self.clone();
        next.0.extend(other.0.iter().cloned());
        next
    }

    /// Segment-wise prefix test.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn last_key(&self) -> Option<&str> {
        match self.0.last() {
            Some(PathSegment::Key(k)) => Some(k),
            _ => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        FieldPath::parse(dotted)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(FieldPath::parse(&raw))
    }
}

// ============================================================================
// QUESTION ID
// ============================================================================

/// Step-scoped dotted question id, e.g. `step4.holder.contact.phones.mobile`.
///
/// The part after the step prefix addresses the question's sub-tree in the
/// step's fields document. Ids are stable and safe to persist as a cursor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the id for a path relative to the given step's document.
    pub fn for_path(step: u8, path: &FieldPath) -> Self {
        Self(format!("step{}.{}", step, path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Step number from the `stepN.` prefix.
    pub fn step(&self) -> Option<u8> {
        let (prefix, _) = self.0.split_once('.')?;
        prefix.strip_prefix("step")?.parse().ok()
    }

    /// Path of the question within its step document.
    pub fn relative_path(&self) -> FieldPath {
        match self.0.split_once('.') {
            Some((_, rest)) => FieldPath::parse(rest),
            None => FieldPath::root(),
        }
    }

    /// Full path including the step segment, as used for error keys.
    pub fn full_path(&self) -> FieldPath {
        FieldPath::parse(&self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(id: &str) -> Self {
        QuestionId::new(id)
    }
}

// ============================================================================
// FIELD ERRORS
// ============================================================================

/// Map of field path to a human-readable message.
///
/// The first message recorded for a path wins; checks run from the most
/// specific rule to the most general.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FieldPath, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(path: FieldPath, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(path, message);
        errors
    }

    pub fn insert(&mut self, path: FieldPath, message: impl Into<String>) {
        self.0.entry(path).or_insert_with(|| message.into());
    }

    pub fn extend(&mut self, other: FieldErrors) {
        for (path, message) in other.0 {
            self.insert(path, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, path: &FieldPath) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    /// Lookup by dotted path.
    pub fn message(&self, dotted: &str) -> Option<&str> {
        self.get(&FieldPath::parse(dotted))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &str)> {
        self.0.iter().map(|(p, m)| (p, m.as_str()))
    }

    /// Re-root every path under `prefix`.
    pub fn under(self, prefix: &FieldPath) -> FieldErrors {
        FieldErrors(
            self.0
                .into_iter()
                .map(|(path, message)| (prefix.join(&path), message))
                .collect(),
        )
    }

    /// Errors located at or below `prefix`.
    pub fn within(&self, prefix: &FieldPath) -> FieldErrors {
        FieldErrors(
            self.0
                .iter()
                .filter(|(path, _)| path.starts_with(prefix))
                .map(|(p, m)| (p.clone(), m.clone()))
                .collect(),
        )
    }
}
