//! Typed target paths for mapping rules.
//!
//! A rule's `target` is written as a dot-path with optional `[n]` index
//! suffixes (`materials[0].name`). Parsing happens once, when the mapping
//! configuration is loaded, so the engine assembles output documents from an
//! unambiguous sequence of [`PathSegment`]s instead of re-interpreting
//! strings per record. Arrays are first-class: an `Index` segment always
//! builds a JSON array, never an object with numeric keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One step of a [`TargetPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Named object field, e.g. `carbonFootprint`.
    Field(String),
    /// Zero-based array position, e.g. the `0` in `materials[0]`.
    Index(usize),
}

/// Parsed form of a rule's `target` string.
///
/// Grammar: dot-separated segments, each a field name followed by zero or
/// more `[n]` indexes. The first segment is always a field — output
/// documents are objects at the top level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetPath {
    segments: Vec<PathSegment>,
}

impl TargetPath {
    /// Parses a target string such as `identifier.id` or `materials[0].share`.
    pub fn parse(raw: &str) -> Result<Self, TargetPathError> {
        if raw.is_empty() {
            return Err(TargetPathError::Empty);
        }
        let mut segments = Vec::new();
        for (position, part) in raw.split('.').enumerate() {
            if part.is_empty() {
                return Err(TargetPathError::EmptySegment { position });
            }
            let (name, mut rest) = match part.find('[') {
                Some(split) => part.split_at(split),
                None => (part, ""),
            };
            if name.is_empty() {
                return Err(TargetPathError::MissingFieldName {
                    segment: part.to_string(),
                });
            }
            if name.contains(']') {
                return Err(TargetPathError::UnexpectedCharacter {
                    segment: part.to_string(),
                    character: ']',
                });
            }
            segments.push(PathSegment::Field(name.to_string()));
            while let Some(stripped) = rest.strip_prefix('[') {
                let Some(end) = stripped.find(']') else {
                    return Err(TargetPathError::UnclosedIndex {
                        segment: part.to_string(),
                    });
                };
                let digits = &stripped[..end];
                let index = digits
                    .parse::<usize>()
                    .map_err(|_| TargetPathError::InvalidIndex {
                        segment: part.to_string(),
                        index: digits.to_string(),
                    })?;
                segments.push(PathSegment::Index(index));
                rest = &stripped[end + 1..];
            }
            if let Some(character) = rest.chars().next() {
                return Err(TargetPathError::UnexpectedCharacter {
                    segment: part.to_string(),
                    character,
                });
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if position > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{name}")?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for TargetPath {
    type Err = TargetPathError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl TryFrom<String> for TargetPath {
    type Error = TargetPathError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<TargetPath> for String {
    fn from(path: TargetPath) -> Self {
        path.to_string()
    }
}

/// Why a target string failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetPathError {
    Empty,
    EmptySegment { position: usize },
    MissingFieldName { segment: String },
    UnclosedIndex { segment: String },
    InvalidIndex { segment: String, index: String },
    UnexpectedCharacter { segment: String, character: char },
}

impl fmt::Display for TargetPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetPathError::Empty => write!(f, "target path is empty"),
            TargetPathError::EmptySegment { position } => {
                write!(f, "target path has an empty segment at position {position}")
            }
            TargetPathError::MissingFieldName { segment } => {
                write!(f, "segment '{segment}' is missing a field name before '['")
            }
            TargetPathError::UnclosedIndex { segment } => {
                write!(f, "segment '{segment}' has an unclosed '[' index")
            }
            TargetPathError::InvalidIndex { segment, index } => {
                write!(f, "segment '{segment}' has invalid index '{index}'")
            }
            TargetPathError::UnexpectedCharacter { segment, character } => {
                write!(f, "segment '{segment}' has unexpected character '{character}'")
            }
        }
    }
}

impl std::error::Error for TargetPathError {}
