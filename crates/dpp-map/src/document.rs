//! Typed-path writes into nested documents.
//!
//! Containers materialize on demand: writing `battery.materials[1].name`
//! into an empty document creates the `battery` object, a `materials` array
//! padded with null up to index 1, and the element object. An intermediate
//! that already holds the wrong shape (a scalar where an object is needed)
//! is overwritten, the same way a later rule overwrites an earlier value at
//! the same path.

use dpp_model::{Document, PathSegment, TargetPath};
use serde_json::Value;

/// Writes `value` at `path`, creating intermediate containers as needed.
pub fn set_path(document: &mut Document, path: &TargetPath, value: Value) {
    // The path grammar guarantees a leading field segment.
    if let Some((PathSegment::Field(name), rest)) = path.segments().split_first() {
        let slot = document.entry(name.clone()).or_insert(Value::Null);
        set_segments(slot, rest, value);
    }
}

/// Reads the value at `path`, if every segment resolves.
pub fn get_path<'a>(document: &'a Document, path: &TargetPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let PathSegment::Field(name) = first else {
        return None;
    };
    let mut current = document.get(name)?;
    for segment in rest {
        current = match segment {
            PathSegment::Field(name) => current.as_object()?.get(name)?,
            PathSegment::Index(index) => current.as_array()?.get(*index)?,
        };
    }
    Some(current)
}

fn set_segments(container: &mut Value, segments: &[PathSegment], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *container = value;
        return;
    };
    match head {
        PathSegment::Field(name) => {
            if !container.is_object() {
                *container = Value::Object(Document::new());
            }
            if let Value::Object(map) = container {
                let slot = map.entry(name.clone()).or_insert(Value::Null);
                set_segments(slot, rest, value);
            }
        }
        PathSegment::Index(index) => {
            if !container.is_array() {
                *container = Value::Array(Vec::new());
            }
            if let Value::Array(items) = container {
                if items.len() <= *index {
                    items.resize(index + 1, Value::Null);
                }
                set_segments(&mut items[*index], rest, value);
            }
        }
    }
}
