//! Key-path updates of YAML documents.
//!
//! Paths are dotted (`spec.template.image`). A literal dot inside a key is
//! written as `\.`, and numeric segments index into sequences. Missing
//! mapping keys are created along the way; a missing node under a numeric
//! segment becomes a sequence. Numeric and boolean mapping keys are matched
//! by their plain text.
//!
//! Mapping key order is kept, but comments and custom formatting are not:
//! the document is re-serialized after the change.

mod error;

pub use error::PatchError;

use serde_yaml::{Mapping, Value};

/// Sets `path` in the YAML document `yaml` to `value`.
///
/// ```
/// let updated = yaml_updater::syaml::set_bytes(b"name: testing\n", "name", "new name").unwrap();
/// assert_eq!(updated, b"name: new name\n");
/// ```
///
/// # Errors
///
/// Returns [`PatchError`] if the document does not parse, the path is
/// malformed, or the path runs through a scalar.
pub fn set_bytes(yaml: &[u8], path: &str, value: impl Into<Value>) -> Result<Vec<u8>, PatchError> {
    let segments = split_path(path)?;

    let mut document = if yaml.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_yaml::from_slice(yaml).map_err(PatchError::Parse)?
    };

    set_value(&mut document, &segments, value.into(), path)?;

    let updated = serde_yaml::to_string(&document).map_err(PatchError::Serialize)?;
    Ok(updated.into_bytes())
}

/// Splits a dotted key path into its segments, honouring `\.` escapes.
///
/// # Errors
///
/// Returns [`PatchError::InvalidPath`] for an empty path or empty segment.
pub fn split_path(path: &str) -> Result<Vec<String>, PatchError> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => current.push('\\'),
            },
            '.' => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);

    if segments.iter().any(String::is_empty) {
        return Err(PatchError::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(segments)
}

fn set_value(
    node: &mut Value,
    segments: &[String],
    value: Value,
    path: &str,
) -> Result<(), PatchError> {
    let Some((segment, rest)) = segments.split_first() else {
        *node = value;
        return Ok(());
    };

    match node {
        Value::Null => {
            *node = if segment.parse::<usize>().is_ok() {
                Value::Sequence(Vec::new())
            } else {
                Value::Mapping(Mapping::new())
            };
            set_value(node, segments, value, path)
        }
        Value::Tagged(tagged) => set_value(&mut tagged.value, segments, value, path),
        Value::Mapping(mapping) => {
            let key = mapping
                .keys()
                .find(|key| key_matches(key, segment))
                .cloned()
                .unwrap_or_else(|| Value::String(segment.clone()));
            let child = mapping.entry(key).or_insert(Value::Null);
            set_value(child, rest, value, path)
        }
        Value::Sequence(sequence) => {
            let index: usize = segment.parse().map_err(|_| PatchError::InvalidIndex {
                path: path.to_string(),
                segment: segment.clone(),
            })?;
            if index == sequence.len() {
                sequence.push(Value::Null);
            }
            let child = sequence
                .get_mut(index)
                .ok_or_else(|| PatchError::InvalidIndex {
                    path: path.to_string(),
                    segment: segment.clone(),
                })?;
            set_value(child, rest, value, path)
        }
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Err(PatchError::NotAContainer {
            path: path.to_string(),
            segment: segment.clone(),
        }),
    }
}

/// Whether a mapping key is addressed by `segment`. Numeric and boolean keys
/// match their plain rendering, so `ports.8080` finds `8080:`.
fn key_matches(key: &Value, segment: &str) -> bool {
    match key {
        Value::String(s) => s == segment,
        Value::Number(n) => n.to_string() == segment,
        Value::Bool(b) => b.to_string() == segment,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(yaml: &str, path: &str, value: &str) -> Result<String, PatchError> {
        set_bytes(yaml.as_bytes(), path, value)
            .map(|bytes| String::from_utf8(bytes).expect("patched YAML is UTF-8"))
    }

    #[test]
    fn updates_nested_key() {
        let updated = set("test:\n  image: old-image\n", "test.image", "test/my-test-image").unwrap();
        assert_eq!(updated, "test:\n  image: test/my-test-image\n");
    }

    #[test]
    fn keeps_key_order() {
        let updated = set("b: 1\na:\n  z: old\n  y: 2\n", "a.z", "new").unwrap();
        assert_eq!(updated, "b: 1\na:\n  z: new\n  y: 2\n");
    }

    #[test]
    fn setting_current_value_is_stable() {
        let original = "test:\n  image: test/my-test-image\n";
        let updated = set(original, "test.image", "test/my-test-image").unwrap();
        assert_eq!(updated, original);
    }

    #[test]
    fn creates_missing_keys() {
        let updated = set("name: testing\n", "spec.image.tag", "v2").unwrap();
        assert_eq!(updated, "name: testing\nspec:\n  image:\n    tag: v2\n");
    }

    #[test]
    fn updates_numeric_keys_in_place() {
        let updated = set("ports:\n  8080: old\n", "ports.8080", "new").unwrap();
        assert_eq!(updated, "ports:\n  8080: new\n");
    }

    #[test]
    fn updates_boolean_keys_in_place() {
        let updated = set("flags:\n  true: old\n", "flags.true", "new").unwrap();
        assert_eq!(updated, "flags:\n  true: new\n");
    }

    #[test]
    fn numeric_segment_on_missing_key_creates_sequence() {
        let updated = set("name: testing\n", "tags.0", "v1").unwrap();
        let parsed: Value = serde_yaml::from_str(&updated).unwrap();
        assert!(parsed["tags"].is_sequence());
        assert_eq!(parsed["tags"][0], "v1");
    }

    #[test]
    fn numeric_segment_on_missing_key_must_start_at_zero() {
        let result = set("name: testing\n", "tags.2", "v1");
        assert!(matches!(result, Err(PatchError::InvalidIndex { .. })));
    }

    #[test]
    fn empty_document_becomes_mapping() {
        assert_eq!(set("", "name", "value").unwrap(), "name: value\n");
    }

    #[test]
    fn indexes_into_sequences() {
        let updated = set(
            "containers:\n- image: a\n- image: b\n",
            "containers.1.image",
            "c",
        )
        .unwrap();
        let parsed: Value = serde_yaml::from_str(&updated).unwrap();
        assert_eq!(parsed["containers"][0]["image"], "a");
        assert_eq!(parsed["containers"][1]["image"], "c");
    }

    #[test]
    fn appends_at_sequence_end() {
        let updated = set("tags:\n- a\n", "tags.1", "b").unwrap();
        let parsed: Value = serde_yaml::from_str(&updated).unwrap();
        assert_eq!(parsed["tags"][1], "b");
    }

    #[test]
    fn rejects_index_past_end() {
        let result = set("tags:\n- a\n", "tags.5", "b");
        assert!(matches!(result, Err(PatchError::InvalidIndex { .. })));
    }

    #[test]
    fn rejects_non_numeric_sequence_segment() {
        let result = set("tags:\n- a\n", "tags.first", "b");
        assert!(matches!(result, Err(PatchError::InvalidIndex { .. })));
    }

    #[test]
    fn rejects_descending_into_scalar() {
        let result = set("test: value\n", "test.image", "b");
        assert!(matches!(
            result,
            Err(PatchError::NotAContainer { ref segment, .. }) if segment == "image"
        ));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let result = set("test: [unclosed\n", "test", "b");
        assert!(matches!(result, Err(PatchError::Parse(_))));
    }

    #[test]
    fn escaped_dots_stay_in_key() {
        let updated = set("annotations:\n  example.com/tag: old\n", r"annotations.example\.com/tag", "new")
            .unwrap();
        assert_eq!(updated, "annotations:\n  example.com/tag: new\n");
    }

    #[test]
    fn splits_paths() {
        assert_eq!(split_path("a.b.c").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(split_path(r"a\.b.c").unwrap(), vec!["a.b", "c"]);
    }

    #[test]
    fn rejects_empty_segments() {
        for path in ["", "a..b", ".a", "a."] {
            assert!(
                matches!(split_path(path), Err(PatchError::InvalidPath { .. })),
                "{path:?} should be rejected"
            );
        }
    }
}
