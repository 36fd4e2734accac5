use crate::config::MergeConfig;
use crate::pipeline::state::{json_kind, DeltaObject, DeltaState};
use crate::pipeline::MergeError;
use serde_json::{Map, Value};
use tracing::trace;

type Fields<'a> = Vec<(&'a str, &'a Value)>;

/// Folds streamed deltas into a [`DeltaState`].
///
/// Strings append, objects recurse, arrays carry fragments addressed by `index`.
/// `null`, numbers and booleans in a delta are skipped. A delta that references a
/// path absent from the skeleton is rejected as a whole and leaves the accumulator
/// untouched.
///
/// Appending is not idempotent: merging the same delta twice duplicates its text.
#[derive(Debug, Clone)]
pub struct DeltaMerger {
    stripped_keys: Vec<String>,
}

impl Default for DeltaMerger {
    fn default() -> Self {
        Self::new(&MergeConfig::default())
    }
}

impl DeltaMerger {
    pub fn new(config: &MergeConfig) -> Self {
        Self {
            stripped_keys: config.stripped_keys.clone(),
        }
    }

    /// Merge one top-level delta into the accumulator.
    pub fn merge(&self, accumulator: &mut DeltaState, delta: &Value) -> Result<(), MergeError> {
        let delta = match delta {
            Value::Object(map) => map,
            other => {
                return Err(MergeError::NotAnObject {
                    found: json_kind(other),
                })
            }
        };
        let root = match accumulator {
            DeltaState::Object(root) => root,
            other => {
                return Err(MergeError::TypeMismatch {
                    path: "$".to_string(),
                    expected: other.kind(),
                    found: "object",
                })
            }
        };

        let fields: Fields<'_> = delta
            .iter()
            .filter(|(k, _)| !self.stripped_keys.iter().any(|s| s == *k))
            .map(|(k, v)| (k.as_str(), v))
            .collect();

        check_object(root, &fields, "$")?;
        apply_object(root, &fields);
        Ok(())
    }

    /// Merge deltas in order, stopping at the first rejected one.
    pub fn merge_all<'a, I>(&self, accumulator: &mut DeltaState, deltas: I) -> Result<(), MergeError>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        for delta in deltas {
            self.merge(accumulator, delta)?;
        }
        Ok(())
    }
}

/// Merge with the default merger (strips `role`).
pub fn merge_chunk(accumulator: &mut DeltaState, delta: &Value) -> Result<(), MergeError> {
    DeltaMerger::default().merge(accumulator, delta)
}

fn fields_of(map: &Map<String, Value>) -> Fields<'_> {
    map.iter().map(|(k, v)| (k.as_str(), v)).collect()
}

fn fragment_fields(map: &Map<String, Value>) -> Fields<'_> {
    map.iter()
        .filter(|(k, _)| k.as_str() != "index")
        .map(|(k, v)| (k.as_str(), v))
        .collect()
}

fn fragment_index(map: &Map<String, Value>) -> Option<usize> {
    map.get("index")
        .and_then(Value::as_u64)
        .and_then(|i| usize::try_from(i).ok())
}

/// Values that never touch the accumulator.
fn is_skipped(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(_) | Value::Number(_))
}

fn check_object(object: &DeltaObject, fields: &Fields<'_>, path: &str) -> Result<(), MergeError> {
    for (key, value) in fields {
        if is_skipped(value) {
            continue;
        }
        let child = format!("{}.{}", path, key);
        match object.fields.get(*key) {
            Some(node) => check_value(node, value, &child)?,
            None if object.open => check_new(value, &child)?,
            None => return Err(MergeError::MissingPath { path: child }),
        }
    }
    Ok(())
}

fn check_value(node: &DeltaState, value: &Value, path: &str) -> Result<(), MergeError> {
    match (node, value) {
        (DeltaState::Leaf(_), Value::String(_)) => Ok(()),
        (DeltaState::Object(object), Value::Object(map)) => {
            check_object(object, &fields_of(map), path)
        }
        (DeltaState::Sequence(slots), Value::Array(fragments)) => {
            check_fragments(slots, fragments, path)
        }
        (node, value) => Err(MergeError::TypeMismatch {
            path: path.to_string(),
            expected: node.kind(),
            found: json_kind(value),
        }),
    }
}

/// A field added to an open placeholder: strings and objects only.
fn check_new(value: &Value, path: &str) -> Result<(), MergeError> {
    match value {
        Value::String(_) => Ok(()),
        Value::Object(map) => {
            for (key, v) in map {
                if !is_skipped(v) {
                    check_new(v, &format!("{}.{}", path, key))?;
                }
            }
            Ok(())
        }
        _ => Err(MergeError::MissingPath {
            path: path.to_string(),
        }),
    }
}

/// Fragments repeating an index are checked against the slot as the earlier
/// fragments of the same delta leave it.
fn check_fragments(slots: &[DeltaState], fragments: &[Value], path: &str) -> Result<(), MergeError> {
    let mut staged: Vec<(usize, DeltaObject)> = Vec::new();

    for (position, fragment) in fragments.iter().enumerate() {
        let map = fragment.as_object().ok_or_else(|| MergeError::TypeMismatch {
            path: format!("{}[#{}]", path, position),
            expected: "object",
            found: json_kind(fragment),
        })?;
        let index = fragment_index(map).ok_or_else(|| MergeError::MissingIndex {
            path: format!("{}[#{}]", path, position),
        })?;
        let slot_path = format!("{}[{}]", path, index);

        let slot = match staged.iter().find(|(i, _)| *i == index) {
            Some((_, object)) => object,
            None => match slots.get(index) {
                Some(DeltaState::Object(object)) => object,
                Some(other) => {
                    return Err(MergeError::TypeMismatch {
                        path: slot_path,
                        expected: other.kind(),
                        found: "object",
                    })
                }
                None => {
                    return Err(MergeError::MissingSlot {
                        path: path.to_string(),
                        index,
                        len: slots.len(),
                    })
                }
            },
        };
        let fields = fragment_fields(map);
        check_object(slot, &fields, &slot_path)?;

        let repeats = fragments[position + 1..]
            .iter()
            .any(|f| f.as_object().and_then(fragment_index) == Some(index));
        if repeats {
            let mut next = slot.clone();
            apply_object(&mut next, &fields);
            match staged.iter_mut().find(|(i, _)| *i == index) {
                Some(entry) => entry.1 = next,
                None => staged.push((index, next)),
            }
        }
    }
    Ok(())
}

// Apply pass: runs only after the check pass accepted the delta.

fn apply_object(object: &mut DeltaObject, fields: &Fields<'_>) {
    for (key, value) in fields {
        if is_skipped(value) {
            trace!(key = *key, "skipping non-string scalar in delta");
            continue;
        }
        if let Some(node) = object.fields.get_mut(*key) {
            apply_value(node, value);
            continue;
        }
        if object.open {
            if let Some(node) = new_node(value) {
                object.fields.insert(key.to_string(), node);
            }
        }
    }
}

fn apply_value(node: &mut DeltaState, value: &Value) {
    match (node, value) {
        (DeltaState::Leaf(text), Value::String(fragment)) => text.push_str(fragment),
        (DeltaState::Object(object), Value::Object(map)) => apply_object(object, &fields_of(map)),
        (DeltaState::Sequence(slots), Value::Array(fragments)) => {
            for fragment in fragments {
                let Some(map) = fragment.as_object() else {
                    continue;
                };
                let Some(index) = fragment_index(map) else {
                    continue;
                };
                if let Some(DeltaState::Object(object)) = slots.get_mut(index) {
                    apply_object(object, &fragment_fields(map));
                }
            }
        }
        _ => {}
    }
}

fn new_node(value: &Value) -> Option<DeltaState> {
    match value {
        Value::String(s) => Some(DeltaState::Leaf(s.clone())),
        Value::Object(map) => {
            let mut object = DeltaObject::open();
            for (key, v) in map {
                if let Some(node) = new_node(v) {
                    object.fields.insert(key.clone(), node);
                }
            }
            Some(DeltaState::Object(object))
        }
        _ => None,
    }
}
