//! Accumulated state of a streamed response.

use crate::pipeline::MergeError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Object node of a [`DeltaState`].
///
/// An object that is empty in the skeleton is an *open* placeholder: merges may add
/// fields to it. Any other skeleton object is *closed*: its field set is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeltaObject {
    pub(crate) fields: BTreeMap<String, DeltaState>,
    pub(crate) open: bool,
}

impl DeltaObject {
    pub fn open() -> Self {
        Self {
            fields: BTreeMap::new(),
            open: true,
        }
    }

    pub fn closed(fields: BTreeMap<String, DeltaState>) -> Self {
        Self {
            fields,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn get(&self, key: &str) -> Option<&DeltaState> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Tagged tree holding a response under reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaState {
    /// String field; deltas append to it.
    Leaf(String),
    Object(DeltaObject),
    /// Slots addressed by the `index` carried in each fragment.
    Sequence(Vec<DeltaState>),
    /// A skeleton slot that no delta may write to.
    Null,
}

impl DeltaState {
    /// Build the accumulator from a JSON skeleton.
    ///
    /// Strings, objects, arrays and `null` are accepted; numbers and booleans are not.
    pub fn from_skeleton(skeleton: &Value) -> Result<Self, MergeError> {
        Self::from_value_at(skeleton, "$")
    }

    fn from_value_at(value: &Value, path: &str) -> Result<Self, MergeError> {
        match value {
            Value::String(s) => Ok(DeltaState::Leaf(s.clone())),
            Value::Null => Ok(DeltaState::Null),
            Value::Object(map) if map.is_empty() => Ok(DeltaState::Object(DeltaObject::open())),
            Value::Object(map) => {
                let mut fields = BTreeMap::new();
                for (k, v) in map {
                    fields.insert(k.clone(), Self::from_value_at(v, &format!("{}.{}", path, k))?);
                }
                Ok(DeltaState::Object(DeltaObject::closed(fields)))
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| Self::from_value_at(v, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>, _>>()
                .map(DeltaState::Sequence),
            other => Err(MergeError::UnsupportedSkeleton {
                path: path.to_string(),
                found: json_kind(other),
            }),
        }
    }

    /// Skeleton of an assistant message with `slots` pre-allocated tool-call placeholders.
    pub fn assistant_message(sender: &str, slots: usize) -> Self {
        let slot = tool_call_slot();
        let mut fields = BTreeMap::new();
        fields.insert("content".to_string(), DeltaState::Leaf(String::new()));
        fields.insert("sender".to_string(), DeltaState::Leaf(sender.to_string()));
        fields.insert("role".to_string(), DeltaState::Leaf("assistant".to_string()));
        fields.insert("function_call".to_string(), DeltaState::Null);
        fields.insert(
            "tool_calls".to_string(),
            DeltaState::Sequence(vec![slot; slots]),
        );
        DeltaState::Object(DeltaObject::closed(fields))
    }

    /// Grow the sequence under `key` to at least `len` slots, cloning `template`.
    ///
    /// This is the only way to add tool-call slots; merges never allocate them.
    pub fn ensure_slots(
        &mut self,
        key: &str,
        len: usize,
        template: &DeltaState,
    ) -> Result<(), MergeError> {
        let path = format!("$.{}", key);
        let object = match self {
            DeltaState::Object(object) => object,
            other => {
                return Err(MergeError::TypeMismatch {
                    path: "$".to_string(),
                    expected: other.kind(),
                    found: "object",
                })
            }
        };
        match object.fields.get_mut(key) {
            Some(DeltaState::Sequence(items)) => {
                if items.len() < len {
                    items.resize(len, template.clone());
                }
                Ok(())
            }
            Some(other) => Err(MergeError::TypeMismatch {
                path,
                expected: other.kind(),
                found: "array",
            }),
            None => Err(MergeError::MissingPath { path }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&DeltaState> {
        match self {
            DeltaState::Object(object) => object.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DeltaState::Leaf(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[DeltaState]> {
        match self {
            DeltaState::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Current content as JSON.
    pub fn to_value(&self) -> Value {
        match self {
            DeltaState::Leaf(s) => Value::String(s.clone()),
            DeltaState::Null => Value::Null,
            DeltaState::Sequence(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            DeltaState::Object(object) => {
                let mut map = Map::new();
                for (k, v) in &object.fields {
                    map.insert(k.clone(), v.to_value());
                }
                Value::Object(map)
            }
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            DeltaState::Leaf(_) => "string",
            DeltaState::Object(_) => "object",
            DeltaState::Sequence(_) => "array",
            DeltaState::Null => "null",
        }
    }
}

/// `{"id": "", "type": "", "function": {"name": "", "arguments": ""}}`
pub fn tool_call_slot() -> DeltaState {
    let leaf = || DeltaState::Leaf(String::new());
    let mut function = BTreeMap::new();
    function.insert("name".to_string(), leaf());
    function.insert("arguments".to_string(), leaf());

    let mut fields = BTreeMap::new();
    fields.insert("id".to_string(), leaf());
    fields.insert("type".to_string(), leaf());
    fields.insert(
        "function".to_string(),
        DeltaState::Object(DeltaObject::closed(function)),
    );
    DeltaState::Object(DeltaObject::closed(fields))
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
