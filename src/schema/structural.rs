//! Structural (record) parameter types.
//!
//! A [`StructuralType`] erases a concrete Rust record `T` into the three capabilities the
//! tool layer needs: producing `T`'s JSON Schema through `schemars`, validating a raw
//! JSON value against that schema, and decoding the value into a typed `T`.

use crate::coerce::SchemaIssue;
use jsonschema::{Draft, JSONSchema};
use once_cell::sync::OnceCell;
use schemars::gen::{SchemaGenerator, SchemaSettings};
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type-erased, validated argument instance.
pub trait StructuredValue: Any + fmt::Debug + Send + Sync {
    /// Re-serialize the instance.
    fn to_json(&self) -> Result<Value, serde_json::Error>;

    fn as_any(&self) -> &dyn Any;
}

impl<T> StructuredValue for T
where
    T: Serialize + fmt::Debug + Send + Sync + 'static,
{
    fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Generator used for every tool schema: draft-07, nested records inlined.
pub(crate) fn inline_generator() -> SchemaGenerator {
    SchemaSettings::draft07()
        .with(|s| {
            s.inline_subschemas = true;
            s.meta_schema = None;
        })
        .into_generator()
}

type SubschemaFn = fn(&mut SchemaGenerator) -> Schema;
type DecodeFn = fn(Value) -> Result<Box<dyn StructuredValue>, serde_json::Error>;

fn subschema_of<T: JsonSchema>(gen: &mut SchemaGenerator) -> Schema {
    gen.subschema_for::<T>()
}

fn decode_as<T>(value: Value) -> Result<Box<dyn StructuredValue>, serde_json::Error>
where
    T: DeserializeOwned + StructuredValue,
{
    Ok(Box::new(serde_json::from_value::<T>(value)?))
}

/// A named record type usable as a parameter type.
///
/// Self-referential records are not supported: their schema cannot be inlined.
#[derive(Clone)]
pub struct StructuralType {
    name: String,
    type_name: &'static str,
    subschema: SubschemaFn,
    decode: DecodeFn,
    validator: Arc<OnceCell<JSONSchema>>,
}

impl StructuralType {
    pub fn of<T>() -> Self
    where
        T: JsonSchema + DeserializeOwned + Serialize + fmt::Debug + Send + Sync + 'static,
    {
        Self {
            name: T::schema_name(),
            type_name: std::any::type_name::<T>(),
            subschema: subschema_of::<T>,
            decode: decode_as::<T>,
            validator: Arc::new(OnceCell::new()),
        }
    }

    /// Schema name reported by the provider (e.g. `Location`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn subschema(&self, gen: &mut SchemaGenerator) -> Schema {
        (self.subschema)(gen)
    }

    /// Standalone, fully inlined JSON Schema of the record.
    pub fn schema(&self) -> Value {
        let mut gen = inline_generator();
        serde_json::to_value(self.subschema(&mut gen)).unwrap_or(Value::Null)
    }

    /// Validate a raw value against the record's schema.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<SchemaIssue>> {
        let compiled = self
            .validator
            .get_or_try_init(|| {
                let schema = self.schema();
                let compiled = JSONSchema::options()
                    .with_draft(Draft::Draft7)
                    .compile(&schema)
                    .map_err(|e| e.to_string())?;
                Ok::<_, String>(compiled)
            })
            .map_err(|e| {
                vec![SchemaIssue::without_path(format!(
                    "schema for {} does not compile: {}",
                    self.name, e
                ))]
            })?;

        match compiled.validate(value) {
            Ok(()) => Ok(()),
            Err(errors) => Err(errors
                .map(|e| SchemaIssue::at_pointer(&e.instance_path.to_string(), e.to_string()))
                .collect()),
        }
    }

    /// Deserialize a raw value into the typed record.
    pub fn decode(&self, value: Value) -> Result<Box<dyn StructuredValue>, serde_json::Error> {
        (self.decode)(value)
    }
}

impl fmt::Debug for StructuralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralType")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    #[derive(Debug, Serialize, Deserialize, JsonSchema)]
    struct Segment {
        from: Point,
        to: Point,
    }

    #[test]
    fn test_nested_records_are_inlined() {
        let schema = StructuralType::of::<Segment>().schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["from"]["type"], "object");
        assert_eq!(schema["properties"]["from"]["properties"]["x"]["type"], "integer");
        assert!(schema.get("definitions").is_none());
        assert!(schema["properties"]["to"].get("$ref").is_none());
    }

    #[test]
    fn test_validate_reports_paths() {
        let ty = StructuralType::of::<Segment>();
        assert!(ty.validate(&json!({"from": {"x": 1, "y": 2}, "to": {"x": 3, "y": 4}})).is_ok());

        let issues = ty
            .validate(&json!({"from": {"x": "one", "y": 2}, "to": {"x": 3, "y": 4}}))
            .unwrap_err();
        assert_eq!(issues[0].path.as_deref(), Some("from.x"));
    }

    #[test]
    fn test_decode_downcasts() {
        let value = StructuralType::of::<Point>().decode(json!({"x": 1, "y": 2})).unwrap();
        let point = value.as_any().downcast_ref::<Point>().unwrap();
        assert_eq!(point, &Point { x: 1, y: 2 });
        assert_eq!(value.to_json().unwrap(), json!({"x": 1, "y": 2}));
    }
}
