//! Argument coercion: raw JSON arguments into typed values before invocation.
//!
//! Only parameters declared with a [`StructuralType`](crate::schema::StructuralType) are
//! touched: their raw value is validated against the record's schema and decoded into a
//! typed instance. Everything else passes through unchanged; primitives are never
//! coerced (a numeric string stays a string).
//!
//! # Examples
//!
//! ```
//! use ai_lib_tools::coerce::ArgumentCoercer;
//! use ai_lib_tools::schema::StructuralType;
//! use ai_lib_tools::types::{CallableDescriptor, ParamDescriptor};
//! use schemars::JsonSchema;
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//!
//! #[derive(Debug, Serialize, Deserialize, JsonSchema)]
//! struct Location {
//!     city: String,
//!     country: String,
//! }
//!
//! let descriptor = CallableDescriptor::builder("get_weather")
//!     .param(ParamDescriptor::new("location").typed(StructuralType::of::<Location>()))
//!     .build()
//!     .unwrap();
//!
//! let raw = json!({"location": {"city": "Lyngby", "country": "Danmark"}});
//! let args = ArgumentCoercer::coerce_descriptor(&descriptor, raw.as_object().unwrap()).unwrap();
//!
//! assert_eq!(args.structured::<Location>("location").unwrap().city, "Lyngby");
//! ```

pub mod error;

pub use error::{SchemaIssue, ValidationError};

use crate::schema::StructuredValue;
use crate::types::{Callable, CallableDescriptor, DeclaredType};
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::btree_map;
use std::collections::BTreeMap;

/// A coerced argument: either the raw JSON value or a validated typed instance.
#[derive(Debug)]
pub enum ArgValue {
    Raw(Value),
    Structured(Box<dyn StructuredValue>),
}

impl ArgValue {
    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            ArgValue::Raw(v) => Some(v),
            ArgValue::Structured(_) => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            ArgValue::Structured(value) => {
                let value: &dyn StructuredValue = value.as_ref();
                value.as_any().downcast_ref::<T>()
            }
            ArgValue::Raw(_) => None,
        }
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            ArgValue::Raw(v) => Ok(v.clone()),
            ArgValue::Structured(value) => {
                let value: &dyn StructuredValue = value.as_ref();
                value.to_json()
            }
        }
    }
}

/// Arguments ready for invocation, keyed by parameter name.
#[derive(Debug, Default)]
pub struct CoercedArgs {
    values: BTreeMap<String, ArgValue>,
}

impl CoercedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Raw JSON value of a pass-through argument.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(ArgValue::as_raw)
    }

    /// String value of a pass-through argument.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.raw(name).and_then(Value::as_str)
    }

    /// Typed instance of a structural argument.
    pub fn structured<T: Any>(&self, name: &str) -> Option<&T> {
        self.get(name).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ArgValue> {
        self.values.iter()
    }

    /// Re-serialize every argument.
    pub fn to_json(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let mut map = Map::new();
        for (name, value) in &self.values {
            map.insert(name.clone(), value.to_json()?);
        }
        Ok(map)
    }
}

/// Converts raw JSON arguments into typed values according to a callable's signature.
pub struct ArgumentCoercer;

impl ArgumentCoercer {
    /// Coerce against the callable's current signature.
    pub fn coerce(callable: &dyn Callable, raw: &Map<String, Value>) -> crate::Result<CoercedArgs> {
        let descriptor = callable.signature()?;
        Ok(Self::coerce_descriptor(&descriptor, raw)?)
    }

    /// Coerce against an already obtained descriptor. `raw` is not modified.
    pub fn coerce_descriptor(
        descriptor: &CallableDescriptor,
        raw: &Map<String, Value>,
    ) -> Result<CoercedArgs, ValidationError> {
        let mut args = CoercedArgs::new();
        for (name, value) in raw {
            let structural = descriptor
                .param(name)
                .and_then(|p| p.declared.as_ref())
                .and_then(DeclaredType::as_structural);

            let coerced = match structural {
                Some(ty) => {
                    ty.validate(value).map_err(|issues| {
                        ValidationError::from_issues(descriptor.name(), name.as_str(), issues)
                    })?;
                    let typed = ty.decode(value.clone()).map_err(|e| {
                        ValidationError::from_decode(descriptor.name(), name.as_str(), &e)
                    })?;
                    tracing::trace!(
                        callable = descriptor.name(),
                        parameter = name.as_str(),
                        record = ty.name(),
                        "coerced structural argument"
                    );
                    ArgValue::Structured(typed)
                }
                None => ArgValue::Raw(value.clone()),
            };
            args.insert(name.clone(), coerced);
        }
        Ok(args)
    }
}
